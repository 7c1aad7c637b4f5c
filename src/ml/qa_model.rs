// ============================================================
// Layer 5 — Extractive QA Model (candle)
// ============================================================
// A pre-trained encoder with a span-prediction head:
//
//   [CLS] question [SEP] context [SEP]
//       │
//       ▼
//   Encoder              → hidden states [1, seq_len, hidden]
//       │                  (BERT or DeBERTa-v2)
//       ▼
//   qa_outputs (Linear)  → logits        [1, seq_len, 2]
//       │
//       ▼
//   start / end logits   → best span over all windows (ml::windows)
//
// Supported checkpoints, chosen by `model_type` in config.json:
//   bert        → encoder weights under "bert.*"
//   deberta-v2  → encoder weights under "deberta.*" (also mDeBERTa-v3)
// Both carry a root-level "qa_outputs" head. Anything else fails
// at load time.

use anyhow::{bail, Context, Result};
use candle_core::{DType, Device, IndexOp, Module, Tensor};
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::debertav2::{Config as DebertaV2Config, DebertaV2Model};
use serde::Deserialize;
use tokenizers::{Encoding, Tokenizer};

use crate::domain::response::ModelResponse;
use crate::domain::traits::{AnswererLoader, QuestionAnswerer};
use crate::infra::hub::{ModelFiles, ModelHub, TokenizerFile};
use crate::ml::tokenizer::load_tokenizer;
use crate::ml::windows::{configure_truncation, encode_windows, select_answer, WindowParams};

/// Encoder families with a question-answering head we can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    Bert,
    DebertaV2,
}

impl Architecture {
    /// Read `model_type` from a config.json; a missing field means BERT.
    pub fn from_config(config_json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct ModelType {
            #[serde(default)]
            model_type: Option<String>,
        }

        let head: ModelType = serde_json::from_str(config_json)
            .context("Failed to parse model config")?;
        match head.model_type.as_deref() {
            Some("bert") | None => Ok(Self::Bert),
            Some("deberta-v2")  => Ok(Self::DebertaV2),
            Some(other) => bail!("unsupported architecture '{other}' (supported: bert, deberta-v2)"),
        }
    }

    /// Prefix of the encoder weights in a QA checkpoint.
    fn weight_prefix(self) -> &'static str {
        match self {
            Self::Bert      => "bert",
            Self::DebertaV2 => "deberta",
        }
    }
}

enum Encoder {
    Bert(BertModel),
    DebertaV2(DebertaV2Model),
}

impl Encoder {
    /// Build the encoder; also returns its hidden size.
    fn load(arch: Architecture, config_json: &str, vb: VarBuilder) -> Result<(Self, usize)> {
        let prefixed = vb.pp(arch.weight_prefix());
        match arch {
            Architecture::Bert => {
                let config: BertConfig = serde_json::from_str(config_json)
                    .context("Failed to parse BERT config")?;
                let model = BertModel::load(prefixed, &config)
                    .or_else(|_| BertModel::load(vb, &config))?;
                Ok((Self::Bert(model), config.hidden_size))
            }
            Architecture::DebertaV2 => {
                let config: DebertaV2Config = serde_json::from_str(config_json)
                    .context("Failed to parse DeBERTa-v2 config")?;
                let model = DebertaV2Model::load(prefixed, &config)?;
                Ok((Self::DebertaV2(model), config.hidden_size))
            }
        }
    }

    fn forward(&self, window: &Encoding, device: &Device) -> Result<Tensor> {
        let input_ids = Tensor::new(window.get_ids(), device)?.unsqueeze(0)?;
        let hidden = match self {
            Self::Bert(model) => {
                let token_type_ids = Tensor::new(window.get_type_ids(), device)?.unsqueeze(0)?;
                model.forward(&input_ids, &token_type_ids, None)?
            }
            // mDeBERTa has no token type embeddings; the mask defaults to all ones
            Self::DebertaV2(model) => model.forward(&input_ids, None, None)?,
        };
        Ok(hidden)
    }
}

pub struct ExtractiveQaModel {
    model_id:   String,
    encoder:    Encoder,
    qa_outputs: Linear,
    tokenizer:  Tokenizer,
    windows:    WindowParams,
    device:     Device,
}

impl ExtractiveQaModel {
    /// Build the model from resolved files.
    pub fn load(model_id: &str, files: &ModelFiles, device: &Device) -> Result<Self> {
        let config_json = std::fs::read_to_string(&files.config)
            .with_context(|| format!("Failed to read config: {}", files.config.display()))?;
        let arch = Architecture::from_config(&config_json)
            .with_context(|| format!("Cannot run {model_id}"))?;

        if arch == Architecture::DebertaV2 && !matches!(files.tokenizer, TokenizerFile::Json(_)) {
            bail!("{model_id}: DeBERTa-v2 models need a tokenizer.json");
        }

        let vb = if files.weights.extension().is_some_and(|e| e == "safetensors") {
            unsafe {
                VarBuilder::from_mmaped_safetensors(&[&files.weights], DType::F32, device)
                    .context("Failed to load safetensors weights")?
            }
        } else {
            VarBuilder::from_pth(&files.weights, DType::F32, device)
                .context("Failed to load pytorch weights")?
        };

        let (encoder, hidden) = Encoder::load(arch, &config_json, vb.clone())
            .with_context(|| format!("Failed to load encoder of {model_id}"))?;
        let qa_outputs = candle_nn::linear(hidden, 2, vb.pp("qa_outputs"))
            .with_context(|| format!("{model_id} has no question-answering head"))?;

        let windows = WindowParams::default();
        let mut tokenizer = load_tokenizer(&files.tokenizer, model_id.contains("uncased"))?;
        configure_truncation(&mut tokenizer, windows)?;

        tracing::info!("Model loaded: {} ({:?})", model_id, arch);
        Ok(Self {
            model_id: model_id.to_string(),
            encoder,
            qa_outputs,
            tokenizer,
            windows,
            device: device.clone(),
        })
    }

    /// Start and end logits for one window.
    fn logits(&self, window: &Encoding) -> Result<(Vec<f32>, Vec<f32>)> {
        let hidden = self
            .encoder
            .forward(window, &self.device)
            .with_context(|| format!("{} forward pass failed", self.model_id))?;

        // [1, seq_len, 2] → [seq_len, 2]
        let logits = self.qa_outputs.forward(&hidden)?.squeeze(0)?;
        let start  = logits.i((.., 0))?.contiguous()?.to_vec1::<f32>()?;
        let end    = logits.i((.., 1))?.contiguous()?.to_vec1::<f32>()?;
        Ok((start, end))
    }
}

impl QuestionAnswerer for ExtractiveQaModel {
    fn answer(&self, question: &str, context: &str) -> Result<ModelResponse> {
        let windows = encode_windows(&self.tokenizer, self.windows, question, context)?;
        let logits = windows
            .iter()
            .map(|w| self.logits(w))
            .collect::<Result<Vec<_>>>()?;

        let Some(answer) = select_answer(context, &windows, &logits) else {
            return Ok(ModelResponse::new(question, "", 0.0));
        };

        tracing::debug!(
            "{}: window {}/{} conf={:.4} answer='{}'",
            self.model_id, answer.window + 1, windows.len(), answer.score, answer.text
        );
        Ok(ModelResponse::new(question, answer.text, answer.score))
    }
}

/// Loads ExtractiveQaModel instances through the model hub.
pub struct CandleQaLoader {
    hub:    ModelHub,
    device: Device,
}

impl CandleQaLoader {
    pub fn new(hub: ModelHub, device: Device) -> Self {
        Self { hub, device }
    }
}

impl AnswererLoader for CandleQaLoader {
    fn load(&self, model_id: &str) -> Result<Box<dyn QuestionAnswerer>> {
        let files = self.hub.fetch(model_id)?;
        let model = ExtractiveQaModel::load(model_id, &files, &self.device)?;
        Ok(Box::new(model))
    }
}
