// ============================================================
// Layer 5 — Text Embedders
// ============================================================
// Two TextEmbedder implementations:
//
//   MiniLmEmbedder - sentence-transformers/all-MiniLM-L6-v2 on
//                    candle: BERT encoder, mean pooling over the
//                    tokens, L2 normalisation (384 dimensions)
//
//   HashEmbedder   - hashed bag of lower-cased words; needs no
//                    download, identical texts still embed to the
//                    same unit vector

use anyhow::{anyhow, Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::utils::truncation::TruncationParams;
use tokenizers::Tokenizer;

use crate::domain::traits::TextEmbedder;
use crate::infra::hub::ModelFiles;
use crate::ml::tokenizer::load_tokenizer;

/// all-MiniLM-L6-v2 was trained on sequences up to this length
const MAX_SEQ_LEN: usize = 256;

pub struct MiniLmEmbedder {
    model:     BertModel,
    tokenizer: Tokenizer,
    device:    Device,
}

impl MiniLmEmbedder {
    pub fn load(files: &ModelFiles, device: &Device) -> Result<Self> {
        let config_str = std::fs::read_to_string(&files.config)
            .with_context(|| format!("Failed to read config: {}", files.config.display()))?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .context("Failed to parse BERT config")?;

        let vb = if files.weights.extension().is_some_and(|e| e == "safetensors") {
            unsafe {
                VarBuilder::from_mmaped_safetensors(&[&files.weights], DType::F32, device)
                    .context("Failed to load safetensors weights")?
            }
        } else {
            VarBuilder::from_pth(&files.weights, DType::F32, device)
                .context("Failed to load pytorch weights")?
        };
        let model = BertModel::load(vb, &config).context("Failed to load embedding model")?;

        let mut tokenizer = load_tokenizer(&files.tokenizer, true)?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Cannot configure truncation: {e}"))?;

        tracing::info!("Embedding model loaded");
        Ok(Self { model, tokenizer, device: device.clone() })
    }
}

impl TextEmbedder for MiniLmEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenisation failed: {e}"))?;

        let input_ids      = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;

        // [1, seq_len, 384] → mean over tokens → [384]
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, None)
            .context("Embedding forward pass failed")?;
        let pooled = hidden.mean(1)?.squeeze(0)?;

        let mut v = pooled.to_vec1::<f32>()?;
        l2_normalize(&mut v);
        Ok(v)
    }
}

/// Hashed bag-of-words embedder.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

/// Same width as MiniLM embeddings.
pub const HASH_DIM: usize = 384;

impl HashEmbedder {
    /// `dim` is raised to at least 8.
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(8) }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(HASH_DIM)
    }
}

impl TextEmbedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dim];

        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            // FNV-1a
            let mut h: u64 = 1469598103934665603;
            for b in token.as_bytes() {
                h ^= *b as u64;
                h = h.wrapping_mul(1099511628211);
            }
            v[(h as usize) % self.dim] += 1.0;
        }

        l2_normalize(&mut v);
        Ok(v)
    }
}

fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
