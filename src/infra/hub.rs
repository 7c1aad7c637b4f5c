// ============================================================
// Layer 6 — Model Hub
// ============================================================
// Resolves the files a model needs:
//   config.json        - architecture hyperparameters
//   tokenizer.json     - fast tokenizer (or vocab.txt for WordPiece)
//   model.safetensors  - weights (or pytorch_model.bin)
//
// A model id that names an existing local directory is read from
// disk; anything else is fetched through hf-hub, which caches the
// downloads under ~/.cache/huggingface.

use anyhow::{anyhow, Context, Result};
use hf_hub::api::sync::{Api, ApiBuilder, ApiRepo};
use std::path::{Path, PathBuf};

/// Where the tokenizer definition comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenizerFile {
    /// A serialized fast tokenizer
    Json(PathBuf),
    /// A plain BERT WordPiece vocabulary
    WordPieceVocab(PathBuf),
}

/// Local paths of everything needed to build a model.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config:    PathBuf,
    pub tokenizer: TokenizerFile,
    pub weights:   PathBuf,
}

impl ModelFiles {
    /// Collect model files from a local directory.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let pick = |names: &[&str]| -> Option<PathBuf> {
            names.iter().map(|n| dir.join(n)).find(|p| p.exists())
        };

        let config = pick(&["config.json"])
            .ok_or_else(|| anyhow!("No config.json in '{}'", dir.display()))?;

        let tokenizer = match (pick(&["tokenizer.json"]), pick(&["vocab.txt"])) {
            (Some(json), _)     => TokenizerFile::Json(json),
            (None, Some(vocab)) => TokenizerFile::WordPieceVocab(vocab),
            (None, None) => {
                return Err(anyhow!("No tokenizer.json or vocab.txt in '{}'", dir.display()))
            }
        };

        let weights = pick(&["model.safetensors", "pytorch_model.bin"])
            .ok_or_else(|| anyhow!("No model weights in '{}'", dir.display()))?;

        Ok(Self { config, tokenizer, weights })
    }
}

/// Fetches model files by id.
pub struct ModelHub {
    api: Api,
}

impl ModelHub {
    pub fn new() -> Result<Self> {
        let api = ApiBuilder::new()
            .with_progress(true)
            .build()
            .context("Failed to create HuggingFace API")?;
        Ok(Self { api })
    }

    /// Resolve a model id to local files, downloading when needed.
    pub fn fetch(&self, model_id: &str) -> Result<ModelFiles> {
        let local = Path::new(model_id);
        if local.is_dir() {
            tracing::info!("Using local model directory '{}'", local.display());
            return ModelFiles::from_dir(local);
        }

        tracing::info!("Fetching model files for {}", model_id);
        let repo = self.api.model(model_id.to_string());

        let config = repo
            .get("config.json")
            .with_context(|| format!("Failed to get config.json for {model_id}"))?;

        let tokenizer = match repo.get("tokenizer.json") {
            Ok(path) => TokenizerFile::Json(path),
            Err(e) => {
                tracing::debug!("{model_id}: no tokenizer.json ({e}), falling back to vocab.txt");
                TokenizerFile::WordPieceVocab(
                    repo.get("vocab.txt")
                        .with_context(|| format!("Failed to get a tokenizer for {model_id}"))?,
                )
            }
        };

        let weights = get_weights(&repo)
            .with_context(|| format!("Failed to get model weights for {model_id}"))?;

        Ok(ModelFiles { config, tokenizer, weights })
    }
}

fn get_weights(repo: &ApiRepo) -> Result<PathBuf> {
    repo.get("model.safetensors")
        .or_else(|_| repo.get("pytorch_model.bin"))
        .map_err(Into::into)
}
