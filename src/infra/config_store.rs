// ============================================================
// Layer 6 — Benchmark Config Store
// ============================================================
// Saves and loads the benchmark definition as pretty JSON.
//
// Example file (abridged):
//   {
//     "documents": [
//       {
//         "path": "DICIONARIO_DE_DADOS.docx",
//         "kind": "tabular",
//         "questions": [
//           { "question": "Qual tabela representa o indicador LFCES058?",
//             "expected": ["TB_ESTAB_BANCO"],
//             "context": "first_block" }
//         ]
//       }
//     ],
//     "models": ["pierreguillou/bert-base-cased-squad-v1.1-portuguese"],
//     "embedding_model": "sentence-transformers/all-MiniLM-L6-v2"
//   }

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::domain::benchmark::BenchmarkConfig;

pub struct ConfigStore;

impl ConfigStore {
    /// Write the config to `path`, creating parent directories.
    pub fn save(cfg: &BenchmarkConfig, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved benchmark config to '{}'", path.display());
        Ok(())
    }

    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<BenchmarkConfig> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;

        let cfg: BenchmarkConfig = serde_json::from_str(&json)
            .with_context(|| format!("Invalid benchmark config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::benchmark::ContextScope;

    #[test]
    fn test_save_then_load_keeps_definition() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bench.json");

        ConfigStore::save(&BenchmarkConfig::default(), &path).unwrap();
        let cfg = ConfigStore::load(&path).unwrap();

        assert_eq!(cfg.models.len(), 3);
        assert_eq!(cfg.question_count(), 6);
        assert_eq!(cfg.documents[0].questions[1].context, ContextScope::LabeledBlocks);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.json");
        fs::write(&path, r#"{
            "documents": [{ "path": "a.pdf", "questions": [{ "question": "Q?", "expected": [] }] }],
            "models": ["m"]
        }"#).unwrap();

        let cfg = ConfigStore::load(&path).unwrap();
        assert_eq!(cfg.embedding_model, "sentence-transformers/all-MiniLM-L6-v2");
        assert_eq!(cfg.documents[0].questions[0].context, ContextScope::Full);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(ConfigStore::load(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(ConfigStore::load(Path::new("/definitely/not/here.json")).is_err());
    }
}
