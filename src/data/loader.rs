// ============================================================
// Layer 4 — Document Loader
// ============================================================
// Resolves a configured document path against the samples
// directory, picks the extractor for its kind, and returns an
// immutable Document holding the extracted text.
//
// Extraction failures are not swallowed here: a document that
// cannot be read or decoded stops the benchmark.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::data::{docx_tables::DocxTableExtractor, pdf_pages::PdfPageExtractor};
use crate::domain::benchmark::DocumentSpec;
use crate::domain::document::{Document, DocumentKind};
use crate::domain::traits::TextExtractor;

/// Loads benchmark documents relative to a base directory.
pub struct DocumentLoader {
    /// Relative document paths are resolved against this directory
    base_dir: PathBuf,
}

impl DocumentLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    /// Resolve the path of a configured document.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }

    /// Extract one configured document.
    pub fn load(&self, spec: &DocumentSpec) -> Result<Document> {
        let kind = spec.resolve_kind()?;
        let path = self.resolve(&spec.path);
        load_path(&path, kind)
    }

    /// Extract every configured document, in order.
    pub fn load_all(&self, specs: &[DocumentSpec]) -> Result<Vec<Document>> {
        let docs = specs
            .iter()
            .map(|spec| self.load(spec))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Successfully loaded {} documents", docs.len());
        Ok(docs)
    }
}

/// The extractor responsible for a document kind.
pub fn extractor_for(kind: DocumentKind) -> Box<dyn TextExtractor> {
    match kind {
        DocumentKind::Tabular => Box::new(DocxTableExtractor),
        DocumentKind::Paged   => Box::new(PdfPageExtractor),
    }
}

/// Extract a single file as the given kind.
pub fn load_path(path: &Path, kind: DocumentKind) -> Result<Document> {
    let text = extractor_for(kind)
        .extract(path)
        .with_context(|| format!("Extraction of {} document '{}' failed", kind, path.display()))?;

    tracing::debug!("Loaded: {} ({} chars)", path.display(), text.len());
    Ok(Document::new(path.display().to_string(), kind, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_resolve_against_base_dir() {
        let loader = DocumentLoader::new("samples");
        assert_eq!(loader.resolve("a.pdf"), PathBuf::from("samples/a.pdf"));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let loader = DocumentLoader::new("samples");
        let abs = std::env::temp_dir().join("a.pdf");
        assert_eq!(loader.resolve(abs.to_str().unwrap()), abs);
    }

    #[test]
    fn test_missing_document_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DocumentLoader::new(dir.path());
        let spec = DocumentSpec {
            path:      "missing.docx".to_string(),
            kind:      None,
            questions: Vec::new(),
        };
        let err = loader.load(&spec).unwrap_err();
        assert!(format!("{err:#}").contains("missing.docx"));
    }
}
