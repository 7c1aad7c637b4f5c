// ============================================================
// Layer 2 — Ask Use Case
// ============================================================
// One question, one model, one document:
//   1. Extract the document (kind inferred from its extension)
//   2. Load the model
//   3. Answer using the whole extracted text as context
//
// Unlike the benchmark, an inference error here is returned to
// the caller: there is nothing else to continue with.

use anyhow::{anyhow, Result};
use std::path::Path;

use crate::data::loader::load_path;
use crate::domain::document::DocumentKind;
use crate::domain::response::ModelResponse;
use crate::domain::traits::AnswererLoader;

pub struct AskUseCase<'a> {
    loader: &'a dyn AnswererLoader,
}

impl<'a> AskUseCase<'a> {
    pub fn new(loader: &'a dyn AnswererLoader) -> Self {
        Self { loader }
    }

    pub fn answer(&self, model_id: &str, document: &Path, question: &str) -> Result<ModelResponse> {
        let kind = DocumentKind::from_path(document)
            .ok_or_else(|| anyhow!("'{}' is neither a .docx nor a .pdf file", document.display()))?;
        let doc = load_path(document, kind)?;

        if doc.text.trim().is_empty() {
            tracing::warn!("'{}' has no extractable text", document.display());
        }

        let model = self.loader.load(model_id)?;
        model.answer(question, &doc.text)
    }
}
