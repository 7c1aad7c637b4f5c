// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The three external capabilities the benchmark relies on, each
// behind a trait so the driver can be exercised with fakes:
//
//   TextExtractor     → turns a document file into flat text
//                       (DocxTableExtractor, PdfPageExtractor)
//   QuestionAnswerer  → answers a question from a context
//                       (ExtractiveQaModel)
//   TextEmbedder      → maps text to a vector for cosine similarity
//                       (MiniLmEmbedder, HashEmbedder)
//
// AnswererLoader builds one QuestionAnswerer per model id, so the
// driver controls how long each model stays in memory.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use std::path::Path;

use crate::domain::response::ModelResponse;

// ─── TextExtractor ────────────────────────────────────────────────────────────
/// Any component that can turn a document file into flat text.
pub trait TextExtractor {
    /// Read and extract the whole document.
    /// Errors when the file cannot be opened or decoded.
    fn extract(&self, path: &Path) -> Result<String>;
}

// ─── QuestionAnswerer ─────────────────────────────────────────────────────────
/// Any component that can answer a question from a context passage.
pub trait QuestionAnswerer {
    fn answer(&self, question: &str, context: &str) -> Result<ModelResponse>;
}

impl QuestionAnswerer for Box<dyn QuestionAnswerer> {
    fn answer(&self, question: &str, context: &str) -> Result<ModelResponse> {
        (**self).answer(question, context)
    }
}

// ─── AnswererLoader ───────────────────────────────────────────────────────────
/// Builds a QuestionAnswerer for a model id.
/// The returned value owns the model; dropping it releases it.
pub trait AnswererLoader {
    fn load(&self, model_id: &str) -> Result<Box<dyn QuestionAnswerer>>;
}

// ─── TextEmbedder ─────────────────────────────────────────────────────────────
/// Any component that maps a text fragment to an embedding vector.
pub trait TextEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

impl TextEmbedder for Box<dyn TextEmbedder> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }
}
