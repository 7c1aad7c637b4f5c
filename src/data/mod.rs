// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a document file on disk and the context
// string handed to a question-answering model.
//
//   .docx / .pdf file
//       │
//       ▼
//   DocumentLoader    → picks the extractor for the document kind
//       │
//       ├── DocxTableExtractor → tables → "Table: X" lines / row lists
//       └── PdfPageExtractor   → page texts concatenated in order
//       │
//       ▼
//   Document          → immutable extracted text
//       │
//       ▼
//   select_context    → slice of the text used for one question
//
// Reference: docx-rs and lopdf crate documentation

/// Dispatches a DocumentSpec to the right extractor
pub mod loader;

/// Table text extraction from .docx files using docx-rs
pub mod docx_tables;

/// Page text extraction from .pdf files using lopdf
pub mod pdf_pages;

/// Chooses the context text for a question
pub mod context;
