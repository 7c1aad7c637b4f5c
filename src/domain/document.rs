// ============================================================
// Layer 3 — Document Domain Type
// ============================================================
// A document loaded from disk: where it came from, what kind of
// structure it has, and the flat text extracted from it.
//
// Two kinds of document are benchmarked:
//   - Tabular → a .docx data dictionary made of tables
//   - Paged   → a .pdf whose pages are plain running text
//
// Once a Document is built the text never changes, so every
// question and every model sees exactly the same context.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Structural kind of a document, which decides how text is extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Word-processing document whose content lives in tables
    Tabular,
    /// Page-oriented document (PDF)
    Paged,
}

impl DocumentKind {
    /// Infer the kind from a file extension (case-insensitive).
    /// Returns None for extensions we have no extractor for.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "docx" => Some(Self::Tabular),
            "pdf"  => Some(Self::Paged),
            _      => None,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tabular => write!(f, "tabular"),
            Self::Paged   => write!(f, "paged"),
        }
    }
}

/// A document whose text has already been extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// The path as configured - kept for traceability in reports
    pub source: String,

    /// Structural kind the text was extracted with
    pub kind: DocumentKind,

    /// The full extracted text
    pub text: String,
}

impl Document {
    pub fn new(source: impl Into<String>, kind: DocumentKind, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind,
            text:   text.into(),
        }
    }

    /// Blank-line separated blocks of the extracted text, in order.
    ///
    /// For tabular documents each labeled table ends up in its own
    /// block, e.g. "\nTable: A\n\nTable: B\n" → ["\nTable: A", "Table: B\n"].
    pub fn blocks(&self) -> impl Iterator<Item = &str> {
        self.text.split("\n\n")
    }
}
