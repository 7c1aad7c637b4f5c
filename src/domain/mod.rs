// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing the benchmark:
// documents, questions, model responses, scores and the
// collaborator traits the other layers implement.
//
// Rules for this layer:
//   - NO candle / tokenizers types
//   - NO file I/O or network calls
//   - Only data and abstractions
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A document and the text extracted from it
pub mod document;

// Questions, expected answers and the benchmark definition
pub mod benchmark;

// Model responses, similarity results and per-model summaries
pub mod response;

// Core abstractions (traits) that other layers implement
pub mod traits;
