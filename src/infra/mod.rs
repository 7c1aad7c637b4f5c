// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by several layers:
//
//   hub.rs           - Model file resolution
//                      Fetches config, tokenizer and weights for
//                      a model id from the HuggingFace hub (cached
//                      locally by hf-hub), or reads them from a
//                      local model directory.
//
//   config_store.rs  - Benchmark definition persistence
//                      Saves and loads BenchmarkConfig as JSON.
//
//   report_writer.rs - Result files
//                      Writes report.json and a per-question
//                      scores.csv after a benchmark run.
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Model file resolution (hf-hub or local directory)
pub mod hub;

/// Benchmark config JSON load/save
pub mod config_store;

/// JSON report and scores CSV writer
pub mod report_writer;
