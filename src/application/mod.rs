// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers; no ML math and no printing here.
//
//   bench_use_case.rs - the full benchmark: extract documents,
//                       collect every model's answers, score
//                       them, aggregate and rank
//
//   ask_use_case.rs   - one ad-hoc question against one model
//                       and one document
//
// Reference: Clean Architecture pattern

// The benchmark workflow
pub mod bench_use_case;

// The single-question workflow
pub mod ask_use_case;
