// ============================================================
// Layer 5 — ML / Model Layer (candle)
// ============================================================
// All candle and tokenizers specific code lives here.
//
//   tokenizer.rs  - builds a Tokenizer from tokenizer.json or a
//                   WordPiece vocab.txt
//
//   span.rs       - start/end logits → best answer span
//
//   windows.rs    - strided question/context windows and mapping
//                   the best span back to context text
//
//   qa_model.rs   - pre-trained BERT / DeBERTa-v2 extractive QA model and the
//                   loader that builds one per model id
//
//   embedder.rs   - MiniLM sentence embedder and an offline
//                   hashed bag-of-words embedder
//
//   similarity.rs - cosine similarity scoring of answers against
//                   expected answers
//
// Reference: candle-transformers models::bert
//            Devlin et al. (2019) BERT

pub mod tokenizer;

pub mod span;

pub mod windows;

pub mod qa_model;

pub mod embedder;

pub mod similarity;

use anyhow::Result;
use candle_core::Device;

/// CUDA device 0 when available, unless the CPU is forced.
pub fn select_device(force_cpu: bool) -> Result<Device> {
    let device = if force_cpu { Device::Cpu } else { Device::cuda_if_available(0)? };
    tracing::info!("Running on {:?}", device);
    Ok(device)
}
