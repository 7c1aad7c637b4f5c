// ============================================================
// Layer 5 — Context Windows
// ============================================================
// Splits a (question, context) pair into model-sized windows and
// maps the winning token span back to context text:
//
//   [CLS] question [SEP] context[0..n]        [SEP]   window 0
//   [CLS] question [SEP] context[n-stride..]  [SEP]   window 1
//   ...
//
// The question is never truncated. The context budget of a window
// is max_len minus the question and special tokens; the stride is
// narrowed when a long question leaves less than two strides of
// budget, and a question that leaves no budget at all is an error.
//
// Offsets of context tokens are byte offsets into the context
// string, so answers are cut straight out of it.

use anyhow::{anyhow, bail, Result};
use tokenizers::utils::truncation::{TruncationDirection, TruncationParams, TruncationStrategy};
use tokenizers::{Encoding, PostProcessor, Tokenizer};

use crate::ml::span::{best_span, MAX_ANSWER_LEN};

/// Window size and overlap, in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowParams {
    /// Tokens per window, question and special tokens included
    pub max_len: usize,
    /// Context tokens shared by consecutive windows
    pub stride:  usize,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self { max_len: 384, stride: 128 }
    }
}

/// An answer cut out of the context.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text:   String,
    /// p_start · p_end of the winning span
    pub score:  f32,
    /// Index of the window the span came from
    pub window: usize,
}

/// Truncate only the context, overflowing into strided windows.
pub fn configure_truncation(tokenizer: &mut Tokenizer, params: WindowParams) -> Result<()> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: params.max_len,
            strategy:   TruncationStrategy::OnlySecond,
            stride:     params.stride,
            direction:  TruncationDirection::Right,
        }))
        .map_err(|e| anyhow!("Cannot configure truncation: {e}"))?;
    Ok(())
}

/// Encode the pair into one encoding per window.
///
/// `tokenizer` must have been set up with `configure_truncation(params)`.
pub fn encode_windows(
    tokenizer: &Tokenizer,
    params:    WindowParams,
    question:  &str,
    context:   &str,
) -> Result<Vec<Encoding>> {
    let question_len = tokenizer
        .encode(question, false)
        .map_err(|e| anyhow!("Cannot tokenise question: {e}"))?
        .len();
    let special = tokenizer.get_post_processor().map_or(0, |p| p.added_tokens(true));

    let budget = params.max_len.saturating_sub(question_len + special);
    if budget < 2 {
        bail!(
            "Question is too long: {} tokens leave no room for context in a {}-token window",
            question_len,
            params.max_len
        );
    }

    let stride = params.stride.min(budget / 2);
    let encoded = if stride == params.stride {
        tokenizer.encode((question, context), true)
    } else {
        tracing::debug!("Long question ({} tokens): stride narrowed to {}", question_len, stride);
        let mut narrowed = tokenizer.clone();
        configure_truncation(&mut narrowed, WindowParams { stride, ..params })?;
        narrowed.encode((question, context), true)
    };
    let mut encoding = encoded.map_err(|e| anyhow!("Tokenisation failed: {e}"))?;

    let mut windows = encoding.take_overflowing();
    windows.insert(0, encoding);
    Ok(windows)
}

/// True for tokens that belong to the context (sequence 1).
pub fn context_mask(window: &Encoding) -> Vec<bool> {
    window
        .get_sequence_ids()
        .iter()
        .map(|s| *s == Some(1))
        .collect()
}

/// Pick the best span over all windows and cut its text from `context`.
///
/// `logits[i]` holds the (start, end) logits of `windows[i]`. On equal
/// scores the earlier window wins.
pub fn select_answer(
    context: &str,
    windows: &[Encoding],
    logits:  &[(Vec<f32>, Vec<f32>)],
) -> Option<Answer> {
    let mut best: Option<(usize, usize, usize, f32)> = None;

    for (i, (window, (start, end))) in windows.iter().zip(logits).enumerate() {
        let Some(span) = best_span(start, end, &context_mask(window), MAX_ANSWER_LEN) else {
            continue;
        };
        if best.map_or(true, |(_, _, _, score)| span.score > score) {
            best = Some((i, span.start, span.end, span.score));
        }
    }

    let (window, start, end, score) = best?;
    let offsets = windows[window].get_offsets();
    let (byte_start, _) = offsets[start];
    let (_, byte_end)   = offsets[end];

    let text = context.get(byte_start..byte_end).unwrap_or_default().trim().to_string();
    Some(Answer { text, score, window })
}
