// ============================================================
// Layer 5 — Answer Span Decoding
// ============================================================
// Turns the start/end logits of an extractive QA model into the
// best answer span.
//
//   1. Tokens outside the context (question, [CLS], [SEP]) are
//      masked with a large negative logit
//   2. Start and end logits are softmaxed independently
//   3. Every span with start ≤ end < start + max_answer_len is
//      scored as p_start · p_end
//   4. The highest-scoring span wins; its score is the confidence
//
// Reference: Devlin et al. (2019) BERT, §4.2 SQuAD

/// Maximum answer length in tokens.
pub const MAX_ANSWER_LEN: usize = 15;

const MASKED_LOGIT: f32 = -10_000.0;

/// A decoded span: token indices (inclusive) and p_start · p_end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end:   usize,
    pub score: f32,
}

/// Softmax over `logits` where `mask[i] == false` positions are excluded.
pub fn masked_softmax(logits: &[f32], mask: &[bool]) -> Vec<f32> {
    let masked: Vec<f32> = logits
        .iter()
        .zip(mask)
        .map(|(&l, &keep)| if keep { l } else { MASKED_LOGIT })
        .collect();

    let max = masked.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = masked.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return vec![0.0; logits.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}

/// Find the best valid span, or None when no token is selectable.
pub fn best_span(
    start_logits:   &[f32],
    end_logits:     &[f32],
    mask:           &[bool],
    max_answer_len: usize,
) -> Option<Span> {
    let len = start_logits.len().min(end_logits.len()).min(mask.len());
    if len == 0 || !mask[..len].iter().any(|&m| m) {
        return None;
    }

    let start_probs = masked_softmax(&start_logits[..len], &mask[..len]);
    let end_probs   = masked_softmax(&end_logits[..len], &mask[..len]);

    let mut best: Option<Span> = None;
    for s in (0..len).filter(|&s| mask[s]) {
        for e in (s..(s + max_answer_len).min(len)).filter(|&e| mask[e]) {
            let score = start_probs[s] * end_probs[e];
            if best.map_or(true, |b| score > b.score) {
                best = Some(Span { start: s, end: e, score });
            }
        }
    }
    best
}
