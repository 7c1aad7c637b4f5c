// ============================================================
// Layer 5 — Similarity Scorer
// ============================================================
// Compares a model answer with expected answers by cosine
// similarity of their embeddings.
//
//   score(expected, candidate)  → cosine in [-1, 1]
//   rank(candidate, expected)   → every comparison, highest first
//   best_match(candidate, set)  → (max score, which expected answer)
//
// Tie rules: best_match keeps the first maximal expected answer in
// set order, and rank uses a stable sort so equal scores keep
// their set order too.
//
// Embeddings are cached per text: the same expected answers are
// compared against every model's answers.

use anyhow::Result;
use std::collections::HashMap;

use crate::domain::response::{ModelResponse, QuestionScore, SimilarityResult};
use crate::domain::traits::TextEmbedder;

pub struct SimilarityScorer<E: TextEmbedder> {
    embedder: E,
    cache:    HashMap<String, Vec<f32>>,
}

impl<E: TextEmbedder> SimilarityScorer<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder, cache: HashMap::new() }
    }

    fn embedding(&mut self, text: &str) -> Result<Vec<f32>> {
        if let Some(v) = self.cache.get(text) {
            return Ok(v.clone());
        }
        let v = self.embedder.embed(text)?;
        self.cache.insert(text.to_string(), v.clone());
        Ok(v)
    }

    /// Cosine similarity between the embeddings of two texts.
    pub fn score(&mut self, expected: &str, candidate: &str) -> Result<f32> {
        let a = self.embedding(expected)?;
        let b = self.embedding(candidate)?;
        Ok(cosine_similarity(&a, &b))
    }

    /// Score `candidate` against every expected answer, highest first.
    pub fn rank(&mut self, candidate: &str, expected: &[String]) -> Result<Vec<SimilarityResult>> {
        let mut results = expected
            .iter()
            .map(|e| {
                Ok(SimilarityResult {
                    score:    self.score(e, candidate)?,
                    expected: e.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // sort_by is stable: equal scores keep their set order
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(results)
    }

    /// Highest similarity and the expected answer that achieved it.
    /// An empty set gives (0.0, None).
    pub fn best_match(&mut self, candidate: &str, expected: &[String]) -> Result<(f32, Option<String>)> {
        let mut best: Option<(f32, &String)> = None;
        for e in expected {
            let s = self.score(e, candidate)?;
            if best.map_or(true, |(b, _)| s > b) {
                best = Some((s, e));
            }
        }
        Ok(match best {
            Some((s, e)) => (s, Some(e.clone())),
            None         => (0.0, None),
        })
    }

    /// Full scoring record for one model response.
    /// Failed responses score 0 without touching the embedder.
    pub fn score_response(&mut self, response: &ModelResponse, expected: &[String]) -> Result<QuestionScore> {
        let (ranked, best, best_expected) = if response.is_failed() {
            let ranked = expected
                .iter()
                .map(|e| SimilarityResult { score: 0.0, expected: e.clone() })
                .collect();
            (ranked, 0.0, None)
        } else {
            let ranked = self.rank(&response.answer, expected)?;
            let (best, best_expected) = self.best_match(&response.answer, expected)?;
            (ranked, best, best_expected)
        };

        Ok(QuestionScore {
            question: response.question.clone(),
            answer:   response.answer.clone(),
            ranked,
            best,
            best_expected,
        })
    }
}

/// Cosine similarity clamped to [-1, 1].
/// Mismatched, empty or zero-length vectors give 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot / (na * nb)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::embedder::HashEmbedder;
    use std::cell::Cell;

    /// Embeds text as a fixed vector looked up by exact text.
    struct TableEmbedder {
        table: Vec<(&'static str, Vec<f32>)>,
        calls: Cell<usize>,
    }

    impl TextEmbedder for TableEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.set(self.calls.get() + 1);
            self.table
                .iter()
                .find(|(t, _)| *t == text)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| anyhow::anyhow!("unknown text {text}"))
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_answer_is_one() {
        let mut scorer = SimilarityScorer::new(HashEmbedder::default());
        let s = scorer.score("TB_ESTAB_BANCO", "TB_ESTAB_BANCO").unwrap();
        assert!((s - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_best_match_of_empty_set_is_zero() {
        let mut scorer = SimilarityScorer::new(HashEmbedder::default());
        assert_eq!(scorer.best_match("anything", &[]).unwrap(), (0.0, None));
    }

    #[test]
    fn test_best_match_first_max_wins() {
        let embedder = TableEmbedder {
            table: vec![
                ("answer", vec![1.0, 0.0]),
                ("x",      vec![0.0, 1.0]),
                ("y",      vec![1.0, 0.0]),
                ("z",      vec![2.0, 0.0]),
            ],
            calls: Cell::new(0),
        };
        let mut scorer = SimilarityScorer::new(embedder);
        let (best, which) = scorer.best_match("answer", &strings(&["x", "y", "z"])).unwrap();
        assert!((best - 1.0).abs() < 1e-6);
        assert_eq!(which.as_deref(), Some("y"));
    }

    #[test]
    fn test_rank_sorts_descending_and_stably() {
        let embedder = TableEmbedder {
            table: vec![
                ("answer", vec![1.0, 0.0]),
                ("low",    vec![0.0, 1.0]),
                ("high1",  vec![1.0, 0.0]),
                ("high2",  vec![3.0, 0.0]),
            ],
            calls: Cell::new(0),
        };
        let mut scorer = SimilarityScorer::new(embedder);
        let ranked = scorer.rank("answer", &strings(&["low", "high1", "high2"])).unwrap();
        let order: Vec<&str> = ranked.iter().map(|r| r.expected.as_str()).collect();
        assert_eq!(order, vec!["high1", "high2", "low"]);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let mut scorer = SimilarityScorer::new(HashEmbedder::new(16));
        let expected = strings(&["nicotina", "doença crônica", "", "dependência quimica à droga nicotina"]);
        for r in scorer.rank("A nicotina causa dependência", &expected).unwrap() {
            assert!((-1.0..=1.0).contains(&r.score), "{} out of range", r.score);
        }
    }

    #[test]
    fn test_embeddings_are_cached() {
        let embedder = TableEmbedder {
            table: vec![("a", vec![1.0]), ("b", vec![1.0])],
            calls: Cell::new(0),
        };
        let mut scorer = SimilarityScorer::new(embedder);
        scorer.score("a", "b").unwrap();
        scorer.score("a", "b").unwrap();
        assert_eq!(scorer.embedder.calls.get(), 2);
    }

    #[test]
    fn test_failed_response_scores_zero_without_embedding() {
        let embedder = TableEmbedder { table: Vec::new(), calls: Cell::new(0) };
        let mut scorer = SimilarityScorer::new(embedder);
        let response = ModelResponse::failed("Q?", "boom");
        let score = scorer.score_response(&response, &strings(&["A", "B"])).unwrap();
        assert_eq!(score.best, 0.0);
        assert_eq!(score.ranked.len(), 2);
        assert_eq!(scorer.embedder.calls.get(), 0);
    }

    #[test]
    fn test_cosine_edge_cases() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-6);
    }
}
