// ============================================================
// Layer 3 — Responses, Scores and Summaries
// ============================================================
// The records produced while a benchmark runs:
//
//   ModelResponse    - one answer to one question (per model, per document)
//   SimilarityResult - one (score, expected answer) comparison
//   QuestionScore    - every comparison for one answer, best first
//   ModelRun         - everything one model answered, or why it could not
//   ModelSummary     - a ModelRun after scoring, with its average
//   BenchReport      - all summaries plus the best model
//
// Nothing here is mutated after construction; the driver builds
// the records in order and hands them to the report layer.

use serde::{Deserialize, Serialize};

/// One answer produced by a model for a (question, context) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub question: String,
    pub answer:   String,

    /// Model-reported certainty in [0, 1]; informational only
    pub confidence: f32,

    /// Set when inference failed and this is a placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl ModelResponse {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, confidence: f32) -> Self {
        Self {
            question:   question.into(),
            answer:     answer.into(),
            confidence,
            failure:    None,
        }
    }

    /// Placeholder recorded when inference raised an error.
    pub fn failed(question: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            question:   question.into(),
            answer:     String::new(),
            confidence: 0.0,
            failure:    Some(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Similarity between a model answer and one expected answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub score:    f32,
    pub expected: String,
}

/// All comparisons for one answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionScore {
    pub question: String,
    pub answer:   String,

    /// Every expected answer with its similarity, highest first
    pub ranked: Vec<SimilarityResult>,

    /// Highest similarity (0 when there is nothing to compare against)
    pub best: f32,

    /// The expected answer that achieved `best`
    pub best_expected: Option<String>,
}

/// The answers one model gave for one document, in question order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnswers {
    pub source:    String,
    pub responses: Vec<ModelResponse>,
}

/// Scored answers for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentScores {
    pub source: String,
    pub scores: Vec<QuestionScore>,
}

/// What came out of running one model over every document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelOutcome {
    Answered { documents: Vec<DocumentAnswers> },
    Failed   { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRun {
    pub model:   String,
    pub outcome: ModelOutcome,
}

impl ModelRun {
    /// The response to question `question` of document `document`, if answered.
    pub fn response(&self, document: usize, question: usize) -> Option<&ModelResponse> {
        match &self.outcome {
            ModelOutcome::Answered { documents } => documents.get(document)?.responses.get(question),
            ModelOutcome::Failed { .. } => None,
        }
    }
}

/// A model's scored results and its average best-match similarity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model: String,

    pub documents: Vec<DocumentScores>,

    /// Mean of per-question best scores across all documents;
    /// None when the model failed to load
    pub average_similarity: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl ModelSummary {
    /// Build a summary from scored documents, computing the average.
    pub fn scored(model: impl Into<String>, documents: Vec<DocumentScores>) -> Self {
        let bests: Vec<f32> = documents
            .iter()
            .flat_map(|d| d.scores.iter().map(|s| s.best))
            .collect();
        Self {
            model:              model.into(),
            documents,
            average_similarity: Some(mean(&bests)),
            failure:            None,
        }
    }

    pub fn failed(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            model:              model.into(),
            documents:          Vec::new(),
            average_similarity: None,
            failure:            Some(reason.into()),
        }
    }
}

/// The model that won, and its average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestModel {
    pub model:              String,
    pub average_similarity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    pub summaries:  Vec<ModelSummary>,
    pub best_model: Option<BestModel>,
}

impl BenchReport {
    pub fn new(summaries: Vec<ModelSummary>) -> Self {
        let best_model = select_best(&summaries);
        Self { summaries, best_model }
    }
}

/// Arithmetic mean; an empty slice averages to 0.
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Pick the model with the strictly highest average.
///
/// The running maximum starts below any valid score and only a
/// strictly greater average replaces it, so on equal averages the
/// model listed first wins. Failed models never win.
pub fn select_best(summaries: &[ModelSummary]) -> Option<BestModel> {
    let mut best: Option<BestModel> = None;
    let mut highest = f32::NEG_INFINITY;

    for summary in summaries {
        let Some(avg) = summary.average_similarity else { continue };
        if avg > highest {
            highest = avg;
            best = Some(BestModel {
                model:              summary.model.clone(),
                average_similarity: avg,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_bests(source: &str, bests: &[f32]) -> DocumentScores {
        DocumentScores {
            source: source.to_string(),
            scores: bests
                .iter()
                .map(|&b| QuestionScore {
                    question:      "q".to_string(),
                    answer:        "a".to_string(),
                    ranked:        Vec::new(),
                    best:          b,
                    best_expected: None,
                })
                .collect(),
        }
    }

    fn summary(model: &str, avg: f32) -> ModelSummary {
        ModelSummary::scored(model, vec![doc_with_bests("d", &[avg])])
    }

    #[test]
    fn test_average_across_two_documents() {
        let s = ModelSummary::scored(
            "m",
            vec![
                doc_with_bests("a.docx", &[0.9, 0.7, 0.5]),
                doc_with_bests("b.pdf",  &[0.8, 0.6, 0.4]),
            ],
        );
        let avg = s.average_similarity.unwrap();
        assert!((avg - 0.65).abs() < 1e-6, "got {avg}");
    }

    #[test]
    fn test_average_with_no_questions_is_zero() {
        let s = ModelSummary::scored("m", Vec::new());
        assert_eq!(s.average_similarity, Some(0.0));
    }

    #[test]
    fn test_highest_average_wins() {
        let best = select_best(&[summary("A", 0.8), summary("B", 0.6)]).unwrap();
        assert_eq!(best.model, "A");
    }

    #[test]
    fn test_first_model_wins_tie() {
        let best = select_best(&[summary("A", 0.7), summary("B", 0.7)]).unwrap();
        assert_eq!(best.model, "A");
    }

    #[test]
    fn test_failed_models_are_skipped() {
        let summaries = vec![
            ModelSummary::failed("A", "no weights"),
            summary("B", -1.0),
        ];
        let best = select_best(&summaries).unwrap();
        assert_eq!(best.model, "B");
        assert!(select_best(&[ModelSummary::failed("A", "x")]).is_none());
    }

    #[test]
    fn test_failed_response_sentinel() {
        let r = ModelResponse::failed("Q?", "tokenizer exploded");
        assert!(r.is_failed());
        assert_eq!(r.answer, "");
        assert_eq!(r.confidence, 0.0);
    }
}
