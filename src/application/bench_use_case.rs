// ============================================================
// Layer 2 — BenchUseCase
// ============================================================
// Runs the benchmark as one linear pass:
//
//   Step 1: Extract every document once         (Layer 4 - data)
//   Step 2: For each model, in configured order:
//             load → answer every question of   (Layer 5 - ml)
//             every document → release
//   Step 3: With one embedder, score each answer
//             against its expected answer set   (Layer 5 - ml)
//   Step 4: Average best-match scores per model
//             and pick the best model           (Layer 3 - domain)
//
// Failure isolation:
//   - a model that fails to load is recorded as failed and the
//     remaining models still run
//   - a single failed inference becomes a placeholder response
//     that scores 0
//   - extraction and embedding failures stop the run

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::context::select_context;
use crate::data::loader::DocumentLoader;
use crate::domain::benchmark::{BenchmarkConfig, QuestionCase};
use crate::domain::document::Document;
use crate::domain::response::{
    BenchReport, DocumentAnswers, DocumentScores, ModelOutcome, ModelResponse, ModelRun,
    ModelSummary,
};
use crate::domain::traits::{AnswererLoader, QuestionAnswerer, TextEmbedder};
use crate::ml::similarity::SimilarityScorer;

/// An extracted document together with the questions asked about it.
#[derive(Debug, Clone)]
pub struct BenchDocument {
    pub document:  Document,
    pub questions: Vec<QuestionCase>,
}

/// Everything a run produced: raw answers and the scored report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchOutcome {
    pub runs:   Vec<ModelRun>,
    pub report: BenchReport,
}

/// Which embedding backend scores the answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderChoice {
    /// The configured sentence-transformer, fetched from the hub
    MiniLm,
    /// Hashed bag-of-words; no download
    Hash,
}

/// How a benchmark run is set up, independent of the CLI.
#[derive(Debug, Clone)]
pub struct BenchOptions {
    pub config_path: Option<PathBuf>,
    pub samples_dir: PathBuf,
    pub embedder:    EmbedderChoice,
    pub report_dir:  Option<PathBuf>,
    pub force_cpu:   bool,
}

pub struct BenchUseCase {
    config: BenchmarkConfig,
}

impl BenchUseCase {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Step 1 - extract every configured document.
    pub fn load_documents(&self, loader: &DocumentLoader) -> Result<Vec<BenchDocument>> {
        let docs = loader.load_all(&self.config.documents)?;
        Ok(docs
            .into_iter()
            .zip(&self.config.documents)
            .map(|(document, spec)| BenchDocument {
                document,
                questions: spec.questions.clone(),
            })
            .collect())
    }

    /// Step 2 - run every model over every question.
    /// Each model is dropped before the next one is loaded.
    pub fn collect_answers(&self, docs: &[BenchDocument], loader: &dyn AnswererLoader) -> Vec<ModelRun> {
        self.config
            .models
            .iter()
            .map(|model_id| {
                tracing::info!("Evaluating model {}", model_id);

                let outcome = match loader.load(model_id) {
                    Ok(model) => ModelOutcome::Answered {
                        documents: answer_documents(model.as_ref(), docs),
                    },
                    Err(e) => {
                        tracing::warn!("Skipping model {}: {:#}", model_id, e);
                        ModelOutcome::Failed { reason: format!("{e:#}") }
                    }
                };

                ModelRun { model: model_id.clone(), outcome }
            })
            .collect()
    }

    /// Steps 3 and 4 - score all answers, average, rank.
    pub fn score<E: TextEmbedder>(
        &self,
        docs:   &[BenchDocument],
        runs:   Vec<ModelRun>,
        scorer: &mut SimilarityScorer<E>,
    ) -> Result<BenchOutcome> {
        let mut summaries = Vec::with_capacity(runs.len());

        for run in &runs {
            let summary = match &run.outcome {
                ModelOutcome::Failed { reason } => ModelSummary::failed(&run.model, reason),
                ModelOutcome::Answered { documents } => {
                    let scored = documents
                        .iter()
                        .zip(docs)
                        .map(|(answers, doc)| score_document(answers, doc, scorer))
                        .collect::<Result<Vec<_>>>()?;
                    ModelSummary::scored(&run.model, scored)
                }
            };

            if let Some(avg) = summary.average_similarity {
                tracing::info!("{}: average similarity {:.4}", run.model, avg);
            }
            summaries.push(summary);
        }

        let report = BenchReport::new(summaries);
        match &report.best_model {
            Some(best) => tracing::info!("Best model: {} ({:.4})", best.model, best.average_similarity),
            None       => tracing::warn!("No model produced answers"),
        }
        Ok(BenchOutcome { runs, report })
    }
}

/// Answer every question of every document with one model.
pub fn answer_documents(model: &dyn QuestionAnswerer, docs: &[BenchDocument]) -> Vec<DocumentAnswers> {
    docs.iter()
        .map(|doc| DocumentAnswers {
            source:    doc.document.source.clone(),
            responses: doc
                .questions
                .iter()
                .map(|case| {
                    let context = select_context(&doc.document, case.context);
                    answer_question(model, &case.question, &context)
                })
                .collect(),
        })
        .collect()
}

/// Ask one question; an inference error becomes a placeholder response.
pub fn answer_question(model: &dyn QuestionAnswerer, question: &str, context: &str) -> ModelResponse {
    match model.answer(question, context) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Inference failed for '{}': {:#}", question, e);
            ModelResponse::failed(question, format!("{e:#}"))
        }
    }
}

fn score_document<E: TextEmbedder>(
    answers: &DocumentAnswers,
    doc:     &BenchDocument,
    scorer:  &mut SimilarityScorer<E>,
) -> Result<DocumentScores> {
    let scores = answers
        .responses
        .iter()
        .zip(&doc.questions)
        .map(|(response, case)| scorer.score_response(response, &case.expected))
        .collect::<Result<Vec<_>>>()?;

    Ok(DocumentScores { source: answers.source.clone(), scores })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::benchmark::{ContextScope, DocumentSpec};
    use crate::domain::document::DocumentKind;
    use crate::ml::embedder::HashEmbedder;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Answers from a fixed question → answer table and records contexts.
    struct ScriptedModel {
        answers:  HashMap<String, String>,
        contexts: Rc<RefCell<Vec<String>>>,
    }

    impl QuestionAnswerer for ScriptedModel {
        fn answer(&self, question: &str, context: &str) -> Result<ModelResponse> {
            self.contexts.borrow_mut().push(context.to_string());
            self.answers
                .get(question)
                .map(|a| ModelResponse::new(question, a.clone(), 0.75))
                .ok_or_else(|| anyhow!("no answer scripted"))
        }
    }

    /// Builds ScriptedModels; ids starting with "broken" fail to load.
    struct ScriptedLoader {
        answers:  HashMap<String, HashMap<String, String>>,
        contexts: Rc<RefCell<Vec<String>>>,
        loaded:   RefCell<Vec<String>>,
    }

    impl ScriptedLoader {
        fn new(answers: &[(&str, &[(&str, &str)])]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(model, qa)| {
                        let qa = qa.iter().map(|(q, a)| (q.to_string(), a.to_string())).collect();
                        (model.to_string(), qa)
                    })
                    .collect(),
                contexts: Rc::new(RefCell::new(Vec::new())),
                loaded:   RefCell::new(Vec::new()),
            }
        }
    }

    impl AnswererLoader for ScriptedLoader {
        fn load(&self, model_id: &str) -> Result<Box<dyn QuestionAnswerer>> {
            if model_id.starts_with("broken") {
                return Err(anyhow!("unsupported architecture"));
            }
            self.loaded.borrow_mut().push(model_id.to_string());
            Ok(Box::new(ScriptedModel {
                answers:  self.answers.get(model_id).cloned().unwrap_or_default(),
                contexts: Rc::clone(&self.contexts),
            }))
        }
    }

    const Q_TABLE: &str = "Qual tabela representa o indicador LFCES058?";
    const Q_SMOKE: &str = "O que é tabagismo?";

    fn bench(models: &[&str]) -> (BenchUseCase, Vec<BenchDocument>) {
        let dict = BenchDocument {
            document: Document::new(
                "dict.docx",
                DocumentKind::Tabular,
                "\nTable: TB_ESTAB_BANCO\n\nTable: TB_CBO\n",
            ),
            questions: vec![QuestionCase::new(Q_TABLE, ["TB_ESTAB_BANCO"], ContextScope::FirstBlock)],
        };
        let pdf = BenchDocument {
            document: Document::new("resp.pdf", DocumentKind::Paged, "Tabagismo é a dependência da nicotina."),
            questions: vec![QuestionCase::new(Q_SMOKE, ["nicotina", "doença crônica"], ContextScope::Full)],
        };

        let config = BenchmarkConfig {
            documents: vec![
                DocumentSpec { path: "dict.docx".into(), kind: None, questions: dict.questions.clone() },
                DocumentSpec { path: "resp.pdf".into(), kind: None, questions: pdf.questions.clone() },
            ],
            models: models.iter().map(|m| m.to_string()).collect(),
            embedding_model: "hash".to_string(),
        };
        (BenchUseCase::new(config), vec![dict, pdf])
    }

    #[test]
    fn test_exact_answer_scores_one() {
        let (uc, docs) = bench(&["m"]);
        let loader = ScriptedLoader::new(&[("m", &[(Q_TABLE, "TB_ESTAB_BANCO"), (Q_SMOKE, "nicotina")])]);

        let runs = uc.collect_answers(&docs, &loader);
        let mut scorer = SimilarityScorer::new(HashEmbedder::default());
        let outcome = uc.score(&docs, runs, &mut scorer).unwrap();

        let summary = &outcome.report.summaries[0];
        let first = &summary.documents[0].scores[0];
        assert!((first.best - 1.0).abs() < 1e-5);
        assert_eq!(first.best_expected.as_deref(), Some("TB_ESTAB_BANCO"));
        assert!((summary.average_similarity.unwrap() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_questions_get_their_scoped_context() {
        let (uc, docs) = bench(&["m"]);
        let loader = ScriptedLoader::new(&[("m", &[(Q_TABLE, "x"), (Q_SMOKE, "y")])]);

        uc.collect_answers(&docs, &loader);

        let contexts = loader.contexts.borrow();
        assert_eq!(contexts[0], "\nTable: TB_ESTAB_BANCO");
        assert_eq!(contexts[1], "Tabagismo é a dependência da nicotina.");
    }

    #[test]
    fn test_responses_keep_question_order_per_document() {
        let (uc, docs) = bench(&["m"]);
        let loader = ScriptedLoader::new(&[("m", &[(Q_TABLE, "a"), (Q_SMOKE, "b")])]);

        let runs = uc.collect_answers(&docs, &loader);
        assert_eq!(runs[0].response(0, 0).unwrap().question, Q_TABLE);
        assert_eq!(runs[0].response(1, 0).unwrap().question, Q_SMOKE);
        assert!(runs[0].response(1, 1).is_none());
    }

    #[test]
    fn test_failed_model_does_not_stop_siblings() {
        let (uc, docs) = bench(&["broken-model", "m"]);
        let loader = ScriptedLoader::new(&[("m", &[(Q_TABLE, "TB_ESTAB_BANCO"), (Q_SMOKE, "nicotina")])]);

        let runs = uc.collect_answers(&docs, &loader);
        assert!(matches!(runs[0].outcome, ModelOutcome::Failed { .. }));
        assert_eq!(*loader.loaded.borrow(), vec!["m".to_string()]);

        let mut scorer = SimilarityScorer::new(HashEmbedder::default());
        let outcome = uc.score(&docs, runs, &mut scorer).unwrap();
        assert!(outcome.report.summaries[0].failure.is_some());
        assert_eq!(outcome.report.best_model.unwrap().model, "m");
    }

    #[test]
    fn test_inference_failure_is_recorded_and_scores_zero() {
        let (uc, docs) = bench(&["m"]);
        // No answer scripted for Q_SMOKE → the model errors on it
        let loader = ScriptedLoader::new(&[("m", &[(Q_TABLE, "TB_ESTAB_BANCO")])]);

        let runs = uc.collect_answers(&docs, &loader);
        assert!(runs[0].response(1, 0).unwrap().is_failed());

        let mut scorer = SimilarityScorer::new(HashEmbedder::default());
        let outcome = uc.score(&docs, runs, &mut scorer).unwrap();
        let avg = outcome.report.summaries[0].average_similarity.unwrap();
        assert!((avg - 0.5).abs() < 1e-5, "got {avg}");
    }

    #[test]
    fn test_better_model_ranked_first_and_ties_go_to_first() {
        let (uc, docs) = bench(&["a", "b", "c"]);
        let loader = ScriptedLoader::new(&[
            ("a", &[(Q_TABLE, "TB_CBO"), (Q_SMOKE, "asma")]),
            ("b", &[(Q_TABLE, "TB_ESTAB_BANCO"), (Q_SMOKE, "nicotina")]),
            ("c", &[(Q_TABLE, "TB_ESTAB_BANCO"), (Q_SMOKE, "nicotina")]),
        ]);

        let runs = uc.collect_answers(&docs, &loader);
        let mut scorer = SimilarityScorer::new(HashEmbedder::default());
        let outcome = uc.score(&docs, runs, &mut scorer).unwrap();

        assert_eq!(outcome.report.best_model.unwrap().model, "b");
    }

    #[test]
    fn test_all_models_failing_gives_no_best() {
        let (uc, docs) = bench(&["broken-1", "broken-2"]);
        let loader = ScriptedLoader::new(&[]);

        let runs = uc.collect_answers(&docs, &loader);
        let mut scorer = SimilarityScorer::new(HashEmbedder::default());
        let outcome = uc.score(&docs, runs, &mut scorer).unwrap();
        assert!(outcome.report.best_model.is_none());
    }
}
