// ============================================================
// Layer 1 — Console Report
// ============================================================
// Renders a benchmark run as plain text in three sections:
//
//   1. Answers     - every model's answer per document/question
//   2. Similarity  - each answer against its expected answers,
//                    highest similarity first
//   3. Summary     - per-question best scores, per-model
//                    averages and the best model
//
// Everything writes to `impl Write` so tests can render into a
// Vec<u8>; the CLI passes a locked stdout.

use std::io::{self, Write};

use crate::application::bench_use_case::BenchOutcome;
use crate::domain::response::{ModelOutcome, ModelResponse, ModelRun};

pub fn render_answers(out: &mut impl Write, runs: &[ModelRun]) -> io::Result<()> {
    for run in runs {
        writeln!(out, "Model: {}\n", run.model)?;

        match &run.outcome {
            ModelOutcome::Failed { reason } => {
                writeln!(out, "- Model could not be loaded: {reason}\n")?;
            }
            ModelOutcome::Answered { documents } => {
                for doc in documents {
                    writeln!(out, "Document: {}\n", doc.source)?;
                    for response in &doc.responses {
                        render_response(out, response)?;
                    }
                    writeln!(out)?;
                }
            }
        }
    }
    Ok(())
}

fn render_response(out: &mut impl Write, response: &ModelResponse) -> io::Result<()> {
    writeln!(out, "Question: {}", response.question)?;
    match &response.failure {
        Some(reason) => writeln!(out, "- Answer: <failed: {reason}>")?,
        None => writeln!(out, "- Answer: {:?} ({:.2})", response.answer, response.confidence)?,
    }
    writeln!(out)
}

pub fn render_similarities(out: &mut impl Write, outcome: &BenchOutcome) -> io::Result<()> {
    for summary in &outcome.report.summaries {
        writeln!(out, "Model Name: {}", summary.model)?;
        if summary.failure.is_some() {
            writeln!(out, "- not scored\n")?;
            continue;
        }

        for doc in &summary.documents {
            writeln!(out, "Document: {}\n", doc.source)?;
            for score in &doc.scores {
                writeln!(out, "Question: {}", score.question)?;
                writeln!(out, "Model response: {:?}\n", score.answer)?;
                for result in &score.ranked {
                    writeln!(out, "- Expected: {} ({:.4}%)", result.expected, result.score * 100.0)?;
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

pub fn render_summary(out: &mut impl Write, outcome: &BenchOutcome) -> io::Result<()> {
    writeln!(out, "--- Model Performance Summary ---")?;

    for summary in &outcome.report.summaries {
        writeln!(out, "\nModel Name: {}", summary.model)?;

        if let Some(reason) = &summary.failure {
            writeln!(out, "  Failed to load: {reason}")?;
            continue;
        }

        for doc in &summary.documents {
            writeln!(out, "\nDocument: {}", doc.source)?;
            for score in &doc.scores {
                writeln!(
                    out,
                    "  Question: {} - Max Cosine Similarity: {:.4}",
                    score.question, score.best
                )?;
            }
        }

        if let Some(avg) = summary.average_similarity {
            writeln!(out, "\nAverage Cosine Similarity for {}: {:.4}", summary.model, avg)?;
        }
    }

    writeln!(out, "\n--- Best Model ---")?;
    match &outcome.report.best_model {
        Some(best) => writeln!(
            out,
            "The model with the highest average cosine similarity is: {} ({:.4})",
            best.model, best.average_similarity
        ),
        None => writeln!(out, "No model produced answers."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::response::{
        BenchReport, DocumentAnswers, DocumentScores, ModelSummary, QuestionScore,
        SimilarityResult,
    };

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn outcome() -> BenchOutcome {
        let runs = vec![
            ModelRun {
                model:   "good".to_string(),
                outcome: ModelOutcome::Answered {
                    documents: vec![DocumentAnswers {
                        source:    "doc.pdf".to_string(),
                        responses: vec![
                            ModelResponse::new("Q1?", "asma", 0.876),
                            ModelResponse::failed("Q2?", "boom"),
                        ],
                    }],
                },
            },
            ModelRun {
                model:   "broken".to_string(),
                outcome: ModelOutcome::Failed { reason: "no weights".to_string() },
            },
        ];

        let scores = vec![
            QuestionScore {
                question:      "Q1?".to_string(),
                answer:        "asma".to_string(),
                ranked:        vec![
                    SimilarityResult { score: 1.0, expected: "asma".to_string() },
                    SimilarityResult { score: 0.25, expected: "rinite".to_string() },
                ],
                best:          1.0,
                best_expected: Some("asma".to_string()),
            },
            QuestionScore {
                question:      "Q2?".to_string(),
                answer:        String::new(),
                ranked:        Vec::new(),
                best:          0.0,
                best_expected: None,
            },
        ];
        let summaries = vec![
            ModelSummary::scored("good", vec![DocumentScores { source: "doc.pdf".to_string(), scores }]),
            ModelSummary::failed("broken", "no weights"),
        ];
        BenchOutcome { runs, report: BenchReport::new(summaries) }
    }

    #[test]
    fn test_answers_section() {
        let text = render(|b| render_answers(b, &outcome().runs));
        assert!(text.contains("Model: good\n"));
        assert!(text.contains("- Answer: \"asma\" (0.88)"));
        assert!(text.contains("- Answer: <failed: boom>"));
        assert!(text.contains("- Model could not be loaded: no weights"));
    }

    #[test]
    fn test_similarity_section_lists_ranked_expected() {
        let text = render(|b| render_similarities(b, &outcome()));
        let first  = text.find("- Expected: asma (100.0000%)").unwrap();
        let second = text.find("- Expected: rinite (25.0000%)").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_summary_announces_best_model() {
        let text = render(|b| render_summary(b, &outcome()));
        assert!(text.contains("  Question: Q1? - Max Cosine Similarity: 1.0000"));
        assert!(text.contains("Average Cosine Similarity for good: 0.5000"));
        assert!(text.contains("  Failed to load: no weights"));
        assert!(text.ends_with(
            "The model with the highest average cosine similarity is: good (0.5000)\n"
        ));
    }

    #[test]
    fn test_summary_without_best_model() {
        let outcome = BenchOutcome {
            runs:   Vec::new(),
            report: BenchReport::new(vec![ModelSummary::failed("broken", "x")]),
        };
        let text = render(|b| render_summary(b, &outcome));
        assert!(text.ends_with("No model produced answers.\n"));
    }
}
