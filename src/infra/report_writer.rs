// ============================================================
// Layer 6 — Report Writer
// ============================================================
// Persists a finished benchmark run to a directory:
//
//   report.json - the full BenchReport (answers, all similarity
//                 scores, averages, best model)
//   scores.csv  - one row per model / document / question
//
// Example CSV output:
//   model,document,question,answer,confidence,best_similarity,best_expected,failed
//   pierreguillou/...,samples/DICIONARIO_DE_DADOS.docx,"Qual tabela ...?",TB_ESTAB_BANCO,0.9123,1.0,TB_ESTAB_BANCO,false
//
// Models that failed to load get a single row with the failure
// reason in the answer column and failed=true.

use anyhow::{Context, Result};
use serde::Serialize;
use std::{fs, path::PathBuf};

use crate::application::bench_use_case::BenchOutcome;

const CSV_HEADER: [&str; 8] = [
    "model", "document", "question", "answer",
    "confidence", "best_similarity", "best_expected", "failed",
];

/// One line of scores.csv; `None` columns are left empty.
#[derive(Debug, Serialize)]
struct ScoreRow<'a> {
    model:           &'a str,
    document:        &'a str,
    question:        &'a str,
    answer:          &'a str,
    confidence:      Option<f32>,
    best_similarity: Option<f32>,
    best_expected:   Option<&'a str>,
    failed:          bool,
}

/// Writes report files into one directory.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Create the writer; the directory is created if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create report directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn json_path(&self) -> PathBuf {
        self.dir.join("report.json")
    }

    pub fn csv_path(&self) -> PathBuf {
        self.dir.join("scores.csv")
    }

    /// Write both report.json and scores.csv.
    pub fn write(&self, outcome: &BenchOutcome) -> Result<()> {
        self.write_json(outcome)?;
        self.write_csv(outcome)?;
        tracing::info!("Report written to '{}'", self.dir.display());
        Ok(())
    }

    fn write_json(&self, outcome: &BenchOutcome) -> Result<()> {
        let path = self.json_path();
        let json = serde_json::to_string_pretty(outcome)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))
    }

    fn write_csv(&self, outcome: &BenchOutcome) -> Result<()> {
        let path = self.csv_path();
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .with_context(|| format!("Cannot create '{}'", path.display()))?;

        wtr.write_record(CSV_HEADER)?;

        for summary in &outcome.report.summaries {
            if let Some(reason) = &summary.failure {
                wtr.serialize(ScoreRow {
                    model:           &summary.model,
                    document:        "",
                    question:        "",
                    answer:          reason,
                    confidence:      None,
                    best_similarity: None,
                    best_expected:   None,
                    failed:          true,
                })?;
                continue;
            }

            let answers = outcome.runs.iter().find(|r| r.model == summary.model);

            for (doc_idx, doc) in summary.documents.iter().enumerate() {
                for (q_idx, score) in doc.scores.iter().enumerate() {
                    let response = answers.and_then(|r| r.response(doc_idx, q_idx));

                    wtr.serialize(ScoreRow {
                        model:           &summary.model,
                        document:        &doc.source,
                        question:        &score.question,
                        answer:          &score.answer,
                        confidence:      Some(response.map(|r| r.confidence).unwrap_or_default()),
                        best_similarity: Some(score.best),
                        best_expected:   score.best_expected.as_deref(),
                        failed:          response.is_some_and(|r| r.is_failed()),
                    })?;
                }
            }
        }

        wtr.flush()
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        Ok(())
    }
}
