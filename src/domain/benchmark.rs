// ============================================================
// Layer 3 — Benchmark Definition
// ============================================================
// What gets asked, of which document, by which models, and what
// counts as a good answer.
//
//   BenchmarkConfig
//     ├── models:          ordered list of QA model ids
//     ├── embedding_model: model used for answer similarity
//     └── documents: Vec<DocumentSpec>
//           ├── path / kind
//           └── questions: Vec<QuestionCase>
//                 ├── question
//                 ├── expected (ExpectedAnswerSet)
//                 └── context  (ContextScope)
//
// The order of `models` matters: when two models tie on average
// similarity the one listed first is reported as the best.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::document::DocumentKind;

/// Default sentence-embedding model used to compare answers.
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Which slice of a document's extracted text is handed to the
/// model as the context for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextScope {
    /// The whole extracted text
    #[default]
    Full,
    /// Only the first blank-line separated block
    FirstBlock,
    /// Every block that carries a "Table" label, concatenated
    LabeledBlocks,
}

/// A question paired positionally with the answers that count as correct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionCase {
    pub question: String,

    /// Reference answers; the best-matching one is used for scoring
    pub expected: Vec<String>,

    #[serde(default)]
    pub context: ContextScope,
}

impl QuestionCase {
    pub fn new<S: Into<String>>(
        question: impl Into<String>,
        expected: impl IntoIterator<Item = S>,
        context:  ContextScope,
    ) -> Self {
        Self {
            question: question.into(),
            expected: expected.into_iter().map(Into::into).collect(),
            context,
        }
    }
}

/// One document in the benchmark and the questions asked about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSpec {
    pub path: String,

    /// Explicit kind; inferred from the extension when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DocumentKind>,

    pub questions: Vec<QuestionCase>,
}

impl DocumentSpec {
    /// The kind to extract this document as.
    pub fn resolve_kind(&self) -> Result<DocumentKind> {
        self.kind
            .or_else(|| DocumentKind::from_path(Path::new(&self.path)))
            .ok_or_else(|| anyhow!(
                "Cannot tell the document kind of '{}'; set \"kind\" to \"tabular\" or \"paged\"",
                self.path
            ))
    }
}

/// The full benchmark: documents, questions, models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    pub documents: Vec<DocumentSpec>,
    pub models:    Vec<String>,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

impl BenchmarkConfig {
    /// Total number of questions across every document.
    pub fn question_count(&self) -> usize {
        self.documents.iter().map(|d| d.questions.len()).sum()
    }

    /// Fail early on a definition that can never run.
    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(anyhow!("Benchmark lists no models"));
        }
        for doc in &self.documents {
            doc.resolve_kind()?;
        }
        Ok(())
    }
}

/// The data-dictionary and respiratory-disease benchmark.
impl Default for BenchmarkConfig {
    fn default() -> Self {
        let docx = DocumentSpec {
            path: "DICIONARIO_DE_DADOS.docx".to_string(),
            kind: Some(DocumentKind::Tabular),
            questions: vec![
                QuestionCase::new(
                    "Qual tabela representa o indicador LFCES058?",
                    ["TB_ESTAB_BANCO"],
                    ContextScope::FirstBlock,
                ),
                QuestionCase::new(
                    "Quais campos das tabelas se repetem com maior frequência?",
                    [
                        "UNIDADE_ID", "DATA_ATU", "DT_ATUALIZACAO", "USUARIO", "CO_USUARIO",
                        "CHKSUM", "STATUS", "STATUSMOV", "DT_ATUALIZACAO_ORIGEM",
                        "DT_CMTP_INICIO", "DT_CMTP_FIM", "NU_SEQ_PROCESSO",
                    ],
                    ContextScope::LabeledBlocks,
                ),
                QuestionCase::new(
                    "Quais tabelas possuem algum elemento no campo DOMINIO?",
                    [
                        "FCESGEST", "TB_ESTABELECIMENTO", "TB_SERVICO_REFERENCIADO",
                        "TB_COLETA_SELETIVA_REJEITO", "TB_SERVICO_APOIO",
                        "TB_ATIVIDADE_PROFISSIONAL", "TB_CBO",
                    ],
                    ContextScope::LabeledBlocks,
                ),
            ],
        };

        let pdf = DocumentSpec {
            path: "doencas_respiratorias_cronicas.pdf".to_string(),
            kind: Some(DocumentKind::Paged),
            questions: vec![
                QuestionCase::new(
                    "Quais são os meios de tratar uma rinite alergica?",
                    ["beta-agonista", "alérgenos", "anti-histamínico", "corticoide", "broncodilatadores"],
                    ContextScope::Full,
                ),
                QuestionCase::new(
                    "Como corticoide pode ser utilizada e quais são suas contraindicações?",
                    [
                        "imunossupressor", "dexametasona", "gotas", "injeções", "intranasais",
                        "intramuscular", "intranasal", "perfuração", "via oral", "sedação",
                        "irritação", "sangramento",
                    ],
                    ContextScope::Full,
                ),
                QuestionCase::new(
                    "O que é tabagismo?",
                    ["nicotina", "dependência quimica à droga nicotina", "doença crônica"],
                    ContextScope::Full,
                ),
            ],
        };

        Self {
            documents: vec![docx, pdf],
            models: vec![
                "eraldoluis/faquad-bert-base-portuguese-cased".to_string(),
                "pierreguillou/bert-base-cased-squad-v1.1-portuguese".to_string(),
                "timpal0l/mdeberta-v3-base-squad2".to_string(),
            ],
            embedding_model: default_embedding_model(),
        }
    }
}
