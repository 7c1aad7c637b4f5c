// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Four subcommands:
//   bench        - run every model over the benchmark and rank them
//   extract      - print the text extracted from one document
//   ask          - one question, one model, one document
//   init-config  - write the built-in benchmark as editable JSON

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::bench_use_case::{BenchOptions, EmbedderChoice};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Benchmark QA models against the expected answers
    Bench(BenchArgs),

    /// Print the text extracted from a .docx or .pdf file
    Extract(ExtractArgs),

    /// Ask a single question about a document
    Ask(AskArgs),

    /// Write the built-in benchmark definition to a JSON file
    InitConfig(InitConfigArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum EmbedderKind {
    /// Sentence-transformer from the hub (see embedding_model in the config)
    Minilm,
    /// Hashed bag-of-words, works offline
    Hash,
}

impl From<EmbedderKind> for EmbedderChoice {
    fn from(k: EmbedderKind) -> Self {
        match k {
            EmbedderKind::Minilm => EmbedderChoice::MiniLm,
            EmbedderKind::Hash   => EmbedderChoice::Hash,
        }
    }
}

#[derive(Args, Debug)]
pub struct BenchArgs {
    /// Benchmark definition (JSON); the built-in benchmark when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base directory for relative document paths
    #[arg(long, default_value = "samples")]
    pub samples_dir: PathBuf,

    /// Embedding backend used for scoring
    #[arg(long, value_enum, default_value_t = EmbedderKind::Minilm)]
    pub embedder: EmbedderKind,

    /// Also write report.json and scores.csv to this directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Stay on the CPU even if CUDA is available
    #[arg(long)]
    pub cpu: bool,
}

impl From<BenchArgs> for BenchOptions {
    fn from(a: BenchArgs) -> Self {
        BenchOptions {
            config_path: a.config,
            samples_dir: a.samples_dir,
            embedder:    a.embedder.into(),
            report_dir:  a.report_dir,
            force_cpu:   a.cpu,
        }
    }
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// The .docx or .pdf file to extract
    #[arg(long)]
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Model id on the HuggingFace hub, or a local model directory
    #[arg(long)]
    pub model: String,

    /// The .docx or .pdf file used as context
    #[arg(long)]
    pub document: PathBuf,

    /// The question to answer
    #[arg(long)]
    pub question: String,

    /// Stay on the CPU even if CUDA is available
    #[arg(long)]
    pub cpu: bool,
}

#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Where to write the JSON file
    #[arg(long, default_value = "bench.json")]
    pub out: PathBuf,
}
