// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap, wires the concrete
// backends together and prints results. The benchmark steps
// themselves live in Layer 2 (application).
//
// Commands:
//   1. `bench`       - extract, answer, score, rank
//   2. `extract`     - show the text a document yields
//   3. `ask`         - answer one ad-hoc question
//   4. `init-config` - dump the built-in benchmark as JSON

pub mod commands;
pub mod report;

use anyhow::{bail, Result};
use clap::Parser;
use commands::{AskArgs, Commands, ExtractArgs, InitConfigArgs};
use std::io::{self, Write};

use crate::application::ask_use_case::AskUseCase;
use crate::application::bench_use_case::{BenchOptions, BenchUseCase, EmbedderChoice};
use crate::data::loader::{load_path, DocumentLoader};
use crate::domain::benchmark::BenchmarkConfig;
use crate::domain::document::DocumentKind;
use crate::domain::traits::TextEmbedder;
use crate::infra::config_store::ConfigStore;
use crate::infra::hub::ModelHub;
use crate::infra::report_writer::ReportWriter;
use crate::ml::embedder::{HashEmbedder, MiniLmEmbedder};
use crate::ml::qa_model::CandleQaLoader;
use crate::ml::select_device;
use crate::ml::similarity::SimilarityScorer;

#[derive(Parser, Debug)]
#[command(
    name = "qa-model-bench",
    version,
    about = "Benchmark extractive QA models on .docx tables and .pdf text."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the selected command.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Bench(args)      => run_bench(args.into()),
            Commands::Extract(args)    => run_extract(args),
            Commands::Ask(args)        => run_ask(args),
            Commands::InitConfig(args) => run_init_config(args),
        }
    }
}

fn run_bench(opts: BenchOptions) -> Result<()> {
    let config = match &opts.config_path {
        Some(path) => ConfigStore::load(path)?,
        None       => BenchmarkConfig::default(),
    };
    tracing::info!(
        "Benchmark: {} documents, {} questions, {} models",
        config.documents.len(),
        config.question_count(),
        config.models.len()
    );

    let use_case = BenchUseCase::new(config);
    let docs = use_case.load_documents(&DocumentLoader::new(&opts.samples_dir))?;

    let device = select_device(opts.force_cpu)?;
    let qa_loader = CandleQaLoader::new(ModelHub::new()?, device.clone());
    let runs = use_case.collect_answers(&docs, &qa_loader);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::render_answers(&mut out, &runs)?;

    let embedder: Box<dyn TextEmbedder> = match opts.embedder {
        EmbedderChoice::MiniLm => {
            let model_id = &use_case.config().embedding_model;
            tracing::info!("Loading embedding model {}", model_id);
            let files = ModelHub::new()?.fetch(model_id)?;
            Box::new(MiniLmEmbedder::load(&files, &device)?)
        }
        EmbedderChoice::Hash => Box::new(HashEmbedder::default()),
    };
    let mut scorer = SimilarityScorer::new(embedder);
    let outcome = use_case.score(&docs, runs, &mut scorer)?;

    report::render_similarities(&mut out, &outcome)?;
    report::render_summary(&mut out, &outcome)?;
    out.flush()?;

    if let Some(dir) = &opts.report_dir {
        ReportWriter::new(dir)?.write(&outcome)?;
    }
    Ok(())
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let Some(kind) = DocumentKind::from_path(&args.path) else {
        bail!("'{}' is neither a .docx nor a .pdf file", args.path.display());
    };
    let doc = load_path(&args.path, kind)?;
    println!("{}", doc.text);
    Ok(())
}

fn run_ask(args: AskArgs) -> Result<()> {
    let loader = CandleQaLoader::new(ModelHub::new()?, select_device(args.cpu)?);
    let response = AskUseCase::new(&loader).answer(&args.model, &args.document, &args.question)?;

    println!("\nQuestion: {}", response.question);
    println!("Answer: {:?} ({:.2})", response.answer, response.confidence);
    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<()> {
    ConfigStore::save(&BenchmarkConfig::default(), &args.out)?;
    println!("Wrote benchmark definition to {}", args.out.display());
    Ok(())
}
