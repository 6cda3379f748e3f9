use anyhow::{Context, Result};
use clap::Parser;
use query::{answer, run, Mode};
use sift_core::persist::IndexPaths;
use sift_core::{Collection, NormalizerConfig, QueryProcessor, QuerySession, VectorOptions};
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "query")]
#[command(about = "Answer Boolean or ranked queries against a built index", long_about = None)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: String,
    /// Corpus used to build the index, for result titles
    #[arg(long)]
    corpus: Option<String>,
    /// Retrieval model
    #[arg(long, value_enum, default_value_t = Mode::Vector)]
    mode: Mode,
    /// Number of ranked results (vector mode)
    #[arg(long, default_value_t = 10)]
    k: usize,
    /// Query text; read one query per line from stdin when absent
    #[arg(long)]
    text: Option<String>,
    /// Disable spelling correction of query terms
    #[arg(long, default_value_t = false)]
    no_spelling: bool,
    /// Round document tf weights to four decimals like query weights
    #[arg(long, default_value_t = false)]
    round_document_weights: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let args = Args::parse();

    let collection = match &args.corpus {
        Some(path) => Collection::load(path).with_context(|| format!("loading corpus from {path}"))?,
        None => Collection::new(),
    };
    let config = if args.no_spelling { NormalizerConfig::default() } else { NormalizerConfig::query() };
    let paths = IndexPaths::new(&args.index);
    let processor = QueryProcessor::open(paths.snapshot(), Arc::new(collection), &config)
        .with_context(|| format!("loading index from {}", args.index))?
        .with_vector_options(VectorOptions { round_document_weights: args.round_document_weights });
    let mut session = QuerySession::new(processor, None);

    let stdout = io::stdout();
    match &args.text {
        Some(text) => {
            let response = answer(&mut session, text, args.mode, args.k)?;
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &response)?;
            writeln!(out)?;
        }
        None => {
            let answered = run(&mut session, io::stdin().lock(), stdout.lock(), args.mode, args.k)?;
            tracing::info!(answered, "done");
        }
    }
    Ok(())
}
