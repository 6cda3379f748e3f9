use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sift_core::persist::{save_index, IndexPaths};
use sift_core::{Collection, IndexConfig, InvertedIndex, Normalizer};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and inspect the positional inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from input JSON/JSONL files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Index the author field along with title and body
        #[arg(long, default_value_t = false)]
        include_author: bool,
    },
    /// Print corpus statistics and, optionally, per-term postings
    Stats {
        /// Index directory
        #[arg(long)]
        index: String,
        /// Normalized terms to look up
        terms: Vec<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, include_author } => build_index(&input, &output, include_author),
        Commands::Stats { index, terms } => stats(&index, &terms),
    }
}

fn build_index(input: &str, output: &str, include_author: bool) -> Result<()> {
    let docs = Collection::load(input).with_context(|| format!("loading corpus from {input}"))?;
    let index = build(&docs, IndexConfig { include_author });
    tracing::info!(num_docs = index.total_documents(), num_terms = index.term_count(), "ingested documents");

    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default();
    let paths = IndexPaths::new(output);
    save_index(&paths, &index, created_at).with_context(|| format!("writing index to {output}"))?;

    tracing::info!(output, "index build complete");
    Ok(())
}

/// One `index_document` per document in ascending ID order, then a final sort.
fn build(docs: &Collection, config: IndexConfig) -> InvertedIndex {
    let normalizer = Normalizer::new();
    let mut index = InvertedIndex::with_config(config);
    for doc in docs.iter() {
        index.index_document(doc, &normalizer);
    }
    index.sort();
    index
}

fn stats(index_dir: &str, terms: &[String]) -> Result<()> {
    let paths = IndexPaths::new(index_dir);
    let index = InvertedIndex::load_snapshot(paths.snapshot())
        .with_context(|| format!("loading snapshot from {index_dir}"))?;
    println!("documents: {}", index.total_documents());
    println!("terms:     {}", index.term_count());
    println!("author:    {}", index.config().include_author);
    for term in terms {
        match index.find(term) {
            Ok(item) => {
                println!("{term}: df={} idf={:.4}", item.document_frequency(), index.idf(term));
                for posting in item.sorted_postings() {
                    println!("  {} {:?}", posting.doc_id, posting.positions());
                }
            }
            Err(e) => println!("{e}"),
        }
    }
    Ok(())
}
