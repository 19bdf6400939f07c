//! Madang CLI - ingest documents and query the retrieval engine.
//!
//! # Usage
//!
//! ```bash
//! # Ingest a file (strategy resolved from chunk_config.json)
//! madang ingest statute.txt --file-name statute.pdf
//!
//! # Query with an intent profile
//! madang query "전통시장 지원 조건" --intent LAW
//! madang query "M001" --intent MERCHANT_DATA --json
//!
//! # Show help
//! madang --help
//! ```

mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use madang_core::chunking::chunk_text;
use madang_core::config::ChunkConfig;
use madang_core::embedding::HashingEmbedder;
use madang_core::index::VectorIndex;
use madang_core::search::SearchEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Madang retrieval engine CLI.
///
/// Chunks documents by per-file strategy, maintains a deduplicated vector
/// index, and answers intent-routed queries against it.
#[derive(Parser)]
#[command(name = "madang", version, about)]
struct Cli {
    /// Custom data directory (default: platform standard location)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk a text file and add it to the index
    Ingest {
        /// Path to the file to ingest (plain text or CSV rows)
        file: PathBuf,

        /// Name to index the file under (default: the file's own name).
        /// The chunk strategy is looked up by this name.
        #[arg(long)]
        file_name: Option<String>,

        /// Custom chunk strategy config path
        #[arg(long)]
        chunk_config: Option<PathBuf>,
    },
    /// Query the index through an intent profile
    Query {
        /// The question to search for
        question: String,

        /// Intent name selecting the document profile
        #[arg(short, long)]
        intent: String,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Custom document profiles path
        #[arg(long)]
        profiles: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let data_dir = config::resolve_data_dir(cli.data_dir)?;

    match cli.command {
        Command::Ingest {
            file,
            file_name,
            chunk_config,
        } => {
            let file_name = match file_name {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("file path has no file name")?,
            };

            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;

            let chunk_config =
                ChunkConfig::load(config::chunk_config_path(&data_dir, chunk_config));
            let strategy = chunk_config.for_file(&file_name);
            let chunks = chunk_text(&raw, &strategy);

            let embedder = Arc::new(HashingEmbedder::new(config::EMBEDDING_DIMENSION));
            let mut store = VectorIndex::open(config::db_dir(&data_dir), embedder)?;
            let added = store.ingest(&chunks, &file_name)?;

            println!(
                "Indexed {} new chunk{} from {} ({} total)",
                added,
                if added == 1 { "" } else { "s" },
                file_name,
                store.len()
            );
        }
        Command::Query {
            question,
            intent,
            json,
            profiles,
        } => {
            let embedder = Arc::new(HashingEmbedder::new(config::EMBEDDING_DIMENSION));
            let store = VectorIndex::open(config::db_dir(&data_dir), embedder)?;
            let engine =
                SearchEngine::new(store.into_shared(), config::profiles_path(&data_dir, profiles));

            let hits = engine.search(&question, &intent)?;

            let rendered = if json {
                output::format_json(&question, &intent, &hits)
            } else {
                output::format_human(&question, &hits)
            };
            println!("{}", rendered);
        }
    }

    Ok(())
}
