//! `docqa`: ingest a document directory and query it from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use docqa_core::config::Config;
use docqa_embed::get_default_embedder;
use docqa_hybrid::RetrievalService;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Hybrid BM25 + dense retrieval over uploaded documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a new index from a directory (default: storage.upload_dir)
    Ingest {
        dir: Option<PathBuf>,
    },
    /// Retrieve the chunks most relevant to a query
    Query {
        text: String,
        /// Number of chunks to return (default: retrieval.k)
        #[arg(short, long)]
        k: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Show whether a snapshot is available and what it holds
    Status {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let embedder = get_default_embedder(&settings.embedding)?;
    let service = RetrievalService::new(&settings, embedder)?;

    match cli.command {
        Commands::Ingest { dir } => {
            let dir = dir.unwrap_or_else(|| service.upload_dir().to_path_buf());
            info!("Ingesting from {}", dir.display());
            let generation = service.ingest_dir(&dir)?;
            let status = service.status();
            println!("Ingested {} chunks from {} (generation {})", status.chunk_count, dir.display(), generation);
        }
        Commands::Query { text, k, json } => {
            service.load_snapshot()?;
            let k = k.unwrap_or(service.default_k());
            let results = service.retrieve(&text, k)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for (i, chunk) in results.iter().enumerate() {
                    println!("{}. {}", i + 1, chunk);
                }
            }
        }
        Commands::Status { json } => {
            service.load_snapshot()?;
            let status = service.status();
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("ready: {}", status.ready);
                println!("chunks: {}", status.chunk_count);
                println!("snapshot: {}", if status.snapshot_exists { "present" } else { "missing" });
            }
        }
    }
    Ok(())
}
