//! # Senior News Daily
//!
//! A scheduled content pipeline for older-adult news: fetches RSS/Atom
//! feeds, filters and deduplicates articles, assigns each one a canonical
//! topical bucket (regex rules + domain hints, with optional LLM-suggested
//! labels kept as advisory metadata), derives a daily digest with scam
//! alerts, and renders a static multi-page site from the resulting JSON.
//!
//! The stages run as subcommands so an external scheduler can invoke them
//! individually, or `run` executes the whole pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use senior_news_daily::oracle::{OpenAiOracle, Oracle};
use senior_news_daily::{Pipeline, PipelineConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments. Behavior toggles (filter mode, broadened feeds,
/// extra URL, oracle credentials) come from the environment, the way the
/// scheduled workflow wires them in.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Directory holding items.json, digest.json, sources.json, feeds.yaml
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Output directory for the static site
    #[arg(short, long, default_value = "site")]
    site_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch feeds and write the items document
    Fetch,
    /// Categorize stored items and write the digest
    Summarize,
    /// Render the static site from the stored documents
    BuildSite,
    /// Write the per-source activity report
    Sources,
    /// Full pipeline: fetch, summarize, sources, site
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Cli::parse();
    let config = PipelineConfig::from_env(args.data_dir, args.site_dir);

    let oracle = OpenAiOracle::from_config(&config);
    if oracle.is_some() {
        info!(model = %config.openai_model, "oracle configured");
    }
    let oracle_ref = oracle.as_ref().map(|o| o as &dyn Oracle);

    let pipeline = Pipeline::new(config);

    match args.command.unwrap_or(Command::Run) {
        Command::Fetch => {
            let count = pipeline.fetch().await?;
            info!(count, "fetched items");
        }
        Command::Summarize => {
            let digest = pipeline.summarize(oracle_ref).await?;
            info!(buckets = digest.category_counts.len(), alerts = digest.alerts.len(), "digest written");
        }
        Command::BuildSite => pipeline.build_site().await?,
        Command::Sources => {
            let count = pipeline.sources().await?;
            info!(count, "sources report written");
        }
        Command::Run => pipeline.run(oracle_ref).await?,
    }

    Ok(())
}
