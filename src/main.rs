use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

mod config;
mod error;
mod export;
mod mochi;
mod utils;
mod vocab;

use config::{Config, Overrides};
use utils::http::HttpClient;

/// Export a Mochi flashcard deck to a plain-text vocabulary list
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Name of the deck to export (overrides MOCHI_DECK_NAME)
    #[arg(short, long)]
    deck: Option<String>,

    /// File to write the vocabulary to (overrides MOCHI_OUTPUT_FILE)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Base URL of the Mochi API (overrides MOCHI_API_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Dotenv file to load before reading the environment [default: .env if present]
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    load_env_file(args.env_file.as_deref())?;

    let overrides = Overrides {
        api_base_url: args.base_url,
        deck_name: args.deck,
        output_file: args.output,
    };
    let config = Config::from_env(&overrides)?;
    debug!("Loaded API key: {}", config.masked_api_key());

    let summary = export::export_deck(&config, || HttpClient::new(&config), page_spinner())
        .await
        .with_context(|| format!("Exporting deck '{}' failed", config.deck_name))?;

    if summary.written > 0 {
        info!(
            "Vocabulary for deck {} exported to {} ({} written, {} skipped)",
            summary.deck_id,
            config.output_file.display(),
            summary.written,
            summary.skipped()
        );
    }

    Ok(())
}

/// Load `path`, or `.env` from the working directory when it exists
fn load_env_file(path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
            debug!("Loaded environment from {}", path.display());
        }
        None => match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e).context("Failed to load .env"),
        },
    }
    Ok(())
}

fn page_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb
}
