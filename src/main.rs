//! # Risk News Scout
//!
//! Retrieves news articles about supply-chain social and environmental risks
//! (child labour, forced labour, land grabbing, ...) for a set of countries
//! and one commodity, flags the articles that need a human to check them,
//! and persists one structured row per article.
//!
//! ## Usage
//!
//! ```sh
//! risk_news_scout -c ./config.yaml
//! ```
//!
//! ## Architecture
//!
//! The `news_retrieval` component follows a pipeline architecture:
//! 1. **Searching**: one Google News query per (keyword, country, commodity)
//! 2. **Fetching**: download and sanitise each article, with bounded retry
//!    (at most `max_workers` downloads in flight)
//! 3. **Classifying**: flag failed downloads and too-short texts for manual review
//! 4. **Output**: one JSON segment per (country, risk category)
//!
//! The `data_analysis` component summarises persisted segments into a
//! Markdown report.

use clap::Parser;
use std::error::Error;
use tracing::info;

mod campaign;
mod catalog;
mod cli;
mod components;
mod config;
mod error;
mod fetcher;
mod models;
mod outputs;
mod pool;
mod review;
mod scrapers;
mod telemetry;
mod utils;

use cli::Cli;
use components::{build_components, run_all};
use config::Config;
use telemetry::Telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    let mut config = Config::load(&args.config)?;
    args.apply(&mut config);
    config.validate()?;

    // Unknown component names fail here, before anything runs.
    let components = build_components(&config.components, &config)?;

    // --- Tracing init ---
    let telemetry = Telemetry::init(&config.logging)?;
    info!(config = %args.config.display(), components = ?config.components, "risk_news_scout starting up");

    run_all(&components, telemetry).await
}
