#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod models;
pub mod utils;

// The refresh engine and orchestrator
pub mod engine;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

// Re-export commonly used types
pub use config::AnalysisConfig;
pub use data::{InMemoryProvider, JsonFileProvider, MarketDataProvider};
pub use domain::{Bar, Timeframe};
pub use engine::{AggregateRequest, AggregationOutcome, SignalEngine, aggregate, assess};
pub use error::AnalysisError;
pub use models::{AggregatedSignal, SignalCounts, TimeframeTrend, TrendAlignment};

// CLI argument parsing
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `{SYMBOL}_{timeframe}.json` bar files. Repeat to add fallbacks.
    #[arg(long = "data-dir", default_value = "data")]
    pub data_dirs: Vec<PathBuf>,

    /// JSON file overriding the default analysis configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Signals across timeframes for one symbol
    Aggregate {
        symbol: String,
        /// Comma separated, e.g. 1D,4H (defaults to the configured set)
        #[arg(long, value_delimiter = ',')]
        timeframes: Vec<Timeframe>,
        #[arg(long)]
        direction: Option<models::SignalDirection>,
        #[arg(long)]
        min_confidence: Option<u8>,
        #[arg(long, default_value_t = false)]
        active_only: bool,
        #[arg(long, value_delimiter = ',')]
        types: Vec<models::SignalType>,
        #[arg(long, default_value = "confidence")]
        sort_by: models::SortKey,
    },
    /// Trade action from a higher and a lower timeframe
    Assess {
        symbol: String,
        #[arg(long)]
        higher: Timeframe,
        #[arg(long)]
        lower: Timeframe,
    },
}

/// Defaults, or the given JSON file layered over them.
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };
    config.validate().context("Invalid analysis configuration")?;
    Ok(config)
}

pub fn build_provider(data_dirs: &[PathBuf]) -> Arc<dyn MarketDataProvider> {
    match data_dirs {
        [single] => Arc::new(JsonFileProvider::new(single)),
        dirs => Arc::new(data::ProviderChain::new(
            dirs.iter()
                .map(|dir| Box::new(JsonFileProvider::new(dir)) as Box<dyn MarketDataProvider>)
                .collect(),
        )),
    }
}

/// Runs one CLI command and returns its JSON result.
pub async fn run_command(
    provider: &dyn MarketDataProvider,
    command: &Command,
    config: &AnalysisConfig,
) -> Result<serde_json::Value> {
    let value = match command {
        Command::Aggregate {
            symbol,
            timeframes,
            direction,
            min_confidence,
            active_only,
            types,
            sort_by,
        } => {
            let request = AggregateRequest {
                timeframes: timeframes.clone(),
                filters: models::SignalFilters {
                    direction: *direction,
                    timeframes: None,
                    min_confidence: *min_confidence,
                    active_only: *active_only,
                    types: (!types.is_empty()).then(|| types.clone()),
                },
                sort_by: *sort_by,
            };
            let outcome = aggregate(provider, symbol, &request, config).await?;
            serde_json::to_value(outcome)?
        }
        Command::Assess {
            symbol,
            higher,
            lower,
        } => {
            let alignment = assess(provider, symbol, *higher, *lower, config).await?;
            serde_json::to_value(alignment)?
        }
    };
    Ok(value)
}
