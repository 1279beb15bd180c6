use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Runtime;

use trend_sniper::{Cli, MarketDataProvider, build_provider, load_config, run_command};

fn main() -> Result<()> {
    // A. Init Logging
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Config + data source
    let config = load_config(args.config.as_deref())?;
    let provider = build_provider(&args.data_dirs);
    log::info!("Reading market data via {}", provider.signature());

    // D. Run
    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    let value = rt.block_on(run_command(provider.as_ref(), &args.command, &config))?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
