//! Stock MCP server
//!
//! Serves the market tools over stdio. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! export STOCK_CSV_PATH=stocks_data.csv
//! stock-server --live-timeout-secs 5
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use stock_market::{MarketConfig, TOOL_NAMES, build_server};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "stock-server", version, about = "Stock market data MCP server over stdio")]
struct Args {
    /// Local fallback CSV (overrides STOCK_CSV_PATH)
    #[arg(long)]
    csv_path: Option<PathBuf>,

    /// Timeout for each live provider call, in seconds (overrides STOCK_LIVE_TIMEOUT_SECS)
    #[arg(long)]
    live_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stock_utils::init_tracing("info");

    let args = Args::parse();

    let mut config = MarketConfig::from_env()?;
    if let Some(path) = args.csv_path {
        config.dataset_path = path;
    }
    if let Some(secs) = args.live_timeout_secs {
        config.live_timeout = Duration::from_secs(secs);
    }
    config.validate()?;

    let server = build_server(&config)?;

    info!("{}", "=".repeat(80));
    info!("Stock MCP Server starting...");
    info!("Available tools: {}", TOOL_NAMES.join(", "));
    info!("CSV Fallback Path: {}", config.dataset_path.display());
    info!("{}", "=".repeat(80));

    tokio::select! {
        result = server.serve_stdio() => result?,
        _ = tokio::signal::ctrl_c() => info!("Server shutdown requested"),
    }

    Ok(())
}
