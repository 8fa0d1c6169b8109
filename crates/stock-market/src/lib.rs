//! Stock market data exposed as MCP tools
//!
//! Four operations are served to MCP clients:
//!
//! - `get_stock_price`: current price, live first with a local CSV fallback
//! - `compare_stocks`: price difference between two symbols
//! - `get_stock_fundamentals`: market cap, P/E, dividend yield and 52-week range
//! - `get_market_summary`: S&P 500, Dow Jones and NASDAQ levels
//!
//! Every operation answers with display text. Failures are rendered as
//! messages starting with `ERROR:` rather than protocol errors.
//!
//! # Example
//!
//! ```no_run
//! use stock_market::{MarketConfig, build_server};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = MarketConfig::from_env()?;
//! let server = build_server(&config)?;
//! server.serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fetcher;
pub mod format;
pub mod handlers;
pub mod resolver;
pub mod server;
pub mod tools;
pub mod types;

pub use api::{MarketDataProvider, QuoteInfo, YahooFinanceClient};
pub use config::MarketConfig;
pub use dataset::LocalDataset;
pub use error::{MarketError, Result};
pub use handlers::{MARKET_INDICES, MarketHandlers, PriceComparison, PriceDirection};
pub use resolver::PriceResolver;
pub use server::{SERVER_NAME, build_server, server_with_handlers};
pub use tools::{TOOL_NAMES, register_market_tools};
pub use types::{FundamentalsSnapshot, IndexQuote, PriceQuote, PriceSource, Symbol};
