//! Market data provider interface and its Yahoo Finance implementation

pub mod yahoo;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use yahoo::YahooFinanceClient;

/// Quote/info record returned by a provider
///
/// Field names follow Yahoo's quote payload. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteInfo {
    pub symbol: Option<String>,
    pub long_name: Option<String>,
    pub regular_market_price: Option<f64>,
    pub regular_market_change: Option<f64>,
    pub regular_market_change_percent: Option<f64>,
    pub market_cap: Option<f64>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
}

/// External market data provider
///
/// Both calls may fail for transient reasons; callers decide whether a
/// failure means "fall back" or "report".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Close of the most recent trading day, `None` when no bar is available
    async fn latest_close(&self, symbol: &str) -> Result<Option<f64>>;

    /// General quote/info record for a symbol
    async fn quote_info(&self, symbol: &str) -> Result<QuoteInfo>;
}
