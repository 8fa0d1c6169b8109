//! Operation handlers behind the MCP tools
//!
//! Every handler returns display text for both success and failure; nothing
//! here returns an error to the tool layer.

use crate::api::{MarketDataProvider, YahooFinanceClient};
use crate::config::MarketConfig;
use crate::dataset::LocalDataset;
use crate::error::Result;
use crate::fetcher::{LivePriceFetcher, bounded};
use crate::format::{render_fundamentals, render_index_line};
use crate::resolver::PriceResolver;
use crate::types::{FundamentalsSnapshot, IndexQuote, PriceQuote, Symbol};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Indices reported by the market summary, as (label, symbol)
pub const MARKET_INDICES: [(&str, &str); 3] = [
    ("S&P 500", "^GSPC"),
    ("Dow Jones", "^DJI"),
    ("NASDAQ", "^IXIC"),
];

const SUMMARY_FOOTER: &str = "*Data sourced from Yahoo Finance (may be delayed 15-20 minutes)*";

/// Direction of the first price relative to the second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceDirection {
    Higher,
    Lower,
    Same,
}

impl PriceDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Higher => "higher",
            Self::Lower => "lower",
            Self::Same => "same",
        }
    }
}

/// Price difference between two symbols
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceComparison {
    /// Absolute difference
    pub difference: f64,
    /// Difference relative to the lower price, in percent (0 when that price is not positive)
    pub percentage: f64,
    /// Direction of the first price relative to the second
    pub direction: PriceDirection,
}

impl PriceComparison {
    pub fn between(first: f64, second: f64) -> Self {
        let difference = (first - second).abs();
        let base = first.min(second);
        let percentage = if base > 0.0 {
            difference / base * 100.0
        } else {
            0.0
        };

        let direction = if first > second {
            PriceDirection::Higher
        } else if first < second {
            PriceDirection::Lower
        } else {
            PriceDirection::Same
        };

        Self {
            difference,
            percentage,
            direction,
        }
    }
}

/// Handlers for the four market operations
pub struct MarketHandlers {
    resolver: PriceResolver,
    provider: Arc<dyn MarketDataProvider>,
    timeout: Duration,
}

impl MarketHandlers {
    /// Create handlers over an arbitrary provider
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: &MarketConfig) -> Self {
        let live = LivePriceFetcher::new(Arc::clone(&provider), config.live_timeout);
        let local = LocalDataset::new(config.dataset_path.clone());

        Self {
            resolver: PriceResolver::new(live, local),
            provider,
            timeout: config.live_timeout,
        }
    }

    /// Create handlers backed by Yahoo Finance
    pub fn with_yahoo(config: &MarketConfig) -> Result<Self> {
        let provider = Arc::new(YahooFinanceClient::new(config)?);
        Ok(Self::new(provider, config))
    }

    pub fn resolver(&self) -> &PriceResolver {
        &self.resolver
    }

    /// Resolve a raw symbol through the fallback pipeline
    pub async fn resolve(&self, symbol: &str) -> PriceQuote {
        self.resolver.resolve(&Symbol::new(symbol)).await
    }

    #[instrument(skip(self))]
    pub async fn get_stock_price(&self, symbol: &str) -> String {
        let symbol = Symbol::new(symbol);
        info!("get_stock_price called for {symbol}");

        let quote = self.resolver.resolve(&symbol).await;
        match quote.price() {
            Some(price) => format!(
                "Current price of {symbol} is ${price:.2} ({})",
                quote.source().label()
            ),
            None => format!(
                "ERROR: Could not retrieve price for {symbol}. \
                 Please verify the symbol is correct. Data sources: \
                 Yahoo Finance API, local CSV file ({})",
                self.resolver.dataset_path().display()
            ),
        }
    }

    #[instrument(skip(self))]
    pub async fn compare_stocks(&self, symbol1: &str, symbol2: &str) -> String {
        let symbol1 = Symbol::new(symbol1);
        let symbol2 = Symbol::new(symbol2);
        info!("compare_stocks called: {symbol1} vs {symbol2}");

        let quote1 = self.resolver.resolve(&symbol1).await;
        let quote2 = self.resolver.resolve(&symbol2).await;

        let Some(price1) = quote1.price() else {
            return format!("ERROR: Could not retrieve price for {symbol1}");
        };
        let Some(price2) = quote2.price() else {
            return format!("ERROR: Could not retrieve price for {symbol2}");
        };

        let comparison = PriceComparison::between(price1, price2);
        match comparison.direction {
            PriceDirection::Same => {
                format!("Both {symbol1} and {symbol2} have the same price (${price1:.2})")
            }
            direction => format!(
                "{symbol1} (${price1:.2}) is ${:.2} ({:.2}%) {} than {symbol2} (${price2:.2})",
                comparison.difference,
                comparison.percentage,
                direction.as_str()
            ),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_stock_fundamentals(&self, symbol: &str) -> String {
        let symbol = Symbol::new(symbol);
        info!("get_stock_fundamentals called for {symbol}");

        let info = match bounded(self.timeout, self.provider.quote_info(symbol.as_str())).await {
            Ok(info) => info,
            Err(e) => {
                error!("Error retrieving fundamentals for {symbol}: {e}");
                return format!("ERROR: Could not retrieve fundamentals for {symbol}. {e}");
            }
        };

        let snapshot = FundamentalsSnapshot::from_info(&info);
        render_fundamentals(symbol.as_str(), &snapshot).unwrap_or_else(|| {
            format!(
                "Limited fundamental data available for {symbol}. \
                 Some metrics may not be available."
            )
        })
    }

    #[instrument(skip(self))]
    pub async fn get_market_summary(&self) -> String {
        info!("get_market_summary called");

        let mut summary = String::from("**Market Summary**\n\n");

        for (label, symbol) in MARKET_INDICES {
            let line = match bounded(self.timeout, self.provider.quote_info(symbol)).await {
                Ok(info) => render_index_line(&IndexQuote::from_info(label, symbol, &info)),
                Err(e) => {
                    warn!("Could not retrieve data for {label}: {e}");
                    format!("{label} ({symbol}): Error retrieving data")
                }
            };
            summary.push_str(&line);
            summary.push('\n');
        }

        summary.push('\n');
        summary.push_str(SUMMARY_FOOTER);
        summary
    }
}
