//! Value types produced by price lookups

use crate::api::QuoteInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticker symbol, trimmed and uppercased
///
/// Unknown symbols are not rejected here; they simply miss in every source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Normalize a raw symbol
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Which source satisfied a price lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    /// External market-data provider
    Live,
    /// Local fallback dataset
    Local,
    /// Neither source had a price
    None,
}

impl PriceSource {
    /// Provenance text shown next to a price
    pub fn label(self) -> &'static str {
        match self {
            Self::Live => "from Yahoo Finance",
            Self::Local => "from local data",
            Self::None => "unavailable",
        }
    }
}

/// Result of resolving a symbol's price
///
/// The source is `None` exactly when no price is present; the constructors
/// are the only way to build one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    price: Option<f64>,
    source: PriceSource,
}

impl PriceQuote {
    pub fn live(price: f64) -> Self {
        Self {
            price: Some(price),
            source: PriceSource::Live,
        }
    }

    pub fn local(price: f64) -> Self {
        Self {
            price: Some(price),
            source: PriceSource::Local,
        }
    }

    pub fn missing() -> Self {
        Self {
            price: None,
            source: PriceSource::None,
        }
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn source(&self) -> PriceSource {
        self.source
    }

    pub fn is_available(&self) -> bool {
        self.price.is_some()
    }
}

/// Treat zero as "not reported": the quote endpoint fills gaps with 0
fn reported(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

/// Fundamentals extracted from a provider info record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FundamentalsSnapshot {
    pub name: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
}

impl FundamentalsSnapshot {
    pub fn from_info(info: &QuoteInfo) -> Self {
        Self {
            name: info
                .long_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            current_price: reported(info.regular_market_price),
            market_cap: reported(info.market_cap),
            pe_ratio: reported(info.trailing_pe),
            dividend_yield: reported(info.dividend_yield),
            fifty_two_week_low: reported(info.fifty_two_week_low),
            fifty_two_week_high: reported(info.fifty_two_week_high),
        }
    }

    /// 52-week range, only when both bounds are known
    pub fn fifty_two_week_range(&self) -> Option<(f64, f64)> {
        self.fifty_two_week_low.zip(self.fifty_two_week_high)
    }

    /// True when no metric (the name does not count) is present
    pub fn is_empty(&self) -> bool {
        self.current_price.is_none()
            && self.market_cap.is_none()
            && self.pe_ratio.is_none()
            && self.dividend_yield.is_none()
            && self.fifty_two_week_range().is_none()
    }
}

/// Summary line data for one market index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexQuote {
    pub label: String,
    pub symbol: String,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
}

impl IndexQuote {
    pub fn from_info(label: &str, symbol: &str, info: &QuoteInfo) -> Self {
        Self {
            label: label.to_string(),
            symbol: symbol.to_string(),
            price: reported(info.regular_market_price),
            change: info.regular_market_change.filter(|v| v.is_finite()),
            change_percent: info.regular_market_change_percent.filter(|v| v.is_finite()),
        }
    }
}
