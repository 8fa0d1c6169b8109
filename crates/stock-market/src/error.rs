//! Error types for market data operations

use std::time::Duration;
use thiserror::Error;

/// Market data specific errors
///
/// These never reach an MCP caller: the live path turns them into a
/// fallback and the handlers render them as text.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Provider returned an error status or payload
    #[error("API error: {0}")]
    ApiError(String),

    /// Yahoo Finance client error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Provider call exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Local dataset could not be parsed
    #[error("Dataset error: {0}")]
    DatasetError(#[from] csv::Error),

    /// Local dataset is readable but its content is unusable
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// Local dataset could not be read
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for market data operations
pub type Result<T> = std::result::Result<T, MarketError>;

impl From<stock_utils::ConfigError> for MarketError {
    fn from(err: stock_utils::ConfigError) -> Self {
        MarketError::ConfigError(err.to_string())
    }
}
