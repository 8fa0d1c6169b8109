//! Configuration for market data lookups

use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use stock_utils::EnvSource;

/// Environment variable overriding the local dataset path
pub const DATASET_PATH_ENV: &str = "STOCK_CSV_PATH";
/// Environment variable overriding the live-path timeout, in seconds
pub const LIVE_TIMEOUT_ENV: &str = "STOCK_LIVE_TIMEOUT_SECS";
/// Environment variable overriding the quote endpoint base URL
pub const QUOTE_API_BASE_ENV: &str = "STOCK_QUOTE_API_BASE";

pub const DEFAULT_DATASET_PATH: &str = "stocks_data.csv";
pub const DEFAULT_QUOTE_API_BASE: &str = "https://query1.finance.yahoo.com";
/// Page whose response sets the session cookie the crumb is tied to
pub const DEFAULT_SESSION_URL: &str = "https://fc.yahoo.com";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; stock-mcp/0.1)";

/// Configuration for market data lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Path of the `symbol,price` fallback file
    pub dataset_path: PathBuf,

    /// Upper bound for each live provider call
    pub live_timeout: Duration,

    /// HTTP client timeout for the quote endpoint
    pub request_timeout: Duration,

    /// Base URL of the quote endpoint
    pub quote_api_base: String,

    /// URL visited once to obtain the session cookie
    pub session_url: String,

    /// User-Agent sent to the quote endpoint
    pub user_agent: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            live_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(15),
            quote_api_base: DEFAULT_QUOTE_API_BASE.to_string(),
            session_url: DEFAULT_SESSION_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl MarketConfig {
    /// Create a new configuration builder
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_source(&EnvSource::Process)
    }

    /// Load configuration from an environment-style source
    pub fn from_source(env: &EnvSource) -> Result<Self> {
        let mut builder = Self::builder();

        if let Some(path) = env.get(DATASET_PATH_ENV) {
            builder = builder.dataset_path(path);
        }
        if let Some(secs) = env.parse::<u64>(LIVE_TIMEOUT_ENV)? {
            builder = builder.live_timeout(Duration::from_secs(secs));
        }
        if let Some(base) = env.get(QUOTE_API_BASE_ENV) {
            builder = builder.quote_api_base(base);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.dataset_path.as_os_str().is_empty() {
            return Err(MarketError::ConfigError(
                "dataset path must not be empty".to_string(),
            ));
        }

        if self.live_timeout.is_zero() {
            return Err(MarketError::ConfigError(
                "live timeout must be greater than 0".to_string(),
            ));
        }

        validate_http_url("quote API base", &self.quote_api_base)?;
        validate_http_url("session URL", &self.session_url)?;

        Ok(())
    }
}

fn validate_http_url(what: &str, value: &str) -> Result<()> {
    let url = url::Url::parse(value)
        .map_err(|e| MarketError::ConfigError(format!("invalid {what} '{value}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(MarketError::ConfigError(format!(
            "{what} must be http(s), got '{}'",
            url.scheme()
        )));
    }
    Ok(())
}

/// Builder for MarketConfig
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    dataset_path: Option<PathBuf>,
    live_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    quote_api_base: Option<String>,
    session_url: Option<String>,
    user_agent: Option<String>,
}

impl MarketConfigBuilder {
    /// Set the local dataset path
    pub fn dataset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_path = Some(path.into());
        self
    }

    /// Set the live-path timeout
    pub fn live_timeout(mut self, timeout: Duration) -> Self {
        self.live_timeout = Some(timeout);
        self
    }

    /// Set the HTTP request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the quote endpoint base URL
    pub fn quote_api_base(mut self, base: impl Into<String>) -> Self {
        self.quote_api_base = Some(base.into());
        self
    }

    /// Set the session cookie URL
    pub fn session_url(mut self, url: impl Into<String>) -> Self {
        self.session_url = Some(url.into());
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<MarketConfig> {
        let defaults = MarketConfig::default();

        let config = MarketConfig {
            dataset_path: self.dataset_path.unwrap_or(defaults.dataset_path),
            live_timeout: self.live_timeout.unwrap_or(defaults.live_timeout),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            quote_api_base: self
                .quote_api_base
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or(defaults.quote_api_base),
            session_url: self.session_url.unwrap_or(defaults.session_url),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarketConfig::default();
        assert_eq!(config.dataset_path, PathBuf::from("stocks_data.csv"));
        assert_eq!(config.live_timeout, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = MarketConfig::builder()
            .dataset_path("/data/prices.csv")
            .live_timeout(Duration::from_secs(3))
            .quote_api_base("http://localhost:9000/")
            .build()
            .unwrap();

        assert_eq!(config.dataset_path, PathBuf::from("/data/prices.csv"));
        assert_eq!(config.live_timeout, Duration::from_secs(3));
        assert_eq!(config.quote_api_base, "http://localhost:9000");
    }

    #[test]
    fn test_from_source() {
        let env = EnvSource::from_pairs([
            (DATASET_PATH_ENV, "/tmp/stocks.csv"),
            (LIVE_TIMEOUT_ENV, "4"),
        ]);
        let config = MarketConfig::from_source(&env).unwrap();

        assert_eq!(config.dataset_path, PathBuf::from("/tmp/stocks.csv"));
        assert_eq!(config.live_timeout, Duration::from_secs(4));
        assert_eq!(config.quote_api_base, DEFAULT_QUOTE_API_BASE);
    }

    #[test]
    fn test_from_source_defaults() {
        let env = EnvSource::from_pairs(Vec::<(String, String)>::new());
        let config = MarketConfig::from_source(&env).unwrap();
        assert_eq!(config.dataset_path, PathBuf::from(DEFAULT_DATASET_PATH));
    }

    #[test]
    fn test_from_source_invalid_timeout() {
        let env = EnvSource::from_pairs([(LIVE_TIMEOUT_ENV, "soon")]);
        assert!(matches!(
            MarketConfig::from_source(&env),
            Err(MarketError::ConfigError(_))
        ));
    }

    #[test]
    fn test_validation_zero_timeout() {
        let config = MarketConfig {
            live_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_bad_base_url() {
        let config = MarketConfig {
            quote_api_base: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MarketConfig {
            quote_api_base: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MarketConfig {
            session_url: "file:///tmp/cookie".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
