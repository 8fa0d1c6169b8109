//! Configuration helpers for environment-style settings
//!
//! Components read their settings through [`EnvSource`] so that tests can
//! supply a plain map instead of mutating the process environment.

use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("Environment variable not set: {0}")]
    Missing(String),

    /// A variable is set but cannot be parsed
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// Source of environment-style key/value settings
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// The process environment
    #[default]
    Process,
    /// A fixed set of values
    Map(HashMap<String, String>),
}

impl EnvSource {
    /// Build a map-backed source from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Get a value; empty strings count as unset
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match self {
            Self::Process => std::env::var(key).ok(),
            Self::Map(map) => map.get(key).cloned(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Get a value or fall back to `default`
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a required value
    pub fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    /// Parse an optional value
    pub fn parse<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::Invalid {
                    key: key.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_source() {
        let env = EnvSource::from_pairs([("A", "1"), ("B", "  ")]);
        assert_eq!(env.get("A"), Some("1".to_string()));
        assert_eq!(env.get("B"), None);
        assert_eq!(env.get_or("C", "fallback"), "fallback");
    }

    #[test]
    fn test_require_missing() {
        let env = EnvSource::from_pairs(Vec::<(String, String)>::new());
        assert_eq!(
            env.require("KEY"),
            Err(ConfigError::Missing("KEY".to_string()))
        );
    }

    #[test]
    fn test_parse() {
        let env = EnvSource::from_pairs([("SECS", " 15 "), ("BAD", "abc")]);
        assert_eq!(env.parse::<u64>("SECS").unwrap(), Some(15));
        assert_eq!(env.parse::<u64>("MISSING").unwrap(), None);

        let err = env.parse::<u64>("BAD").unwrap_err();
        assert!(err.to_string().contains("BAD"));
    }
}
