//! Shared utilities for stock-mcp
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup for the binaries and helpers for reading configuration
//! from environment variables.

pub mod config;
pub mod logging;

pub use config::{ConfigError, EnvSource};
pub use logging::init_tracing;
