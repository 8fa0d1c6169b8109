//! Error types for MCP operations

use thiserror::Error;

/// Errors that can occur during MCP operations
#[derive(Error, Debug)]
pub enum McpError {
    /// MCP connection failed
    #[error("MCP connection failed: {0}")]
    ConnectionFailed(String),

    /// MCP initialization failed
    #[error("MCP initialization failed: {0}")]
    InitializationFailed(String),

    /// Not connected to MCP server
    #[error("Not connected to MCP server")]
    NotConnected,

    /// Server answered with a JSON-RPC error
    #[error("MCP request failed: {method}: {message} (code {code})")]
    RequestFailed {
        method: String,
        code: i64,
        message: String,
    },

    /// Response did not have the expected shape
    #[error("Invalid MCP response: {0}")]
    InvalidResponse(String),

    /// Request did not complete in time
    #[error("MCP request timed out: {0}")]
    Timeout(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
