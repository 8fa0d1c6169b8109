//! Error types for tool execution

use thiserror::Error;

/// Result type alias for tool operations
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors a tool can report to its caller
///
/// Domain failures (unknown symbols, provider outages) are rendered into the
/// tool's text output instead; these variants cover calls that could not be
/// executed at all.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Arguments did not match the tool's input schema
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// No tool registered under this name
    #[error("Unknown tool: {0}")]
    NotFound(String),

    /// Tool failed while executing
    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),
}
