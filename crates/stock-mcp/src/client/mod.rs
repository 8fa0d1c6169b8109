//! MCP client implementations

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::Result;
use crate::protocol::{McpServerInfo, McpToolDefinition, McpToolResult};

pub mod stdio;

pub use stdio::StdioMcpClient;

/// MCP client trait - abstracts over transports
///
/// All methods take `&self` so clients can be shared through `Arc`;
/// implementations use interior mutability for connection state.
#[async_trait]
pub trait McpClient: Send + Sync {
    /// Initialize connection to MCP server
    async fn connect(&self) -> Result<()>;

    /// Check if client is connected
    fn is_connected(&self) -> bool;

    /// Disconnect from server
    async fn disconnect(&self) -> Result<()>;

    /// List available tools
    async fn list_tools(&self) -> Result<Vec<McpToolDefinition>>;

    /// Call a tool
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<McpToolResult>;

    /// Get server info (from initialize response)
    async fn server_info(&self) -> Option<McpServerInfo>;
}

/// Type alias for Arc-wrapped MCP client
pub type ArcMcpClient = Arc<dyn McpClient>;
