//! Model Context Protocol (MCP) stdio transport
//!
//! This crate speaks newline-delimited JSON-RPC 2.0 over standard I/O:
//! - [`server::McpServer`] advertises the tools of a
//!   [`stock_tools::ToolRegistry`] and dispatches `tools/call` requests
//! - [`client::StdioMcpClient`] spawns a server process, initializes the
//!   session, lists tools and calls them
//!
//! # Example
//!
//! ```no_run
//! use stock_mcp::server::McpServer;
//! use stock_tools::ToolRegistry;
//! use std::sync::Arc;
//!
//! # async fn example() -> stock_mcp::Result<()> {
//! let registry = Arc::new(ToolRegistry::new());
//! let server = McpServer::new("Stock Server", "0.1.0", registry);
//! server.serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;

pub use client::{McpClient, StdioMcpClient};
pub use error::McpError;
pub use protocol::{McpContent, McpServerInfo, McpToolDefinition, McpToolResult};
pub use server::McpServer;

/// Result type for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;
