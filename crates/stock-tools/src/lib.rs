//! Tool definitions and dispatch for stock-mcp
//!
//! A tool is a named operation with a JSON Schema describing its arguments
//! and a text result. The MCP server advertises the contents of a
//! [`ToolRegistry`] and routes `tools/call` requests through it.

pub mod error;
pub mod registry;
pub mod tool;

pub use error::{Result, ToolError};
pub use registry::ToolRegistry;
pub use tool::{Tool, parse_params};
