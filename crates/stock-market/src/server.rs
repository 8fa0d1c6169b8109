//! Assembly of the stock MCP server

use crate::config::MarketConfig;
use crate::error::Result;
use crate::handlers::MarketHandlers;
use crate::tools::register_market_tools;
use std::sync::Arc;
use stock_mcp::McpServer;
use stock_tools::ToolRegistry;

/// Name advertised in `serverInfo`
pub const SERVER_NAME: &str = "Stock Server";

/// Build a server exposing the market tools over Yahoo Finance
pub fn build_server(config: &MarketConfig) -> Result<McpServer> {
    let handlers = Arc::new(MarketHandlers::with_yahoo(config)?);
    Ok(server_with_handlers(&handlers))
}

/// Build a server over an existing set of handlers
pub fn server_with_handlers(handlers: &Arc<MarketHandlers>) -> McpServer {
    let registry = Arc::new(ToolRegistry::new());
    register_market_tools(&registry, handlers);
    McpServer::new(SERVER_NAME, env!("CARGO_PKG_VERSION"), registry)
}
