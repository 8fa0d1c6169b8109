//! MCP tools backed by [`MarketHandlers`]

pub mod compare;
pub mod fundamental;
pub mod market_summary;
pub mod stock_price;

pub use compare::CompareStocksTool;
pub use fundamental::StockFundamentalsTool;
pub use market_summary::MarketSummaryTool;
pub use stock_price::StockPriceTool;

use crate::handlers::MarketHandlers;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use stock_tools::ToolRegistry;

/// Names of the tools registered by [`register_market_tools`], in order
pub const TOOL_NAMES: [&str; 4] = [
    stock_price::NAME,
    compare::NAME,
    fundamental::NAME,
    market_summary::NAME,
];

/// Register the four market tools, sharing one set of handlers
pub fn register_market_tools(registry: &ToolRegistry, handlers: &Arc<MarketHandlers>) {
    registry.register(Arc::new(StockPriceTool::new(Arc::clone(handlers))));
    registry.register(Arc::new(CompareStocksTool::new(Arc::clone(handlers))));
    registry.register(Arc::new(StockFundamentalsTool::new(Arc::clone(handlers))));
    registry.register(Arc::new(MarketSummaryTool::new(Arc::clone(handlers))));
}

#[derive(Debug, Deserialize)]
struct SymbolParams {
    symbol: String,
}

fn symbol_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "symbol": {
                "type": "string",
                "description": "Stock ticker symbol (e.g., 'AAPL', 'MSFT')"
            }
        },
        "required": ["symbol"]
    })
}
