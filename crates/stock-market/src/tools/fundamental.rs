//! Fundamentals report tool

use super::{SymbolParams, symbol_schema};
use crate::handlers::MarketHandlers;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use stock_tools::{Result, Tool, parse_params};

pub(crate) const NAME: &str = "get_stock_fundamentals";

/// Key financial metrics for one symbol
pub struct StockFundamentalsTool {
    handlers: Arc<MarketHandlers>,
}

impl StockFundamentalsTool {
    pub fn new(handlers: Arc<MarketHandlers>) -> Self {
        Self { handlers }
    }
}

#[async_trait]
impl Tool for StockFundamentalsTool {
    async fn execute(&self, params: Value) -> Result<String> {
        let params: SymbolParams = parse_params(params)?;
        Ok(self.handlers.get_stock_fundamentals(&params.symbol).await)
    }

    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Retrieve key financial fundamentals for a stock: current price, \
         market capitalization, P/E ratio, dividend yield and 52-week range."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}
