//! Current price lookup tool

use super::{SymbolParams, symbol_schema};
use crate::handlers::MarketHandlers;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use stock_tools::{Result, Tool, parse_params};

pub(crate) const NAME: &str = "get_stock_price";

/// Current price of one symbol, live with local fallback
pub struct StockPriceTool {
    handlers: Arc<MarketHandlers>,
}

impl StockPriceTool {
    pub fn new(handlers: Arc<MarketHandlers>) -> Self {
        Self { handlers }
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    async fn execute(&self, params: Value) -> Result<String> {
        let params: SymbolParams = parse_params(params)?;
        Ok(self.handlers.get_stock_price(&params.symbol).await)
    }

    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Retrieve the current stock price for a given ticker symbol. \
         Uses Yahoo Finance with a local CSV file as fallback and reports \
         which source supplied the price."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}
