//! Major index summary tool

use crate::handlers::MarketHandlers;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use stock_tools::{Result, Tool};

pub(crate) const NAME: &str = "get_market_summary";

/// Snapshot of the S&P 500, Dow Jones and NASDAQ
pub struct MarketSummaryTool {
    handlers: Arc<MarketHandlers>,
}

impl MarketSummaryTool {
    pub fn new(handlers: Arc<MarketHandlers>) -> Self {
        Self { handlers }
    }
}

#[async_trait]
impl Tool for MarketSummaryTool {
    // Takes no arguments; anything passed is ignored
    async fn execute(&self, _params: Value) -> Result<String> {
        Ok(self.handlers.get_market_summary().await)
    }

    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Retrieve current levels of major US market indices (S&P 500, Dow Jones, \
         NASDAQ) with daily change and percentage change."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }
}
