//! Two-symbol price comparison tool

use crate::handlers::MarketHandlers;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use stock_tools::{Result, Tool, parse_params};

pub(crate) const NAME: &str = "compare_stocks";

/// Compares the current prices of two symbols
pub struct CompareStocksTool {
    handlers: Arc<MarketHandlers>,
}

#[derive(Debug, Deserialize)]
struct CompareParams {
    symbol1: String,
    symbol2: String,
}

impl CompareStocksTool {
    pub fn new(handlers: Arc<MarketHandlers>) -> Self {
        Self { handlers }
    }
}

#[async_trait]
impl Tool for CompareStocksTool {
    async fn execute(&self, params: Value) -> Result<String> {
        let params: CompareParams = parse_params(params)?;
        Ok(self
            .handlers
            .compare_stocks(&params.symbol1, &params.symbol2)
            .await)
    }

    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Compare the current prices of two stock symbols. Reports the absolute \
         difference and the percentage difference relative to the lower price."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol1": {
                    "type": "string",
                    "description": "First stock ticker symbol (e.g., 'AAPL')"
                },
                "symbol2": {
                    "type": "string",
                    "description": "Second stock ticker symbol (e.g., 'MSFT')"
                }
            },
            "required": ["symbol1", "symbol2"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketDataProvider;
    use crate::config::MarketConfig;
    use stock_tools::ToolError;

    #[tokio::test]
    async fn test_missing_argument_is_rejected() {
        let handlers = Arc::new(MarketHandlers::new(
            Arc::new(MockMarketDataProvider::new()),
            &MarketConfig::default(),
        ));
        let tool = CompareStocksTool::new(handlers);

        let result = tool.execute(json!({"symbol1": "AAPL"})).await;
        assert!(matches!(result, Err(ToolError::InvalidParameters(_))));
    }
}
