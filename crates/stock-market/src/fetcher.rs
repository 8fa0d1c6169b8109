//! Live price fetcher

use crate::api::MarketDataProvider;
use crate::error::{MarketError, Result};
use crate::types::Symbol;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Await a provider call, failing with [`MarketError::Timeout`] after `limit`
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| MarketError::Timeout(limit))?
}

/// Fetches a symbol's current price from the live provider
///
/// Tries the latest daily close first, then the info record's market price.
/// Errors and timeouts are logged at debug level and reported as `None`.
#[derive(Clone)]
pub struct LivePriceFetcher {
    provider: Arc<dyn MarketDataProvider>,
    timeout: Duration,
}

impl LivePriceFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub async fn fetch(&self, symbol: &Symbol) -> Option<f64> {
        match self.try_fetch(symbol).await {
            Ok(price) => price,
            Err(e) => {
                debug!("Yahoo Finance error for {symbol}: {e}");
                None
            }
        }
    }

    async fn try_fetch(&self, symbol: &Symbol) -> Result<Option<f64>> {
        let close = bounded(self.timeout, self.provider.latest_close(symbol.as_str())).await?;
        if let Some(close) = close {
            info!("Retrieved {symbol} from Yahoo Finance: ${close:.2}");
            return Ok(Some(close));
        }

        let info = bounded(self.timeout, self.provider.quote_info(symbol.as_str())).await?;
        if let Some(price) = info.regular_market_price {
            info!("Retrieved {symbol} from Yahoo Finance (info): ${price:.2}");
        }
        Ok(info.regular_market_price)
    }
}
