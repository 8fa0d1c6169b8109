//! Price resolution with live-to-local fallback

use crate::dataset::LocalDataset;
use crate::fetcher::LivePriceFetcher;
use crate::types::{PriceQuote, Symbol};
use std::path::Path;
use tracing::error;

/// Resolves a symbol's price from the live provider, falling back to the
/// local dataset
///
/// The dataset is consulted only when the live path produced nothing; the
/// two sources are never merged.
#[derive(Clone)]
pub struct PriceResolver {
    live: LivePriceFetcher,
    local: LocalDataset,
}

impl PriceResolver {
    pub fn new(live: LivePriceFetcher, local: LocalDataset) -> Self {
        Self { live, local }
    }

    pub async fn resolve(&self, symbol: &Symbol) -> PriceQuote {
        if let Some(price) = self.live.fetch(symbol).await {
            return PriceQuote::live(price);
        }

        if let Some(price) = self.local.lookup(symbol).await {
            return PriceQuote::local(price);
        }

        error!("Could not retrieve price for {symbol} from any source");
        PriceQuote::missing()
    }

    /// Location of the fallback dataset, for error messages
    pub fn dataset_path(&self) -> &Path {
        self.local.path()
    }
}
