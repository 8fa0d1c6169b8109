//! Local fallback dataset
//!
//! A flat `symbol,price` CSV file, re-read on every lookup so edits are
//! picked up without restarting the server. Rows are read as raw records and
//! only the first row matching the requested symbol has its price parsed, so
//! a bad row affects that symbol alone.

use crate::error::{MarketError, Result};
use crate::types::Symbol;
use csv::StringRecord;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

const SYMBOL_COLUMN: &str = "symbol";
const PRICE_COLUMN: &str = "price";

/// Reader for the local fallback file
#[derive(Debug, Clone)]
pub struct LocalDataset {
    path: PathBuf,
}

impl LocalDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a symbol's price
    ///
    /// Never fails: a missing file, unreadable file or bad price all yield
    /// `None` after being logged.
    pub async fn lookup(&self, symbol: &Symbol) -> Option<f64> {
        match self.try_lookup(symbol).await {
            Ok(price) => price,
            Err(e) => {
                error!("Error reading CSV file {}: {e}", self.path.display());
                None
            }
        }
    }

    async fn try_lookup(&self, symbol: &Symbol) -> Result<Option<f64>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("CSV file not found: {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let Some(raw) = find_price(&bytes, symbol)? else {
            warn!("Symbol {symbol} not found in CSV");
            return Ok(None);
        };

        let price = parse_price(&raw).ok_or_else(|| {
            MarketError::InvalidDataset(format!("invalid price '{raw}' for {symbol}"))
        })?;

        info!("Retrieved {symbol} from CSV fallback: ${price:.2}");
        Ok(Some(price))
    }
}

/// Raw price text of the first row whose symbol matches
///
/// Unreadable rows are skipped. Later rows for the same symbol are logged
/// as duplicates and ignored.
fn find_price(bytes: &[u8], symbol: &Symbol) -> Result<Option<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let symbol_at = column(&headers, SYMBOL_COLUMN)?;
    let price_at = column(&headers, PRICE_COLUMN)?;

    let mut found: Option<String> = None;
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping unreadable CSV row {}: {e}", index + 1);
                continue;
            }
        };

        let Some(row_symbol) = record.get(symbol_at) else {
            continue;
        };
        if Symbol::new(row_symbol) != *symbol {
            continue;
        }

        let raw = record.get(price_at).unwrap_or_default();
        match &found {
            Some(_) => debug!("Ignoring duplicate CSV row for {symbol} (price {raw})"),
            None => found = Some(raw.to_string()),
        }
    }

    Ok(found)
}

fn column(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| MarketError::InvalidDataset(format!("missing '{name}' column")))
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|p| p.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn dataset_with(contents: &str) -> (NamedTempFile, LocalDataset) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        let dataset = LocalDataset::new(file.path());
        (file, dataset)
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let (_file, dataset) = dataset_with("symbol,price\naapl,175.64\nMSFT,330.21\n");

        assert_eq!(dataset.lookup(&Symbol::new("AAPL")).await, Some(175.64));
        assert_eq!(dataset.lookup(&Symbol::new("msft")).await, Some(330.21));
    }

    #[tokio::test]
    async fn test_lookup_miss() {
        let (_file, dataset) = dataset_with("symbol,price\nAAPL,175.64\n");
        assert_eq!(dataset.lookup(&Symbol::new("GOOGL")).await, None);
    }

    #[tokio::test]
    async fn test_first_duplicate_wins() {
        let (_file, dataset) = dataset_with("symbol,price\nAAPL,1.00\naapl,2.00\n");
        assert_eq!(dataset.lookup(&Symbol::new("AAPL")).await, Some(1.0));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = LocalDataset::new(dir.path().join("nope.csv"));

        assert_eq!(dataset.lookup(&Symbol::new("AAPL")).await, None);
    }

    #[tokio::test]
    async fn test_bad_price_only_affects_its_row() {
        let (_file, dataset) =
            dataset_with("symbol,price\nAAPL,175.64\nMSFT,N/A\nGOOGL,135.45\n");

        assert_eq!(dataset.lookup(&Symbol::new("AAPL")).await, Some(175.64));
        assert_eq!(dataset.lookup(&Symbol::new("GOOGL")).await, Some(135.45));
        assert_eq!(dataset.lookup(&Symbol::new("MSFT")).await, None);
    }

    #[tokio::test]
    async fn test_short_row_is_skipped() {
        let (_file, dataset) = dataset_with("symbol,price\nTSLA\nNVDA,495.22\n");

        assert_eq!(dataset.lookup(&Symbol::new("TSLA")).await, None);
        assert_eq!(dataset.lookup(&Symbol::new("NVDA")).await, Some(495.22));
    }

    #[tokio::test]
    async fn test_missing_price_column() {
        let (_file, dataset) = dataset_with("ticker,close\nAAPL,175.64\n");
        assert_eq!(dataset.lookup(&Symbol::new("AAPL")).await, None);
    }

    #[tokio::test]
    async fn test_extra_columns_and_whitespace() {
        let (_file, dataset) =
            dataset_with("note, price, symbol\ncached , 135.45 , GOOGL \n");
        assert_eq!(dataset.lookup(&Symbol::new("googl")).await, Some(135.45));
    }

    #[test]
    fn test_find_price_reports_raw_text() {
        let symbol = Symbol::new("MSFT");
        let raw = find_price(b"symbol,price\nMSFT,N/A\nMSFT,330.21\n", &symbol).unwrap();
        assert_eq!(raw.as_deref(), Some("N/A"));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("175.64"), Some(175.64));
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price("NaN"), None);
        assert_eq!(parse_price(""), None);
    }
}
