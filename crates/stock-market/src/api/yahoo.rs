//! Yahoo Finance API client

use super::{MarketDataProvider, QuoteInfo};
use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
///
/// Daily bars come from the chart API through `yahoo_finance_api`; the info
/// record comes from the v7 quote endpoint.
///
/// The quote endpoint only answers requests carrying a session cookie and
/// the matching crumb. The first info request visits the session page,
/// fetches a crumb and caches it; a 401 drops the cached crumb and the
/// request is retried once with a fresh one.
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    http: Client,
    quote_api_base: String,
    session_url: String,
    crumb: Arc<Mutex<Option<String>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<QuoteInfo>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(config: &MarketConfig) -> Result<Self> {
        Self::with_builder(config, Client::builder())
    }

    fn with_builder(config: &MarketConfig, builder: ClientBuilder) -> Result<Self> {
        let http = builder
            .cookie_store(true)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            quote_api_base: config.quote_api_base.clone(),
            session_url: config.session_url.clone(),
            crumb: Arc::new(Mutex::new(None)),
        })
    }

    fn quote_url(&self) -> String {
        format!("{}/v7/finance/quote", self.quote_api_base)
    }

    fn crumb_url(&self) -> String {
        format!("{}/v1/test/getcrumb", self.quote_api_base)
    }

    /// Cached crumb, or a new one tied to a fresh session cookie
    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // Only the cookie matters; the page itself usually answers 404
        let session = self.http.get(self.session_url.as_str()).send().await?;
        debug!("Session page answered {}", session.status());

        let response = self.http.get(self.crumb_url()).send().await?;
        if !response.status().is_success() {
            return Err(MarketError::ApiError(format!(
                "HTTP {} from crumb endpoint",
                response.status()
            )));
        }

        let crumb = parse_crumb(&response.text().await?)?;
        debug!("Obtained quote endpoint crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn request_quote(&self, symbol: &str, crumb: &str) -> Result<Response> {
        Ok(self
            .http
            .get(self.quote_url())
            .query(&[("symbols", symbol), ("crumb", crumb)])
            .send()
            .await?)
    }
}

fn parse_crumb(body: &str) -> Result<String> {
    let crumb = body.trim();
    if crumb.is_empty() || crumb.contains(char::is_whitespace) || crumb.starts_with(['<', '{']) {
        return Err(MarketError::ApiError(format!(
            "unexpected crumb response: {crumb}"
        )));
    }
    Ok(crumb.to_string())
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn latest_close(&self, symbol: &str) -> Result<Option<f64>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        let response = provider
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        // Bars still forming can carry a 0 close
        let close = quotes
            .last()
            .map(|q| q.close)
            .filter(|c| c.is_finite() && *c > 0.0);

        debug!("Latest close for {symbol}: {close:?}");
        Ok(close)
    }

    async fn quote_info(&self, symbol: &str) -> Result<QuoteInfo> {
        let crumb = self.crumb().await?;
        let mut response = self.request_quote(symbol, &crumb).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Crumb rejected for {symbol}; refreshing session");
            self.crumb.lock().await.take();
            let crumb = self.crumb().await?;
            response = self.request_quote(symbol, &crumb).await?;
        }

        if !response.status().is_success() {
            return Err(MarketError::ApiError(format!(
                "HTTP {} from quote endpoint",
                response.status()
            )));
        }

        let envelope: QuoteEnvelope = response.json().await?;

        if let Some(error) = envelope.quote_response.error.filter(|e| !e.is_null()) {
            return Err(MarketError::YahooFinanceError(error.to_string()));
        }

        Ok(envelope
            .quote_response
            .result
            .into_iter()
            .next()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal HTTP stand-in for the session, crumb and quote endpoints
    ///
    /// Crumbs are numbered per issue; quote requests with a crumb listed in
    /// `stale` get a 401. Request targets are recorded in order.
    struct FakeYahoo {
        base: String,
        targets: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl FakeYahoo {
        async fn start(stale: &'static [&'static str]) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base = format!("http://{}", listener.local_addr().unwrap());
            let targets = Arc::new(std::sync::Mutex::new(Vec::new()));
            let issued = Arc::new(AtomicUsize::new(0));

            let recorded = Arc::clone(&targets);
            tokio::spawn(async move {
                loop {
                    let Ok((mut socket, _)) = listener.accept().await else {
                        break;
                    };
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        let n = socket.read(&mut buf).await.unwrap();
                        if n == 0 {
                            break;
                        }
                        request.extend_from_slice(&buf[..n]);
                    }

                    let head = String::from_utf8_lossy(&request).to_string();
                    let target = head.split_whitespace().nth(1).unwrap_or("").to_string();
                    recorded.lock().unwrap().push(target.clone());

                    let (status, extra, body) = if target == "/session" {
                        ("404 Not Found", "Set-Cookie: A3=session; Path=/\r\n", String::new())
                    } else if target == "/v1/test/getcrumb" {
                        let n = issued.fetch_add(1, Ordering::SeqCst) + 1;
                        ("200 OK", "", format!("crumb{n}"))
                    } else if stale.iter().any(|c| target.ends_with(&format!("crumb={c}"))) {
                        ("401 Unauthorized", "", "Invalid Crumb".to_string())
                    } else {
                        let body = json!({
                            "quoteResponse": {
                                "result": [{"symbol": "MSFT", "regularMarketPrice": 330.21}],
                                "error": null
                            }
                        });
                        ("200 OK", "", body.to_string())
                    };

                    let response = format!(
                        "HTTP/1.1 {status}\r\n{extra}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    socket.write_all(response.as_bytes()).await.unwrap();
                    socket.shutdown().await.ok();
                }
            });

            Self { base, targets }
        }

        fn client(&self) -> YahooFinanceClient {
            let config = MarketConfig::builder()
                .quote_api_base(self.base.clone())
                .session_url(format!("{}/session", self.base))
                .build()
                .unwrap();
            YahooFinanceClient::with_builder(&config, Client::builder().no_proxy()).unwrap()
        }

        fn targets(&self) -> Vec<String> {
            self.targets.lock().unwrap().clone()
        }
    }

    #[test]
    fn test_endpoint_urls() {
        let config = MarketConfig::builder()
            .quote_api_base("http://localhost:8080/")
            .build()
            .unwrap();
        let client = YahooFinanceClient::new(&config).unwrap();
        assert_eq!(client.quote_url(), "http://localhost:8080/v7/finance/quote");
        assert_eq!(client.crumb_url(), "http://localhost:8080/v1/test/getcrumb");
    }

    #[test]
    fn test_parse_crumb() {
        assert_eq!(parse_crumb("AbC.d/ef1\n").unwrap(), "AbC.d/ef1");
        assert!(parse_crumb("").is_err());
        assert!(parse_crumb("<html>Too Many Requests</html>").is_err());
        assert!(parse_crumb(r#"{"finance":{"error":{}}}"#).is_err());
    }

    #[test]
    fn test_envelope_parsing() {
        let envelope: QuoteEnvelope = serde_json::from_value(json!({
            "quoteResponse": {
                "result": [{"symbol": "MSFT", "regularMarketPrice": 330.21}],
                "error": null
            }
        }))
        .unwrap();

        assert!(envelope.quote_response.error.is_none());
        assert_eq!(
            envelope.quote_response.result[0].regular_market_price,
            Some(330.21)
        );
    }

    #[tokio::test]
    async fn test_quote_info_sends_crumb() {
        let yahoo = FakeYahoo::start(&[]).await;
        let client = yahoo.client();

        let info = client.quote_info("MSFT").await.unwrap();
        assert_eq!(info.regular_market_price, Some(330.21));

        client.quote_info("MSFT").await.unwrap();
        assert_eq!(
            yahoo.targets(),
            [
                "/session",
                "/v1/test/getcrumb",
                "/v7/finance/quote?symbols=MSFT&crumb=crumb1",
                "/v7/finance/quote?symbols=MSFT&crumb=crumb1",
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_crumb_is_refreshed_once() {
        let yahoo = FakeYahoo::start(&["crumb1"]).await;
        let client = yahoo.client();

        let info = client.quote_info("MSFT").await.unwrap();
        assert_eq!(info.regular_market_price, Some(330.21));
        assert_eq!(
            yahoo.targets(),
            [
                "/session",
                "/v1/test/getcrumb",
                "/v7/finance/quote?symbols=MSFT&crumb=crumb1",
                "/session",
                "/v1/test/getcrumb",
                "/v7/finance/quote?symbols=MSFT&crumb=crumb2",
            ]
        );
    }

    #[tokio::test]
    async fn test_persistent_rejection_is_an_api_error() {
        let yahoo = FakeYahoo::start(&["crumb1", "crumb2"]).await;
        let client = yahoo.client();

        let err = client.quote_info("MSFT").await.unwrap_err();
        assert!(matches!(err, MarketError::ApiError(msg) if msg.contains("401")));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_latest_close() {
        let client = YahooFinanceClient::new(&MarketConfig::default()).unwrap();
        let close = client.latest_close("AAPL").await.unwrap();
        assert!(close.unwrap() > 0.0);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_quote_info() {
        let client = YahooFinanceClient::new(&MarketConfig::default()).unwrap();
        let info = client.quote_info("MSFT").await.unwrap();
        assert_eq!(info.symbol.as_deref(), Some("MSFT"));
    }
}
