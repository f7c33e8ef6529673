use crate::error::MarketError;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Source of the BTC/USD exchange rate.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn fetch_btc_usd(&self) -> Result<f64, MarketError>;
}

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    bitcoin: BitcoinPrice,
}

#[derive(Debug, Deserialize)]
struct BitcoinPrice {
    usd: f64,
}

/// CoinGecko `simple/price` client.
pub struct CoinGeckoOracle {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoOracle {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sats-market/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl PriceOracle for CoinGeckoOracle {
    async fn fetch_btc_usd(&self) -> Result<f64, MarketError> {
        let response = self
            .client
            .get(format!("{}/simple/price", self.base_url))
            .query(&[("ids", "bitcoin"), ("vs_currencies", "usd")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketError::OracleUnreachable(format!(
                "price oracle returned {}",
                status
            )));
        }

        let body: SimplePriceResponse = response.json().await?;
        let rate = body.bitcoin.usd;

        if !rate.is_finite() || rate <= 0.0 {
            return Err(MarketError::InvalidOracleResponse(format!(
                "non-positive BTC/USD rate: {}",
                rate
            )));
        }

        tracing::debug!("Price oracle quoted BTC/USD {:.2}", rate);
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::RateCache;
    use mockito::Matcher;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn price_query() -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("ids".into(), "bitcoin".into()),
            Matcher::UrlEncoded("vs_currencies".into(), "usd".into()),
        ])
    }

    /// Answers the first `answered` connections with a 50 000 USD quote, then
    /// accepts further connections and never replies.
    async fn stalling_server(answered: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let mut held = Vec::new();
            let mut served = 0;
            while let Ok((mut socket, _)) = listener.accept().await {
                if served < answered {
                    served += 1;
                    let mut buf = [0u8; 2048];
                    let _ = socket.read(&mut buf).await;
                    let body = r#"{"bitcoin":{"usd":50000}}"#;
                    let reply = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(reply.as_bytes()).await;
                    let _ = socket.shutdown().await;
                } else {
                    held.push(socket);
                }
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn parses_simple_price_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/simple/price")
            .match_query(price_query())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"bitcoin":{"usd":50000.5}}"#)
            .create_async()
            .await;

        let oracle = CoinGeckoOracle::new(&server.url(), Duration::from_secs(5)).unwrap();
        let rate = oracle.fetch_btc_usd().await.unwrap();

        assert_eq!(rate, 50000.5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_unreachable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/simple/price")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let oracle = CoinGeckoOracle::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = oracle.fetch_btc_usd().await.unwrap_err();

        assert!(matches!(err, MarketError::OracleUnreachable(_)));
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/simple/price")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"ethereum":{"usd":3000}}"#)
            .create_async()
            .await;

        let oracle = CoinGeckoOracle::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = oracle.fetch_btc_usd().await.unwrap_err();

        assert!(matches!(err, MarketError::InvalidOracleResponse(_)));
    }

    #[tokio::test]
    async fn zero_rate_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/simple/price")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"bitcoin":{"usd":0}}"#)
            .create_async()
            .await;

        let oracle = CoinGeckoOracle::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = oracle.fetch_btc_usd().await.unwrap_err();

        assert!(matches!(err, MarketError::InvalidOracleResponse(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_unreachable() {
        // Nothing listens on the discard port.
        let oracle = CoinGeckoOracle::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = oracle.fetch_btc_usd().await.unwrap_err();

        assert!(matches!(err, MarketError::OracleUnreachable(_)));
    }

    #[tokio::test]
    async fn timeout_is_unreachable() {
        let url = stalling_server(0).await;
        let oracle = CoinGeckoOracle::new(&url, Duration::from_secs(1)).unwrap();

        let started = std::time::Instant::now();
        let err = oracle.fetch_btc_usd().await.unwrap_err();

        assert!(matches!(err, MarketError::OracleUnreachable(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn timeout_on_cold_cache_is_unavailable() {
        let url = stalling_server(0).await;
        let oracle = Arc::new(CoinGeckoOracle::new(&url, Duration::from_secs(1)).unwrap());
        let cache = RateCache::new(oracle, Duration::from_secs(300));

        assert!(matches!(
            cache.get_rate().await,
            Err(MarketError::ExchangeRateUnavailable)
        ));
    }

    #[tokio::test]
    async fn timeout_after_success_serves_stale_rate() {
        let url = stalling_server(1).await;
        let oracle = Arc::new(CoinGeckoOracle::new(&url, Duration::from_secs(1)).unwrap());
        // Zero TTL: every call goes to the oracle.
        let cache = RateCache::new(oracle, Duration::ZERO);

        let first = cache.quote().await.unwrap();
        assert_eq!(first.usd_per_btc, 50_000.0);
        assert!(!first.stale);

        let second = cache.quote().await.unwrap();
        assert_eq!(second.usd_per_btc, 50_000.0);
        assert!(second.stale);
    }
}
