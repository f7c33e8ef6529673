use crate::{error::MarketError, models::RateQuote, services::PriceOracle};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

pub const DEFAULT_RATE_TTL: Duration = Duration::from_secs(5 * 60);

/// Last rate obtained from the oracle. Both fields are replaced together.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeRate {
    pub usd_per_btc: f64,
    pub fetched_at: DateTime<Utc>,
    fetched: Instant,
}

impl ExchangeRate {
    pub fn age(&self) -> Duration {
        self.fetched.elapsed()
    }
}

/// One-slot BTC/USD cache in front of a [`PriceOracle`].
///
/// A fresh value is served without I/O. Once it expires the next caller
/// refetches; if that fails, the previous value is served regardless of age.
/// Concurrent callers hitting an expired slot may each fetch.
pub struct RateCache {
    oracle: Arc<dyn PriceOracle>,
    ttl: Duration,
    slot: RwLock<Option<ExchangeRate>>,
}

impl RateCache {
    pub fn new(oracle: Arc<dyn PriceOracle>, ttl: Duration) -> Self {
        Self {
            oracle,
            ttl,
            slot: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current BTC/USD rate, possibly stale when the oracle is failing.
    pub async fn get_rate(&self) -> Result<f64, MarketError> {
        self.quote().await.map(|q| q.usd_per_btc)
    }

    pub async fn quote(&self) -> Result<RateQuote, MarketError> {
        let cached = *self.slot.read().await;

        if let Some(rate) = cached {
            if rate.age() < self.ttl {
                tracing::debug!("Exchange rate cache hit: {:.2}", rate.usd_per_btc);
                return Ok(RateQuote {
                    usd_per_btc: rate.usd_per_btc,
                    fetched_at: rate.fetched_at,
                    stale: false,
                });
            }
        }

        match self.oracle.fetch_btc_usd().await {
            Ok(usd_per_btc) if usd_per_btc.is_finite() && usd_per_btc > 0.0 => {
                let fresh = ExchangeRate {
                    usd_per_btc,
                    fetched_at: Utc::now(),
                    fetched: Instant::now(),
                };
                *self.slot.write().await = Some(fresh);

                tracing::info!("Exchange rate refreshed: BTC/USD {:.2}", usd_per_btc);

                Ok(RateQuote {
                    usd_per_btc,
                    fetched_at: fresh.fetched_at,
                    stale: false,
                })
            }
            Ok(bad) => self.fall_back(
                cached,
                MarketError::InvalidOracleResponse(format!("non-positive rate {}", bad)),
            ),
            Err(e) => self.fall_back(cached, e),
        }
    }

    fn fall_back(
        &self,
        cached: Option<ExchangeRate>,
        error: MarketError,
    ) -> Result<RateQuote, MarketError> {
        // `cached` is the value read before the fetch, even if another caller has since refreshed.
        match cached {
            Some(rate) => {
                tracing::warn!(
                    "Failed to fetch BTC/USD rate: {}; serving cached rate {:.2} ({}s old)",
                    error,
                    rate.usd_per_btc,
                    rate.age().as_secs()
                );
                Ok(RateQuote {
                    usd_per_btc: rate.usd_per_btc,
                    fetched_at: rate.fetched_at,
                    stale: true,
                })
            }
            None => {
                tracing::error!("Failed to fetch BTC/USD rate and none cached: {}", error);
                Err(MarketError::ExchangeRateUnavailable)
            }
        }
    }

    /// Cached entry without touching the oracle.
    pub async fn peek(&self) -> Option<ExchangeRate> {
        *self.slot.read().await
    }
}
