use crate::{error::MarketError, models::SATS_PER_BTC, services::RateCache};
use std::sync::Arc;

/// `round(usd / usd_per_btc * 1e8)`.
pub fn usd_to_sats_at(usd: f64, usd_per_btc: f64) -> Result<u64, MarketError> {
    if !usd.is_finite() || usd < 0.0 {
        return Err(MarketError::InvalidAmount(format!(
            "USD amount must be a non-negative number, got {}",
            usd
        )));
    }
    let sats = (usd / usd_per_btc * SATS_PER_BTC as f64).round();
    // `u64::MAX as f64` rounds up to 2^64, which does not fit.
    if sats >= u64::MAX as f64 {
        return Err(MarketError::InvalidAmount(format!("USD amount too large: {}", usd)));
    }
    Ok(sats as u64)
}

/// `sats / 1e8 * usd_per_btc`, unrounded.
pub fn sats_to_usd_at(sats: u64, usd_per_btc: f64) -> f64 {
    sats as f64 / SATS_PER_BTC as f64 * usd_per_btc
}

/// USD⇄sats conversion at the cached market rate.
pub struct PriceConverter {
    rates: Arc<RateCache>,
}

impl PriceConverter {
    pub fn new(rates: Arc<RateCache>) -> Self {
        Self { rates }
    }

    pub async fn usd_to_sats(&self, usd: f64) -> Result<u64, MarketError> {
        let rate = self.rates.get_rate().await?;
        usd_to_sats_at(usd, rate)
    }

    pub async fn sats_to_usd(&self, sats: u64) -> Result<f64, MarketError> {
        let rate = self.rates.get_rate().await?;
        Ok(sats_to_usd_at(sats, rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::rate_cache::{tests::ScriptedOracle, DEFAULT_RATE_TTL};

    fn converter(rate: f64) -> PriceConverter {
        PriceConverter::new(Arc::new(RateCache::new(
            ScriptedOracle::fixed(rate),
            DEFAULT_RATE_TTL,
        )))
    }

    #[test]
    fn ten_dollars_at_fifty_thousand() {
        assert_eq!(usd_to_sats_at(10.00, 50_000.0).unwrap(), 20_000);
        assert_eq!(sats_to_usd_at(20_000, 50_000.0), 10.0);
    }

    #[test]
    fn zero_usd_is_zero_sats() {
        assert_eq!(usd_to_sats_at(0.0, 50_000.0).unwrap(), 0);
        assert_eq!(usd_to_sats_at(0.0, 123_456.78).unwrap(), 0);
    }

    #[test]
    fn rounds_to_nearest_sat() {
        // 0.01 / 30_000 * 1e8 = 33.33...
        assert_eq!(usd_to_sats_at(0.01, 30_000.0).unwrap(), 33);
        // 0.02 / 30_000 * 1e8 = 66.66...
        assert_eq!(usd_to_sats_at(0.02, 30_000.0).unwrap(), 67);
    }

    #[test]
    fn round_trip_within_one_sat() {
        for rate in [17_345.12, 50_000.0, 64_210.55, 250_000.0] {
            let one_sat_usd = rate / SATS_PER_BTC as f64;
            for usd in [0.01, 0.99, 1.0, 7.5, 9.99, 12.34, 100.0, 1234.56] {
                let back = sats_to_usd_at(usd_to_sats_at(usd, rate).unwrap(), rate);
                assert!(
                    (back - usd).abs() <= one_sat_usd,
                    "usd={} rate={} back={}",
                    usd,
                    rate,
                    back
                );
            }
        }
    }

    #[test]
    fn rejects_amounts_beyond_u64() {
        // Exactly 2^64 sats at a rate of 1 USD/BTC.
        assert!(matches!(
            usd_to_sats_at(184_467_440_737.095_516_16, 1.0),
            Err(MarketError::InvalidAmount(_))
        ));
        assert!(usd_to_sats_at(1.0e12, 1.0).is_err());
        assert!(usd_to_sats_at(1_000.0, 1.0).is_ok());
    }

    #[test]
    fn rejects_negative_and_nan() {
        assert!(matches!(
            usd_to_sats_at(-1.0, 50_000.0),
            Err(MarketError::InvalidAmount(_))
        ));
        assert!(usd_to_sats_at(f64::NAN, 50_000.0).is_err());
        assert!(usd_to_sats_at(f64::INFINITY, 50_000.0).is_err());
    }

    #[tokio::test]
    async fn converts_through_cache() {
        let converter = converter(50_000.0);

        assert_eq!(converter.usd_to_sats(10.0).await.unwrap(), 20_000);
        assert_eq!(converter.sats_to_usd(20_000).await.unwrap(), 10.0);
    }

    #[tokio::test]
    async fn propagates_unavailable_rate() {
        let converter = PriceConverter::new(Arc::new(RateCache::new(
            ScriptedOracle::new(vec![None]),
            DEFAULT_RATE_TTL,
        )));

        tokio_test::assert_err!(converter.usd_to_sats(5.0).await);
        assert!(matches!(
            converter.sats_to_usd(1_000).await,
            Err(MarketError::ExchangeRateUnavailable)
        ));
    }
}
