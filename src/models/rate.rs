use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SATS_PER_BTC: u64 = 100_000_000;

/// Rate handed to callers, tagged with whether it came from the stale fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub usd_per_btc: f64,
    pub fetched_at: DateTime<Utc>,
    pub stale: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    pub usd: f64,
    pub sats: u64,
}
