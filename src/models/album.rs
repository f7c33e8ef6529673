use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: u64,
    pub title: String,
    pub artist_name: String,
    #[serde(default)]
    pub genre: Option<String>,
    pub price_usd: f64,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub track_number: u32,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub price_usd: Option<f64>,
}

impl Album {
    /// Sum of known track durations; tracks without one contribute nothing.
    pub fn duration_seconds(&self) -> u64 {
        self.tracks
            .iter()
            .filter_map(|t| t.duration_seconds)
            .map(u64::from)
            .sum()
    }
}

/// Album summary as shown in the listing, prices in both denominations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumSummary {
    pub id: u64,
    pub title: String,
    pub artist_name: String,
    pub genre: Option<String>,
    pub price_usd: f64,
    pub price_sats: Option<u64>,
    pub cover_url: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub track_count: usize,
    pub sales: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumListing {
    pub albums: Vec<AlbumSummary>,
    pub pricing_available: bool,
    pub usd_per_btc: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackView {
    pub id: u64,
    pub title: String,
    pub track_number: u32,
    pub duration_seconds: Option<u32>,
    pub price_usd: Option<f64>,
    pub price_sats: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumDetail {
    pub id: u64,
    pub title: String,
    pub artist_name: String,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub price_usd: f64,
    pub price_sats: Option<u64>,
    pub pricing_available: bool,
    pub track_count: usize,
    pub duration_seconds: u64,
    pub tracks: Vec<TrackView>,
}
