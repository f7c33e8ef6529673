use crate::{
    error::MarketError,
    handlers::AppState,
    models::{AlbumDetail, AlbumListing, AlbumSummary, ApiResponse, TrackView},
    services::pricing::usd_to_sats_at,
};
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct AlbumQuery {
    pub genre: Option<String>,
    pub search: Option<String>,
}

/// One rate lookup per page; `None` when pricing is unavailable so the
/// page still renders with USD prices only.
async fn page_rate(state: &AppState) -> Option<f64> {
    match state.rates.get_rate().await {
        Ok(rate) => Some(rate),
        Err(e) => {
            tracing::warn!("Rendering prices without sats: {}", e);
            None
        }
    }
}

fn sats_at(usd: f64, rate: Option<f64>) -> Option<u64> {
    rate.and_then(|r| usd_to_sats_at(usd, r).ok())
}

pub async fn list_albums(
    State(state): State<AppState>,
    query: Result<Query<AlbumQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<AlbumListing>>, MarketError> {
    let Query(query) = query.map_err(|e| MarketError::InvalidRequest(e.body_text()))?;
    let albums = state
        .catalog
        .list(query.genre.as_deref(), query.search.as_deref())
        .await;
    let rate = page_rate(&state).await;
    let sales = state.payments.sales_by_album().await;

    let albums = albums
        .into_iter()
        .map(|album| AlbumSummary {
            price_sats: sats_at(album.price_usd, rate),
            sales: sales.get(&album.id).copied().unwrap_or(0),
            track_count: album.tracks.len(),
            id: album.id,
            title: album.title,
            artist_name: album.artist_name,
            genre: album.genre,
            price_usd: album.price_usd,
            cover_url: album.cover_url,
            release_date: album.release_date,
        })
        .collect();

    Ok(Json(ApiResponse::ok(AlbumListing {
        albums,
        pricing_available: rate.is_some(),
        usd_per_btc: rate,
    })))
}

pub async fn get_album(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<ApiResponse<AlbumDetail>>, MarketError> {
    let Path(id) = id.map_err(|e| MarketError::InvalidRequest(e.body_text()))?;
    let album = state.catalog.get(id).await?;
    let rate = page_rate(&state).await;

    let mut tracks: Vec<TrackView> = album
        .tracks
        .iter()
        .map(|track| TrackView {
            id: track.id,
            title: track.title.clone(),
            track_number: track.track_number,
            duration_seconds: track.duration_seconds,
            price_usd: track.price_usd,
            price_sats: track.price_usd.and_then(|usd| sats_at(usd, rate)),
        })
        .collect();
    tracks.sort_by_key(|t| t.track_number);

    Ok(Json(ApiResponse::ok(AlbumDetail {
        price_sats: sats_at(album.price_usd, rate),
        pricing_available: rate.is_some(),
        track_count: album.tracks.len(),
        duration_seconds: album.duration_seconds(),
        id: album.id,
        title: album.title,
        artist_name: album.artist_name,
        genre: album.genre,
        description: album.description,
        cover_url: album.cover_url,
        release_date: album.release_date,
        price_usd: album.price_usd,
        tracks,
    })))
}
