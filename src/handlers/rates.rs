use crate::{
    error::MarketError,
    handlers::AppState,
    models::{ApiResponse, Conversion, RateQuote},
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

pub async fn get_rate(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RateQuote>>, MarketError> {
    let quote = state.rates.quote().await?;
    Ok(Json(ApiResponse::ok(quote)))
}

#[derive(Debug, Deserialize)]
pub struct ConvertParams {
    pub usd: Option<f64>,
    pub sats: Option<u64>,
}

pub async fn convert(
    State(state): State<AppState>,
    params: Result<Query<ConvertParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Conversion>>, MarketError> {
    let Query(params) = params.map_err(|e| MarketError::InvalidAmount(e.body_text()))?;

    let conversion = match (params.usd, params.sats) {
        (Some(usd), None) => Conversion {
            usd,
            sats: state.pricing.usd_to_sats(usd).await?,
        },
        (None, Some(sats)) => Conversion {
            usd: state.pricing.sats_to_usd(sats).await?,
            sats,
        },
        _ => {
            return Err(MarketError::InvalidAmount(
                "exactly one of `usd` or `sats` is required".to_string(),
            ))
        }
    };
    Ok(Json(ApiResponse::ok(conversion)))
}
