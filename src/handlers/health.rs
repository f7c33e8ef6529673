use crate::{handlers::AppState, models::HealthStatus};
use axum::{extract::State, Json};
use chrono::Utc;

/// Reports cache state only; never calls the price oracle.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let cached = state.rates.peek().await;
    let rate_age = cached.map(|rate| rate.age());

    let status = match rate_age {
        Some(age) if age < state.rates.ttl() => "healthy",
        _ => "degraded",
    };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        rate_cached: cached.is_some(),
        rate_age_seconds: rate_age.map(|age| age.as_secs()),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
