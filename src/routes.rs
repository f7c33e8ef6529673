use crate::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/rate", get(get_rate))
        .route("/api/convert", get(convert))
        .route("/api/albums", get(list_albums))
        .route("/api/albums/:id", get(get_album))
        .route("/api/payments/create-invoice", post(create_invoice))
        .route("/api/purchases/verify", post(verify_purchase))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
