use anyhow::Result;
use sats_market::{config::Config, handlers::AppState, routes};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting sats-market v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {:?}", config.environment);
    tracing::info!("Price oracle: {}", config.price_oracle_url);

    let state = AppState::from_config(&config).await?;
    tracing::info!("Catalog holds {} albums", state.catalog.len().await);

    // Warm the rate cache; a failure here is served later as unavailable pricing.
    match state.rates.get_rate().await {
        Ok(rate) => tracing::info!("Initial BTC/USD rate: {:.2}", rate),
        Err(e) => tracing::warn!("Starting without an exchange rate: {}", e),
    }

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down gracefully...");
}
