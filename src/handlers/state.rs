use crate::{
    config::Config,
    services::{
        Catalog, CoinGeckoOracle, LightningNode, MockLightningNode, PaymentService,
        PriceConverter, PriceOracle, RateCache,
    },
};
use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct AppState {
    pub rates: Arc<RateCache>,
    pub pricing: Arc<PriceConverter>,
    pub catalog: Arc<Catalog>,
    pub payments: Arc<PaymentService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        oracle: Arc<dyn PriceOracle>,
        rate_ttl: Duration,
        catalog: Arc<Catalog>,
        node: Arc<dyn LightningNode>,
        invoice_expiry: Duration,
    ) -> Self {
        let rates = Arc::new(RateCache::new(oracle, rate_ttl));
        let pricing = Arc::new(PriceConverter::new(rates.clone()));
        let payments = Arc::new(PaymentService::new(
            catalog.clone(),
            pricing.clone(),
            node,
            invoice_expiry,
        ));

        Self {
            rates,
            pricing,
            catalog,
            payments,
            started_at: Instant::now(),
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let oracle = Arc::new(CoinGeckoOracle::new(
            &config.price_oracle_url,
            config.oracle_timeout(),
        )?);

        let catalog = match &config.catalog_path {
            Some(path) => Catalog::from_json_file(path).await?,
            None => {
                tracing::warn!("CATALOG_PATH not set, starting with an empty catalog");
                Catalog::default()
            }
        };

        let node = Arc::new(MockLightningNode::new(
            config.invoice_expiry(),
            config.mock_auto_settle,
        ));

        Ok(Self::new(
            oracle,
            config.rate_cache_ttl(),
            Arc::new(catalog),
            node,
            config.invoice_expiry(),
        ))
    }
}
