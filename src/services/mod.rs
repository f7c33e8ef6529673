pub mod catalog;
pub mod lightning;
pub mod oracle;
pub mod payments;
pub mod pricing;
pub mod rate_cache;

pub use catalog::Catalog;
pub use lightning::{LightningNode, MockLightningNode};
pub use oracle::{CoinGeckoOracle, PriceOracle};
pub use payments::PaymentService;
pub use pricing::PriceConverter;
pub use rate_cache::{ExchangeRate, RateCache};
