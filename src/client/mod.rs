pub mod market;

pub use market::MarketClient;
