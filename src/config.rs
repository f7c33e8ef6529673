use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ORACLE_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Testnet,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Price oracle
    pub price_oracle_url: String,
    pub oracle_timeout_secs: u64,
    pub rate_cache_ttl_secs: u64,

    // Lightning placeholder
    pub invoice_expiry_secs: u64,
    pub mock_auto_settle: bool,

    // Catalog seed
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            environment: Self::parse_environment()?,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_var("PORT", "8080")?,

            price_oracle_url: std::env::var("PRICE_ORACLE_URL")
                .unwrap_or_else(|_| DEFAULT_ORACLE_URL.to_string()),
            oracle_timeout_secs: Self::parse_var("ORACLE_TIMEOUT_SECS", "10")?,
            rate_cache_ttl_secs: Self::parse_var("RATE_CACHE_TTL_SECS", "300")?,

            invoice_expiry_secs: Self::parse_var("INVOICE_EXPIRY_SECS", "900")?,
            mock_auto_settle: Self::parse_var("MOCK_AUTO_SETTLE", "true")?,

            catalog_path: std::env::var("CATALOG_PATH").ok().map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    pub fn rate_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.rate_cache_ttl_secs)
    }

    pub fn invoice_expiry(&self) -> Duration {
        Duration::from_secs(self.invoice_expiry_secs)
    }

    fn parse_environment() -> Result<Environment> {
        let env = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        Self::environment_from_str(&env)
    }

    fn environment_from_str(env: &str) -> Result<Environment> {
        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" | "test" => Ok(Environment::Testnet),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn parse_var<T>(var: &str, default: &str) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        std::env::var(var)
            .unwrap_or_else(|_| default.to_string())
            .parse()
            .with_context(|| format!("Invalid {}", var))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.price_oracle_url.starts_with("http") {
            bail!("PRICE_ORACLE_URL must be HTTP(S) URL");
        }
        if self.rate_cache_ttl_secs == 0 {
            bail!("RATE_CACHE_TTL_SECS must be greater than zero");
        }
        if self.oracle_timeout_secs == 0 || self.oracle_timeout_secs > 60 {
            bail!("ORACLE_TIMEOUT_SECS must be between 1 and 60");
        }
        if self.invoice_expiry_secs == 0 {
            bail!("INVOICE_EXPIRY_SECS must be greater than zero");
        }
        if self.environment == Environment::Production && self.mock_auto_settle {
            tracing::warn!("MOCK_AUTO_SETTLE is enabled in production; every invoice settles immediately");
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            environment: Environment::Development,
            host: "127.0.0.1".to_string(),
            port: 8080,
            price_oracle_url: DEFAULT_ORACLE_URL.to_string(),
            oracle_timeout_secs: 10,
            rate_cache_ttl_secs: 300,
            invoice_expiry_secs: 900,
            mock_auto_settle: true,
            catalog_path: None,
        }
    }

    #[test]
    fn accepts_defaults() {
        assert!(sample().validate().is_ok());
        assert_eq!(sample().rate_cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn rejects_non_http_oracle() {
        let mut config = sample();
        config.price_oracle_url = "ftp://prices".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unbounded_timeout() {
        let mut config = sample();
        config.oracle_timeout_secs = 0;
        assert!(config.validate().is_err());
        config.oracle_timeout_secs = 120;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_environment_aliases() {
        assert_eq!(Config::environment_from_str("PROD").unwrap(), Environment::Production);
        assert_eq!(Config::environment_from_str("test").unwrap(), Environment::Testnet);
        assert!(Config::environment_from_str("staging").is_err());
    }
}
