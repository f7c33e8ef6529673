use crate::{
    error::MarketError,
    models::{Invoice, InvoiceStatus},
};
use async_trait::async_trait;
use chrono::Utc;
use moka::future::Cache;
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_INVOICE_EXPIRY: Duration = Duration::from_secs(15 * 60);

/// Lightning rail used to request and check payments.
#[async_trait]
pub trait LightningNode: Send + Sync {
    async fn create_invoice(&self, amount_sats: u64, memo: &str) -> Result<Invoice, MarketError>;

    async fn invoice_status(&self, payment_hash: &str) -> Result<InvoiceStatus, MarketError>;
}

#[derive(Clone)]
struct IssuedInvoice {
    invoice: Invoice,
    settled: bool,
}

/// Stand-in node: invoices live in memory until they expire and settle
/// either immediately (`auto_settle`) or through [`MockLightningNode::settle`].
pub struct MockLightningNode {
    invoices: Cache<String, IssuedInvoice>,
    expiry: Duration,
    auto_settle: bool,
}

impl MockLightningNode {
    pub fn new(expiry: Duration, auto_settle: bool) -> Self {
        let invoices = Cache::builder()
            .max_capacity(100_000)
            .time_to_live(expiry)
            .build();

        tracing::info!(
            "Mock Lightning node ready (expiry: {}s, auto-settle: {})",
            expiry.as_secs(),
            auto_settle
        );

        Self {
            invoices,
            expiry,
            auto_settle,
        }
    }

    /// Marks a pending invoice as paid. Returns false if it is unknown or expired.
    pub async fn settle(&self, payment_hash: &str) -> bool {
        match self.invoices.get(payment_hash).await {
            Some(mut issued) => {
                issued.settled = true;
                tracing::info!(
                    "Invoice {} settled ({} sats)",
                    payment_hash,
                    issued.invoice.amount_sats
                );
                self.invoices.insert(payment_hash.to_string(), issued).await;
                true
            }
            None => false,
        }
    }

    fn random_hex32() -> String {
        let mut bytes = [0u8; 32];
        bytes[..16].copy_from_slice(Uuid::new_v4().as_bytes());
        bytes[16..].copy_from_slice(Uuid::new_v4().as_bytes());
        hex::encode(bytes)
    }
}

#[async_trait]
impl LightningNode for MockLightningNode {
    async fn create_invoice(&self, amount_sats: u64, memo: &str) -> Result<Invoice, MarketError> {
        if amount_sats == 0 {
            return Err(MarketError::InvalidAmount(
                "invoice amount must be at least 1 sat".to_string(),
            ));
        }

        let payment_hash = Self::random_hex32();
        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.expiry)
                .map_err(|e| MarketError::InternalError(e.to_string()))?;

        // 1 sat = 10 nano-BTC in the BOLT11 amount field.
        let payment_request = format!(
            "lnbc{}n1p{}",
            amount_sats.saturating_mul(10),
            &Self::random_hex32()[..52]
        );
        let invoice = Invoice {
            payment_request,
            payment_hash: payment_hash.clone(),
            amount_sats,
            memo: memo.to_string(),
            expires_at,
        };

        self.invoices
            .insert(
                payment_hash.clone(),
                IssuedInvoice {
                    invoice: invoice.clone(),
                    settled: self.auto_settle,
                },
            )
            .await;

        tracing::info!(
            "Invoice issued: {} sats, hash {} ({})",
            amount_sats,
            payment_hash,
            memo
        );

        Ok(invoice)
    }

    async fn invoice_status(&self, payment_hash: &str) -> Result<InvoiceStatus, MarketError> {
        let status = match self.invoices.get(payment_hash).await {
            Some(issued) if issued.settled => InvoiceStatus::Settled,
            Some(_) => InvoiceStatus::Pending,
            None => InvoiceStatus::Unknown,
        };
        tracing::debug!("Invoice {} status: {:?}", payment_hash, status);
        Ok(status)
    }
}
