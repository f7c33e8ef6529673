use crate::{
    error::MarketError,
    models::{InvoiceResponse, InvoiceStatus, Purchase},
    services::{Catalog, LightningNode, PriceConverter},
};
use chrono::Utc;
use moka::future::Cache;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// What an invoice was issued for, captured at purchase time.
#[derive(Debug, Clone)]
struct Order {
    album_id: u64,
    amount_sats: u64,
    price_usd: f64,
}

/// Invoice creation and purchase verification for albums.
pub struct PaymentService {
    catalog: Arc<Catalog>,
    pricing: Arc<PriceConverter>,
    node: Arc<dyn LightningNode>,
    orders: Cache<String, Order>,
    purchases: RwLock<HashMap<String, Purchase>>,
}

impl PaymentService {
    pub fn new(
        catalog: Arc<Catalog>,
        pricing: Arc<PriceConverter>,
        node: Arc<dyn LightningNode>,
        invoice_expiry: Duration,
    ) -> Self {
        Self {
            catalog,
            pricing,
            node,
            orders: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(invoice_expiry)
                .build(),
            purchases: RwLock::new(HashMap::new()),
        }
    }

    /// Prices the album in sats at the current rate and requests an invoice.
    pub async fn create_invoice(&self, album_id: u64) -> Result<InvoiceResponse, MarketError> {
        let album = self.catalog.get(album_id).await?;
        let amount_sats = self.pricing.usd_to_sats(album.price_usd).await?;

        if amount_sats == 0 {
            return Err(MarketError::InvalidAmount(format!(
                "album {} is priced below one sat",
                album_id
            )));
        }

        let memo = format!("{} - {}", album.artist_name, album.title);
        let invoice = self.node.create_invoice(amount_sats, &memo).await?;

        self.orders
            .insert(
                invoice.payment_hash.clone(),
                Order {
                    album_id,
                    amount_sats,
                    price_usd: album.price_usd,
                },
            )
            .await;

        Ok(InvoiceResponse {
            album_id,
            payment_request: invoice.payment_request,
            payment_hash: invoice.payment_hash,
            amount_sats,
            price_usd: album.price_usd,
            expires_at: invoice.expires_at,
        })
    }

    /// Records the purchase once the invoice is settled. Repeat calls return
    /// the purchase already recorded.
    pub async fn verify_purchase(
        &self,
        payment_hash: &str,
        album_id: u64,
    ) -> Result<Purchase, MarketError> {
        if let Some(existing) = self.purchases.read().await.get(payment_hash) {
            if existing.album_id != album_id {
                return Err(MarketError::InvoiceMismatch {
                    payment_hash: payment_hash.to_string(),
                    album_id,
                });
            }
            return Ok(existing.clone());
        }

        let order = self
            .orders
            .get(payment_hash)
            .await
            .ok_or_else(|| MarketError::InvoiceNotFound(payment_hash.to_string()))?;

        if order.album_id != album_id {
            return Err(MarketError::InvoiceMismatch {
                payment_hash: payment_hash.to_string(),
                album_id,
            });
        }

        match self.node.invoice_status(payment_hash).await? {
            InvoiceStatus::Settled => {}
            status => {
                tracing::info!("Payment {} not confirmed: {:?}", payment_hash, status);
                return Err(MarketError::PaymentNotConfirmed);
            }
        }

        let mut purchases = self.purchases.write().await;
        let purchase = purchases
            .entry(payment_hash.to_string())
            .or_insert_with(|| Purchase {
                payment_hash: payment_hash.to_string(),
                album_id,
                amount_sats: order.amount_sats,
                price_usd: order.price_usd,
                purchased_at: Utc::now(),
            })
            .clone();

        tracing::info!(
            "Purchase recorded: album {} for {} sats (${:.2})",
            album_id,
            purchase.amount_sats,
            purchase.price_usd
        );

        Ok(purchase)
    }

    pub async fn sales_by_album(&self) -> HashMap<u64, u64> {
        let mut sales = HashMap::new();
        for purchase in self.purchases.read().await.values() {
            *sales.entry(purchase.album_id).or_insert(0) += 1;
        }
        sales
    }
}
