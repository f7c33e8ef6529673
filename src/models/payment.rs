use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub payment_request: String,
    pub payment_hash: String,
    pub amount_sats: u64,
    pub memo: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Settled,
    /// Expired or never issued by this node.
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    pub album_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub album_id: u64,
    pub payment_request: String,
    pub payment_hash: String,
    pub amount_sats: u64,
    pub price_usd: f64,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPurchaseRequest {
    pub payment_hash: String,
    pub album_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub payment_hash: String,
    pub album_id: u64,
    pub amount_sats: u64,
    pub price_usd: f64,
    pub purchased_at: DateTime<Utc>,
}
