use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Price oracle unreachable: {0}")]
    OracleUnreachable(String),

    #[error("Invalid price oracle response: {0}")]
    InvalidOracleResponse(String),

    #[error("Pricing temporarily unavailable: no exchange rate could be obtained")]
    ExchangeRateUnavailable,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Album not found: {0}")]
    AlbumNotFound(u64),

    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    #[error("Invoice {payment_hash} was not issued for album {album_id}")]
    InvoiceMismatch { payment_hash: String, album_id: u64 },

    #[error("Payment not confirmed")]
    PaymentNotConfirmed,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<reqwest::Error> for MarketError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            MarketError::InvalidOracleResponse(e.to_string())
        } else {
            MarketError::OracleUnreachable(e.to_string())
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,
}

impl MarketError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            MarketError::ExchangeRateUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "PRICING_UNAVAILABLE")
            }
            MarketError::OracleUnreachable(_) | MarketError::InvalidOracleResponse(_) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
            }
            MarketError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
            MarketError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            MarketError::AlbumNotFound(_) => (StatusCode::NOT_FOUND, "ALBUM_NOT_FOUND"),
            MarketError::InvoiceNotFound(_) => (StatusCode::NOT_FOUND, "INVOICE_NOT_FOUND"),
            MarketError::InvoiceMismatch { .. } => (StatusCode::BAD_REQUEST, "INVOICE_MISMATCH"),
            MarketError::PaymentNotConfirmed => {
                (StatusCode::PAYMENT_REQUIRED, "PAYMENT_NOT_CONFIRMED")
            }
            MarketError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let (status, error_code) = self.status_and_code();

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id,
        };

        if status.is_server_error() {
            tracing::error!(
                error = ?self,
                error_code = error_code,
                "Request failed"
            );
        } else {
            tracing::warn!(
                error = %self,
                error_code = error_code,
                "Request rejected"
            );
        }

        (status, Json(body)).into_response()
    }
}
