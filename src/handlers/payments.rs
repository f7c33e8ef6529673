use crate::{
    error::MarketError,
    handlers::AppState,
    models::{ApiResponse, CreateInvoiceRequest, InvoiceResponse, Purchase, VerifyPurchaseRequest},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

pub async fn create_invoice(
    State(state): State<AppState>,
    request: Result<Json<CreateInvoiceRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<InvoiceResponse>>, MarketError> {
    let Json(request) = request.map_err(|e| MarketError::InvalidRequest(e.body_text()))?;
    let invoice = state.payments.create_invoice(request.album_id).await?;
    Ok(Json(ApiResponse::ok(invoice)))
}

pub async fn verify_purchase(
    State(state): State<AppState>,
    request: Result<Json<VerifyPurchaseRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Purchase>>, MarketError> {
    let Json(request) = request.map_err(|e| MarketError::InvalidRequest(e.body_text()))?;
    let purchase = state
        .payments
        .verify_purchase(request.payment_hash.trim(), request.album_id)
        .await?;
    Ok(Json(ApiResponse::ok(purchase)))
}
