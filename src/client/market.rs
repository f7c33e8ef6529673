use crate::{
    error::ErrorResponse,
    models::{
        AlbumListing, ApiResponse, CreateInvoiceRequest, InvoiceResponse, Purchase, RateQuote,
        VerifyPurchaseRequest,
    },
};
use anyhow::{bail, Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// HTTP client for a running marketplace.
pub struct MarketClient {
    base_url: String,
    client: Client,
}

impl MarketClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub async fn rate(&self) -> Result<RateQuote> {
        let response = self
            .client
            .get(format!("{}/api/rate", self.base_url))
            .send()
            .await?;
        Self::unwrap_data(response).await
    }

    pub async fn list_albums(&self, search: Option<&str>) -> Result<AlbumListing> {
        let mut request = self.client.get(format!("{}/api/albums", self.base_url));
        if let Some(search) = search {
            request = request.query(&[("search", search)]);
        }
        Self::unwrap_data(request.send().await?).await
    }

    pub async fn create_invoice(&self, album_id: u64) -> Result<InvoiceResponse> {
        let response = self
            .client
            .post(format!("{}/api/payments/create-invoice", self.base_url))
            .json(&CreateInvoiceRequest { album_id })
            .send()
            .await?;
        Self::unwrap_data(response).await
    }

    pub async fn verify_purchase(&self, payment_hash: &str, album_id: u64) -> Result<Purchase> {
        let response = self
            .client
            .post(format!("{}/api/purchases/verify", self.base_url))
            .json(&VerifyPurchaseRequest {
                payment_hash: payment_hash.to_string(),
                album_id,
            })
            .send()
            .await?;
        Self::unwrap_data(response).await
    }

    async fn unwrap_data<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => bail!("{} ({}): {}", status, err.error_code, err.error),
                Err(_) => bail!("{}: {}", status, body),
            }
        }

        let body: ApiResponse<T> = response
            .json()
            .await
            .context("Unexpected response body")?;
        Ok(body.data)
    }
}
