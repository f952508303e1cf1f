//! `receipts_client.py` → `POST /v1/receipts/<number>`.

use reqwest::Method;
use serde::Serialize;
use signalrt_http::{HttpClient, RequestOptions};

use crate::error::Result;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptType {
    Read,
    Viewed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiptRequest {
    pub recipient: String,
    pub receipt_type: ReceiptType,
    pub timestamp: i64,
}

pub struct ReceiptsClient {
    http: HttpClient,
}

impl ReceiptsClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn send_receipt(&self, number: &str, request: &ReceiptRequest) -> Result<()> {
        self.http
            .request_json(Method::POST, &format!("/v1/receipts/{number}"), request, RequestOptions::new())
            .await?;
        Ok(())
    }
}
