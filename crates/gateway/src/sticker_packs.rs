//! `sticker_packs_client.py` → `/v1/sticker-packs[/<number>]`.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use signalrt_http::{HttpClient, RequestOptions};

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct StickerPackInfo {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddStickerPackRequest {
    pub pack_id: String,
    pub pack_key: String,
}

pub struct StickerPacksClient {
    http: HttpClient,
}

impl StickerPacksClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<StickerPackInfo>> {
        let body = self.http.request(Method::GET, "/v1/sticker-packs", RequestOptions::new()).await?;
        body.into_json()
    }

    pub async fn add(&self, number: &str, request: &AddStickerPackRequest) -> Result<()> {
        self.http
            .request_json(Method::POST, &format!("/v1/sticker-packs/{number}"), request, RequestOptions::new())
            .await?;
        Ok(())
    }
}
