//! `devices_client.py` → `/v1/devices/<number>`, `/v1/qrcodelink`,
//! `/v1/register/<number>[/verify/<token>]`, `/v1/unregister/<number>`.

use reqwest::Method;
use serde::Deserialize;
use signalrt_http::{HttpClient, RequestOptions};

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceInfo {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QrCodeLink {
    #[serde(default)]
    pub device_link_uri: Option<String>,
}

pub struct DevicesClient {
    http: HttpClient,
}

impl DevicesClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, number: &str) -> Result<Vec<DeviceInfo>> {
        let body = self
            .http
            .request(Method::GET, &format!("/v1/devices/{number}"), RequestOptions::new())
            .await?;
        body.into_json()
    }

    pub async fn add(&self, number: &str, device_name: &str) -> Result<()> {
        self.http
            .request_json(
                Method::POST,
                &format!("/v1/devices/{number}"),
                &serde_json::json!({"uri": device_name}),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    pub async fn qrcodelink(&self) -> Result<QrCodeLink> {
        let body = self.http.request(Method::GET, "/v1/qrcodelink", RequestOptions::new()).await?;
        body.into_json()
    }

    pub async fn register(&self, number: &str) -> Result<()> {
        self.http
            .request(Method::POST, &format!("/v1/register/{number}"), RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn verify(&self, number: &str, token: &str) -> Result<()> {
        self.http
            .request(Method::POST, &format!("/v1/register/{number}/verify/{token}"), RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn unregister(&self, number: &str) -> Result<()> {
        self.http
            .request(Method::POST, &format!("/v1/unregister/{number}"), RequestOptions::new())
            .await?;
        Ok(())
    }
}
