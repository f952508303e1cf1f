//! `general_client.py` → `/v1/about`, `/v1/configuration[/<number>/settings]`,
//! `/v1/health`.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use signalrt_http::{HttpClient, RequestOptions};

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct AboutInfo {
    pub versions: Vec<String>,
    #[serde(default)]
    pub build: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
}

pub struct GeneralClient {
    http: HttpClient,
}

impl GeneralClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn about(&self) -> Result<AboutInfo> {
        let body = self.http.request(Method::GET, "/v1/about", RequestOptions::new()).await?;
        body.into_json()
    }

    pub async fn configuration(&self) -> Result<serde_json::Value> {
        let body = self
            .http
            .request(Method::GET, "/v1/configuration", RequestOptions::new())
            .await?;
        body.into_json()
    }

    pub async fn set_configuration<B: Serialize>(&self, config: &B) -> Result<()> {
        self.http
            .request_json(Method::POST, "/v1/configuration", config, RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn settings(&self, number: &str) -> Result<serde_json::Value> {
        let body = self
            .http
            .request(Method::GET, &format!("/v1/configuration/{number}/settings"), RequestOptions::new())
            .await?;
        body.into_json()
    }

    pub async fn set_settings<B: Serialize>(&self, number: &str, settings: &B) -> Result<()> {
        self.http
            .request_json(
                Method::POST,
                &format!("/v1/configuration/{number}/settings"),
                settings,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let body = self.http.request(Method::GET, "/v1/health", RequestOptions::new()).await?;
        body.into_json()
    }
}
