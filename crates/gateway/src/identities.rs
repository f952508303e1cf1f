//! `identities_client.py` → `/v1/identities/<number>[/trust/<identity_number>]`.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use signalrt_http::{HttpClient, RequestOptions};

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityInfo {
    pub number: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub safety_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrustIdentityRequest {
    pub verified_safety_number: String,
}

pub struct IdentitiesClient {
    http: HttpClient,
}

impl IdentitiesClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, number: &str) -> Result<Vec<IdentityInfo>> {
        let body = self
            .http
            .request(Method::GET, &format!("/v1/identities/{number}"), RequestOptions::new())
            .await?;
        body.into_json()
    }

    pub async fn trust(
        &self,
        number: &str,
        identity_number: &str,
        request: &TrustIdentityRequest,
    ) -> Result<()> {
        self.http
            .request_json(
                Method::PUT,
                &format!("/v1/identities/{number}/trust/{identity_number}"),
                request,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }
}
