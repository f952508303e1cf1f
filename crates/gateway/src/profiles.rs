//! `profiles_client.py` → `/v1/profiles/<number>`.

use reqwest::Method;
use serde::Serialize;
use signalrt_http::{HttpClient, RequestOptions};

use crate::error::Result;

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64_avatar: Option<String>,
}

pub struct ProfilesClient {
    http: HttpClient,
}

impl ProfilesClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn update(&self, number: &str, request: &UpdateProfileRequest) -> Result<()> {
        self.http
            .request_json(Method::PUT, &format!("/v1/profiles/{number}"), request, RequestOptions::new())
            .await?;
        Ok(())
    }
}
