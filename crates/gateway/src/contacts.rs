//! `contacts_client.py` → `/v1/contacts/<number>[/<uuid>[/avatar]]`.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use signalrt_http::{HttpClient, RequestOptions};

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct ContactInfo {
    pub number: Option<String>,
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateContactRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_in_seconds: Option<i64>,
}

pub struct ContactsClient {
    http: HttpClient,
}

impl ContactsClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, number: &str) -> Result<Vec<ContactInfo>> {
        let body = self
            .http
            .request(Method::GET, &format!("/v1/contacts/{number}"), RequestOptions::new())
            .await?;
        body.into_json()
    }

    pub async fn update(&self, number: &str, request: &UpdateContactRequest) -> Result<()> {
        self.http
            .request_json(Method::PUT, &format!("/v1/contacts/{number}"), request, RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn sync(&self, number: &str) -> Result<()> {
        self.http
            .request(Method::POST, &format!("/v1/contacts/{number}/sync"), RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn get(&self, number: &str, uuid: &str) -> Result<ContactInfo> {
        let body = self
            .http
            .request(Method::GET, &format!("/v1/contacts/{number}/{uuid}"), RequestOptions::new())
            .await?;
        body.into_json()
    }

    pub async fn avatar(&self, number: &str, uuid: &str) -> Result<Vec<u8>> {
        let body = self
            .http
            .request(Method::GET, &format!("/v1/contacts/{number}/{uuid}/avatar"), RequestOptions::new())
            .await?;
        Ok(body.into_bytes())
    }
}
