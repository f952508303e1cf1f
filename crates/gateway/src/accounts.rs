//! `accounts_client.py` → `/v1/accounts[/<number>/...]`.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use signalrt_http::{HttpClient, RequestOptions};

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetPinRequest {
    pub pin: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetUsernameRequest {
    pub username: String,
}

pub struct AccountsClient {
    http: HttpClient,
}

impl AccountsClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<AccountInfo>> {
        let body = self.http.request(Method::GET, "/v1/accounts", RequestOptions::new()).await?;
        body.into_json()
    }

    pub async fn set_pin(&self, number: &str, request: &SetPinRequest) -> Result<()> {
        self.http
            .request_json(Method::POST, &format!("/v1/accounts/{number}/pin"), request, RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn remove_pin(&self, number: &str) -> Result<()> {
        self.http
            .request(Method::DELETE, &format!("/v1/accounts/{number}/pin"), RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn lift_rate_limit<B: Serialize>(&self, number: &str, challenge: &B) -> Result<()> {
        self.http
            .request_json(
                Method::POST,
                &format!("/v1/accounts/{number}/rate-limit-challenge"),
                challenge,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    pub async fn update_settings<B: Serialize>(&self, number: &str, settings: &B) -> Result<()> {
        self.http
            .request_json(Method::PUT, &format!("/v1/accounts/{number}/settings"), settings, RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn set_username(&self, number: &str, request: &SetUsernameRequest) -> Result<()> {
        self.http
            .request_json(Method::POST, &format!("/v1/accounts/{number}/username"), request, RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn remove_username(&self, number: &str) -> Result<()> {
        self.http
            .request(Method::DELETE, &format!("/v1/accounts/{number}/username"), RequestOptions::new())
            .await?;
        Ok(())
    }
}
