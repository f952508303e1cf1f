//! `search_client.py` → `/v1/search?numbers=...`.

use reqwest::Method;
use serde::Deserialize;
use signalrt_http::{HttpClient, RequestOptions};

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub number: String,
    pub registered: bool,
}

pub struct SearchClient {
    http: HttpClient,
}

impl SearchClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn search_registered_numbers(&self, numbers: &[String]) -> Result<Vec<SearchResult>> {
        let options = RequestOptions::new().with_query([("numbers".to_string(), numbers.join(","))]);
        let body = self.http.request(Method::GET, "/v1/search", options).await?;
        body.into_json()
    }
}
