//! `attachments_client.py` → `GET /v1/attachments[/<id>]`, `DELETE
//! /v1/attachments/<id>`.
//!
//! Attachment *blob storage* is out of scope (spec.md §1 non-goals); what
//! this module provides instead is the one piece the runtime needs to be
//! usable end-to-end: a bounded-size download so a handler can fetch an
//! attachment without risking unbounded memory growth on a hostile or
//! misbehaving gateway.

use reqwest::Method;
use serde::Deserialize;
use signalrt_http::{HttpClient, RequestOptions};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentInfo {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
}

pub struct AttachmentsClient {
    http: HttpClient,
}

impl AttachmentsClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<AttachmentInfo>> {
        let body = self
            .http
            .request(Method::GET, "/v1/attachments", RequestOptions::new())
            .await?;
        body.into_json()
    }

    /// Download an attachment, rejecting anything larger than
    /// `max_bytes` once the full body is in hand. Not a true streaming
    /// cap (the HTTP core buffers the response before this check runs)
    /// — see DESIGN.md for why that tradeoff was accepted here.
    pub async fn download(&self, attachment_id: &str, max_bytes: usize) -> Result<Vec<u8>> {
        let body = self
            .http
            .request(
                Method::GET,
                &format!("/v1/attachments/{attachment_id}"),
                RequestOptions::new(),
            )
            .await?;
        let bytes = body.into_bytes();
        if bytes.len() > max_bytes {
            return Err(Error::Api(signalrt_http::ApiError {
                kind: signalrt_http::ApiErrorKind::Api,
                message: format!(
                    "attachment {attachment_id} exceeds the configured {max_bytes}-byte download bound ({} bytes)",
                    bytes.len()
                ),
                status: 0,
                body: String::new(),
                docs_url: "docs.signalrt.dev/errors#attachment-too-large".into(),
            }));
        }
        Ok(bytes)
    }

    pub async fn remove(&self, attachment_id: &str) -> Result<()> {
        self.http
            .request(Method::DELETE, &format!("/v1/attachments/{attachment_id}"), RequestOptions::new())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signalrt_http::ClientConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn download_within_bound_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/attachments/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
            .mount(&server)
            .await;

        let http = HttpClient::new(ClientConfig {
            base_url: server.uri(),
            ..Default::default()
        });
        let bytes = AttachmentsClient::new(http).download("abc", 10).await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn download_over_bound_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/attachments/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 100]))
            .mount(&server)
            .await;

        let http = HttpClient::new(ClientConfig {
            base_url: server.uri(),
            ..Default::default()
        });
        let err = AttachmentsClient::new(http).download("abc", 10).await.unwrap_err();
        assert!(matches!(err, Error::Api(api) if api.message.contains("exceeds")));
    }
}
