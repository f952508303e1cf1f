//! `messages_client.py` → `POST /v2/send`, `DELETE /v1/remote-delete/<number>`,
//! `PUT`/`DELETE /v1/typing-indicator/<number>` (spec.md §6 egress).

use reqwest::Method;
use serde::{Deserialize, Serialize};
use signalrt_http::{HttpClient, RequestOptions};

use crate::error::Result;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SendMessageRequest {
    pub number: String,
    pub recipients: Vec<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64_attachments: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_mentions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_once: Option<bool>,
}

impl SendMessageRequest {
    #[must_use]
    pub fn new(number: impl Into<String>, recipient: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            recipients: vec![recipient.into()],
            message: message.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageResponse {
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoteDeleteRequest {
    pub recipient: String,
    pub target_timestamp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypingIndicatorRequest {
    pub recipient: String,
}

/// Send/edit/delete messages and typing indicators (`POST /v2/send`,
/// `DELETE /v1/remote-delete/<number>`, `PUT`/`DELETE
/// /v1/typing-indicator/<number>`).
pub struct MessagesClient {
    http: HttpClient,
}

impl MessagesClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn send(&self, request: &SendMessageRequest) -> Result<SendMessageResponse> {
        let body = self
            .http
            .request_json(Method::POST, "/v2/send", request, RequestOptions::new())
            .await?;
        body.into_json()
    }

    pub async fn remote_delete(&self, number: &str, request: &RemoteDeleteRequest) -> Result<()> {
        self.http
            .request_json(
                Method::DELETE,
                &format!("/v1/remote-delete/{number}"),
                request,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    pub async fn set_typing_indicator(&self, number: &str, request: &TypingIndicatorRequest) -> Result<()> {
        self.http
            .request_json(
                Method::PUT,
                &format!("/v1/typing-indicator/{number}"),
                request,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    pub async fn unset_typing_indicator(&self, number: &str, request: &TypingIndicatorRequest) -> Result<()> {
        self.http
            .request_json(
                Method::DELETE,
                &format!("/v1/typing-indicator/{number}"),
                request,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }
}
