//! `reactions_client.py` → `POST`/`DELETE /v1/reactions/<number>`.

use reqwest::Method;
use serde::Serialize;
use signalrt_http::{HttpClient, RequestOptions};

use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct ReactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub emoji: String,
    pub target_author: String,
    pub target_timestamp: i64,
}

pub struct ReactionsClient {
    http: HttpClient,
}

impl ReactionsClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn send_reaction(&self, number: &str, request: &ReactionRequest) -> Result<()> {
        self.http
            .request_json(Method::POST, &format!("/v1/reactions/{number}"), request, RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn remove_reaction(&self, number: &str, request: &ReactionRequest) -> Result<()> {
        self.http
            .request_json(Method::DELETE, &format!("/v1/reactions/{number}"), request, RequestOptions::new())
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
    async fn send_reaction_posts_to_number_scoped_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/reactions/+1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let http = HttpClient::new(ClientConfig {
            base_url: server.uri(),
            ..Default::default()
        });
        ReactionsClient::new(http)
            .send_reaction(
                "+1",
                &ReactionRequest {
                    recipient: Some("+2".into()),
                    group: None,
                    emoji: "\u{1f44d}".into(),
                    target_author: "+2".into(),
                    target_timestamp: 1,
                },
            )
            .await
            .unwrap();
    }
}
