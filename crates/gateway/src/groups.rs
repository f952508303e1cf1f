//! `groups_client.py` → `/v1/groups/<number>[/<group_id>/...]`, the
//! largest of the original's resource clients.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use signalrt_http::{HttpClient, RequestOptions};

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct GroupInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub admins: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateGroupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeGroupMembersRequest {
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeGroupAdminsRequest {
    pub admins: Vec<String>,
}

pub struct GroupsClient {
    http: HttpClient,
}

impl GroupsClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, number: &str) -> Result<Vec<GroupInfo>> {
        let body = self
            .http
            .request(Method::GET, &format!("/v1/groups/{number}"), RequestOptions::new())
            .await?;
        body.into_json()
    }

    pub async fn create(&self, number: &str, request: &CreateGroupRequest) -> Result<GroupInfo> {
        let body = self
            .http
            .request_json(Method::POST, &format!("/v1/groups/{number}"), request, RequestOptions::new())
            .await?;
        body.into_json()
    }

    pub async fn get(&self, number: &str, group_id: &str) -> Result<GroupInfo> {
        let body = self
            .http
            .request(Method::GET, &format!("/v1/groups/{number}/{group_id}"), RequestOptions::new())
            .await?;
        body.into_json()
    }

    pub async fn update(&self, number: &str, group_id: &str, request: &UpdateGroupRequest) -> Result<()> {
        self.http
            .request_json(Method::PUT, &format!("/v1/groups/{number}/{group_id}"), request, RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn delete(&self, number: &str, group_id: &str) -> Result<()> {
        self.http
            .request(Method::DELETE, &format!("/v1/groups/{number}/{group_id}"), RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn add_admins(&self, number: &str, group_id: &str, request: &ChangeGroupAdminsRequest) -> Result<()> {
        self.http
            .request_json(
                Method::POST,
                &format!("/v1/groups/{number}/{group_id}/admins"),
                request,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    pub async fn remove_admins(&self, number: &str, group_id: &str, request: &ChangeGroupAdminsRequest) -> Result<()> {
        self.http
            .request_json(
                Method::DELETE,
                &format!("/v1/groups/{number}/{group_id}/admins"),
                request,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    pub async fn avatar(&self, number: &str, group_id: &str) -> Result<Vec<u8>> {
        let body = self
            .http
            .request(Method::GET, &format!("/v1/groups/{number}/{group_id}/avatar"), RequestOptions::new())
            .await?;
        Ok(body.into_bytes())
    }

    pub async fn block(&self, number: &str, group_id: &str) -> Result<()> {
        self.http
            .request(Method::POST, &format!("/v1/groups/{number}/{group_id}/block"), RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn join(&self, number: &str, group_id: &str) -> Result<()> {
        self.http
            .request(Method::POST, &format!("/v1/groups/{number}/{group_id}/join"), RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn add_members(&self, number: &str, group_id: &str, request: &ChangeGroupMembersRequest) -> Result<()> {
        self.http
            .request_json(
                Method::POST,
                &format!("/v1/groups/{number}/{group_id}/members"),
                request,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    pub async fn remove_members(
        &self,
        number: &str,
        group_id: &str,
        request: &ChangeGroupMembersRequest,
    ) -> Result<()> {
        self.http
            .request_json(
                Method::DELETE,
                &format!("/v1/groups/{number}/{group_id}/members"),
                request,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    pub async fn quit(&self, number: &str, group_id: &str) -> Result<()> {
        self.http
            .request(Method::POST, &format!("/v1/groups/{number}/{group_id}/quit"), RequestOptions::new())
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
    async fn create_group_posts_name_and_members() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/groups/+1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "g1", "name": "team", "members": ["+2"], "admins": []})),
            )
            .mount(&server)
            .await;

        let http = HttpClient::new(ClientConfig {
            base_url: server.uri(),
            ..Default::default()
        });
        let group = GroupsClient::new(http)
            .create(
                "+1",
                &CreateGroupRequest {
                    name: "team".into(),
                    members: vec!["+2".into()],
                    description: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(group.id, "g1");
    }
}
