//! GitHub Actions repository-variable HTTP client.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::json;

use repobot_types::{ToolError, ToolResult};

/// HTTP client for repository Actions variables.
///
/// The store exposes exactly `get` and `set` of a named string variable
/// within a repository scope. An absent variable reads as `None`, never
/// an error.
pub struct VariableStore {
    client: Client,
    base_url: String,
    token: String,
}

impl VariableStore {
    /// Create a client against the public GitHub API.
    pub fn new(token: &str) -> ToolResult<Self> {
        Self::with_base_url(token, "https://api.github.com", Duration::from_secs(30))
    }

    /// Create a client against a specific endpoint (used in tests).
    pub fn with_base_url(token: &str, base_url: &str, timeout: Duration) -> ToolResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("repobot")
            .build()
            .map_err(|e| ToolError::Remote(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn variable_url(&self, repository: &str, name: &str) -> String {
        format!(
            "{}/repos/{repository}/actions/variables/{name}",
            self.base_url
        )
    }

    /// Fetch a repository variable. Returns `None` when it does not exist.
    pub async fn get(&self, repository: &str, name: &str) -> ToolResult<Option<String>> {
        let resp = self
            .client
            .get(self.variable_url(repository, name))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| ToolError::Remote(format!("variable get request failed: {e}")))?;

        match resp.status() {
            StatusCode::OK => {
                let body: serde_json::Value = resp
                    .json()
                    .await
                    .map_err(|e| ToolError::Remote(format!("variable get parse failed: {e}")))?;
                Ok(body.get("value").and_then(|v| v.as_str()).map(String::from))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                let text = resp.text().await.unwrap_or_default();
                Err(ToolError::Remote(format!("HTTP {status}: {text}")))
            }
        }
    }

    /// Create or update a repository variable.
    ///
    /// Update is attempted first; a 404 means the variable does not exist
    /// yet and it is created instead.
    pub async fn set(&self, repository: &str, name: &str, value: &str) -> ToolResult<()> {
        let resp = self
            .client
            .patch(self.variable_url(repository, name))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .json(&json!({ "name": name, "value": value }))
            .send()
            .await
            .map_err(|e| ToolError::Remote(format!("variable update request failed: {e}")))?;

        match resp.status() {
            StatusCode::NO_CONTENT => {
                tracing::debug!(repository, name, "variable updated");
                return Ok(());
            }
            StatusCode::NOT_FOUND => {}
            status => {
                let text = resp.text().await.unwrap_or_default();
                return Err(ToolError::Remote(format!("HTTP {status}: {text}")));
            }
        }

        let resp = self
            .client
            .post(format!("{}/repos/{repository}/actions/variables", self.base_url))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .json(&json!({ "name": name, "value": value }))
            .send()
            .await
            .map_err(|e| ToolError::Remote(format!("variable create request failed: {e}")))?;

        if resp.status() == StatusCode::CREATED {
            tracing::debug!(repository, name, "variable created");
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            Err(ToolError::Remote(format!("HTTP {status}: {text}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn store(server: &MockServer) -> VariableStore {
        VariableStore::with_base_url("tok", &server.base_url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_existing_variable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octo/repo/actions/variables/AGENT_SCHEDULES")
                    .header("authorization", "Bearer tok");
                then.status(200)
                    .json_body(serde_json::json!({"name": "AGENT_SCHEDULES", "value": "{\"jobs\":{}}"}));
            })
            .await;

        let value = store(&server)
            .get("octo/repo", "AGENT_SCHEDULES")
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("{\"jobs\":{}}"));
    }

    #[tokio::test]
    async fn test_get_missing_variable_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octo/repo/actions/variables/AGENT_SCHEDULES");
                then.status(404);
            })
            .await;

        let value = store(&server)
            .get("octo/repo", "AGENT_SCHEDULES")
            .await
            .unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_get_server_error_surfaces() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octo/repo/actions/variables/X");
                then.status(500).body("boom");
            })
            .await;

        let err = store(&server).get("octo/repo", "X").await.unwrap_err();
        assert!(matches!(err, ToolError::Remote(_)));
    }

    #[tokio::test]
    async fn test_set_falls_back_to_create() {
        let server = MockServer::start_async().await;
        let patch = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/repos/octo/repo/actions/variables/V");
                then.status(404);
            })
            .await;
        let post = server
            .mock_async(|when, then| {
                when.method(POST).path("/repos/octo/repo/actions/variables");
                then.status(201);
            })
            .await;

        store(&server).set("octo/repo", "V", "x").await.unwrap();
        patch.assert_async().await;
        post.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_update_path() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/repos/octo/repo/actions/variables/V");
                then.status(204);
            })
            .await;

        store(&server).set("octo/repo", "V", "x").await.unwrap();
    }
}
