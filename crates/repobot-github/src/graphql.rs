//! GitHub GraphQL execution primitive.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use repobot_types::{ToolError, ToolResult};

/// Ability to execute a GraphQL query against a remote graph API.
///
/// The synchronizer owns the query text and variables; the implementor
/// owns transport, auth headers, and error surfacing. Returns the `data`
/// object of the response, or `ToolError::Remote` on transport failure
/// or a non-empty top-level `errors` array.
#[async_trait]
pub trait GraphQl: Send + Sync {
    async fn execute(&self, query: &str, variables: Value) -> ToolResult<Value>;
}

/// GitHub GraphQL API client.
pub struct GithubGraphql {
    client: Client,
    url: String,
    token: String,
}

impl GithubGraphql {
    /// Create a client against the public GitHub GraphQL endpoint.
    pub fn new(token: &str) -> ToolResult<Self> {
        Self::with_url(token, "https://api.github.com/graphql", Duration::from_secs(30))
    }

    /// Create a client against a specific endpoint (used in tests).
    pub fn with_url(token: &str, url: &str, timeout: Duration) -> ToolResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("repobot")
            .build()
            .map_err(|e| ToolError::Remote(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.to_string(),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl GraphQl for GithubGraphql {
    async fn execute(&self, query: &str, variables: Value) -> ToolResult<Value> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("GraphQL-Features", "projects_next_graphql")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| ToolError::Remote(format!("GraphQL request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ToolError::Remote(format!("HTTP {status}: {text}")));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| ToolError::Remote(format!("GraphQL response parse failed: {e}")))?;

        if let Some(errors) = body.get("errors").and_then(|e| e.as_array()) {
            if !errors.is_empty() {
                let messages: Vec<&str> = errors
                    .iter()
                    .map(|e| e.get("message").and_then(|m| m.as_str()).unwrap_or("Unknown error"))
                    .collect();
                return Err(ToolError::Remote(format!(
                    "GraphQL errors: {}",
                    messages.join(", ")
                )));
            }
        }

        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }
}
