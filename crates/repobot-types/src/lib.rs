//! repobot-types: Shared types for the repobot agent toolkit.
//!
//! Defines the tool-result envelope every tool returns, the error
//! taxonomy used across components, and the narrow tool interface the
//! external agent runtime invokes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ──────────────────── Error Taxonomy ────────────────────

/// Errors a tool operation can surface to the caller.
///
/// Every public operation returns one of these rather than letting an
/// error escape the tool boundary; the tool layer folds them into an
/// error [`ToolOutcome`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    /// Malformed or missing input (bad cron string, bad timestamp,
    /// empty required argument). Never retried.
    #[error("{0}")]
    Validation(String),
    /// A named entity does not exist. Where applicable the message
    /// lists the valid alternatives so an automated caller can
    /// self-correct.
    #[error("{0}")]
    NotFound(String),
    /// Transport failure or remote-side error payload, surfaced with
    /// the underlying message. Not retried, not classified further.
    #[error("{0}")]
    Remote(String),
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;

// ──────────────────── Tool Envelope ────────────────────

/// Status tag of a tool result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Success,
    Error,
}

/// Normalized result envelope returned by every tool action.
///
/// `text` is human-readable markdown; identifiers produced by an action
/// (project id, item id, due-job report) are mirrored into `data` so a
/// caller can chain actions without re-parsing prose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub status: ToolStatus,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolOutcome {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Success,
            text: text.into(),
            data: None,
        }
    }

    pub fn success_with_data(text: impl Into<String>, data: Value) -> Self {
        Self {
            status: ToolStatus::Success,
            text: text.into(),
            data: Some(data),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            text: text.into(),
            data: None,
        }
    }
}

impl From<ToolError> for ToolOutcome {
    fn from(err: ToolError) -> Self {
        ToolOutcome::error(format!("Error: {err}"))
    }
}

// ──────────────────── Tool Interface ────────────────────

/// Declarative tool definition handed to the agent runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON-schema object describing the tool parameters.
    pub parameters: Value,
}

/// A tool the agent runtime can invoke with flat JSON parameters.
///
/// `execute` is infallible at this boundary: failures are reported as
/// [`ToolStatus::Error`] envelopes, never as panics or transport errors.
#[async_trait::async_trait]
pub trait AgentTool: Send + Sync {
    fn name(&self) -> &str;
    fn definition(&self) -> &ToolSpec;
    async fn execute(&self, params: Value) -> ToolOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_serde() {
        let outcome = ToolOutcome::success_with_data("done", json!({"id": "PVT_1"}));
        let text = serde_json::to_string(&outcome).unwrap();
        assert!(text.contains("\"status\":\"success\""));
        let parsed: ToolOutcome = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.status, ToolStatus::Success);
        assert_eq!(parsed.data.unwrap()["id"], "PVT_1");
    }

    #[test]
    fn test_outcome_omits_empty_data() {
        let outcome = ToolOutcome::error("nope");
        let text = serde_json::to_string(&outcome).unwrap();
        assert!(!text.contains("data"));
    }

    #[test]
    fn test_error_into_outcome() {
        let outcome: ToolOutcome = ToolError::NotFound("Job `x` not found".into()).into();
        assert_eq!(outcome.status, ToolStatus::Error);
        assert_eq!(outcome.text, "Error: Job `x` not found");
    }
}
