//! Trigger-event context assembly.
//!
//! GitHub Actions hands the triggering event to a workflow step as one JSON
//! document in the `GITHUB_CONTEXT` environment variable. This crate parses
//! that document, renders a markdown summary of the event for the agent's
//! system prompt, and extracts the user-facing message that triggered the
//! run. Pure string and JSON processing, no network calls.

use serde::Deserialize;
use serde_json::Value;

use repobot_types::{ToolError, ToolResult};

/// Environment variable carrying the workflow event document.
pub const GITHUB_CONTEXT_VAR: &str = "GITHUB_CONTEXT";

/// The parsed workflow trigger context.
///
/// `event` keeps the raw payload; its shape varies per `event_name` and is
/// probed with path lookups rather than typed out in full.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerContext {
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub actor: String,
    #[serde(default)]
    pub workflow: String,
    #[serde(default)]
    pub run_id: Value,
    #[serde(default)]
    pub event: Value,
}

impl TriggerContext {
    /// Parse a `GITHUB_CONTEXT` document.
    pub fn parse(raw: &str) -> ToolResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| ToolError::Validation(format!("Invalid GITHUB_CONTEXT: {e}")))
    }

    /// Read and parse the context from the environment. Absent or empty
    /// (`{}`) is not an error; there is simply no trigger context.
    pub fn from_env() -> ToolResult<Option<Self>> {
        match std::env::var(GITHUB_CONTEXT_VAR) {
            Ok(raw) if !raw.is_empty() && raw != "{}" => Self::parse(&raw).map(Some),
            _ => Ok(None),
        }
    }

    /// The event payload's `action` field (`opened`, `created`, ...).
    pub fn action(&self) -> &str {
        self.event["action"].as_str().unwrap_or("")
    }

    /// Render a markdown summary of the triggering event.
    ///
    /// Every event gets the header block; issue, pull request and
    /// discussion events additionally get their subject rendered in full,
    /// and comment/review events the triggering comment.
    pub fn event_summary(&self) -> String {
        let mut parts = vec![self.header_block()];

        match self.event_name.as_str() {
            "issues" | "issue_comment" => {
                let issue = &self.event["issue"];
                if !issue.is_null() {
                    parts.push(subject_block(
                        "Issue",
                        issue,
                        &[("State", text(&issue["state"]))],
                    ));
                }
                if self.event_name == "issue_comment" {
                    if let Some(block) = comment_block("Comment", &self.event["comment"]) {
                        parts.push(block);
                    }
                }
            }
            "pull_request" | "pull_request_review" | "pull_request_review_comment" => {
                let pr = &self.event["pull_request"];
                if !pr.is_null() {
                    let branches = format!(
                        "{} -> {}",
                        text(&pr["head"]["ref"]),
                        text(&pr["base"]["ref"])
                    );
                    parts.push(subject_block(
                        "Pull Request",
                        pr,
                        &[("State", text(&pr["state"])), ("Branches", branches)],
                    ));
                }
                if self.event_name == "pull_request_review" {
                    if let Some(block) = comment_block("Review", &self.event["review"]) {
                        parts.push(block);
                    }
                }
                if self.event_name == "pull_request_review_comment" {
                    if let Some(block) = comment_block("Review comment", &self.event["comment"]) {
                        parts.push(block);
                    }
                }
            }
            "discussion" | "discussion_comment" => {
                let discussion = &self.event["discussion"];
                if !discussion.is_null() {
                    parts.push(subject_block("Discussion", discussion, &[]));
                }
                if self.event_name == "discussion_comment" {
                    if let Some(block) = comment_block("Reply", &self.event["comment"]) {
                        parts.push(block);
                    }
                }
            }
            _ => {}
        }

        parts.join("\n")
    }

    /// Extract the user message that triggered the run, per event kind.
    ///
    /// Subjects (issues, PRs, discussions) come back with their title
    /// prefixed; comments and reviews are the body alone. Events with no
    /// user message (labels, pushes) yield an empty string.
    pub fn user_message(&self) -> String {
        let action = self.action();
        match self.event_name.as_str() {
            "workflow_dispatch" => text(&self.event["inputs"]["message"]),
            "issues" if matches!(action, "opened" | "edited" | "reopened") => {
                titled(&self.event["issue"])
            }
            "issue_comment" if matches!(action, "created" | "edited") => {
                text(&self.event["comment"]["body"])
            }
            "pull_request" if matches!(action, "opened" | "edited" | "reopened") => {
                titled(&self.event["pull_request"])
            }
            "pull_request_review" if action == "submitted" => {
                text(&self.event["review"]["body"])
            }
            "pull_request_review_comment" if matches!(action, "created" | "edited") => {
                text(&self.event["comment"]["body"])
            }
            "discussion" if matches!(action, "created" | "edited") => {
                titled(&self.event["discussion"])
            }
            "discussion_comment" if matches!(action, "created" | "edited") => {
                text(&self.event["comment"]["body"])
            }
            _ => String::new(),
        }
    }

    fn header_block(&self) -> String {
        format!(
            "## Trigger\n\n\
             **Event:** `{event}`\n\
             **Repository:** `{repo}`\n\
             **Action:** `{action}`\n\
             **Actor:** `{actor}`\n\
             **Workflow:** `{workflow}`\n\
             **Run ID:** `{run_id}`\n",
            event = or_na(&self.event_name),
            repo = or_na(&self.repository),
            action = or_na(self.action()),
            actor = or_na(&self.actor),
            workflow = or_na(&self.workflow),
            run_id = or_na(&text(&self.run_id)),
        )
    }
}

/// A field value as display text. Strings come through as-is, numbers are
/// formatted, everything else is empty.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn or_na(s: &str) -> &str {
    if s.is_empty() { "N/A" } else { s }
}

/// Title-prefixed body of an issue, PR or discussion node.
fn titled(node: &Value) -> String {
    let title = text(&node["title"]);
    let body = text(&node["body"]);
    match (title.is_empty(), body.is_empty()) {
        (true, _) => body,
        (false, true) => title,
        (false, false) => format!("{title}\n\n{body}"),
    }
}

/// Render the subject of an event (issue, PR, discussion) with its body.
fn subject_block(kind: &str, node: &Value, extra: &[(&str, String)]) -> String {
    let mut block = format!(
        "## {kind} #{number}: {title}\n\n",
        number = text(&node["number"]),
        title = text(&node["title"]),
    );
    block.push_str(&format!(
        "**Author:** @{}\n",
        text(&node["user"]["login"])
    ));
    for (label, value) in extra {
        block.push_str(&format!("**{label}:** {value}\n"));
    }
    block.push_str(&format!("**Created:** {}\n", text(&node["created_at"])));
    block.push_str(&format!("**URL:** {}\n", text(&node["html_url"])));

    let body = text(&node["body"]);
    block.push_str(&format!(
        "\n```markdown\n{}\n```\n",
        if body.is_empty() { "(empty)" } else { &body }
    ));
    block
}

/// Render the comment or review that triggered the event, if present.
fn comment_block(kind: &str, node: &Value) -> Option<String> {
    if node.is_null() {
        return None;
    }
    let author = text(&node["user"]["login"]);
    let body = text(&node["body"]);
    Some(format!(
        "### {kind} by @{author}\n\n```markdown\n{}\n```\n",
        if body.is_empty() { "(empty)" } else { &body }
    ))
}
