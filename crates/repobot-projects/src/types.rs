//! Board entity types read through the graph API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared data type of a project field.
///
/// `Unknown` catches remote types this client has no special handling
/// for; values for those are passed through as text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldDataType {
    Text,
    Number,
    Date,
    SingleSelect,
    Iteration,
    Title,
    #[serde(other)]
    Unknown,
}

/// An option of a SINGLE_SELECT field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldOption {
    pub id: String,
    pub name: String,
}

/// A project custom field as returned by the field-list query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectField {
    pub id: String,
    pub name: String,
    #[serde(rename = "dataType")]
    pub data_type: FieldDataType,
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

/// Extract the typed field list from a project node.
///
/// Nodes of field kinds the query has no fragment for come back as
/// empty objects; those are skipped rather than failing the whole list.
pub fn parse_fields(project: &Value) -> Vec<ProjectField> {
    project["fields"]["nodes"]
        .as_array()
        .map(|nodes| {
            nodes
                .iter()
                .filter_map(|node| serde_json::from_value(node.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Per-item outcome lists of a bulk operation. One item's failure never
/// aborts the remaining items.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkOutcome {
    pub success: Vec<Value>,
    pub failed: Vec<Value>,
}

/// Aggregated progress report of a project.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProjectProgress {
    pub project: ProgressProjectRef,
    pub summary: ProgressSummary,
    pub issues: IssueCounts,
    pub pull_requests: PullRequestCounts,
    pub drafts: u32,
    /// Histogram over the Status field's declared options. Every
    /// declared option is present, even at zero, so the key set is
    /// stable across calls.
    pub by_status: BTreeMap<String, u32>,
    pub workflows: Vec<WorkflowState>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProgressProjectRef {
    pub id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub number: Option<u64>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProgressSummary {
    pub total_items: u64,
    pub active_items: u64,
    pub archived_items: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IssueCounts {
    pub open: u32,
    pub closed: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PullRequestCounts {
    pub open: u32,
    pub merged: u32,
    pub closed: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WorkflowState {
    pub name: Option<String>,
    pub enabled: Option<bool>,
}
