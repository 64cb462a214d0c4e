//! Project-board synchronizer.
//!
//! Translates named board actions into sequences of graph queries. No
//! identifier is cached between calls: every action that needs a field
//! id or an issue/PR node id re-fetches it by human-readable name or
//! number, so concurrent external edits (a renamed field, a moved
//! issue) are picked up immediately.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, info};

use repobot_github::GraphQl;
use repobot_types::{ToolError, ToolResult};

use crate::queries;
use crate::types::{
    BulkOutcome, FieldDataType, IssueCounts, ProgressProjectRef, ProgressSummary, ProjectField,
    ProjectProgress, PullRequestCounts, WorkflowState, parse_fields,
};

/// Default color for created single-select options.
const DEFAULT_OPTION_COLOR: &str = "GRAY";

/// Split an `owner/repo` string.
pub fn parse_repository(repository: &str) -> ToolResult<(&str, &str)> {
    repository.split_once('/').filter(|(o, r)| !o.is_empty() && !r.is_empty()).ok_or_else(|| {
        ToolError::Validation(format!(
            "Repository must be in format 'owner/repo', got: {repository}"
        ))
    })
}

/// Client for project-board actions. Holds only the graph executor;
/// all durable state lives behind the remote API.
pub struct ProjectsClient {
    graph: Arc<dyn GraphQl>,
}

impl ProjectsClient {
    pub fn new(graph: Arc<dyn GraphQl>) -> Self {
        Self { graph }
    }

    /// List projects for a user or organization.
    ///
    /// Tries the owner as a user first, then as an organization; the
    /// first lookup that yields a non-empty project list wins. An
    /// unknown owner is not an error — both lookups failing or coming
    /// back empty returns an empty list.
    pub async fn list_projects(&self, owner: &str, limit: u32) -> ToolResult<Vec<Value>> {
        let variables = json!({ "login": owner, "limit": limit });

        for (query, root) in [
            (queries::USER_PROJECTS_QUERY, "user"),
            (queries::ORG_PROJECTS_QUERY, "organization"),
        ] {
            match self.graph.execute(query, variables.clone()).await {
                Ok(data) => {
                    if let Some(nodes) = data[root]["projectsV2"]["nodes"].as_array() {
                        if !nodes.is_empty() {
                            return Ok(nodes.clone());
                        }
                    }
                }
                Err(e) => debug!("project list lookup via {root} failed: {e}"),
            }
        }

        Ok(Vec::new())
    }

    /// Fetch full project detail (fields, items up to `items_limit`,
    /// workflows, views).
    pub async fn get_project(&self, project_id: &str, items_limit: u32) -> ToolResult<Value> {
        let data = self
            .graph
            .execute(
                queries::PROJECT_DETAIL_QUERY,
                json!({ "projectId": project_id, "itemsLimit": items_limit }),
            )
            .await?;
        let node = &data["node"];
        if node.get("id").and_then(|id| id.as_str()).is_none() {
            return Err(ToolError::NotFound(format!(
                "Project {project_id} not found"
            )));
        }
        Ok(node.clone())
    }

    /// Resolve an owner login to a node id, as a user first and an
    /// organization second. Unlike `list_projects` this fails loud:
    /// the caller needs a definite mutation target.
    pub async fn owner_id(&self, owner: &str) -> ToolResult<String> {
        let variables = json!({ "login": owner });

        if let Ok(data) = self.graph.execute(queries::USER_ID_QUERY, variables.clone()).await {
            if let Some(id) = data["user"]["id"].as_str() {
                return Ok(id.to_string());
            }
        }
        if let Ok(data) = self.graph.execute(queries::ORG_ID_QUERY, variables).await {
            if let Some(id) = data["organization"]["id"].as_str() {
                return Ok(id.to_string());
            }
        }

        Err(ToolError::NotFound(format!(
            "Owner '{owner}' not found as user or organization"
        )))
    }

    /// Create a project, optionally setting a description with a second
    /// mutation. If the description update fails the project still
    /// exists; the error is surfaced without rollback.
    pub async fn create_project(
        &self,
        owner: &str,
        title: &str,
        description: &str,
    ) -> ToolResult<Value> {
        let owner_id = self.owner_id(owner).await?;

        let data = self
            .graph
            .execute(
                queries::CREATE_PROJECT_MUTATION,
                json!({ "ownerId": owner_id, "title": title }),
            )
            .await?;
        let project = data["createProjectV2"]["projectV2"].clone();
        info!(owner, title, "project created");

        if !description.is_empty() {
            if let Some(project_id) = project["id"].as_str() {
                self.graph
                    .execute(
                        queries::UPDATE_PROJECT_DESCRIPTION_MUTATION,
                        json!({ "projectId": project_id, "shortDescription": description }),
                    )
                    .await?;
            }
        }

        Ok(project)
    }

    /// Add an issue or PR to a project by content node id.
    pub async fn add_item(&self, project_id: &str, content_id: &str) -> ToolResult<Value> {
        let data = self
            .graph
            .execute(
                queries::ADD_ITEM_MUTATION,
                json!({ "projectId": project_id, "contentId": content_id }),
            )
            .await?;
        Ok(data["addProjectV2ItemById"]["item"].clone())
    }

    /// Add an issue to a project by repository and number.
    pub async fn add_issue(
        &self,
        project_id: &str,
        repository: &str,
        issue_number: u64,
    ) -> ToolResult<Value> {
        let (owner, repo) = parse_repository(repository)?;
        let data = self
            .graph
            .execute(
                queries::ISSUE_ID_QUERY,
                json!({ "owner": owner, "repo": repo, "number": issue_number }),
            )
            .await?;
        let Some(issue_id) = data["repository"]["issue"]["id"].as_str() else {
            return Err(ToolError::NotFound(format!(
                "Issue #{issue_number} not found in {repository}"
            )));
        };
        self.add_item(project_id, issue_id).await
    }

    /// Add a pull request to a project by repository and number.
    pub async fn add_pr(
        &self,
        project_id: &str,
        repository: &str,
        pr_number: u64,
    ) -> ToolResult<Value> {
        let (owner, repo) = parse_repository(repository)?;
        let data = self
            .graph
            .execute(
                queries::PR_ID_QUERY,
                json!({ "owner": owner, "repo": repo, "number": pr_number }),
            )
            .await?;
        let Some(pr_id) = data["repository"]["pullRequest"]["id"].as_str() else {
            return Err(ToolError::NotFound(format!(
                "PR #{pr_number} not found in {repository}"
            )));
        };
        self.add_item(project_id, pr_id).await
    }

    /// Add a draft issue to a project.
    pub async fn add_draft_issue(
        &self,
        project_id: &str,
        title: &str,
        body: &str,
    ) -> ToolResult<Value> {
        let data = self
            .graph
            .execute(
                queries::ADD_DRAFT_ISSUE_MUTATION,
                json!({ "projectId": project_id, "title": title, "body": body }),
            )
            .await?;
        Ok(data["addProjectV2DraftIssue"]["projectItem"].clone())
    }

    /// Delete an item from a project.
    pub async fn delete_item(&self, project_id: &str, item_id: &str) -> ToolResult<String> {
        let data = self
            .graph
            .execute(
                queries::DELETE_ITEM_MUTATION,
                json!({ "projectId": project_id, "itemId": item_id }),
            )
            .await?;
        Ok(data["deleteProjectV2Item"]["deletedItemId"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    /// Archive a project item.
    pub async fn archive_item(&self, project_id: &str, item_id: &str) -> ToolResult<Value> {
        let data = self
            .graph
            .execute(
                queries::ARCHIVE_ITEM_MUTATION,
                json!({ "projectId": project_id, "itemId": item_id }),
            )
            .await?;
        Ok(data["archiveProjectV2Item"]["item"].clone())
    }

    /// Unarchive a project item.
    pub async fn unarchive_item(&self, project_id: &str, item_id: &str) -> ToolResult<Value> {
        let data = self
            .graph
            .execute(
                queries::UNARCHIVE_ITEM_MUTATION,
                json!({ "projectId": project_id, "itemId": item_id }),
            )
            .await?;
        Ok(data["unarchiveProjectV2Item"]["item"].clone())
    }

    /// Re-fetch the project's current field list and resolve a field by
    /// exact, case-sensitive name. The error message lists the available
    /// field names verbatim — an automated caller corrects itself from it.
    async fn resolve_field(&self, project_id: &str, field_name: &str) -> ToolResult<ProjectField> {
        let project = self.get_project(project_id, 1).await?;
        let fields = parse_fields(&project);
        match fields.iter().find(|f| f.name == field_name) {
            Some(field) => Ok(field.clone()),
            None => {
                let available: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
                Err(ToolError::NotFound(format!(
                    "Field '{field_name}' not found. Available: {}",
                    available.join(", ")
                )))
            }
        }
    }

    /// Coerce a raw string value into the typed mutation payload the
    /// field's declared data type requires.
    fn coerce_field_value(field: &ProjectField, field_value: &str) -> ToolResult<Value> {
        match field.data_type {
            FieldDataType::SingleSelect => {
                let option = field.options.iter().find(|o| o.name == field_value);
                match option {
                    Some(option) => Ok(json!({ "singleSelectOptionId": option.id })),
                    None => {
                        let available: Vec<&str> =
                            field.options.iter().map(|o| o.name.as_str()).collect();
                        Err(ToolError::NotFound(format!(
                            "Option '{field_value}' not found. Available: {}",
                            available.join(", ")
                        )))
                    }
                }
            }
            FieldDataType::Number => {
                let number: f64 = field_value.parse().map_err(|_| {
                    ToolError::Validation(format!(
                        "Invalid number value '{field_value}' for field '{}'",
                        field.name
                    ))
                })?;
                Ok(json!({ "number": number }))
            }
            FieldDataType::Date => Ok(json!({ "date": field_value })),
            _ => Ok(json!({ "text": field_value })),
        }
    }

    /// Update an item's field value, dispatching on the field's declared
    /// data type. Returns the resolved field id.
    pub async fn update_item(
        &self,
        project_id: &str,
        item_id: &str,
        field_name: &str,
        field_value: &str,
    ) -> ToolResult<String> {
        let field = self.resolve_field(project_id, field_name).await?;
        let value = Self::coerce_field_value(&field, field_value)?;
        self.graph
            .execute(
                queries::UPDATE_FIELD_VALUE_MUTATION,
                json!({
                    "projectId": project_id,
                    "itemId": item_id,
                    "fieldId": field.id,
                    "value": value,
                }),
            )
            .await?;
        debug!(item_id, field_name, field_value, "item field updated");
        Ok(field.id)
    }

    /// Clear an item's field value. The field is resolved by name with
    /// the same contract as `update_item`.
    pub async fn clear_item_field(
        &self,
        project_id: &str,
        item_id: &str,
        field_name: &str,
    ) -> ToolResult<String> {
        let field = self.resolve_field(project_id, field_name).await?;
        self.graph
            .execute(
                queries::CLEAR_FIELD_VALUE_MUTATION,
                json!({ "projectId": project_id, "itemId": item_id, "fieldId": field.id }),
            )
            .await?;
        Ok(field.id)
    }

    /// Create a custom field. SINGLE_SELECT with options uses a
    /// structurally different mutation carrying the option inputs, each
    /// with the fixed default color.
    pub async fn create_field(
        &self,
        project_id: &str,
        name: &str,
        data_type: FieldDataType,
        options: &[String],
    ) -> ToolResult<Value> {
        let data = if data_type == FieldDataType::SingleSelect && !options.is_empty() {
            let option_inputs: Vec<Value> = options
                .iter()
                .map(|name| json!({ "name": name, "color": DEFAULT_OPTION_COLOR }))
                .collect();
            self.graph
                .execute(
                    queries::CREATE_SELECT_FIELD_MUTATION,
                    json!({
                        "projectId": project_id,
                        "name": name,
                        "dataType": data_type,
                        "options": option_inputs,
                    }),
                )
                .await?
        } else {
            self.graph
                .execute(
                    queries::CREATE_FIELD_MUTATION,
                    json!({ "projectId": project_id, "name": name, "dataType": data_type }),
                )
                .await?
        };
        Ok(data["createProjectV2Field"]["projectV2Field"].clone())
    }

    /// Post a project status update.
    pub async fn create_status_update(
        &self,
        project_id: &str,
        body: &str,
        status: &str,
        start_date: Option<&str>,
        target_date: Option<&str>,
    ) -> ToolResult<Value> {
        let data = self
            .graph
            .execute(
                queries::CREATE_STATUS_UPDATE_MUTATION,
                json!({
                    "projectId": project_id,
                    "body": body,
                    "status": status,
                    "startDate": start_date,
                    "targetDate": target_date,
                }),
            )
            .await?;
        Ok(data["createProjectV2StatusUpdate"]["statusUpdate"].clone())
    }

    /// Aggregate a project progress report in one pass over the fetched
    /// items (capped at 100). Archived items are counted and excluded
    /// from every other bucket.
    pub async fn get_progress(&self, project_id: &str) -> ToolResult<ProjectProgress> {
        let project = self.get_project(project_id, 100).await?;

        let items: Vec<Value> = project["items"]["nodes"]
            .as_array()
            .cloned()
            .unwrap_or_default();
        let total_items = project["items"]["totalCount"].as_u64().unwrap_or(0);

        // Seed the histogram from the Status field's declared options so
        // its key set is stable regardless of which options are in use.
        let status_field = parse_fields(&project)
            .into_iter()
            .find(|f| f.name == "Status");
        let mut by_status: std::collections::BTreeMap<String, u32> = status_field
            .map(|f| f.options.into_iter().map(|o| (o.name, 0)).collect())
            .unwrap_or_default();

        let mut issues = IssueCounts { open: 0, closed: 0, total: 0 };
        let mut pull_requests = PullRequestCounts { open: 0, merged: 0, closed: 0, total: 0 };
        let mut drafts = 0;
        let mut archived = 0u64;

        for item in &items {
            if item["isArchived"].as_bool().unwrap_or(false) {
                archived += 1;
                continue;
            }

            let state = item["content"]["state"].as_str().unwrap_or("");
            match item["type"].as_str().unwrap_or("") {
                "ISSUE" => {
                    if state == "OPEN" {
                        issues.open += 1;
                    } else {
                        issues.closed += 1;
                    }
                }
                "PULL_REQUEST" => match state {
                    "MERGED" => pull_requests.merged += 1,
                    "OPEN" => pull_requests.open += 1,
                    _ => pull_requests.closed += 1,
                },
                "DRAFT_ISSUE" => drafts += 1,
                _ => {}
            }

            if let Some(values) = item["fieldValues"]["nodes"].as_array() {
                for fv in values {
                    if fv["field"]["name"].as_str() == Some("Status") {
                        if let Some(name) = fv["name"].as_str() {
                            *by_status.entry(name.to_string()).or_insert(0) += 1;
                        }
                    }
                }
            }
        }

        issues.total = issues.open + issues.closed;
        pull_requests.total = pull_requests.open + pull_requests.merged + pull_requests.closed;

        let workflows = project["workflows"]["nodes"]
            .as_array()
            .map(|nodes| {
                nodes
                    .iter()
                    .map(|w| WorkflowState {
                        name: w["name"].as_str().map(String::from),
                        enabled: w["enabled"].as_bool(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(ProjectProgress {
            project: ProgressProjectRef {
                id: project["id"].as_str().map(String::from),
                title: project["title"].as_str().map(String::from),
                url: project["url"].as_str().map(String::from),
                number: project["number"].as_u64(),
            },
            summary: ProgressSummary {
                total_items,
                active_items: total_items.saturating_sub(archived),
                archived_items: archived,
            },
            issues,
            pull_requests,
            drafts,
            by_status,
            workflows,
        })
    }

    /// Add multiple items; each id independently, best effort.
    pub async fn bulk_add_items(
        &self,
        project_id: &str,
        content_ids: &[String],
    ) -> ToolResult<BulkOutcome> {
        let mut outcome = BulkOutcome::default();
        for content_id in content_ids {
            match self.add_item(project_id, content_id).await {
                Ok(item) => outcome
                    .success
                    .push(json!({ "content_id": content_id, "item": item })),
                Err(e) => outcome
                    .failed
                    .push(json!({ "content_id": content_id, "error": e.to_string() })),
            }
        }
        Ok(outcome)
    }

    /// Set one field to one value across many items. The field and (for
    /// SINGLE_SELECT) option are resolved once; each item update is then
    /// independent and best effort.
    pub async fn bulk_update_status(
        &self,
        project_id: &str,
        item_ids: &[String],
        field_name: &str,
        field_value: &str,
    ) -> ToolResult<BulkOutcome> {
        let field = self.resolve_field(project_id, field_name).await?;
        let value = Self::coerce_field_value(&field, field_value)?;

        let mut outcome = BulkOutcome::default();
        for item_id in item_ids {
            let result = self
                .graph
                .execute(
                    queries::UPDATE_FIELD_VALUE_MUTATION,
                    json!({
                        "projectId": project_id,
                        "itemId": item_id,
                        "fieldId": field.id,
                        "value": value,
                    }),
                )
                .await;
            match result {
                Ok(_) => outcome.success.push(json!(item_id)),
                Err(e) => outcome
                    .failed
                    .push(json!({ "item_id": item_id, "error": e.to_string() })),
            }
        }
        Ok(outcome)
    }

    /// Archive multiple items; each id independently, best effort.
    pub async fn bulk_archive(
        &self,
        project_id: &str,
        item_ids: &[String],
    ) -> ToolResult<BulkOutcome> {
        let mut outcome = BulkOutcome::default();
        for item_id in item_ids {
            match self.archive_item(project_id, item_id).await {
                Ok(_) => outcome.success.push(json!(item_id)),
                Err(e) => outcome
                    .failed
                    .push(json!({ "item_id": item_id, "error": e.to_string() })),
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Graph executor that replays canned responses in order and records
    /// every call it receives.
    struct FakeGraph {
        responses: Mutex<VecDeque<ToolResult<Value>>>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl FakeGraph {
        fn new(responses: Vec<ToolResult<Value>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GraphQl for FakeGraph {
        async fn execute(&self, query: &str, variables: Value) -> ToolResult<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), variables));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ToolError::Remote("no scripted response".into())))
        }
    }

    fn project_with_fields() -> Value {
        json!({
            "node": {
                "id": "P1",
                "title": "Board",
                "fields": {"nodes": [
                    {"id": "F_STATUS", "name": "Status", "dataType": "SINGLE_SELECT",
                     "options": [
                        {"id": "O_TODO", "name": "Todo"},
                        {"id": "O_DONE", "name": "Done"}
                     ]},
                    {"id": "F_EST", "name": "Estimate", "dataType": "NUMBER"},
                    {"id": "F_DUE", "name": "Due", "dataType": "DATE"},
                    {"id": "F_NOTES", "name": "Notes", "dataType": "TEXT"}
                ]}
            }
        })
    }

    #[test]
    fn test_parse_repository() {
        assert_eq!(parse_repository("octo/widgets").unwrap(), ("octo", "widgets"));
        assert!(matches!(
            parse_repository("not-a-repo"),
            Err(ToolError::Validation(_))
        ));
        assert!(parse_repository("/widgets").is_err());
    }

    #[tokio::test]
    async fn test_list_projects_falls_back_to_org() {
        let graph = FakeGraph::new(vec![
            Ok(json!({"user": null})),
            Ok(json!({"organization": {"projectsV2": {"nodes": [
                {"id": "P1", "title": "Roadmap"}
            ]}}})),
        ]);
        let client = ProjectsClient::new(graph.clone());

        let projects = client.list_projects("acme", 20).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0]["title"], "Roadmap");
        assert_eq!(graph.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_list_projects_unknown_owner_is_empty() {
        let graph = FakeGraph::new(vec![
            Err(ToolError::Remote("GraphQL errors: not found".into())),
            Err(ToolError::Remote("GraphQL errors: not found".into())),
        ]);
        let client = ProjectsClient::new(graph);

        let projects = client.list_projects("nobody", 20).await.unwrap();
        assert!(projects.is_empty());
    }

    #[tokio::test]
    async fn test_get_project_null_node_is_not_found() {
        let graph = FakeGraph::new(vec![Ok(json!({"node": null}))]);
        let client = ProjectsClient::new(graph);

        let err = client.get_project("PVT_missing", 100).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
        assert!(err.to_string().contains("PVT_missing"));
    }

    #[tokio::test]
    async fn test_update_item_resolves_select_option() {
        let graph = FakeGraph::new(vec![
            Ok(project_with_fields()),
            Ok(json!({"updateProjectV2ItemFieldValue": {"projectV2Item": {"id": "I1"}}})),
        ]);
        let client = ProjectsClient::new(graph.clone());

        let field_id = client.update_item("P1", "I1", "Status", "Done").await.unwrap();
        assert_eq!(field_id, "F_STATUS");

        let calls = graph.calls();
        assert_eq!(calls[1].1["value"], json!({"singleSelectOptionId": "O_DONE"}));
    }

    #[tokio::test]
    async fn test_update_item_unknown_option_lists_options() {
        let graph = FakeGraph::new(vec![Ok(project_with_fields())]);
        let client = ProjectsClient::new(graph.clone());

        let err = client
            .update_item("P1", "I1", "Status", "Blocked")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
        assert!(err.to_string().contains("Todo, Done"));
        // No mutation was attempted.
        assert_eq!(graph.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_update_item_unknown_field_lists_fields() {
        let graph = FakeGraph::new(vec![Ok(project_with_fields())]);
        let client = ProjectsClient::new(graph);

        let err = client
            .update_item("P1", "I1", "Priority", "High")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Status, Estimate, Due, Notes"));
    }

    #[tokio::test]
    async fn test_update_item_field_match_is_case_sensitive() {
        let graph = FakeGraph::new(vec![Ok(project_with_fields())]);
        let client = ProjectsClient::new(graph);

        let err = client
            .update_item("P1", "I1", "status", "Done")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_item_number_coercion() {
        let graph = FakeGraph::new(vec![
            Ok(project_with_fields()),
            Ok(json!({"updateProjectV2ItemFieldValue": {"projectV2Item": {"id": "I1"}}})),
        ]);
        let client = ProjectsClient::new(graph.clone());

        client.update_item("P1", "I1", "Estimate", "3.5").await.unwrap();
        assert_eq!(graph.calls()[1].1["value"], json!({"number": 3.5}));
    }

    #[tokio::test]
    async fn test_update_item_bad_number_is_validation_error() {
        let graph = FakeGraph::new(vec![Ok(project_with_fields())]);
        let client = ProjectsClient::new(graph);

        let err = client
            .update_item("P1", "I1", "Estimate", "lots")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
        assert!(err.to_string().contains("Estimate"));
    }

    #[tokio::test]
    async fn test_update_item_text_and_date_pass_through() {
        let graph = FakeGraph::new(vec![
            Ok(project_with_fields()),
            Ok(json!({})),
            Ok(project_with_fields()),
            Ok(json!({})),
        ]);
        let client = ProjectsClient::new(graph.clone());

        client.update_item("P1", "I1", "Due", "2026-09-01").await.unwrap();
        client.update_item("P1", "I1", "Notes", "ship it").await.unwrap();

        let calls = graph.calls();
        assert_eq!(calls[1].1["value"], json!({"date": "2026-09-01"}));
        assert_eq!(calls[3].1["value"], json!({"text": "ship it"}));
    }

    #[tokio::test]
    async fn test_add_issue_missing_issue_is_not_found() {
        let graph = FakeGraph::new(vec![Ok(json!({"repository": {"issue": null}}))]);
        let client = ProjectsClient::new(graph.clone());

        let err = client.add_issue("P1", "octo/widgets", 42).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
        assert!(err.to_string().contains("#42"));
        // The add mutation never ran.
        assert_eq!(graph.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_add_issue_looks_up_then_adds() {
        let graph = FakeGraph::new(vec![
            Ok(json!({"repository": {"issue": {"id": "I_node"}}})),
            Ok(json!({"addProjectV2ItemById": {"item": {"id": "ITEM1"}}})),
        ]);
        let client = ProjectsClient::new(graph.clone());

        let item = client.add_issue("P1", "octo/widgets", 7).await.unwrap();
        assert_eq!(item["id"], "ITEM1");
        assert_eq!(graph.calls()[1].1["contentId"], "I_node");
    }

    #[tokio::test]
    async fn test_create_project_sets_description_second() {
        let graph = FakeGraph::new(vec![
            Ok(json!({"user": {"id": "U1"}})),
            Ok(json!({"createProjectV2": {"projectV2": {"id": "P9", "title": "New"}}})),
            Ok(json!({"updateProjectV2": {"projectV2": {"id": "P9"}}})),
        ]);
        let client = ProjectsClient::new(graph.clone());

        let project = client.create_project("octo", "New", "board notes").await.unwrap();
        assert_eq!(project["id"], "P9");

        let calls = graph.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2].1["shortDescription"], "board notes");
    }

    #[tokio::test]
    async fn test_create_project_surfaces_description_failure() {
        let graph = FakeGraph::new(vec![
            Ok(json!({"user": {"id": "U1"}})),
            Ok(json!({"createProjectV2": {"projectV2": {"id": "P9"}}})),
            Err(ToolError::Remote("GraphQL errors: denied".into())),
        ]);
        let client = ProjectsClient::new(graph);

        let err = client.create_project("octo", "New", "notes").await.unwrap_err();
        assert!(matches!(err, ToolError::Remote(_)));
    }

    #[tokio::test]
    async fn test_owner_id_tries_user_then_org() {
        let graph = FakeGraph::new(vec![
            Ok(json!({"user": null})),
            Ok(json!({"organization": {"id": "ORG1"}})),
        ]);
        let client = ProjectsClient::new(graph);

        assert_eq!(client.owner_id("acme").await.unwrap(), "ORG1");
    }

    #[tokio::test]
    async fn test_create_field_select_carries_options() {
        let graph = FakeGraph::new(vec![Ok(
            json!({"createProjectV2Field": {"projectV2Field": {"id": "F9", "name": "Priority"}}}),
        )]);
        let client = ProjectsClient::new(graph.clone());

        let field = client
            .create_field(
                "P1",
                "Priority",
                FieldDataType::SingleSelect,
                &["High".into(), "Low".into()],
            )
            .await
            .unwrap();
        assert_eq!(field["id"], "F9");

        let (query, variables) = graph.calls().remove(0);
        assert!(query.contains("singleSelectOptions"));
        assert_eq!(
            variables["options"],
            json!([
                {"name": "High", "color": "GRAY"},
                {"name": "Low", "color": "GRAY"}
            ])
        );
    }

    #[tokio::test]
    async fn test_create_field_plain_when_no_options() {
        let graph = FakeGraph::new(vec![Ok(
            json!({"createProjectV2Field": {"projectV2Field": {"id": "F3"}}}),
        )]);
        let client = ProjectsClient::new(graph.clone());

        client
            .create_field("P1", "Due", FieldDataType::Date, &[])
            .await
            .unwrap();

        let (query, variables) = graph.calls().remove(0);
        assert!(!query.contains("singleSelectOptions"));
        assert_eq!(variables["dataType"], "DATE");
    }

    #[tokio::test]
    async fn test_get_progress_aggregates_and_excludes_archived() {
        let mut project = project_with_fields();
        project["node"]["url"] = json!("https://example.test/p/1");
        project["node"]["number"] = json!(1);
        project["node"]["items"] = json!({
            "totalCount": 6,
            "nodes": [
                {"id": "I1", "type": "ISSUE", "isArchived": false,
                 "content": {"state": "OPEN"},
                 "fieldValues": {"nodes": [
                    {"field": {"name": "Status"}, "name": "Todo"}
                 ]}},
                {"id": "I2", "type": "ISSUE", "isArchived": false,
                 "content": {"state": "CLOSED"},
                 "fieldValues": {"nodes": [
                    {"field": {"name": "Status"}, "name": "Done"}
                 ]}},
                {"id": "I3", "type": "PULL_REQUEST", "isArchived": false,
                 "content": {"state": "MERGED"}, "fieldValues": {"nodes": []}},
                {"id": "I4", "type": "PULL_REQUEST", "isArchived": true,
                 "content": {"state": "OPEN"}, "fieldValues": {"nodes": []}},
                {"id": "I5", "type": "DRAFT_ISSUE", "isArchived": false,
                 "content": {}, "fieldValues": {"nodes": []}},
                {"id": "I6", "type": "ISSUE", "isArchived": false,
                 "content": {"state": "OPEN"},
                 "fieldValues": {"nodes": [
                    {"field": {"name": "Status"}, "name": "Todo"}
                 ]}}
            ]
        });
        project["node"]["workflows"] = json!({"nodes": [
            {"name": "Auto-archive", "enabled": true}
        ]});
        let graph = FakeGraph::new(vec![Ok(project)]);
        let client = ProjectsClient::new(graph);

        let progress = client.get_progress("P1").await.unwrap();
        assert_eq!(progress.summary.total_items, 6);
        assert_eq!(progress.summary.archived_items, 1);
        assert_eq!(progress.summary.active_items, 5);
        assert_eq!(progress.issues.open, 2);
        assert_eq!(progress.issues.closed, 1);
        assert_eq!(progress.issues.total, 3);
        assert_eq!(progress.pull_requests.merged, 1);
        // The archived PR is excluded from PR counts.
        assert_eq!(progress.pull_requests.total, 1);
        assert_eq!(progress.drafts, 1);
        assert_eq!(progress.by_status.get("Todo"), Some(&2));
        assert_eq!(progress.by_status.get("Done"), Some(&1));
        assert_eq!(progress.workflows.len(), 1);
        assert_eq!(progress.workflows[0].enabled, Some(true));
    }

    #[tokio::test]
    async fn test_get_progress_seeds_declared_options_at_zero() {
        let mut project = project_with_fields();
        project["node"]["items"] = json!({"totalCount": 0, "nodes": []});
        let graph = FakeGraph::new(vec![Ok(project)]);
        let client = ProjectsClient::new(graph);

        let progress = client.get_progress("P1").await.unwrap();
        assert_eq!(progress.by_status.get("Todo"), Some(&0));
        assert_eq!(progress.by_status.get("Done"), Some(&0));
    }

    #[tokio::test]
    async fn test_bulk_add_items_is_best_effort() {
        let graph = FakeGraph::new(vec![
            Ok(json!({"addProjectV2ItemById": {"item": {"id": "ITEM1"}}})),
            Err(ToolError::Remote("GraphQL errors: bad content id".into())),
            Ok(json!({"addProjectV2ItemById": {"item": {"id": "ITEM3"}}})),
        ]);
        let client = ProjectsClient::new(graph);

        let outcome = client
            .bulk_add_items("P1", &["C1".into(), "C2".into(), "C3".into()])
            .await
            .unwrap();
        assert_eq!(outcome.success.len(), 2);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0]["content_id"], "C2");
    }

    #[tokio::test]
    async fn test_bulk_update_status_resolves_field_once() {
        let graph = FakeGraph::new(vec![
            Ok(project_with_fields()),
            Ok(json!({})),
            Err(ToolError::Remote("GraphQL errors: stale item".into())),
        ]);
        let client = ProjectsClient::new(graph.clone());

        let outcome = client
            .bulk_update_status("P1", &["I1".into(), "I2".into()], "Status", "Done")
            .await
            .unwrap();
        assert_eq!(outcome.success, vec![json!("I1")]);
        assert_eq!(outcome.failed[0]["item_id"], "I2");
        // One field fetch plus one mutation per item.
        assert_eq!(graph.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_bulk_update_status_bad_field_fails_whole_call() {
        let graph = FakeGraph::new(vec![Ok(project_with_fields())]);
        let client = ProjectsClient::new(graph.clone());

        let err = client
            .bulk_update_status("P1", &["I1".into()], "Priority", "High")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
        assert_eq!(graph.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_item_field() {
        let graph = FakeGraph::new(vec![Ok(project_with_fields()), Ok(json!({}))]);
        let client = ProjectsClient::new(graph.clone());

        let field_id = client.clear_item_field("P1", "I1", "Due").await.unwrap();
        assert_eq!(field_id, "F_DUE");
        assert!(graph.calls()[1].0.contains("clearProjectV2ItemFieldValue"));
    }
}
