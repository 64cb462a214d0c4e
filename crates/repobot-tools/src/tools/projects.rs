//! `projects` tool — manage GitHub Projects v2 boards.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use repobot_projects::{FieldDataType, ProjectsClient, parse_fields};
use repobot_types::{AgentTool, ToolError, ToolOutcome, ToolResult, ToolSpec};

fn default_limit() -> u32 {
    10
}

fn default_status() -> String {
    "ON_TRACK".to_string()
}

/// Tool parameters, decoded by action. `project_id` is optional on every
/// action that targets a board; the configured default fills it in.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ProjectsAction {
    ListProjects {
        owner: String,
        #[serde(default = "default_limit")]
        limit: u32,
    },
    GetProject {
        project_id: Option<String>,
        #[serde(default = "default_limit")]
        limit: u32,
    },
    CreateProject {
        owner: String,
        title: String,
        #[serde(default)]
        description: String,
    },
    AddItem {
        project_id: Option<String>,
        content_id: String,
    },
    AddIssue {
        project_id: Option<String>,
        repository: String,
        issue_number: u64,
    },
    AddPr {
        project_id: Option<String>,
        repository: String,
        pr_number: u64,
    },
    AddDraftIssue {
        project_id: Option<String>,
        title: String,
        #[serde(default)]
        body: String,
    },
    UpdateItem {
        project_id: Option<String>,
        item_id: String,
        field_name: String,
        field_value: String,
    },
    ClearItemField {
        project_id: Option<String>,
        item_id: String,
        field_name: String,
    },
    DeleteItem {
        project_id: Option<String>,
        item_id: String,
    },
    ArchiveItem {
        project_id: Option<String>,
        item_id: String,
    },
    UnarchiveItem {
        project_id: Option<String>,
        item_id: String,
    },
    CreateField {
        project_id: Option<String>,
        field_name: String,
        field_type: FieldDataType,
        #[serde(default)]
        field_options: Vec<String>,
    },
    CreateStatusUpdate {
        project_id: Option<String>,
        body: String,
        #[serde(default = "default_status")]
        status: String,
        start_date: Option<String>,
        target_date: Option<String>,
    },
    GetProgress {
        project_id: Option<String>,
    },
    BulkAddItems {
        project_id: Option<String>,
        content_ids: Vec<String>,
    },
    BulkUpdateStatus {
        project_id: Option<String>,
        item_ids: Vec<String>,
        field_name: String,
        field_value: String,
    },
    BulkArchive {
        project_id: Option<String>,
        item_ids: Vec<String>,
    },
}

pub struct ProjectsTool {
    client: ProjectsClient,
    default_project_id: Option<String>,
    definition: ToolSpec,
}

impl ProjectsTool {
    pub fn new(client: ProjectsClient, default_project_id: Option<String>) -> Self {
        let definition = ToolSpec {
            name: "projects".to_string(),
            description: "Manage GitHub Projects (v2) boards: list and create projects, \
                          add issues/PRs/drafts, update and clear item fields, archive \
                          and delete items, create fields, post status updates, report \
                          progress, and run bulk operations."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": [
                            "list_projects", "get_project", "create_project",
                            "add_item", "add_issue", "add_pr", "add_draft_issue",
                            "update_item", "clear_item_field", "delete_item",
                            "archive_item", "unarchive_item", "create_field",
                            "create_status_update", "get_progress",
                            "bulk_add_items", "bulk_update_status", "bulk_archive"
                        ],
                        "description": "The action to perform."
                    },
                    "project_id": {
                        "type": "string",
                        "description": "Project node ID (PVT_...). Falls back to the configured default."
                    },
                    "owner": {
                        "type": "string",
                        "description": "GitHub username or organization (for list_projects, create_project)."
                    },
                    "title": {
                        "type": "string",
                        "description": "Title (for create_project, add_draft_issue)."
                    },
                    "description": {
                        "type": "string",
                        "description": "Project description (for create_project)."
                    },
                    "body": {
                        "type": "string",
                        "description": "Body text (for add_draft_issue, create_status_update)."
                    },
                    "content_id": {
                        "type": "string",
                        "description": "Issue or PR node ID (for add_item)."
                    },
                    "content_ids": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Issue or PR node IDs (for bulk_add_items)."
                    },
                    "item_id": {
                        "type": "string",
                        "description": "Project item ID (PVTI_...)."
                    },
                    "item_ids": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Project item IDs (for bulk actions)."
                    },
                    "field_name": {
                        "type": "string",
                        "description": "Field name, matched exactly (case-sensitive)."
                    },
                    "field_value": {
                        "type": "string",
                        "description": "New field value. Option name for SINGLE_SELECT fields."
                    },
                    "field_type": {
                        "type": "string",
                        "enum": ["TEXT", "NUMBER", "DATE", "SINGLE_SELECT"],
                        "description": "Field type (for create_field)."
                    },
                    "field_options": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Options for SINGLE_SELECT fields (for create_field)."
                    },
                    "repository": {
                        "type": "string",
                        "description": "Repository in 'owner/repo' format (for add_issue, add_pr)."
                    },
                    "issue_number": {
                        "type": "integer",
                        "description": "Issue number (for add_issue)."
                    },
                    "pr_number": {
                        "type": "integer",
                        "description": "PR number (for add_pr)."
                    },
                    "status": {
                        "type": "string",
                        "enum": ["ON_TRACK", "AT_RISK", "OFF_TRACK", "INACTIVE", "COMPLETE"],
                        "description": "Status for create_status_update (default ON_TRACK)."
                    },
                    "start_date": {
                        "type": "string",
                        "description": "Start date YYYY-MM-DD (for create_status_update)."
                    },
                    "target_date": {
                        "type": "string",
                        "description": "Target date YYYY-MM-DD (for create_status_update)."
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum entries to return (for list_projects, get_project)."
                    }
                },
                "required": ["action"]
            }),
        };
        Self {
            client,
            default_project_id,
            definition,
        }
    }

    /// Resolve the target project id, falling back to the configured
    /// default when the action did not name one.
    fn project_id(&self, provided: Option<String>) -> ToolResult<String> {
        provided
            .or_else(|| self.default_project_id.clone())
            .ok_or_else(|| {
                ToolError::Validation(
                    "project_id is required (no default project configured)".into(),
                )
            })
    }

    async fn run(&self, action: ProjectsAction) -> ToolResult<ToolOutcome> {
        match action {
            ProjectsAction::ListProjects { owner, limit } => {
                let projects = self.client.list_projects(&owner, limit).await?;
                if projects.is_empty() {
                    return Ok(ToolOutcome::success_with_data(
                        format!("No projects found for {owner}"),
                        json!({ "projects": [] }),
                    ));
                }
                let mut lines = vec![format!(
                    "Found {} project(s) for {owner}:\n",
                    projects.len()
                )];
                for project in &projects {
                    lines.push(format!(
                        "- **{}** (#{})\n  ID: `{}`\n  Items: {} | Public: {} | Closed: {}\n  URL: {}\n",
                        text(&project["title"]),
                        project["number"],
                        text(&project["id"]),
                        project["items"]["totalCount"],
                        project["public"],
                        project["closed"],
                        text(&project["url"]),
                    ));
                }
                Ok(ToolOutcome::success_with_data(
                    lines.join("\n"),
                    json!({ "projects": projects }),
                ))
            }

            ProjectsAction::GetProject { project_id, limit } => {
                let project_id = self.project_id(project_id)?;
                let project = self.client.get_project(&project_id, limit).await?;
                Ok(ToolOutcome::success_with_data(
                    render_project(&project),
                    json!({
                        "id": project["id"],
                        "title": project["title"],
                        "number": project["number"],
                        "url": project["url"],
                    }),
                ))
            }

            ProjectsAction::CreateProject {
                owner,
                title,
                description,
            } => {
                let project = self.client.create_project(&owner, &title, &description).await?;
                Ok(ToolOutcome::success_with_data(
                    format!(
                        "**Project created**\n\n\
                         - **Title:** {}\n- **Number:** #{}\n- **ID:** `{}`\n- **URL:** {}",
                        text(&project["title"]),
                        project["number"],
                        text(&project["id"]),
                        text(&project["url"]),
                    ),
                    project,
                ))
            }

            ProjectsAction::AddItem {
                project_id,
                content_id,
            } => {
                let project_id = self.project_id(project_id)?;
                let item = self.client.add_item(&project_id, &content_id).await?;
                Ok(added_item_outcome("Item added to project", &item))
            }

            ProjectsAction::AddIssue {
                project_id,
                repository,
                issue_number,
            } => {
                let project_id = self.project_id(project_id)?;
                let item = self
                    .client
                    .add_issue(&project_id, &repository, issue_number)
                    .await?;
                Ok(added_item_outcome("Issue added to project", &item))
            }

            ProjectsAction::AddPr {
                project_id,
                repository,
                pr_number,
            } => {
                let project_id = self.project_id(project_id)?;
                let item = self.client.add_pr(&project_id, &repository, pr_number).await?;
                Ok(added_item_outcome("Pull request added to project", &item))
            }

            ProjectsAction::AddDraftIssue {
                project_id,
                title,
                body,
            } => {
                let project_id = self.project_id(project_id)?;
                let item = self
                    .client
                    .add_draft_issue(&project_id, &title, &body)
                    .await?;
                Ok(ToolOutcome::success_with_data(
                    format!(
                        "Draft issue added: {title}\n- **Item ID:** `{}`",
                        text(&item["id"])
                    ),
                    json!({ "item_id": item["id"] }),
                ))
            }

            ProjectsAction::UpdateItem {
                project_id,
                item_id,
                field_name,
                field_value,
            } => {
                let project_id = self.project_id(project_id)?;
                let field_id = self
                    .client
                    .update_item(&project_id, &item_id, &field_name, &field_value)
                    .await?;
                Ok(ToolOutcome::success_with_data(
                    format!(
                        "**Item updated**\n\n\
                         - **Item ID:** `{item_id}`\n- **Field:** {field_name}\n- **New Value:** {field_value}"
                    ),
                    json!({
                        "item_id": item_id,
                        "field_id": field_id,
                        "field_name": field_name,
                        "field_value": field_value,
                    }),
                ))
            }

            ProjectsAction::ClearItemField {
                project_id,
                item_id,
                field_name,
            } => {
                let project_id = self.project_id(project_id)?;
                let field_id = self
                    .client
                    .clear_item_field(&project_id, &item_id, &field_name)
                    .await?;
                Ok(ToolOutcome::success_with_data(
                    format!("Cleared field {field_name} on item `{item_id}`"),
                    json!({ "item_id": item_id, "field_id": field_id }),
                ))
            }

            ProjectsAction::DeleteItem {
                project_id,
                item_id,
            } => {
                let project_id = self.project_id(project_id)?;
                let deleted = self.client.delete_item(&project_id, &item_id).await?;
                Ok(ToolOutcome::success_with_data(
                    format!("Item `{item_id}` deleted from project"),
                    json!({ "deleted_item_id": deleted }),
                ))
            }

            ProjectsAction::ArchiveItem {
                project_id,
                item_id,
            } => {
                let project_id = self.project_id(project_id)?;
                self.client.archive_item(&project_id, &item_id).await?;
                Ok(ToolOutcome::success_with_data(
                    format!("Item `{item_id}` archived"),
                    json!({ "item_id": item_id }),
                ))
            }

            ProjectsAction::UnarchiveItem {
                project_id,
                item_id,
            } => {
                let project_id = self.project_id(project_id)?;
                self.client.unarchive_item(&project_id, &item_id).await?;
                Ok(ToolOutcome::success_with_data(
                    format!("Item `{item_id}` unarchived"),
                    json!({ "item_id": item_id }),
                ))
            }

            ProjectsAction::CreateField {
                project_id,
                field_name,
                field_type,
                field_options,
            } => {
                let project_id = self.project_id(project_id)?;
                let field = self
                    .client
                    .create_field(&project_id, &field_name, field_type, &field_options)
                    .await?;
                let mut summary = format!(
                    "**Field created**\n\n- **Field ID:** `{}`\n- **Name:** {}",
                    text(&field["id"]),
                    text(&field["name"]),
                );
                if let Some(options) = field["options"].as_array() {
                    summary.push_str("\n- **Options:**");
                    for option in options {
                        summary.push_str(&format!(
                            "\n  - {} (ID: `{}`)",
                            text(&option["name"]),
                            text(&option["id"]),
                        ));
                    }
                }
                Ok(ToolOutcome::success_with_data(summary, field))
            }

            ProjectsAction::CreateStatusUpdate {
                project_id,
                body,
                status,
                start_date,
                target_date,
            } => {
                let project_id = self.project_id(project_id)?;
                let update = self
                    .client
                    .create_status_update(
                        &project_id,
                        &body,
                        &status,
                        start_date.as_deref(),
                        target_date.as_deref(),
                    )
                    .await?;
                Ok(ToolOutcome::success_with_data(
                    format!(
                        "Status update posted ({status})\n- **ID:** `{}`",
                        text(&update["id"])
                    ),
                    update,
                ))
            }

            ProjectsAction::GetProgress { project_id } => {
                let project_id = self.project_id(project_id)?;
                let progress = self.client.get_progress(&project_id).await?;
                let data = serde_json::to_value(&progress)
                    .map_err(|e| ToolError::Validation(e.to_string()))?;
                Ok(ToolOutcome::success_with_data(
                    render_progress(&data),
                    data,
                ))
            }

            ProjectsAction::BulkAddItems {
                project_id,
                content_ids,
            } => {
                let project_id = self.project_id(project_id)?;
                let outcome = self.client.bulk_add_items(&project_id, &content_ids).await?;
                Ok(bulk_outcome_result("Added", content_ids.len(), &outcome))
            }

            ProjectsAction::BulkUpdateStatus {
                project_id,
                item_ids,
                field_name,
                field_value,
            } => {
                let project_id = self.project_id(project_id)?;
                let outcome = self
                    .client
                    .bulk_update_status(&project_id, &item_ids, &field_name, &field_value)
                    .await?;
                Ok(bulk_outcome_result("Updated", item_ids.len(), &outcome))
            }

            ProjectsAction::BulkArchive {
                project_id,
                item_ids,
            } => {
                let project_id = self.project_id(project_id)?;
                let outcome = self.client.bulk_archive(&project_id, &item_ids).await?;
                Ok(bulk_outcome_result("Archived", item_ids.len(), &outcome))
            }
        }
    }
}

fn text(value: &Value) -> &str {
    value.as_str().unwrap_or("")
}

fn added_item_outcome(heading: &str, item: &Value) -> ToolOutcome {
    let content = &item["content"];
    ToolOutcome::success_with_data(
        format!(
            "**{heading}**\n\n\
             - **Item ID:** `{}`\n- **Content:** #{}: {}\n- **URL:** {}",
            text(&item["id"]),
            content["number"],
            text(&content["title"]),
            text(&content["url"]),
        ),
        json!({ "item_id": item["id"], "content": content }),
    )
}

fn bulk_outcome_result(
    verb: &str,
    requested: usize,
    outcome: &repobot_projects::BulkOutcome,
) -> ToolOutcome {
    let text = format!(
        "{verb} {} of {requested} item(s), {} failed",
        outcome.success.len(),
        outcome.failed.len(),
    );
    ToolOutcome::success_with_data(
        text,
        json!({ "success": outcome.success, "failed": outcome.failed }),
    )
}

/// Render full project detail: fields with options, workflows, and up to
/// 20 items with their Status value.
fn render_project(project: &Value) -> String {
    let mut fields_info = Vec::new();
    for field in parse_fields(project) {
        let mut line = format!(
            "  - {} ({})",
            field.name,
            serde_json::to_value(field.data_type)
                .ok()
                .and_then(|v| v.as_str().map(String::from))
                .unwrap_or_default()
        );
        if !field.options.is_empty() {
            let names: Vec<&str> = field.options.iter().map(|o| o.name.as_str()).collect();
            line.push_str(&format!(": [{}]", names.join(", ")));
        }
        fields_info.push(line);
    }

    let items = project["items"]["nodes"].as_array().cloned().unwrap_or_default();
    let mut items_info = Vec::new();
    for item in items.iter().take(20) {
        let content = &item["content"];
        let archived = if item["isArchived"].as_bool().unwrap_or(false) {
            "[archived] "
        } else {
            ""
        };
        let status = item["fieldValues"]["nodes"]
            .as_array()
            .and_then(|nodes| {
                nodes.iter().find_map(|fv| {
                    (fv["field"]["name"].as_str() == Some("Status"))
                        .then(|| fv["name"].as_str())
                        .flatten()
                })
            })
            .map(|s| format!(" [{s}]"))
            .unwrap_or_default();

        if item["type"].as_str() == Some("DRAFT_ISSUE") {
            items_info.push(format!(
                "  - {archived}Draft: {} (ID: `{}`)",
                text(&content["title"]),
                text(&item["id"]),
            ));
        } else {
            items_info.push(format!(
                "  - {archived}#{}: {}{status}\n    Repo: {} | State: {} | Item ID: `{}`",
                content["number"],
                text(&content["title"]),
                text(&content["repository"]["nameWithOwner"]),
                text(&content["state"]),
                text(&item["id"]),
            ));
        }
    }

    let mut workflows_info = Vec::new();
    if let Some(workflows) = project["workflows"]["nodes"].as_array() {
        for wf in workflows {
            let state = if wf["enabled"].as_bool().unwrap_or(false) {
                "enabled"
            } else {
                "disabled"
            };
            workflows_info.push(format!("  - [{state}] {}", text(&wf["name"])));
        }
    }

    format!(
        "## Project: {title} (#{number})\n\n\
         **ID:** `{id}`\n\
         **URL:** {url}\n\
         **Description:** {description}\n\n\
         ### Fields ({field_count})\n{fields}\n\n\
         ### Workflows ({workflow_count})\n{workflows}\n\n\
         ### Items ({total} total, showing {shown})\n{items}",
        title = text(&project["title"]),
        number = project["number"],
        id = text(&project["id"]),
        url = text(&project["url"]),
        description = or_na(text(&project["shortDescription"])),
        field_count = fields_info.len(),
        fields = fields_info.join("\n"),
        workflow_count = workflows_info.len(),
        workflows = if workflows_info.is_empty() {
            "  None configured".to_string()
        } else {
            workflows_info.join("\n")
        },
        total = project["items"]["totalCount"],
        shown = items_info.len(),
        items = if items_info.is_empty() {
            "  No items yet".to_string()
        } else {
            items_info.join("\n")
        },
    )
}

fn or_na(s: &str) -> &str {
    if s.is_empty() { "N/A" } else { s }
}

fn render_progress(progress: &Value) -> String {
    let mut status_lines = Vec::new();
    if let Some(by_status) = progress["by_status"].as_object() {
        for (status, count) in by_status {
            status_lines.push(format!("  - {status}: {count}"));
        }
    }
    let mut workflow_lines = Vec::new();
    if let Some(workflows) = progress["workflows"].as_array() {
        for wf in workflows {
            let state = if wf["enabled"].as_bool().unwrap_or(false) {
                "enabled"
            } else {
                "disabled"
            };
            workflow_lines.push(format!("  - [{state}] {}", text(&wf["name"])));
        }
    }

    format!(
        "## Project Progress: {title} (#{number})\n\n\
         **URL:** {url}\n\n\
         ### Summary\n\
         - **Total Items:** {total}\n\
         - **Active:** {active} | **Archived:** {archived}\n\
         - **Draft Issues:** {drafts}\n\n\
         ### Issues ({issue_total})\n\
         - Open: {issues_open}\n- Closed: {issues_closed}\n\n\
         ### Pull Requests ({pr_total})\n\
         - Open: {prs_open}\n- Merged: {prs_merged}\n- Closed: {prs_closed}\n\n\
         ### By Status\n{by_status}\n\n\
         ### Workflows\n{workflows}",
        title = text(&progress["project"]["title"]),
        number = progress["project"]["number"],
        url = text(&progress["project"]["url"]),
        total = progress["summary"]["total_items"],
        active = progress["summary"]["active_items"],
        archived = progress["summary"]["archived_items"],
        drafts = progress["drafts"],
        issue_total = progress["issues"]["total"],
        issues_open = progress["issues"]["open"],
        issues_closed = progress["issues"]["closed"],
        pr_total = progress["pull_requests"]["total"],
        prs_open = progress["pull_requests"]["open"],
        prs_merged = progress["pull_requests"]["merged"],
        prs_closed = progress["pull_requests"]["closed"],
        by_status = if status_lines.is_empty() {
            "  No status data".to_string()
        } else {
            status_lines.join("\n")
        },
        workflows = if workflow_lines.is_empty() {
            "  No workflows configured".to_string()
        } else {
            workflow_lines.join("\n")
        },
    )
}

#[async_trait]
impl AgentTool for ProjectsTool {
    fn name(&self) -> &str {
        "projects"
    }

    fn definition(&self) -> &ToolSpec {
        &self.definition
    }

    async fn execute(&self, params: Value) -> ToolOutcome {
        let action: ProjectsAction = match serde_json::from_value(params) {
            Ok(action) => action,
            Err(e) => return ToolOutcome::error(format!("Error: {e}")),
        };
        match self.run(action).await {
            Ok(outcome) => outcome,
            Err(e) => e.into(),
        }
    }
}
