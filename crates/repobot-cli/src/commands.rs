//! Subcommand implementations.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono::Utc;
use serde_json::json;

use repobot_config::{RepobotConfig, github_token, load_config};
use repobot_context::TriggerContext;
use repobot_github::{GithubGraphql, VariableStore};
use repobot_projects::ProjectsClient;
use repobot_schedule::{ScheduleManager, VariableScheduleStore};
use repobot_tools::{ProjectsTool, ScheduleTool};
use repobot_types::{AgentTool, ToolStatus};

fn schedule_manager(
    config: &RepobotConfig,
    repository: Option<String>,
) -> anyhow::Result<ScheduleManager> {
    let repository = repository
        .or_else(|| config.repository())
        .ok_or_else(|| anyhow!("repository not specified (use --repository or GITHUB_REPOSITORY)"))?;
    let token = github_token()
        .ok_or_else(|| anyhow!("GitHub token not available (PAT_TOKEN or GITHUB_TOKEN)"))?;
    let variables = VariableStore::with_base_url(
        &token,
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
    )?;
    let store = Arc::new(VariableScheduleStore::new(
        variables,
        &repository,
        &config.schedules_variable,
    ));
    Ok(ScheduleManager::new(store))
}

fn projects_tool(
    config: &RepobotConfig,
    project_id: Option<String>,
) -> anyhow::Result<ProjectsTool> {
    let token = github_token()
        .ok_or_else(|| anyhow!("GitHub token not available (PAT_TOKEN or GITHUB_TOKEN)"))?;
    let graphql = GithubGraphql::with_url(
        &token,
        &config.api.graphql_url,
        Duration::from_secs(config.api.timeout_secs),
    )?;
    let client = ProjectsClient::new(Arc::new(graphql));
    let default_project_id = project_id.or_else(|| config.default_project_id());
    Ok(ProjectsTool::new(client, default_project_id))
}

/// Run a tool and print its result envelope. A tool-level error becomes
/// a nonzero exit so workflow steps fail visibly.
async fn run_tool(tool: &dyn AgentTool, params: String) -> anyhow::Result<()> {
    let params = serde_json::from_str(&params).context("params must be a JSON object")?;
    let outcome = tool.execute(params).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if outcome.status == ToolStatus::Error {
        return Err(anyhow!("{} tool failed", tool.name()));
    }
    Ok(())
}

/// Evaluate the schedule at the current instant and print the due report.
///
/// Output is machine-readable JSON: the control-loop workflow feeds
/// `jobs_to_run` straight into its dispatch step.
pub async fn run_check(repository: Option<String>) -> anyhow::Result<()> {
    let config = load_config().unwrap_or_default();
    let manager = schedule_manager(&config, repository)?;
    let evaluation = manager.evaluate(Utc::now()).await?;
    let report = json!({
        "jobs_to_run": evaluation.due,
        "retired": evaluation.retired,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn run_schedule(params: String, repository: Option<String>) -> anyhow::Result<()> {
    let config = load_config().unwrap_or_default();
    let tool = ScheduleTool::new(schedule_manager(&config, repository)?);
    run_tool(&tool, params).await
}

pub async fn run_projects(params: String, project_id: Option<String>) -> anyhow::Result<()> {
    let config = load_config().unwrap_or_default();
    let tool = projects_tool(&config, project_id)?;
    run_tool(&tool, params).await
}

pub fn run_context(message_only: bool) -> anyhow::Result<()> {
    let Some(ctx) = TriggerContext::from_env()? else {
        return Ok(());
    };
    if message_only {
        println!("{}", ctx.user_message());
    } else {
        println!("{}", ctx.event_summary());
    }
    Ok(())
}
