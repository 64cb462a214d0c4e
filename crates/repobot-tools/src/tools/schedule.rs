//! `schedule` tool — manage scheduled jobs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use repobot_schedule::{AddJob, Job, ScheduleManager};
use repobot_types::{AgentTool, ToolError, ToolOutcome, ToolResult, ToolSpec};

use super::preview;

/// Tool parameters, decoded by action. An unknown action fails decoding
/// with the valid action list in the error message.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ScheduleAction {
    List,
    Check,
    Add {
        job_id: String,
        cron: Option<String>,
        run_at: Option<String>,
        #[serde(default)]
        once: bool,
        #[serde(default)]
        prompt: String,
        system_prompt: Option<String>,
        tools: Option<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
        context: Option<String>,
    },
    Remove {
        job_id: String,
    },
    Enable {
        job_id: String,
    },
    Disable {
        job_id: String,
    },
    Get {
        job_id: String,
    },
}

pub struct ScheduleTool {
    manager: ScheduleManager,
    definition: ToolSpec,
}

impl ScheduleTool {
    pub fn new(manager: ScheduleManager) -> Self {
        let definition = ToolSpec {
            name: "schedule".to_string(),
            description: "Manage scheduled jobs for the automation agent. Jobs can be \
                          recurring (cron) or one-time (run_at). Actions: list, check, \
                          add, remove, enable, disable, get."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": ["list", "check", "add", "remove", "enable", "disable", "get"],
                        "description": "The action to perform."
                    },
                    "job_id": {
                        "type": "string",
                        "description": "Job identifier (for add/remove/enable/disable/get)."
                    },
                    "cron": {
                        "type": "string",
                        "description": "Cron expression for recurring jobs: 'minute hour day month weekday' (e.g. '0 9 * * 1-5')."
                    },
                    "run_at": {
                        "type": "string",
                        "description": "ISO 8601 UTC timestamp for one-time jobs (e.g. '2026-01-20T14:00:00Z')."
                    },
                    "once": {
                        "type": "boolean",
                        "description": "Auto-remove the job after it first fires (run_at jobs)."
                    },
                    "prompt": {
                        "type": "string",
                        "description": "The prompt to run for this job (for add)."
                    },
                    "system_prompt": {
                        "type": "string",
                        "description": "Custom system prompt for this job."
                    },
                    "tools": {
                        "type": "string",
                        "description": "Tool configuration string, passed through to the dispatcher."
                    },
                    "model": {
                        "type": "string",
                        "description": "Model ID to use for this job."
                    },
                    "max_tokens": {
                        "type": "integer",
                        "description": "Max tokens for the model response."
                    },
                    "context": {
                        "type": "string",
                        "description": "Additional context to include in the prompt."
                    }
                },
                "required": ["action"]
            }),
        };
        Self {
            manager,
            definition,
        }
    }

    async fn run(&self, action: ScheduleAction) -> ToolResult<ToolOutcome> {
        match action {
            ScheduleAction::List => self.list().await,
            ScheduleAction::Check => self.check(Utc::now()).await,
            ScheduleAction::Add {
                job_id,
                cron,
                run_at,
                once,
                prompt,
                system_prompt,
                tools,
                model,
                max_tokens,
                context,
            } => {
                let (job, replaced) = self
                    .manager
                    .add(AddJob {
                        id: job_id.clone(),
                        cron,
                        run_at,
                        once,
                        prompt,
                        system_prompt,
                        tools,
                        model,
                        max_tokens,
                        context,
                    })
                    .await?;

                let trigger = match (&job.cron, &job.run_at) {
                    (Some(cron), _) => format!("**Cron:** `{cron}`"),
                    (None, Some(run_at)) => format!("**Run At:** `{run_at}`"),
                    (None, None) => String::new(),
                };
                let once_note = if job.once { " (once, auto-remove)" } else { "" };
                let verb = if replaced { "updated" } else { "added" };
                Ok(ToolOutcome::success_with_data(
                    format!(
                        "Job `{job_id}` {verb}\n\n{trigger}{once_note}\n**Prompt:** {}",
                        preview(&job.prompt, 100)
                    ),
                    json!({ "id": job_id, "job": job }),
                ))
            }
            ScheduleAction::Remove { job_id } => {
                self.manager.remove(&job_id).await?;
                Ok(ToolOutcome::success_with_data(
                    format!("Job `{job_id}` removed"),
                    json!({ "id": job_id }),
                ))
            }
            ScheduleAction::Enable { job_id } => {
                self.manager.enable(&job_id).await?;
                Ok(ToolOutcome::success_with_data(
                    format!("Job `{job_id}` enabled"),
                    json!({ "id": job_id }),
                ))
            }
            ScheduleAction::Disable { job_id } => {
                self.manager.disable(&job_id).await?;
                Ok(ToolOutcome::success_with_data(
                    format!("Job `{job_id}` disabled"),
                    json!({ "id": job_id }),
                ))
            }
            ScheduleAction::Get { job_id } => {
                let job = self.manager.get(&job_id).await?;
                Ok(ToolOutcome::success_with_data(
                    render_job_detail(&job_id, &job),
                    json!({ "id": job_id, "job": job }),
                ))
            }
        }
    }

    async fn list(&self) -> ToolResult<ToolOutcome> {
        let collection = self.manager.list().await?;
        if collection.jobs.is_empty() {
            return Ok(ToolOutcome::success_with_data(
                "No scheduled jobs found",
                json!({ "jobs": {} }),
            ));
        }

        let mut lines = vec![
            format!("## Scheduled Jobs ({} total)\n", collection.jobs.len()),
            format!("**Timezone:** {}\n", collection.timezone),
        ];
        for (id, job) in &collection.jobs {
            lines.push(format!("### `{id}` {}", job_markers(job)));
            lines.extend(job_lines(job, 100));
            lines.push(String::new());
        }

        let data = serde_json::to_value(&collection)
            .map_err(|e| ToolError::Validation(e.to_string()))?;
        Ok(ToolOutcome::success_with_data(lines.join("\n"), data))
    }

    async fn check(&self, now: DateTime<Utc>) -> ToolResult<ToolOutcome> {
        let evaluation = self.manager.evaluate(now).await?;
        let stamp = now.format("%Y-%m-%d %H:%M");

        if evaluation.due.is_empty() {
            return Ok(ToolOutcome::success_with_data(
                format!("No jobs scheduled to run at {stamp} UTC"),
                json!({ "jobs_to_run": [] }),
            ));
        }

        let mut lines = vec![
            format!("## Jobs to Run ({} jobs)\n", evaluation.due.len()),
            format!("**Current Time:** {stamp} UTC\n"),
        ];
        for job in &evaluation.due {
            let once_note = if job.once { " (will be removed)" } else { "" };
            lines.push(format!("### `{}`{once_note}", job.id));
            lines.push(format!("- **Prompt:** {}", preview(&job.prompt, 100)));
            if let Some(tools) = &job.tools {
                lines.push(format!("- **Tools:** {tools}"));
            }
            lines.push(String::new());
        }
        if !evaluation.retired.is_empty() {
            lines.push(format!(
                "*Removed {} one-time job(s): {}*",
                evaluation.retired.len(),
                evaluation.retired.join(", ")
            ));
        }

        Ok(ToolOutcome::success_with_data(
            lines.join("\n"),
            json!({ "jobs_to_run": evaluation.due, "retired": evaluation.retired }),
        ))
    }
}

fn job_markers(job: &Job) -> String {
    let enabled = if job.enabled { "[enabled]" } else { "[disabled]" };
    let kind = if job.cron.is_some() { "recurring" } else { "one-time" };
    format!("{enabled} {kind}")
}

fn job_lines(job: &Job, prompt_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(cron) = &job.cron {
        lines.push(format!("- **Cron:** `{cron}`"));
    }
    if let Some(run_at) = &job.run_at {
        let once_marker = if job.once { " (once, auto-remove)" } else { "" };
        lines.push(format!("- **Run At:** `{run_at}`{once_marker}"));
    }
    lines.push(format!("- **Prompt:** {}", preview(&job.prompt, prompt_chars)));
    if let Some(system_prompt) = &job.system_prompt {
        lines.push(format!("- **System Prompt:** {}", preview(system_prompt, 50)));
    }
    if let Some(tools) = &job.tools {
        lines.push(format!("- **Tools:** {tools}"));
    }
    if let Some(model) = &job.model {
        lines.push(format!("- **Model:** {model}"));
    }
    lines
}

fn render_job_detail(id: &str, job: &Job) -> String {
    let kind = if job.cron.is_some() { "Recurring" } else { "One-time" };
    let mut lines = vec![
        format!("## Job: `{id}` ({kind})\n"),
        format!("**Enabled:** {}", job.enabled),
    ];
    if let Some(cron) = &job.cron {
        lines.push(format!("**Cron:** `{cron}`"));
    }
    if let Some(run_at) = &job.run_at {
        let once_marker = if job.once { " (once, auto-remove)" } else { "" };
        lines.push(format!("**Run At:** `{run_at}`{once_marker}"));
    }
    lines.push(format!("**Prompt:** {}", job.prompt));
    if let Some(system_prompt) = &job.system_prompt {
        lines.push(format!("**System Prompt:** {system_prompt}"));
    }
    if let Some(tools) = &job.tools {
        lines.push(format!("**Tools:** {tools}"));
    }
    if let Some(model) = &job.model {
        lines.push(format!("**Model:** {model}"));
    }
    if let Some(max_tokens) = job.max_tokens {
        lines.push(format!("**Max Tokens:** {max_tokens}"));
    }
    if let Some(context) = &job.context {
        lines.push(format!("**Context:** {context}"));
    }
    lines.join("\n")
}

#[async_trait]
impl AgentTool for ScheduleTool {
    fn name(&self) -> &str {
        "schedule"
    }

    fn definition(&self) -> &ToolSpec {
        &self.definition
    }

    async fn execute(&self, params: Value) -> ToolOutcome {
        let action: ScheduleAction = match serde_json::from_value(params) {
            Ok(action) => action,
            Err(e) => return ToolOutcome::error(format!("Error: {e}")),
        };
        match self.run(action).await {
            Ok(outcome) => outcome,
            Err(e) => e.into(),
        }
    }
}
