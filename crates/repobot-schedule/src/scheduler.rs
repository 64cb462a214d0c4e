//! Schedule operations and the due-job evaluator.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use repobot_types::{ToolError, ToolResult};

use crate::cron::{cron_matches, parse_run_at, run_at_matches, validate_cron};
use crate::store::ScheduleStore;
use crate::{DueJob, Job, JobCollection};

/// Parameters for adding (or wholesale replacing) a job.
#[derive(Debug, Clone, Default)]
pub struct AddJob {
    pub id: String,
    pub cron: Option<String>,
    pub run_at: Option<String>,
    pub once: bool,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub tools: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub context: Option<String>,
}

/// Result of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Jobs due at the evaluated instant, in id order.
    pub due: Vec<DueJob>,
    /// Ids of once-jobs deleted from the collection by this pass.
    pub retired: Vec<String>,
}

/// Decide which jobs are due at `now` and delete fired once-jobs.
///
/// Pure over its inputs: no clock, no I/O. Disabled jobs are skipped;
/// malformed triggers never match (a single bad legacy job must not
/// block evaluation of the rest). When a job carries both triggers,
/// either match makes it due, and only the run_at path retires it.
pub fn evaluate_collection(collection: &mut JobCollection, now: DateTime<Utc>) -> Evaluation {
    let mut due = Vec::new();
    let mut retired = Vec::new();

    for (id, job) in &collection.jobs {
        if !job.enabled {
            continue;
        }

        let mut should_run = false;

        if let Some(expr) = &job.cron {
            if cron_matches(expr, now) {
                should_run = true;
            }
        }

        if let Some(run_at) = &job.run_at {
            if run_at_matches(run_at, now) {
                should_run = true;
                if job.once {
                    retired.push(id.clone());
                }
            }
        }

        if should_run {
            due.push(DueJob::from_job(id, job));
        }
    }

    for id in &retired {
        collection.jobs.remove(id);
    }

    Evaluation { due, retired }
}

/// Schedule operations over a persisted job collection.
///
/// Every mutating operation is a read-modify-write with no optimistic
/// concurrency: concurrent callers race and the last writer wins. The
/// caller is responsible for serializing invocations (e.g. one workflow
/// run at a time); this is a known limitation, not fixed here.
pub struct ScheduleManager {
    store: Arc<dyn ScheduleStore>,
}

impl ScheduleManager {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    /// All jobs, unmodified. An empty collection is not an error.
    pub async fn list(&self) -> ToolResult<JobCollection> {
        self.store.load().await
    }

    /// Get a job verbatim by id.
    pub async fn get(&self, id: &str) -> ToolResult<Job> {
        let collection = self.store.load().await?;
        collection
            .jobs
            .get(id)
            .cloned()
            .ok_or_else(|| ToolError::NotFound(format!("Job `{id}` not found")))
    }

    /// Upsert a job. Replaces any existing job with the same id entirely
    /// and sets `enabled = true` unconditionally — re-adding a disabled
    /// job re-enables it, intentionally.
    ///
    /// Returns the stored job and whether an existing one was replaced.
    pub async fn add(&self, params: AddJob) -> ToolResult<(Job, bool)> {
        if params.id.is_empty() {
            return Err(ToolError::Validation("job_id is required".into()));
        }
        if params.cron.is_none() && params.run_at.is_none() {
            return Err(ToolError::Validation(
                "Either cron or run_at is required".into(),
            ));
        }
        if params.prompt.is_empty() {
            return Err(ToolError::Validation("prompt is required".into()));
        }
        if let Some(expr) = &params.cron {
            validate_cron(expr).map_err(ToolError::Validation)?;
        }
        if let Some(run_at) = &params.run_at {
            if parse_run_at(run_at).is_none() {
                return Err(ToolError::Validation(format!(
                    "Invalid run_at format: {run_at} (use ISO 8601, e.g. 2024-01-20T14:00:00Z)"
                )));
            }
        }

        let job = Job {
            cron: params.cron,
            run_at: params.run_at,
            once: params.once,
            enabled: true,
            prompt: params.prompt,
            system_prompt: params.system_prompt,
            tools: params.tools,
            model: params.model,
            max_tokens: params.max_tokens,
            context: params.context,
        };

        let mut collection = self.store.load().await?;
        let replaced = collection.jobs.insert(params.id.clone(), job.clone()).is_some();
        self.store.save(&collection).await?;
        info!(
            job_id = %params.id,
            replaced,
            "schedule job {}",
            if replaced { "updated" } else { "added" }
        );
        Ok((job, replaced))
    }

    /// Delete a job.
    pub async fn remove(&self, id: &str) -> ToolResult<()> {
        let mut collection = self.store.load().await?;
        if collection.jobs.remove(id).is_none() {
            return Err(ToolError::NotFound(format!("Job `{id}` not found")));
        }
        self.store.save(&collection).await?;
        info!(job_id = %id, "schedule job removed");
        Ok(())
    }

    /// Enable a disabled job.
    pub async fn enable(&self, id: &str) -> ToolResult<()> {
        self.set_enabled(id, true).await
    }

    /// Disable a job without removing it.
    pub async fn disable(&self, id: &str) -> ToolResult<()> {
        self.set_enabled(id, false).await
    }

    async fn set_enabled(&self, id: &str, enabled: bool) -> ToolResult<()> {
        let mut collection = self.store.load().await?;
        let job = collection
            .jobs
            .get_mut(id)
            .ok_or_else(|| ToolError::NotFound(format!("Job `{id}` not found")))?;
        job.enabled = enabled;
        self.store.save(&collection).await?;
        info!(job_id = %id, enabled, "schedule job toggled");
        Ok(())
    }

    /// Evaluate the collection at `now`, persisting retirements.
    ///
    /// The write happens only when at least one once-job retired — the
    /// whole read-compute-write is one critical section the caller must
    /// not overlap with mutating calls.
    pub async fn evaluate(&self, now: DateTime<Utc>) -> ToolResult<Evaluation> {
        let mut collection = self.store.load().await?;
        let evaluation = evaluate_collection(&mut collection, now);
        if !evaluation.retired.is_empty() {
            self.store.save(&collection).await?;
            info!(retired = ?evaluation.retired, "retired one-time jobs");
        }
        debug!(due = evaluation.due.len(), "schedule evaluated");
        Ok(evaluation)
    }
}
