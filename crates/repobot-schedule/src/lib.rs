//! repobot-schedule: Scheduled job management for the automation agent.
//!
//! Jobs live in a single JSON document persisted through a remote
//! variable store. A job fires on a five-field cron expression
//! (recurring) or an absolute `run_at` timestamp (one-time); the
//! evaluator is a pure function of the collection and "now" — it is
//! invoked externally on some cadence and never sleeps or polls itself.

pub mod cron;
pub mod scheduler;
pub mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use scheduler::{AddJob, Evaluation, ScheduleManager, evaluate_collection};
pub use store::{MemoryScheduleStore, ScheduleStore, VariableScheduleStore};

/// A persisted schedule entry.
///
/// Exactly one of `cron`/`run_at` is set by `add`; both being present is
/// only reachable through manual edits of the stored document, in which
/// case each trigger is evaluated independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    /// Five-field cron expression for recurring jobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    /// ISO-8601 UTC timestamp for one-time jobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_at: Option<String>,
    /// Auto-remove the job the first time it is found due (run_at only).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub once: bool,
    /// Disabled jobs are never evaluated as due. A document that omits
    /// the flag (hand-edited) reads as enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// The prompt handed to the external executor when due. Non-empty.
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Tool configuration string, passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Additional context to include in the prompt, passed through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// The persisted job document: id → job, plus an advisory timezone tag.
///
/// All time computation is UTC; the tag is display-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobCollection {
    #[serde(default)]
    pub jobs: BTreeMap<String, Job>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_enabled() -> bool {
    true
}

impl Default for JobCollection {
    fn default() -> Self {
        Self {
            jobs: BTreeMap::new(),
            timezone: default_timezone(),
        }
    }
}

/// Due-report entry handed to the external dispatcher.
///
/// Field names and optional-field omission are a compatibility contract;
/// do not change them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DueJob {
    pub id: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub once: bool,
}

impl DueJob {
    fn from_job(id: &str, job: &Job) -> Self {
        Self {
            id: id.to_string(),
            prompt: job.prompt.clone(),
            system_prompt: job.system_prompt.clone(),
            tools: job.tools.clone(),
            model: job.model.clone(),
            max_tokens: job.max_tokens,
            context: job.context.clone(),
            once: job.once,
        }
    }
}
