//! repobot-tools: agent-facing tools over the schedule and board components.

pub mod tools;

pub use tools::projects::ProjectsTool;
pub use tools::schedule::ScheduleTool;
