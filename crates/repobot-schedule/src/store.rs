//! Job collection persistence.

use async_trait::async_trait;

use repobot_github::VariableStore;
use repobot_types::ToolResult;

use crate::JobCollection;

/// Load/save seam for the persisted job document.
///
/// Implementations expose a plain read and a plain write — there is no
/// conditional update, so two concurrent writers race and the later one
/// wins. Callers are expected to serialize invocations.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn load(&self) -> ToolResult<JobCollection>;
    async fn save(&self, collection: &JobCollection) -> ToolResult<()>;
}

/// Job store backed by a repository variable.
///
/// The whole collection is serialized as one JSON document under a fixed
/// variable name. An absent variable — and an unparseable document —
/// reads as the empty collection, never an error.
pub struct VariableScheduleStore {
    variables: VariableStore,
    repository: String,
    variable: String,
}

impl VariableScheduleStore {
    pub fn new(variables: VariableStore, repository: &str, variable: &str) -> Self {
        Self {
            variables,
            repository: repository.to_string(),
            variable: variable.to_string(),
        }
    }
}

#[async_trait]
impl ScheduleStore for VariableScheduleStore {
    async fn load(&self) -> ToolResult<JobCollection> {
        let value = self.variables.get(&self.repository, &self.variable).await?;
        let Some(text) = value else {
            return Ok(JobCollection::default());
        };
        match serde_json::from_str(&text) {
            Ok(collection) => Ok(collection),
            Err(e) => {
                tracing::warn!(
                    variable = %self.variable,
                    "stored schedule document is not valid JSON ({e}), treating as empty"
                );
                Ok(JobCollection::default())
            }
        }
    }

    async fn save(&self, collection: &JobCollection) -> ToolResult<()> {
        let text = serde_json::to_string_pretty(collection)
            .map_err(|e| repobot_types::ToolError::Remote(format!("serialize failed: {e}")))?;
        self.variables
            .set(&self.repository, &self.variable, &text)
            .await
    }
}

/// In-memory store (for testing).
#[derive(Default)]
pub struct MemoryScheduleStore {
    collection: tokio::sync::Mutex<JobCollection>,
}

impl MemoryScheduleStore {
    pub fn new(collection: JobCollection) -> Self {
        Self {
            collection: tokio::sync::Mutex::new(collection),
        }
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn load(&self) -> ToolResult<JobCollection> {
        Ok(self.collection.lock().await.clone())
    }

    async fn save(&self, collection: &JobCollection) -> ToolResult<()> {
        *self.collection.lock().await = collection.clone();
        Ok(())
    }
}
