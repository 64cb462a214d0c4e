use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON5 parse error: {0}")]
    Json5(#[from] json5::Error),
    #[error("Config directory not found")]
    NoDirFound,
}

/// GitHub API endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// REST API base URL.
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// GraphQL endpoint URL.
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_graphql_url() -> String {
    "https://api.github.com/graphql".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            graphql_url: default_graphql_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Top-level repobot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepobotConfig {
    /// Repository in "owner/repo" form. Falls back to GITHUB_REPOSITORY.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Default project node ID for board operations.
    /// Falls back to REPOBOT_PROJECT_ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_project_id: Option<String>,
    /// Name of the repository variable the job collection is stored in.
    #[serde(default = "default_schedules_variable")]
    pub schedules_variable: String,
    /// API endpoints.
    #[serde(default)]
    pub api: ApiConfig,
}

fn default_schedules_variable() -> String {
    "AGENT_SCHEDULES".to_string()
}

impl Default for RepobotConfig {
    fn default() -> Self {
        Self {
            repository: None,
            default_project_id: None,
            schedules_variable: default_schedules_variable(),
            api: ApiConfig::default(),
        }
    }
}

impl RepobotConfig {
    /// Repository from config or the GITHUB_REPOSITORY environment.
    pub fn repository(&self) -> Option<String> {
        self.repository
            .clone()
            .or_else(|| std::env::var("GITHUB_REPOSITORY").ok())
            .filter(|r| !r.is_empty())
    }

    /// Default project ID from config or the REPOBOT_PROJECT_ID environment.
    pub fn default_project_id(&self) -> Option<String> {
        self.default_project_id
            .clone()
            .or_else(|| std::env::var("REPOBOT_PROJECT_ID").ok())
            .filter(|p| !p.is_empty())
    }
}

/// GitHub token from the environment (PAT_TOKEN preferred over GITHUB_TOKEN).
///
/// The token is never persisted to the config file.
pub fn github_token() -> Option<String> {
    std::env::var("PAT_TOKEN")
        .or_else(|_| std::env::var("GITHUB_TOKEN"))
        .ok()
        .filter(|t| !t.is_empty())
}

/// Resolve the repobot config directory (~/.repobot/).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(".repobot"))
        .ok_or(ConfigError::NoDirFound)
}

/// Resolve the config file path (~/.repobot/config.json5).
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.json5"))
}

/// Load configuration from the default path, falling back to defaults.
pub fn load_config() -> Result<RepobotConfig, ConfigError> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let path = config_file_path()?;
    load_config_from(&path)
}

/// Load configuration from a specific path, falling back to defaults if not found.
pub fn load_config_from(path: &Path) -> Result<RepobotConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("Config file not found at {}, using defaults", path.display());
        return Ok(RepobotConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: RepobotConfig = json5::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RepobotConfig::default();
        assert_eq!(config.schedules_variable, "AGENT_SCHEDULES");
        assert_eq!(config.api.base_url, "https://api.github.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.repository.is_none());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let config = load_config_from(Path::new("/nonexistent/config.json5")).unwrap();
        assert_eq!(config.schedules_variable, "AGENT_SCHEDULES");
        assert_eq!(config.api.graphql_url, "https://api.github.com/graphql");
    }

    #[test]
    fn test_json5_parse() {
        let json5_str = r#"{
            repository: "octocat/hello-world",
            default_project_id: "PVT_kwDOA",
            api: { timeout_secs: 10 },
        }"#;
        let config: RepobotConfig = json5::from_str(json5_str).unwrap();
        assert_eq!(config.repository.as_deref(), Some("octocat/hello-world"));
        assert_eq!(config.default_project_id.as_deref(), Some("PVT_kwDOA"));
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.api.graphql_url, "https://api.github.com/graphql");
        assert_eq!(config.schedules_variable, "AGENT_SCHEDULES");
    }

    #[test]
    fn test_json5_parse_custom_variable() {
        let json5_str = r#"{ schedules_variable: "BOT_SCHEDULES" }"#;
        let config: RepobotConfig = json5::from_str(json5_str).unwrap();
        assert_eq!(config.schedules_variable, "BOT_SCHEDULES");
    }
}
