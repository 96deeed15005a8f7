use scout_settings::{Result, SettingsError};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "algolia.json";

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_task_poll_interval_ms() -> u64 {
    100
}

fn default_task_max_polls() -> u32 {
    600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgoliaConfig {
    pub app_id: String,
    pub api_key: String,
    /// Overrides `https://{app_id}.algolia.net`, e.g. for a self-hosted compatible server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_task_poll_interval_ms")]
    pub task_poll_interval_ms: u64,
    #[serde(default = "default_task_max_polls")]
    pub task_max_polls: u32,
}

impl AlgoliaConfig {
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            api_key: api_key.into(),
            base_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            task_poll_interval_ms: default_task_poll_interval_ms(),
            task_max_polls: default_task_max_polls(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Base URL all requests are issued against, without trailing slash.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.algolia.net", self.app_id),
        }
    }

    /// Load from {dir}/algolia.json, else from `ALGOLIA_*` env vars.
    /// Credentials are required either way.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);

        let config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: AlgoliaConfig = serde_json::from_str(&content).map_err(|e| {
                SettingsError::Config(format!("failed to parse {}: {}", path.display(), e))
            })?;
            tracing::info!("Loaded Algolia config from {}", path.display());
            config
        } else {
            Self::from_env()?
        };

        config.validate()?;
        Ok(config)
    }

    fn from_env() -> Result<Self> {
        let app_id = env_non_empty("ALGOLIA_APP_ID").ok_or_else(|| {
            SettingsError::Config(format!(
                "no {} found and ALGOLIA_APP_ID is not set",
                CONFIG_FILE
            ))
        })?;
        // ALGOLIA_SECRET is the name Laravel Scout deployments use.
        let api_key = env_non_empty("ALGOLIA_API_KEY")
            .or_else(|| env_non_empty("ALGOLIA_SECRET"))
            .ok_or_else(|| {
                SettingsError::Config("ALGOLIA_API_KEY (or ALGOLIA_SECRET) is not set".to_string())
            })?;

        let mut config = Self::new(app_id, api_key);
        config.base_url = env_non_empty("ALGOLIA_BASE_URL");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.app_id.trim().is_empty() {
            return Err(SettingsError::Config("app_id must not be empty".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(SettingsError::Config("api_key must not be empty".to_string()));
        }
        if self.task_max_polls == 0 {
            return Err(SettingsError::Config(
                "task_max_polls must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
