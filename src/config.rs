use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "scout-settings.json";

fn default_defaults_index() -> String {
    "temp-scout-settings".to_string()
}

fn default_placeholder_object_id() -> String {
    "temp".to_string()
}

fn default_fetch_replicas() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Disposable index created (and deleted) to read the service defaults.
    #[serde(default = "default_defaults_index")]
    pub defaults_index: String,

    /// objectID of the record used to materialize a missing index.
    #[serde(default = "default_placeholder_object_id")]
    pub placeholder_object_id: String,

    #[serde(default = "default_fetch_replicas")]
    pub fetch_replicas: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            defaults_index: default_defaults_index(),
            placeholder_object_id: default_placeholder_object_id(),
            fetch_replicas: default_fetch_replicas(),
        }
    }
}

impl ReconcilerConfig {
    /// Load from {dir}/scout-settings.json, else from `SCOUT_SETTINGS_*` env vars.
    pub fn load_or_default(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<ReconcilerConfig>(&content) {
                    Ok(config) => {
                        tracing::info!(
                            "Loaded reconciler config: defaults_index={}, fetch_replicas={}",
                            config.defaults_index,
                            config.fetch_replicas
                        );
                        return config;
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse {}: {}, using defaults", CONFIG_FILE, e);
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to read {}: {}, using defaults", CONFIG_FILE, e);
                }
            }
        }

        let mut config = Self::default();
        if let Ok(index) = std::env::var("SCOUT_SETTINGS_DEFAULTS_INDEX") {
            if !index.trim().is_empty() {
                config.defaults_index = index.trim().to_string();
            }
        }
        if let Ok(object_id) = std::env::var("SCOUT_SETTINGS_PLACEHOLDER_ID") {
            if !object_id.trim().is_empty() {
                config.placeholder_object_id = object_id.trim().to_string();
            }
        }
        if let Ok(flag) = std::env::var("SCOUT_SETTINGS_FETCH_REPLICAS") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "0" | "false" | "no" | "off" => config.fetch_replicas = false,
                "1" | "true" | "yes" | "on" => config.fetch_replicas = true,
                other => tracing::warn!(
                    "Ignoring SCOUT_SETTINGS_FETCH_REPLICAS={:?}, expected a boolean",
                    other
                ),
            }
        }
        config
    }
}
