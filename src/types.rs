use crate::error::{Result, SettingsError};
use serde_json::{Map, Value};
use std::path::Path;

/// Index settings exactly as the search service returns them, key order preserved.
pub type RawSettings = Map<String, Value>;

/// Settings the service still reports under a deprecated name: `(legacy, canonical)`.
pub const SETTING_ALIASES: &[(&str, &str)] = &[("attributesToIndex", "searchableAttributes")];

/// Key listing the replicas of a primary index.
pub const REPLICAS_KEY: &str = "replicas";

/// Rename every legacy key to its canonical name.
///
/// The legacy value is moved into the legacy key's position. If the canonical
/// key was also present, its value is dropped in favour of the legacy one.
pub fn normalize_aliases(settings: &mut RawSettings) {
    for &(legacy, canonical) in SETTING_ALIASES {
        if !settings.contains_key(legacy) {
            continue;
        }
        let renamed: RawSettings = std::mem::take(settings)
            .into_iter()
            .filter(|(key, _)| key != canonical)
            .map(|(key, value)| {
                if key == legacy {
                    (canonical.to_string(), value)
                } else {
                    (key, value)
                }
            })
            .collect();
        *settings = renamed;
    }
}

/// Canonical name for a settings key, resolving legacy aliases.
pub fn canonical_key(key: &str) -> &str {
    SETTING_ALIASES
        .iter()
        .find(|(legacy, _)| *legacy == key)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(key)
}

/// Index names of the replicas declared in `settings`.
///
/// Virtual replicas are declared as `virtual(name)` and resolve to `name`.
/// Non-string entries are skipped.
pub fn replica_names(settings: &RawSettings) -> Vec<String> {
    let Some(Value::Array(entries)) = settings.get(REPLICAS_KEY) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry.as_str() {
            Some(name) => Some(strip_virtual(name).to_string()),
            None => {
                tracing::warn!("ignoring non-string replica entry: {}", entry);
                None
            }
        })
        .collect()
}

fn strip_virtual(name: &str) -> &str {
    name.strip_prefix("virtual(")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(name)
}

/// Interpret a JSON value as raw settings. Anything but an object is rejected.
pub fn settings_from_value(value: Value) -> Result<RawSettings> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SettingsError::InvalidSettings(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Read a settings object from a JSON file, legacy aliases normalized.
pub fn load_settings_file<P: AsRef<Path>>(path: P) -> Result<RawSettings> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    let mut settings = settings_from_value(value)?;
    normalize_aliases(&mut settings);
    Ok(settings)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
