use crate::types::{canonical_key, normalize_aliases, RawSettings};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Settings of one index, paired with the service defaults they are compared against.
///
/// Keys absent from the index settings are treated as carrying their default.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    settings: RawSettings,
    defaults: RawSettings,
    replicas: IndexMap<String, RawSettings>,
}

/// One setting whose value differs from the service default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingChange {
    pub key: String,
    pub default: Option<Value>,
    pub current: Value,
}

impl Settings {
    pub fn new(settings: RawSettings, defaults: RawSettings) -> Self {
        Self {
            settings,
            defaults,
            replicas: IndexMap::new(),
        }
    }

    pub fn with_replicas(mut self, replicas: IndexMap<String, RawSettings>) -> Self {
        self.replicas = replicas;
        self
    }

    pub fn raw(&self) -> &RawSettings {
        &self.settings
    }

    pub fn defaults(&self) -> &RawSettings {
        &self.defaults
    }

    /// Settings of each replica, keyed by replica index name.
    pub fn replicas(&self) -> &IndexMap<String, RawSettings> {
        &self.replicas
    }

    pub fn replica(&self, name: &str) -> Option<&RawSettings> {
        self.replicas.get(name)
    }

    /// Effective value of `key`: the index's own value, else the default.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let key = canonical_key(key);
        self.settings.get(key).or_else(|| self.defaults.get(key))
    }

    /// Set `key`, resolving legacy names. Returns the previous index value.
    pub fn set(&mut self, key: &str, value: Value) -> Option<Value> {
        self.settings.insert(canonical_key(key).to_string(), value)
    }

    /// Drop the index's own value for `key` so the default applies again.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.settings.shift_remove(canonical_key(key))
    }

    pub fn is_default(&self, key: &str) -> bool {
        let key = canonical_key(key);
        match self.settings.get(key) {
            None => true,
            Some(value) => self.defaults.get(key) == Some(value),
        }
    }

    /// Entries whose value differs from the default, in index order.
    pub fn changed(&self) -> RawSettings {
        self.settings
            .iter()
            .filter(|(key, _)| !self.is_default(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn diff(&self) -> Vec<SettingChange> {
        self.changed()
            .into_iter()
            .map(|(key, current)| SettingChange {
                default: self.defaults.get(&key).cloned(),
                key,
                current,
            })
            .collect()
    }

    /// Overlay `desired` on the current settings. Returns whether any value changed.
    pub fn merge(&mut self, mut desired: RawSettings) -> bool {
        normalize_aliases(&mut desired);
        let mut modified = false;
        for (key, value) in desired {
            if self.settings.get(&key) != Some(&value) {
                self.settings.insert(key, value);
                modified = true;
            }
        }
        modified
    }

    /// Settings in the form written back to the index.
    pub fn compiled(&self) -> RawSettings {
        self.settings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::settings_from_value;
    use serde_json::json;

    fn raw(value: Value) -> RawSettings {
        settings_from_value(value).unwrap()
    }

    fn sample() -> Settings {
        Settings::new(
            raw(json!({
                "searchableAttributes": ["title", "body"],
                "hitsPerPage": 20,
                "customRanking": ["desc(popularity)"]
            })),
            raw(json!({
                "searchableAttributes": null,
                "hitsPerPage": 20,
                "customRanking": null,
                "maxValuesPerFacet": 100
            })),
        )
    }

    #[test]
    fn get_falls_back_to_defaults() {
        let settings = sample();
        assert_eq!(settings.get("hitsPerPage"), Some(&json!(20)));
        assert_eq!(settings.get("maxValuesPerFacet"), Some(&json!(100)));
        assert_eq!(settings.get("unknown"), None);
    }

    #[test]
    fn get_and_set_resolve_aliases() {
        let mut settings = sample();
        assert_eq!(
            settings.get("attributesToIndex"),
            Some(&json!(["title", "body"]))
        );
        settings.set("attributesToIndex", json!(["name"]));
        assert_eq!(settings.raw()["searchableAttributes"], json!(["name"]));
        assert!(!settings.raw().contains_key("attributesToIndex"));
    }

    #[test]
    fn changed_excludes_default_values() {
        let changed = sample().changed();
        let keys: Vec<&str> = changed.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["searchableAttributes", "customRanking"]);
    }

    #[test]
    fn remove_restores_default() {
        let mut settings = sample();
        assert!(!settings.is_default("customRanking"));
        settings.remove("customRanking");
        assert!(settings.is_default("customRanking"));
        assert_eq!(settings.get("customRanking"), Some(&Value::Null));
    }

    #[test]
    fn keys_without_default_count_as_changed() {
        let mut settings = sample();
        settings.set("userData", json!({"team": "search"}));
        assert!(!settings.is_default("userData"));
        assert!(settings.changed().contains_key("userData"));
    }

    #[test]
    fn diff_reports_default_and_current() {
        let diff = sample().diff();
        assert_eq!(diff.len(), 2);
        assert_eq!(diff[1].key, "customRanking");
        assert_eq!(diff[1].default, Some(Value::Null));
        assert_eq!(diff[1].current, json!(["desc(popularity)"]));
    }

    #[test]
    fn merge_reports_modification() {
        let mut settings = sample();
        assert!(!settings.merge(raw(json!({"hitsPerPage": 20}))));
        assert!(settings.merge(raw(json!({"attributesToIndex": ["sku"]}))));
        assert_eq!(settings.raw()["searchableAttributes"], json!(["sku"]));
    }

    #[test]
    fn compiled_is_the_full_index_settings() {
        let settings = sample();
        assert_eq!(settings.compiled(), settings.raw().clone());
    }

    #[test]
    fn replicas_are_kept_out_of_compiled() {
        let mut replicas = IndexMap::new();
        replicas.insert(
            "products_price_asc".to_string(),
            raw(json!({"customRanking": ["asc(price)"]})),
        );
        let settings = sample().with_replicas(replicas);
        assert!(settings.replica("products_price_asc").is_some());
        assert!(!settings.compiled().contains_key("products_price_asc"));
    }
}
