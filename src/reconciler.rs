//! Reads, normalizes and writes back index settings.
//!
//! The defaults every index is compared against come from a disposable index:
//! it is created, read and deleted the first time they are needed, then kept
//! for the lifetime of the reconciler.

use crate::config::ReconcilerConfig;
use crate::error::Result;
use crate::provider::{IndexHandle, IndexProvider, PendingOperation};
use crate::settings::Settings;
use crate::types::{normalize_aliases, replica_names, RawSettings};
use indexmap::IndexMap;
use serde_json::json;
use tokio::sync::OnceCell;

pub struct SettingsReconciler<P: IndexProvider> {
    provider: P,
    config: ReconcilerConfig,
    defaults: OnceCell<RawSettings>,
}

impl<P: IndexProvider> SettingsReconciler<P> {
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, ReconcilerConfig::default())
    }

    pub fn with_config(provider: P, config: ReconcilerConfig) -> Self {
        Self {
            provider,
            config,
            defaults: OnceCell::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Open a handle through the underlying provider.
    pub fn index(&self, name: &str) -> P::Index {
        self.provider.open_index(name)
    }

    pub fn defaults_cached(&self) -> bool {
        self.defaults.initialized()
    }

    /// Settings of a freshly created index. Computed once; a failed attempt
    /// caches nothing and the next call starts over.
    pub async fn defaults(&self) -> Result<&RawSettings> {
        self.defaults
            .get_or_try_init(|| self.fetch_defaults())
            .await
    }

    async fn fetch_defaults(&self) -> Result<RawSettings> {
        let name = self.config.defaults_index.as_str();
        tracing::info!("[SETTINGS {}] reading service defaults", name);

        let index = self.provider.open_index(name);
        let defaults = self.raw_settings(&index).await?;
        self.provider.delete_index(name).await?.wait().await?;

        tracing::debug!(
            "[SETTINGS {}] cached {} default settings, index deleted",
            name,
            defaults.len()
        );
        Ok(defaults)
    }

    /// Settings of `index` with legacy aliases normalized. A missing index is
    /// created empty first, so the result is then its default settings.
    pub async fn raw_settings(&self, index: &P::Index) -> Result<RawSettings> {
        let mut settings = match index.get_settings().await {
            Ok(settings) => settings,
            Err(e) if e.is_not_found() => self.materialize(index).await?,
            Err(e) => return Err(e),
        };
        normalize_aliases(&mut settings);
        Ok(settings)
    }

    async fn materialize(&self, index: &P::Index) -> Result<RawSettings> {
        tracing::info!(
            "[SETTINGS {}] index does not exist, creating it empty",
            index.name()
        );

        let placeholder = json!({ "objectID": self.config.placeholder_object_id });
        index.insert_record(placeholder).await?.wait().await?;
        let settings = index.get_settings().await?;
        index.clear_records().await?.wait().await?;

        Ok(settings)
    }

    /// Settings of every replica listed in `settings`, keyed by replica name.
    ///
    /// Replicas are only read: one that does not exist is left out of the
    /// result instead of being created.
    pub async fn replica_settings(
        &self,
        settings: &RawSettings,
    ) -> Result<IndexMap<String, RawSettings>> {
        let mut replicas = IndexMap::new();
        for name in replica_names(settings) {
            let replica = self.provider.open_index(&name);
            let mut replica_settings = match replica.get_settings().await {
                Ok(replica_settings) => replica_settings,
                Err(e) if e.is_not_found() => {
                    tracing::warn!("[SETTINGS {}] listed as replica but does not exist", name);
                    continue;
                }
                Err(e) => return Err(e),
            };
            normalize_aliases(&mut replica_settings);
            tracing::debug!("[SETTINGS {}] loaded replica settings", name);
            replicas.insert(name, replica_settings);
        }
        Ok(replicas)
    }

    pub async fn find(&self, index: &P::Index) -> Result<Settings> {
        let raw = self.raw_settings(index).await?;
        let defaults = self.defaults().await?.clone();

        let replicas = if self.config.fetch_replicas {
            self.replica_settings(&raw).await?
        } else {
            IndexMap::new()
        };

        Ok(Settings::new(raw, defaults).with_replicas(replicas))
    }

    /// Write `settings` to `index` and wait until the service has applied them.
    pub async fn save(&self, index: &P::Index, settings: &Settings) -> Result<()> {
        let compiled = settings.compiled();
        tracing::info!(
            "[SETTINGS {}] saving {} settings",
            index.name(),
            compiled.len()
        );
        index.set_settings(&compiled).await?.wait().await
    }

    /// Overlay `desired` on the current settings of `index`, saving only when
    /// something actually changed.
    pub async fn sync(&self, index: &P::Index, desired: RawSettings) -> Result<Settings> {
        let mut settings = self.find(index).await?;
        if settings.merge(desired) {
            self.save(index, &settings).await?;
        } else {
            tracing::info!("[SETTINGS {}] already up to date", index.name());
        }
        Ok(settings)
    }
}
