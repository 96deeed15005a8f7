//! # scout-settings
//!
//! Settings reconciliation for hosted, Algolia-compatible search indexes.
//!
//! A [`SettingsReconciler`] reads the settings of a remote index, renames
//! legacy keys (`attributesToIndex` → `searchableAttributes`), pairs them with
//! the service defaults and hands back a [`Settings`] value. Callers change it
//! and save it back; the save returns once the service has applied the write.
//!
//! The service itself sits behind the [`IndexProvider`] / [`IndexHandle`]
//! traits. The `scout-settings-algolia` crate implements them over the
//! Algolia REST API.
//!
//! ```rust,ignore
//! use scout_settings::SettingsReconciler;
//! use serde_json::json;
//!
//! let reconciler = SettingsReconciler::new(client);
//! let index = reconciler.index("products");
//!
//! let mut settings = reconciler.find(&index).await?;
//! settings.set("customRanking", json!(["desc(popularity)"]));
//! reconciler.save(&index, &settings).await?;
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod reconciler;
pub mod settings;
pub mod types;

pub use config::ReconcilerConfig;
pub use error::{Result, SettingsError};
pub use provider::{IndexHandle, IndexProvider, PendingOperation};
pub use reconciler::SettingsReconciler;
pub use settings::{SettingChange, Settings};
pub use types::{normalize_aliases, RawSettings, SETTING_ALIASES};
