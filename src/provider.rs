//! Capabilities the reconciler needs from a search service.
//!
//! Every write returns a [`PendingOperation`]: the service has accepted the
//! request but may not have applied it yet. Callers await [`PendingOperation::wait`]
//! before issuing anything that depends on the write.

use crate::error::Result;
use crate::types::RawSettings;
use serde_json::Value;
use std::future::Future;

/// An accepted remote write that may still be in flight.
pub trait PendingOperation: Send {
    /// Resolves once the service reports the write as applied.
    fn wait(self) -> impl Future<Output = Result<()>> + Send;
}

/// Handle to one named index. Opening a handle never touches the network,
/// so the index may not exist yet.
pub trait IndexHandle: Send + Sync {
    type Pending: PendingOperation;

    fn name(&self) -> &str;

    /// Current settings. Fails with [`crate::SettingsError::IndexNotFound`]
    /// when the index has not been created.
    fn get_settings(&self) -> impl Future<Output = Result<RawSettings>> + Send;

    fn set_settings(
        &self,
        settings: &RawSettings,
    ) -> impl Future<Output = Result<Self::Pending>> + Send;

    /// Add or replace a single record. Creates the index if it is missing.
    fn insert_record(&self, record: Value) -> impl Future<Output = Result<Self::Pending>> + Send;

    /// Remove every record, keeping the index and its settings.
    fn clear_records(&self) -> impl Future<Output = Result<Self::Pending>> + Send;
}

pub trait IndexProvider: Send + Sync {
    type Index: IndexHandle;

    fn open_index(&self, name: &str) -> Self::Index;

    fn delete_index(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<<Self::Index as IndexHandle>::Pending>> + Send;
}
