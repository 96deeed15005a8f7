//! In-memory search service used by the reconciler tests.
//!
//! Writes are recorded when issued but only applied when their pending
//! operation is awaited, the way an asynchronous service behaves.

use scout_settings::{
    IndexHandle, IndexProvider, PendingOperation, RawSettings, Result, SettingsError,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum Call {
    GetSettings(String),
    SetSettings(String, RawSettings),
    InsertRecord(String, Value),
    ClearRecords(String),
    DeleteIndex(String),
    Wait(String),
}

impl Call {
    pub fn index(&self) -> &str {
        match self {
            Call::GetSettings(name)
            | Call::SetSettings(name, _)
            | Call::InsertRecord(name, _)
            | Call::ClearRecords(name)
            | Call::DeleteIndex(name)
            | Call::Wait(name) => name,
        }
    }
}

#[derive(Debug, Clone)]
enum Write {
    Settings(RawSettings),
    Record(Value),
    Clear,
    Delete,
}

#[derive(Debug, Default)]
struct StoredIndex {
    settings: RawSettings,
    records: Vec<Value>,
}

#[derive(Default)]
struct State {
    indexes: HashMap<String, StoredIndex>,
    calls: Vec<Call>,
    failures: HashMap<(String, &'static str), SettingsError>,
}

/// Settings a brand-new index reports.
pub fn service_defaults() -> RawSettings {
    json!({
        "minWordSizefor1Typo": 4,
        "minWordSizefor2Typos": 8,
        "hitsPerPage": 20,
        "maxValuesPerFacet": 100,
        "attributesToIndex": null,
        "numericAttributesToIndex": null,
        "attributesToRetrieve": null,
        "unretrievableAttributes": null,
        "optionalWords": null,
        "attributesForFaceting": null,
        "customRanking": null,
        "ranking": ["typo", "geo", "words", "filters", "proximity", "attribute", "exact", "custom"],
        "highlightPreTag": "<em>",
        "highlightPostTag": "</em>",
        "paginationLimitedTo": 1000
    })
    .as_object()
    .cloned()
    .unwrap()
}

#[derive(Clone)]
pub struct MemoryProvider {
    state: Arc<Mutex<State>>,
}

#[allow(dead_code)]
impl MemoryProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Seed an existing index whose settings are the defaults overlaid with `overrides`.
    pub fn with_index(self, name: &str, overrides: Value) -> Self {
        let mut settings = service_defaults();
        if let Value::Object(map) = overrides {
            for (key, value) in map {
                settings.insert(key, value);
            }
        }
        self.state.lock().unwrap().indexes.insert(
            name.to_string(),
            StoredIndex {
                settings,
                records: Vec::new(),
            },
        );
        self
    }

    /// Make the next `op` call on `index` fail with `error`.
    pub fn fail_on(&self, op: &'static str, index: &str, error: SettingsError) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((index.to_string(), op), error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_for(&self, index: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.index() == index)
            .collect()
    }

    pub fn exists(&self, index: &str) -> bool {
        self.state.lock().unwrap().indexes.contains_key(index)
    }

    pub fn records(&self, index: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .indexes
            .get(index)
            .map(|stored| stored.records.clone())
            .unwrap_or_default()
    }

    pub fn stored_settings(&self, index: &str) -> Option<RawSettings> {
        self.state
            .lock()
            .unwrap()
            .indexes
            .get(index)
            .map(|stored| stored.settings.clone())
    }

    fn record(&self, call: Call, op: &'static str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let index = call.index().to_string();
        state.calls.push(call);
        match state.failures.remove(&(index, op)) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn pending(&self, index: &str, write: Write) -> MemoryTask {
        MemoryTask {
            provider: self.clone(),
            index: index.to_string(),
            write,
        }
    }
}

pub struct MemoryIndex {
    provider: MemoryProvider,
    name: String,
}

pub struct MemoryTask {
    provider: MemoryProvider,
    index: String,
    write: Write,
}

impl PendingOperation for MemoryTask {
    async fn wait(self) -> Result<()> {
        self.provider
            .record(Call::Wait(self.index.clone()), "wait")?;

        let mut state = self.provider.state.lock().unwrap();
        match self.write {
            Write::Delete => {
                state.indexes.remove(&self.index);
            }
            Write::Settings(settings) => {
                let stored = state.indexes.entry(self.index.clone()).or_insert_with(|| {
                    StoredIndex {
                        settings: service_defaults(),
                        records: Vec::new(),
                    }
                });
                for (key, value) in settings {
                    stored.settings.insert(key, value);
                }
            }
            Write::Record(record) => {
                let stored = state.indexes.entry(self.index.clone()).or_insert_with(|| {
                    StoredIndex {
                        settings: service_defaults(),
                        records: Vec::new(),
                    }
                });
                stored.records.push(record);
            }
            Write::Clear => {
                if let Some(stored) = state.indexes.get_mut(&self.index) {
                    stored.records.clear();
                }
            }
        }
        Ok(())
    }
}

impl IndexHandle for MemoryIndex {
    type Pending = MemoryTask;

    fn name(&self) -> &str {
        &self.name
    }

    async fn get_settings(&self) -> Result<RawSettings> {
        self.provider
            .record(Call::GetSettings(self.name.clone()), "get_settings")?;
        self.provider
            .stored_settings(&self.name)
            .ok_or_else(|| SettingsError::IndexNotFound(self.name.clone()))
    }

    async fn set_settings(&self, settings: &RawSettings) -> Result<MemoryTask> {
        self.provider.record(
            Call::SetSettings(self.name.clone(), settings.clone()),
            "set_settings",
        )?;
        Ok(self
            .provider
            .pending(&self.name, Write::Settings(settings.clone())))
    }

    async fn insert_record(&self, record: Value) -> Result<MemoryTask> {
        self.provider.record(
            Call::InsertRecord(self.name.clone(), record.clone()),
            "insert_record",
        )?;
        Ok(self.provider.pending(&self.name, Write::Record(record)))
    }

    async fn clear_records(&self) -> Result<MemoryTask> {
        self.provider
            .record(Call::ClearRecords(self.name.clone()), "clear_records")?;
        Ok(self.provider.pending(&self.name, Write::Clear))
    }
}

impl IndexProvider for MemoryProvider {
    type Index = MemoryIndex;

    fn open_index(&self, name: &str) -> MemoryIndex {
        MemoryIndex {
            provider: self.clone(),
            name: name.to_string(),
        }
    }

    async fn delete_index(&self, name: &str) -> Result<MemoryTask> {
        self.record(Call::DeleteIndex(name.to_string()), "delete_index")?;
        Ok(self.pending(name, Write::Delete))
    }
}
