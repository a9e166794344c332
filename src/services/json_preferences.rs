// JsonPreferences Service
// File-backed preference stores, one JSON document per store

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use serde_json::Value;
use crate::models::{PreferenceEdits, PreferenceValue};
use crate::services::preferences::{apply_edits, notify_changed, read_values};
use crate::services::{validate_store_name, EventSink, NoopEventSink, PreferenceError, PreferenceRepository, PreferenceStore};

/// Store persisted at `<dir>/<name>.json`
pub struct JsonPreferenceStore {
    name: String,
    path: PathBuf,
    values: RwLock<BTreeMap<String, PreferenceValue>>,
    events: Arc<dyn EventSink>,
}

impl JsonPreferenceStore {
    /// Open the store, reading it from disk if the file exists
    pub fn open(dir: &Path, name: &str, events: Arc<dyn EventSink>) -> Result<Self, PreferenceError> {
        validate_store_name(name)?;
        let path = dir.join(format!("{name}.json"));

        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            parse_values(name, &content)?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            name: name.to_string(),
            path,
            values: RwLock::new(values),
            events,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_to_disk(&self, values: &BTreeMap<String, PreferenceValue>) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(values)?;

        // Write then rename so a crash never leaves a half-written store
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<PreferenceValue> {
        read_values(&self.values, &self.name).get(key).cloned()
    }

    fn snapshot(&self) -> BTreeMap<String, PreferenceValue> {
        read_values(&self.values, &self.name).clone()
    }

    fn commit(&self, edits: PreferenceEdits) -> Result<(), PreferenceError> {
        let changed = {
            let mut values = self
                .values
                .write()
                .map_err(|_| PreferenceError::Poisoned(self.name.clone()))?;

            let mut updated = values.clone();
            let changed = apply_edits(&mut updated, edits);
            if changed.is_empty() {
                return Ok(());
            }

            self.write_to_disk(&updated)?;
            *values = updated;
            changed
        };

        notify_changed(self.events.as_ref(), &self.name, changed);
        Ok(())
    }
}

/// Accept hand-edited files: numbers are kept as strings, other shapes are dropped
fn parse_values(name: &str, content: &str) -> Result<BTreeMap<String, PreferenceValue>, PreferenceError> {
    let raw: serde_json::Map<String, Value> = serde_json::from_str(content)?;
    let mut values = BTreeMap::new();

    for (key, value) in raw {
        let value = match value {
            Value::Bool(b) => PreferenceValue::Bool(b),
            Value::String(s) => PreferenceValue::String(s),
            Value::Number(n) => PreferenceValue::String(n.to_string()),
            other => {
                log::warn!("Ignoring preference '{key}' in store '{name}': unsupported value {other}");
                continue;
            }
        };
        values.insert(key, value);
    }

    Ok(values)
}

/// Repository of JSON stores under `<data_dir>/preferences`
pub struct JsonPreferences {
    dir: PathBuf,
    stores: RwLock<HashMap<String, Arc<JsonPreferenceStore>>>,
    events: Arc<dyn EventSink>,
}

impl JsonPreferences {
    pub fn new(app_data_dir: &Path) -> Self {
        Self::with_events(app_data_dir, Arc::new(NoopEventSink))
    }

    pub fn with_events(app_data_dir: &Path, events: Arc<dyn EventSink>) -> Self {
        Self {
            dir: app_data_dir.join("preferences"),
            stores: RwLock::new(HashMap::new()),
            events,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PreferenceRepository for JsonPreferences {
    fn open(&self, name: &str) -> Result<Arc<dyn PreferenceStore>, PreferenceError> {
        let mut stores = self
            .stores
            .write()
            .map_err(|_| PreferenceError::Poisoned(name.to_string()))?;

        if let Some(store) = stores.get(name) {
            let store: Arc<dyn PreferenceStore> = store.clone();
            return Ok(store);
        }

        let store = Arc::new(JsonPreferenceStore::open(&self.dir, name, self.events.clone())?);
        log::info!("Opened preference store '{}' at {:?}", name, store.path());
        stores.insert(name.to_string(), store.clone());
        let store: Arc<dyn PreferenceStore> = store;
        Ok(store)
    }
}
