// Preference Stores
// Named key-value stores holding the per-stream settings

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard};
use crate::models::{PreferenceEdit, PreferenceEdits, PreferenceValue};
use crate::services::{emit_event, EventSink, NoopEventSink, PreferenceChangedEvent, PREFERENCE_CHANGED_EVENT};

/// Errors raised by preference stores
#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("Invalid store name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse preferences: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Preference store '{0}' lock poisoned")]
    Poisoned(String),
}

/// A named, persistent mapping from key to string or boolean value
pub trait PreferenceStore: Send + Sync {
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Option<PreferenceValue>;

    /// Copy of every key currently held
    fn snapshot(&self) -> BTreeMap<String, PreferenceValue>;

    /// Apply a batch of edits as one update and persist it.
    /// Listeners are notified once per batch that changed anything.
    fn commit(&self, edits: PreferenceEdits) -> Result<(), PreferenceError>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| value.as_string())
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|value| value.as_bool())
    }

    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|| default.to_string())
    }

    fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }
}

/// Opens preference stores by name.
/// Repeated opens of one name share the same store.
pub trait PreferenceRepository: Send + Sync {
    fn open(&self, name: &str) -> Result<Arc<dyn PreferenceStore>, PreferenceError>;
}

/// Validate store name so it is safe to use as a file name
pub fn validate_store_name(name: &str) -> Result<(), PreferenceError> {
    let invalid = |reason: &str| PreferenceError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(invalid("name cannot contain path separators"));
    }
    if name.contains("..") {
        return Err(invalid("name cannot contain '..'"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(invalid("only letters, numbers, underscores and hyphens are allowed"));
    }
    if name.len() > 64 {
        return Err(invalid("name too long (max 64 characters)"));
    }
    Ok(())
}

/// Apply edits to a map, returning the keys whose value actually changed
pub(crate) fn apply_edits(
    values: &mut BTreeMap<String, PreferenceValue>,
    edits: PreferenceEdits,
) -> Vec<String> {
    let mut changed = Vec::new();
    for edit in edits.into_edits() {
        let key = match edit {
            PreferenceEdit::Put(key, value) => {
                if values.get(&key) == Some(&value) {
                    continue;
                }
                values.insert(key.clone(), value);
                key
            }
            PreferenceEdit::Remove(key) => {
                if values.remove(&key).is_none() {
                    continue;
                }
                key
            }
        };
        if !changed.contains(&key) {
            changed.push(key);
        }
    }
    changed
}

/// Read access that survives a poisoned lock.
/// Commits only swap in fully applied maps, so the last committed values are still valid.
pub(crate) fn read_values<'a>(
    lock: &'a RwLock<BTreeMap<String, PreferenceValue>>,
    store: &str,
) -> RwLockReadGuard<'a, BTreeMap<String, PreferenceValue>> {
    lock.read().unwrap_or_else(|poisoned| {
        log::warn!("Preference store '{store}' lock poisoned, reading last committed values");
        poisoned.into_inner()
    })
}

pub(crate) fn notify_changed(events: &dyn EventSink, store: &str, keys: Vec<String>) {
    if keys.is_empty() {
        return;
    }
    log::debug!("Preferences '{}' changed: {}", store, keys.join(", "));
    emit_event(
        events,
        PREFERENCE_CHANGED_EVENT,
        &PreferenceChangedEvent {
            store: store.to_string(),
            keys,
        },
    );
}

/// In-memory store
pub struct MemoryPreferenceStore {
    name: String,
    values: RwLock<BTreeMap<String, PreferenceValue>>,
    events: Arc<dyn EventSink>,
}

impl MemoryPreferenceStore {
    pub fn new(name: &str) -> Self {
        Self::with_events(name, Arc::new(NoopEventSink))
    }

    pub fn with_events(name: &str, events: Arc<dyn EventSink>) -> Self {
        Self {
            name: name.to_string(),
            values: RwLock::new(BTreeMap::new()),
            events,
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
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
            *values = updated;
            changed
        };
        notify_changed(self.events.as_ref(), &self.name, changed);
        Ok(())
    }
}

/// Repository of in-memory stores
pub struct MemoryPreferences {
    stores: RwLock<HashMap<String, Arc<MemoryPreferenceStore>>>,
    events: Arc<dyn EventSink>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::with_events(Arc::new(NoopEventSink))
    }

    pub fn with_events(events: Arc<dyn EventSink>) -> Self {
        Self {
            stores: RwLock::new(HashMap::new()),
            events,
        }
    }
}

impl Default for MemoryPreferences {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceRepository for MemoryPreferences {
    fn open(&self, name: &str) -> Result<Arc<dyn PreferenceStore>, PreferenceError> {
        validate_store_name(name)?;

        let mut stores = self
            .stores
            .write()
            .map_err(|_| PreferenceError::Poisoned(name.to_string()))?;
        let store: Arc<dyn PreferenceStore> = stores
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryPreferenceStore::with_events(name, self.events.clone())))
            .clone();
        Ok(store)
    }
}
