// Preference Model
// Values and edit batches held by preference stores

use serde::{Deserialize, Serialize};

/// A single persisted preference value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Bool(bool),
    String(String),
}

impl PreferenceValue {
    /// String view; booleans render as "true"/"false"
    pub fn as_string(&self) -> String {
        match self {
            PreferenceValue::Bool(b) => b.to_string(),
            PreferenceValue::String(s) => s.clone(),
        }
    }

    /// Boolean view; strings are accepted when they spell a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PreferenceValue::Bool(b) => Some(*b),
            PreferenceValue::String(s) => s.trim().parse::<bool>().ok(),
        }
    }
}

impl From<bool> for PreferenceValue {
    fn from(value: bool) -> Self {
        PreferenceValue::Bool(value)
    }
}

impl From<String> for PreferenceValue {
    fn from(value: String) -> Self {
        PreferenceValue::String(value)
    }
}

impl From<&str> for PreferenceValue {
    fn from(value: &str) -> Self {
        PreferenceValue::String(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceEdit {
    Put(String, PreferenceValue),
    Remove(String),
}

/// Batch of edits committed to a store as one update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceEdits {
    edits: Vec<PreferenceEdit>,
}

impl PreferenceEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.edits
            .push(PreferenceEdit::Put(key.to_string(), PreferenceValue::String(value.into())));
        self
    }

    pub fn put_bool(mut self, key: &str, value: bool) -> Self {
        self.edits
            .push(PreferenceEdit::Put(key.to_string(), PreferenceValue::Bool(value)));
        self
    }

    pub fn put(mut self, key: &str, value: PreferenceValue) -> Self {
        self.edits.push(PreferenceEdit::Put(key.to_string(), value));
        self
    }

    pub fn remove(mut self, key: &str) -> Self {
        self.edits.push(PreferenceEdit::Remove(key.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn into_edits(self) -> Vec<PreferenceEdit> {
        self.edits
    }
}
