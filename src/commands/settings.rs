// Settings Commands
// Seeding, loading and raw preference access

use std::collections::BTreeMap;
use crate::models::{PreferenceEdits, PreferenceValue, RtkServerSettings};
use crate::services::{self, PreferenceRepository};

/// Assemble the engine settings from the stores
pub fn load_settings(repo: &dyn PreferenceRepository) -> Result<RtkServerSettings, String> {
    services::load_settings(repo).map_err(|e| e.to_string())
}

/// Seed factory defaults; `force` overwrites existing values
pub fn set_default_values(repo: &dyn PreferenceRepository, force: bool) -> Result<(), String> {
    services::set_default_values(repo, force).map_err(|e| e.to_string())
}

pub fn get_preference(
    repo: &dyn PreferenceRepository,
    store: &str,
    key: &str,
) -> Result<Option<PreferenceValue>, String> {
    let store = repo.open(store).map_err(|e| e.to_string())?;
    Ok(store.get(key))
}

pub fn get_preferences(
    repo: &dyn PreferenceRepository,
    store: &str,
) -> Result<BTreeMap<String, PreferenceValue>, String> {
    let store = repo.open(store).map_err(|e| e.to_string())?;
    Ok(store.snapshot())
}

/// Write a single key; `None` removes it
pub fn set_preference(
    repo: &dyn PreferenceRepository,
    store: &str,
    key: &str,
    value: Option<PreferenceValue>,
) -> Result<(), String> {
    if key.trim().is_empty() {
        return Err("Preference key cannot be empty".to_string());
    }

    let store = repo.open(store).map_err(|e| e.to_string())?;
    let edits = match value {
        Some(value) => PreferenceEdits::new().put(key, value),
        None => PreferenceEdits::new().remove(key),
    };
    store.commit(edits).map_err(|e| e.to_string())
}
