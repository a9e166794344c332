// Event delivery
// Change notifications pushed to whoever is listening (WebSocket clients, tests)

use serde::Serialize;
use serde_json::Value;

pub const PREFERENCE_CHANGED_EVENT: &str = "preference_changed";
pub const SETTINGS_RESET_EVENT: &str = "settings_reset";

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, payload: Value);
}

pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: &str, _payload: Value) {}
}

/// Payload of `preference_changed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceChangedEvent {
    pub store: String,
    pub keys: Vec<String>,
}

pub fn emit_event<T: Serialize>(sink: &dyn EventSink, event: &str, payload: &T) {
    match serde_json::to_value(payload) {
        Ok(value) => sink.emit(event, value),
        Err(e) => log::warn!("Dropping '{event}' event: {e}"),
    }
}
