// Stream client settings
// Per-transport sub-fields kept in a stream role's preference store

mod file;
mod ntrip;
mod tcp;

pub use file::*;
pub use ntrip::*;
pub use tcp::*;

use crate::models::{StreamEndpoint, StreamType};
use crate::services::{PreferenceError, PreferenceStore, StreamPathCodec, StreamPathError};

/// Reads and seeds the sub-fields of one transport
pub trait StreamClientSettings {
    const STREAM_TYPE: StreamType;

    /// Seed values written by `set_default_value`
    type Value;

    /// Write every sub-field of `value` in a single commit
    fn set_default_value(store: &dyn PreferenceStore, value: &Self::Value) -> Result<(), PreferenceError>;

    /// Build the endpoint from the stored sub-fields; missing keys read as empty
    fn read_endpoint(store: &dyn PreferenceStore) -> StreamEndpoint;

    /// Sub-fields joined without validation, used when the endpoint cannot be encoded
    fn raw_path(store: &dyn PreferenceStore) -> String;

    /// Engine path for the stored sub-fields
    fn read_path(store: &dyn PreferenceStore) -> Result<String, StreamPathError> {
        StreamPathCodec::encode(Self::STREAM_TYPE, &Self::read_endpoint(store))
    }

    fn read_summary(store: &dyn PreferenceStore) -> String {
        match Self::read_path(store) {
            Ok(path) => StreamPathCodec::summarize(Self::STREAM_TYPE, &path),
            Err(e) => {
                log::debug!("Store '{}' has no valid {} path: {}", store.name(), Self::STREAM_TYPE, e);
                format!("{}:{}", Self::STREAM_TYPE.summary_tag(), Self::raw_path(store))
            }
        }
    }
}
