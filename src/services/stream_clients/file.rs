// File stream settings

use crate::models::{FileClientValue, PreferenceEdits, StreamEndpoint, StreamType};
use crate::services::{PreferenceError, PreferenceStore};
use super::StreamClientSettings;

pub struct FileClientSettings;

impl FileClientSettings {
    pub const KEY_PATH: &'static str = "stream_file_client_path";
}

impl StreamClientSettings for FileClientSettings {
    const STREAM_TYPE: StreamType = StreamType::File;

    type Value = FileClientValue;

    fn set_default_value(store: &dyn PreferenceStore, value: &FileClientValue) -> Result<(), PreferenceError> {
        store.commit(PreferenceEdits::new().put_string(Self::KEY_PATH, value.path.as_str()))
    }

    fn read_endpoint(store: &dyn PreferenceStore) -> StreamEndpoint {
        StreamEndpoint::file(store.get_string_or(Self::KEY_PATH, ""))
    }

    fn raw_path(store: &dyn PreferenceStore) -> String {
        store.get_string_or(Self::KEY_PATH, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryPreferenceStore;

    #[test]
    fn test_path_is_stored_verbatim() {
        let store = MemoryPreferenceStore::new("log_rover");
        let value = FileClientValue::default().with_path("/sdcard/RtkGps/rover.log").unwrap();
        FileClientSettings::set_default_value(&store, &value).unwrap();

        assert_eq!(FileClientSettings::read_path(&store).unwrap(), "/sdcard/RtkGps/rover.log");
        assert_eq!(FileClientSettings::read_summary(&store), "file:/sdcard/RtkGps/rover.log");
    }

    #[test]
    fn test_missing_path_reads_empty() {
        let store = MemoryPreferenceStore::new("log_rover");
        assert_eq!(FileClientSettings::read_endpoint(&store), StreamEndpoint::file(""));
        assert!(FileClientValue::default().with_path("").is_err());
    }
}
