// NTRIP client stream settings

use crate::models::{NtripClientValue, NtripEndpoint, PreferenceEdits, StreamEndpoint, StreamType};
use crate::services::{PreferenceError, PreferenceStore};
use super::StreamClientSettings;

pub struct NtripClientSettings;

impl NtripClientSettings {
    pub const KEY_HOST: &'static str = "stream_ntrip_client_host";
    pub const KEY_PORT: &'static str = "stream_ntrip_client_port";
    pub const KEY_USER: &'static str = "stream_ntrip_client_user";
    pub const KEY_PASSWORD: &'static str = "stream_ntrip_client_password";
    pub const KEY_MOUNTPOINT: &'static str = "stream_ntrip_client_mountpoint";
    pub const KEY_STR: &'static str = "stream_ntrip_client_str";
}

impl StreamClientSettings for NtripClientSettings {
    const STREAM_TYPE: StreamType = StreamType::NtripCli;

    type Value = NtripClientValue;

    fn set_default_value(store: &dyn PreferenceStore, value: &NtripClientValue) -> Result<(), PreferenceError> {
        store.commit(
            PreferenceEdits::new()
                .put_string(Self::KEY_HOST, value.host.as_str())
                .put_string(Self::KEY_PORT, value.port.to_string())
                .put_string(Self::KEY_USER, value.user.as_str())
                .put_string(Self::KEY_PASSWORD, value.password.as_str())
                .put_string(Self::KEY_MOUNTPOINT, value.mountpoint.as_str())
                .put_string(Self::KEY_STR, value.str2.as_str()),
        )
    }

    fn read_endpoint(store: &dyn PreferenceStore) -> StreamEndpoint {
        StreamEndpoint::NtripCli(NtripEndpoint::new(
            &store.get_string_or(Self::KEY_USER, ""),
            &store.get_string_or(Self::KEY_PASSWORD, ""),
            &store.get_string_or(Self::KEY_HOST, ""),
            &store.get_string_or(Self::KEY_PORT, ""),
            &store.get_string_or(Self::KEY_MOUNTPOINT, ""),
            &store.get_string_or(Self::KEY_STR, ""),
        ))
    }

    fn raw_path(store: &dyn PreferenceStore) -> String {
        let mut path = format!(
            "{}:{}",
            store.get_string_or(Self::KEY_HOST, ""),
            store.get_string_or(Self::KEY_PORT, "")
        );
        let mountpoint = store.get_string_or(Self::KEY_MOUNTPOINT, "");
        if !mountpoint.is_empty() {
            path.push('/');
            path.push_str(&mountpoint);
        }
        path
    }
}
