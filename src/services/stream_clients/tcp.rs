// TCP client stream settings

use crate::models::{PreferenceEdits, StreamEndpoint, StreamType, TcpClientValue};
use crate::services::{PreferenceError, PreferenceStore};
use super::StreamClientSettings;

pub struct TcpClientSettings;

impl TcpClientSettings {
    pub const KEY_HOST: &'static str = "stream_tcp_client_host";
    pub const KEY_PORT: &'static str = "stream_tcp_client_port";
}

impl StreamClientSettings for TcpClientSettings {
    const STREAM_TYPE: StreamType = StreamType::TcpCli;

    type Value = TcpClientValue;

    fn set_default_value(store: &dyn PreferenceStore, value: &TcpClientValue) -> Result<(), PreferenceError> {
        store.commit(
            PreferenceEdits::new()
                .put_string(Self::KEY_HOST, value.host.as_str())
                .put_string(Self::KEY_PORT, value.port.to_string()),
        )
    }

    fn read_endpoint(store: &dyn PreferenceStore) -> StreamEndpoint {
        StreamEndpoint::tcp_client(
            store.get_string_or(Self::KEY_HOST, ""),
            store.get_string_or(Self::KEY_PORT, ""),
        )
    }

    fn raw_path(store: &dyn PreferenceStore) -> String {
        format!(
            "{}:{}",
            store.get_string_or(Self::KEY_HOST, ""),
            store.get_string_or(Self::KEY_PORT, "")
        )
    }
}
