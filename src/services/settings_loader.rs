// SettingsLoader Service
// Seeds stream preferences and assembles them into engine settings

use serde::de::DeserializeOwned;
use serde_json::Value;
use crate::models::{
    InputStream, LogStream, OutputStream, PreferenceEdits, RtkServerSettings, SolutionFormat,
    SolutionOptions, StreamDefaults, StreamFormat, StreamKind, StreamRole, StreamType,
};
use crate::services::stream_clients::{
    FileClientSettings, NtripClientSettings, StreamClientSettings, TcpClientSettings,
};
use crate::services::{
    EngineOptionsSettings, PreferenceError, PreferenceRepository, PreferenceStore, StreamPathCodec,
    StreamPathError,
};

pub const KEY_ENABLE: &str = "stream_enable";
pub const KEY_TYPE: &str = "stream_type";
pub const KEY_FORMAT: &str = "stream_format";
pub const KEY_COMMANDS_AT_STARTUP: &str = "stream_commands_at_startup";
pub const KEY_COMMANDS_AT_SHUTDOWN: &str = "stream_commands_at_shutdown";
pub const KEY_RECEIVER_OPTION: &str = "stream_receiver_option";

/// Errors raised while seeding or reading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Preference(#[from] PreferenceError),

    #[error(transparent)]
    StreamPath(#[from] StreamPathError),

    #[error("Preference store '{0}' has not been initialized")]
    NotInitialized(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Read an enum stored under its serde name, falling back to `default`
/// when the key is absent or holds an unknown name.
pub(crate) fn read_enum_or<T: DeserializeOwned>(store: &dyn PreferenceStore, key: &str, default: T) -> T {
    let Some(raw) = store.get_string(key) else {
        return default;
    };

    match serde_json::from_value::<T>(Value::String(raw.clone())) {
        Ok(value) => value,
        Err(_) => {
            log::warn!(
                "Invalid value '{}' for '{}' in store '{}', using default",
                raw,
                key,
                store.name()
            );
            default
        }
    }
}

/// Seed one role's store. Skipped unless `force` is set or the store was never seeded.
/// Returns whether anything was written.
pub fn set_stream_default_values(
    repo: &dyn PreferenceRepository,
    defaults: &StreamDefaults,
    force: bool,
) -> Result<bool, SettingsError> {
    let store = repo.open(defaults.role.store_name())?;

    if !force && store.contains(KEY_ENABLE) {
        return Ok(false);
    }

    let edits = PreferenceEdits::new()
        .put_bool(KEY_ENABLE, defaults.enable)
        .put_string(KEY_TYPE, defaults.stream_type.name());

    let edits = match defaults.role.kind() {
        StreamKind::Input => edits
            .put_string(KEY_FORMAT, defaults.format.unwrap_or_default().name())
            .put_string(KEY_COMMANDS_AT_STARTUP, defaults.commands_at_startup.as_str())
            .put_string(KEY_COMMANDS_AT_SHUTDOWN, defaults.commands_at_shutdown.as_str())
            .put_string(KEY_RECEIVER_OPTION, defaults.receiver_option.as_str()),
        StreamKind::Output => edits.put_string(
            KEY_FORMAT,
            defaults.solution_format.unwrap_or_default().name(),
        ),
        StreamKind::Log => edits,
    };
    store.commit(edits)?;

    FileClientSettings::set_default_value(store.as_ref(), &defaults.file_client)?;
    NtripClientSettings::set_default_value(store.as_ref(), &defaults.ntrip_client)?;
    TcpClientSettings::set_default_value(store.as_ref(), &defaults.tcp_client)?;

    log::info!("Seeded default settings for stream '{}'", defaults.role);
    Ok(true)
}

/// Seed every stream role plus the engine option stores
pub fn set_default_values(repo: &dyn PreferenceRepository, force: bool) -> Result<(), SettingsError> {
    EngineOptionsSettings::set_default_values(repo, force)?;
    for role in StreamRole::ALL {
        set_stream_default_values(repo, &StreamDefaults::for_role(role), force)?;
    }
    Ok(())
}

/// Assemble the engine settings from every store
pub fn load_settings(repo: &dyn PreferenceRepository) -> Result<RtkServerSettings, SettingsError> {
    let processing_options = EngineOptionsSettings::read_processing_options(repo)?;
    let base = EngineOptionsSettings::read_solution_options(repo)?;

    // TODO: forward NMEA GGA from the rover to the base caster once the engine exposes it
    let settings = RtkServerSettings {
        processing_options,
        input_rover: read_input_stream(repo, StreamRole::InputRover)?,
        input_base: read_input_stream(repo, StreamRole::InputBase)?,
        input_correction: read_input_stream(repo, StreamRole::InputCorrection)?,
        output_solution1: read_output_stream(repo, StreamRole::OutputSolution1, &base)?,
        output_solution2: read_output_stream(repo, StreamRole::OutputSolution2, &base)?,
        log_rover: read_log_stream(repo, StreamRole::LogRover)?,
        log_base: read_log_stream(repo, StreamRole::LogBase)?,
        log_correction: read_log_stream(repo, StreamRole::LogCorrection)?,
    };

    log::info!(
        "Loaded engine settings with {} enabled streams",
        settings.enabled_stream_count()
    );
    Ok(settings)
}

fn open_role(
    repo: &dyn PreferenceRepository,
    role: StreamRole,
    expected: StreamKind,
) -> Result<std::sync::Arc<dyn PreferenceStore>, SettingsError> {
    if role.kind() != expected {
        return Err(SettingsError::InvalidValue(format!(
            "stream '{role}' is not an {expected:?} stream"
        )));
    }
    Ok(repo.open(role.store_name())?)
}

/// Type of an enabled stream, or `None` when the stream is switched off
fn read_enabled_type(store: &dyn PreferenceStore) -> Result<Option<StreamType>, SettingsError> {
    if !store.contains(KEY_TYPE) {
        return Err(SettingsError::NotInitialized(store.name().to_string()));
    }

    if !store.get_bool_or(KEY_ENABLE, false) {
        return Ok(None);
    }

    let name = store.get_string_or(KEY_TYPE, "");
    let stream_type = name.parse::<StreamType>().map_err(StreamPathError::from)?;
    Ok(Some(stream_type))
}

pub fn read_input_stream(repo: &dyn PreferenceRepository, role: StreamRole) -> Result<InputStream, SettingsError> {
    let store = open_role(repo, role, StreamKind::Input)?;
    let store = store.as_ref();

    let Some(stream_type) = read_enabled_type(store)? else {
        return Ok(InputStream::default());
    };

    Ok(InputStream {
        stream_type,
        path: read_stream_path(stream_type, store)?,
        format: read_enum_or(store, KEY_FORMAT, StreamFormat::Rtcm3),
        commands_at_startup: store.get_string_or(KEY_COMMANDS_AT_STARTUP, ""),
        commands_at_shutdown: store.get_string_or(KEY_COMMANDS_AT_SHUTDOWN, ""),
        receiver_option: store.get_string_or(KEY_RECEIVER_OPTION, ""),
    })
}

pub fn read_output_stream(
    repo: &dyn PreferenceRepository,
    role: StreamRole,
    base: &SolutionOptions,
) -> Result<OutputStream, SettingsError> {
    let store = open_role(repo, role, StreamKind::Output)?;
    let store = store.as_ref();

    let Some(stream_type) = read_enabled_type(store)? else {
        return Ok(OutputStream {
            solution_options: base.clone(),
            ..OutputStream::default()
        });
    };

    Ok(OutputStream {
        stream_type,
        path: read_stream_path(stream_type, store)?,
        solution_format: read_enum_or(store, KEY_FORMAT, SolutionFormat::Nmea),
        solution_options: base.clone(),
    })
}

pub fn read_log_stream(repo: &dyn PreferenceRepository, role: StreamRole) -> Result<LogStream, SettingsError> {
    let store = open_role(repo, role, StreamKind::Log)?;
    let store = store.as_ref();

    let Some(stream_type) = read_enabled_type(store)? else {
        return Ok(LogStream::default());
    };

    Ok(LogStream {
        stream_type,
        path: read_stream_path(stream_type, store)?,
    })
}

/// Engine path for the transport selected by `stream_type`
pub fn read_stream_path(stream_type: StreamType, store: &dyn PreferenceStore) -> Result<String, SettingsError> {
    let path = match stream_type {
        StreamType::None => String::new(),
        StreamType::File => FileClientSettings::read_path(store)?,
        StreamType::NtripCli => NtripClientSettings::read_path(store)?,
        StreamType::TcpCli => TcpClientSettings::read_path(store)?,
        other => {
            return Err(StreamPathError::UnsupportedStreamType(other.name().to_string()).into());
        }
    };
    Ok(path)
}

/// Summary of the transport selected by `stream_type`. Never fails.
pub fn read_stream_summary(stream_type: StreamType, store: &dyn PreferenceStore) -> String {
    match stream_type {
        StreamType::None => String::new(),
        StreamType::File => FileClientSettings::read_summary(store),
        StreamType::NtripCli => NtripClientSettings::read_summary(store),
        StreamType::TcpCli => TcpClientSettings::read_summary(store),
        other => StreamPathCodec::summarize(other, ""),
    }
}

/// Summary of whatever transport a role currently has selected.
/// An absent type reads as NONE; an unknown tag is shown as-is.
pub fn read_role_summary(repo: &dyn PreferenceRepository, role: StreamRole) -> Result<String, SettingsError> {
    let store = repo.open(role.store_name())?;
    let raw = store.get_string_or(KEY_TYPE, StreamType::None.name());

    match raw.parse::<StreamType>() {
        Ok(stream_type) => Ok(read_stream_summary(stream_type, store.as_ref())),
        Err(e) => {
            log::warn!("Store '{}': {}", store.name(), e);
            Ok(format!("{}:", raw.to_lowercase()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileClientValue, NtripClientValue, TcpClientValue};
    use crate::services::MemoryPreferences;

    fn seeded() -> MemoryPreferences {
        let repo = MemoryPreferences::new();
        set_default_values(&repo, false).unwrap();
        repo
    }

    fn put(repo: &MemoryPreferences, role: StreamRole, edits: PreferenceEdits) {
        repo.open(role.store_name()).unwrap().commit(edits).unwrap();
    }

    #[test]
    fn test_load_factory_defaults() {
        let repo = seeded();
        let settings = load_settings(&repo).unwrap();

        assert_eq!(settings.input_rover.stream_type, StreamType::TcpCli);
        assert_eq!(settings.input_rover.path, "localhost:1020");
        assert_eq!(settings.input_rover.format, StreamFormat::Ubx);

        assert_eq!(settings.input_base.stream_type, StreamType::NtripCli);
        assert_eq!(settings.input_base.path, "localhost:2101");
        assert_eq!(settings.input_base.format, StreamFormat::Rtcm3);

        assert_eq!(settings.input_correction, InputStream::default());

        assert_eq!(settings.output_solution1.stream_type, StreamType::File);
        assert_eq!(settings.output_solution1.path, "solution1.pos");
        assert_eq!(settings.output_solution1.solution_format, SolutionFormat::Llh);
        assert_eq!(settings.output_solution1.solution_options, SolutionOptions::default());

        assert_eq!(settings.output_solution2.stream_type, StreamType::None);
        assert_eq!(settings.output_solution2.path, "");
        assert_eq!(settings.log_rover.stream_type, StreamType::None);
        assert_eq!(settings.enabled_stream_count(), 3);
    }

    #[test]
    fn test_seeding_keeps_user_edits_unless_forced() {
        let repo = seeded();
        put(
            &repo,
            StreamRole::InputRover,
            PreferenceEdits::new().put_string(TcpClientSettings::KEY_HOST, "192.168.1.50"),
        );

        set_default_values(&repo, false).unwrap();
        let rover = read_input_stream(&repo, StreamRole::InputRover).unwrap();
        assert_eq!(rover.path, "192.168.1.50:1020");

        set_default_values(&repo, true).unwrap();
        let rover = read_input_stream(&repo, StreamRole::InputRover).unwrap();
        assert_eq!(rover.path, "localhost:1020");
    }

    #[test]
    fn test_custom_defaults_per_role() {
        let repo = MemoryPreferences::new();
        let defaults = StreamDefaults::for_role(StreamRole::LogRover)
            .with_enabled(true)
            .with_file_client(FileClientValue::default().with_path("/sdcard/RtkGps/rover_raw.ubx").unwrap());
        assert!(set_stream_default_values(&repo, &defaults, false).unwrap());
        assert!(!set_stream_default_values(&repo, &defaults, false).unwrap());

        let log = read_log_stream(&repo, StreamRole::LogRover).unwrap();
        assert_eq!(log.stream_type, StreamType::File);
        assert_eq!(log.path, "/sdcard/RtkGps/rover_raw.ubx");

        let store = repo.open("log_rover").unwrap();
        assert!(!store.contains(KEY_FORMAT));
        assert!(!store.contains(KEY_RECEIVER_OPTION));
    }

    #[test]
    fn test_output_defaults_write_solution_format() {
        let repo = MemoryPreferences::new();
        let defaults = StreamDefaults::for_role(StreamRole::OutputSolution2)
            .with_enabled(true)
            .with_solution_format(SolutionFormat::Enu);
        set_stream_default_values(&repo, &defaults, false).unwrap();

        let out = read_output_stream(&repo, StreamRole::OutputSolution2, &SolutionOptions::default()).unwrap();
        assert_eq!(out.solution_format, SolutionFormat::Enu);
        assert_eq!(out.path, "solution2.nmea");
    }

    #[test]
    fn test_unseeded_store_is_not_initialized() {
        let repo = MemoryPreferences::new();
        let err = read_input_stream(&repo, StreamRole::InputBase).unwrap_err();
        assert!(matches!(err, SettingsError::NotInitialized(ref name) if name == "input_base"));
        assert!(load_settings(&repo).is_err());
    }

    #[test]
    fn test_disabled_stream_skips_type_parsing() {
        let repo = seeded();
        put(
            &repo,
            StreamRole::InputCorrection,
            PreferenceEdits::new()
                .put_bool(KEY_ENABLE, false)
                .put_string(KEY_TYPE, "BOGUS"),
        );
        let stream = read_input_stream(&repo, StreamRole::InputCorrection).unwrap();
        assert_eq!(stream.stream_type, StreamType::None);
        assert_eq!(stream.path, "");
    }

    #[test]
    fn test_unknown_type_is_fatal() {
        let repo = seeded();
        put(&repo, StreamRole::InputBase, PreferenceEdits::new().put_string(KEY_TYPE, "BOGUS"));
        let err = read_input_stream(&repo, StreamRole::InputBase).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::StreamPath(StreamPathError::UnsupportedStreamType(ref name)) if name == "BOGUS"
        ));
    }

    #[test]
    fn test_engine_type_without_codec_is_unsupported() {
        let repo = seeded();
        put(&repo, StreamRole::InputRover, PreferenceEdits::new().put_string(KEY_TYPE, "SERIAL"));
        let err = read_input_stream(&repo, StreamRole::InputRover).unwrap_err();
        assert!(matches!(err, SettingsError::StreamPath(StreamPathError::UnsupportedStreamType(_))));
    }

    #[test]
    fn test_format_falls_back_to_default() {
        let repo = seeded();
        put(&repo, StreamRole::InputBase, PreferenceEdits::new().put_string(KEY_FORMAT, "RTCM9"));
        assert_eq!(read_input_stream(&repo, StreamRole::InputBase).unwrap().format, StreamFormat::Rtcm3);

        put(&repo, StreamRole::InputRover, PreferenceEdits::new().remove(KEY_FORMAT));
        assert_eq!(read_input_stream(&repo, StreamRole::InputRover).unwrap().format, StreamFormat::Rtcm3);

        put(&repo, StreamRole::OutputSolution1, PreferenceEdits::new().remove(KEY_FORMAT));
        let out = read_output_stream(&repo, StreamRole::OutputSolution1, &SolutionOptions::default()).unwrap();
        assert_eq!(out.solution_format, SolutionFormat::Nmea);
    }

    #[test]
    fn test_corrupt_endpoint_surfaces_error() {
        let repo = seeded();
        put(
            &repo,
            StreamRole::InputRover,
            PreferenceEdits::new().put_string(TcpClientSettings::KEY_HOST, ""),
        );
        let err = read_input_stream(&repo, StreamRole::InputRover).unwrap_err();
        assert!(matches!(err, SettingsError::StreamPath(StreamPathError::MalformedEndpoint { .. })));
    }

    #[test]
    fn test_switching_transport() {
        let repo = seeded();
        let ntrip = NtripClientValue::default()
            .with_host("rtk.example.com")
            .unwrap()
            .with_credentials("bob", "pw")
            .with_mountpoint("MOUNT1");
        let store = repo.open(StreamRole::InputCorrection.store_name()).unwrap();
        NtripClientSettings::set_default_value(store.as_ref(), &ntrip).unwrap();
        store.commit(PreferenceEdits::new().put_bool(KEY_ENABLE, true)).unwrap();

        let stream = read_input_stream(&repo, StreamRole::InputCorrection).unwrap();
        assert_eq!(stream.path, "bob:pw@rtk.example.com:2101/MOUNT1");

        store
            .commit(PreferenceEdits::new().put_string(KEY_TYPE, StreamType::TcpCli.name()))
            .unwrap();
        TcpClientSettings::set_default_value(
            store.as_ref(),
            &TcpClientValue::default().with_port(5018).unwrap(),
        )
        .unwrap();
        let stream = read_input_stream(&repo, StreamRole::InputCorrection).unwrap();
        assert_eq!(stream.path, "localhost:5018");
    }

    #[test]
    fn test_wrong_role_kind() {
        let repo = seeded();
        let err = read_log_stream(&repo, StreamRole::InputRover).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue(_)));
    }

    #[test]
    fn test_stream_path_dispatch() {
        let repo = seeded();
        let store = repo.open("input_base").unwrap();
        assert_eq!(read_stream_path(StreamType::None, store.as_ref()).unwrap(), "");
        assert_eq!(read_stream_path(StreamType::File, store.as_ref()).unwrap(), "base.rtcm3");
        assert!(read_stream_path(StreamType::Http, store.as_ref()).is_err());
        assert_eq!(read_stream_summary(StreamType::Http, store.as_ref()), "http:");
    }

    #[test]
    fn test_role_summaries() {
        let repo = seeded();
        assert_eq!(read_role_summary(&repo, StreamRole::InputRover).unwrap(), "tcp:localhost:1020");
        assert_eq!(read_role_summary(&repo, StreamRole::InputBase).unwrap(), "ntrip:localhost:2101");
        assert_eq!(read_role_summary(&repo, StreamRole::LogBase).unwrap(), "file:base.log");

        put(&repo, StreamRole::LogBase, PreferenceEdits::new().put_string(KEY_TYPE, "UDP"));
        assert_eq!(read_role_summary(&repo, StreamRole::LogBase).unwrap(), "udp:");

        let empty = MemoryPreferences::new();
        assert_eq!(read_role_summary(&empty, StreamRole::LogBase).unwrap(), "");
    }
}
