// Stream Settings Model
// Per-role stream defaults and transport sub-field values

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::models::{SolutionFormat, StreamFormat, StreamType};

/// What an engine stream is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Input,
    Output,
    Log,
}

/// Every stream slot of the positioning engine.
/// Each role keeps its settings in its own preference store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamRole {
    InputRover,
    InputBase,
    InputCorrection,
    OutputSolution1,
    OutputSolution2,
    LogRover,
    LogBase,
    LogCorrection,
}

impl StreamRole {
    pub const ALL: [StreamRole; 8] = [
        StreamRole::InputRover,
        StreamRole::InputBase,
        StreamRole::InputCorrection,
        StreamRole::OutputSolution1,
        StreamRole::OutputSolution2,
        StreamRole::LogRover,
        StreamRole::LogBase,
        StreamRole::LogCorrection,
    ];

    /// Name of the preference store holding this role's settings
    pub fn store_name(&self) -> &'static str {
        match self {
            StreamRole::InputRover => "input_rover",
            StreamRole::InputBase => "input_base",
            StreamRole::InputCorrection => "input_correction",
            StreamRole::OutputSolution1 => "output_solution1",
            StreamRole::OutputSolution2 => "output_solution2",
            StreamRole::LogRover => "log_rover",
            StreamRole::LogBase => "log_base",
            StreamRole::LogCorrection => "log_correction",
        }
    }

    pub fn kind(&self) -> StreamKind {
        match self {
            StreamRole::InputRover | StreamRole::InputBase | StreamRole::InputCorrection => {
                StreamKind::Input
            }
            StreamRole::OutputSolution1 | StreamRole::OutputSolution2 => StreamKind::Output,
            StreamRole::LogRover | StreamRole::LogBase | StreamRole::LogCorrection => {
                StreamKind::Log
            }
        }
    }

    pub fn from_store_name(name: &str) -> Option<StreamRole> {
        StreamRole::ALL.iter().copied().find(|r| r.store_name() == name)
    }
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.store_name())
    }
}

/// Rejected transport seed value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid value: {0}")]
pub struct InvalidStreamValue(pub String);

fn validate_host(host: &str) -> Result<(), InvalidStreamValue> {
    if host.trim().is_empty() {
        return Err(InvalidStreamValue("host cannot be empty".to_string()));
    }
    if host.contains([':', '@', '/', '#']) {
        return Err(InvalidStreamValue(format!("host '{host}' contains a path delimiter")));
    }
    Ok(())
}

fn validate_port(port: u32) -> Result<u16, InvalidStreamValue> {
    u16::try_from(port)
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| InvalidStreamValue(format!("port {port} out of range 1-65535")))
}

/// Default sub-fields of the file transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileClientValue {
    pub path: String,
}

impl Default for FileClientValue {
    fn default() -> Self {
        Self {
            path: "stream.log".to_string(),
        }
    }
}

impl FileClientValue {
    pub fn with_path(mut self, path: &str) -> Result<Self, InvalidStreamValue> {
        if path.trim().is_empty() {
            return Err(InvalidStreamValue("file path cannot be empty".to_string()));
        }
        self.path = path.to_string();
        Ok(self)
    }
}

/// Default sub-fields of the NTRIP client transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NtripClientValue {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub mountpoint: String,
    pub str2: String,
}

impl NtripClientValue {
    pub const DEFAULT_HOST: &'static str = "localhost";
    pub const DEFAULT_PORT: u16 = 2101;

    pub fn with_host(mut self, host: &str) -> Result<Self, InvalidStreamValue> {
        validate_host(host)?;
        self.host = host.to_string();
        Ok(self)
    }

    pub fn with_port(mut self, port: u32) -> Result<Self, InvalidStreamValue> {
        self.port = validate_port(port)?;
        Ok(self)
    }

    pub fn with_credentials(mut self, user: &str, password: &str) -> Self {
        self.user = user.to_string();
        self.password = password.to_string();
        self
    }

    pub fn with_mountpoint(mut self, mountpoint: &str) -> Self {
        self.mountpoint = mountpoint.to_string();
        self
    }
}

impl Default for NtripClientValue {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            user: String::new(),
            password: String::new(),
            mountpoint: String::new(),
            str2: String::new(),
        }
    }
}

/// Default sub-fields of the TCP client transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpClientValue {
    pub host: String,
    pub port: u16,
}

impl TcpClientValue {
    pub const DEFAULT_HOST: &'static str = "localhost";
    pub const DEFAULT_PORT: u16 = 1020;

    pub fn with_host(mut self, host: &str) -> Result<Self, InvalidStreamValue> {
        validate_host(host)?;
        self.host = host.to_string();
        Ok(self)
    }

    pub fn with_port(mut self, port: u32) -> Result<Self, InvalidStreamValue> {
        self.port = validate_port(port)?;
        Ok(self)
    }
}

impl Default for TcpClientValue {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
        }
    }
}

/// Seed values for one stream role.
/// Which optional fields are populated depends on `role.kind()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDefaults {
    pub role: StreamRole,
    pub enable: bool,
    pub stream_type: StreamType,
    /// Input streams only
    pub format: Option<StreamFormat>,
    /// Output streams only
    pub solution_format: Option<SolutionFormat>,
    pub commands_at_startup: String,
    pub commands_at_shutdown: String,
    pub receiver_option: String,
    pub file_client: FileClientValue,
    pub ntrip_client: NtripClientValue,
    pub tcp_client: TcpClientValue,
}

impl StreamDefaults {
    /// Factory defaults of a role
    pub fn for_role(role: StreamRole) -> Self {
        let (enable, stream_type) = match role {
            StreamRole::InputRover => (true, StreamType::TcpCli),
            StreamRole::InputBase => (true, StreamType::NtripCli),
            StreamRole::InputCorrection => (false, StreamType::NtripCli),
            StreamRole::OutputSolution1 => (true, StreamType::File),
            StreamRole::OutputSolution2 => (false, StreamType::File),
            StreamRole::LogRover | StreamRole::LogBase | StreamRole::LogCorrection => {
                (false, StreamType::File)
            }
        };

        let format = match role {
            StreamRole::InputRover => Some(StreamFormat::Ubx),
            StreamRole::InputBase | StreamRole::InputCorrection => Some(StreamFormat::Rtcm3),
            _ => None,
        };

        let solution_format = match role {
            StreamRole::OutputSolution1 => Some(SolutionFormat::Llh),
            StreamRole::OutputSolution2 => Some(SolutionFormat::Nmea),
            _ => None,
        };

        let file_path = match role {
            StreamRole::InputRover => "rover.ubx",
            StreamRole::InputBase => "base.rtcm3",
            StreamRole::InputCorrection => "correction.rtcm3",
            StreamRole::OutputSolution1 => "solution1.pos",
            StreamRole::OutputSolution2 => "solution2.nmea",
            StreamRole::LogRover => "rover.log",
            StreamRole::LogBase => "base.log",
            StreamRole::LogCorrection => "correction.log",
        };

        Self {
            role,
            enable,
            stream_type,
            format,
            solution_format,
            commands_at_startup: String::new(),
            commands_at_shutdown: String::new(),
            receiver_option: String::new(),
            file_client: FileClientValue {
                path: file_path.to_string(),
            },
            ntrip_client: NtripClientValue::default(),
            tcp_client: TcpClientValue::default(),
        }
    }

    pub fn with_enabled(mut self, enable: bool) -> Self {
        self.enable = enable;
        self
    }

    pub fn with_type(mut self, stream_type: StreamType) -> Self {
        self.stream_type = stream_type;
        self
    }

    pub fn with_format(mut self, format: StreamFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_solution_format(mut self, format: SolutionFormat) -> Self {
        self.solution_format = Some(format);
        self
    }

    pub fn with_file_client(mut self, value: FileClientValue) -> Self {
        self.file_client = value;
        self
    }

    pub fn with_ntrip_client(mut self, value: NtripClientValue) -> Self {
        self.ntrip_client = value;
        self
    }

    pub fn with_tcp_client(mut self, value: TcpClientValue) -> Self {
        self.tcp_client = value;
        self
    }
}
