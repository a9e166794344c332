// StreamEndpoint Model
// Structured form of the path string handed to the positioning engine

use serde::{Deserialize, Serialize};
use crate::models::StreamType;

/// NTRIP caster locator
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NtripEndpoint {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub host: String,
    pub port: String,
    #[serde(default)]
    pub mountpoint: Option<String>,
    #[serde(default)]
    pub str2: Option<String>,
}

impl NtripEndpoint {
    /// Build an endpoint from plain preference strings.
    /// Empty optional fields become `None`.
    pub fn new(
        user: &str,
        password: &str,
        host: &str,
        port: &str,
        mountpoint: &str,
        str2: &str,
    ) -> Self {
        Self {
            user: non_empty(user),
            password: non_empty(password),
            host: host.to_string(),
            port: port.to_string(),
            mountpoint: non_empty(mountpoint),
            str2: non_empty(str2),
        }
    }

    /// Collapse `Some("")` into `None` so empty and absent compare equal
    pub fn normalized(self) -> Self {
        Self {
            user: self.user.filter(|s| !s.is_empty()),
            password: self.password.filter(|s| !s.is_empty()),
            host: self.host,
            port: self.port,
            mountpoint: self.mountpoint.filter(|s| !s.is_empty()),
            str2: self.str2.filter(|s| !s.is_empty()),
        }
    }
}

/// A stream endpoint keyed by its transport
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum StreamEndpoint {
    #[default]
    None,
    File {
        path: String,
    },
    #[serde(rename = "NTRIPCLI")]
    NtripCli(NtripEndpoint),
    #[serde(rename = "TCPCLI")]
    TcpCli {
        host: String,
        port: String,
    },
}

impl StreamEndpoint {
    pub fn file(path: impl Into<String>) -> Self {
        StreamEndpoint::File { path: path.into() }
    }

    pub fn tcp_client(host: impl Into<String>, port: impl Into<String>) -> Self {
        StreamEndpoint::TcpCli {
            host: host.into(),
            port: port.into(),
        }
    }

    /// Transport tag matching this endpoint
    pub fn stream_type(&self) -> StreamType {
        match self {
            StreamEndpoint::None => StreamType::None,
            StreamEndpoint::File { .. } => StreamType::File,
            StreamEndpoint::NtripCli(_) => StreamType::NtripCli,
            StreamEndpoint::TcpCli { .. } => StreamType::TcpCli,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
