// StreamType Model
// Transport tags understood by the positioning engine

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Transport used by an engine stream.
/// Persisted and exchanged by its upper-case name (e.g. "NTRIPCLI").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreamType {
    #[default]
    None,
    Serial,
    File,
    TcpSvr,
    TcpCli,
    NtripSvr,
    NtripCli,
    Ftp,
    Http,
}

/// A type tag that is not part of the engine's enumeration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown stream type: {0}")]
pub struct UnknownStreamType(pub String);

impl StreamType {
    pub const ALL: [StreamType; 9] = [
        StreamType::None,
        StreamType::Serial,
        StreamType::File,
        StreamType::TcpSvr,
        StreamType::TcpCli,
        StreamType::NtripSvr,
        StreamType::NtripCli,
        StreamType::Ftp,
        StreamType::Http,
    ];

    /// Persisted name of the tag
    pub fn name(&self) -> &'static str {
        match self {
            StreamType::None => "NONE",
            StreamType::Serial => "SERIAL",
            StreamType::File => "FILE",
            StreamType::TcpSvr => "TCPSVR",
            StreamType::TcpCli => "TCPCLI",
            StreamType::NtripSvr => "NTRIPSVR",
            StreamType::NtripCli => "NTRIPCLI",
            StreamType::Ftp => "FTP",
            StreamType::Http => "HTTP",
        }
    }

    /// Lowercase label used as the prefix of stream summaries
    pub fn summary_tag(&self) -> &'static str {
        match self {
            StreamType::File => "file",
            StreamType::NtripCli => "ntrip",
            StreamType::TcpCli => "tcp",
            StreamType::None => "none",
            StreamType::Serial => "serial",
            StreamType::TcpSvr => "tcpsvr",
            StreamType::NtripSvr => "ntripsvr",
            StreamType::Ftp => "ftp",
            StreamType::Http => "http",
        }
    }

    /// Whether the path codec knows how to encode and decode this transport
    pub fn is_codec_supported(&self) -> bool {
        matches!(
            self,
            StreamType::None | StreamType::File | StreamType::NtripCli | StreamType::TcpCli
        )
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StreamType {
    type Err = UnknownStreamType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        StreamType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == trimmed)
            .ok_or_else(|| UnknownStreamType(s.to_string()))
    }
}
