// Stream Format Models
// Receiver message formats and solution output formats

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Message format of an input stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreamFormat {
    Rtcm2,
    #[default]
    Rtcm3,
    Oem4,
    Oem3,
    Ubx,
    Ss2,
    Cres,
    Stq,
    Gw10,
    Javad,
    Nvs,
    Binex,
    Rt17,
    Lexr,
    Sept,
    Rinex,
    Sp3,
    RnxClk,
    Sbas,
    Nmea,
}

impl StreamFormat {
    pub const ALL: [StreamFormat; 20] = [
        StreamFormat::Rtcm2,
        StreamFormat::Rtcm3,
        StreamFormat::Oem4,
        StreamFormat::Oem3,
        StreamFormat::Ubx,
        StreamFormat::Ss2,
        StreamFormat::Cres,
        StreamFormat::Stq,
        StreamFormat::Gw10,
        StreamFormat::Javad,
        StreamFormat::Nvs,
        StreamFormat::Binex,
        StreamFormat::Rt17,
        StreamFormat::Lexr,
        StreamFormat::Sept,
        StreamFormat::Rinex,
        StreamFormat::Sp3,
        StreamFormat::RnxClk,
        StreamFormat::Sbas,
        StreamFormat::Nmea,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StreamFormat::Rtcm2 => "RTCM2",
            StreamFormat::Rtcm3 => "RTCM3",
            StreamFormat::Oem4 => "OEM4",
            StreamFormat::Oem3 => "OEM3",
            StreamFormat::Ubx => "UBX",
            StreamFormat::Ss2 => "SS2",
            StreamFormat::Cres => "CRES",
            StreamFormat::Stq => "STQ",
            StreamFormat::Gw10 => "GW10",
            StreamFormat::Javad => "JAVAD",
            StreamFormat::Nvs => "NVS",
            StreamFormat::Binex => "BINEX",
            StreamFormat::Rt17 => "RT17",
            StreamFormat::Lexr => "LEXR",
            StreamFormat::Sept => "SEPT",
            StreamFormat::Rinex => "RINEX",
            StreamFormat::Sp3 => "SP3",
            StreamFormat::RnxClk => "RNXCLK",
            StreamFormat::Sbas => "SBAS",
            StreamFormat::Nmea => "NMEA",
        }
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StreamFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StreamFormat::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s.trim())
            .ok_or_else(|| format!("Unknown stream format: {s}"))
    }
}

/// Format of a solution output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SolutionFormat {
    /// Latitude, longitude, height
    Llh,
    /// ECEF x, y, z
    Xyz,
    /// East, north, up baseline
    Enu,
    #[default]
    Nmea,
}

impl SolutionFormat {
    pub const ALL: [SolutionFormat; 4] = [
        SolutionFormat::Llh,
        SolutionFormat::Xyz,
        SolutionFormat::Enu,
        SolutionFormat::Nmea,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SolutionFormat::Llh => "LLH",
            SolutionFormat::Xyz => "XYZ",
            SolutionFormat::Enu => "ENU",
            SolutionFormat::Nmea => "NMEA",
        }
    }
}

impl fmt::Display for SolutionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolutionFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SolutionFormat::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s.trim())
            .ok_or_else(|| format!("Unknown solution format: {s}"))
    }
}
