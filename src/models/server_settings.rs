// RtkServerSettings Model
// Configuration aggregate consumed by the positioning engine

use serde::{Deserialize, Serialize};
use crate::models::{SolutionFormat, StreamFormat, StreamType};

/// Positioning mode of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositioningMode {
    Single,
    Dgps,
    #[default]
    Kinematic,
    Static,
    MovingBase,
    Fixed,
    PppKinematic,
    PppStatic,
    PppFixed,
}

/// Integer ambiguity resolution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityResolution {
    Off,
    #[default]
    Continuous,
    Instantaneous,
    FixAndHold,
}

/// Time system used in solution output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    #[default]
    Gpst,
    Utc,
    Jst,
}

/// Latitude/longitude rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatLonFormat {
    #[default]
    Degrees,
    DegreesMinutesSeconds,
}

fn default_frequencies() -> u8 {
    2
}

fn default_elevation_mask() -> f64 {
    15.0
}

fn default_field_separator() -> String {
    " ".to_string()
}

fn default_output_header() -> bool {
    true
}

/// Processing options handed to the engine as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
    #[serde(default)]
    pub positioning_mode: PositioningMode,
    /// Number of carrier frequencies (1 = L1, 2 = L1+L2, 3 = L1+L2+L5)
    #[serde(default = "default_frequencies")]
    pub frequencies: u8,
    /// Elevation mask in degrees
    #[serde(default = "default_elevation_mask")]
    pub elevation_mask: f64,
    #[serde(default)]
    pub ambiguity_resolution: AmbiguityResolution,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            positioning_mode: PositioningMode::default(),
            frequencies: default_frequencies(),
            elevation_mask: default_elevation_mask(),
            ambiguity_resolution: AmbiguityResolution::default(),
        }
    }
}

/// Solution formatting shared by both solution outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionOptions {
    #[serde(default)]
    pub time_format: TimeFormat,
    #[serde(default)]
    pub lat_lon_format: LatLonFormat,
    #[serde(default = "default_field_separator")]
    pub field_separator: String,
    #[serde(default = "default_output_header")]
    pub output_header: bool,
}

impl Default for SolutionOptions {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::default(),
            lat_lon_format: LatLonFormat::default(),
            field_separator: default_field_separator(),
            output_header: default_output_header(),
        }
    }
}

/// Receiver input stream
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputStream {
    pub stream_type: StreamType,
    pub path: String,
    pub format: StreamFormat,
    pub commands_at_startup: String,
    pub commands_at_shutdown: String,
    pub receiver_option: String,
}

/// Solution output stream
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputStream {
    pub stream_type: StreamType,
    pub path: String,
    pub solution_format: SolutionFormat,
    pub solution_options: SolutionOptions,
}

/// Raw log stream
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStream {
    pub stream_type: StreamType,
    pub path: String,
}

/// Everything the engine needs to start a server session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtkServerSettings {
    pub processing_options: ProcessingOptions,
    pub input_rover: InputStream,
    pub input_base: InputStream,
    pub input_correction: InputStream,
    pub output_solution1: OutputStream,
    pub output_solution2: OutputStream,
    pub log_rover: LogStream,
    pub log_base: LogStream,
    pub log_correction: LogStream,
}

impl RtkServerSettings {
    /// Number of streams the engine will actually open
    pub fn enabled_stream_count(&self) -> usize {
        let types = [
            self.input_rover.stream_type,
            self.input_base.stream_type,
            self.input_correction.stream_type,
            self.output_solution1.stream_type,
            self.output_solution2.stream_type,
            self.log_rover.stream_type,
            self.log_base.stream_type,
            self.log_correction.stream_type,
        ];
        types.iter().filter(|t| **t != StreamType::None).count()
    }
}
