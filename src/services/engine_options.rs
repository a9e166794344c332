// Engine option preferences
// Processing and solution options, one key per field

use serde::Serialize;
use serde_json::Value;
use crate::models::{
    AmbiguityResolution, LatLonFormat, PositioningMode, PreferenceEdits, ProcessingOptions,
    SolutionOptions, TimeFormat,
};
use crate::services::settings_loader::read_enum_or;
use crate::services::{PreferenceRepository, PreferenceStore, SettingsError};

pub const PROCESSING_OPTIONS_STORE: &str = "processing_options";
pub const SOLUTION_OPTIONS_STORE: &str = "solution_options";

/// Serde name of a unit enum variant, e.g. `PositioningMode::PppStatic` -> "ppp_static"
fn enum_name<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(name)) => name,
        _ => String::new(),
    }
}

pub struct EngineOptionsSettings;

impl EngineOptionsSettings {
    pub const KEY_POSITIONING_MODE: &'static str = "processing_positioning_mode";
    pub const KEY_FREQUENCIES: &'static str = "processing_frequencies";
    pub const KEY_ELEVATION_MASK: &'static str = "processing_elevation_mask";
    pub const KEY_AMBIGUITY_RESOLUTION: &'static str = "processing_ambiguity_resolution";

    pub const KEY_TIME_FORMAT: &'static str = "solution_time_format";
    pub const KEY_LAT_LON_FORMAT: &'static str = "solution_lat_lon_format";
    pub const KEY_FIELD_SEPARATOR: &'static str = "solution_field_separator";
    pub const KEY_OUTPUT_HEADER: &'static str = "solution_output_header";

    /// Seed both option stores unless already seeded (or `force` is set)
    pub fn set_default_values(repo: &dyn PreferenceRepository, force: bool) -> Result<(), SettingsError> {
        let processing = repo.open(PROCESSING_OPTIONS_STORE)?;
        if force || !processing.contains(Self::KEY_POSITIONING_MODE) {
            Self::write_processing_options(processing.as_ref(), &ProcessingOptions::default())?;
        }

        let solution = repo.open(SOLUTION_OPTIONS_STORE)?;
        if force || !solution.contains(Self::KEY_TIME_FORMAT) {
            Self::write_solution_options(solution.as_ref(), &SolutionOptions::default())?;
        }
        Ok(())
    }

    pub fn write_processing_options(
        store: &dyn PreferenceStore,
        options: &ProcessingOptions,
    ) -> Result<(), SettingsError> {
        store.commit(
            PreferenceEdits::new()
                .put_string(Self::KEY_POSITIONING_MODE, enum_name(&options.positioning_mode))
                .put_string(Self::KEY_FREQUENCIES, options.frequencies.to_string())
                .put_string(Self::KEY_ELEVATION_MASK, options.elevation_mask.to_string())
                .put_string(Self::KEY_AMBIGUITY_RESOLUTION, enum_name(&options.ambiguity_resolution)),
        )?;
        Ok(())
    }

    pub fn write_solution_options(
        store: &dyn PreferenceStore,
        options: &SolutionOptions,
    ) -> Result<(), SettingsError> {
        store.commit(
            PreferenceEdits::new()
                .put_string(Self::KEY_TIME_FORMAT, enum_name(&options.time_format))
                .put_string(Self::KEY_LAT_LON_FORMAT, enum_name(&options.lat_lon_format))
                .put_string(Self::KEY_FIELD_SEPARATOR, options.field_separator.as_str())
                .put_bool(Self::KEY_OUTPUT_HEADER, options.output_header),
        )?;
        Ok(())
    }

    pub fn read_processing_options(repo: &dyn PreferenceRepository) -> Result<ProcessingOptions, SettingsError> {
        let store = repo.open(PROCESSING_OPTIONS_STORE)?;
        let store = store.as_ref();
        let defaults = ProcessingOptions::default();

        let frequencies = store
            .get_string(Self::KEY_FREQUENCIES)
            .and_then(|raw| raw.trim().parse::<u8>().ok())
            .filter(|f| (1..=3).contains(f))
            .unwrap_or(defaults.frequencies);

        let elevation_mask = store
            .get_string(Self::KEY_ELEVATION_MASK)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|deg| (0.0..=90.0).contains(deg))
            .unwrap_or(defaults.elevation_mask);

        Ok(ProcessingOptions {
            positioning_mode: read_enum_or(store, Self::KEY_POSITIONING_MODE, PositioningMode::default()),
            frequencies,
            elevation_mask,
            ambiguity_resolution: read_enum_or(
                store,
                Self::KEY_AMBIGUITY_RESOLUTION,
                AmbiguityResolution::default(),
            ),
        })
    }

    pub fn read_solution_options(repo: &dyn PreferenceRepository) -> Result<SolutionOptions, SettingsError> {
        let store = repo.open(SOLUTION_OPTIONS_STORE)?;
        let store = store.as_ref();
        let defaults = SolutionOptions::default();

        Ok(SolutionOptions {
            time_format: read_enum_or(store, Self::KEY_TIME_FORMAT, TimeFormat::default()),
            lat_lon_format: read_enum_or(store, Self::KEY_LAT_LON_FORMAT, LatLonFormat::default()),
            field_separator: store.get_string_or(Self::KEY_FIELD_SEPARATOR, &defaults.field_separator),
            output_header: store.get_bool_or(Self::KEY_OUTPUT_HEADER, defaults.output_header),
        })
    }
}
