// Stream Commands
// Path encoding, decoding and summaries for the invoke API

use std::collections::BTreeMap;
use crate::models::{StreamEndpoint, StreamRole, StreamType};
use crate::services::{
    read_role_summary, read_stream_path, PreferenceRepository, StreamPathCodec, StreamPathError,
    KEY_TYPE,
};
use super::parse_role;

fn parse_type(type_name: &str) -> Result<StreamType, String> {
    type_name
        .parse::<StreamType>()
        .map_err(|e| StreamPathError::from(e).to_string())
}

pub fn encode_stream_path(type_name: &str, endpoint: &StreamEndpoint) -> Result<String, String> {
    let stream_type = parse_type(type_name)?;
    StreamPathCodec::encode(stream_type, endpoint).map_err(|e| e.to_string())
}

pub fn decode_stream_path(type_name: &str, path: &str) -> Result<StreamEndpoint, String> {
    StreamPathCodec::decode_named(type_name, path).map_err(|e| e.to_string())
}

/// Summary label for a raw path; unknown type names are shown as-is
pub fn summarize_stream_path(type_name: &str, path: &str) -> String {
    match type_name.parse::<StreamType>() {
        Ok(stream_type) => StreamPathCodec::summarize(stream_type, path),
        Err(_) => format!("{}:{}", type_name.trim().to_lowercase(), path),
    }
}

/// Engine path of the transport a role has selected, whether or not it is enabled
pub fn get_stream_path(repo: &dyn PreferenceRepository, role: &str) -> Result<String, String> {
    let role = parse_role(role)?;
    let store = repo.open(role.store_name()).map_err(|e| e.to_string())?;
    let type_name = store
        .get_string(KEY_TYPE)
        .ok_or_else(|| format!("Stream '{role}' has no type configured"))?;
    let stream_type = parse_type(&type_name)?;
    read_stream_path(stream_type, store.as_ref()).map_err(|e| e.to_string())
}

pub fn get_stream_summary(repo: &dyn PreferenceRepository, role: &str) -> Result<String, String> {
    let role = parse_role(role)?;
    read_role_summary(repo, role).map_err(|e| e.to_string())
}

/// Summaries of every role keyed by store name
pub fn get_all_summaries(repo: &dyn PreferenceRepository) -> Result<BTreeMap<String, String>, String> {
    let mut summaries = BTreeMap::new();
    for role in StreamRole::ALL {
        let summary = read_role_summary(repo, role).map_err(|e| e.to_string())?;
        summaries.insert(role.store_name().to_string(), summary);
    }
    Ok(summaries)
}
