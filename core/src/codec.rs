//! Property-bag encoding.
//!
//! Property bags cross storage and wire boundaries as JSON object strings.
//! Decoding never fails: malformed input is logged and replaced by an empty
//! bag.

use crate::{Properties, Value};
use tracing::warn;

/// Encode a property bag as a JSON object string.
pub fn encode_properties(properties: &Properties) -> String {
    let json = serde_json::Value::from(Value::Map(properties.clone()));
    json.to_string()
}

/// Decode a JSON object string into a property bag, or an empty bag on failure.
pub fn decode_properties(encoded: &str) -> Properties {
    match try_decode_properties(encoded) {
        Ok(properties) => properties,
        Err(message) => {
            warn!(target: "cmdb::codec", error = %message, "Malformed property data, using empty map");
            Properties::new()
        }
    }
}

/// Decode an optional encoded bag. `None` and the empty string stay `None`.
pub fn decode_optional(encoded: Option<&str>) -> Option<Properties> {
    match encoded {
        Some(s) if !s.trim().is_empty() => Some(decode_properties(s)),
        _ => None,
    }
}

fn try_decode_properties(encoded: &str) -> Result<Properties, String> {
    let json: serde_json::Value = serde_json::from_str(encoded).map_err(|e| e.to_string())?;
    match Value::from(json) {
        Value::Map(map) => Ok(map),
        other => Err(format!("expected an object, got {}", other.type_name())),
    }
}
