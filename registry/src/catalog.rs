//! Serializable type catalog, as declared in configuration files.

use cmdb_core::Value;
use serde::{Deserialize, Serialize};

/// One `[[types]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeConfig {
    pub label: String,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
}

/// One `[[types.properties]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
}
