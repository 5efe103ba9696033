//! Engine configuration via `cmdb.toml`.
//!
//! Every section is optional; an empty file yields the defaults.

use std::path::{Path, PathBuf};

use cmdb_audit::{DEFAULT_LIST_LIMIT, DEFAULT_TARGET_LIMIT};
use cmdb_containment::ContainmentConfig;
use cmdb_registry::TypeConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CmdbError, CmdbResult};

/// Config file name looked up by callers that keep a data directory.
pub const CONFIG_FILE_NAME: &str = "cmdb.toml";

/// The `[audit]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Record mutations at all.
    pub enabled: bool,
    /// JSON-lines log file. Absent keeps the log in memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Ceiling for the global listing.
    pub list_limit: usize,
    /// Ceiling for per-entity listings.
    pub target_limit: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            list_limit: DEFAULT_LIST_LIMIT,
            target_limit: DEFAULT_TARGET_LIMIT,
        }
    }
}

/// Engine configuration loaded from `cmdb.toml`.
///
/// # Example
///
/// ```toml
/// log_filter = "cmdb=debug"
///
/// [audit]
/// path = "audit.jsonl"
///
/// [[types]]
/// label = "Rack"
/// required = ["name", "height"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmdbConfig {
    /// Default tracing filter; `RUST_LOG` overrides it.
    pub log_filter: String,
    pub audit: AuditConfig,
    pub containment: ContainmentConfig,
    /// Startup type catalog.
    pub types: Vec<TypeConfig>,
}

impl Default for CmdbConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            audit: AuditConfig::default(),
            containment: ContainmentConfig::default(),
            types: Vec::new(),
        }
    }
}

impl CmdbConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# CMDB engine configuration
#
# Tracing filter used when RUST_LOG is unset.
log_filter = "info"

[audit]
# Record every mutation in the audit trail (default: true)
enabled = true
# JSON-lines file holding the trail. Leave unset to keep it in memory.
# path = "audit.jsonl"
list_limit = 200
target_limit = 100

[containment]
relation = "LOCATED_IN"
unit_label = "Rack_Unit"
device_label = "Device"
room_label = "Room"
row_label = "Row"
rack_label = "Rack"
height_property = "height"
unit_number_property = "unit_number"
orientation_property = "orientation"
description_property = "description"
status_property = "status"
name_placeholder = "Unnamed"
default_position_property = "position"

[containment.position_properties]
Rack = "rack_number"
Row = "row_number"

# Startup type catalog. Labels not listed here are still accepted and
# registered on first use.
#
# [[types]]
# label = "Rack"
# required = ["name", "height"]
#
# [[types.properties]]
# name = "status"
# choices = ["active", "planned", "retired"]
"#
    }

    /// Parse config from TOML text.
    pub fn parse(text: &str) -> CmdbResult<Self> {
        toml::from_str(text).map_err(|e| CmdbError::config(format!("Failed to parse config: {}", e)))
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> CmdbResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CmdbError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            CmdbError::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> CmdbResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                CmdbError::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> CmdbResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CmdbError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            CmdbError::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
