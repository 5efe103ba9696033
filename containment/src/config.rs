//! Names the resolver walks by.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relationship, label, and property names used by the resolver.
///
/// Deserializes from the `[containment]` section of the configuration file;
/// every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainmentConfig {
    /// Relationship pointing from contained to container.
    pub relation: String,
    pub unit_label: String,
    pub device_label: String,
    pub room_label: String,
    pub row_label: String,
    pub rack_label: String,
    pub height_property: String,
    pub unit_number_property: String,
    pub orientation_property: String,
    pub description_property: String,
    pub status_property: String,
    /// Display name for entities without one.
    pub name_placeholder: String,
    /// Numeric position property per child label.
    pub position_properties: BTreeMap<String, String>,
    /// Position property for labels not listed above.
    pub default_position_property: String,
}

impl Default for ContainmentConfig {
    fn default() -> Self {
        Self {
            relation: "LOCATED_IN".to_string(),
            unit_label: "Rack_Unit".to_string(),
            device_label: "Device".to_string(),
            room_label: "Room".to_string(),
            row_label: "Row".to_string(),
            rack_label: "Rack".to_string(),
            height_property: "height".to_string(),
            unit_number_property: "unit_number".to_string(),
            orientation_property: "orientation".to_string(),
            description_property: "description".to_string(),
            status_property: "status".to_string(),
            name_placeholder: "Unnamed".to_string(),
            position_properties: BTreeMap::from([
                ("Rack".to_string(), "rack_number".to_string()),
                ("Row".to_string(), "row_number".to_string()),
            ]),
            default_position_property: "position".to_string(),
        }
    }
}

impl ContainmentConfig {
    /// Position property for children with this label.
    pub fn position_property(&self, label: &str) -> &str {
        self.position_properties
            .get(label)
            .map(String::as_str)
            .unwrap_or(&self.default_position_property)
    }

    /// Placeholder name for one label, e.g. "Unnamed Rack".
    pub fn placeholder_for(&self, label: &str) -> String {
        format!("{} {}", self.name_placeholder, label)
    }
}
