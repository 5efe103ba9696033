//! Entity structures for the CMDB graph.
//!
//! Entities and relationships are the two fundamental records. An entity
//! carries a runtime label instead of a compile-time type.

use crate::codec;
use crate::{EntityId, Properties, RelationshipId, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Property keys consulted, in order, when looking for a display name.
const NAME_KEYS: [&str; 3] = ["name", "Name", "NAME"];

/// An entity in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier for this entity.
    pub id: EntityId,
    /// Runtime type tag (e.g. "Rack", "Device").
    pub label: String,
    /// Property bag, stored verbatim.
    pub properties: Properties,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last property replacement.
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    /// Create a new entity stamped with the current time.
    pub fn new(id: EntityId, label: impl Into<String>, properties: Properties) -> Self {
        let now = Utc::now();
        Self {
            id,
            label: label.into(),
            properties,
            created_at: now,
            updated_at: now,
        }
    }

    /// Get a property value by name.
    pub fn get_property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Get a property value, or `default` when it is absent or null.
    pub fn property_or(&self, name: &str, default: impl Into<Value>) -> Value {
        match self.properties.get(name) {
            Some(value) if !value.is_null() => value.clone(),
            _ => default.into(),
        }
    }

    /// Get a string property, or `default` when it is absent or not a string.
    pub fn str_property_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.properties
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or(default)
    }

    /// Numeric position of a property, coerced like `toInteger`.
    pub fn position(&self, name: &str) -> Option<i64> {
        self.properties.get(name).and_then(Value::as_position)
    }

    /// Human-readable name, falling back to `placeholder`.
    pub fn display_name(&self, placeholder: &str) -> String {
        NAME_KEYS
            .iter()
            .filter_map(|key| self.properties.get(*key))
            .find(|value| !value.is_blank())
            .map(|value| value.to_string())
            .unwrap_or_else(|| placeholder.to_string())
    }

    /// Read a property that should hold structured data.
    ///
    /// A nested map is returned as-is; a string is decoded as an encoded
    /// property bag. Anything else, including a string that fails to decode,
    /// degrades to an empty map.
    pub fn structured_property(&self, name: &str) -> Properties {
        match self.properties.get(name) {
            Some(Value::Map(map)) => map.clone(),
            Some(Value::String(encoded)) => codec::decode_properties(encoded),
            _ => Properties::new(),
        }
    }
}

/// A directed, typed relationship between two entities.
///
/// Relationships carry no properties. Duplicates between the same pair are
/// permitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier for this relationship instance.
    pub id: RelationshipId,
    /// Relationship type (e.g. "LOCATED_IN").
    pub rel_type: String,
    /// Entity the relationship starts at.
    pub source_id: EntityId,
    /// Entity the relationship points to.
    pub target_id: EntityId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Relationship {
    pub fn new(
        id: RelationshipId,
        rel_type: impl Into<String>,
        source_id: EntityId,
        target_id: EntityId,
    ) -> Self {
        Self {
            id,
            rel_type: rel_type.into(),
            source_id,
            target_id,
            created_at: Utc::now(),
        }
    }

    /// Check if this relationship touches a specific entity at either end.
    pub fn involves(&self, entity_id: EntityId) -> bool {
        self.source_id == entity_id || self.target_id == entity_id
    }

    /// Check if this relationship matches a `(source, type, target)` triple.
    pub fn matches(&self, source_id: EntityId, rel_type: &str, target_id: EntityId) -> bool {
        self.source_id == source_id && self.target_id == target_id && self.rel_type == rel_type
    }

    /// The endpoint opposite to `entity_id`.
    pub fn other_end(&self, entity_id: EntityId) -> EntityId {
        if self.source_id == entity_id {
            self.target_id
        } else {
            self.source_id
        }
    }
}
