//! Identity types for CMDB records.
//!
//! All identifiers are UUIDs that are:
//! - Unique within their namespace
//! - Immutable once assigned
//! - Opaque to external users

use crate::GraphError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Allocate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the raw value.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = GraphError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(GraphError::invalid_id("id is blank"));
                }
                Uuid::parse_str(trimmed)
                    .map(Self)
                    .map_err(|_| GraphError::invalid_id(format!("malformed id: {}", trimmed)))
            }
        }
    };
}

opaque_id! {
    /// Unique identifier for an entity. Label-independent.
    EntityId
}

opaque_id! {
    /// Unique identifier for a relationship instance.
    RelationshipId
}

opaque_id! {
    /// Unique identifier for an audit entry.
    AuditEntryId
}
