//! Containment error types.

use cmdb_core::EntityId;
use thiserror::Error;

/// Result type for resolver calls.
pub type ContainmentResult<T> = Result<T, ContainmentError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContainmentError {
    #[error("{label} node not found: {id}")]
    NotFound { label: String, id: EntityId },

    #[error("No height defined for this rack")]
    MissingHeight { id: EntityId },
}

impl ContainmentError {
    pub fn not_found(label: impl Into<String>, id: EntityId) -> Self {
        ContainmentError::NotFound {
            label: label.into(),
            id,
        }
    }
}
