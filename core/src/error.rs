//! Common error types for the CMDB engine.

use crate::{EntityId, RelationshipId};
use thiserror::Error;

/// Errors that can occur during graph operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    /// Entity not found.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Relationship not found.
    #[error("Relationship not found: {0}")]
    RelationshipNotFound(RelationshipId),

    /// Identifier could not be parsed.
    #[error("Invalid id: {0}")]
    InvalidId(String),
}

impl GraphError {
    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId(message.into())
    }
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
