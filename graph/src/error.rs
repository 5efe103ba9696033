//! Entity store error types.

use cmdb_core::{EntityId, GraphError};
use cmdb_registry::ValidationError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Entity not found: {0}")]
    NotFound(EntityId),

    #[error("Entity {id} is labeled {actual}, not {expected}")]
    LabelMismatch {
        id: EntityId,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl StoreError {
    pub fn label_mismatch(
        id: EntityId,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        StoreError::LabelMismatch {
            id,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// True for every flavor of "entity does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound(_) | StoreError::Graph(GraphError::EntityNotFound(_))
        )
    }
}
