//! Audit error types.

use cmdb_core::{AuditEntryId, EntityId};
use cmdb_graph::StoreError;
use thiserror::Error;

/// Failures inside the audit log itself.
///
/// These never reach the caller of a mutation: emission absorbs and logs
/// them.
#[derive(Debug, Error)]
pub enum AuditError {
    /// IO error during log operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid entry format.
    #[error("invalid entry format: {message}")]
    InvalidFormat { message: String },
}

impl AuditError {
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}

/// Result type for audit log operations.
pub type AuditResult<T> = Result<T, AuditError>;

/// Reasons a revert was refused. None of them leaves a partial write.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RevertError {
    #[error("Audit entry not found: {0}")]
    EntryNotFound(AuditEntryId),

    #[error("No previous values stored")]
    NoPreviousValues,

    #[error("Missing node information")]
    MissingNodeInfo,

    #[error("Access denied: cannot edit {label}")]
    AccessDenied { label: String },

    #[error("{label} {id} no longer exists")]
    TargetNotFound { label: String, id: EntityId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for revert.
pub type RevertResult<T> = Result<T, RevertError>;
