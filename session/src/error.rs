//! Session error types.

use cmdb_audit::{AuditError, RevertError};
use cmdb_containment::ContainmentError;
use cmdb_graph::StoreError;
use cmdb_registry::RegistryError;
use thiserror::Error;

/// Errors surfaced by the `Cmdb` facade.
#[derive(Debug, Error)]
pub enum CmdbError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Opening the audit log failed.
    #[error("audit log error: {0}")]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Revert(#[from] RevertError),

    #[error(transparent)]
    Containment(#[from] ContainmentError),

    /// Configuration could not be read, parsed, or written.
    #[error("config error: {message}")]
    Config { message: String },
}

impl CmdbError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error reports an absent entity or audit entry.
    pub fn is_not_found(&self) -> bool {
        match self {
            CmdbError::Store(e) => e.is_not_found(),
            CmdbError::Revert(RevertError::EntryNotFound(_))
            | CmdbError::Revert(RevertError::TargetNotFound { .. })
            | CmdbError::Containment(ContainmentError::NotFound { .. }) => true,
            _ => false,
        }
    }
}

/// Result type for facade operations.
pub type CmdbResult<T> = Result<T, CmdbError>;
