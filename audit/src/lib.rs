//! Audit trail for the CMDB graph engine.
//!
//! - `AuditEntry` / `AuditRecord`: the in-memory and storage forms of an entry
//! - `AuditLog`: append-only sinks (memory, JSON lines on disk)
//! - `AuditEngine`: best-effort emission, newest-first listing, single-step revert

mod engine;
mod entry;
mod error;
mod log;

pub use engine::{
    AllowAll, AuditEngine, Authorizer, Clock, Reverted, SystemClock, AUDIT_LABEL,
    DEFAULT_LIST_LIMIT, DEFAULT_TARGET_LIMIT, REVERT_SUMMARY,
};
pub use entry::{AuditAction, AuditEntry, AuditEvent, AuditRecord, Seq, SYSTEM_USER};
pub use error::{AuditError, AuditResult, RevertError, RevertResult};
pub use log::{AuditLog, FileAuditLog, MemoryAuditLog};
