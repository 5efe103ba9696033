//! CMDB Session
//!
//! The `Cmdb` facade ties the registry, entity store, audit engine, and
//! containment resolver together. Every mutation made through it is
//! recorded in the audit trail on a best-effort basis.

mod cmdb;
mod config;
mod error;
mod logging;

pub use cmdb::{describe_changes, Cmdb};
pub use config::{AuditConfig, CmdbConfig, CONFIG_FILE_NAME};
pub use error::{CmdbError, CmdbResult};
pub use logging::init_tracing;
