//! CMDB Core Types
//!
//! This crate provides the foundational types used throughout the CMDB engine:
//! - Identity types (EntityId, RelationshipId, AuditEntryId)
//! - Value types (the Value enum and the Properties bag)
//! - Entity structures (Entity, Relationship)
//! - The property-bag codec (decode-or-empty)
//! - Common error types

pub mod codec;
mod entity;
mod error;
mod id;
mod value;

pub use entity::*;
pub use error::*;
pub use id::*;
pub use value::*;
