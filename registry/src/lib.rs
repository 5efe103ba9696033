//! CMDB Registry
//!
//! Runtime catalog of entity labels and their recommended property schema.
//! Unlike a closed schema, the catalog grows lazily: the first use of an
//! unseen label registers it with empty metadata.
//!
//! Validation lives here too, but is only applied at boundaries that opt in.

mod builder;
mod catalog;
mod registry;
mod types;
mod validation;

pub use builder::{RegistryBuilder, RegistryError, TypeBuilder};
pub use catalog::{PropertyConfig, TypeConfig};
pub use registry::TypeRegistry;
pub use types::*;
pub use validation::{validate_choices, validate_required, ValidationError};
