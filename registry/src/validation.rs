//! Boundary validation of property bags against label metadata.
//!
//! Storage never requires these checks. Entry points that want them call in
//! explicitly; choice validation is additionally applied by the store on
//! every write.

use crate::TypeMetadata;
use cmdb_core::{Properties, Value};
use thiserror::Error;

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A property bag or structural input that does not satisfy its contract.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required properties: {}", .properties.join(", "))]
    MissingRequired {
        label: String,
        properties: Vec<String>,
    },

    #[error("Invalid value {value} for {label}.{property}; allowed: {}", .allowed.join(", "))]
    InvalidChoice {
        label: String,
        property: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("{message}")]
    MissingPrerequisite { message: String },
}

impl ValidationError {
    pub fn missing_required(label: impl Into<String>, properties: Vec<String>) -> Self {
        ValidationError::MissingRequired {
            label: label.into(),
            properties,
        }
    }

    pub fn invalid_choice(
        label: impl Into<String>,
        property: impl Into<String>,
        value: &Value,
        allowed: &[Value],
    ) -> Self {
        ValidationError::InvalidChoice {
            label: label.into(),
            property: property.into(),
            value: value.to_string(),
            allowed: allowed.iter().map(Value::to_string).collect(),
        }
    }

    pub fn missing_prerequisite(message: impl Into<String>) -> Self {
        ValidationError::MissingPrerequisite {
            message: message.into(),
        }
    }
}

/// Check that every required property is supplied.
///
/// Absent, null, and empty-string values all count as missing. Missing
/// names are reported together, sorted.
pub fn validate_required(meta: &TypeMetadata, properties: &Properties) -> ValidationResult<()> {
    let missing: Vec<String> = meta
        .required
        .iter()
        .filter(|name| properties.get(*name).map_or(true, Value::is_blank))
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::missing_required(&meta.label, missing))
    }
}

/// Check every supplied value against its property's declared choices.
pub fn validate_choices(meta: &TypeMetadata, properties: &Properties) -> ValidationResult<()> {
    for (name, value) in properties {
        let Some(def) = meta.get_property(name) else {
            continue;
        };
        if !def.allows(value) {
            let allowed = def.choices.as_deref().unwrap_or_default();
            return Err(ValidationError::invalid_choice(
                &meta.label,
                name,
                value,
                allowed,
            ));
        }
    }
    Ok(())
}
