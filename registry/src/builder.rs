//! RegistryBuilder for populating a TypeRegistry at startup.

use crate::{PropertyConfig, PropertyDef, TypeConfig, TypeMetadata, TypeRegistry};
use cmdb_core::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during registry construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),

    #[error("Label must not be empty")]
    EmptyLabel,

    #[error("Choices declared before any property on label: {0}")]
    ChoicesWithoutProperty(String),
}

/// Builder for constructing a populated TypeRegistry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    /// Types being built, by label.
    types: BTreeMap<String, TypeMetadata>,
    /// Declaration order of labels.
    order: Vec<String>,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label definition.
    pub fn add_type(&mut self, label: impl Into<String>) -> TypeBuilder<'_> {
        TypeBuilder {
            builder: self,
            metadata: TypeMetadata::new(label),
            dangling_choices: false,
        }
    }

    /// Check whether a label was already added.
    pub fn contains(&self, label: &str) -> bool {
        self.types.contains_key(label)
    }

    /// Add every label of a parsed type catalog.
    pub fn from_catalog(catalog: &[TypeConfig]) -> Result<Self, RegistryError> {
        let mut builder = Self::new();
        for entry in catalog {
            let mut ty = builder.add_type(entry.label.clone());
            for name in &entry.required {
                ty = ty.required(name.clone());
            }
            for PropertyConfig { name, choices } in &entry.properties {
                ty = ty.property(name.clone());
                if let Some(choices) = choices {
                    ty = ty.choices(choices.iter().cloned());
                }
            }
            ty.done()?;
        }
        Ok(builder)
    }

    /// Build the registry.
    pub fn build(self) -> TypeRegistry {
        let registry = TypeRegistry::new();
        let mut types = self.types;
        for label in self.order {
            if let Some(metadata) = types.remove(&label) {
                registry.register(metadata);
            }
        }
        registry
    }
}

/// Builder for one label's metadata.
pub struct TypeBuilder<'a> {
    builder: &'a mut RegistryBuilder,
    metadata: TypeMetadata,
    dangling_choices: bool,
}

impl<'a> TypeBuilder<'a> {
    /// Mark a property as required.
    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.metadata.required.insert(name.into());
        self
    }

    /// Declare a free-form property.
    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.metadata.add_property(PropertyDef::new(name));
        self
    }

    /// Restrict the most recently declared property to a set of choices.
    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        match self.metadata.properties.pop() {
            Some(last) => self.metadata.properties.push(last.with_choices(choices)),
            None => self.dangling_choices = true,
        }
        self
    }

    /// Finish building this label.
    pub fn done(self) -> Result<(), RegistryError> {
        let label = self.metadata.label.clone();
        if label.trim().is_empty() {
            return Err(RegistryError::EmptyLabel);
        }
        if self.dangling_choices {
            return Err(RegistryError::ChoicesWithoutProperty(label));
        }
        if self.builder.types.contains_key(&label) {
            return Err(RegistryError::DuplicateLabel(label));
        }

        self.builder.order.push(label.clone());
        self.builder.types.insert(label, self.metadata);
        Ok(())
    }
}
