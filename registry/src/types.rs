//! Schema metadata types.

use cmdb_core::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Identifier for a registered label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u32);

impl LabelId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

/// Handle returned by label registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelHandle {
    pub id: LabelId,
    pub name: String,
}

/// Property declaration within a label's metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    /// Property name.
    pub name: String,
    /// Allowed values, in display order. `None` means free-form.
    pub choices: Option<Vec<Value>>,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            choices: None,
        }
    }

    pub fn with_choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut ordered: Vec<Value> = Vec::new();
        for choice in choices {
            let choice = choice.into();
            if !ordered.contains(&choice) {
                ordered.push(choice);
            }
        }
        self.choices = Some(ordered);
        self
    }

    /// Check a value against the declared choices.
    ///
    /// Null is always accepted; a string also matches a non-string choice
    /// whose text form is identical (form input arrives as text).
    pub fn allows(&self, value: &Value) -> bool {
        let Some(choices) = &self.choices else {
            return true;
        };
        if value.is_null() {
            return true;
        }
        choices.iter().any(|choice| {
            choice == value
                || matches!(value, Value::String(s) if *s == choice.to_string())
        })
    }
}

/// Metadata recommended for one label.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeMetadata {
    /// The label this metadata describes.
    pub label: String,
    /// Names of properties that must be supplied.
    pub required: BTreeSet<String>,
    /// Declared properties, in display order.
    pub properties: Vec<PropertyDef>,
}

impl TypeMetadata {
    /// Empty metadata for a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            required: BTreeSet::new(),
            properties: Vec::new(),
        }
    }

    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.insert(name.into());
        self
    }

    pub fn property(mut self, property: PropertyDef) -> Self {
        self.add_property(property);
        self
    }

    /// Add or replace a property declaration, keeping its original position.
    pub fn add_property(&mut self, property: PropertyDef) {
        match self.properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
    }

    /// Get a property declaration by name.
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    /// True when nothing is declared for this label.
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.properties.is_empty()
    }
}
