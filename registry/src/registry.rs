//! The TypeRegistry - shared label catalog.

use crate::{LabelHandle, LabelId, TypeMetadata};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Process-wide catalog of labels and their metadata.
///
/// Constructed once (usually via `RegistryBuilder`) and shared behind an
/// `Arc` by every consumer. Registration is visible to all holders
/// immediately; there is no per-request isolation.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    inner: RwLock<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    /// Label ID lookup by name.
    label_ids: HashMap<String, LabelId>,
    /// Metadata by label ID.
    metadata: HashMap<LabelId, TypeMetadata>,
    /// Next label ID to allocate.
    next_id: u32,
}

impl RegistryInner {
    fn insert_label(&mut self, label: &str) -> LabelId {
        if let Some(id) = self.label_ids.get(label) {
            return *id;
        }
        let id = LabelId::new(self.next_id);
        self.next_id += 1;
        self.label_ids.insert(label.to_string(), id);
        self.metadata.insert(id, TypeMetadata::new(label));
        id
    }
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Label Catalog ====================

    /// All labels ever registered, including lazily created ones.
    pub fn known_labels(&self) -> BTreeSet<String> {
        self.inner.read().label_ids.keys().cloned().collect()
    }

    /// Check whether a label has been registered.
    pub fn is_known(&self, label: &str) -> bool {
        self.inner.read().label_ids.contains_key(label)
    }

    /// Get the handle for a label, registering it with empty metadata on first use.
    pub fn get_or_create_label(&self, label: &str) -> LabelHandle {
        if let Some(id) = self.inner.read().label_ids.get(label) {
            return LabelHandle {
                id: *id,
                name: label.to_string(),
            };
        }

        let mut inner = self.inner.write();
        let before = inner.next_id;
        let id = inner.insert_label(label);
        if inner.next_id != before {
            debug!(target: "cmdb::registry", label, id = %id, "Registered label lazily");
        }
        LabelHandle {
            id,
            name: label.to_string(),
        }
    }

    /// Register (or replace) the metadata for a label.
    pub fn register(&self, metadata: TypeMetadata) -> LabelHandle {
        let mut inner = self.inner.write();
        let id = inner.insert_label(&metadata.label);
        let name = metadata.label.clone();
        inner.metadata.insert(id, metadata);
        LabelHandle { id, name }
    }

    // ==================== Metadata Lookups ====================

    /// Get the metadata for a label. Unknown labels yield empty metadata.
    pub fn get_metadata(&self, label: &str) -> TypeMetadata {
        let inner = self.inner.read();
        inner
            .label_ids
            .get(label)
            .and_then(|id| inner.metadata.get(id))
            .cloned()
            .unwrap_or_else(|| TypeMetadata::new(label))
    }

    /// Get the number of registered labels.
    pub fn label_count(&self) -> usize {
        self.inner.read().label_ids.len()
    }
}
