//! The audited CMDB facade.

use std::collections::BTreeSet;
use std::sync::Arc;

use cmdb_audit::{
    AuditAction, AuditEngine, AuditEntry, AuditEvent, AuditLog, Authorizer, Clock, FileAuditLog,
    MemoryAuditLog, Reverted,
};
use cmdb_containment::{ContainmentNode, ContainmentResolver, RackLayout, RoomOverview};
use cmdb_core::{AuditEntryId, Entity, EntityId, Properties, Relationship};
use cmdb_graph::{EntityStore, Replaced};
use cmdb_registry::{RegistryBuilder, TypeMetadata, TypeRegistry};
use tracing::info;

use crate::config::CmdbConfig;
use crate::error::CmdbResult;
use crate::logging::init_tracing;

/// A CMDB instance: shared store, audit trail, and containment views.
///
/// Mutations commit first and are then recorded. A failing audit log never
/// turns a committed mutation into an error.
pub struct Cmdb {
    config: CmdbConfig,
    store: EntityStore,
    audit: AuditEngine,
    resolver: ContainmentResolver,
}

impl Cmdb {
    /// Build an instance from configuration.
    ///
    /// Installs the global subscriber with `log_filter` unless one is
    /// already set, registers the configured type catalog, and opens the
    /// audit log file when one is configured.
    pub fn open(config: CmdbConfig) -> CmdbResult<Self> {
        init_tracing(&config.log_filter);
        let registry = RegistryBuilder::from_catalog(&config.types)?.build();
        let log: Arc<dyn AuditLog> = match &config.audit.path {
            Some(path) => Arc::new(FileAuditLog::open(path)?),
            None => Arc::new(MemoryAuditLog::new()),
        };
        let cmdb = Self::from_parts(config, registry, log);
        info!(
            target: "cmdb::session",
            labels = cmdb.store.registry().label_count(),
            audit_enabled = cmdb.audit.is_enabled(),
            "Opened CMDB"
        );
        Ok(cmdb)
    }

    /// Default configuration, empty catalog, in-memory audit log.
    pub fn in_memory() -> Self {
        Self::from_parts(
            CmdbConfig::default(),
            TypeRegistry::new(),
            Arc::new(MemoryAuditLog::new()),
        )
    }

    /// Assemble an instance from an already built registry and log.
    pub fn from_parts(config: CmdbConfig, registry: TypeRegistry, log: Arc<dyn AuditLog>) -> Self {
        let store = EntityStore::new(Arc::new(registry));
        let audit = AuditEngine::new(store.clone(), log).with_enabled(config.audit.enabled);
        let resolver = ContainmentResolver::new(store.clone(), config.containment.clone());
        Self {
            config,
            store,
            audit,
            resolver,
        }
    }

    /// Replace the clock stamping audit entries.
    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self {
            audit: self.audit.with_clock(clock),
            ..self
        }
    }

    pub fn config(&self) -> &CmdbConfig {
        &self.config
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn audit(&self) -> &AuditEngine {
        &self.audit
    }

    pub fn resolver(&self) -> &ContainmentResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.store.registry()
    }

    // ==================== Mutations ====================

    /// Create an entity and record it.
    pub fn create(
        &self,
        label: &str,
        properties: Properties,
        user: Option<&str>,
    ) -> CmdbResult<Entity> {
        let entity = self.store.create(label, properties)?;
        self.audit.emit(
            AuditEvent::new(AuditAction::Create, &entity.label, entity.id)
                .name(self.name_of(&entity))
                .user(user)
                .summary(format!("Created {}", entity.label))
                .new_properties(entity.properties.clone()),
        );
        Ok(entity)
    }

    /// Like `create`, but refuses a bag missing any required property.
    pub fn create_validated(
        &self,
        label: &str,
        properties: Properties,
        user: Option<&str>,
    ) -> CmdbResult<Entity> {
        self.store.validate_required(label, &properties)?;
        self.create(label, properties, user)
    }

    /// Replace an entity's property bag and record old and new snapshots.
    pub fn update_properties(
        &self,
        id: EntityId,
        properties: Properties,
        user: Option<&str>,
    ) -> CmdbResult<Entity> {
        let Replaced { previous, entity } = self.store.update_properties(id, properties)?;
        self.audit.emit(
            AuditEvent::new(AuditAction::Update, &entity.label, entity.id)
                .name(self.name_of(&entity))
                .user(user)
                .summary(describe_changes(&previous, &entity.properties))
                .old_properties(previous)
                .new_properties(entity.properties.clone()),
        );
        Ok(entity)
    }

    /// Like `update_properties`, but refuses a bag missing any required
    /// property of the entity's label.
    pub fn update_validated(
        &self,
        id: EntityId,
        properties: Properties,
        user: Option<&str>,
    ) -> CmdbResult<Entity> {
        let current = self.store.require(id)?;
        self.store.validate_required(&current.label, &properties)?;
        self.update_properties(id, properties, user)
    }

    /// Delete an entity and its relationships, recording the last bag.
    pub fn delete(&self, id: EntityId, user: Option<&str>) -> CmdbResult<Entity> {
        let entity = self.store.delete(id)?;
        self.audit.emit(
            AuditEvent::new(AuditAction::Delete, &entity.label, entity.id)
                .name(self.name_of(&entity))
                .user(user)
                .summary(format!("Deleted {}", entity.label))
                .old_properties(entity.properties.clone()),
        );
        Ok(entity)
    }

    /// Create a relationship. The entry is filed under the source entity.
    pub fn connect(
        &self,
        source_id: EntityId,
        source_label: &str,
        rel_type: &str,
        target_id: EntityId,
        target_label: &str,
        user: Option<&str>,
    ) -> CmdbResult<Relationship> {
        let relationship =
            self.store
                .connect(source_id, source_label, rel_type, target_id, target_label)?;
        self.audit.emit(
            AuditEvent::new(AuditAction::Connect, source_label, source_id)
                .name(self.name_by_id(source_id))
                .user(user)
                .summary(format!("Connected {} to {}", rel_type, target_label))
                .relationship(rel_type, target_label, target_id),
        );
        Ok(relationship)
    }

    /// Remove matching relationships. Returns how many were removed.
    pub fn disconnect(
        &self,
        source_id: EntityId,
        source_label: &str,
        rel_type: &str,
        target_id: EntityId,
        target_label: &str,
        user: Option<&str>,
    ) -> CmdbResult<usize> {
        let removed =
            self.store
                .disconnect(source_id, source_label, rel_type, target_id, target_label)?;
        self.audit.emit(
            AuditEvent::new(AuditAction::Disconnect, source_label, source_id)
                .name(self.name_by_id(source_id))
                .user(user)
                .summary(format!("Disconnected {} from {}", rel_type, target_label))
                .relationship(rel_type, target_label, target_id),
        );
        Ok(removed)
    }

    /// Restore the snapshot captured by one audit entry.
    pub fn revert(
        &self,
        entry_id: AuditEntryId,
        user: Option<&str>,
        authorizer: &dyn Authorizer,
    ) -> CmdbResult<Reverted> {
        Ok(self.audit.revert(entry_id, user, authorizer)?)
    }

    // ==================== Reads ====================

    pub fn get(&self, label_hint: Option<&str>, id: EntityId) -> Option<Entity> {
        self.store.get_by_id(label_hint, id)
    }

    pub fn known_labels(&self) -> BTreeSet<String> {
        self.store.registry().known_labels()
    }

    pub fn metadata(&self, label: &str) -> TypeMetadata {
        self.store.registry().get_metadata(label)
    }

    /// History of one entity, newest first, capped by `audit.target_limit`.
    pub fn audit_for(&self, id: EntityId) -> Vec<AuditEntry> {
        self.audit
            .list_for_target(id, self.config.audit.target_limit)
    }

    /// Global history, newest first, capped by `audit.list_limit`.
    pub fn audit_all(&self) -> Vec<AuditEntry> {
        self.audit.list_all(self.config.audit.list_limit)
    }

    pub fn audit_entry(&self, entry_id: AuditEntryId) -> Option<AuditEntry> {
        self.audit.get(entry_id)
    }

    pub fn ancestor_chain(&self, id: EntityId) -> CmdbResult<Vec<ContainmentNode>> {
        Ok(self.resolver.ancestor_chain(id)?)
    }

    pub fn rack_layout(&self, rack_id: EntityId) -> CmdbResult<RackLayout> {
        Ok(self.resolver.rack_layout(rack_id)?)
    }

    pub fn room_overview(&self, room_id: EntityId) -> CmdbResult<RoomOverview> {
        Ok(self.resolver.room_overview(room_id)?)
    }

    fn name_of(&self, entity: &Entity) -> String {
        entity.display_name(&self.config.containment.name_placeholder)
    }

    fn name_by_id(&self, id: EntityId) -> String {
        match self.store.get_by_id(None, id) {
            Some(entity) => self.name_of(&entity),
            None => self.config.containment.name_placeholder.clone(),
        }
    }
}

impl std::fmt::Debug for Cmdb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cmdb")
            .field("entities", &self.store.entity_count())
            .field("relationships", &self.store.relationship_count())
            .field("audit", &self.audit)
            .finish_non_exhaustive()
    }
}

/// Summarise a property replacement by key, e.g.
/// `Changed: status; Added: owner; Removed: notes`.
pub fn describe_changes(old: &Properties, new: &Properties) -> String {
    let changed: Vec<&str> = new
        .iter()
        .filter(|(key, value)| old.get(*key).is_some_and(|prev| prev != *value))
        .map(|(key, _)| key.as_str())
        .collect();
    let added: Vec<&str> = new
        .keys()
        .filter(|key| !old.contains_key(*key))
        .map(String::as_str)
        .collect();
    let removed: Vec<&str> = old
        .keys()
        .filter(|key| !new.contains_key(*key))
        .map(String::as_str)
        .collect();

    let parts: Vec<String> = [("Changed", changed), ("Added", added), ("Removed", removed)]
        .into_iter()
        .filter(|(_, keys)| !keys.is_empty())
        .map(|(heading, keys)| format!("{}: {}", heading, keys.join(", ")))
        .collect();

    if parts.is_empty() {
        "No changes".to_string()
    } else {
        parts.join("; ")
    }
}
