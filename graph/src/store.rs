//! Shared, label-polymorphic entity store.

use crate::{Graph, StoreError, StoreResult};
use cmdb_core::{Entity, EntityId, GraphError, Properties, Relationship, RelationshipId};
use cmdb_registry::{validate_choices, validate_required, TypeRegistry, ValidationError};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Placeholder name for entities without one, in relationship listings.
const UNNAMED: &str = "Unnamed";

/// Traversal direction relative to the starting entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Follow relationships whose source is the starting entity.
    Outgoing,
    /// Follow relationships whose target is the starting entity.
    Incoming,
}

/// The far end of a relationship, as shown in relationship listings.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedRef {
    pub relationship_id: RelationshipId,
    pub label: String,
    pub id: EntityId,
    pub name: String,
}

/// Outcome of a property replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct Replaced {
    /// The bag that was stored before the call.
    pub previous: Properties,
    /// The entity as stored after the call.
    pub entity: Entity,
}

/// Handle to the shared graph.
///
/// Cloning is cheap; all clones see the same data. Each operation holds the
/// graph lock for its whole duration, so it commits atomically. Concurrent
/// writers to the same entity are last-write-wins.
#[derive(Debug, Clone)]
pub struct EntityStore {
    graph: Arc<RwLock<Graph>>,
    registry: Arc<TypeRegistry>,
}

impl EntityStore {
    /// Create an empty store bound to a registry.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            graph: Arc::new(RwLock::new(Graph::new())),
            registry,
        }
    }

    /// The registry this store validates against.
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    // ==================== Mutations ====================

    /// Create an entity, storing the property bag verbatim.
    ///
    /// Undeclared keys are accepted. Values of properties with declared
    /// choices must be among them.
    pub fn create(&self, label: &str, properties: Properties) -> StoreResult<Entity> {
        if label.trim().is_empty() {
            return Err(ValidationError::missing_prerequisite("Label must not be empty").into());
        }
        self.registry.get_or_create_label(label);
        validate_choices(&self.registry.get_metadata(label), &properties)?;

        let mut graph = self.graph.write();
        let entity = graph.create_entity(label, properties).clone();
        debug!(target: "cmdb::store", label, id = %entity.id, "Created entity");
        Ok(entity)
    }

    /// Replace an entity's property bag. Keys not in `properties` are dropped.
    pub fn update_properties(&self, id: EntityId, properties: Properties) -> StoreResult<Replaced> {
        let mut graph = self.graph.write();
        let label = graph
            .get_entity(id)
            .map(|e| e.label.clone())
            .ok_or(StoreError::NotFound(id))?;
        validate_choices(&self.registry.get_metadata(&label), &properties)?;

        let previous = graph.replace_properties(id, properties)?;
        let entity = graph
            .get_entity(id)
            .cloned()
            .ok_or(StoreError::NotFound(id))?;
        debug!(target: "cmdb::store", label = %label, id = %id, "Replaced properties");
        Ok(Replaced { previous, entity })
    }

    /// Delete an entity together with every relationship touching it.
    pub fn delete(&self, id: EntityId) -> StoreResult<Entity> {
        let mut graph = self.graph.write();
        let (entity, removed) = graph.delete_entity(id).map_err(not_found(id))?;
        info!(
            target: "cmdb::store",
            label = %entity.label,
            id = %id,
            relationships = removed.len(),
            "Deleted entity"
        );
        Ok(entity)
    }

    /// Create a directed relationship between two labeled entities.
    pub fn connect(
        &self,
        source_id: EntityId,
        source_label: &str,
        rel_type: &str,
        target_id: EntityId,
        target_label: &str,
    ) -> StoreResult<Relationship> {
        if rel_type.trim().is_empty() {
            return Err(ValidationError::missing_prerequisite("Relationship type is required").into());
        }

        let mut graph = self.graph.write();
        check_endpoint(&graph, source_id, source_label)?;
        check_endpoint(&graph, target_id, target_label)?;

        let relationship = graph
            .create_relationship(rel_type, source_id, target_id)?
            .clone();
        debug!(
            target: "cmdb::store",
            rel_type,
            source = %source_id,
            target = %target_id,
            "Connected"
        );
        Ok(relationship)
    }

    /// Remove every relationship of `rel_type` from source to target.
    ///
    /// Returns the number of instances removed, which may be zero.
    pub fn disconnect(
        &self,
        source_id: EntityId,
        source_label: &str,
        rel_type: &str,
        target_id: EntityId,
        target_label: &str,
    ) -> StoreResult<usize> {
        let mut graph = self.graph.write();
        check_endpoint(&graph, source_id, source_label)?;
        check_endpoint(&graph, target_id, target_label)?;

        let removed = graph.delete_matching(source_id, rel_type, target_id)?;
        debug!(
            target: "cmdb::store",
            rel_type,
            source = %source_id,
            target = %target_id,
            removed = removed.len(),
            "Disconnected"
        );
        Ok(removed.len())
    }

    // ==================== Lookups ====================

    /// Point lookup. A hint that disagrees with the stored label yields `None`.
    pub fn get_by_id(&self, label_hint: Option<&str>, id: EntityId) -> Option<Entity> {
        let graph = self.graph.read();
        graph
            .get_entity(id)
            .filter(|e| label_hint.map_or(true, |hint| e.label == hint))
            .cloned()
    }

    /// Point lookup that reports absence as `StoreError::NotFound`.
    pub fn require(&self, id: EntityId) -> StoreResult<Entity> {
        self.get_by_id(None, id).ok_or(StoreError::NotFound(id))
    }

    /// All entities carrying a label, oldest first.
    pub fn entities_by_label(&self, label: &str) -> Vec<Entity> {
        let graph = self.graph.read();
        let mut entities: Vec<Entity> = graph.entities_by_label(label).cloned().collect();
        entities.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        entities
    }

    /// Check a bag against the required properties of a label.
    pub fn validate_required(&self, label: &str, properties: &Properties) -> StoreResult<()> {
        validate_required(&self.registry.get_metadata(label), properties)?;
        Ok(())
    }

    // ==================== Traversal ====================

    /// One-hop traversal by relationship type and direction.
    ///
    /// Each neighbor appears once even when several relationship instances
    /// lead to it. No particular order.
    pub fn query_related(&self, id: EntityId, rel_type: &str, direction: Direction) -> Vec<Entity> {
        self.traverse(id, rel_type, direction, None)
    }

    /// One-hop traversal narrowed to neighbors with one label.
    pub fn query_related_labeled(
        &self,
        id: EntityId,
        rel_type: &str,
        direction: Direction,
        label: &str,
    ) -> Vec<Entity> {
        self.traverse(id, rel_type, direction, Some(label))
    }

    fn traverse(
        &self,
        id: EntityId,
        rel_type: &str,
        direction: Direction,
        label: Option<&str>,
    ) -> Vec<Entity> {
        let graph = self.graph.read();
        let relationships = match direction {
            Direction::Outgoing => graph.relationships_from(id, Some(rel_type)),
            Direction::Incoming => graph.relationships_to(id, Some(rel_type)),
        };

        let mut seen = HashSet::new();
        relationships
            .into_iter()
            .map(|rel| rel.other_end(id))
            .filter(|other| seen.insert(*other))
            .filter_map(|other| graph.get_entity(other))
            .filter(|e| label.map_or(true, |l| e.label == l))
            .cloned()
            .collect()
    }

    /// Relationships leaving an entity, grouped by type.
    pub fn outgoing_relationships(&self, id: EntityId) -> BTreeMap<String, Vec<RelatedRef>> {
        self.grouped(id, Direction::Outgoing)
    }

    /// Relationships arriving at an entity, grouped by type.
    pub fn incoming_relationships(&self, id: EntityId) -> BTreeMap<String, Vec<RelatedRef>> {
        self.grouped(id, Direction::Incoming)
    }

    fn grouped(&self, id: EntityId, direction: Direction) -> BTreeMap<String, Vec<RelatedRef>> {
        let graph = self.graph.read();
        let relationships = match direction {
            Direction::Outgoing => graph.relationships_from(id, None),
            Direction::Incoming => graph.relationships_to(id, None),
        };

        let mut grouped: BTreeMap<String, Vec<RelatedRef>> = BTreeMap::new();
        for rel in relationships {
            let Some(other) = graph.get_entity(rel.other_end(id)) else {
                continue;
            };
            grouped
                .entry(rel.rel_type.clone())
                .or_default()
                .push(RelatedRef {
                    relationship_id: rel.id,
                    label: other.label.clone(),
                    id: other.id,
                    name: other.display_name(UNNAMED),
                });
        }
        for refs in grouped.values_mut() {
            refs.sort_by(|a, b| {
                (&a.label, &a.name, a.relationship_id).cmp(&(&b.label, &b.name, b.relationship_id))
            });
        }
        grouped
    }

    // ==================== Statistics ====================

    pub fn entity_count(&self) -> usize {
        self.graph.read().entity_count()
    }

    pub fn relationship_count(&self) -> usize {
        self.graph.read().relationship_count()
    }
}

fn check_endpoint(graph: &Graph, id: EntityId, label: &str) -> StoreResult<()> {
    let entity = graph.get_entity(id).ok_or(StoreError::NotFound(id))?;
    if entity.label != label {
        return Err(StoreError::label_mismatch(id, label, entity.label.clone()));
    }
    Ok(())
}

fn not_found(id: EntityId) -> impl FnOnce(GraphError) -> StoreError {
    move |err| match err {
        GraphError::EntityNotFound(_) => StoreError::NotFound(id),
        other => StoreError::Graph(other),
    }
}
