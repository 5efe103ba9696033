//! Core graph storage implementation.

use crate::index::{AdjacencyIndex, LabelIndex};
use chrono::Utc;
use cmdb_core::{
    Entity, EntityId, GraphError, GraphResult, Properties, Relationship, RelationshipId,
};
use std::collections::HashMap;

/// The in-memory graph storage.
///
/// Not synchronized on its own; `EntityStore` wraps it in a lock so each
/// top-level operation runs as one atomic unit.
#[derive(Debug, Default)]
pub struct Graph {
    /// Entity storage
    entities: HashMap<EntityId, Entity>,
    /// Relationship storage
    relationships: HashMap<RelationshipId, Relationship>,
    /// Label index
    label_index: LabelIndex,
    /// Adjacency index
    adj_index: AdjacencyIndex,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Entity Operations ====================

    /// Create a new entity with the given label and properties.
    pub fn create_entity(&mut self, label: &str, properties: Properties) -> &Entity {
        let id = EntityId::new();
        let entity = Entity::new(id, label, properties);

        self.label_index.insert(label, id);
        self.entities.entry(id).or_insert(entity)
    }

    /// Get an entity by ID.
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Replace an entity's property bag wholesale, returning the previous bag.
    pub fn replace_properties(
        &mut self,
        id: EntityId,
        properties: Properties,
    ) -> GraphResult<Properties> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(GraphError::EntityNotFound(id))?;

        let previous = std::mem::replace(&mut entity.properties, properties);
        entity.updated_at = Utc::now();
        Ok(previous)
    }

    /// Delete an entity and all relationships involving it.
    ///
    /// Returns the removed entity together with the relationships that went
    /// with it.
    pub fn delete_entity(&mut self, id: EntityId) -> GraphResult<(Entity, Vec<Relationship>)> {
        if !self.entities.contains_key(&id) {
            return Err(GraphError::EntityNotFound(id));
        }

        // First, collect all relationships that need to be deleted
        let incident: Vec<RelationshipId> = self.adj_index.edges_involving(id).collect();

        let mut removed = Vec::with_capacity(incident.len());
        for rel_id in incident {
            removed.push(self.delete_relationship(rel_id)?);
        }

        let entity = self
            .entities
            .remove(&id)
            .ok_or(GraphError::EntityNotFound(id))?;
        self.label_index.remove(&entity.label, id);

        Ok((entity, removed))
    }

    // ==================== Relationship Operations ====================

    /// Create a directed relationship. Both endpoints must exist.
    pub fn create_relationship(
        &mut self,
        rel_type: &str,
        source_id: EntityId,
        target_id: EntityId,
    ) -> GraphResult<&Relationship> {
        for endpoint in [source_id, target_id] {
            if !self.entities.contains_key(&endpoint) {
                return Err(GraphError::EntityNotFound(endpoint));
            }
        }

        let id = RelationshipId::new();
        let relationship = Relationship::new(id, rel_type, source_id, target_id);

        self.adj_index.insert(id, rel_type, source_id, target_id);
        Ok(self.relationships.entry(id).or_insert(relationship))
    }

    /// Delete a single relationship instance.
    pub fn delete_relationship(&mut self, id: RelationshipId) -> GraphResult<Relationship> {
        let relationship = self
            .relationships
            .remove(&id)
            .ok_or(GraphError::RelationshipNotFound(id))?;

        self.adj_index.remove(
            id,
            &relationship.rel_type,
            relationship.source_id,
            relationship.target_id,
        );
        Ok(relationship)
    }

    /// Delete every relationship matching a `(source, type, target)` triple.
    pub fn delete_matching(
        &mut self,
        source_id: EntityId,
        rel_type: &str,
        target_id: EntityId,
    ) -> GraphResult<Vec<Relationship>> {
        let matching: Vec<RelationshipId> = self
            .adj_index
            .edges_from(source_id, Some(rel_type))
            .into_iter()
            .filter(|rel_id| {
                self.relationships
                    .get(rel_id)
                    .is_some_and(|rel| rel.matches(source_id, rel_type, target_id))
            })
            .collect();

        matching
            .into_iter()
            .map(|rel_id| self.delete_relationship(rel_id))
            .collect()
    }

    // ==================== Query Operations ====================

    /// Find entities by label.
    pub fn entities_by_label<'a>(&'a self, label: &str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.label_index
            .get(label)
            .filter_map(|id| self.entities.get(&id))
    }

    /// Relationships leaving an entity, optionally of one type.
    pub fn relationships_from(
        &self,
        entity_id: EntityId,
        rel_type: Option<&str>,
    ) -> Vec<&Relationship> {
        self.adj_index
            .edges_from(entity_id, rel_type)
            .into_iter()
            .filter_map(|id| self.relationships.get(&id))
            .collect()
    }

    /// Relationships arriving at an entity, optionally of one type.
    pub fn relationships_to(
        &self,
        entity_id: EntityId,
        rel_type: Option<&str>,
    ) -> Vec<&Relationship> {
        self.adj_index
            .edges_to(entity_id, rel_type)
            .into_iter()
            .filter_map(|id| self.relationships.get(&id))
            .collect()
    }

    // ==================== Statistics ====================

    /// Get the number of entities in the graph.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Get the number of relationships in the graph.
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }
}
