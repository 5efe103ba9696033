//! Indexes for efficient graph lookups.

use cmdb_core::{EntityId, RelationshipId};
use std::collections::{HashMap, HashSet};

/// Label index: label -> Set<EntityId>
#[derive(Debug, Default)]
pub struct LabelIndex {
    index: HashMap<String, HashSet<EntityId>>,
}

impl LabelIndex {
    pub fn insert(&mut self, label: &str, entity_id: EntityId) {
        self.index
            .entry(label.to_string())
            .or_default()
            .insert(entity_id);
    }

    pub fn remove(&mut self, label: &str, entity_id: EntityId) {
        if let Some(set) = self.index.get_mut(label) {
            set.remove(&entity_id);
            if set.is_empty() {
                self.index.remove(label);
            }
        }
    }

    pub fn get<'a>(&'a self, label: &str) -> impl Iterator<Item = EntityId> + 'a {
        self.index
            .get(label)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}

type TypedEdges = HashMap<String, HashSet<RelationshipId>>;

/// Adjacency index: EntityId -> { outbound: Map<rel_type, Set<RelationshipId>>, inbound: ... }
#[derive(Debug, Default)]
pub struct AdjacencyIndex {
    /// Relationships where the entity is the source
    outbound: HashMap<EntityId, TypedEdges>,
    /// Relationships where the entity is the target
    inbound: HashMap<EntityId, TypedEdges>,
    /// All relationships involving an entity (either end)
    all: HashMap<EntityId, HashSet<RelationshipId>>,
}

impl AdjacencyIndex {
    pub fn insert(
        &mut self,
        rel_id: RelationshipId,
        rel_type: &str,
        source: EntityId,
        target: EntityId,
    ) {
        self.all.entry(source).or_default().insert(rel_id);
        self.all.entry(target).or_default().insert(rel_id);

        self.outbound
            .entry(source)
            .or_default()
            .entry(rel_type.to_string())
            .or_default()
            .insert(rel_id);
        self.inbound
            .entry(target)
            .or_default()
            .entry(rel_type.to_string())
            .or_default()
            .insert(rel_id);
    }

    pub fn remove(
        &mut self,
        rel_id: RelationshipId,
        rel_type: &str,
        source: EntityId,
        target: EntityId,
    ) {
        for endpoint in [source, target] {
            if let Some(set) = self.all.get_mut(&endpoint) {
                set.remove(&rel_id);
                if set.is_empty() {
                    self.all.remove(&endpoint);
                }
            }
        }

        Self::remove_typed(&mut self.outbound, source, rel_type, rel_id);
        Self::remove_typed(&mut self.inbound, target, rel_type, rel_id);
    }

    fn remove_typed(
        index: &mut HashMap<EntityId, TypedEdges>,
        entity_id: EntityId,
        rel_type: &str,
        rel_id: RelationshipId,
    ) {
        if let Some(type_map) = index.get_mut(&entity_id) {
            if let Some(set) = type_map.get_mut(rel_type) {
                set.remove(&rel_id);
                if set.is_empty() {
                    type_map.remove(rel_type);
                }
            }
            if type_map.is_empty() {
                index.remove(&entity_id);
            }
        }
    }

    /// Get relationships leaving an entity, optionally of one type.
    pub fn edges_from(&self, entity_id: EntityId, rel_type: Option<&str>) -> Vec<RelationshipId> {
        Self::collect_typed(self.outbound.get(&entity_id), rel_type)
    }

    /// Get relationships arriving at an entity, optionally of one type.
    pub fn edges_to(&self, entity_id: EntityId, rel_type: Option<&str>) -> Vec<RelationshipId> {
        Self::collect_typed(self.inbound.get(&entity_id), rel_type)
    }

    fn collect_typed(type_map: Option<&TypedEdges>, rel_type: Option<&str>) -> Vec<RelationshipId> {
        let Some(type_map) = type_map else {
            return Vec::new();
        };
        match rel_type {
            Some(rt) => type_map
                .get(rt)
                .into_iter()
                .flat_map(|set| set.iter().copied())
                .collect(),
            None => type_map
                .values()
                .flat_map(|set| set.iter().copied())
                .collect(),
        }
    }

    /// Get all relationships involving an entity.
    pub fn edges_involving(&self, entity_id: EntityId) -> impl Iterator<Item = RelationshipId> + '_ {
        self.all
            .get(&entity_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}
