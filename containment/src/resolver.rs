//! Walks containment relationships and assembles ordered views.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use cmdb_core::{Entity, EntityId};
use cmdb_graph::{Direction, EntityStore};
use tracing::{debug, warn};

use crate::node::{
    ContainmentNode, NodeRef, RackLayout, RackSlot, RackSummary, RoomOverview, RowOverview,
};
use crate::{ContainmentConfig, ContainmentError, ContainmentResult, Orientation, SortRule};

const EMPTY_SLOT: &str = "empty";
const UNKNOWN_STATUS: &str = "unknown";
const NO_DESCRIPTION: &str = "No description";

/// Read-side resolver over the entity store.
///
/// Every call reads through the store, so results reflect whatever is
/// committed at the time of each lookup.
#[derive(Debug, Clone)]
pub struct ContainmentResolver {
    store: EntityStore,
    config: ContainmentConfig,
}

impl ContainmentResolver {
    pub fn new(store: EntityStore, config: ContainmentConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ContainmentConfig {
        &self.config
    }

    // ==================== Ancestors ====================

    /// All containers of an entity, closest first.
    ///
    /// Walks the containment relation upward without a depth limit. An
    /// entity held by several containers contributes all of them at their
    /// shortest distance. A container reached again from a deeper level
    /// ends that branch with a warning.
    pub fn ancestor_chain(&self, entity_id: EntityId) -> ContainmentResult<Vec<ContainmentNode>> {
        if self.store.get_by_id(None, entity_id).is_none() {
            return Err(ContainmentError::not_found("Entity", entity_id));
        }

        let mut visited: HashSet<EntityId> = HashSet::from([entity_id]);
        let mut frontier = vec![entity_id];
        let mut chain = Vec::new();
        let mut depth = 0;

        while !frontier.is_empty() {
            depth += 1;
            let mut level: Vec<ContainmentNode> = Vec::new();
            let mut reached: HashSet<EntityId> = HashSet::new();
            for id in frontier {
                for container in self
                    .store
                    .query_related(id, &self.config.relation, Direction::Outgoing)
                {
                    if reached.contains(&container.id) {
                        continue;
                    }
                    if !visited.insert(container.id) {
                        warn!(
                            target: "cmdb::containment",
                            from = %id,
                            container = %container.id,
                            "Container already visited, not following it again"
                        );
                        continue;
                    }
                    reached.insert(container.id);
                    level.push(self.node(&container, &self.config.name_placeholder, depth));
                }
            }
            level.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            frontier = level.iter().map(|n| n.id).collect();
            chain.extend(level);
        }

        Ok(chain)
    }

    // ==================== Racks ====================

    /// Unit-by-unit elevation of a rack.
    ///
    /// Fails when the rack has no usable height; no slots are guessed.
    pub fn rack_layout(&self, rack_id: EntityId) -> ContainmentResult<RackLayout> {
        let cfg = &self.config;
        let rack = self.require(&cfg.rack_label, rack_id)?;

        let height = rack
            .position(&cfg.height_property)
            .filter(|h| *h > 0)
            .ok_or(ContainmentError::MissingHeight { id: rack_id })?;

        let location_chain = self.ancestor_chain(rack_id)?;

        let mut units = self.store.query_related_labeled(
            rack_id,
            &cfg.relation,
            Direction::Incoming,
            &cfg.unit_label,
        );
        units.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let mut by_number: BTreeMap<i64, Entity> = BTreeMap::new();
        for unit in units {
            match unit.position(&cfg.unit_number_property) {
                Some(n) if (1..=height).contains(&n) => {
                    by_number.entry(n).or_insert(unit);
                }
                other => debug!(
                    target: "cmdb::containment",
                    rack = %rack_id,
                    unit = %unit.id,
                    number = ?other,
                    "Unit outside rack height, ignoring"
                ),
            }
        }

        let slots = (1..=height)
            .rev()
            .map(|number| match by_number.get(&number) {
                Some(unit) => RackSlot {
                    number,
                    status: unit
                        .str_property_or(&cfg.status_property, UNKNOWN_STATUS)
                        .to_string(),
                    unit_id: Some(unit.id),
                    device: self.device_in(unit.id),
                },
                None => RackSlot {
                    number,
                    status: EMPTY_SLOT.to_string(),
                    unit_id: None,
                    device: None,
                },
            })
            .collect();

        Ok(RackLayout {
            rack: self.node(&rack, &cfg.name_placeholder, 0),
            location_chain,
            height,
            units: slots,
        })
    }

    fn device_in(&self, unit_id: EntityId) -> Option<NodeRef> {
        let cfg = &self.config;
        let mut devices = self.store.query_related_labeled(
            unit_id,
            &cfg.relation,
            Direction::Incoming,
            &cfg.device_label,
        );
        devices.sort_by(|a, b| {
            a.display_name(&cfg.name_placeholder)
                .cmp(&b.display_name(&cfg.name_placeholder))
                .then(a.id.cmp(&b.id))
        });
        devices.first().map(|d| NodeRef {
            label: d.label.clone(),
            id: d.id,
            name: d.display_name(&cfg.name_placeholder),
        })
    }

    /// Racks in a row, alphabetically by name.
    pub fn row_racks(&self, row_id: EntityId) -> ContainmentResult<Vec<RackSummary>> {
        self.require(&self.config.row_label, row_id)?;
        self.racks_in(row_id, Orientation::Unspecified)
    }

    // ==================== Ordered Children ====================

    /// Immediate children of a container, ordered by orientation.
    ///
    /// Children are the entities related to the container through
    /// `child_relation` pointing at it.
    pub fn ordered_children(
        &self,
        container_id: EntityId,
        child_relation: &str,
        orientation: Orientation,
    ) -> ContainmentResult<Vec<ContainmentNode>> {
        if self.store.get_by_id(None, container_id).is_none() {
            return Err(ContainmentError::not_found("Container", container_id));
        }
        let children = self
            .store
            .query_related(container_id, child_relation, Direction::Incoming);
        Ok(self.sorted_nodes(&children, orientation, &self.config.name_placeholder))
    }

    fn sorted_nodes(
        &self,
        children: &[Entity],
        orientation: Orientation,
        placeholder: &str,
    ) -> Vec<ContainmentNode> {
        let mut nodes: Vec<ContainmentNode> = children
            .iter()
            .map(|child| self.node(child, placeholder, 1))
            .collect();
        nodes.sort_by(|a, b| compare(a, b, orientation.sort_rule()));
        nodes
    }

    fn node(&self, entity: &Entity, placeholder: &str, depth: usize) -> ContainmentNode {
        ContainmentNode::from_entity(
            entity,
            placeholder,
            depth,
            self.config.position_property(&entity.label),
        )
    }

    // ==================== Rooms ====================

    /// Rows of a room in the room's orientation, each with its racks in the
    /// row's own orientation.
    pub fn room_overview(&self, room_id: EntityId) -> ContainmentResult<RoomOverview> {
        let cfg = &self.config;
        let room = self.require(&cfg.room_label, room_id)?;
        let orientation = Orientation::from_property(room.get_property(&cfg.orientation_property));

        let rows = self.store.query_related_labeled(
            room_id,
            &cfg.relation,
            Direction::Incoming,
            &cfg.row_label,
        );
        let row_placeholder = cfg.placeholder_for(&cfg.row_label);

        let mut overview_rows = Vec::with_capacity(rows.len());
        for node in self.sorted_nodes(&rows, orientation, &row_placeholder) {
            let Some(row) = rows.iter().find(|r| r.id == node.id) else {
                continue;
            };
            let row_orientation =
                Orientation::from_property(row.get_property(&cfg.orientation_property));
            overview_rows.push(RowOverview {
                description: row
                    .get_property(&cfg.description_property)
                    .filter(|v| !v.is_blank())
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                row_number: node.ordering_key,
                orientation: row_orientation,
                racks: self.racks_in(row.id, row_orientation)?,
                node,
            });
        }

        Ok(RoomOverview {
            room: self.node(&room, &cfg.name_placeholder, 0),
            orientation,
            rows: overview_rows,
        })
    }

    fn racks_in(
        &self,
        row_id: EntityId,
        orientation: Orientation,
    ) -> ContainmentResult<Vec<RackSummary>> {
        let cfg = &self.config;
        let racks = self.store.query_related_labeled(
            row_id,
            &cfg.relation,
            Direction::Incoming,
            &cfg.rack_label,
        );
        let placeholder = cfg.placeholder_for(&cfg.rack_label);

        Ok(self
            .sorted_nodes(&racks, orientation, &placeholder)
            .into_iter()
            .map(|node| {
                let height = racks
                    .iter()
                    .find(|r| r.id == node.id)
                    .and_then(|r| r.position(&cfg.height_property))
                    .unwrap_or(0);
                RackSummary {
                    rack_number: node.ordering_key,
                    height,
                    node,
                }
            })
            .collect())
    }

    fn require(&self, label: &str, id: EntityId) -> ContainmentResult<Entity> {
        self.store
            .get_by_id(Some(label), id)
            .ok_or_else(|| ContainmentError::not_found(label, id))
    }
}

fn compare(a: &ContainmentNode, b: &ContainmentNode, rule: SortRule) -> Ordering {
    let by_name = || a.name.cmp(&b.name).then(a.id.cmp(&b.id));
    match rule {
        SortRule::PositionAscending => a.ordering_key.cmp(&b.ordering_key).then_with(by_name),
        SortRule::PositionDescending => b.ordering_key.cmp(&a.ordering_key).then_with(by_name),
        SortRule::Alphabetical => by_name(),
    }
}
