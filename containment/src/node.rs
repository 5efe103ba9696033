//! Resolver output types. Built per call, never stored.

use crate::Orientation;
use cmdb_core::{Entity, EntityId};
use serde::Serialize;

/// One entity placed in a containment view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainmentNode {
    pub label: String,
    pub id: EntityId,
    pub name: String,
    /// Hops from the entity the view was resolved from.
    pub depth: usize,
    /// Numeric position among siblings; 0 when unset.
    pub ordering_key: i64,
}

impl ContainmentNode {
    pub(crate) fn from_entity(
        entity: &Entity,
        placeholder: &str,
        depth: usize,
        position_property: &str,
    ) -> Self {
        Self {
            label: entity.label.clone(),
            id: entity.id,
            name: entity.display_name(placeholder),
            depth,
            ordering_key: entity.position(position_property).unwrap_or(0),
        }
    }
}

/// An entity referenced from a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRef {
    pub label: String,
    pub id: EntityId,
    pub name: String,
}

/// One unit position of a rack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RackSlot {
    pub number: i64,
    /// The unit's status, or "empty" when no unit sits at this position.
    pub status: String,
    pub unit_id: Option<EntityId>,
    pub device: Option<NodeRef>,
}

impl RackSlot {
    pub fn is_empty(&self) -> bool {
        self.unit_id.is_none()
    }
}

/// Elevation view of one rack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RackLayout {
    pub rack: ContainmentNode,
    /// Containers of the rack, closest first.
    pub location_chain: Vec<ContainmentNode>,
    pub height: i64,
    /// Exactly `height` slots, numbered from `height` down to 1.
    pub units: Vec<RackSlot>,
}

/// A rack as listed inside a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RackSummary {
    pub node: ContainmentNode,
    /// Declared height, 0 when unset.
    pub height: i64,
    /// Position within the row, 0 when unset.
    pub rack_number: i64,
}

/// A row with its racks in the row's own order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOverview {
    pub node: ContainmentNode,
    pub description: String,
    pub row_number: i64,
    pub orientation: Orientation,
    pub racks: Vec<RackSummary>,
}

/// A room with its rows in the room's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomOverview {
    pub room: ContainmentNode,
    pub orientation: Orientation,
    pub rows: Vec<RowOverview>,
}
