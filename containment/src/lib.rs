//! Containment views for the CMDB graph engine.
//!
//! Walks "located in" style relationships upward into ancestor chains and
//! downward into orientation-ordered sibling lists (rack elevations, rows
//! of racks, rooms of rows).

mod config;
mod error;
mod node;
mod orientation;
mod resolver;

pub use config::ContainmentConfig;
pub use error::{ContainmentError, ContainmentResult};
pub use node::{
    ContainmentNode, NodeRef, RackLayout, RackSlot, RackSummary, RoomOverview, RowOverview,
};
pub use orientation::{Orientation, SortRule};
pub use resolver::ContainmentResolver;
