//! In-memory graph storage and the shared entity store.

mod error;
mod graph;
mod index;
mod store;

pub use error::{StoreError, StoreResult};
pub use graph::Graph;
pub use store::{Direction, EntityStore, RelatedRef, Replaced};
