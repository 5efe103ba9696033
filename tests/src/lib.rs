//! CMDB integration test support.
//!
//! Provides a data-center fixture builder and deterministic clocks for the
//! tests under `tests/`.

mod clock;
mod fixture;

pub use clock::{FrozenClock, StepClock};
pub use fixture::DataCenter;

pub mod prelude {
    pub use crate::{DataCenter, FrozenClock, StepClock};
    pub use cmdb_audit::{AllowAll, AuditAction, AuditEntry, AuditEvent, RevertError};
    pub use cmdb_containment::{ContainmentError, Orientation};
    pub use cmdb_core::{props, EntityId, Properties, Value};
    pub use cmdb_graph::{Direction, StoreError};
    pub use cmdb_session::{Cmdb, CmdbConfig, CmdbError};
}
