//! Data-center fixture builder.

use std::collections::BTreeMap;

use cmdb_core::{props, EntityId, Properties, Value};
use cmdb_session::Cmdb;

use crate::StepClock;

const LOCATED_IN: &str = "LOCATED_IN";

/// Builds a room of rows, racks, units, and devices through the audited
/// facade. Entities are addressed by name afterwards.
///
/// Panics on any rejected mutation; it is only meant for tests.
pub struct DataCenter {
    cmdb: Cmdb,
    ids: BTreeMap<String, EntityId>,
}

impl DataCenter {
    /// Empty in-memory instance stamped by a step clock.
    pub fn new() -> Self {
        Self::with_cmdb(Cmdb::in_memory().with_clock(StepClock::new()))
    }

    pub fn with_cmdb(cmdb: Cmdb) -> Self {
        Self {
            cmdb,
            ids: BTreeMap::new(),
        }
    }

    /// Add a room. `orientation` is stored verbatim when given.
    pub fn room(mut self, name: &str, orientation: Option<&str>) -> Self {
        let mut properties = props! { "name" => name };
        if let Some(orientation) = orientation {
            properties.insert("orientation".into(), Value::from(orientation));
        }
        self.add("Room", name, properties, None);
        self
    }

    /// Add a row located in a room.
    pub fn row(mut self, room: &str, name: &str, row_number: i64, orientation: Option<&str>) -> Self {
        let mut properties = props! { "name" => name, "row_number" => row_number };
        if let Some(orientation) = orientation {
            properties.insert("orientation".into(), Value::from(orientation));
        }
        self.add("Row", name, properties, Some(("Room", room)));
        self
    }

    /// Add a rack located in a row.
    pub fn rack(mut self, row: &str, name: &str, rack_number: i64, height: i64) -> Self {
        let properties = props! {
            "name" => name,
            "rack_number" => rack_number,
            "height" => height,
        };
        self.add("Rack", name, properties, Some(("Row", row)));
        self
    }

    /// Add a unit to a rack, addressed afterwards as `"<rack>/U<number>"`.
    pub fn unit(mut self, rack: &str, number: i64, status: &str) -> Self {
        let key = Self::unit_key(rack, number);
        let properties = props! { "unit_number" => number, "status" => status };
        self.add("Rack_Unit", &key, properties, Some(("Rack", rack)));
        self
    }

    /// Add a device mounted in a rack unit.
    pub fn device(mut self, rack: &str, unit_number: i64, name: &str) -> Self {
        let unit = Self::unit_key(rack, unit_number);
        self.add("Device", name, props! { "name" => name }, Some(("Rack_Unit", &unit)));
        self
    }

    /// Id of a named entity.
    pub fn id(&self, name: &str) -> EntityId {
        match self.ids.get(name) {
            Some(id) => *id,
            None => panic!("fixture has no entity named {name}"),
        }
    }

    pub fn unit_id(&self, rack: &str, number: i64) -> EntityId {
        self.id(&Self::unit_key(rack, number))
    }

    pub fn cmdb(&self) -> &Cmdb {
        &self.cmdb
    }

    pub fn into_cmdb(self) -> Cmdb {
        self.cmdb
    }

    fn unit_key(rack: &str, number: i64) -> String {
        format!("{rack}/U{number}")
    }

    fn add(&mut self, label: &str, key: &str, properties: Properties, parent: Option<(&str, &str)>) {
        let entity = self
            .cmdb
            .create(label, properties, None)
            .unwrap_or_else(|e| panic!("create {label} {key}: {e}"));

        if let Some((parent_label, parent_name)) = parent {
            let parent_id = self.id(parent_name);
            self.cmdb
                .connect(entity.id, label, LOCATED_IN, parent_id, parent_label, None)
                .unwrap_or_else(|e| panic!("locate {key} in {parent_name}: {e}"));
        }

        self.ids.insert(key.to_string(), entity.id);
    }
}

impl Default for DataCenter {
    fn default() -> Self {
        Self::new()
    }
}
