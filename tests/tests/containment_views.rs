//! Containment integration tests: rack elevations, room overviews, and
//! ancestor chains built through the audited facade.

use cmdb_tests::prelude::*;

fn hall() -> DataCenter {
    DataCenter::new()
        .room("Hall A", Some("RightToLeft"))
        .row("Hall A", "Row 1", 1, Some("LeftToRight"))
        .row("Hall A", "Row 2", 2, Some("BottomToTop"))
        .rack("Row 1", "R1-B", 2, 4)
        .rack("Row 1", "R1-A", 1, 4)
        .rack("Row 2", "R2-A", 1, 42)
        .rack("Row 2", "R2-B", 2, 42)
        .unit("R1-A", 3, "active")
        .unit("R1-A", 1, "reserved")
        .device("R1-A", 3, "db-01")
}

mod rack_layout {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_layout_covers_every_unit_top_down() {
        // GIVEN a 4U rack with units 1 and 3 populated
        let dc = hall();

        // WHEN
        let layout = dc.cmdb().rack_layout(dc.id("R1-A")).unwrap();

        // THEN
        assert_eq!(layout.height, 4);
        let numbers: Vec<i64> = layout.units.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![4, 3, 2, 1]);
        let statuses: Vec<&str> = layout.units.iter().map(|s| s.status.as_str()).collect();
        assert_eq!(statuses, vec!["empty", "active", "empty", "reserved"]);
        assert_eq!(layout.units[1].unit_id, Some(dc.unit_id("R1-A", 3)));
        assert_eq!(
            layout.units[1].device.as_ref().map(|d| d.name.as_str()),
            Some("db-01")
        );
        assert!(layout.units[0].is_empty());
        assert!(layout.units[3].device.is_none());
    }

    #[test]
    fn test_layout_location_chain() {
        let dc = hall();

        let layout = dc.cmdb().rack_layout(dc.id("R1-A")).unwrap();

        let chain: Vec<(&str, usize)> = layout
            .location_chain
            .iter()
            .map(|n| (n.name.as_str(), n.depth))
            .collect();
        assert_eq!(chain, vec![("Row 1", 1), ("Hall A", 2)]);
    }

    #[test]
    fn test_rack_without_height() {
        // GIVEN a rack whose height was cleared
        let dc = hall();
        let rack = dc.id("R1-B");
        dc.cmdb()
            .update_properties(rack, props! { "name" => "R1-B", "height" => "" }, None)
            .unwrap();

        // WHEN
        let err = dc.cmdb().rack_layout(rack).unwrap_err();

        // THEN
        assert!(matches!(
            err,
            CmdbError::Containment(ContainmentError::MissingHeight { .. })
        ));
        assert_eq!(err.to_string(), "No height defined for this rack");
    }

    #[test]
    fn test_layout_of_non_rack() {
        let dc = hall();
        let err = dc.cmdb().rack_layout(dc.id("Row 1")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_layout_follows_updates() {
        // GIVEN
        let dc = hall();
        let unit = dc.unit_id("R1-A", 1);

        // WHEN the unit is marked failed
        dc.cmdb()
            .update_properties(unit, props! { "unit_number" => 1i64, "status" => "failed" }, None)
            .unwrap();

        // THEN the next read sees it
        let layout = dc.cmdb().rack_layout(dc.id("R1-A")).unwrap();
        assert_eq!(layout.units[3].status, "failed");
    }
}

mod room_overview {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rows_and_racks_follow_their_orientation() {
        // GIVEN a right-to-left room whose rows differ in orientation
        let dc = hall();

        // WHEN
        let overview = dc.cmdb().room_overview(dc.id("Hall A")).unwrap();

        // THEN rows run 2, 1
        assert_eq!(overview.orientation, Orientation::RightToLeft);
        let rows: Vec<&str> = overview.rows.iter().map(|r| r.node.name.as_str()).collect();
        assert_eq!(rows, vec!["Row 2", "Row 1"]);

        // AND each row orders its own racks
        let row2: Vec<i64> = overview.rows[0].racks.iter().map(|r| r.rack_number).collect();
        assert_eq!(row2, vec![2, 1]);
        let row1: Vec<&str> = overview.rows[1]
            .racks
            .iter()
            .map(|r| r.node.name.as_str())
            .collect();
        assert_eq!(row1, vec!["R1-A", "R1-B"]);
        assert_eq!(overview.rows[1].racks[0].height, 4);
        assert_eq!(overview.rows[1].description, "No description");
    }

    #[test]
    fn test_unrecognised_orientation_sorts_by_name() {
        let dc = DataCenter::new()
            .room("Hall B", Some("Diagonal"))
            .row("Hall B", "Zulu", 1, None)
            .row("Hall B", "Alpha", 2, None);

        let overview = dc.cmdb().room_overview(dc.id("Hall B")).unwrap();

        assert_eq!(overview.orientation, Orientation::Unspecified);
        let rows: Vec<&str> = overview.rows.iter().map(|r| r.node.name.as_str()).collect();
        assert_eq!(rows, vec!["Alpha", "Zulu"]);
        assert_eq!(overview.rows[1].orientation, Orientation::LeftToRight);
    }

    #[test]
    fn test_room_without_rows() {
        let dc = DataCenter::new().room("Empty", None);

        let overview = dc.cmdb().room_overview(dc.id("Empty")).unwrap();

        assert!(overview.rows.is_empty());
        assert_eq!(overview.orientation, Orientation::LeftToRight);
    }
}

mod ancestors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_device_chain_reaches_room() {
        let dc = hall();

        let chain = dc.cmdb().ancestor_chain(dc.id("db-01")).unwrap();

        let labels: Vec<&str> = chain.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Rack_Unit", "Rack", "Row", "Room"]);
        let depths: Vec<usize> = chain.iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_chain_of_top_level_entity_is_empty() {
        let dc = hall();
        assert!(dc.cmdb().ancestor_chain(dc.id("Hall A")).unwrap().is_empty());
    }

    #[test]
    fn test_cycle_terminates() {
        // GIVEN a room located in its own row
        let dc = hall();
        let cmdb = dc.cmdb();
        cmdb.connect(dc.id("Hall A"), "Room", "LOCATED_IN", dc.id("Row 1"), "Row", None)
            .unwrap();

        // WHEN
        let chain = cmdb.ancestor_chain(dc.id("R1-A")).unwrap();

        // THEN each container appears once
        let names: Vec<&str> = chain.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Row 1", "Hall A"]);
    }

    #[test]
    fn test_ordered_children_bottom_to_top() {
        let dc = hall();

        let rows = dc
            .cmdb()
            .resolver()
            .ordered_children(dc.id("Hall A"), "LOCATED_IN", Orientation::BottomToTop)
            .unwrap();

        let keys: Vec<i64> = rows.iter().map(|n| n.ordering_key).collect();
        assert_eq!(keys, vec![2, 1]);
        assert!(rows.iter().all(|n| n.label == "Row"));
    }
}
