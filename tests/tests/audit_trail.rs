//! Audit trail integration tests: emission, listing, and revert.

use cmdb_tests::prelude::*;

fn cmdb() -> Cmdb {
    Cmdb::in_memory().with_clock(StepClock::new())
}

mod revert {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_update_then_revert_restores_original_bag() {
        // GIVEN an entity updated from A to B
        let cmdb = cmdb();
        let a = props! { "name" => "core-sw", "vlan" => 10i64, "notes" => "primary" };
        let b = props! { "name" => "core-sw", "vlan" => 20i64 };
        let device = cmdb.create("Device", a.clone(), Some("alice")).unwrap();
        let updated = cmdb.update_properties(device.id, b.clone(), Some("alice")).unwrap();
        assert_eq!(updated.properties, b);
        let update_entry = cmdb.audit_for(device.id)[0].clone();
        assert_eq!(update_entry.action, AuditAction::Update);

        // WHEN
        let reverted = cmdb.revert(update_entry.id, Some("bob"), &AllowAll).unwrap();

        // THEN the bag is A again, keys of B not in A are gone
        assert_eq!(reverted.entity.properties, a);
        assert_eq!(cmdb.get(Some("Device"), device.id).unwrap().properties, a);

        // AND the revert is recorded newest-first
        let history = cmdb.audit_for(device.id);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].action, AuditAction::Revert);
        assert_eq!(history[0].change_summary, "Reverted to previous values");
        assert_eq!(history[0].user, "bob");
        assert_eq!(history[0].old_properties, Some(b));
    }

    #[test]
    fn test_revert_of_revert_redoes_the_update() {
        let cmdb = cmdb();
        let device = cmdb.create("Device", props! { "name" => "a" }, None).unwrap();
        cmdb.update_properties(device.id, props! { "name" => "b" }, None)
            .unwrap();
        let update_entry = cmdb.audit_for(device.id)[0].id;
        let first = cmdb.revert(update_entry, None, &AllowAll).unwrap();
        let revert_entry = first.entry.unwrap().id;

        let second = cmdb.revert(revert_entry, None, &AllowAll).unwrap();

        assert_eq!(second.entity.properties, props! { "name" => "b" });
    }

    #[test]
    fn test_creation_entry_cannot_be_reverted() {
        // GIVEN a creation entry, which has no old snapshot
        let cmdb = cmdb();
        let rack = cmdb.create("Rack", props! { "name" => "R1" }, None).unwrap();
        let create_entry = cmdb.audit_for(rack.id)[0].id;

        // WHEN
        let err = cmdb.revert(create_entry, None, &AllowAll).unwrap_err();

        // THEN nothing changes and nothing is recorded
        assert!(matches!(err, CmdbError::Revert(RevertError::NoPreviousValues)));
        assert_eq!(err.to_string(), "No previous values stored");
        assert_eq!(
            cmdb.get(None, rack.id).unwrap().properties,
            props! { "name" => "R1" }
        );
        assert_eq!(cmdb.audit_for(rack.id).len(), 1);
    }

    #[test]
    fn test_update_from_empty_bag_cannot_be_reverted() {
        let cmdb = cmdb();
        let rack = cmdb.create("Rack", Properties::new(), None).unwrap();
        cmdb.update_properties(rack.id, props! { "name" => "R1" }, None)
            .unwrap();
        let update_entry = cmdb.audit_for(rack.id)[0].id;

        let err = cmdb.revert(update_entry, None, &AllowAll).unwrap_err();

        assert!(matches!(err, CmdbError::Revert(RevertError::NoPreviousValues)));
    }

    #[test]
    fn test_entry_without_node_info() {
        // GIVEN an entry that does not name its entity's label
        let cmdb = cmdb();
        let entry = cmdb
            .audit()
            .emit(
                AuditEvent::new(AuditAction::Update, "", EntityId::new())
                    .old_properties(props! { "name" => "x" }),
            )
            .unwrap();

        // WHEN
        let err = cmdb.revert(entry.id, None, &AllowAll).unwrap_err();

        // THEN
        assert!(matches!(err, CmdbError::Revert(RevertError::MissingNodeInfo)));
        assert_eq!(err.to_string(), "Missing node information");
    }

    #[test]
    fn test_unknown_entry() {
        let cmdb = cmdb();
        let err = cmdb
            .revert(cmdb_core::AuditEntryId::new(), None, &AllowAll)
            .unwrap_err();
        assert!(matches!(err, CmdbError::Revert(RevertError::EntryNotFound(_))));
    }

    #[test]
    fn test_denied_revert_writes_nothing() {
        // GIVEN an authorizer that forbids devices
        let cmdb = cmdb();
        let device = cmdb.create("Device", props! { "name" => "a" }, None).unwrap();
        cmdb.update_properties(device.id, props! { "name" => "b" }, None)
            .unwrap();
        let update_entry = cmdb.audit_for(device.id)[0].id;
        let no_devices = |label: &str| label != "Device";

        // WHEN
        let err = cmdb.revert(update_entry, Some("mallory"), &no_devices);

        // THEN
        assert!(matches!(
            err,
            Err(CmdbError::Revert(RevertError::AccessDenied { .. }))
        ));
        assert_eq!(
            cmdb.get(None, device.id).unwrap().properties,
            props! { "name" => "b" }
        );
        assert_eq!(cmdb.audit_for(device.id).len(), 2);
    }

    #[test]
    fn test_revert_after_delete() {
        let cmdb = cmdb();
        let device = cmdb.create("Device", props! { "name" => "a" }, None).unwrap();
        cmdb.update_properties(device.id, props! { "name" => "b" }, None)
            .unwrap();
        let update_entry = cmdb.audit_for(device.id)[0].id;
        cmdb.delete(device.id, None).unwrap();

        let err = cmdb.revert(update_entry, None, &AllowAll).unwrap_err();

        assert!(matches!(
            err,
            CmdbError::Revert(RevertError::TargetNotFound { .. })
        ));
        assert!(cmdb.get(None, device.id).is_none());
    }
}

mod listing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_entries_listed_newest_first() {
        // GIVEN three mutations at increasing times
        let cmdb = cmdb();
        let rack = cmdb.create("Rack", props! { "name" => "R1" }, None).unwrap();
        cmdb.update_properties(rack.id, props! { "name" => "R2" }, None)
            .unwrap();
        cmdb.update_properties(rack.id, props! { "name" => "R3" }, None)
            .unwrap();

        // WHEN
        let history = cmdb.audit_for(rack.id);

        // THEN
        assert_eq!(history.len(), 3);
        assert!(history
            .windows(2)
            .all(|pair| pair[0].timestamp > pair[1].timestamp));
        assert_eq!(history[2].action, AuditAction::Create);
    }

    #[test]
    fn test_equal_timestamps_fall_back_to_append_order() {
        let cmdb = Cmdb::in_memory().with_clock(FrozenClock::new());
        let rack = cmdb.create("Rack", props! { "name" => "R1" }, None).unwrap();
        cmdb.update_properties(rack.id, props! { "name" => "R2" }, None)
            .unwrap();
        cmdb.delete(rack.id, None).unwrap();

        let actions: Vec<AuditAction> = cmdb.audit_all().iter().map(|e| e.action).collect();

        assert_eq!(
            actions,
            vec![AuditAction::Delete, AuditAction::Update, AuditAction::Create]
        );
    }

    #[test]
    fn test_target_listing_filters_and_caps() {
        // GIVEN a per-entity cap of two
        let mut config = CmdbConfig::default();
        config.audit.target_limit = 2;
        let cmdb = Cmdb::open(config).unwrap().with_clock(StepClock::new());
        let rack = cmdb.create("Rack", props! { "name" => "R1" }, None).unwrap();
        let other = cmdb.create("Rack", props! { "name" => "R9" }, None).unwrap();
        for n in 0..3i64 {
            cmdb.update_properties(rack.id, props! { "n" => n }, None)
                .unwrap();
        }

        // WHEN
        let history = cmdb.audit_for(rack.id);

        // THEN
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|e| e.target_id == Some(rack.id)));
        assert_eq!(
            history[0].new_properties,
            Some(props! { "n" => 2i64 })
        );
        assert_eq!(cmdb.audit_for(other.id).len(), 1);
        assert_eq!(cmdb.audit_all().len(), 5);
    }

    #[test]
    fn test_audit_label_is_known() {
        let cmdb = cmdb();
        assert!(cmdb.known_labels().contains("AuditLogEntry"));
    }
}

mod relationships {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_connect_entries_name_both_ends() {
        let dc = DataCenter::new()
            .room("Hall A", None)
            .row("Hall A", "Row 1", 1, None);
        let cmdb = dc.cmdb();

        let history = cmdb.audit_for(dc.id("Row 1"));

        let connect = history
            .iter()
            .find(|e| e.action == AuditAction::Connect)
            .unwrap();
        assert_eq!(connect.target_label, "Row");
        assert_eq!(connect.target_name, "Row 1");
        assert_eq!(connect.relationship_type.as_deref(), Some("LOCATED_IN"));
        assert_eq!(connect.related_label.as_deref(), Some("Room"));
        assert_eq!(connect.related_id, Some(dc.id("Hall A")));
        assert_eq!(connect.change_summary, "Connected LOCATED_IN to Room");
    }

    #[test]
    fn test_connection_entries_cannot_be_reverted() {
        let dc = DataCenter::new()
            .room("Hall A", None)
            .row("Hall A", "Row 1", 1, None);
        let cmdb = dc.cmdb();
        let connect = cmdb.audit_for(dc.id("Row 1"))[0].clone();
        assert_eq!(connect.action, AuditAction::Connect);

        let err = cmdb.revert(connect.id, None, &AllowAll).unwrap_err();

        assert!(matches!(err, CmdbError::Revert(RevertError::NoPreviousValues)));
    }
}

mod concurrency {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_parallel_mutations_each_recorded_once() {
        // GIVEN a shared instance
        let cmdb = Arc::new(cmdb());

        // WHEN four threads create and update concurrently
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cmdb = Arc::clone(&cmdb);
                thread::spawn(move || {
                    for i in 0..25i64 {
                        let e = cmdb
                            .create("Device", props! { "thread" => t as i64, "i" => i }, None)
                            .unwrap();
                        cmdb.update_properties(e.id, props! { "i" => i + 1 }, None)
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // THEN
        assert_eq!(cmdb.store().entity_count(), 100);
        let entries = cmdb.audit().list_all(usize::MAX);
        assert_eq!(entries.len(), 200);
        let seqs: HashSet<u64> = entries.iter().map(|e| e.seq).collect();
        assert_eq!(seqs.len(), 200);
    }
}
