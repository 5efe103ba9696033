//! Property tests over the audited facade.

use cmdb_tests::prelude::*;
use proptest::prelude::*;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
    ]
}

fn bag() -> impl Strategy<Value = Properties> {
    prop::collection::btree_map("[a-z_]{1,8}", scalar(), 0..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_revert_restores_any_nonempty_bag(
        a in bag().prop_filter("needs a snapshot", |b| !b.is_empty()),
        b in bag()
    ) {
        let cmdb = Cmdb::in_memory().with_clock(StepClock::new());
        let id = cmdb.create("Thing", a.clone(), None).unwrap().id;
        cmdb.update_properties(id, b.clone(), None).unwrap();
        let entry = cmdb.audit_for(id)[0].clone();
        prop_assert_eq!(entry.old_properties.as_ref(), Some(&a));
        prop_assert_eq!(entry.new_properties.as_ref(), Some(&b));

        let reverted = cmdb.revert(entry.id, None, &AllowAll).unwrap();

        prop_assert_eq!(&reverted.entity.properties, &a);
        prop_assert_eq!(cmdb.get(Some("Thing"), id).unwrap().properties, a);
    }

    #[test]
    fn test_one_entry_per_successful_mutation(updates in prop::collection::vec(bag(), 0..5)) {
        let cmdb = Cmdb::in_memory().with_clock(StepClock::new());
        let id = cmdb.create("Thing", Properties::new(), None).unwrap().id;
        for update in &updates {
            cmdb.update_properties(id, update.clone(), None).unwrap();
        }
        cmdb.delete(id, None).unwrap();

        let history = cmdb.audit_for(id);
        prop_assert_eq!(history.len(), updates.len() + 2);
        prop_assert_eq!(history[0].action, AuditAction::Delete);
        prop_assert_eq!(history[history.len() - 1].action, AuditAction::Create);
    }
}
