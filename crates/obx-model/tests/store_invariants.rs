//! Property-based checks for the store's notification invariants.

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;

use obx_model::PropertyStore;

fn notification_count(store: &PropertyStore) -> (Rc<Cell<u32>>, obx_model::Subscription) {
    let count = Rc::new(Cell::new(0u32));
    let sink = Rc::clone(&count);
    let sub = store.on_property_changed(move |_| sink.set(sink.get() + 1));
    (count, sub)
}

proptest! {
    #[test]
    fn double_set_of_equal_value_notifies_once(
        name in "[A-Za-z][A-Za-z0-9]{0,12}",
        value in any::<i64>(),
    ) {
        let store = PropertyStore::new();
        let (count, _sub) = notification_count(&store);

        store.set(name.clone(), value);
        store.set(name, value);
        prop_assert_eq!(count.get(), 1);
    }

    #[test]
    fn equal_string_rewrites_are_silent(
        name in "[a-z]{1,8}",
        value in "[ -~]{0,16}",
    ) {
        let store = PropertyStore::new();
        let (count, _sub) = notification_count(&store);

        // Two distinct allocations with equal contents.
        store.set(name.clone(), value.clone());
        store.set(name, value);
        prop_assert_eq!(count.get(), 1);
    }

    #[test]
    fn unequal_rewrite_notifies_again(
        name in "[a-z]{1,8}",
        first in any::<u32>(),
        second in any::<u32>(),
    ) {
        prop_assume!(first != second);
        let store = PropertyStore::new();
        let (count, _sub) = notification_count(&store);

        store.set(name.clone(), first);
        store.set(name, second);
        prop_assert_eq!(count.get(), 2);
    }

    #[test]
    fn names_snapshot_survives_later_mutation(
        names in prop::collection::hash_set("[a-z]{1,8}", 1..8),
    ) {
        let store = PropertyStore::new();
        for (i, name) in names.iter().enumerate() {
            store.set(name.clone(), i as u64);
        }

        let mut snapshot = store.names();
        snapshot.sort();
        store.set("added_later!".to_string(), true);

        let mut expected: Vec<String> = names.into_iter().collect();
        expected.sort();
        prop_assert_eq!(snapshot, expected);
    }

    #[test]
    fn reads_of_unwritten_names_never_notify(name in "[a-z]{1,12}") {
        let store = PropertyStore::new();
        let (count, _sub) = notification_count(&store);

        let _: i64 = store.get(&name);
        let _: String = store.get(&name);
        prop_assert_eq!(count.get(), 0);
        prop_assert!(store.names().is_empty());
    }
}
