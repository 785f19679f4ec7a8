//! Property tests for canonical construction and the interning store

use complect::runtime::intern::{InternStore, Retention};
use complect::{Registry, Value};
use proptest::prelude::*;

/// Strategy for primitive field values
fn primitive_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e6f64..1.0e6).prop_map(Value::Float),
        "[a-z]{0,6}".prop_map(|s| Value::str(&s)),
    ]
}

proptest! {
    #[test]
    fn prop_equal_fields_give_identical_instances(
        a in primitive_strategy(),
        b in primitive_strategy(),
    ) {
        let registry = Registry::new();
        let pair = registry.declare("Pair").variant("Pair", &["first", "second"]).build().unwrap();
        let variant = pair.variant("Pair").unwrap();

        let x = variant.construct(vec![a.clone(), b.clone()]).unwrap();
        let y = variant.construct(vec![a.clone(), b.clone()]).unwrap();
        prop_assert!(x.ptr_eq(&y));

        let swapped = variant.construct(vec![b.clone(), a.clone()]).unwrap();
        prop_assert_eq!(x.ptr_eq(&swapped), a == b);
    }

    #[test]
    fn prop_peano_numbers_are_shared(n in 0usize..40, m in 0usize..40) {
        let registry = Registry::new();
        let nat = registry
            .declare("Peano")
            .variant("Zero", &[])
            .variant("Succ", &["pred"])
            .build()
            .unwrap();
        let succ = nat.variant("Succ").unwrap();
        let build = |k: usize| -> Value {
            (0..k).fold(nat.unit("Zero").unwrap(), |acc, _| {
                succ.construct(vec![acc]).unwrap().into()
            })
        };
        prop_assert_eq!(build(n) == build(m), n == m);
    }

    #[test]
    fn prop_store_returns_what_was_set(
        keys in prop::collection::vec(primitive_strategy(), 1..5),
        value in any::<i64>(),
    ) {
        let store = InternStore::new(Retention::Strong);
        store.set(&keys, Value::Int(value)).unwrap();
        prop_assert_eq!(store.get(&keys).unwrap(), Some(Value::Int(value)));
        prop_assert!(store.delete(&keys).unwrap());
        prop_assert_eq!(store.get(&keys).unwrap(), None);
    }
}
