//! Racing construction from several threads

use complect::{Instance, Registry, Value};
use rayon::prelude::*;

#[test]
fn test_racing_constructions_converge() {
    let registry = Registry::new();
    let point = registry
        .declare("Point")
        .variant("Point", &["x", "y"])
        .build()
        .unwrap();
    let variant = point.variant("Point").unwrap();

    let built: Vec<Instance> = (0..256)
        .into_par_iter()
        .map(|i| {
            variant
                .construct(vec![Value::Int(i % 4), Value::Int(0)])
                .unwrap()
        })
        .collect();

    for (i, instance) in built.iter().enumerate() {
        assert!(instance.ptr_eq(&built[i % 4]));
    }
}

#[test]
fn test_traits_dispatch_from_many_threads() {
    let registry = Registry::new();
    let nat = registry
        .declare("Peano")
        .variant("Zero", &[])
        .variant("Succ", &["pred"])
        .build()
        .unwrap();
    let value = registry
        .define_trait("value")
        .for_data(&nat)
        .case("Zero", |_, _| Ok(Value::Int(0)))
        .case("Succ", |d, args| {
            let pred = args[0].as_instance().unwrap().get("pred")?;
            Ok(Value::Int(d.recur(&[pred])?.as_int().unwrap() + 1))
        })
        .build()
        .unwrap();
    let succ = nat.variant("Succ").unwrap();

    let results: Vec<i64> = (0..32i64)
        .into_par_iter()
        .map(|n| {
            let number = (0..n).fold(nat.unit("Zero").unwrap(), |acc, _| {
                succ.construct(vec![acc]).unwrap().into()
            });
            value.call(&[number]).unwrap().as_int().unwrap()
        })
        .collect();

    assert_eq!(results, (0..32).collect::<Vec<_>>());
}
