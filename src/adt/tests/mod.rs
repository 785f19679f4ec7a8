//! Declaration and canonical construction tests


use crate::adt::DataDeclaration;
use crate::error::{ConstructionError, DeclarationError, Error};
use crate::registry::Registry;
use crate::runtime::value::Value;

fn shapes(registry: &Registry) -> DataDeclaration {
    registry
        .declare("Shape")
        .variant("Circle", &["radius"])
        .variant("Rectangle", &["width", "height"])
        .variant("Empty", &[])
        .build()
        .unwrap()
}

#[test]
fn test_declaration_lists_variants_in_order() {
    let registry = Registry::new();
    let shape = shapes(&registry);
    let names: Vec<&str> = shape.variant_names().collect();
    assert_eq!(names, ["Circle", "Rectangle", "Empty"]);
    assert_eq!(shape.len(), 3);
    assert_eq!(shape.name(), "Shape");
}

#[test]
fn test_invalid_variant_name() {
    let registry = Registry::new();
    let err = registry
        .declare("Bad")
        .variant("circle", &["radius"])
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Declaration(DeclarationError::InvalidName { what: "variant", ref name, .. }) if name == "circle"
    ));
}

#[test]
fn test_invalid_field_name() {
    let registry = Registry::new();
    let err = registry
        .declare("Bad")
        .variant("Circle", &["Radius"])
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Declaration(DeclarationError::InvalidName { what: "field", ref name, .. }) if name == "Radius"
    ));
}

#[test]
fn test_duplicate_field() {
    let registry = Registry::new();
    let err = registry
        .declare("Bad")
        .variant("Point", &["x", "x"])
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        Error::Declaration(DeclarationError::DuplicateField {
            variant: "Point".into(),
            field: "x".into(),
        })
    );
}

#[test]
fn test_duplicate_variant() {
    let registry = Registry::new();
    let err = registry
        .declare("Bad")
        .variant("A", &[])
        .variant("A", &["x"])
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        Error::Declaration(DeclarationError::DuplicateVariant { variant: "A".into() })
    );
}

#[test]
fn test_extension_cannot_redefine_base_variant() {
    let registry = Registry::new();
    let shape = shapes(&registry);
    let err = registry
        .declare("More")
        .extends(&shape)
        .variant("Circle", &["r"])
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        Error::Declaration(DeclarationError::DuplicateVariant { variant: "Circle".into() })
    );
}

#[test]
fn test_construction_is_canonical() {
    let registry = Registry::new();
    let shape = shapes(&registry);
    let rect = shape.variant("Rectangle").unwrap();

    let a = rect.construct(vec![Value::Int(2), Value::Int(3)]).unwrap();
    let b = rect.construct(vec![Value::Int(2), Value::Int(3)]).unwrap();
    let c = rect.construct(vec![Value::Int(3), Value::Int(2)]).unwrap();

    assert!(a.ptr_eq(&b));
    assert!(!a.ptr_eq(&c));
}

#[test]
fn test_int_and_float_fields_are_distinct() {
    let registry = Registry::new();
    let circle = shapes(&registry).variant("Circle").unwrap().clone();
    let a = circle.construct(vec![Value::Int(1)]).unwrap();
    let b = circle.construct(vec![Value::Float(1.0)]).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_reference_fields_canonicalize_by_identity() {
    let registry = Registry::new();
    let circle = shapes(&registry).variant("Circle").unwrap().clone();
    let list = Value::list([Value::Int(1)]);

    let a = circle.construct(vec![list.clone()]).unwrap();
    let b = circle.construct(vec![list]).unwrap();
    let c = circle.construct(vec![Value::list([Value::Int(1)])]).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_canonical_through_nested_structure() {
    let registry = Registry::new();
    let nat = registry
        .declare("Peano")
        .variant("Zero", &[])
        .variant("Succ", &["pred"])
        .build()
        .unwrap();
    let succ = nat.variant("Succ").unwrap();
    let build = |n: usize| {
        (0..n).fold(nat.unit("Zero").unwrap(), |acc, _| {
            succ.construct(vec![acc]).unwrap().into()
        })
    };
    assert_eq!(build(5), build(5));
    assert_ne!(build(5), build(4));
}

#[test]
fn test_separate_registries_do_not_share_instances() {
    let first = Registry::new();
    let second = Registry::new();
    let a = shapes(&first).variant("Circle").unwrap().construct(vec![Value::Int(1)]).unwrap();
    let b = shapes(&second).variant("Circle").unwrap().construct(vec![Value::Int(1)]).unwrap();
    assert_ne!(a, b);
    assert!(!first.same_registry(&second));
    assert!(first.same_registry(&first.clone()));
}

#[test]
fn test_argument_count() {
    let registry = Registry::new();
    let shape = shapes(&registry);
    let err = shape
        .variant("Rectangle")
        .unwrap()
        .construct(vec![Value::Int(1)])
        .unwrap_err();
    assert_eq!(
        err,
        Error::Construction(ConstructionError::ArgumentCount {
            variant: "Rectangle".into(),
            expected: 2,
            found: 1,
        })
    );
}

#[test]
fn test_keyed_construction_matches_positional() {
    let registry = Registry::new();
    let rect = shapes(&registry).variant("Rectangle").unwrap().clone();

    let positional = rect.construct(vec![Value::Int(2), Value::Int(3)]).unwrap();
    let keyed = rect
        .construct_keyed(
            Value::record([("height", Value::Int(3)), ("width", Value::Int(2))])
                .as_record()
                .unwrap(),
        )
        .unwrap();
    assert_eq!(positional, keyed);
}

#[test]
fn test_keyed_construction_errors() {
    let registry = Registry::new();
    let rect = shapes(&registry).variant("Rectangle").unwrap().clone();

    let missing = Value::record([("width", Value::Int(2))]);
    assert_eq!(
        rect.construct_keyed(missing.as_record().unwrap()).unwrap_err(),
        Error::Construction(ConstructionError::MissingField {
            variant: "Rectangle".into(),
            field: "height".into(),
        })
    );

    let extra = Value::record([
        ("width", Value::Int(2)),
        ("height", Value::Int(3)),
        ("depth", Value::Int(4)),
    ]);
    assert_eq!(
        rect.construct_keyed(extra.as_record().unwrap()).unwrap_err(),
        Error::Construction(ConstructionError::UnknownField {
            variant: "Rectangle".into(),
            field: "depth".into(),
        })
    );
}

#[test]
fn test_apply_picks_argument_form() {
    let registry = Registry::new();
    let shape = shapes(&registry);
    let rect = shape.variant("Rectangle").unwrap();
    let circle = shape.variant("Circle").unwrap();

    let keyed = rect
        .apply(&[Value::record([("width", Value::Int(2)), ("height", Value::Int(3))])])
        .unwrap();
    let positional = rect.apply(&[Value::Int(2), Value::Int(3)]).unwrap();
    assert_eq!(keyed, positional);

    // a one-field variant takes a record without its field name as the value
    let record = Value::record([("r", Value::Int(1))]);
    let wrapped = circle.apply(&[record.clone()]).unwrap();
    assert_eq!(wrapped.get("radius").unwrap(), record);
}

#[test]
fn test_apply_reports_bad_keys() {
    let registry = Registry::new();
    let shape = shapes(&registry);
    let rect = shape.variant("Rectangle").unwrap();
    let circle = shape.variant("Circle").unwrap();

    let near_miss = Value::record([("width", Value::Int(2)), ("depth", Value::Int(3))]);
    assert_eq!(
        rect.apply(&[near_miss]).unwrap_err(),
        Error::Construction(ConstructionError::UnknownField {
            variant: "Rectangle".into(),
            field: "depth".into(),
        })
    );
    assert_eq!(
        rect.apply(&[Value::record([("width", Value::Int(2))])]).unwrap_err(),
        Error::Construction(ConstructionError::MissingField {
            variant: "Rectangle".into(),
            field: "height".into(),
        })
    );

    let extra = Value::record([("radius", Value::Int(2)), ("extra", Value::Int(3))]);
    assert_eq!(
        circle.apply(&[extra]).unwrap_err(),
        Error::Construction(ConstructionError::UnknownField {
            variant: "Circle".into(),
            field: "extra".into(),
        })
    );
    let keyed = circle.apply(&[Value::record([("radius", Value::Int(2))])]).unwrap();
    assert_eq!(keyed.get("radius").unwrap(), Value::Int(2));
}

#[test]
fn test_singletons() {
    let registry = Registry::new();
    let shape = shapes(&registry);
    let empty = shape.variant("Empty").unwrap();

    assert!(empty.is_singleton());
    let a = empty.singleton().unwrap();
    assert_eq!(a, empty.construct(vec![]).unwrap());
    assert_eq!(shape.unit("Empty").unwrap(), Value::Instance(a.clone()));
    assert_eq!(a.to_string(), "Empty");

    assert_eq!(
        shape.unit("Circle").unwrap_err(),
        Error::Construction(ConstructionError::NotASingleton { variant: "Circle".into() })
    );
}

#[test]
fn test_unknown_variant_lookup() {
    let registry = Registry::new();
    assert_eq!(
        shapes(&registry).variant("Triangle").unwrap_err(),
        Error::Construction(ConstructionError::UnknownVariant { variant: "Triangle".into() })
    );
}

#[test]
fn test_extension_shares_tags_and_instances() {
    let registry = Registry::new();
    let shape = shapes(&registry);
    let more = registry
        .declare("MoreShapes")
        .extends(&shape)
        .variant("Triangle", &["a", "b", "c"])
        .build()
        .unwrap();

    let names: Vec<&str> = more.variant_names().collect();
    assert_eq!(names, ["Circle", "Rectangle", "Empty", "Triangle"]);

    let base_circle = shape.variant("Circle").unwrap();
    let ext_circle = more.variant("Circle").unwrap();
    assert_eq!(base_circle.tag(), ext_circle.tag());
    assert_eq!(
        base_circle.construct(vec![Value::Int(1)]).unwrap(),
        ext_circle.construct(vec![Value::Int(1)]).unwrap()
    );
    assert_eq!(shape.unit("Empty").unwrap(), more.unit("Empty").unwrap());

    let triangle = more.variant("Triangle").unwrap().tag().clone();
    assert!(more.contains_tag(&triangle));
    assert!(!shape.contains_tag(&triangle));
    assert!(more.extends(&shape));
    assert!(!shape.extends(&more));
    assert_eq!(more.base(), Some(&shape));
}

#[test]
fn test_instance_fields() {
    let registry = Registry::new();
    let rect = shapes(&registry).variant("Rectangle").unwrap().clone();
    let r = rect.construct(vec![Value::Int(2), Value::str("tall")]).unwrap();

    assert_eq!(r.name(), "Rectangle");
    assert_eq!(r.get("width").unwrap(), Value::Int(2));
    assert_eq!(r.field_at(1).unwrap(), Value::str("tall"));
    assert!(r.get("depth").is_err());
    assert!(r.field_at(2).is_err());
    let fields: Vec<Value> = r.fields().collect::<Result<_, _>>().unwrap();
    assert_eq!(fields, [Value::Int(2), Value::str("tall")]);
    assert_eq!(r.to_string(), "Rectangle(2, \"tall\")");
}

#[test]
fn test_fields_include_functions_and_evaluate_lazy() {
    let registry = Registry::new();
    let rect = shapes(&registry).variant("Rectangle").unwrap().clone();
    let f = Value::func(|_| Ok(Value::Null));
    let r = rect
        .construct(vec![f.clone(), Value::lazy(|| Ok(Value::Int(7)))])
        .unwrap();

    let fields: Vec<Value> = r.fields().collect::<Result<_, _>>().unwrap();
    assert_eq!(fields, [f, Value::Int(7)]);
    assert_eq!(r.raw_fields()[1].kind(), crate::runtime::value::ValueKind::Lazy);
}

#[test]
fn test_dead_instances_are_released() {
    let registry = Registry::with_config(crate::util::config::Config {
        purge_interval: 0,
        ..Default::default()
    });
    let shape = shapes(&registry);
    let circle = shape.variant("Circle").unwrap();
    let live_before = registry.live_instances();
    assert_eq!(live_before, 1);

    let a = circle.construct(vec![Value::Int(10)]).unwrap();
    let weak = a.downgrade();
    assert_eq!(registry.live_instances(), live_before + 1);

    drop(a);
    assert!(!weak.is_alive());
    assert_eq!(registry.live_instances(), live_before);
    assert_eq!(registry.purge(), 1);

    // a fresh construction after collection yields a new live instance
    let b = circle.construct(vec![Value::Int(10)]).unwrap();
    assert_eq!(b.get("radius").unwrap(), Value::Int(10));
}

#[test]
fn test_store_sweeps_after_purge_interval() {
    let registry = Registry::with_config(crate::util::config::Config {
        purge_interval: 2,
        ..Default::default()
    });
    // the Empty singleton is fresh construction 1
    let shape = shapes(&registry);
    let circle = shape.variant("Circle").unwrap();

    // construction 2 sweeps while `dead` is still held
    let dead = circle.construct(vec![Value::Int(1)]).unwrap();
    drop(dead);
    let kept = circle.construct(vec![Value::Int(2)]).unwrap();
    // construction 4 sweeps the dropped instance
    let other = circle.construct(vec![Value::Int(3)]).unwrap();

    assert_eq!(registry.purge(), 0);
    assert_eq!(registry.live_instances(), 3);
    assert_eq!(kept.get("radius").unwrap(), Value::Int(2));
    assert_eq!(other.get("radius").unwrap(), Value::Int(3));
}
