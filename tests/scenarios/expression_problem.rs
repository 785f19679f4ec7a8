//! Extending data and operations independently

use complect::error::{CompositionError, DeclarationError};
use complect::{Error, Member, Registry, Value, WILDCARD};

fn int(value: &Value) -> i64 {
    value.as_int().unwrap()
}

#[test]
fn test_extension_keeps_existing_operations_working() {
    let registry = Registry::new();
    let exp = registry
        .declare("Exp")
        .variant("Lit", &["value"])
        .variant("Add", &["left", "right"])
        .build()
        .unwrap();
    let eval = registry
        .define_trait("eval")
        .for_data(&exp)
        .case("Lit", |_, args| Ok(args[0].as_instance().unwrap().get("value")?))
        .case("Add", |d, args| {
            let this = args[0].as_instance().unwrap();
            let l = d.recur(&[this.get("left")?])?;
            let r = d.recur(&[this.get("right")?])?;
            Ok(Value::Int(int(&l) + int(&r)))
        })
        .build()
        .unwrap();

    // a new variant
    let neg_exp = registry
        .declare("NegExp")
        .extends(&exp)
        .variant("Neg", &["inner"])
        .build()
        .unwrap();

    // the old operation is not total over the new declaration
    assert_eq!(
        registry
            .define_trait("eval")
            .for_data(&neg_exp)
            .extends(&eval)
            .build()
            .unwrap_err(),
        Error::Declaration(DeclarationError::MissingCase {
            trait_name: "eval".into(),
            variant: "Neg".into(),
        })
    );

    let neg_eval = registry
        .define_trait("eval")
        .for_data(&neg_exp)
        .extends(&eval)
        .case("Neg", |d, args| {
            let inner = d.recur(&[args[0].as_instance().unwrap().get("inner")?])?;
            Ok(Value::Int(-int(&inner)))
        })
        .build()
        .unwrap();

    let lit = neg_exp.variant("Lit").unwrap();
    let one: Value = lit.construct(vec![Value::Int(1)]).unwrap().into();
    let five: Value = lit.construct(vec![Value::Int(5)]).unwrap().into();
    let neg_five: Value = neg_exp
        .variant("Neg")
        .unwrap()
        .construct(vec![five])
        .unwrap()
        .into();
    let sum: Value = neg_exp
        .variant("Add")
        .unwrap()
        .construct(vec![one.clone(), neg_five])
        .unwrap()
        .into();

    assert_eq!(neg_eval.call(&[sum]).unwrap(), Value::Int(-4));
    // instances built through either declaration are the same
    let base_one: Value = exp
        .variant("Lit")
        .unwrap()
        .construct(vec![Value::Int(1)])
        .unwrap()
        .into();
    assert_eq!(base_one, one);
    assert_eq!(eval.call(&[base_one]).unwrap(), Value::Int(1));
}

#[test]
fn test_new_operation_over_existing_variants() {
    let registry = Registry::new();
    let exp = registry
        .declare("Exp")
        .variant("Lit", &["value"])
        .variant("Add", &["left", "right"])
        .build()
        .unwrap();
    let depth = registry
        .define_trait("depth")
        .for_data(&exp)
        .case("Lit", |_, _| Ok(Value::Int(1)))
        .case(WILDCARD, |d, args| {
            let this = args[0].as_instance().unwrap();
            let mut deepest = 0;
            for field in this.fields() {
                deepest = deepest.max(int(&d.recur(&[field?])?));
            }
            Ok(Value::Int(deepest + 1))
        })
        .build()
        .unwrap();

    let lit = exp.variant("Lit").unwrap();
    let add = exp.variant("Add").unwrap();
    let leaf: Value = lit.construct(vec![Value::Int(0)]).unwrap().into();
    let inner: Value = add.construct(vec![leaf.clone(), leaf.clone()]).unwrap().into();
    let outer: Value = add.construct(vec![inner, leaf]).unwrap().into();

    assert_eq!(depth.call(&[outer]).unwrap(), Value::Int(3));
}

#[test]
fn test_facade_over_extended_declaration() {
    let registry = Registry::new();
    let color = registry
        .declare("Color")
        .variant("Red", &[])
        .variant("Green", &[])
        .build()
        .unwrap();
    let more = registry
        .declare("MoreColor")
        .extends(&color)
        .variant("Rgb", &["r", "g", "b"])
        .build()
        .unwrap();
    let hex = registry
        .define_trait("hex")
        .case("Red", |_, _| Ok(Value::str("#ff0000")))
        .case("Green", |_, _| Ok(Value::str("#00ff00")))
        .build()
        .unwrap();

    let facade = registry.compose(&more, [hex]).unwrap();
    let red = facade.unit("Red").unwrap();
    assert_eq!(red.call("hex", &[]).unwrap(), Value::str("#ff0000"));
    assert!(matches!(red.member("hex").unwrap(), Member::Method(_)));

    let rgb = facade
        .variant("Rgb")
        .unwrap()
        .construct(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        .unwrap();
    assert_eq!(
        rgb.call("hex", &[]).unwrap_err(),
        Error::Composition(CompositionError::MissingCase {
            trait_name: "hex".into(),
            variant: "Rgb".into(),
        })
    );

    // the base declaration's singleton is the extended one's
    assert_eq!(red.value(), color.unit("Red").unwrap());
}
