//! End-to-end walkthrough of the five reference scenarios

use std::f64::consts::PI;

use complect::error::DispatchError;
use complect::util::config::Config;
use complect::{Error, Pattern, PatternCases, Registry, Value};

fn field(
    value: &Value,
    name: &str,
) -> Value {
    value.as_instance().unwrap().get(name).unwrap()
}

#[test]
fn test_shape_area() {
    let registry = Registry::new();
    let shape = registry
        .declare("Shape")
        .variant("Circle", &["radius"])
        .variant("Rectangle", &["width", "height"])
        .build()
        .unwrap();
    let area = registry
        .define_trait("area")
        .for_data(&shape)
        .case("Circle", |_, args| {
            let r = field(&args[0], "radius").as_float().unwrap();
            Ok(Value::Float(PI * r * r))
        })
        .case("Rectangle", |_, args| {
            let w = field(&args[0], "width").as_float().unwrap();
            let h = field(&args[0], "height").as_float().unwrap();
            Ok(Value::Float(w * h))
        })
        .build()
        .unwrap();

    let circle = shape.variant("Circle").unwrap().construct(vec![Value::Int(2)]).unwrap();
    let rect = shape
        .variant("Rectangle")
        .unwrap()
        .construct(vec![Value::Int(2), Value::Int(3)])
        .unwrap();

    assert_eq!(area.call(&[circle.into()]).unwrap(), Value::Float(PI * 4.0));
    assert_eq!(area.call(&[rect.into()]).unwrap(), Value::Float(6.0));
}

#[test]
fn test_peano_value_and_sharing() {
    let registry = Registry::new();
    let peano = registry
        .declare("Peano")
        .variant("Zero", &[])
        .variant("Succ", &["pred"])
        .build()
        .unwrap();
    let value = registry
        .define_trait("value")
        .for_data(&peano)
        .case("Zero", |_, _| Ok(Value::Int(0)))
        .case("Succ", |d, args| {
            Ok(Value::Int(d.recur(&[field(&args[0], "pred")])?.as_int().unwrap() + 1))
        })
        .build()
        .unwrap();

    let succ = peano.variant("Succ").unwrap();
    let zero = peano.unit("Zero").unwrap();
    let one = succ.construct(vec![zero.clone()]).unwrap();
    let two = succ.construct(vec![one.clone().into()]).unwrap();

    assert_eq!(value.call(&[two.into()]).unwrap(), Value::Int(2));
    assert!(one.ptr_eq(&succ.construct(vec![zero]).unwrap()));
}

#[test]
fn test_list_concat_identity() {
    let registry = Registry::new();
    let list = registry
        .declare("List")
        .variant("Nil", &[])
        .variant("Cons", &["head", "tail"])
        .build()
        .unwrap();
    let cons = list.variant("Cons").unwrap().clone();
    let nil = list.unit("Nil").unwrap();

    let step = cons.clone();
    let rules = PatternCases::builder()
        .rule(
            vec![
                cons.pattern(vec![Pattern::Wildcard, Pattern::Wildcard]).unwrap(),
                Pattern::Wildcard,
            ],
            move |d, args| {
                let rest = d.recur(&[field(&args[0], "tail"), args[1].clone()])?;
                Ok(step.construct(vec![field(&args[0], "head"), rest])?.into())
            },
        )
        .build()
        .unwrap();
    let concat = registry
        .define_trait("concat")
        .for_data(&list)
        .case("Nil", |_, args| Ok(args[1].clone()))
        .rules("Cons", rules)
        .build()
        .unwrap();

    let from = |items: &[i64]| -> Value {
        items.iter().rev().fold(nil.clone(), |tail, &head| {
            cons.construct(vec![Value::Int(head), tail]).unwrap().into()
        })
    };

    let joined = concat.call(&[from(&[1, 2]), from(&[3])]).unwrap();
    assert_eq!(joined, from(&[1, 2, 3]));
    assert_eq!(joined.to_string(), "Cons(1, Cons(2, Cons(3, Nil)))");
}

#[test]
fn test_extended_printer() {
    let registry = Registry::new();
    let int_exp = registry
        .declare("IntExp")
        .variant("Lit", &["value"])
        .build()
        .unwrap();
    let int_bool_exp = registry
        .declare("IntBoolExp")
        .extends(&int_exp)
        .variant("Bool", &["value"])
        .variant("Iff", &["pred", "ifTrue", "ifFalse"])
        .build()
        .unwrap();

    let int_print = registry
        .define_trait("print")
        .for_data(&int_exp)
        .case("Lit", |_, args| Ok(Value::from(field(&args[0], "value").to_string())))
        .build()
        .unwrap();
    let int_bool_print = registry
        .define_trait("print")
        .for_data(&int_bool_exp)
        .extends(&int_print)
        .case("Bool", |_, args| Ok(Value::from(field(&args[0], "value").to_string())))
        .case("Iff", |d, args| {
            let part = |name: &str| -> complect::Result<String> {
                let printed = d.recur(&[field(&args[0], name)])?;
                Ok(printed.as_str().unwrap_or_default().to_string())
            };
            Ok(Value::from(format!(
                "({} ? {} : {})",
                part("pred")?,
                part("ifTrue")?,
                part("ifFalse")?
            )))
        })
        .build()
        .unwrap();

    let lit = int_bool_exp.variant("Lit").unwrap();
    let expr = int_bool_exp
        .variant("Iff")
        .unwrap()
        .construct(vec![
            int_bool_exp
                .variant("Bool")
                .unwrap()
                .construct(vec![Value::Bool(true)])
                .unwrap()
                .into(),
            lit.construct(vec![Value::Int(1)]).unwrap().into(),
            lit.construct(vec![Value::Int(2)]).unwrap().into(),
        ])
        .unwrap();

    assert_eq!(
        int_bool_print.call(&[expr.into()]).unwrap(),
        Value::str("(true ? 1 : 2)")
    );
    // the base printer is unchanged by the extension
    assert!(!int_print.resolves("Iff"));
}

#[test]
fn test_memo_fix_bottom() {
    let registry = Registry::with_config(Config {
        max_depth: 128,
        ..Default::default()
    });
    let loops = registry.declare("Loop").variant("Again", &[]).build().unwrap();
    let forever = registry
        .define_trait("forever")
        .for_data(&loops)
        .case("Again", |d, args| d.recur(args))
        .build()
        .unwrap();
    let again = loops.unit("Again").unwrap();

    assert_eq!(
        forever.call(&[again.clone()]).unwrap_err(),
        Error::Dispatch(DispatchError::RecursionLimit {
            trait_name: "forever".into(),
            limit: 128,
        })
    );
    let fixed = registry.memo_fix(&forever, "bottom");
    assert_eq!(fixed.call(&[again]).unwrap(), Value::str("bottom"));
}

#[test]
fn test_builtin_scenarios() {
    for scenario in complect::demo::scenarios() {
        let value = complect::run_scenario(scenario.name, Config::default()).unwrap();
        assert!(!value.is_null(), "scenario {} produced null", scenario.name);
    }
    assert!(complect::run_scenario("nope", Config::default()).is_err());
}
