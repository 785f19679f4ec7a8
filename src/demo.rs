//! Built-in scenarios
//!
//! Small programs exercising each part of the crate, used by the `complect`
//! binary and the integration tests.

use std::f64::consts::PI;

use tracing::info;

use crate::error::{Error, Result};
use crate::pattern::{Pattern, PatternCases};
use crate::registry::Registry;
use crate::runtime::value::Value;

/// One runnable scenario
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    run: fn(&Registry) -> Result<Value>,
}

impl Scenario {
    pub fn run(
        &self,
        registry: &Registry,
    ) -> Result<Value> {
        info!("running scenario `{}`", self.name);
        (self.run)(registry)
    }
}

static SCENARIOS: [Scenario; 5] = [
    Scenario {
        name: "shapes",
        description: "area of circles and rectangles",
        run: shapes,
    },
    Scenario {
        name: "peano",
        description: "Peano naturals and shared successors",
        run: peano,
    },
    Scenario {
        name: "concat",
        description: "list concatenation by pattern rules",
        run: concat,
    },
    Scenario {
        name: "print",
        description: "printing an extended expression language",
        run: print,
    },
    Scenario {
        name: "fixpoint",
        description: "unbounded self-recursion with and without memo_fix",
        run: fixpoint,
    },
];

pub fn scenarios() -> &'static [Scenario] {
    &SCENARIOS
}

pub fn find(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.name == name)
}

fn number(value: &Value) -> Result<f64> {
    value
        .as_float()
        .ok_or_else(|| Error::handler(format!("expected a number, got {}", value)))
}

fn integer(value: &Value) -> Result<i64> {
    value
        .as_int()
        .ok_or_else(|| Error::handler(format!("expected an integer, got {}", value)))
}

fn field(
    value: &Value,
    name: &str,
) -> Result<Value> {
    value
        .as_instance()
        .ok_or_else(|| Error::handler(format!("expected an instance, got {}", value)))?
        .get(name)
}

/// Strings without their quotes, anything else as displayed
fn text(value: Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

fn shapes(registry: &Registry) -> Result<Value> {
    let shape = registry
        .declare("Shape")
        .variant("Circle", &["radius"])
        .variant("Rectangle", &["width", "height"])
        .build()?;

    let area = registry
        .define_trait("area")
        .for_data(&shape)
        .case("Circle", |_, args| {
            let r = number(&field(&args[0], "radius")?)?;
            Ok(Value::Float(PI * r * r))
        })
        .case("Rectangle", |_, args| {
            let width = number(&field(&args[0], "width")?)?;
            let height = number(&field(&args[0], "height")?)?;
            Ok(Value::Float(width * height))
        })
        .build()?;

    let circle = shape.variant("Circle")?.construct(vec![Value::Int(2)])?;
    let rect = shape
        .variant("Rectangle")?
        .construct(vec![Value::Int(2), Value::Int(3)])?;

    Ok(Value::list([
        area.call(&[circle.into()])?,
        area.call(&[rect.into()])?,
    ]))
}

fn peano(registry: &Registry) -> Result<Value> {
    let nat = registry
        .declare("Peano")
        .variant("Zero", &[])
        .variant("Succ", &["pred"])
        .build()?;

    let value = registry
        .define_trait("value")
        .for_data(&nat)
        .case("Zero", |_, _| Ok(Value::Int(0)))
        .case("Succ", |d, args| {
            let n = d.recur(&[field(&args[0], "pred")?])?;
            Ok(Value::Int(integer(&n)? + 1))
        })
        .build()?;

    let succ = nat.variant("Succ")?;
    let zero = nat.unit("Zero")?;
    let one = succ.construct(vec![zero.clone()])?;
    let two = succ.construct(vec![one.clone().into()])?;
    let shared = one.ptr_eq(&succ.construct(vec![zero])?);

    Ok(Value::list([value.call(&[two.into()])?, Value::Bool(shared)]))
}

fn concat(registry: &Registry) -> Result<Value> {
    let list = registry
        .declare("List")
        .variant("Nil", &[])
        .variant("Cons", &["head", "tail"])
        .build()?;
    let cons = list.variant("Cons")?.clone();
    let nil = list.unit("Nil")?;

    let rules = {
        let cons = cons.clone();
        PatternCases::builder()
            .rule(vec![Pattern::Wildcard, Pattern::Wildcard], move |d, args| {
                let rest = d.recur(&[field(&args[0], "tail")?, args[1].clone()])?;
                Ok(cons.construct(vec![field(&args[0], "head")?, rest])?.into())
            })
            .build()?
    };
    let concat = registry
        .define_trait("concat")
        .for_data(&list)
        .case("Nil", |_, args| Ok(args.get(1).cloned().unwrap_or_default()))
        .rules("Cons", rules)
        .build()?;

    let from = |items: &[i64]| -> Result<Value> {
        items.iter().rev().try_fold(nil.clone(), |tail, &head| -> Result<Value> {
            Ok(cons.construct(vec![Value::Int(head), tail])?.into())
        })
    };

    let joined = concat.call(&[from(&[1, 2])?, from(&[3])?])?;
    let expected = from(&[1, 2, 3])?;
    Ok(Value::list([joined.clone(), Value::Bool(joined == expected)]))
}

fn print(registry: &Registry) -> Result<Value> {
    let int_exp = registry
        .declare("IntExp")
        .variant("Lit", &["value"])
        .variant("Add", &["left", "right"])
        .build()?;
    let int_bool_exp = registry
        .declare("IntBoolExp")
        .extends(&int_exp)
        .variant("Bool", &["value"])
        .variant("Iff", &["pred", "ifTrue", "ifFalse"])
        .build()?;

    let int_print = registry
        .define_trait("print")
        .for_data(&int_exp)
        .case("Lit", |_, args| Ok(Value::str(&text(field(&args[0], "value")?))))
        .case("Add", |d, args| {
            let left = text(d.recur(&[field(&args[0], "left")?])?);
            let right = text(d.recur(&[field(&args[0], "right")?])?);
            Ok(Value::from(format!("({} + {})", left, right)))
        })
        .build()?;
    let int_bool_print = registry
        .define_trait("print")
        .for_data(&int_bool_exp)
        .extends(&int_print)
        .case("Bool", |_, args| Ok(Value::str(&text(field(&args[0], "value")?))))
        .case("Iff", |d, args| {
            let part = |name: &str| -> Result<String> { Ok(text(d.recur(&[field(&args[0], name)?])?)) };
            Ok(Value::from(format!(
                "({} ? {} : {})",
                part("pred")?,
                part("ifTrue")?,
                part("ifFalse")?
            )))
        })
        .build()?;

    let lit = int_bool_exp.variant("Lit")?;
    let expr = int_bool_exp.variant("Iff")?.construct(vec![
        int_bool_exp
            .variant("Bool")?
            .construct(vec![Value::Bool(true)])?
            .into(),
        lit.construct(vec![Value::Int(1)])?.into(),
        lit.construct(vec![Value::Int(2)])?.into(),
    ])?;
    int_bool_print.call(&[expr.into()])
}

fn fixpoint(registry: &Registry) -> Result<Value> {
    let unit = registry.declare("Loop").variant("Again", &[]).build()?;
    let forever = registry
        .define_trait("forever")
        .for_data(&unit)
        .case("Again", |d, args| d.recur(args))
        .build()?;

    let again = unit.unit("Again")?;
    let direct = match forever.call(&[again.clone()]) {
        Ok(value) => value,
        Err(e) => Value::from(e.to_string()),
    };
    let memoized = registry.memo_fix(&forever, "bottom").call(&[again])?;

    Ok(Value::record([("direct", direct), ("memoized", memoized)]))
}
