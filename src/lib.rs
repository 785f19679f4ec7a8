//! complect
//!
//! Open algebraic data types with canonical instances and tag-dispatched
//! traits.
//!
//! Variants are declared once and extended without modification; traits
//! attach operations to them from the outside and can override each other.
//! Structurally equal constructions share one instance, so identity
//! comparison doubles as structural equality.
//!
//! # Example
//!
//! ```rust
//! use complect::{Registry, Value};
//!
//! fn main() -> complect::Result<()> {
//!     let registry = Registry::new();
//!     let nat = registry
//!         .declare("Peano")
//!         .variant("Zero", &[])
//!         .variant("Succ", &["pred"])
//!         .build()?;
//!
//!     let value = registry
//!         .define_trait("value")
//!         .for_data(&nat)
//!         .case("Zero", |_, _| Ok(Value::Int(0)))
//!         .case("Succ", |d, args| {
//!             let pred = args[0].as_instance().unwrap().get("pred")?;
//!             Ok(Value::Int(d.recur(&[pred])?.as_int().unwrap() + 1))
//!         })
//!         .build()?;
//!
//!     let succ = nat.variant("Succ")?;
//!     let one = succ.construct(vec![nat.unit("Zero")?])?;
//!     assert_eq!(one, succ.construct(vec![nat.unit("Zero")?])?);
//!     assert_eq!(value.call(&[one.into()])?, Value::Int(1));
//!     Ok(())
//! }
//! ```

#![warn(rust_2018_idioms)]

// Public modules
pub mod adt;
pub mod compose;
pub mod demo;
pub mod error;
pub mod fix;
pub mod pattern;
pub mod registry;
pub mod runtime;
pub mod traits;

// Utility modules
pub mod util;

// Re-exports
pub use adt::{DataDeclaration, Instance, Knot, Tag, Variant};
pub use compose::{Facade, Member, View};
pub use error::{Error, ErrorKind, Result};
pub use fix::{memo_fix, Bottom};
pub use pattern::{unify, Pattern, PatternCases};
pub use registry::Registry;
pub use runtime::value::{Value, ValueKind};
pub use traits::{Dispatch, Trait, WILDCARD};

use tracing::debug;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = "complect";

/// Run a built-in scenario on a fresh registry
///
/// # Example
///
/// ```
/// let value = complect::run_scenario("print", complect::util::config::Config::default())?;
/// assert_eq!(value, complect::Value::str("(true ? 1 : 2)"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn run_scenario(
    name: &str,
    config: util::config::Config,
) -> anyhow::Result<Value> {
    let scenario =
        demo::find(name).ok_or_else(|| anyhow::anyhow!("Unknown scenario: {}", name))?;
    debug!("scenario `{}` with {:?}", name, config);
    let registry = Registry::with_config(config);
    Ok(scenario.run(&registry)?)
}
