//! Shape predicates
//!
//! Pure, stateless checks consumed by declaration and construction.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::runtime::value::Value;

static CAPITALIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").expect("capitalized identifier pattern"));

static CAMEL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][A-Za-z0-9]*$").expect("camelCase identifier pattern"));

/// `Circle`, `IntExp`, `V2`
pub fn is_capitalized_identifier(name: &str) -> bool {
    CAPITALIZED.is_match(name)
}

/// `radius`, `ifTrue`, `x1`
pub fn is_camel_case_identifier(name: &str) -> bool {
    CAMEL_CASE.is_match(name)
}

/// Plain keyed record, as opposed to any other value
pub fn is_structural_record(value: &Value) -> bool {
    matches!(value, Value::Record(_))
}

/// Return early with `$err` converted into the caller's error type unless
/// `$cond` holds
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err.into());
        }
    };
}
