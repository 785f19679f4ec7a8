//! Key boxing
//!
//! Every key position of the store is looked up through a [`KeyBox`].
//! Primitive values box by value, reference values box by address and keep a
//! weak handle so the store never extends their lifetime.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::adt::TagId;
use crate::runtime::value::{Symbol, Value, WeakValue};

/// Canonicalized form of one key position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyBox {
    Null,
    Bool(bool),
    Int(i64),
    BigInt(i128),
    /// Normalized bit pattern (`-0.0` folds to `0.0`, every NaN to one NaN)
    Float(u64),
    Str(Arc<str>),
    Symbol(Symbol),
    /// Function with a source label, keyed by its text
    Source(Arc<str>),
    /// Variant tag discriminant
    Tag(TagId),
    Ref(RefKey),
}

impl KeyBox {
    /// Box a value for lookup
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => KeyBox::Null,
            Value::Bool(b) => KeyBox::Bool(*b),
            Value::Int(i) => KeyBox::Int(*i),
            Value::BigInt(i) => KeyBox::BigInt(*i),
            Value::Float(f) => KeyBox::Float(float_bits(*f)),
            Value::Str(s) => KeyBox::Str(s.clone()),
            Value::Symbol(s) => KeyBox::Symbol(s.clone()),
            Value::Func(f) => match f.source() {
                Some(source) => KeyBox::Source(Arc::from(source)),
                None => KeyBox::Ref(RefKey::new(f.addr(), value)),
            },
            Value::List(items) => {
                KeyBox::Ref(RefKey::new(Arc::as_ptr(items) as *const () as usize, value))
            }
            Value::Record(r) => KeyBox::Ref(RefKey::new(Arc::as_ptr(r) as usize, value)),
            Value::Lazy(l) => KeyBox::Ref(RefKey::new(l.addr(), value)),
            Value::Instance(i) => KeyBox::Ref(RefKey::new(i.addr(), value)),
        }
    }

    /// Address of a reference key
    pub(crate) fn addr(&self) -> Option<usize> {
        match self {
            KeyBox::Ref(r) => Some(r.addr),
            _ => None,
        }
    }

    /// Whether the boxed key can still be presented by a caller
    pub fn is_alive(&self) -> bool {
        match self {
            KeyBox::Ref(r) => r.weak.is_alive(),
            _ => true,
        }
    }
}

fn float_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0.0f64.to_bits()
    } else {
        f.to_bits()
    }
}

/// Identity key of a reference value
///
/// Equality and hashing use the address only. The weak handle keeps the
/// allocation (not the value) reserved, so an address can never be reused by
/// a different live value while the key exists.
#[derive(Debug, Clone)]
pub struct RefKey {
    addr: usize,
    weak: WeakValue,
}

impl RefKey {
    fn new(
        addr: usize,
        value: &Value,
    ) -> Self {
        Self {
            addr,
            weak: value.downgrade(),
        }
    }
}

impl PartialEq for RefKey {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.addr == other.addr
    }
}

impl Eq for RefKey {}

impl Hash for RefKey {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.addr.hash(state);
    }
}
