//! Runtime value type system for complect
//!
//! This module implements `Value`, the unified representation of everything a
//! variant field, trait argument or trait result can hold. Equality follows
//! two rules:
//! - Primitives (null, booleans, numbers, strings, symbols) compare by value
//! - Reference values (lists, records, functions, lazy thunks, instances)
//!   compare by identity
//!
//! Canonical construction relies on these rules: two constructions are the
//! same instance exactly when their field values are pairwise equal here.

use std::fmt;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;

use crate::adt::{Instance, WeakInstance};
use crate::error::Result;

/// Keyed record: ordered map from field name to value
pub type Record = IndexMap<Arc<str>, Value>;

/// Native function body
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

/// Deferred field body, evaluated on every read
pub type Thunk = dyn Fn() -> Result<Value> + Send + Sync;

/// Kind of a value, used by kind patterns and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    BigInt,
    Float,
    Str,
    Symbol,
    List,
    Record,
    Func,
    Lazy,
    Instance,
}

impl fmt::Display for ValueKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::BigInt => "bigint",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
            ValueKind::Symbol => "symbol",
            ValueKind::List => "list",
            ValueKind::Record => "record",
            ValueKind::Func => "function",
            ValueKind::Lazy => "lazy",
            ValueKind::Instance => "instance",
        };
        f.write_str(name)
    }
}

/// Symbolic token, equal to every other symbol with the same name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Create a symbol
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Symbol name
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Function value
///
/// Unlabeled functions are compared by identity. A function carrying a source
/// label is compared by that label, so textually identical function literals
/// are interchangeable as keys and field values.
#[derive(Clone)]
pub struct Func {
    body: Arc<NativeFn>,
    source: Option<Arc<str>>,
}

impl Func {
    /// Create an anonymous function compared by identity
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
            source: None,
        }
    }

    /// Create a function compared by its source text
    pub fn labeled<F>(
        source: &str,
        body: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
            source: Some(Arc::from(source)),
        }
    }

    /// Invoke the function
    pub fn call(
        &self,
        args: &[Value],
    ) -> Result<Value> {
        (self.body)(args)
    }

    /// Source label, if any
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Identity comparison, ignoring labels
    pub fn ptr_eq(
        &self,
        other: &Func,
    ) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.body) as *const () as usize
    }

    pub(crate) fn downgrade(&self) -> Weak<NativeFn> {
        Arc::downgrade(&self.body)
    }
}

impl fmt::Debug for Func {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "<fn {}>", source),
            None => write!(f, "<fn@{:#x}>", self.addr()),
        }
    }
}

/// Computed field accessor
///
/// A `Lazy` stored in a variant field is evaluated on every read of that
/// field instead of being returned verbatim.
#[derive(Clone)]
pub struct Lazy(Arc<Thunk>);

impl Lazy {
    /// Create a lazy accessor
    pub fn new<F>(thunk: F) -> Self
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(thunk))
    }

    /// Evaluate the accessor
    pub fn force(&self) -> Result<Value> {
        (self.0)()
    }

    /// Identity comparison
    pub fn ptr_eq(
        &self,
        other: &Lazy,
    ) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub(crate) fn downgrade(&self) -> Weak<Thunk> {
        Arc::downgrade(&self.0)
    }
}

impl fmt::Debug for Lazy {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "<lazy@{:#x}>", self.addr())
    }
}

/// Runtime value - unified representation of all complect values
///
/// # Design Principles
/// - Uses `enum` for easy pattern matching
/// - `Arc` for shared ownership of every reference value
/// - Cloning a value never copies a reference value's contents
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,

    /// Boolean
    Bool(bool),

    /// Integer
    Int(i64),

    /// Big integer
    BigInt(i128),

    /// Float
    Float(f64),

    /// String (shared string, Arc<str>)
    Str(Arc<str>),

    /// Symbolic token
    Symbol(Symbol),

    /// Ordered list
    List(Arc<[Value]>),

    /// Keyed record
    Record(Arc<Record>),

    /// Function
    Func(Func),

    /// Computed field accessor
    Lazy(Lazy),

    /// Variant instance
    Instance(Instance),
}

// ============================================================================
// Construction Helpers
// ============================================================================

impl Value {
    /// Build a string value
    pub fn str(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }

    /// Build a symbol value
    pub fn symbol(name: &str) -> Self {
        Value::Symbol(Symbol::new(name))
    }

    /// Build a list value
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Value::List(items.into_iter().collect())
    }

    /// Build a keyed record value
    pub fn record<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        Value::Record(Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (Arc::from(k), v))
                .collect(),
        ))
    }

    /// Build a function value
    pub fn func<F>(body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Value::Func(Func::new(body))
    }

    /// Build a lazy accessor value
    pub fn lazy<F>(thunk: F) -> Self
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        Value::Lazy(Lazy::new(thunk))
    }
}

// ============================================================================
// Type Query Methods
// ============================================================================

impl Value {
    /// Get the kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::BigInt(_) => ValueKind::BigInt,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Symbol(_) => ValueKind::Symbol,
            Value::List(_) => ValueKind::List,
            Value::Record(_) => ValueKind::Record,
            Value::Func(_) => ValueKind::Func,
            Value::Lazy(_) => ValueKind::Lazy,
            Value::Instance(_) => ValueKind::Instance,
        }
    }

    /// Whether this value is compared by identity
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Value::List(_) | Value::Record(_) | Value::Func(_) | Value::Lazy(_) | Value::Instance(_)
        )
    }

    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert to bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert to i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert to f64 (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Borrow a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow list items
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow a record
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Borrow a function
    pub fn as_func(&self) -> Option<&Func> {
        match self {
            Value::Func(f) => Some(f),
            _ => None,
        }
    }

    /// Borrow a variant instance
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(i) => Some(i),
            _ => None,
        }
    }

    /// Variant name of an instance
    pub fn variant_name(&self) -> Option<&str> {
        self.as_instance().map(|i| i.name())
    }

    /// Non-owning form of this value
    pub fn downgrade(&self) -> WeakValue {
        match self {
            Value::List(items) => WeakValue::List(Arc::downgrade(items)),
            Value::Record(r) => WeakValue::Record(Arc::downgrade(r)),
            Value::Func(f) => WeakValue::Func {
                body: f.downgrade(),
                source: f.source.clone(),
            },
            Value::Lazy(l) => WeakValue::Lazy(l.downgrade()),
            Value::Instance(i) => WeakValue::Instance(i.downgrade()),
            primitive => WeakValue::Plain(primitive.clone()),
        }
    }
}

// ============================================================================
// Equality
// ============================================================================

impl PartialEq for Value {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Record(a), Value::Record(b)) => Arc::ptr_eq(a, b),
            (Value::Func(a), Value::Func(b)) => match (&a.source, &b.source) {
                (Some(x), Some(y)) => x == y,
                _ => a.ptr_eq(b),
            },
            (Value::Lazy(a), Value::Lazy(b)) => a.ptr_eq(b),
            (Value::Instance(a), Value::Instance(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

// ============================================================================
// Weak Values
// ============================================================================

/// Non-owning counterpart of [`Value`]
///
/// Primitives are kept as-is; reference values are downgraded and can be
/// collected while only weak values point at them.
#[derive(Debug, Clone)]
pub enum WeakValue {
    Plain(Value),
    List(Weak<[Value]>),
    Record(Weak<Record>),
    Func {
        body: Weak<NativeFn>,
        source: Option<Arc<str>>,
    },
    Lazy(Weak<Thunk>),
    Instance(WeakInstance),
}

impl WeakValue {
    /// Recover the value if it is still alive
    pub fn upgrade(&self) -> Option<Value> {
        match self {
            WeakValue::Plain(v) => Some(v.clone()),
            WeakValue::List(w) => w.upgrade().map(Value::List),
            WeakValue::Record(w) => w.upgrade().map(Value::Record),
            WeakValue::Func { body, source } => body.upgrade().map(|body| {
                Value::Func(Func {
                    body,
                    source: source.clone(),
                })
            }),
            WeakValue::Lazy(w) => w.upgrade().map(|t| Value::Lazy(Lazy(t))),
            WeakValue::Instance(w) => w.upgrade().map(Value::Instance),
        }
    }

    /// Whether the referent is still alive
    pub fn is_alive(&self) -> bool {
        match self {
            WeakValue::Plain(_) => true,
            WeakValue::List(w) => w.strong_count() > 0,
            WeakValue::Record(w) => w.strong_count() > 0,
            WeakValue::Func { body, .. } => body.strong_count() > 0,
            WeakValue::Lazy(w) => w.strong_count() > 0,
            WeakValue::Instance(w) => w.is_alive(),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i128> for Value {
    fn from(i: i128) -> Self {
        Value::BigInt(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}

impl From<Func> for Value {
    fn from(f: Func) -> Self {
        Value::Func(f)
    }
}

impl From<Lazy> for Value {
    fn from(l: Lazy) -> Self {
        Value::Lazy(l)
    }
}

impl From<Instance> for Value {
    fn from(i: Instance) -> Self {
        Value::Instance(i)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items.into())
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(Arc::new(r))
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(", ")
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::BigInt(i) => write!(f, "{}n", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Symbol(s) => write!(f, ":{}", s.name()),
            Value::List(items) => write!(f, "[{}]", join(items.iter().map(|v| v.to_string()))),
            Value::Record(r) => write!(
                f,
                "{{{}}}",
                join(r.iter().map(|(k, v)| format!("{}: {}", k, v)))
            ),
            Value::Func(func) => write!(f, "{:?}", func),
            Value::Lazy(_) => write!(f, "<lazy>"),
            Value::Instance(i) => write!(f, "{}", i),
        }
    }
}
