//! Variant instances
//!
//! An instance is an immutable `(tag, field values)` record. Instances are
//! only created through canonical construction, so two live instances with the
//! same tag and pairwise-equal fields are always the same allocation.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;

use crate::adt::Tag;
use crate::error::{ConstructionError, Error, Result};
use crate::runtime::value::{Value, WeakValue};

pub(crate) struct InstanceData {
    tag: Tag,
    fields: Box<[Value]>,
}

impl Drop for InstanceData {
    // Unwinds chains of uniquely owned instances with an explicit stack so
    // long structures do not drop recursively.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.fields).into_vec();
        while let Some(value) = pending.pop() {
            if let Value::Instance(Instance(arc)) = value {
                if let Some(mut data) = Arc::into_inner(arc) {
                    pending.extend(std::mem::take(&mut data.fields).into_vec());
                }
            }
        }
    }
}

/// Canonical variant instance
#[derive(Clone)]
pub struct Instance(Arc<InstanceData>);

impl Instance {
    pub(crate) fn new(
        tag: Tag,
        fields: Vec<Value>,
    ) -> Self {
        Self(Arc::new(InstanceData {
            tag,
            fields: fields.into_boxed_slice(),
        }))
    }

    /// Variant tag
    pub fn tag(&self) -> &Tag {
        &self.0.tag
    }

    /// Variant name
    pub fn name(&self) -> &str {
        self.0.tag.name()
    }

    /// Number of fields
    pub fn arity(&self) -> usize {
        self.0.fields.len()
    }

    /// Read a field by name, evaluating lazy accessors
    pub fn get(
        &self,
        field: &str,
    ) -> Result<Value> {
        match self.0.tag.field_index(field) {
            Some(index) => self.read(index),
            None => Err(ConstructionError::UnknownField {
                variant: self.name().to_string(),
                field: field.to_string(),
            }
            .into()),
        }
    }

    /// Read a field by position, evaluating lazy accessors
    pub fn field_at(
        &self,
        index: usize,
    ) -> Result<Value> {
        if index >= self.arity() {
            return Err(ConstructionError::UnknownField {
                variant: self.name().to_string(),
                field: format!("#{}", index),
            }
            .into());
        }
        self.read(index)
    }

    /// Iterate over every field in declaration order
    ///
    /// Lazy accessors are evaluated; function-valued fields are yielded like
    /// any other value.
    pub fn fields(&self) -> impl Iterator<Item = Result<Value>> + '_ {
        (0..self.arity()).map(move |index| self.read(index))
    }

    /// Iterate over `(name, value)` pairs in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (&str, Result<Value>)> + '_ {
        self.0
            .tag
            .fields()
            .iter()
            .enumerate()
            .map(move |(index, name)| (&**name, self.read(index)))
    }

    /// Stored field values, lazy accessors unevaluated
    pub fn raw_fields(&self) -> &[Value] {
        &self.0.fields
    }

    /// Identity comparison
    pub fn ptr_eq(
        &self,
        other: &Instance,
    ) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Non-owning handle
    pub fn downgrade(&self) -> WeakInstance {
        WeakInstance(Arc::downgrade(&self.0))
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    fn read(
        &self,
        index: usize,
    ) -> Result<Value> {
        match &self.0.fields[index] {
            Value::Lazy(lazy) => lazy.force().map_err(|e| self.annotate(index, e)),
            value => Ok(value.clone()),
        }
    }

    /// Fill in the location of an unresolved lazy field raised by a knot
    fn annotate(
        &self,
        index: usize,
        error: Error,
    ) -> Error {
        match error {
            Error::Construction(ConstructionError::UnresolvedField {
                variant,
                field: _,
                reason,
            }) if variant.is_empty() => ConstructionError::UnresolvedField {
                variant: self.name().to_string(),
                field: self.0.tag.fields()[index].to_string(),
                reason,
            }
            .into(),
            other => other,
        }
    }
}

impl PartialEq for Instance {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Instance {}

impl Hash for Instance {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.addr().hash(state);
    }
}

impl fmt::Display for Instance {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.0.fields.is_empty() {
            return write!(f, "{}", self.name());
        }
        let fields: Vec<String> = self.0.fields.iter().map(|v| v.to_string()).collect();
        write!(f, "{}({})", self.name(), fields.join(", "))
    }
}

impl fmt::Debug for Instance {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Weak handle to an instance
#[derive(Clone)]
pub struct WeakInstance(Weak<InstanceData>);

impl WeakInstance {
    /// Recover the instance if it is still alive
    pub fn upgrade(&self) -> Option<Instance> {
        self.0.upgrade().map(Instance)
    }

    /// Whether the instance is still alive
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for WeakInstance {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.upgrade() {
            Some(instance) => write!(f, "(Weak {})", instance),
            None => write!(f, "(Weak dead)"),
        }
    }
}

// ============================================================================
// Tied knots
// ============================================================================

/// Placeholder for a value that does not exist yet
///
/// Self-referential structures are built in two phases: construct the
/// children with lazy fields reading the knot ([`Knot::lazy`]), construct the
/// root, then [`Knot::tie`] the root. The knot holds its target weakly, so a
/// tied cycle is freed once the last outside reference goes away.
#[derive(Clone, Default)]
pub struct Knot(Arc<OnceCell<WeakValue>>);

impl Knot {
    /// Create an untied knot
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the knot at its value; a knot can be tied once
    pub fn tie(
        &self,
        value: &Value,
    ) -> Result<()> {
        self.0
            .set(value.downgrade())
            .map_err(|_| ConstructionError::KnotAlreadyTied.into())
    }

    /// Whether the knot has been tied
    pub fn is_tied(&self) -> bool {
        self.0.get().is_some()
    }

    /// Current target of the knot
    pub fn get(&self) -> Result<Value> {
        let target = self.0.get().ok_or_else(|| unresolved("knot is not tied yet"))?;
        target
            .upgrade()
            .ok_or_else(|| unresolved("knot target was dropped"))
    }

    /// Lazy field value reading this knot
    pub fn lazy(&self) -> Value {
        let knot = self.clone();
        Value::lazy(move || knot.get())
    }
}

fn unresolved(reason: &str) -> Error {
    ConstructionError::UnresolvedField {
        variant: String::new(),
        field: String::new(),
        reason: reason.to_string(),
    }
    .into()
}
