//! Variant tags
//!
//! A tag is the runtime identity of one variant: a registry-unique
//! discriminant plus the variant's name and ordered field names. Tags compare
//! by allocation, so tags from different registries never match even when
//! their discriminants coincide.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Registry-unique variant discriminant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(pub u32);

/// Registry-unique declaration id
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

struct TagInfo {
    id: TagId,
    name: Arc<str>,
    fields: Box<[Arc<str>]>,
    owner: DeclId,
}

/// Identity of one variant
#[derive(Clone)]
pub struct Tag(Arc<TagInfo>);

impl Tag {
    pub(crate) fn new(
        id: TagId,
        name: &str,
        fields: &[String],
        owner: DeclId,
    ) -> Self {
        Self(Arc::new(TagInfo {
            id,
            name: Arc::from(name),
            fields: fields.iter().map(|f| Arc::from(f.as_str())).collect(),
            owner,
        }))
    }

    /// Discriminant
    pub fn id(&self) -> TagId {
        self.0.id
    }

    /// Variant name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Field names in declaration order
    pub fn fields(&self) -> &[Arc<str>] {
        &self.0.fields
    }

    /// Number of fields
    pub fn arity(&self) -> usize {
        self.0.fields.len()
    }

    /// Whether the variant has no fields
    pub fn is_singleton(&self) -> bool {
        self.0.fields.is_empty()
    }

    /// Position of a field
    pub fn field_index(
        &self,
        field: &str,
    ) -> Option<usize> {
        self.0.fields.iter().position(|f| &**f == field)
    }

    /// Declaration that introduced this variant
    pub fn owner(&self) -> DeclId {
        self.0.owner
    }
}

impl PartialEq for Tag {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for Tag {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}#{}", self.name(), self.id().0)
    }
}

impl fmt::Display for Tag {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.is_singleton() {
            write!(f, "{}", self.name())
        } else {
            let fields: Vec<&str> = self.fields().iter().map(|f| &**f).collect();
            write!(f, "{}({})", self.name(), fields.join(", "))
        }
    }
}
