//! Data declarations
//!
//! A [`DataDeclaration`] is a frozen, ordered set of variants. Declarations are
//! built with a [`DataBuilder`] obtained from
//! [`Registry::declare`](crate::registry::Registry::declare) and may extend a
//! base declaration, inheriting its variants (and so its instances) unchanged.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::adt::{DeclId, Instance, Tag};
use crate::ensure;
use crate::error::{ConstructionError, DeclarationError, Result};
use crate::pattern::Pattern;
use crate::registry::Shared;
use crate::runtime::value::{Record, Value};
use crate::util::predicates::{
    is_camel_case_identifier, is_capitalized_identifier, is_structural_record,
};

// ============================================================================
// Variants
// ============================================================================

/// One variant of a declaration: its tag plus its constructor
#[derive(Clone)]
pub struct Variant {
    tag: Tag,
    singleton: Option<Instance>,
    shared: Arc<Shared>,
}

impl Variant {
    fn new(
        tag: Tag,
        shared: Arc<Shared>,
    ) -> Result<Self> {
        let singleton = if tag.is_singleton() {
            Some(shared.canonicalize(&tag, Vec::new())?)
        } else {
            None
        };
        Ok(Self {
            tag,
            singleton,
            shared,
        })
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn name(&self) -> &str {
        self.tag.name()
    }

    pub fn fields(&self) -> &[Arc<str>] {
        self.tag.fields()
    }

    pub fn arity(&self) -> usize {
        self.tag.arity()
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton.is_some()
    }

    /// The unique instance of a zero-field variant
    pub fn singleton(&self) -> Result<Instance> {
        self.singleton.clone().ok_or_else(|| {
            ConstructionError::NotASingleton {
                variant: self.name().to_string(),
            }
            .into()
        })
    }

    /// Construct from positional arguments
    pub fn construct(
        &self,
        args: Vec<Value>,
    ) -> Result<Instance> {
        ensure!(
            args.len() == self.arity(),
            ConstructionError::ArgumentCount {
                variant: self.name().to_string(),
                expected: self.arity(),
                found: args.len(),
            }
        );
        self.shared.canonicalize(&self.tag, args)
    }

    /// Construct from a record holding exactly the declared field names
    pub fn construct_keyed(
        &self,
        record: &Record,
    ) -> Result<Instance> {
        if let Some(extra) = record.keys().find(|k| self.tag.field_index(k).is_none()) {
            return Err(ConstructionError::UnknownField {
                variant: self.name().to_string(),
                field: extra.to_string(),
            }
            .into());
        }
        let mut args = Vec::with_capacity(self.arity());
        for field in self.fields() {
            match record.get(field) {
                Some(value) => args.push(value.clone()),
                None => {
                    return Err(ConstructionError::MissingField {
                        variant: self.name().to_string(),
                        field: field.to_string(),
                    }
                    .into())
                }
            }
        }
        self.shared.canonicalize(&self.tag, args)
    }

    /// Construct from either argument form
    ///
    /// A single record argument is read as keyed arguments when the variant
    /// has several fields, or when its one field name is among the keys.
    /// Anything else is positional.
    pub fn apply(
        &self,
        args: &[Value],
    ) -> Result<Instance> {
        if let [single] = args {
            if is_structural_record(single) {
                if let Some(record) = single.as_record().filter(|r| self.reads_as_keyed(r)) {
                    return self.construct_keyed(record);
                }
            }
        }
        self.construct(args.to_vec())
    }

    /// Pattern matching instances of this variant field by field
    pub fn pattern(
        &self,
        fields: Vec<Pattern>,
    ) -> Result<Pattern> {
        ensure!(
            fields.len() == self.arity(),
            DeclarationError::WrongFieldCount {
                variant: self.name().to_string(),
                expected: self.arity(),
                found: fields.len(),
            }
        );
        Ok(Pattern::Variant {
            tag: self.tag.clone(),
            fields,
        })
    }

    fn reads_as_keyed(
        &self,
        record: &Record,
    ) -> bool {
        match self.fields() {
            [] => false,
            [only] => record.contains_key(only),
            _ => true,
        }
    }
}

impl fmt::Debug for Variant {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Variant({})", self.tag)
    }
}

// ============================================================================
// Declarations
// ============================================================================

struct DataInner {
    id: DeclId,
    name: Arc<str>,
    variants: IndexMap<Arc<str>, Variant>,
    base: Option<DataDeclaration>,
}

/// Frozen set of variants
#[derive(Clone)]
pub struct DataDeclaration(Arc<DataInner>);

impl DataDeclaration {
    pub fn id(&self) -> DeclId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Look up a variant, inherited ones included
    pub fn variant(
        &self,
        name: &str,
    ) -> Result<&Variant> {
        self.0.variants.get(name).ok_or_else(|| {
            ConstructionError::UnknownVariant {
                variant: name.to_string(),
            }
            .into()
        })
    }

    /// Singleton value of a zero-field variant
    pub fn unit(
        &self,
        name: &str,
    ) -> Result<Value> {
        Ok(Value::Instance(self.variant(name)?.singleton()?))
    }

    /// Variants in declaration order, base variants first
    pub fn variants(&self) -> impl Iterator<Item = &Variant> + '_ {
        self.0.variants.values()
    }

    pub fn variant_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.variants.keys().map(|k| &**k)
    }

    pub fn len(&self) -> usize {
        self.0.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.variants.is_empty()
    }

    /// Whether `tag` is one of this declaration's variants
    pub fn contains_tag(
        &self,
        tag: &Tag,
    ) -> bool {
        self.0
            .variants
            .get(tag.name())
            .is_some_and(|v| v.tag() == tag)
    }

    /// Whether `value` is an instance of one of this declaration's variants
    pub fn contains(
        &self,
        value: &Value,
    ) -> bool {
        value
            .as_instance()
            .is_some_and(|instance| self.contains_tag(instance.tag()))
    }

    pub fn base(&self) -> Option<&DataDeclaration> {
        self.0.base.as_ref()
    }

    /// Whether this declaration is `other` or extends it, directly or not
    pub fn extends(
        &self,
        other: &DataDeclaration,
    ) -> bool {
        let mut current = Some(self);
        while let Some(decl) = current {
            if decl == other {
                return true;
            }
            current = decl.base();
        }
        false
    }
}

impl PartialEq for DataDeclaration {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for DataDeclaration {}

impl fmt::Debug for DataDeclaration {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let variants: Vec<String> = self.variants().map(|v| v.tag().to_string()).collect();
        write!(f, "data {} = {}", self.name(), variants.join(" | "))
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`DataDeclaration`]
///
/// Nothing is allocated until [`DataBuilder::build`] has validated every
/// variant.
pub struct DataBuilder {
    shared: Arc<Shared>,
    name: String,
    base: Option<DataDeclaration>,
    variants: Vec<(String, Vec<String>)>,
}

impl DataBuilder {
    pub(crate) fn new(
        shared: Arc<Shared>,
        name: &str,
    ) -> Self {
        Self {
            shared,
            name: name.to_string(),
            base: None,
            variants: Vec::new(),
        }
    }

    /// Inherit every variant of `base`
    pub fn extends(
        mut self,
        base: &DataDeclaration,
    ) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Add a variant; no fields makes it a singleton
    pub fn variant(
        mut self,
        name: &str,
        fields: &[&str],
    ) -> Self {
        self.variants.push((
            name.to_string(),
            fields.iter().map(|f| f.to_string()).collect(),
        ));
        self
    }

    pub fn build(self) -> Result<DataDeclaration> {
        self.validate()?;

        let id = self.shared.next_decl();
        let mut variants: IndexMap<Arc<str>, Variant> = match &self.base {
            Some(base) => base.0.variants.clone(),
            None => IndexMap::new(),
        };
        for (name, fields) in &self.variants {
            let tag = Tag::new(self.shared.next_tag(), name, fields, id);
            let variant = Variant::new(tag, self.shared.clone())?;
            variants.insert(Arc::from(name.as_str()), variant);
        }

        let decl = DataDeclaration(Arc::new(DataInner {
            id,
            name: Arc::from(self.name.as_str()),
            variants,
            base: self.base,
        }));
        debug!("declared {:?}", decl);
        Ok(decl)
    }

    fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = self
            .base
            .iter()
            .flat_map(|base| base.variant_names())
            .collect();

        for (name, fields) in &self.variants {
            ensure!(
                is_capitalized_identifier(name),
                DeclarationError::InvalidName {
                    what: "variant",
                    name: name.clone(),
                    expected: "a capitalized identifier",
                }
            );
            ensure!(
                seen.insert(name),
                DeclarationError::DuplicateVariant {
                    variant: name.clone(),
                }
            );

            let mut field_names = HashSet::new();
            for field in fields {
                ensure!(
                    is_camel_case_identifier(field),
                    DeclarationError::InvalidName {
                        what: "field",
                        name: field.clone(),
                        expected: "a camelCase identifier",
                    }
                );
                ensure!(
                    field_names.insert(field),
                    DeclarationError::DuplicateField {
                        variant: name.clone(),
                        field: field.clone(),
                    }
                );
            }
        }
        Ok(())
    }
}
