//! Composition facades
//!
//! A [`Facade`] binds one data declaration to a set of named traits. Its
//! constructors produce [`View`]s: read-only projections of an instance
//! exposing the instance's fields plus one bound method per trait.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::adt::{DataDeclaration, Instance, Variant};
use crate::ensure;
use crate::error::{CompositionError, Result};
use crate::runtime::value::{Record, Value};
use crate::traits::Trait;

struct FacadeInner {
    data: DataDeclaration,
    traits: IndexMap<Arc<str>, Trait>,
}

/// Declaration plus bound traits
#[derive(Clone)]
pub struct Facade(Arc<FacadeInner>);

impl Facade {
    pub(crate) fn new<I>(
        data: &DataDeclaration,
        traits: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = Trait>,
    {
        let mut bound: IndexMap<Arc<str>, Trait> = IndexMap::new();
        for t in traits {
            ensure!(
                !bound.contains_key(t.name()),
                CompositionError::DuplicateMember {
                    member: t.name().to_string(),
                }
            );
            if let Some(variant) = data
                .variants()
                .find(|v| v.tag().field_index(t.name()).is_some())
            {
                return Err(CompositionError::NameClash {
                    trait_name: t.name().to_string(),
                    variant: variant.name().to_string(),
                }
                .into());
            }
            bound.insert(Arc::from(t.name()), t);
        }

        debug!(
            "composed {} with [{}]",
            data.name(),
            bound.keys().map(|k| &**k).collect::<Vec<_>>().join(", ")
        );
        Ok(Self(Arc::new(FacadeInner {
            data: data.clone(),
            traits: bound,
        })))
    }

    pub fn data(&self) -> &DataDeclaration {
        &self.0.data
    }

    pub fn trait_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.traits.keys().map(|k| &**k)
    }

    pub fn get_trait(
        &self,
        name: &str,
    ) -> Option<&Trait> {
        self.0.traits.get(name)
    }

    /// Constructor bound to this facade
    pub fn variant(
        &self,
        name: &str,
    ) -> Result<BoundVariant> {
        Ok(BoundVariant {
            facade: self.clone(),
            variant: self.0.data.variant(name)?.clone(),
        })
    }

    /// View of a singleton variant
    pub fn unit(
        &self,
        name: &str,
    ) -> Result<View> {
        let instance = self.0.data.variant(name)?.singleton()?;
        Ok(self.view(instance))
    }

    /// View an existing instance of the declaration
    pub fn wrap(
        &self,
        value: &Value,
    ) -> Result<View> {
        match value.as_instance() {
            Some(instance) if self.0.data.contains_tag(instance.tag()) => {
                Ok(self.view(instance.clone()))
            }
            _ => Err(CompositionError::ForeignInstance {
                value: value.to_string(),
            }
            .into()),
        }
    }

    fn view(
        &self,
        instance: Instance,
    ) -> View {
        View {
            facade: self.clone(),
            instance,
        }
    }
}

impl fmt::Debug for Facade {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Facade")
            .field("data", &self.0.data.name())
            .field("traits", &self.trait_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Variant constructor that yields views
#[derive(Clone)]
pub struct BoundVariant {
    facade: Facade,
    variant: Variant,
}

impl BoundVariant {
    pub fn name(&self) -> &str {
        self.variant.name()
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn construct(
        &self,
        args: Vec<Value>,
    ) -> Result<View> {
        Ok(self.facade.view(self.variant.construct(args)?))
    }

    pub fn construct_keyed(
        &self,
        record: &Record,
    ) -> Result<View> {
        Ok(self.facade.view(self.variant.construct_keyed(record)?))
    }

    pub fn apply(
        &self,
        args: &[Value],
    ) -> Result<View> {
        Ok(self.facade.view(self.variant.apply(args)?))
    }
}

impl fmt::Debug for BoundVariant {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "BoundVariant({})", self.variant.tag())
    }
}

/// Read-only projection of an instance
#[derive(Clone)]
pub struct View {
    facade: Facade,
    instance: Instance,
}

/// What a view member name refers to
#[derive(Debug, Clone)]
pub enum Member {
    Field(Value),
    Method(Method),
}

/// Trait bound to a receiver
#[derive(Clone)]
pub struct Method {
    method: Trait,
    receiver: Value,
}

impl Method {
    pub fn name(&self) -> &str {
        self.method.name()
    }

    /// Call with the receiver prepended to `args`
    pub fn call(
        &self,
        args: &[Value],
    ) -> Result<Value> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(self.receiver.clone());
        full.extend_from_slice(args);
        self.method.call(&full)
    }
}

impl fmt::Debug for Method {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}.{}", self.receiver, self.method.name())
    }
}

impl View {
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn value(&self) -> Value {
        Value::Instance(self.instance.clone())
    }

    pub fn name(&self) -> &str {
        self.instance.name()
    }

    pub fn facade(&self) -> &Facade {
        &self.facade
    }

    /// Field value
    pub fn get(
        &self,
        field: &str,
    ) -> Result<Value> {
        self.instance.get(field)
    }

    /// Field or bound trait method named `name`
    pub fn member(
        &self,
        name: &str,
    ) -> Result<Member> {
        if self.instance.tag().field_index(name).is_some() {
            return Ok(Member::Field(self.instance.get(name)?));
        }
        match self.facade.0.traits.get(name) {
            Some(method) => Ok(Member::Method(self.bind(method)?)),
            None => Err(CompositionError::UnknownMember {
                variant: self.name().to_string(),
                member: name.to_string(),
            }
            .into()),
        }
    }

    /// Bound method named `name`
    pub fn method(
        &self,
        name: &str,
    ) -> Result<Method> {
        match self.member(name)? {
            Member::Method(method) => Ok(method),
            Member::Field(_) => Err(CompositionError::UnknownMember {
                variant: self.name().to_string(),
                member: name.to_string(),
            }
            .into()),
        }
    }

    /// Call trait `name` with this view's instance as receiver
    pub fn call(
        &self,
        name: &str,
        args: &[Value],
    ) -> Result<Value> {
        self.method(name)?.call(args)
    }

    /// Views are read-only; always fails
    pub fn assign(
        &self,
        member: &str,
        _value: Value,
    ) -> Result<()> {
        Err(CompositionError::ReadOnly {
            member: member.to_string(),
        }
        .into())
    }

    /// Views are read-only; always fails
    pub fn remove(
        &self,
        member: &str,
    ) -> Result<()> {
        Err(CompositionError::ReadOnly {
            member: member.to_string(),
        }
        .into())
    }

    fn bind(
        &self,
        method: &Trait,
    ) -> Result<Method> {
        ensure!(
            method.resolves(self.name()),
            CompositionError::MissingCase {
                trait_name: method.name().to_string(),
                variant: self.name().to_string(),
            }
        );
        Ok(Method {
            method: method.clone(),
            receiver: self.value(),
        })
    }
}

impl PartialEq for View {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.instance == other.instance
    }
}

impl fmt::Display for View {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.instance)
    }
}

impl fmt::Debug for View {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "View({})", self.instance)
    }
}
