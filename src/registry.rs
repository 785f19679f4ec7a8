//! Registry
//!
//! The explicit context every declaration, trait and facade is created
//! through. A registry owns the canonicalization store, hands out tag and
//! declaration ids, and carries the [`Config`] limits. Registries are cheap
//! to clone and share one state; two separate registries never share
//! instances.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::adt::{DataBuilder, DataDeclaration, DeclId, Instance, Tag, TagId};
use crate::compose::Facade;
use crate::error::Result;
use crate::fix::{self, Bottom};
use crate::runtime::intern::{InternStore, KeyBox, Retention};
use crate::runtime::value::Value;
use crate::traits::{Trait, TraitBuilder};
use crate::util::config::Config;

/// Canonical keys are `(tag, fields...)`; most variants are small
type CanonicalKey = SmallVec<[KeyBox; 8]>;

pub(crate) struct Shared {
    store: InternStore,
    config: Config,
    next_tag: AtomicU32,
    next_decl: AtomicU32,
    fresh: AtomicUsize,
}

impl Shared {
    fn new(config: Config) -> Self {
        Self {
            store: InternStore::new(Retention::Weak),
            config,
            next_tag: AtomicU32::new(0),
            next_decl: AtomicU32::new(0),
            fresh: AtomicUsize::new(0),
        }
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn next_tag(&self) -> TagId {
        TagId(self.next_tag.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn next_decl(&self) -> DeclId {
        DeclId(self.next_decl.fetch_add(1, Ordering::Relaxed))
    }

    /// Return the live instance for `(tag, fields)`, creating it if needed
    ///
    /// `fields` must already be in declaration order.
    pub(crate) fn canonicalize(
        &self,
        tag: &Tag,
        fields: Vec<Value>,
    ) -> Result<Instance> {
        let mut key = CanonicalKey::with_capacity(fields.len() + 1);
        key.push(KeyBox::Tag(tag.id()));
        key.extend(fields.iter().map(KeyBox::of));

        let new_tag = tag.clone();
        let (value, fresh) = self
            .store
            .intern_boxed(&key, move || Value::Instance(Instance::new(new_tag, fields)))?;
        let Value::Instance(instance) = value else {
            unreachable!("canonical store only holds instances");
        };

        if fresh {
            trace!("canonicalize: new {}", instance);
            self.after_fresh();
        } else {
            trace!("canonicalize: reuse {}", instance);
        }
        Ok(instance)
    }

    fn after_fresh(&self) {
        let interval = self.config.purge_interval;
        if interval == 0 {
            return;
        }
        let count = self.fresh.fetch_add(1, Ordering::Relaxed) + 1;
        if count % interval == 0 {
            let released = self.store.purge();
            debug!("canonical store sweep released {} entries", released);
        }
    }
}

/// Context for declaring data types and traits
#[derive(Clone)]
pub struct Registry {
    shared: Arc<Shared>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry with the default configuration
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a registry with explicit limits
    pub fn with_config(config: Config) -> Self {
        debug!(
            "registry created (max_depth={}, purge_interval={})",
            config.max_depth, config.purge_interval
        );
        Self {
            shared: Arc::new(Shared::new(config)),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        self.shared.config()
    }

    /// Start declaring a data type
    pub fn declare(
        &self,
        name: &str,
    ) -> DataBuilder {
        DataBuilder::new(self.shared.clone(), name)
    }

    /// Start defining a trait
    pub fn define_trait(
        &self,
        name: &str,
    ) -> TraitBuilder {
        TraitBuilder::new(name, self.shared.config().max_depth)
    }

    /// Bind a declaration and a set of traits into a facade
    pub fn compose<I>(
        &self,
        data: &DataDeclaration,
        traits: I,
    ) -> Result<Facade>
    where
        I: IntoIterator<Item = Trait>,
    {
        Facade::new(data, traits)
    }

    /// Wrap a self-referential trait with cycle-safe memoization
    pub fn memo_fix(
        &self,
        inner: &Trait,
        bottom: impl Into<Bottom>,
    ) -> Trait {
        fix::memo_fix(inner, bottom)
    }

    /// Sweep dead entries from the canonical store
    pub fn purge(&self) -> usize {
        self.shared.store.purge()
    }

    /// Number of live canonical instances
    pub fn live_instances(&self) -> usize {
        self.shared.store.len()
    }

    /// Whether two handles share one registry state
    pub fn same_registry(
        &self,
        other: &Registry,
    ) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.shared.config)
            .field("live_instances", &self.shared.store.len())
            .finish()
    }
}
