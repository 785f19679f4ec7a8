//! Trait dispatch
//!
//! A [`Trait`] is a frozen table from variant name (or the [`WILDCARD`]
//! marker) to a case, plus an optional base trait it overrides. Calls
//! dispatch on the tag name of the first argument:
//!
//! 1. walk the chain from the invoked trait outward, taking the first case
//!    registered under that name;
//! 2. otherwise take the nearest wildcard seen during the walk;
//! 3. otherwise fail with [`DispatchError::NoCase`].
//!
//! Cases receive a [`Dispatch`] handle for structural recursion
//! ([`Dispatch::recur`]) and super calls ([`Dispatch::call_base`]).

mod builder;
mod dispatch;

pub use builder::TraitBuilder;
pub use dispatch::Dispatch;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::adt::DataDeclaration;
use crate::ensure;
use crate::error::{DispatchError, Result};
use crate::fix::Memo;
use crate::pattern::PatternCases;
use crate::runtime::value::Value;

/// Case key matching every variant without a case of its own
pub const WILDCARD: &str = "_";

/// Plain trait case body; `args[0]` is the receiver
pub type Handler = Arc<dyn Fn(&Dispatch<'_>, &[Value]) -> Result<Value> + Send + Sync>;

/// Body registered for one variant name
#[derive(Clone)]
pub enum Case {
    Handler(Handler),
    Rules(PatternCases),
}

impl Case {
    fn invoke(
        &self,
        dispatch: &Dispatch<'_>,
        name: &str,
        args: &[Value],
    ) -> Result<Value> {
        match self {
            Case::Handler(handler) => handler(dispatch, args),
            Case::Rules(rules) => rules.invoke(dispatch, name, args),
        }
    }
}

impl fmt::Debug for Case {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Case::Handler(_) => write!(f, "<handler>"),
            Case::Rules(rules) => write!(f, "{:?}", rules),
        }
    }
}

pub(crate) struct TraitInner {
    name: Arc<str>,
    data: Option<DataDeclaration>,
    cases: IndexMap<Arc<str>, Case>,
    base: Option<Trait>,
    memo: Option<Memo>,
    max_depth: usize,
}

/// Polymorphic operation dispatched by variant tag
#[derive(Clone)]
pub struct Trait(Arc<TraitInner>);

impl Trait {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Declaration the trait was checked against
    pub fn data(&self) -> Option<&DataDeclaration> {
        self.0.data.as_ref()
    }

    /// Trait this one overrides
    pub fn base(&self) -> Option<&Trait> {
        self.0.base.as_ref()
    }

    /// Names with a case of their own, wildcard included
    pub fn case_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.cases.keys().map(|k| &**k)
    }

    /// Whether a call on `variant` would find a case in the chain
    pub fn resolves(
        &self,
        variant: &str,
    ) -> bool {
        self.chain()
            .any(|t| t.0.cases.contains_key(variant) || t.0.cases.contains_key(WILDCARD))
    }

    /// Whether calls go through a memo table
    pub fn is_memoized(&self) -> bool {
        self.0.memo.is_some()
    }

    /// Number of live memo entries
    pub fn memo_len(&self) -> usize {
        self.0.memo.as_ref().map_or(0, Memo::len)
    }

    /// Drop memo entries whose arguments died
    pub fn purge_memo(&self) -> usize {
        self.0.memo.as_ref().map_or(0, Memo::purge)
    }

    pub fn ptr_eq(
        &self,
        other: &Trait,
    ) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Invoke the trait; `args[0]` is the receiver
    pub fn call(
        &self,
        args: &[Value],
    ) -> Result<Value> {
        ensure!(
            !args.is_empty(),
            DispatchError::MissingReceiver {
                trait_name: self.name().to_string(),
            }
        );
        let depth = dispatch::DepthGuard::enter(self.name(), self.0.max_depth)?;
        depth.run(self.name(), || match &self.0.memo {
            Some(memo) => memo.call(self, args),
            None => self.dispatch(args),
        })
    }

    /// Resolve and run the case for `args[0]`, bypassing any memo table
    pub(crate) fn dispatch(
        &self,
        args: &[Value],
    ) -> Result<Value> {
        let receiver = &args[0];
        let tag = receiver.variant_name().unwrap_or("");
        let (owner, name, case) = self.resolve(tag).ok_or_else(|| DispatchError::NoCase {
            trait_name: self.name().to_string(),
            tag: match receiver.variant_name() {
                Some(tag) => tag.to_string(),
                None => format!("untagged {}", receiver.kind()),
            },
        })?;
        trace!("{}: {} resolved to case `{}` of {}", self.name(), tag, name, owner.name());

        let dispatch = Dispatch::new(self, owner);
        case.invoke(&dispatch, name, args)
    }

    /// Find the case for `tag`: exact match first, then the nearest wildcard
    fn resolve<'a>(
        &'a self,
        tag: &str,
    ) -> Option<(&'a Trait, &'a str, &'a Case)> {
        let mut wildcard = None;
        for t in self.chain() {
            if let Some((name, case)) = t.0.cases.get_key_value(tag) {
                return Some((t, &**name, case));
            }
            if wildcard.is_none() {
                wildcard = t
                    .0
                    .cases
                    .get_key_value(WILDCARD)
                    .map(|(name, case)| (t, &**name, case));
            }
        }
        wildcard
    }

    /// This trait followed by its bases
    fn chain(&self) -> impl Iterator<Item = &Trait> + '_ {
        std::iter::successors(Some(self), |t| t.base())
    }

    pub(crate) fn from_inner(inner: TraitInner) -> Self {
        Self(Arc::new(inner))
    }

    /// Wrapper with no cases of its own, overriding `self`, calling through `memo`
    pub(crate) fn with_memo(
        &self,
        memo: Memo,
    ) -> Trait {
        Trait::from_inner(TraitInner {
            name: self.0.name.clone(),
            data: self.0.data.clone(),
            cases: IndexMap::new(),
            base: Some(self.clone()),
            memo: Some(memo),
            max_depth: self.0.max_depth,
        })
    }
}

impl fmt::Debug for Trait {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Trait")
            .field("name", &self.name())
            .field("cases", &self.0.cases.keys().collect::<Vec<_>>())
            .field("base", &self.base().map(|b| b.name()))
            .field("memoized", &self.is_memoized())
            .finish()
    }
}
