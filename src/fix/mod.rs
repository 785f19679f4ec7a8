//! Fixed-point memoization
//!
//! [`memo_fix`] wraps a self-referential trait so that every call goes through
//! a memo table keyed by the argument tuple. On a miss the bottom value is
//! stored under the arguments before the case body runs, so a reentrant call
//! with the same arguments sees the bottom instead of recursing forever. The
//! body's result then replaces the bottom.
//!
//! Reference arguments are keyed weakly: entries for dropped instances are
//! never returned again and are released by [`Trait::purge_memo`].

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::Result;
use crate::runtime::intern::{InternStore, Retention};
use crate::runtime::value::Value;
use crate::traits::Trait;

/// Value a cyclic call sees while its own result is being computed
#[derive(Clone)]
pub enum Bottom {
    /// Fixed value
    Value(Value),
    /// Computed from the call arguments, once per miss
    Compute(Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>),
}

impl Bottom {
    pub fn compute<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Bottom::Compute(Arc::new(f))
    }

    fn evaluate(
        &self,
        args: &[Value],
    ) -> Result<Value> {
        match self {
            Bottom::Value(value) => Ok(value.clone()),
            Bottom::Compute(f) => f(args),
        }
    }
}

impl From<Value> for Bottom {
    fn from(value: Value) -> Self {
        Bottom::Value(value)
    }
}

impl From<&str> for Bottom {
    fn from(value: &str) -> Self {
        Bottom::Value(Value::str(value))
    }
}

impl fmt::Debug for Bottom {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Bottom::Value(value) => write!(f, "Bottom({})", value),
            Bottom::Compute(_) => write!(f, "Bottom(<fn>)"),
        }
    }
}

/// Memo table attached to a wrapper trait
pub(crate) struct Memo {
    table: InternStore,
    bottom: Bottom,
}

impl Memo {
    fn new(bottom: Bottom) -> Self {
        Self {
            table: InternStore::new(Retention::Strong),
            bottom,
        }
    }

    pub(crate) fn call(
        &self,
        wrapper: &Trait,
        args: &[Value],
    ) -> Result<Value> {
        if let Some(hit) = self.table.get(args)? {
            trace!("{}: memo hit for {}", wrapper.name(), args[0]);
            return Ok(hit);
        }

        let bottom = self.bottom.evaluate(args)?;
        self.table.set(args, bottom)?;
        match wrapper.dispatch(args) {
            Ok(result) => {
                self.table.set(args, result.clone())?;
                Ok(result)
            }
            Err(e) => {
                self.table.delete(args)?;
                Err(e)
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.table.len()
    }

    pub(crate) fn purge(&self) -> usize {
        self.table.purge()
    }
}

/// Wrap `inner` with a memo table seeded by `bottom`
///
/// The wrapper has no cases of its own and overrides `inner`, so dispatch and
/// `call_base` behave as they do on `inner`, while [`Dispatch::recur`](crate::traits::Dispatch::recur)
/// routes back through the table.
pub fn memo_fix(
    inner: &Trait,
    bottom: impl Into<Bottom>,
) -> Trait {
    let bottom = bottom.into();
    debug!("memo_fix {} with {:?}", inner.name(), bottom);
    inner.with_memo(Memo::new(bottom))
}
