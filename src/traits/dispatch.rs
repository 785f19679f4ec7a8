//! Dispatcher handle and recursion guard

use std::cell::Cell;

use tracing::warn;

use crate::error::{DispatchError, Result};
use crate::runtime::value::Value;
use crate::traits::Trait;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Nested calls that run on one stack before continuing on a fresh one
const SEGMENT_DEPTH: usize = 256;

/// Stack reserved for each continuation thread
const SEGMENT_STACK: usize = 16 * 1024 * 1024;

/// Counts nested trait calls on the current thread
pub(crate) struct DepthGuard {
    depth: usize,
}

impl DepthGuard {
    pub(crate) fn enter(
        trait_name: &str,
        limit: usize,
    ) -> Result<Self> {
        let depth = DEPTH.with(|d| d.get());
        if depth >= limit {
            return Err(DispatchError::RecursionLimit {
                trait_name: trait_name.to_string(),
                limit,
            }
            .into());
        }
        DEPTH.with(|d| d.set(depth + 1));
        Ok(DepthGuard { depth: depth + 1 })
    }

    /// Run `body`, moving to a fresh stack at every segment boundary
    ///
    /// The continuation thread starts at the current depth, so the limit
    /// still counts the whole nesting. The caller blocks until it finishes.
    pub(crate) fn run<F>(
        &self,
        trait_name: &str,
        body: F,
    ) -> Result<Value>
    where
        F: FnOnce() -> Result<Value> + Send,
    {
        if self.depth % SEGMENT_DEPTH != 0 {
            return body();
        }
        let depth = self.depth;
        std::thread::scope(|scope| {
            let spawned = std::thread::Builder::new()
                .name(format!("{}@{}", trait_name, depth))
                .stack_size(SEGMENT_STACK)
                .spawn_scoped(scope, move || {
                    DEPTH.with(|d| d.set(depth));
                    body()
                });
            match spawned {
                Ok(handle) => match handle.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                },
                Err(err) => {
                    warn!("{}: no stack for depth {}: {}", trait_name, depth, err);
                    Err(DispatchError::RecursionLimit {
                        trait_name: trait_name.to_string(),
                        limit: depth,
                    }
                    .into())
                }
            }
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Handle passed to every case body
///
/// `invoked` is the trait the caller called (possibly a memo wrapper or an
/// overriding trait); `owner` is the trait in the chain that declared the
/// running case.
pub struct Dispatch<'a> {
    invoked: &'a Trait,
    owner: &'a Trait,
}

impl<'a> Dispatch<'a> {
    pub(crate) fn new(
        invoked: &'a Trait,
        owner: &'a Trait,
    ) -> Self {
        Self { invoked, owner }
    }

    /// Re-invoke the whole trait that was called, for structural recursion
    pub fn recur(
        &self,
        args: &[Value],
    ) -> Result<Value> {
        self.invoked.call(args)
    }

    /// Invoke the base of the trait declaring the running case
    pub fn call_base(
        &self,
        args: &[Value],
    ) -> Result<Value> {
        match self.owner.base() {
            Some(base) => base.call(args),
            None => Err(DispatchError::NoBase {
                trait_name: self.owner.name().to_string(),
            }
            .into()),
        }
    }

    /// Base of the trait declaring the running case
    pub fn base(&self) -> Option<&'a Trait> {
        self.owner.base()
    }

    /// Name of the invoked trait
    pub fn name(&self) -> &'a str {
        self.invoked.name()
    }

    pub fn invoked(&self) -> &'a Trait {
        self.invoked
    }

    pub fn owner(&self) -> &'a Trait {
        self.owner
    }
}
