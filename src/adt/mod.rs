//! Algebraic data types
//!
//! Declarations, variant tags and canonical instances. Every construction
//! goes through the registry's canonical store, so structurally equal
//! constructions yield the same [`Instance`].

mod data;
mod instance;
mod tag;

pub use data::{DataBuilder, DataDeclaration, Variant};
pub use instance::{Instance, Knot, WeakInstance};
pub use tag::{DeclId, Tag, TagId};

#[cfg(test)]
mod tests;
