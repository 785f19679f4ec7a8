//! Core runtime types for complect
//!
//! This module provides the dynamic value universe that variant fields, trait
//! arguments and trait results live in.

pub mod runtime_value;
pub use runtime_value::*;
