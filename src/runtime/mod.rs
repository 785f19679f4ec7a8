//! Runtime system
//!
//! This module contains the value model and the canonicalizing store.

pub mod intern;
pub mod value;
