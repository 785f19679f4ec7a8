//! Error taxonomy
//!
//! Every fallible operation in the crate returns [`Result`], whose error is one
//! of the category enums below wrapped in [`Error`]. Nothing in the core
//! recovers from an error; it always reaches the immediate caller.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Malformed data or trait declarations, raised eagerly at declare time
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    /// Identifier does not have the required shape
    #[error("Invalid {what} name `{name}`: expected {expected}")]
    InvalidName {
        what: &'static str,
        name: String,
        expected: &'static str,
    },

    /// Variant name already present in the combined namespace
    #[error("Variant `{variant}` is already declared")]
    DuplicateVariant { variant: String },

    /// Field name repeated within one variant
    #[error("Field `{field}` is declared twice in variant `{variant}`")]
    DuplicateField { variant: String, field: String },

    /// Trait lacks a case for a variant and has no wildcard
    #[error("Trait `{trait_name}` has no case for variant `{variant}` and no wildcard")]
    MissingCase { trait_name: String, variant: String },

    /// Trait case names a variant the associated declaration does not have
    #[error("Trait `{trait_name}` defines a case for unknown variant `{variant}`")]
    UnknownVariant { trait_name: String, variant: String },

    /// Trait builder given two cases for one name
    #[error("Trait `{trait_name}` defines case `{case}` twice")]
    DuplicateCase { trait_name: String, case: String },

    /// Pattern-case list without rules
    #[error("Pattern-case list has no rules")]
    EmptyRules,

    /// Rule without any leading pattern
    #[error("Rule {index} has no patterns before its handler")]
    EmptyRule { index: usize },

    /// Rules of one list disagree on their pattern count
    #[error("Rule {index} has {found} patterns, expected {expected}")]
    ArityMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    /// Variant pattern built with the wrong number of field patterns
    #[error("Pattern for variant `{variant}` has {found} field patterns, expected {expected}")]
    WrongFieldCount {
        variant: String,
        expected: usize,
        found: usize,
    },
}

/// Wrong argument shape when building a variant instance
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// Positional argument count differs from the field count
    #[error("Variant `{variant}` takes {expected} arguments, got {found}")]
    ArgumentCount {
        variant: String,
        expected: usize,
        found: usize,
    },

    /// Keyed argument lacks a declared field
    #[error("Variant `{variant}` is missing field `{field}`")]
    MissingField { variant: String, field: String },

    /// Keyed argument carries a key that is not a declared field
    #[error("Variant `{variant}` has no field `{field}`")]
    UnknownField { variant: String, field: String },

    /// Singleton access on a variant with fields
    #[error("Variant `{variant}` has fields and is not a singleton")]
    NotASingleton { variant: String },

    /// Lookup of a variant the declaration does not contain
    #[error("Unknown variant `{variant}`")]
    UnknownVariant { variant: String },

    /// Lazy field whose target is not available
    #[error("Field `{field}` of `{variant}` cannot be resolved: {reason}")]
    UnresolvedField {
        variant: String,
        field: String,
        reason: String,
    },

    /// A knot can only be tied once
    #[error("Knot is already tied")]
    KnotAlreadyTied,
}

/// Trait resolution failures at call time
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No case and no wildcard anywhere in the override chain
    #[error("Trait `{trait_name}` has no case for `{tag}`")]
    NoCase { trait_name: String, tag: String },

    /// No pattern rule unified with the call arguments
    #[error("Trait `{trait_name}`: no rule of case `{case}` matches {argument}")]
    NoRule {
        trait_name: String,
        case: String,
        argument: String,
    },

    /// Trait invoked without a receiver
    #[error("Trait `{trait_name}` called without arguments")]
    MissingReceiver { trait_name: String },

    /// Explicit base call from a trait that extends nothing
    #[error("Trait `{trait_name}` has no base trait")]
    NoBase { trait_name: String },

    /// Dispatch nesting exceeded the configured depth
    #[error("Trait `{trait_name}` exceeded the recursion limit of {limit}")]
    RecursionLimit { trait_name: String, limit: usize },
}

/// Trait members bound onto instance views
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompositionError {
    /// Bound trait resolves no case for the view's variant
    #[error("Trait `{trait_name}` has no case for variant `{variant}`")]
    MissingCase { trait_name: String, variant: String },

    /// View has neither a field nor a trait with this name
    #[error("`{variant}` has no member `{member}`")]
    UnknownMember { variant: String, member: String },

    /// Trait name shadows a field name
    #[error("Trait `{trait_name}` clashes with a field of variant `{variant}`")]
    NameClash { trait_name: String, variant: String },

    /// Two traits bound under one name
    #[error("Member `{member}` is bound twice")]
    DuplicateMember { member: String },

    /// Attempted mutation of a facade or view
    #[error("Cannot modify member `{member}`: views are read-only")]
    ReadOnly { member: String },

    /// Value is not an instance of the facade's declaration
    #[error("{value} is not an instance of this declaration")]
    ForeignInstance { value: String },
}

/// Interning store misuse
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Operations need at least one key
    #[error("Key path must contain at least one key")]
    EmptyKeyPath,
}

/// Any error raised by the crate
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Failure reported by a user-supplied handler
    #[error("{0}")]
    Handler(String),
}

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Declaration,
    Construction,
    Dispatch,
    Composition,
    Store,
    Handler,
}

impl Error {
    /// Error raised from inside a trait handler
    pub fn handler(message: impl Into<String>) -> Self {
        Error::Handler(message.into())
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Declaration(_) => ErrorKind::Declaration,
            Error::Construction(_) => ErrorKind::Construction,
            Error::Dispatch(_) => ErrorKind::Dispatch,
            Error::Composition(_) => ErrorKind::Composition,
            Error::Store(_) => ErrorKind::Store,
            Error::Handler(_) => ErrorKind::Handler,
        }
    }
}
