//! Pattern unification
//!
//! Structural patterns for writing multi-rule trait cases. A [`PatternCases`]
//! list tries its rules in order and runs the handler of the first rule whose
//! patterns all unify with the call arguments.

mod unify;

pub use unify::unify;

use std::fmt;
use std::sync::Arc;

use crate::adt::{DataDeclaration, Tag, Variant};
use crate::ensure;
use crate::error::{DeclarationError, DispatchError, Result};
use crate::runtime::value::{Value, ValueKind};
use crate::traits::{Dispatch, Handler};

/// Structural pattern
#[derive(Clone)]
pub enum Pattern {
    /// Matches anything
    Wildcard,
    /// Matches a value equal to this one
    Literal(Value),
    /// Matches a record or instance having every key, extra keys ignored
    Record(Vec<(Arc<str>, Pattern)>),
    /// Matches a list or instance with exactly these elements
    List(Vec<Pattern>),
    /// Matches any value of this kind
    Kind(ValueKind),
    /// Matches any instance of this variant
    Tag(Tag),
    /// Matches any instance of this declaration
    Data(DataDeclaration),
    /// Matches an instance of this variant whose fields match
    Variant { tag: Tag, fields: Vec<Pattern> },
}

impl Pattern {
    pub fn lit(value: impl Into<Value>) -> Self {
        Pattern::Literal(value.into())
    }

    pub fn record<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Pattern)>,
    {
        Pattern::Record(
            entries
                .into_iter()
                .map(|(k, p)| (Arc::from(k), p))
                .collect(),
        )
    }

    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Pattern>,
    {
        Pattern::List(items.into_iter().collect())
    }
}

impl From<&Variant> for Pattern {
    fn from(variant: &Variant) -> Self {
        Pattern::Tag(variant.tag().clone())
    }
}

impl From<&DataDeclaration> for Pattern {
    fn from(data: &DataDeclaration) -> Self {
        Pattern::Data(data.clone())
    }
}

impl From<ValueKind> for Pattern {
    fn from(kind: ValueKind) -> Self {
        Pattern::Kind(kind)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Pattern::Wildcard => write!(f, "_"),
            Pattern::Literal(v) => write!(f, "{}", v),
            Pattern::Record(entries) => {
                let parts: Vec<String> =
                    entries.iter().map(|(k, p)| format!("{}: {:?}", k, p)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Pattern::List(items) => f.debug_list().entries(items).finish(),
            Pattern::Kind(kind) => write!(f, "<{}>", kind),
            Pattern::Tag(tag) => write!(f, "{}", tag.name()),
            Pattern::Data(data) => write!(f, "<{}>", data.name()),
            Pattern::Variant { tag, fields } => {
                let parts: Vec<String> = fields.iter().map(|p| format!("{:?}", p)).collect();
                write!(f, "{}({})", tag.name(), parts.join(", "))
            }
        }
    }
}

// ============================================================================
// Rule lists
// ============================================================================

struct Rule {
    patterns: Vec<Pattern>,
    handler: Handler,
}

/// Ordered, first-match-wins list of pattern rules
#[derive(Clone)]
pub struct PatternCases(Arc<[Rule]>);

impl PatternCases {
    pub fn builder() -> PatternCasesBuilder {
        PatternCasesBuilder::default()
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Patterns per rule
    pub fn arity(&self) -> usize {
        self.0.first().map_or(0, |rule| rule.patterns.len())
    }

    /// Run the first rule unifying with `args`
    ///
    /// Missing arguments unify as `Null`.
    pub(crate) fn invoke(
        &self,
        dispatch: &Dispatch<'_>,
        case: &str,
        args: &[Value],
    ) -> Result<Value> {
        for rule in self.0.iter() {
            if rule_matches(rule, args)? {
                return (rule.handler)(dispatch, args);
            }
        }
        Err(DispatchError::NoRule {
            trait_name: dispatch.name().to_string(),
            case: case.to_string(),
            argument: args.first().unwrap_or(&Value::Null).to_string(),
        }
        .into())
    }
}

fn rule_matches(
    rule: &Rule,
    args: &[Value],
) -> Result<bool> {
    for (index, pattern) in rule.patterns.iter().enumerate() {
        if !unify(pattern, args.get(index).unwrap_or(&Value::Null))? {
            return Ok(false);
        }
    }
    Ok(true)
}

impl fmt::Debug for PatternCases {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|rule| &rule.patterns))
            .finish()
    }
}

/// Builder for [`PatternCases`]
#[derive(Default)]
pub struct PatternCasesBuilder {
    rules: Vec<Rule>,
}

impl PatternCasesBuilder {
    /// Append a rule
    pub fn rule<F>(
        mut self,
        patterns: Vec<Pattern>,
        handler: F,
    ) -> Self
    where
        F: Fn(&Dispatch<'_>, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            patterns,
            handler: Arc::new(handler),
        });
        self
    }

    pub fn build(self) -> Result<PatternCases> {
        ensure!(!self.rules.is_empty(), DeclarationError::EmptyRules);

        let expected = self.rules[0].patterns.len();
        for (index, rule) in self.rules.iter().enumerate() {
            ensure!(!rule.patterns.is_empty(), DeclarationError::EmptyRule { index });
            ensure!(
                rule.patterns.len() == expected,
                DeclarationError::ArityMismatch {
                    index,
                    expected,
                    found: rule.patterns.len(),
                }
            );
        }
        Ok(PatternCases(self.rules.into()))
    }
}
