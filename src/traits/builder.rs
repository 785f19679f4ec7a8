//! Trait builder
//!
//! Checks at build time:
//! - case keys are capitalized variant names or [`WILDCARD`], each given once
//! - with an associated declaration, every case names one of its variants
//! - with an associated declaration and no wildcard anywhere in the chain,
//!   every variant has a case somewhere in the chain

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::adt::DataDeclaration;
use crate::ensure;
use crate::error::{DeclarationError, Result};
use crate::pattern::PatternCases;
use crate::runtime::value::Value;
use crate::traits::{Case, Dispatch, Trait, TraitInner, WILDCARD};
use crate::util::predicates::is_capitalized_identifier;

/// Builder for [`Trait`]
pub struct TraitBuilder {
    name: String,
    data: Option<DataDeclaration>,
    base: Option<Trait>,
    cases: Vec<(String, Case)>,
    max_depth: usize,
}

impl TraitBuilder {
    pub(crate) fn new(
        name: &str,
        max_depth: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            data: None,
            base: None,
            cases: Vec::new(),
            max_depth,
        }
    }

    /// Check cases against `data`
    pub fn for_data(
        mut self,
        data: &DataDeclaration,
    ) -> Self {
        self.data = Some(data.clone());
        self
    }

    /// Override `base`: cases not found here are looked up there
    pub fn extends(
        mut self,
        base: &Trait,
    ) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Plain case for one variant name
    pub fn case<F>(
        mut self,
        variant: &str,
        handler: F,
    ) -> Self
    where
        F: Fn(&Dispatch<'_>, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.cases
            .push((variant.to_string(), Case::Handler(Arc::new(handler))));
        self
    }

    /// Pattern-rule case for one variant name
    pub fn rules(
        mut self,
        variant: &str,
        rules: PatternCases,
    ) -> Self {
        self.cases.push((variant.to_string(), Case::Rules(rules)));
        self
    }

    /// Case for every variant without one of its own
    pub fn wildcard<F>(
        self,
        handler: F,
    ) -> Self
    where
        F: Fn(&Dispatch<'_>, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.case(WILDCARD, handler)
    }

    pub fn build(self) -> Result<Trait> {
        let mut cases: IndexMap<Arc<str>, Case> = IndexMap::with_capacity(self.cases.len());
        for (name, case) in self.cases {
            ensure!(
                name == WILDCARD || is_capitalized_identifier(&name),
                DeclarationError::InvalidName {
                    what: "case",
                    name,
                    expected: "a capitalized variant name or `_`",
                }
            );
            if let Some(data) = &self.data {
                ensure!(
                    name == WILDCARD || data.variant(&name).is_ok(),
                    DeclarationError::UnknownVariant {
                        trait_name: self.name.clone(),
                        variant: name,
                    }
                );
            }
            ensure!(
                !cases.contains_key(name.as_str()),
                DeclarationError::DuplicateCase {
                    trait_name: self.name.clone(),
                    case: name,
                }
            );
            cases.insert(Arc::from(name.as_str()), case);
        }

        let built = Trait::from_inner(TraitInner {
            name: Arc::from(self.name.as_str()),
            data: self.data,
            cases,
            base: self.base,
            memo: None,
            max_depth: self.max_depth,
        });

        if let Some(data) = built.data() {
            for variant in data.variant_names() {
                ensure!(
                    built.resolves(variant),
                    DeclarationError::MissingCase {
                        trait_name: built.name().to_string(),
                        variant: variant.to_string(),
                    }
                );
            }
        }

        debug!("defined {:?}", built);
        Ok(built)
    }
}
