//! The composable rule-declaration struct fields and filters hold.

use crate::compose::{poly, Composed};
use crate::error::ComposeError;
use crate::fragment::{Context, RuleFragment};
use std::collections::BTreeMap;

/// The three fragment sources a field or filter declares.
///
/// Fields hold one of these and delegate to it instead of re-implementing
/// composition: `defaults` supplies rules spliced at the presence-marker
/// anchor, `rules` is the primary contribution, `append` adds trailing
/// rules. The shape (list vs keyed) is inferred from whichever source is
/// supplied first.
///
/// A composition is consumed by [`compose`](Self::compose); fields build a
/// fresh one per validation invocation.
#[derive(Debug, Default)]
pub struct RuleComposition {
    defaults: Option<RuleFragment>,
    rules: Option<RuleFragment>,
    append: Option<RuleFragment>,
}

impl RuleComposition {
    /// An empty composition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default rules.
    pub fn defaults(mut self, fragment: impl Into<RuleFragment>) -> Self {
        self.defaults = Some(fragment.into());
        self
    }

    /// Set the default rules from a deferred closure.
    pub fn defaults_with(
        mut self,
        resolve: impl FnOnce(&Context<'_>) -> Option<RuleFragment> + 'static,
    ) -> Self {
        self.defaults = Some(RuleFragment::deferred(resolve));
        self
    }

    /// Set the primary rules.
    pub fn rules(mut self, fragment: impl Into<RuleFragment>) -> Self {
        self.rules = Some(fragment.into());
        self
    }

    /// Set the primary rules from a deferred closure.
    pub fn rules_with(
        mut self,
        resolve: impl FnOnce(&Context<'_>) -> Option<RuleFragment> + 'static,
    ) -> Self {
        self.rules = Some(RuleFragment::deferred(resolve));
        self
    }

    /// Set the appended rules.
    pub fn append(mut self, fragment: impl Into<RuleFragment>) -> Self {
        self.append = Some(fragment.into());
        self
    }

    /// Set the appended rules from a deferred closure.
    pub fn append_with(
        mut self,
        resolve: impl FnOnce(&Context<'_>) -> Option<RuleFragment> + 'static,
    ) -> Self {
        self.append = Some(RuleFragment::deferred(resolve));
        self
    }

    /// Compose the three sources, inferring the shape.
    pub fn compose(self, ctx: &Context<'_>) -> Result<Composed, ComposeError> {
        poly::compose(self.defaults, self.rules, self.append, ctx)
    }

    /// Compose into a fragment suitable as a field contribution.
    ///
    /// Returns `None` when composition produced no rules, so a field
    /// declaring nothing stays invisible to the collector.
    pub fn into_fragment(self, ctx: &Context<'_>) -> Result<Option<RuleFragment>, ComposeError> {
        let composed = self.compose(ctx)?;
        if composed.is_empty() {
            return Ok(None);
        }
        Ok(Some(match composed {
            Composed::List(rules) => RuleFragment::List(rules),
            Composed::Keyed(entries) => RuleFragment::Keyed(
                entries
                    .into_iter()
                    .map(|(key, rules)| (key, RuleFragment::List(rules)))
                    .collect::<BTreeMap<_, _>>(),
            ),
        }))
    }
}
