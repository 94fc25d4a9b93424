//! Optional rule-contribution capabilities for schema fields and filters.
//!
//! A field participates in validation by overriding the contribution hook
//! for an operation. The default for every hook is "contributes nothing",
//! which keeps the field invisible to the collectors; capability is
//! expressed through the trait, never probed through reflection.

use crate::compose::RuleComposition;
use crate::error::ComposeError;
use crate::fragment::{Context, RuleFragment};

/// A resource field that may contribute validation rules per operation.
///
/// Implementations typically build a fresh [`RuleComposition`] inside each
/// hook and return [`RuleComposition::into_fragment`], so defaults, primary
/// rules and appended rules merge with the anchor and membership semantics
/// of the composition algebra.
pub trait ValidatedField {
    /// The field name, which becomes the root of its dotted rule paths.
    fn name(&self) -> &str;

    /// Rules for a create operation. Context carries the request.
    fn creation_rules(&self, ctx: &Context<'_>) -> Result<Option<RuleFragment>, ComposeError> {
        let _ = ctx;
        Ok(None)
    }

    /// Rules for an update operation. Context carries the request and the
    /// current model state.
    fn update_rules(&self, ctx: &Context<'_>) -> Result<Option<RuleFragment>, ComposeError> {
        let _ = ctx;
        Ok(None)
    }

    /// Rules for a delete operation. Context carries the request and the
    /// current model state.
    fn deletion_rules(&self, ctx: &Context<'_>) -> Result<Option<RuleFragment>, ComposeError> {
        let _ = ctx;
        Ok(None)
    }

    /// A human-readable label for this field, used by the engine when
    /// interpolating attribute names into messages.
    fn attribute_label(&self) -> Option<&str> {
        None
    }
}

/// A query filter that may contribute validation rules.
pub trait ValidatedFilter {
    /// The filter name; rules land under the `filter.{name}` path.
    fn name(&self) -> &str;

    /// Rules for the filter's value. Context carries the query parameters
    /// and, when available, the request.
    fn query_rules(&self, ctx: &Context<'_>) -> Result<Option<RuleFragment>, ComposeError> {
        let _ = ctx;
        Ok(None)
    }
}
