//! Composition-layer error types.
//!
//! These are configuration errors: a misdeclared field or filter surfaces
//! immediately as a [`ComposeError`] and is never caught inside this layer.
//! Validation failures are not errors; they are the normal-path output of
//! the engine and are returned as data.

use thiserror::Error;

/// A contract violation detected while composing rule sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// A fragment resolved to a shape the composition site cannot accept,
    /// e.g. a deferred closure returning a keyed set where a positional
    /// list was required, or a deferred fragment resolving to another
    /// deferred fragment.
    #[error("rule fragment resolved to {got} where {expected} was expected")]
    InvalidFragment {
        expected: &'static str,
        got: &'static str,
    },

    /// A relationship collector was invoked for a field that contributes no
    /// validation rules.
    #[error("relationship field `{field}` does not contribute any validation rules")]
    EmptyRelationshipRules { field: String },

    /// A relationship collector was invoked for a field the validator does
    /// not know about.
    #[error("unknown relationship field `{field}`")]
    UnknownRelationship { field: String },

    /// The reserved `.` key appeared at the root of a field walk, where
    /// there is no parent path for it to refer to.
    #[error("the reserved `.` key cannot appear at the root of a field walk")]
    UnexpectedRootPath,
}

impl ComposeError {
    pub(crate) fn invalid_fragment(expected: &'static str, got: &'static str) -> Self {
        Self::InvalidFragment { expected, got }
    }
}
