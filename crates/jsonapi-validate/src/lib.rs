//! # JsonApi Validate
//!
//! Validation-rule composition and structured-error translation for
//! JSON:API resources. This crate sits between a request for a resource
//! operation and a generic field-validation engine: it assembles the named
//! validation constraints applicable to the operation, hands them to the
//! engine, and translates the engine's failures into JSON:API error
//! objects.
//!
//! ## Composition
//!
//! Fields and filters contribute [`RuleFragment`]s, merged by the
//! composition algebra in [`compose`]:
//!
//! ```rust,ignore
//! use jsonapi_validate::prelude::*;
//!
//! struct Title;
//!
//! impl ValidatedField for Title {
//!     fn name(&self) -> &str {
//!         "title"
//!     }
//!
//!     fn creation_rules(&self, ctx: &Context<'_>) -> Result<Option<RuleFragment>, ComposeError> {
//!         RuleComposition::new()
//!             .defaults("string")
//!             .rules("required|max:255")
//!             .into_fragment(ctx)
//!     }
//! }
//! ```
//!
//! A [`ResourceValidator`] collects the contributions per operation into a
//! flat [`RuleSet`] keyed by dotted path:
//!
//! ```rust,ignore
//! let validator = ResourceValidator::new(&schema).field(&title);
//! let rules = validator.creation_rules(&Context::for_create(&request))?;
//! let report = engine.validate(&data, rules, &overrides, &labels);
//! ```
//!
//! ## Error translation
//!
//! Engine failures become error objects with JSON-pointer or
//! query-parameter sources:
//!
//! ```json
//! {
//!   "status": "422",
//!   "title": "Unprocessable Entity",
//!   "detail": "The title field is required.",
//!   "source": {"pointer": "/data/attributes/title"}
//! }
//! ```

pub mod compose;
pub mod rules;

mod collector;
mod config;
mod engine;
mod error;
mod fragment;
mod i18n;
mod schema;
mod translate;
mod validator;

pub use collector::{creation_rules, deletion_rules, relationship_rules, update_rules};
pub use compose::{Composed, RuleComposition};
pub use config::ValidationConfig;
pub use engine::{RuleFailure, ValidationEngine, ValidationReport};
pub use error::ComposeError;
pub use fragment::{Context, Deferred, Resolved, Rule, RuleFragment, RuleRef, RuleSet, SELF_KEY, WILDCARD};
pub use i18n::{dasherize, rule_key, Messages, NullTranslator, Translator};
pub use schema::{ValidatedField, ValidatedFilter};
pub use translate::{translate, ErrorTranslationIterator, SourceKind};
pub use validator::ResourceValidator;

/// Prelude module for the validation layer.
pub mod prelude {
    pub use crate::compose::{Composed, RuleComposition};
    pub use crate::config::ValidationConfig;
    pub use crate::engine::{RuleFailure, ValidationEngine, ValidationReport};
    pub use crate::error::ComposeError;
    pub use crate::fragment::{Context, Rule, RuleFragment, RuleRef, RuleSet};
    pub use crate::i18n::{Messages, Translator};
    pub use crate::rules::{
        AllowedCountableFields, AllowedFieldSets, AllowedFilterParameters, AllowedIncludePaths,
        AllowedPageParameters, AllowedSortParameters,
    };
    pub use crate::schema::{ValidatedField, ValidatedFilter};
    pub use crate::translate::{translate, ErrorTranslationIterator, SourceKind};
    pub use crate::validator::ResourceValidator;
    pub use jsonapi_core::{
        ErrorObject, ErrorSource, FieldKind, QueryParameters, Request, ResourceSchema,
        SchemaContainer,
    };
}
