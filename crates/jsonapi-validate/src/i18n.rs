//! Message translation.
//!
//! Rules look their messages up through a [`Translator`] under namespaced
//! keys of the form `{namespace}::validation.{rule_key}.{member}`. A
//! missing key resolves to `None`, which is distinguishable from an
//! intentionally empty string; callers fall back to the built-in English
//! catalog, so a partially translated deployment degrades silently instead
//! of failing.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Resolves a namespaced message key to a localized string.
pub trait Translator {
    /// Translate a key, `None` when no translation exists.
    fn translate(&self, key: &str) -> Option<String>;
}

/// Convert a type-style rule name to its translation-key form:
/// `AllowedFieldSets` becomes `allowed_field_sets`.
pub fn rule_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// The dasherized form of a rule name: `AllowedFieldSets` becomes
/// `allowed-field-sets`.
pub fn dasherize(name: &str) -> String {
    rule_key(name).replace('_', "-")
}

/// A translator plus the namespace its keys live under.
///
/// This is the explicit configuration value rules and the error translator
/// receive at construction; there is no process-wide translation state.
#[derive(Clone)]
pub struct Messages {
    translator: Arc<dyn Translator + Send + Sync>,
    namespace: String,
}

impl Messages {
    /// Messages resolved through a custom translator.
    pub fn new(translator: Arc<dyn Translator + Send + Sync>, namespace: impl Into<String>) -> Self {
        Self {
            translator,
            namespace: namespace.into(),
        }
    }

    /// The translation namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Render the message for a rule and member, interpolating `{values}`
    /// with the comma-joined value list.
    ///
    /// Lookup order: the configured translator, then the built-in English
    /// catalog, then a generic fallback.
    pub fn render(&self, rule: &str, member: &str, values: &[String]) -> String {
        let key = rule_key(rule);
        let namespaced = format!("{}::validation.{}.{}", self.namespace, key, member);

        let template = self
            .translator
            .translate(&namespaced)
            .or_else(|| {
                builtin_catalog()
                    .get(format!("validation.{key}.{member}").as_str())
                    .map(|template| template.to_string())
            })
            .unwrap_or_else(|| "The {values} value is invalid.".to_string());

        interpolate(&template, values)
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new(Arc::new(NullTranslator), "jsonapi")
    }
}

impl fmt::Debug for Messages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Messages")
            .field("namespace", &self.namespace)
            .finish()
    }
}

/// A translator with no catalog; every lookup falls back to the built-in
/// English messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTranslator;

impl Translator for NullTranslator {
    fn translate(&self, _key: &str) -> Option<String> {
        None
    }
}

fn interpolate(template: &str, values: &[String]) -> String {
    template.replace("{values}", &values.join(", "))
}

fn builtin_catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        HashMap::from([
            (
                "validation.allowed_field_sets.default",
                "Sparse field sets must contain only allowed ones.",
            ),
            (
                "validation.allowed_field_sets.singular",
                "Sparse field set {values} is not allowed.",
            ),
            (
                "validation.allowed_field_sets.plural",
                "Sparse field sets {values} are not allowed.",
            ),
            (
                "validation.allowed_field_sets.unrecognised_singular",
                "Resource type {values} is not recognised.",
            ),
            (
                "validation.allowed_field_sets.unrecognised_plural",
                "Resource types {values} are not recognised.",
            ),
            (
                "validation.allowed_filter_parameters.default",
                "Filter parameters must contain only allowed ones.",
            ),
            (
                "validation.allowed_filter_parameters.singular",
                "Filter parameter {values} is not allowed.",
            ),
            (
                "validation.allowed_filter_parameters.plural",
                "Filter parameters {values} are not allowed.",
            ),
            (
                "validation.allowed_include_paths.default",
                "Include paths must contain only allowed ones.",
            ),
            (
                "validation.allowed_include_paths.singular",
                "Include path {values} is not allowed.",
            ),
            (
                "validation.allowed_include_paths.plural",
                "Include paths {values} are not allowed.",
            ),
            (
                "validation.allowed_sort_parameters.default",
                "Sort parameters must contain only allowed ones.",
            ),
            (
                "validation.allowed_sort_parameters.singular",
                "Sort parameter {values} is not allowed.",
            ),
            (
                "validation.allowed_sort_parameters.plural",
                "Sort parameters {values} are not allowed.",
            ),
            (
                "validation.allowed_page_parameters.default",
                "Page parameters must contain only allowed ones.",
            ),
            (
                "validation.allowed_page_parameters.singular",
                "Page parameter {values} is not allowed.",
            ),
            (
                "validation.allowed_page_parameters.plural",
                "Page parameters {values} are not allowed.",
            ),
            (
                "validation.allowed_countable_fields.default",
                "Count fields must contain only allowed ones.",
            ),
            (
                "validation.allowed_countable_fields.singular",
                "Count field {values} is not allowed.",
            ),
            (
                "validation.allowed_countable_fields.plural",
                "Count fields {values} are not allowed.",
            ),
        ])
    })
}
