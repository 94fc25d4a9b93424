//! Translation of validation reports into JSON:API error objects.

use crate::config::ValidationConfig;
use crate::engine::{RuleFailure, ValidationReport};
use jsonapi_core::{ErrorObject, FieldKind, ResourceSchema};
use serde_json::json;
use std::collections::{HashMap, VecDeque};

/// Which kind of request the failing paths refer to.
#[derive(Clone, Copy)]
pub enum SourceKind<'a> {
    /// Paths refer to a resource document; sources become JSON pointers,
    /// classified through the schema.
    Resource(&'a dyn ResourceSchema),
    /// Paths refer to query parameters; sources name the declared
    /// top-level parameter.
    Query,
}

/// Lazily turns a completed validation report into error objects.
///
/// One error object per (path, message) pair, walked in the order the
/// engine reported them. The iterator is a one-shot producer; re-iterating
/// means reconstructing it, which re-runs message translation.
pub struct ErrorTranslationIterator<'a> {
    report: &'a ValidationReport,
    kind: SourceKind<'a>,
    include_failed_meta: bool,
    entry: usize,
    message: usize,
    failures: HashMap<String, VecDeque<RuleFailure>>,
}

impl<'a> ErrorTranslationIterator<'a> {
    /// Create an iterator over a completed report.
    pub fn new(report: &'a ValidationReport, kind: SourceKind<'a>, config: &ValidationConfig) -> Self {
        // Failure entries are consumed sequentially as messages pair up,
        // so take a working copy when metadata is requested.
        let failures = if config.include_failed_meta {
            report
                .failed()
                .iter()
                .map(|(path, failures)| (path.clone(), failures.iter().cloned().collect()))
                .collect()
        } else {
            HashMap::new()
        };

        Self {
            report,
            kind,
            include_failed_meta: config.include_failed_meta,
            entry: 0,
            message: 0,
            failures,
        }
    }

    fn error_object(&mut self, path: &str, message: &str) -> ErrorObject {
        let mut error = match self.kind {
            SourceKind::Resource(schema) => {
                ErrorObject::unprocessable(message).with_pointer(pointer(schema, path))
            }
            SourceKind::Query => {
                ErrorObject::invalid_query_parameter(message).with_parameter(parameter(path))
            }
        };

        if self.include_failed_meta {
            let failed: Vec<RuleFailure> = self
                .failures
                .get_mut(path)
                .and_then(VecDeque::pop_front)
                .into_iter()
                .collect();
            error = error.with_meta(json!({ "failed": failed }));
        }

        error
    }
}

impl Iterator for ErrorTranslationIterator<'_> {
    type Item = ErrorObject;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (path, messages) = self.report.errors().get(self.entry)?;
            if self.message >= messages.len() {
                self.entry += 1;
                self.message = 0;
                continue;
            }
            let message = messages[self.message].clone();
            self.message += 1;
            let path = path.clone();
            return Some(self.error_object(&path, &message));
        }
    }
}

/// Translate a whole report at once.
pub fn translate(
    report: &ValidationReport,
    kind: SourceKind<'_>,
    config: &ValidationConfig,
) -> Vec<ErrorObject> {
    ErrorTranslationIterator::new(report, kind, config).collect()
}

/// JSON pointer for a resource-document path, classified through the
/// schema: `type`/`id` map to the resource identity members, attributes
/// keep their full dotted path, relationships point at the relationship
/// member. Unknown fields fall back to the document root.
fn pointer(schema: &dyn ResourceSchema, path: &str) -> String {
    let field = path.split('.').next().unwrap_or(path);
    match field {
        "type" => "/data/type".to_string(),
        "id" => "/data/id".to_string(),
        _ => match schema.field_kind(field) {
            Some(FieldKind::Attribute) => {
                format!("/data/attributes/{}", path.replace('.', "/"))
            }
            Some(FieldKind::Relationship) => format!("/data/relationships/{field}"),
            None => "/data".to_string(),
        },
    }
}

/// Query parameter name for a failing path: the declared top-level
/// parameter, not the dotted sub-path the rule was attached to.
fn parameter(path: &str) -> String {
    path.split('.').next().unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    struct Posts;

    impl ResourceSchema for Posts {
        fn resource_type(&self) -> &str {
            "posts"
        }

        fn field_kind(&self, field: &str) -> Option<FieldKind> {
            match field {
                "title" | "meta" => Some(FieldKind::Attribute),
                "author" => Some(FieldKind::Relationship),
                _ => None,
            }
        }

        fn sparse_fields(&self) -> Vec<String> {
            vec!["title".into(), "author".into()]
        }
    }

    fn report() -> ValidationReport {
        let mut report = ValidationReport::new();
        report.add_error("title", "The title field is required.");
        report.add_error("author.id", "The author id is invalid.");
        report
    }

    #[test]
    fn resource_errors_carry_pointers() {
        let report = report();
        let errors = translate(
            &report,
            SourceKind::Resource(&Posts),
            &ValidationConfig::default(),
        );

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            errors[0].source.as_ref().unwrap().pointer.as_deref(),
            Some("/data/attributes/title")
        );
        assert_eq!(
            errors[1].source.as_ref().unwrap().pointer.as_deref(),
            Some("/data/relationships/author")
        );
        assert!(errors[0].meta.is_none());
    }

    #[test]
    fn identity_and_unknown_pointers() {
        let mut report = ValidationReport::new();
        report.add_error("type", "Unsupported resource type.");
        report.add_error("id", "Ids are server-generated.");
        report.add_error("mystery", "Unknown field.");
        report.add_error("meta.geo.lat", "Latitude is out of range.");

        let errors = translate(
            &report,
            SourceKind::Resource(&Posts),
            &ValidationConfig::default(),
        );

        let pointers: Vec<&str> = errors
            .iter()
            .map(|e| e.source.as_ref().unwrap().pointer.as_deref().unwrap())
            .collect();
        assert_eq!(
            pointers,
            vec!["/data/type", "/data/id", "/data", "/data/attributes/meta/geo/lat"]
        );
    }

    #[test]
    fn query_errors_name_the_declared_parameter() {
        let mut report = ValidationReport::new();
        report.add_error("filter.foo", "Filter parameter foo is not allowed.");

        let errors = translate(&report, SourceKind::Query, &ValidationConfig::default());

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].status, StatusCode::BAD_REQUEST);
        assert_eq!(errors[0].title, "Invalid Query Parameter");
        assert_eq!(
            errors[0].source.as_ref().unwrap().parameter.as_deref(),
            Some("filter")
        );
        assert!(errors[0].meta.is_none());
    }

    #[test]
    fn one_error_object_per_message() {
        let mut report = ValidationReport::new();
        report.add_error("title", "The title field is required.");
        report.add_error("title", "The title must be a string.");

        let errors = translate(
            &report,
            SourceKind::Resource(&Posts),
            &ValidationConfig::default(),
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].detail.as_deref(), Some("The title field is required."));
        assert_eq!(errors[1].detail.as_deref(), Some("The title must be a string."));
    }

    #[test]
    fn failure_metadata_pairs_sequentially() {
        let mut report = ValidationReport::new();
        report.add_error("title", "The title field is required.");
        report.add_error("title", "The title must be at least 3 characters.");
        report.add_failure("title", RuleFailure::new("required"));
        report.add_failure("title", RuleFailure::with_options("min", ["3"]));

        let errors = translate(
            &report,
            SourceKind::Resource(&Posts),
            &ValidationConfig::new().with_failed_meta(),
        );

        assert_eq!(
            errors[0].meta,
            Some(json!({"failed": [{"rule": "required"}]}))
        );
        assert_eq!(
            errors[1].meta,
            Some(json!({"failed": [{"rule": "min", "options": ["3"]}]}))
        );
    }

    #[test]
    fn exhausted_failure_metadata_defaults_to_empty() {
        let mut report = ValidationReport::new();
        report.add_error("title", "first");
        report.add_error("title", "second");
        report.add_failure("title", RuleFailure::new("required"));

        let errors = translate(
            &report,
            SourceKind::Resource(&Posts),
            &ValidationConfig::new().with_failed_meta(),
        );

        assert_eq!(
            errors[0].meta,
            Some(json!({"failed": [{"rule": "required"}]}))
        );
        assert_eq!(errors[1].meta, Some(json!({"failed": []})));
    }
}
