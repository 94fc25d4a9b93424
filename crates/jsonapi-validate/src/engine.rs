//! The validation-engine boundary.
//!
//! The engine itself is an external collaborator: it executes named rules
//! and constraint objects against input data and reports per-path results.
//! This module defines the interface the composition layer hands its rule
//! sets to, and the report shape the error translator consumes.

use crate::fragment::RuleSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Rule names whose failure options are never exposed, to avoid leaking
/// database or schema details into error payloads.
const PROTECTED_RULES: [&str; 2] = ["exists", "unique"];

/// One rule failure at a path: the rule identifier plus its option payload
/// (e.g. `min:3` fails as `{rule: "min", options: ["3"]}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFailure {
    pub rule: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl RuleFailure {
    /// A failure with no options.
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            options: Vec::new(),
        }
    }

    /// A failure with options. Options are dropped for protected rules.
    pub fn with_options<I, S>(rule: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rule = rule.into();
        let options = if PROTECTED_RULES.contains(&rule.as_str()) {
            Vec::new()
        } else {
            options.into_iter().map(Into::into).collect()
        };
        Self { rule, options }
    }
}

/// A completed validation run.
///
/// Error entries preserve the order the engine reported them in, which is
/// also the order the error translator walks them; the failure map pairs
/// each path with its rule failures in message order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    errors: Vec<(String, Vec<String>)>,
    failed: HashMap<String, Vec<RuleFailure>>,
}

impl ValidationReport {
    /// An empty (passing) report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any path failed.
    pub fn fails(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether every path passed.
    pub fn passes(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record a message for a path, preserving first-report order.
    pub fn add_error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        let path = path.into();
        match self.errors.iter_mut().find(|(p, _)| *p == path) {
            Some((_, messages)) => messages.push(message.into()),
            None => self.errors.push((path, vec![message.into()])),
        }
    }

    /// Record a rule failure for a path.
    pub fn add_failure(&mut self, path: impl Into<String>, failure: RuleFailure) {
        self.failed.entry(path.into()).or_default().push(failure);
    }

    /// Per-path messages, in engine report order.
    pub fn errors(&self) -> &[(String, Vec<String>)] {
        &self.errors
    }

    /// Per-path rule failures.
    pub fn failed(&self) -> &HashMap<String, Vec<RuleFailure>> {
        &self.failed
    }
}

/// A field-level validation engine.
///
/// Takes the composed rule set by value: constraint objects record state
/// during `passes` that their `message` reads afterwards, so the engine
/// needs them mutably.
pub trait ValidationEngine {
    /// Run the rule set against the input data.
    ///
    /// `messages` overrides the engine's default message per `path.rule`
    /// key; `attributes` maps paths to human-readable labels for message
    /// interpolation.
    fn validate(
        &self,
        data: &Value,
        rules: RuleSet,
        messages: &HashMap<String, String>,
        attributes: &HashMap<String, String>,
    ) -> ValidationReport;
}
