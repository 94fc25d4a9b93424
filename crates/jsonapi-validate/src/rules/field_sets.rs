//! The two-level sparse field set rule.

use crate::fragment::Rule;
use crate::i18n::Messages;
use crate::rules::plurality;
use jsonapi_core::SchemaContainer;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Validates the `fields` (sparse field set) parameter.
///
/// Two-level: each key of the parameter map names a resource type, each
/// value is a comma-separated field list. A resource type is recognised
/// when it is present in the schema container or explicitly configured via
/// [`allow`](Self::allow); unrecognised types produce their own message
/// family, which takes priority over the allowed-fields messages when both
/// conditions hold.
#[derive(Clone, Default)]
pub struct AllowedFieldSets {
    allowed: BTreeMap<String, BTreeSet<String>>,
    container: Option<Arc<dyn SchemaContainer + Send + Sync>>,
    value: Option<Value>,
    messages: Messages,
}

impl AllowedFieldSets {
    /// An empty rule; every resource type is unrecognised until allowed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recognise resource types and their fields through the schema
    /// container.
    pub fn with_container(container: Arc<dyn SchemaContainer + Send + Sync>) -> Self {
        Self {
            container: Some(container),
            ..Self::default()
        }
    }

    /// Use custom messages instead of the built-in catalog.
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    /// Explicitly allow a resource type with the given fields.
    ///
    /// An explicitly configured type is recognised even when the schema
    /// container does not know it, and its configured fields take priority
    /// over the container's sparse fields.
    pub fn allow<I, S>(mut self, resource_type: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed
            .entry(resource_type.into())
            .or_default()
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Remove an explicitly configured resource type.
    pub fn forget(mut self, resource_type: &str) -> Self {
        self.allowed.remove(resource_type);
        self
    }

    fn recognised(&self, resource_type: &str) -> bool {
        self.allowed.contains_key(resource_type)
            || self
                .container
                .as_ref()
                .is_some_and(|container| container.has_type(resource_type))
    }

    fn allowed_fields(&self, resource_type: &str) -> Option<BTreeSet<String>> {
        if let Some(fields) = self.allowed.get(resource_type) {
            return Some(fields.clone());
        }
        self.container
            .as_ref()
            .and_then(|container| container.sparse_fields(resource_type))
            .map(|fields| fields.into_iter().collect())
    }

    /// Resource types named in the recorded value that are not recognised,
    /// sorted and deduplicated.
    fn unrecognised(&self) -> Vec<String> {
        let Some(map) = self.value.as_ref().and_then(Value::as_object) else {
            return Vec::new();
        };
        let mut out: Vec<String> = map
            .keys()
            .filter(|resource_type| !self.recognised(resource_type))
            .cloned()
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Disallowed `type.field` pairs among recognised types, sorted and
    /// deduplicated.
    fn invalid(&self) -> Vec<String> {
        let Some(map) = self.value.as_ref().and_then(Value::as_object) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (resource_type, fields) in map {
            if !self.recognised(resource_type) {
                continue;
            }
            let allowed = self.allowed_fields(resource_type).unwrap_or_default();
            for field in fields.as_str().map(comma_split).unwrap_or_default() {
                if !allowed.contains(&field) {
                    out.push(format!("{resource_type}.{field}"));
                }
            }
        }
        out.sort();
        out.dedup();
        out
    }
}

impl Rule for AllowedFieldSets {
    fn name(&self) -> &str {
        "AllowedFieldSets"
    }

    fn passes(&mut self, _attribute: &str, value: &Value) -> bool {
        self.value = Some(value.clone());
        self.unrecognised().is_empty() && self.invalid().is_empty()
    }

    fn message(&self) -> String {
        let unrecognised = self.unrecognised();
        if !unrecognised.is_empty() {
            let member = if unrecognised.len() == 1 {
                "unrecognised_singular"
            } else {
                "unrecognised_plural"
            };
            return self.messages.render(self.name(), member, &unrecognised);
        }

        let invalid = self.invalid();
        self.messages.render(self.name(), plurality(&invalid), &invalid)
    }
}

impl fmt::Debug for AllowedFieldSets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllowedFieldSets")
            .field("allowed", &self.allowed)
            .field("has_container", &self.container.is_some())
            .field("value", &self.value)
            .finish()
    }
}

fn comma_split(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}
