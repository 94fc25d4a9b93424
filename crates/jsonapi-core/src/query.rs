//! Parsed JSON:API query parameters.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The query parameters of a JSON:API fetch request.
///
/// Holds the raw parameter map keyed by top-level parameter name
/// (`include`, `fields`, `sort`, `page`, `filter`, ...) with typed accessors
/// for the well-known parameters. The raw map is what gets handed to the
/// validation engine as input data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParameters {
    raw: BTreeMap<String, Value>,
}

impl QueryParameters {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a raw parameter map.
    pub fn from_map(raw: BTreeMap<String, Value>) -> Self {
        Self { raw }
    }

    /// Get a raw parameter value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    /// Set a raw parameter value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.raw.insert(name.into(), value);
    }

    /// The `include` parameter as its raw comma-separated string.
    pub fn include(&self) -> Option<&str> {
        self.raw.get("include").and_then(Value::as_str)
    }

    /// The `sort` parameter as its raw comma-separated string.
    pub fn sort(&self) -> Option<&str> {
        self.raw.get("sort").and_then(Value::as_str)
    }

    /// The `fields` parameter: resource type to comma-separated field list.
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.raw.get("fields").and_then(Value::as_object)
    }

    /// The `page` parameter map.
    pub fn page(&self) -> Option<&Map<String, Value>> {
        self.raw.get("page").and_then(Value::as_object)
    }

    /// The `filter` parameter map.
    pub fn filter(&self) -> Option<&Map<String, Value>> {
        self.raw.get("filter").and_then(Value::as_object)
    }

    /// True when no parameters were supplied.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The raw parameter map as a JSON document, for the validation engine.
    pub fn to_value(&self) -> Value {
        Value::Object(self.raw.clone().into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for QueryParameters {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            raw: iter.into_iter().collect(),
        }
    }
}
