//! One-level allow-list rules for query parameters.

use crate::fragment::Rule;
use crate::i18n::Messages;
use crate::rules::plurality;
use jsonapi_core::ResourceSchema;
use serde_json::Value;
use std::collections::BTreeSet;

/// The shared core of the allow-list rules: an allowed-name set plus the
/// last validated raw value.
///
/// `passes` records the value so the message can recompute the invalid
/// subset afterwards; an instance is consumed within one `passes`/`message`
/// cycle and is not safe to share across concurrent validations.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    allowed: BTreeSet<String>,
    value: Option<Value>,
}

impl AllowList {
    /// An allow list over the given names.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            value: None,
        }
    }

    /// Add names to the allowed set.
    pub fn allow<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed.extend(names.into_iter().map(Into::into));
    }

    /// Remove names from the allowed set.
    pub fn forget<'a, I>(&mut self, names: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for name in names {
            self.allowed.remove(name);
        }
    }

    /// Whether a name is allowed.
    pub fn contains(&self, name: &str) -> bool {
        self.allowed.contains(name)
    }

    /// Record the value being validated.
    pub fn record(&mut self, value: &Value) {
        self.value = Some(value.clone());
    }

    /// The last recorded value.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// The sorted, deduplicated subset of extracted names that are not
    /// allowed, recomputed from the last recorded value.
    pub fn invalid(&self, extract: impl Fn(&Value) -> Vec<String>) -> Vec<String> {
        let mut out: Vec<String> = self
            .value
            .as_ref()
            .map(extract)
            .unwrap_or_default()
            .into_iter()
            .filter(|name| !self.allowed.contains(name))
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

/// Split a comma-separated parameter value into names.
fn comma_list(value: &Value) -> Vec<String> {
    value
        .as_str()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// The keys of an object-shaped parameter value.
fn map_keys(value: &Value) -> Vec<String> {
    value
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

macro_rules! builder_methods {
    () => {
        /// Use custom messages instead of the built-in catalog.
        pub fn with_messages(mut self, messages: Messages) -> Self {
            self.messages = messages;
            self
        }

        /// Allow additional names.
        pub fn allow<I, S>(mut self, names: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.list.allow(names);
            self
        }

        /// Remove names from the allowed set.
        pub fn forget<'a, I>(mut self, names: I) -> Self
        where
            I: IntoIterator<Item = &'a str>,
        {
            self.list.forget(names);
            self
        }

        /// Remove names when the condition holds.
        pub fn forget_if<'a, I>(self, condition: bool, names: I) -> Self
        where
            I: IntoIterator<Item = &'a str>,
        {
            if condition {
                self.forget(names)
            } else {
                self
            }
        }

        /// Remove names unless the condition holds.
        pub fn forget_unless<'a, I>(self, condition: bool, names: I) -> Self
        where
            I: IntoIterator<Item = &'a str>,
        {
            self.forget_if(!condition, names)
        }
    };
}

/// Validates that every name in the `filter` parameter map is a declared
/// filter.
#[derive(Debug, Clone, Default)]
pub struct AllowedFilterParameters {
    list: AllowList,
    messages: Messages,
}

impl AllowedFilterParameters {
    /// Allow the given filter names.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            list: AllowList::new(allowed),
            messages: Messages::default(),
        }
    }

    builder_methods!();
}

impl Rule for AllowedFilterParameters {
    fn name(&self) -> &str {
        "AllowedFilterParameters"
    }

    fn passes(&mut self, _attribute: &str, value: &Value) -> bool {
        self.list.record(value);
        map_keys(value).iter().all(|name| self.list.contains(name))
    }

    fn message(&self) -> String {
        let invalid = self.list.invalid(map_keys);
        self.messages.render(self.name(), plurality(&invalid), &invalid)
    }
}

/// Validates that every path in the `include` parameter is supported.
#[derive(Debug, Clone, Default)]
pub struct AllowedIncludePaths {
    list: AllowList,
    messages: Messages,
}

impl AllowedIncludePaths {
    /// Allow the given include paths.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            list: AllowList::new(allowed),
            messages: Messages::default(),
        }
    }

    /// Allow the include paths the schema declares.
    pub fn from_schema(schema: &dyn ResourceSchema) -> Self {
        Self::new(schema.include_paths())
    }

    builder_methods!();
}

impl Rule for AllowedIncludePaths {
    fn name(&self) -> &str {
        "AllowedIncludePaths"
    }

    fn passes(&mut self, _attribute: &str, value: &Value) -> bool {
        self.list.record(value);
        comma_list(value).iter().all(|name| self.list.contains(name))
    }

    fn message(&self) -> String {
        let invalid = self.list.invalid(comma_list);
        self.messages.render(self.name(), plurality(&invalid), &invalid)
    }
}

/// Validates that every field in the `sort` parameter is sortable.
///
/// Leading `+`/`-` direction markers are stripped before comparing against
/// the allowed (direction-free) names.
#[derive(Debug, Clone, Default)]
pub struct AllowedSortParameters {
    list: AllowList,
    messages: Messages,
}

impl AllowedSortParameters {
    /// Allow the given sort fields, without direction markers.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            list: AllowList::new(allowed),
            messages: Messages::default(),
        }
    }

    /// Allow the sort fields the schema declares.
    pub fn from_schema(schema: &dyn ResourceSchema) -> Self {
        Self::new(schema.sort_fields())
    }

    builder_methods!();

    fn extract(value: &Value) -> Vec<String> {
        comma_list(value)
            .into_iter()
            .map(|name| {
                name.strip_prefix(['+', '-'])
                    .map(str::to_string)
                    .unwrap_or(name)
            })
            .collect()
    }
}

impl Rule for AllowedSortParameters {
    fn name(&self) -> &str {
        "AllowedSortParameters"
    }

    fn passes(&mut self, _attribute: &str, value: &Value) -> bool {
        self.list.record(value);
        Self::extract(value)
            .iter()
            .all(|name| self.list.contains(name))
    }

    fn message(&self) -> String {
        let invalid = self.list.invalid(Self::extract);
        self.messages.render(self.name(), plurality(&invalid), &invalid)
    }
}

/// Validates that every key in the `page` parameter map is supported.
#[derive(Debug, Clone, Default)]
pub struct AllowedPageParameters {
    list: AllowList,
    messages: Messages,
}

impl AllowedPageParameters {
    /// Allow the given page parameter keys.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            list: AllowList::new(allowed),
            messages: Messages::default(),
        }
    }

    /// Allow the page parameters the schema declares.
    pub fn from_schema(schema: &dyn ResourceSchema) -> Self {
        Self::new(schema.page_parameters())
    }

    builder_methods!();
}

impl Rule for AllowedPageParameters {
    fn name(&self) -> &str {
        "AllowedPageParameters"
    }

    fn passes(&mut self, _attribute: &str, value: &Value) -> bool {
        self.list.record(value);
        map_keys(value).iter().all(|name| self.list.contains(name))
    }

    fn message(&self) -> String {
        let invalid = self.list.invalid(map_keys);
        self.messages.render(self.name(), plurality(&invalid), &invalid)
    }
}

/// Validates that every field in the `withCount` parameter is countable.
#[derive(Debug, Clone, Default)]
pub struct AllowedCountableFields {
    list: AllowList,
    messages: Messages,
}

impl AllowedCountableFields {
    /// Allow the given countable field names.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            list: AllowList::new(allowed),
            messages: Messages::default(),
        }
    }

    /// Allow the countable fields the schema declares.
    pub fn from_schema(schema: &dyn ResourceSchema) -> Self {
        Self::new(schema.countable_fields())
    }

    builder_methods!();
}

impl Rule for AllowedCountableFields {
    fn name(&self) -> &str {
        "AllowedCountableFields"
    }

    fn passes(&mut self, _attribute: &str, value: &Value) -> bool {
        self.list.record(value);
        comma_list(value).iter().all(|name| self.list.contains(name))
    }

    fn message(&self) -> String {
        let invalid = self.list.invalid(comma_list);
        self.messages.render(self.name(), plurality(&invalid), &invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sort_direction_markers_are_stripped() {
        let mut rule = AllowedSortParameters::new(["title", "createdAt"]);
        assert!(rule.passes("sort", &json!("title,-createdAt")));
        assert!(rule.passes("sort", &json!("+title")));
        assert!(!rule.passes("sort", &json!("title,-unknown")));
    }

    #[test]
    fn passes_iff_extracted_subset_of_allowed() {
        let mut rule = AllowedFilterParameters::new(["title", "slug"]);
        assert!(rule.passes("filter", &json!({"title": "a"})));
        assert!(rule.passes("filter", &json!({})));
        assert!(!rule.passes("filter", &json!({"title": "a", "author": "b"})));
    }

    #[test]
    fn message_interpolates_sorted_invalid_subset() {
        let mut rule = AllowedFilterParameters::new(["title"]);
        assert!(!rule.passes("filter", &json!({"zeta": 1, "alpha": 2})));
        assert_eq!(
            rule.message(),
            "Filter parameters alpha, zeta are not allowed."
        );
    }

    #[test]
    fn singular_plural_boundary() {
        let mut rule = AllowedIncludePaths::new(["author"]);

        assert!(rule.passes("include", &json!("author")));
        assert_eq!(
            rule.message(),
            "Include paths must contain only allowed ones."
        );

        assert!(!rule.passes("include", &json!("author,comments")));
        assert_eq!(rule.message(), "Include path comments is not allowed.");

        assert!(!rule.passes("include", &json!("comments,tags")));
        assert_eq!(
            rule.message(),
            "Include paths comments, tags are not allowed."
        );
    }

    #[test]
    fn builders_mutate_the_allowed_set() {
        let mut rule = AllowedPageParameters::new(["number", "size"])
            .allow(["cursor"])
            .forget(["size"]);

        assert!(rule.passes("page", &json!({"number": 1, "cursor": "x"})));
        assert!(!rule.passes("page", &json!({"size": 10})));
    }

    #[test]
    fn forget_if_and_unless() {
        let mut rule = AllowedCountableFields::new(["comments", "tags"])
            .forget_if(true, ["comments"])
            .forget_unless(true, ["tags"]);

        assert!(!rule.passes("withCount", &json!("comments")));
        assert!(rule.passes("withCount", &json!("tags")));
    }

    #[test]
    fn non_string_value_extracts_nothing() {
        let mut rule = AllowedIncludePaths::new(["author"]);
        // A non-string include is someone else's type error; extraction is empty.
        assert!(rule.passes("include", &json!(42)));
    }

    #[test]
    fn revalidation_resets_recorded_value() {
        let mut rule = AllowedSortParameters::new(["title"]);
        assert!(!rule.passes("sort", &json!("bad")));
        assert_eq!(rule.message(), "Sort parameter bad is not allowed.");

        assert!(!rule.passes("sort", &json!("worse,bad")));
        assert_eq!(
            rule.message(),
            "Sort parameters bad, worse are not allowed."
        );
    }
}
