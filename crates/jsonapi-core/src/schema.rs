//! Resource schema metadata traits.
//!
//! The validation layer consumes schema metadata through these traits: field
//! classification for JSON-pointer construction, and the per-resource
//! allow-lists (sparse field sets, sort fields, include paths, countable
//! fields, page parameters).

/// Classification of a resource field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A member of the resource's `attributes` object
    Attribute,
    /// A member of the resource's `relationships` object
    Relationship,
}

/// Metadata for a single resource type.
pub trait ResourceSchema {
    /// The JSON:API resource type (e.g. `posts`).
    fn resource_type(&self) -> &str;

    /// Classify a field by name, `None` for unknown fields.
    fn field_kind(&self, field: &str) -> Option<FieldKind>;

    /// Field names selectable via the `fields` (sparse field set) parameter.
    fn sparse_fields(&self) -> Vec<String>;

    /// Field names accepted by the `sort` parameter, without direction markers.
    fn sort_fields(&self) -> Vec<String> {
        Vec::new()
    }

    /// Relationship paths accepted by the `include` parameter.
    fn include_paths(&self) -> Vec<String> {
        Vec::new()
    }

    /// Relationship names whose related resources can be counted.
    fn countable_fields(&self) -> Vec<String> {
        Vec::new()
    }

    /// Keys accepted within the `page` parameter.
    fn page_parameters(&self) -> Vec<String> {
        vec!["number".to_string(), "size".to_string()]
    }
}

/// Registry of all resource types known to the server.
///
/// Used to recognise resource types named in sparse field set parameters.
pub trait SchemaContainer {
    /// Whether a resource type is registered.
    fn has_type(&self, resource_type: &str) -> bool;

    /// The sparse fields of a registered resource type.
    fn sparse_fields(&self, resource_type: &str) -> Option<Vec<String>>;
}
