//! Per-operation rule composition entry points for one resource type.

use crate::collector;
use crate::error::ComposeError;
use crate::fragment::{Context, RuleRef, RuleSet};
use crate::i18n::Messages;
use crate::rules::{
    AllowedCountableFields, AllowedFieldSets, AllowedFilterParameters, AllowedIncludePaths,
    AllowedPageParameters, AllowedSortParameters,
};
use crate::schema::{ValidatedField, ValidatedFilter};
use jsonapi_core::{ResourceSchema, SchemaContainer};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Assembles rule sets for every operation on one resource type.
///
/// Built once per request from the resource's schema, declared fields and
/// filters; each `*_rules` call composes a fresh rule set for the given
/// context.
pub struct ResourceValidator<'a> {
    schema: &'a dyn ResourceSchema,
    container: Option<Arc<dyn SchemaContainer + Send + Sync>>,
    fields: Vec<&'a dyn ValidatedField>,
    filters: Vec<&'a dyn ValidatedFilter>,
    messages: Messages,
}

impl<'a> ResourceValidator<'a> {
    /// A validator for the given resource schema.
    pub fn new(schema: &'a dyn ResourceSchema) -> Self {
        Self {
            schema,
            container: None,
            fields: Vec::new(),
            filters: Vec::new(),
            messages: Messages::default(),
        }
    }

    /// Recognise other resource types through the schema container, for
    /// sparse field set validation.
    pub fn with_container(mut self, container: Arc<dyn SchemaContainer + Send + Sync>) -> Self {
        self.container = Some(container);
        self
    }

    /// Use custom messages for the allow-list rules.
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    /// Declare a validated field.
    pub fn field(mut self, field: &'a dyn ValidatedField) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare validated fields.
    pub fn fields(mut self, fields: impl IntoIterator<Item = &'a dyn ValidatedField>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Declare a validated filter.
    pub fn filter(mut self, filter: &'a dyn ValidatedFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Declare validated filters.
    pub fn filters(mut self, filters: impl IntoIterator<Item = &'a dyn ValidatedFilter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Rules for creating a resource. Context: request only.
    pub fn creation_rules(&self, ctx: &Context<'_>) -> Result<RuleSet, ComposeError> {
        let set = collector::creation_rules(self.fields.iter().copied(), ctx)?;
        self.trace("create", &set);
        Ok(set)
    }

    /// Rules for updating a resource. Context: request plus current model.
    pub fn update_rules(&self, ctx: &Context<'_>) -> Result<RuleSet, ComposeError> {
        let set = collector::update_rules(self.fields.iter().copied(), ctx)?;
        self.trace("update", &set);
        Ok(set)
    }

    /// Rules for deleting a resource. Context: request plus current model.
    pub fn deletion_rules(&self, ctx: &Context<'_>) -> Result<RuleSet, ComposeError> {
        let set = collector::deletion_rules(self.fields.iter().copied(), ctx)?;
        self.trace("delete", &set);
        Ok(set)
    }

    /// Rules for modifying one relationship.
    ///
    /// Unknown fields and fields contributing no rules are configuration
    /// errors.
    pub fn relationship_rules(
        &self,
        field: &str,
        ctx: &Context<'_>,
    ) -> Result<RuleSet, ComposeError> {
        let found = self
            .fields
            .iter()
            .find(|candidate| candidate.name() == field)
            .ok_or_else(|| ComposeError::UnknownRelationship {
                field: field.to_string(),
            })?;
        let set = collector::relationship_rules(*found, ctx)?;
        self.trace("relationship", &set);
        Ok(set)
    }

    /// Rules for fetching one resource. Page and sort parameters are
    /// rejected upstream for to-one fetches and carry no rules here.
    pub fn query_one_rules(&self, ctx: &Context<'_>) -> Result<RuleSet, ComposeError> {
        let set = self.query_rules(ctx, false)?;
        self.trace("query-one", &set);
        Ok(set)
    }

    /// Rules for fetching many resources, including pagination and sorting.
    pub fn query_many_rules(&self, ctx: &Context<'_>) -> Result<RuleSet, ComposeError> {
        let set = self.query_rules(ctx, true)?;
        self.trace("query-many", &set);
        Ok(set)
    }

    /// Human-readable labels for message interpolation, collected from the
    /// declared fields.
    pub fn attribute_labels(&self) -> HashMap<String, String> {
        self.fields
            .iter()
            .filter_map(|field| {
                field
                    .attribute_label()
                    .map(|label| (field.name().to_string(), label.to_string()))
            })
            .collect()
    }

    fn query_rules(&self, ctx: &Context<'_>, many: bool) -> Result<RuleSet, ComposeError> {
        let mut set = RuleSet::new();

        for filter in &self.filters {
            if let Some(fragment) = filter.query_rules(ctx)? {
                let path = format!("filter.{}", filter.name());
                collector::flatten_into(&mut set, &path, fragment, ctx)?;
            }
        }

        let field_sets = match &self.container {
            Some(container) => AllowedFieldSets::with_container(container.clone()),
            None => AllowedFieldSets::new()
                .allow(self.schema.resource_type(), self.schema.sparse_fields()),
        }
        .with_messages(self.messages.clone());

        let filter_names: Vec<&str> = self.filters.iter().map(|filter| filter.name()).collect();

        set.insert(
            "fields".to_string(),
            vec![
                RuleRef::named("nullable"),
                RuleRef::named("array"),
                RuleRef::object(field_sets),
            ],
        );
        set.insert(
            "filter".to_string(),
            vec![
                RuleRef::named("nullable"),
                RuleRef::named("array"),
                RuleRef::object(
                    AllowedFilterParameters::new(filter_names)
                        .with_messages(self.messages.clone()),
                ),
            ],
        );
        set.insert(
            "include".to_string(),
            vec![
                RuleRef::named("nullable"),
                RuleRef::named("string"),
                RuleRef::object(
                    AllowedIncludePaths::from_schema(self.schema)
                        .with_messages(self.messages.clone()),
                ),
            ],
        );
        set.insert(
            "withCount".to_string(),
            vec![
                RuleRef::named("nullable"),
                RuleRef::named("string"),
                RuleRef::object(
                    AllowedCountableFields::from_schema(self.schema)
                        .with_messages(self.messages.clone()),
                ),
            ],
        );

        if many {
            set.insert(
                "page".to_string(),
                vec![
                    RuleRef::named("nullable"),
                    RuleRef::named("array"),
                    RuleRef::object(
                        AllowedPageParameters::from_schema(self.schema)
                            .with_messages(self.messages.clone()),
                    ),
                ],
            );
            set.insert(
                "sort".to_string(),
                vec![
                    RuleRef::named("nullable"),
                    RuleRef::named("string"),
                    RuleRef::object(
                        AllowedSortParameters::from_schema(self.schema)
                            .with_messages(self.messages.clone()),
                    ),
                ],
            );
        }

        Ok(set)
    }

    fn trace(&self, operation: &str, set: &RuleSet) {
        debug!(
            resource_type = self.schema.resource_type(),
            operation,
            paths = set.len(),
            "composed rule set"
        );
    }
}
