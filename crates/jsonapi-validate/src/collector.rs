//! Field rule collectors.
//!
//! A collector walks a resource's declared fields, invokes each field's
//! per-operation contribution hook, and recursively flattens keyed
//! fragments into the final flat rule set keyed by dotted paths. Paths are
//! accumulated into a [`RuleSet`], whose map order supplies the single
//! lexicographic sort the output guarantees.

use crate::error::ComposeError;
use crate::fragment::{Context, Resolved, RuleFragment, RuleSet, SELF_KEY};
use crate::schema::ValidatedField;
use tracing::trace;

/// Collect creation rules across fields. Context: request only.
pub fn creation_rules<'a>(
    fields: impl IntoIterator<Item = &'a dyn ValidatedField>,
    ctx: &Context<'_>,
) -> Result<RuleSet, ComposeError> {
    collect(fields, ctx, |field, ctx| field.creation_rules(ctx))
}

/// Collect update rules across fields. Context: request plus current model
/// state, since update rules may depend on what is already stored.
pub fn update_rules<'a>(
    fields: impl IntoIterator<Item = &'a dyn ValidatedField>,
    ctx: &Context<'_>,
) -> Result<RuleSet, ComposeError> {
    collect(fields, ctx, |field, ctx| field.update_rules(ctx))
}

/// Collect deletion rules across fields. Context: request plus model.
pub fn deletion_rules<'a>(
    fields: impl IntoIterator<Item = &'a dyn ValidatedField>,
    ctx: &Context<'_>,
) -> Result<RuleSet, ComposeError> {
    collect(fields, ctx, |field, ctx| field.deletion_rules(ctx))
}

/// Collect rules for exactly one relationship field.
///
/// A relationship endpoint validates a single field, and a relationship
/// that contributes nothing is a configuration error, not a validation
/// failure.
pub fn relationship_rules(
    field: &dyn ValidatedField,
    ctx: &Context<'_>,
) -> Result<RuleSet, ComposeError> {
    let set = collect([field], ctx, |field, ctx| field.update_rules(ctx))?;
    if set.is_empty() {
        return Err(ComposeError::EmptyRelationshipRules {
            field: field.name().to_string(),
        });
    }
    Ok(set)
}

fn collect<'a>(
    fields: impl IntoIterator<Item = &'a dyn ValidatedField>,
    ctx: &Context<'_>,
    contribute: impl Fn(
        &dyn ValidatedField,
        &Context<'_>,
    ) -> Result<Option<RuleFragment>, ComposeError>,
) -> Result<RuleSet, ComposeError> {
    let mut set = RuleSet::new();
    for field in fields {
        match contribute(field, ctx)? {
            None => trace!(field = field.name(), "field contributes no rules"),
            Some(fragment) => flatten_into(&mut set, field.name(), fragment, ctx)?,
        }
    }
    Ok(set)
}

/// Depth-first flatten of a fragment into dotted paths rooted at `path`.
///
/// The reserved `.` key applies its fragment to `path` itself; other keys
/// extend the path. Each nesting level works on a freshly built path
/// string, so no recursion level aliases another's state.
pub(crate) fn flatten_into(
    set: &mut RuleSet,
    path: &str,
    fragment: RuleFragment,
    ctx: &Context<'_>,
) -> Result<(), ComposeError> {
    match fragment.resolve(ctx)? {
        None => Ok(()),
        Some(Resolved::List(rules)) => {
            set.entry(path.to_string()).or_default().extend(rules);
            Ok(())
        }
        Some(Resolved::Keyed(map)) => {
            for (key, sub) in map {
                if key == SELF_KEY {
                    if path.is_empty() {
                        return Err(ComposeError::UnexpectedRootPath);
                    }
                    flatten_into(set, path, sub, ctx)?;
                } else if path.is_empty() {
                    flatten_into(set, &key, sub, ctx)?;
                } else {
                    flatten_into(set, &format!("{path}.{key}"), sub, ctx)?;
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::RuleComposition;
    use crate::fragment::RuleRef;

    struct Title;

    impl ValidatedField for Title {
        fn name(&self) -> &str {
            "title"
        }

        fn creation_rules(&self, ctx: &Context<'_>) -> Result<Option<RuleFragment>, ComposeError> {
            RuleComposition::new()
                .defaults("string")
                .rules("required|max:255")
                .into_fragment(ctx)
        }
    }

    struct Author;

    impl ValidatedField for Author {
        fn name(&self) -> &str {
            "author"
        }

        fn update_rules(&self, ctx: &Context<'_>) -> Result<Option<RuleFragment>, ComposeError> {
            RuleComposition::new()
                .rules(RuleFragment::keyed([("type", "required|in:users"), ("id", "required")]))
                .into_fragment(ctx)
        }
    }

    struct Silent;

    impl ValidatedField for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        fn creation_rules(&self, _ctx: &Context<'_>) -> Result<Option<RuleFragment>, ComposeError> {
            Ok(Some(RuleFragment::List(Vec::new())))
        }
    }

    #[test]
    fn positional_contribution_lands_at_field_path() {
        let ctx = Context::new();
        let set = creation_rules([&Title as &dyn ValidatedField], &ctx).unwrap();

        assert_eq!(
            set.get("title").unwrap(),
            &vec![
                RuleRef::named("required"),
                RuleRef::named("string"),
                RuleRef::named("max:255"),
            ]
        );
    }

    #[test]
    fn keyed_contribution_flattens_to_dotted_paths() {
        let ctx = Context::new();
        let set = update_rules([&Author as &dyn ValidatedField], &ctx).unwrap();

        let paths: Vec<&str> = set.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["author", "author.id", "author.type"]);
        // The synthesized membership rule lands on the field itself.
        assert_eq!(
            set.get("author").unwrap(),
            &vec![RuleRef::named("array:id,type")]
        );
    }

    #[test]
    fn empty_contribution_leaves_no_trace() {
        let ctx = Context::new();
        let set = creation_rules(
            [&Silent as &dyn ValidatedField, &Title as &dyn ValidatedField],
            &ctx,
        )
        .unwrap();

        assert!(!set.contains_key("silent"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn path_order_is_lexicographic_regardless_of_declaration_order() {
        struct Named(&'static str);
        impl ValidatedField for Named {
            fn name(&self) -> &str {
                self.0
            }
            fn creation_rules(
                &self,
                _ctx: &Context<'_>,
            ) -> Result<Option<RuleFragment>, ComposeError> {
                Ok(Some(RuleFragment::from("string")))
            }
        }

        let (zulu, alpha) = (Named("zulu"), Named("alpha"));
        let ctx = Context::new();
        let set = creation_rules(
            [&zulu as &dyn ValidatedField, &alpha as &dyn ValidatedField],
            &ctx,
        )
        .unwrap();

        let paths: Vec<&str> = set.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["alpha", "zulu"]);
    }

    #[test]
    fn relationship_collector_rejects_empty_contribution() {
        let ctx = Context::new();
        let error = relationship_rules(&Silent, &ctx).unwrap_err();
        assert_eq!(
            error,
            ComposeError::EmptyRelationshipRules {
                field: "silent".to_string()
            }
        );
    }

    #[test]
    fn relationship_collector_returns_the_single_field_rules() {
        let ctx = Context::new();
        let set = relationship_rules(&Author, &ctx).unwrap();
        assert!(set.contains_key("author.type"));
        assert!(set.contains_key("author.id"));
    }

    #[test]
    fn nested_keyed_fragments_flatten_recursively() {
        struct Meta;
        impl ValidatedField for Meta {
            fn name(&self) -> &str {
                "meta"
            }
            fn creation_rules(
                &self,
                _ctx: &Context<'_>,
            ) -> Result<Option<RuleFragment>, ComposeError> {
                // A plain nested map, flattened as-is without composer
                // involvement at the inner levels.
                Ok(Some(RuleFragment::keyed([(
                    "geo",
                    RuleFragment::keyed([
                        ("lat", RuleFragment::from("required|numeric")),
                        ("lng", RuleFragment::from("required|numeric")),
                    ]),
                )])))
            }
        }

        let ctx = Context::new();
        let set = creation_rules([&Meta as &dyn ValidatedField], &ctx).unwrap();

        let paths: Vec<&str> = set.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["meta.geo.lat", "meta.geo.lng"]);
    }
}
