//! Shape-inferring composition.

use crate::compose::{keyed, list, Composed};
use crate::error::ComposeError;
use crate::fragment::{Context, Resolved, RuleFragment, RuleRef};
use std::collections::BTreeMap;

/// Compose three fragment sources whose shape the caller does not know
/// upfront.
///
/// The shape of the first non-empty resolved source — defaults, then rules,
/// then append — dictates whether the list or keyed composer handles all
/// three. Fields are authored independently and some contribute only
/// `append`, so the decision must be deferred to whichever source is
/// actually supplied. When all three resolve empty, the result is an empty
/// list.
pub fn compose(
    defaults: Option<RuleFragment>,
    rules: Option<RuleFragment>,
    append: Option<RuleFragment>,
    ctx: &Context<'_>,
) -> Result<Composed, ComposeError> {
    let defaults = resolve(defaults, ctx)?;
    let rules = resolve(rules, ctx)?;
    let append = resolve(append, ctx)?;

    let keyed_mode = [&defaults, &rules, &append]
        .into_iter()
        .find_map(|resolved| {
            resolved
                .as_ref()
                .map(|shape| matches!(shape, Resolved::Keyed(_)))
        });

    match keyed_mode {
        None => Ok(Composed::List(Vec::new())),
        Some(false) => {
            let out = list::splice(
                expect_list(defaults)?,
                expect_list(rules)?,
                expect_list(append)?,
            );
            Ok(Composed::List(out))
        }
        Some(true) => {
            let out = keyed::compose_resolved(
                expect_keyed(defaults)?,
                expect_keyed(rules)?,
                expect_keyed(append)?,
                ctx,
            )?;
            Ok(Composed::Keyed(out))
        }
    }
}

fn resolve(
    fragment: Option<RuleFragment>,
    ctx: &Context<'_>,
) -> Result<Option<Resolved>, ComposeError> {
    Ok(fragment.map(|f| f.resolve(ctx)).transpose()?.flatten())
}

fn expect_list(resolved: Option<Resolved>) -> Result<Vec<RuleRef>, ComposeError> {
    match resolved {
        None => Ok(Vec::new()),
        Some(Resolved::List(rules)) => Ok(rules),
        Some(Resolved::Keyed(_)) => Err(ComposeError::invalid_fragment(
            "a positional list",
            "a keyed set",
        )),
    }
}

fn expect_keyed(resolved: Option<Resolved>) -> Result<BTreeMap<String, RuleFragment>, ComposeError> {
    match resolved {
        None => Ok(BTreeMap::new()),
        Some(Resolved::Keyed(map)) => Ok(map),
        Some(Resolved::List(_)) => Err(ComposeError::invalid_fragment(
            "a keyed set",
            "a positional list",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::RuleRef;

    #[test]
    fn defaults_decide_list_mode() {
        let out = compose(
            Some(RuleFragment::from("string")),
            Some(RuleFragment::from("required")),
            None,
            &Context::new(),
        )
        .unwrap();

        assert_eq!(
            out,
            Composed::List(vec![RuleRef::named("required"), RuleRef::named("string")])
        );
    }

    #[test]
    fn rules_decide_when_defaults_empty() {
        let out = compose(
            None,
            Some(RuleFragment::keyed([("name", "required")])),
            None,
            &Context::new(),
        )
        .unwrap();

        assert!(matches!(out, Composed::Keyed(_)));
    }

    #[test]
    fn append_decides_when_others_empty() {
        let out = compose(
            Some(RuleFragment::List(Vec::new())),
            None,
            Some(RuleFragment::keyed([("size", "integer")])),
            &Context::new(),
        )
        .unwrap();

        assert!(matches!(out, Composed::Keyed(_)));
    }

    #[test]
    fn all_empty_defaults_to_list_mode() {
        let out = compose(None, None, None, &Context::new()).unwrap();
        assert_eq!(out, Composed::List(Vec::new()));
        assert!(out.is_empty());
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let out = compose(
            Some(RuleFragment::from("string")),
            Some(RuleFragment::keyed([("name", "required")])),
            None,
            &Context::new(),
        );
        assert!(matches!(out, Err(ComposeError::InvalidFragment { .. })));
    }
}
