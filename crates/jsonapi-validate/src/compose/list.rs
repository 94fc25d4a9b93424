//! Positional list composition.

use crate::error::ComposeError;
use crate::fragment::{Context, Resolved, RuleFragment, RuleRef};

/// Compose the three fragment sources of a single positional value into one
/// ordered rule list.
///
/// `rules` then `append` concatenate into the base list. Non-empty defaults
/// are spliced immediately after the first `required` marker (falling back
/// to the first `nullable` marker), or prepended when the base has neither:
/// presence declarations must run before any other constraint, but defaults
/// still precede the remaining user-supplied rules.
pub fn compose(
    defaults: Option<RuleFragment>,
    rules: Option<RuleFragment>,
    append: Option<RuleFragment>,
    ctx: &Context<'_>,
) -> Result<Vec<RuleRef>, ComposeError> {
    let defaults = resolve(defaults, ctx)?;
    let rules = resolve(rules, ctx)?;
    let append = resolve(append, ctx)?;
    Ok(splice(defaults, rules, append))
}

/// Resolve a fragment source to a rule list.
///
/// An absent or empty source is an empty list; a keyed fragment here is a
/// contract violation.
pub(crate) fn resolve(
    fragment: Option<RuleFragment>,
    ctx: &Context<'_>,
) -> Result<Vec<RuleRef>, ComposeError> {
    match fragment.map(|f| f.resolve(ctx)).transpose()?.flatten() {
        None => Ok(Vec::new()),
        Some(Resolved::List(rules)) => Ok(rules),
        Some(Resolved::Keyed(_)) => Err(ComposeError::invalid_fragment(
            "a positional list",
            "a keyed set",
        )),
    }
}

/// Merge already-resolved lists per the anchor algorithm.
pub(crate) fn splice(
    defaults: Vec<RuleRef>,
    rules: Vec<RuleRef>,
    append: Vec<RuleRef>,
) -> Vec<RuleRef> {
    let mut base = rules;
    base.extend(append);

    if defaults.is_empty() {
        return base;
    }

    let anchor = base
        .iter()
        .position(|rule| rule.name() == "required")
        .or_else(|| base.iter().position(|rule| rule.name() == "nullable"));

    match anchor {
        Some(index) => {
            base.splice(index + 1..index + 1, defaults);
            base
        }
        None => {
            let mut out = defaults;
            out.extend(base);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rules: &[RuleRef]) -> Vec<&str> {
        rules
            .iter()
            .map(|rule| match rule {
                RuleRef::Named(raw) => raw.as_str(),
                RuleRef::Object(rule) => rule.name(),
            })
            .collect()
    }

    #[test]
    fn defaults_splice_after_required() {
        let out = compose(
            Some(RuleFragment::from("string")),
            Some(RuleFragment::from("bail|required|email")),
            None,
            &Context::new(),
        )
        .unwrap();

        assert_eq!(names(&out), vec!["bail", "required", "string", "email"]);
    }

    #[test]
    fn defaults_splice_after_nullable_when_no_required() {
        let out = compose(
            Some(RuleFragment::from("string|max:255")),
            Some(RuleFragment::from("nullable|email")),
            None,
            &Context::new(),
        )
        .unwrap();

        assert_eq!(names(&out), vec!["nullable", "string", "max:255", "email"]);
    }

    #[test]
    fn required_wins_over_earlier_nullable() {
        // The first `required` is the anchor even when `nullable` appears first.
        let out = compose(
            Some(RuleFragment::from("string")),
            Some(RuleFragment::from("nullable|required")),
            None,
            &Context::new(),
        )
        .unwrap();

        assert_eq!(names(&out), vec!["nullable", "required", "string"]);
    }

    #[test]
    fn defaults_prepend_without_marker() {
        let out = compose(
            Some(RuleFragment::from("string")),
            Some(RuleFragment::from("email|max:255")),
            None,
            &Context::new(),
        )
        .unwrap();

        assert_eq!(names(&out), vec!["string", "email", "max:255"]);
    }

    #[test]
    fn empty_defaults_is_identity() {
        let out = compose(
            None,
            Some(RuleFragment::from("email")),
            Some(RuleFragment::from("max:255")),
            &Context::new(),
        )
        .unwrap();

        assert_eq!(names(&out), vec!["email", "max:255"]);
    }

    #[test]
    fn all_sources_empty_is_empty() {
        let out = compose(None, None, None, &Context::new()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn keyed_source_is_rejected() {
        let keyed = RuleFragment::keyed([("name", "required")]);
        assert!(matches!(
            compose(None, Some(keyed), None, &Context::new()),
            Err(ComposeError::InvalidFragment { .. })
        ));
    }

    #[test]
    fn deferred_sources_resolve_with_context() {
        let out = compose(
            Some(RuleFragment::deferred(|_| Some("string".into()))),
            Some(RuleFragment::from("required")),
            Some(RuleFragment::deferred(|_| None)),
            &Context::new(),
        )
        .unwrap();

        assert_eq!(names(&out), vec!["required", "string"]);
    }
}
