//! Keyed set composition.

use crate::compose::list;
use crate::error::ComposeError;
use crate::fragment::{Context, Resolved, RuleFragment, RuleRef, SELF_KEY, WILDCARD};
use std::collections::BTreeMap;

/// Compose the three fragment sources of a keyed (object-shaped) value into
/// per-key rule lists for one level.
///
/// Paths here are direct sub-keys; dotted flattening is the collector's
/// job. The returned entries carry the reserved `.` entry first (when it is
/// non-empty) followed by the remaining keys in lexicographic order.
pub fn compose(
    prepend: Option<RuleFragment>,
    rules: Option<RuleFragment>,
    append: Option<RuleFragment>,
    ctx: &Context<'_>,
) -> Result<Vec<(String, Vec<RuleRef>)>, ComposeError> {
    let prepend = resolve(prepend, ctx)?;
    let rules = resolve(rules, ctx)?;
    let append = resolve(append, ctx)?;
    compose_resolved(prepend, rules, append, ctx)
}

/// Resolve a fragment source to a keyed map.
///
/// An absent or empty source is an empty map; a positional list here is a
/// contract violation.
pub(crate) fn resolve(
    fragment: Option<RuleFragment>,
    ctx: &Context<'_>,
) -> Result<BTreeMap<String, RuleFragment>, ComposeError> {
    match fragment.map(|f| f.resolve(ctx)).transpose()?.flatten() {
        None => Ok(BTreeMap::new()),
        Some(Resolved::Keyed(map)) => Ok(map),
        Some(Resolved::List(_)) => Err(ComposeError::invalid_fragment(
            "a keyed set",
            "a positional list",
        )),
    }
}

/// Merge already-resolved keyed maps, extract the root entry, and
/// synthesize the closed-membership constraint when the root does not
/// already constrain membership.
///
/// A keyed fragment with no explicit membership constraint is implicitly
/// closed: only the keys actually contributed are legal. Wildcard keys are
/// excluded from the membership parameter list since they constrain
/// collection elements, not named keys.
pub(crate) fn compose_resolved(
    prepend: BTreeMap<String, RuleFragment>,
    rules: BTreeMap<String, RuleFragment>,
    append: BTreeMap<String, RuleFragment>,
    ctx: &Context<'_>,
) -> Result<Vec<(String, Vec<RuleRef>)>, ComposeError> {
    let mut merged: BTreeMap<String, Vec<RuleRef>> = BTreeMap::new();
    for source in [prepend, rules, append] {
        for (key, fragment) in source {
            let wrapped = wrap(fragment, ctx)?;
            merged.entry(key).or_default().extend(wrapped);
        }
    }

    let root = merged.remove(SELF_KEY).unwrap_or_default();
    let constrains_membership = root.iter().any(|rule| rule.name().starts_with("array"));

    let root = if !constrains_membership && !merged.is_empty() {
        let membership = membership_rule(merged.keys());
        list::splice(vec![membership], root, Vec::new())
    } else {
        root
    };

    let mut out = Vec::with_capacity(merged.len() + 1);
    if !root.is_empty() {
        out.push((SELF_KEY.to_string(), root));
    }
    out.extend(merged);
    Ok(out)
}

/// Resolve one keyed value to a rule list, wrapping a single rule into a
/// singleton list via the pipe syntax of [`RuleFragment`].
fn wrap(fragment: RuleFragment, ctx: &Context<'_>) -> Result<Vec<RuleRef>, ComposeError> {
    match fragment.resolve(ctx)? {
        None => Ok(Vec::new()),
        Some(Resolved::List(rules)) => Ok(rules),
        Some(Resolved::Keyed(_)) => Err(ComposeError::invalid_fragment(
            "a rule list for a sub-key",
            "a nested keyed set",
        )),
    }
}

/// The synthesized membership rule over the sorted, deduplicated,
/// non-wildcard key list.
fn membership_rule<'a>(keys: impl Iterator<Item = &'a String>) -> RuleRef {
    let keys: Vec<&str> = keys
        .filter(|key| !key.starts_with(WILDCARD))
        .map(String::as_str)
        .collect();

    if keys.is_empty() {
        RuleRef::named("array")
    } else {
        RuleRef::named(format!("array:{}", keys.join(",")))
    }
}
