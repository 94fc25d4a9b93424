//! Rule references, rule fragments and the composition context.
//!
//! A [`RuleFragment`] is the unit of contribution: each field or filter
//! hands the collector one fragment per operation, and the composition
//! algebra merges fragments into a flat, deterministically ordered
//! [`RuleSet`].

use crate::error::ComposeError;
use jsonapi_core::{QueryParameters, Request};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// The reserved path segment denoting rules for a keyed value itself.
pub const SELF_KEY: &str = ".";

/// The wildcard segment applying to every element of a collection.
pub const WILDCARD: &str = "*";

/// A constraint object: a named rule with a pass/fail predicate and a
/// message rendered from the failing input.
///
/// `passes` records the validated value on the instance so that `message`
/// can recompute the rejected subset afterwards. An instance is therefore
/// only safe to share across validations when each `passes`/`message` pair
/// is serialized.
pub trait Rule: fmt::Debug {
    /// The rule's identifier, used for translation-key lookup.
    fn name(&self) -> &str;

    /// Validate a value, recording it for later message generation.
    fn passes(&mut self, attribute: &str, value: &Value) -> bool;

    /// The error message for the most recent failing `passes` call.
    fn message(&self) -> String;
}

/// A reference to one validation constraint.
///
/// Either a name with optional `:`-separated parameters (`"required"`,
/// `"min:3"`) understood by the validation engine, or a boxed constraint
/// object the engine executes directly.
#[derive(Debug)]
pub enum RuleRef {
    /// A named rule, `"name"` or `"name:param1,param2"`
    Named(String),
    /// A constraint object
    Object(Box<dyn Rule>),
}

impl RuleRef {
    /// Create a named rule reference.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Create a constraint-object rule reference.
    pub fn object(rule: impl Rule + 'static) -> Self {
        Self::Object(Box::new(rule))
    }

    /// The rule name, without parameters.
    pub fn name(&self) -> &str {
        match self {
            Self::Named(raw) => raw.split(':').next().unwrap_or(raw),
            Self::Object(rule) => rule.name(),
        }
    }

    /// The `:`-suffixed parameter payload of a named rule, if any.
    pub fn parameters(&self) -> Option<&str> {
        match self {
            Self::Named(raw) => raw.split_once(':').map(|(_, params)| params),
            Self::Object(_) => None,
        }
    }

    /// Whether this is a presence marker (`required` or `nullable`),
    /// used as the insertion anchor for default rules.
    pub fn is_marker(&self) -> bool {
        matches!(self.name(), "required" | "nullable")
    }
}

impl PartialEq for RuleRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Named(a), Self::Named(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.name() == b.name(),
            _ => false,
        }
    }
}

impl From<&str> for RuleRef {
    fn from(raw: &str) -> Self {
        Self::Named(raw.to_string())
    }
}

impl From<String> for RuleRef {
    fn from(raw: String) -> Self {
        Self::Named(raw)
    }
}

/// The ambient values a deferred fragment may read.
///
/// Passed by reference and never mutated by the composition layer. The
/// model is present for update, deletion and relationship operations; the
/// query is present for query operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct Context<'a> {
    request: Option<&'a Request>,
    model: Option<&'a Value>,
    query: Option<&'a QueryParameters>,
}

impl<'a> Context<'a> {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a create operation: request only.
    pub fn for_create(request: &'a Request) -> Self {
        Self {
            request: Some(request),
            model: None,
            query: None,
        }
    }

    /// Context for an update, deletion or relationship operation: the
    /// request plus the current state of the model.
    pub fn for_update(request: &'a Request, model: &'a Value) -> Self {
        Self {
            request: Some(request),
            model: Some(model),
            query: None,
        }
    }

    /// Context for a query operation.
    pub fn for_query(request: Option<&'a Request>, query: &'a QueryParameters) -> Self {
        Self {
            request,
            model: None,
            query: Some(query),
        }
    }

    /// The request, when one is available.
    pub fn request(&self) -> Option<&'a Request> {
        self.request
    }

    /// The current model state, for update-family operations.
    pub fn model(&self) -> Option<&'a Value> {
        self.model
    }

    /// The query parameters, for query operations.
    pub fn query(&self) -> Option<&'a QueryParameters> {
        self.query
    }
}

/// The deferred form of a fragment: resolved exactly once per composition
/// call, given the active context.
pub type Deferred = Box<dyn FnOnce(&Context<'_>) -> Option<RuleFragment>>;

/// One contributed constraint set.
pub enum RuleFragment {
    /// An ordered, order-significant list of rules for a single value
    List(Vec<RuleRef>),
    /// A mapping from sub-path to nested fragment; the reserved [`SELF_KEY`]
    /// segment holds rules for the keyed value itself
    Keyed(BTreeMap<String, RuleFragment>),
    /// A closure resolving to a fragment given the active context
    Deferred(Deferred),
}

/// A fragment after deferred resolution: a positional list or a keyed set.
pub enum Resolved {
    List(Vec<RuleRef>),
    Keyed(BTreeMap<String, RuleFragment>),
}

impl RuleFragment {
    /// A positional list fragment.
    pub fn list<I, R>(rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RuleRef>,
    {
        Self::List(rules.into_iter().map(Into::into).collect())
    }

    /// A keyed fragment.
    pub fn keyed<I, K, F>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, F)>,
        K: Into<String>,
        F: Into<RuleFragment>,
    {
        Self::Keyed(
            entries
                .into_iter()
                .map(|(key, fragment)| (key.into(), fragment.into()))
                .collect(),
        )
    }

    /// A deferred fragment.
    pub fn deferred(resolve: impl FnOnce(&Context<'_>) -> Option<RuleFragment> + 'static) -> Self {
        Self::Deferred(Box::new(resolve))
    }

    /// Resolve this fragment against the context.
    ///
    /// Deferred closures are invoked exactly once; resolving to `None` or an
    /// empty fragment yields `Ok(None)` ("contributes nothing"). A deferred
    /// fragment resolving to another deferred fragment is a contract
    /// violation.
    pub fn resolve(self, ctx: &Context<'_>) -> Result<Option<Resolved>, ComposeError> {
        match self {
            Self::List(rules) if rules.is_empty() => Ok(None),
            Self::List(rules) => Ok(Some(Resolved::List(rules))),
            Self::Keyed(map) if map.is_empty() => Ok(None),
            Self::Keyed(map) => Ok(Some(Resolved::Keyed(map))),
            Self::Deferred(resolve) => match resolve(ctx) {
                None => Ok(None),
                Some(Self::Deferred(_)) => Err(ComposeError::invalid_fragment(
                    "a list or keyed fragment",
                    "another deferred fragment",
                )),
                Some(inner) => inner.resolve(ctx),
            },
        }
    }
}

impl fmt::Debug for RuleFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(rules) => f.debug_tuple("List").field(rules).finish(),
            Self::Keyed(map) => f.debug_tuple("Keyed").field(map).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<Vec<RuleRef>> for RuleFragment {
    fn from(rules: Vec<RuleRef>) -> Self {
        Self::List(rules)
    }
}

impl From<RuleRef> for RuleFragment {
    fn from(rule: RuleRef) -> Self {
        Self::List(vec![rule])
    }
}

/// `"required|email"` pipe syntax expands to a list of named rules.
impl From<&str> for RuleFragment {
    fn from(raw: &str) -> Self {
        Self::List(
            raw.split('|')
                .filter(|part| !part.is_empty())
                .map(RuleRef::from)
                .collect(),
        )
    }
}

/// The output of composition: dotted path to ordered rule list.
///
/// Path order is lexicographic (the map's natural order) as a determinism
/// guarantee; the order of each rule list is semantically significant.
pub type RuleSet = BTreeMap<String, Vec<RuleRef>>;
