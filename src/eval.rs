//! Shared evaluation context threaded through every [`crate::spec::query::Queryable`] call
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::spec::functions::{default_registry, FunctionRegistry};

/// The current key or index bound by an enclosing wildcard, filter, or keys selector
///
/// Exposed inside filter expressions via the `#` (current-key) token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentKey<'b> {
    /// The object member name producing the current node
    Name(&'b str),
    /// The array index producing the current node
    Index(usize),
}

impl<'b> std::fmt::Display for CurrentKey<'b> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurrentKey::Name(n) => write!(f, "{n}"),
            CurrentKey::Index(i) => write!(f, "{i}"),
        }
    }
}

impl<'b> From<CurrentKey<'b>> for Value {
    fn from(key: CurrentKey<'b>) -> Self {
        match key {
            CurrentKey::Name(n) => Value::String(n.to_owned()),
            CurrentKey::Index(i) => Value::from(i as u64),
        }
    }
}

/// A per-top-level-query cache for filter expression results
///
/// Keyed by the address of the filter expression together with the addresses of the current
/// and root nodes it was evaluated against, so repeated evaluation of the same filter against
/// the same inputs (e.g. within a descendant segment visiting many nodes sharing a root) can be
/// skipped. Scoped to a single call to [`crate::JsonPath::query`] or
/// [`crate::environment::Environment::findall`]; never persisted across calls.
#[derive(Debug, Default)]
pub struct FilterCache(RefCell<HashMap<(usize, usize, usize), bool>>);

impl FilterCache {
    /// Create a new, empty cache
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get_or_insert_with(
        &self,
        expr_id: usize,
        current: &Value,
        root: &Value,
        f: impl FnOnce() -> bool,
    ) -> bool {
        let key = (expr_id, current as *const Value as usize, root as *const Value as usize);
        if let Some(v) = self.0.borrow().get(&key) {
            return *v;
        }
        let v = f();
        self.0.borrow_mut().insert(key, v);
        v
    }
}

/// The ambient evaluation context for a single query against a single root value
///
/// This generalizes a bare `root: &'b Value` parameter: in addition to the root, a query may
/// need access to an out-of-document "extra context" value (bound to `_`),
/// the key or index that produced the node currently being tested by a filter (bound to `#`),
/// and a scratch cache for filter results.
///
/// `cache` is an [`Rc`] rather than a borrow: the lifetime `'b` here always matches the root
/// document's lifetime, which is chosen by the caller of [`crate::JsonPath::query`] and may
/// outlive the query call itself, while the cache only needs to live for the duration of one
/// such call. An `Rc` lets each context built during that call share the same cache by bumping a
/// refcount instead of requiring a shorter-lived borrow to somehow outlive `'b`.
#[derive(Clone)]
pub struct EvalContext<'b> {
    /// The root value of the document being queried
    pub root: &'b Value,
    /// The out-of-document value bound to the extra-context identifier (default `_`)
    pub extra: Option<&'b Value>,
    /// The key or index of the node currently under test, bound to `#`
    pub current_key: Option<CurrentKey<'b>>,
    /// Filter result cache, scoped to one top-level query call
    pub cache: Option<Rc<FilterCache>>,
    /// Whether non-standard extensions are enabled
    pub strict: bool,
    /// The function extensions available to filter expressions
    pub functions: &'b FunctionRegistry,
}

impl<'b> EvalContext<'b> {
    /// Create a root evaluation context with no extra context and no current key, using the
    /// default function registry
    pub fn new(root: &'b Value) -> Self {
        Self {
            root,
            extra: None,
            current_key: None,
            cache: None,
            strict: false,
            functions: default_registry(),
        }
    }

    /// Return a copy of this context using the given function registry
    pub fn with_functions(&self, functions: &'b FunctionRegistry) -> Self {
        Self {
            functions,
            ..self.clone()
        }
    }

    /// Return a copy of this context with strict mode set
    pub fn with_strict(&self, strict: bool) -> Self {
        Self {
            strict,
            ..self.clone()
        }
    }

    /// Return a copy of this context with the current key rebound
    pub fn with_key(&self, key: CurrentKey<'b>) -> Self {
        Self {
            current_key: Some(key),
            ..self.clone()
        }
    }

    /// Return a copy of this context with the extra context value set
    pub fn with_extra(&self, extra: &'b Value) -> Self {
        Self {
            extra: Some(extra),
            ..self.clone()
        }
    }
}
