//! Compound queries: union (`|`) and intersection (`&`) of JSONPath queries
//!
//! A compound query has no RFC 9535 counterpart; it is this crate's non-standard way of
//! combining several JSONPath queries into a single result set. Compound queries are only
//! recognized at the top level, via [`crate::environment::Environment::compile_compound`] —
//! never inside a filter expression.
use std::collections::HashSet;

use serde_json::Value;

use crate::environment::Environment;
use crate::node::{LocatedNode, LocatedNodeList};
use crate::path::NormalizedPath;
use crate::JsonPath;

/// The operator joining two queries within a [`CompoundQuery`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOp {
    /// `|`, set union (concatenation, no de-duplication)
    Union,
    /// `&`, set intersection, keyed on each match's normalized location
    Intersection,
}

impl std::fmt::Display for CompoundOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompoundOp::Union => write!(f, "|"),
            CompoundOp::Intersection => write!(f, "&"),
        }
    }
}

/// A sequence of JSONPath queries combined with `|` (union) and `&` (intersection)
///
/// Parsed left-to-right with no operator precedence between `|` and `&`; `a | b & c` evaluates
/// `a`, then unions in `b`, then intersects the running result with `c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundQuery {
    pub(crate) head: JsonPath,
    pub(crate) rest: Vec<(CompoundOp, JsonPath)>,
}

impl CompoundQuery {
    pub(crate) fn new(head: JsonPath, rest: Vec<(CompoundOp, JsonPath)>) -> Self {
        Self { head, rest }
    }

    /// Evaluate this compound query against `value`, using `env` for each constituent query
    pub fn query_located<'v>(&self, value: &'v Value, env: &Environment) -> LocatedNodeList<'v> {
        let mut acc: Vec<LocatedNode<'v>> = self.head.query_located_with(value, env).into_iter().collect();
        for (op, path) in &self.rest {
            let next: Vec<LocatedNode<'v>> = path.query_located_with(value, env).into_iter().collect();
            acc = match op {
                CompoundOp::Union => {
                    acc.extend(next);
                    acc
                }
                CompoundOp::Intersection => {
                    let keep: HashSet<NormalizedPath<'v>> =
                        next.iter().map(|n| n.location().clone()).collect();
                    acc.into_iter().filter(|n| keep.contains(n.location())).collect()
                }
            };
        }
        acc.into()
    }
}

impl std::fmt::Display for CompoundQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.head)?;
        for (op, path) in &self.rest {
            write!(f, " {op} {path}")?;
        }
        Ok(())
    }
}

/// Error produced while compiling a compound query string
#[derive(Debug, thiserror::Error)]
pub enum CompoundQueryError {
    /// One of the constituent query strings failed to parse
    #[error(transparent)]
    Parse(#[from] crate::ParseError),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::environment::Environment;

    #[test]
    fn union_concatenates() {
        let env = Environment::new();
        let value = json!({"a": [1, 2], "b": [3, 4]});
        let cq = env.compile_compound("$.a[*] | $.b[*]").unwrap();
        let nodes: Vec<_> = cq.query_located(&value, &env).nodes().collect();
        assert_eq!(nodes, vec![&json!(1), &json!(2), &json!(3), &json!(4)]);
    }

    #[test]
    fn intersection_keeps_shared_locations() {
        let env = Environment::new();
        let value = json!({"a": [1, 2, 3]});
        let cq = env.compile_compound("$.a[?@ > 1] & $.a[?@ < 3]").unwrap();
        let nodes: Vec<_> = cq.query_located(&value, &env).nodes().collect();
        assert_eq!(nodes, vec![&json!(2)]);
    }

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<super::CompoundQuery>();
    }

    #[test]
    fn test_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<super::CompoundQuery>();
    }
}
