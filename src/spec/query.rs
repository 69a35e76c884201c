//! Types representing queries in JSONPath
use serde_json::Value;

use crate::{
    eval::{CurrentKey, EvalContext},
    node::LocatedNode,
    path::NormalizedPath,
};

use super::{
    segment::{QuerySegment, Segment},
    selector::{filter::TestFilter, index::Index, Selector},
};

mod sealed {
    use crate::spec::{
        segment::{QuerySegment, Segment},
        selector::{
            filter::{Filter, SingularQuery},
            index::Index,
            name::Name,
            slice::Slice,
            Selector,
        },
    };

    use super::Query;

    pub trait Sealed {}
    impl Sealed for Query {}
    impl Sealed for QuerySegment {}
    impl Sealed for Segment {}
    impl Sealed for Slice {}
    impl Sealed for Name {}
    impl Sealed for Selector {}
    impl Sealed for Index {}
    impl Sealed for Filter {}
    impl Sealed for SingularQuery {}
}

/// A type that is query-able
///
/// Every node producible by a query carries a location; `query_located` is a full trait method
/// (not just an inherent method on [`QuerySegment`]/[`Segment`]) so that every selector, including
/// the extension selectors, can report where its matches live.
pub trait Queryable: sealed::Sealed {
    /// Query `self` using a current node and the ambient [`EvalContext`]
    fn query<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> Vec<&'b Value>;

    /// Query `self`, producing the location of each match alongside its value
    fn query_located<'b>(
        &self,
        current: &'b Value,
        ctx: &EvalContext<'b>,
        parent: NormalizedPath<'b>,
    ) -> Vec<LocatedNode<'b>>;
}

/// Represents a JSONPath expression
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Query {
    /// The kind of query: root (`$`), current (`@`), pseudo-root (`^`), or extra context (`_`)
    pub kind: QueryKind,
    /// The segments constituting the query
    pub segments: Vec<QuerySegment>,
}

impl Query {
    pub(crate) fn is_singular(&self) -> bool {
        for s in &self.segments {
            if s.is_descendent() {
                return false;
            }
            if !s.segment.is_singular() {
                return false;
            }
        }
        true
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            QueryKind::Root => write!(f, "$")?,
            QueryKind::Current => write!(f, "@")?,
            QueryKind::PseudoRoot => write!(f, "^")?,
            QueryKind::Extra => write!(f, "_")?,
        }
        for s in &self.segments {
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

/// The kind of query
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub enum QueryKind {
    /// A query against the root of a JSON object, i.e., with `$`
    #[default]
    Root,
    /// A query against the current node within a JSON object, i.e., with `@`
    Current,
    /// A query against a synthetic single-element array wrapping the root, i.e., with `^`
    ///
    /// Lets a filter expression reason about the root's own position, e.g. `^[?@ == $]` matches
    /// when the root itself satisfies the filter.
    PseudoRoot,
    /// A query against the out-of-document extra context value, i.e., with `_`
    Extra,
}

impl Queryable for Query {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Main Query", level = "trace", parent = None, ret))]
    fn query<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> Vec<&'b Value> {
        let mut segments = self.segments.iter();
        let mut query: Vec<&'b Value> = match self.kind {
            QueryKind::Root => vec![ctx.root],
            QueryKind::Current => vec![current],
            QueryKind::PseudoRoot => match segments.next() {
                Some(first) => pseudo_root_segment_query(first, ctx.root, ctx),
                None => vec![ctx.root],
            },
            QueryKind::Extra => ctx.extra.into_iter().collect(),
        };
        for segment in segments {
            let mut new_query = Vec::new();
            for q in &query {
                new_query.append(&mut segment.query(q, ctx));
            }
            query = new_query;
        }
        query
    }

    fn query_located<'b>(
        &self,
        current: &'b Value,
        ctx: &EvalContext<'b>,
        parent: NormalizedPath<'b>,
    ) -> Vec<LocatedNode<'b>> {
        let mut segments = self.segments.iter();
        let mut query: Vec<LocatedNode<'b>> = match self.kind {
            QueryKind::Root => vec![LocatedNode {
                loc: parent.clone(),
                node: ctx.root,
            }],
            QueryKind::Current => vec![LocatedNode {
                loc: parent.clone(),
                node: current,
            }],
            QueryKind::PseudoRoot => match segments.next() {
                Some(first) => pseudo_root_segment_query(first, ctx.root, ctx)
                    .into_iter()
                    .map(|node| LocatedNode {
                        loc: parent.clone(),
                        node,
                    })
                    .collect(),
                None => vec![LocatedNode {
                    loc: parent.clone(),
                    node: ctx.root,
                }],
            },
            QueryKind::Extra => ctx
                .extra
                .into_iter()
                .map(|v| LocatedNode {
                    loc: parent.clone(),
                    node: v,
                })
                .collect(),
        };
        for segment in segments {
            let mut new_query = Vec::new();
            for q in &query {
                new_query.append(&mut segment.query_located(q.node, ctx, q.loc.clone()));
            }
            query = new_query;
        }
        query
    }
}

/// Evaluate the segment immediately following a pseudo-root (`^`) as if `root` were the sole
/// element of a synthetic one-element array, without ever materializing that array.
///
/// A naive implementation would allocate `Value::Array(vec![root.clone()])` and hand out a
/// reference into it, but nothing bounds how long that allocation would need to live (the
/// reference can escape into a caller's long-lived [`crate::NodeList`]), so it would have to be
/// leaked. Evaluating the one meaningful segment directly against `root` sidesteps that: only a
/// child long-hand segment is meaningful here (`^[0]`, `^[*]`, `^[?expr]`); any other
/// first-segment shape (a dot-name, a bare wildcard shorthand, or a descendant segment) falls
/// back to addressing `root` directly, same as a plain `$`.
fn pseudo_root_segment_query<'b>(segment: &QuerySegment, root: &'b Value, ctx: &EvalContext<'b>) -> Vec<&'b Value> {
    if segment.is_child() {
        if let Segment::LongHand(selectors) = &segment.segment {
            return selectors
                .iter()
                .filter(|selector| pseudo_root_selector_matches(selector, root, ctx))
                .map(|_| root)
                .collect();
        }
    }
    vec![root]
}

fn pseudo_root_selector_matches<'b>(selector: &Selector, root: &'b Value, ctx: &EvalContext<'b>) -> bool {
    match selector {
        Selector::Wildcard => true,
        Selector::Index(Index(i)) => *i == 0 || *i == -1,
        Selector::Filter(filter) => filter.0.test_filter(root, &ctx.with_key(CurrentKey::Index(0))),
        _ => false,
    }
}
