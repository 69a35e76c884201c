//! Index selectors in JSONPath
use serde_json::Value;

use crate::{eval::EvalContext, node::LocatedNode, path::NormalizedPath, spec::query::Queryable};

/// For selecting array elements by their index
///
/// Can use negative indices to index from the end of an array
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Index(pub isize);

impl std::fmt::Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{index}", index = self.0)
    }
}

impl Index {
    fn resolve(self, len: usize) -> Option<usize> {
        if self.0 < 0 {
            self.0
                .checked_abs()
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| len.checked_sub(i))
        } else {
            usize::try_from(self.0).ok()
        }
    }
}

impl Queryable for Index {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Index", level = "trace", parent = None, ret))]
    fn query<'b>(&self, current: &'b Value, _ctx: &EvalContext<'b>) -> Vec<&'b Value> {
        if let Some(list) = current.as_array() {
            self.resolve(list.len())
                .and_then(|i| list.get(i))
                .into_iter()
                .collect()
        } else {
            vec![]
        }
    }

    fn query_located<'b>(
        &self,
        current: &'b Value,
        _ctx: &EvalContext<'b>,
        parent: NormalizedPath<'b>,
    ) -> Vec<LocatedNode<'b>> {
        if let Some(list) = current.as_array() {
            self.resolve(list.len())
                .and_then(|i| list.get(i).map(|v| (i, v)))
                .map(|(i, v)| LocatedNode {
                    loc: parent.clone_and_push(i),
                    node: v,
                })
                .into_iter()
                .collect()
        } else {
            vec![]
        }
    }
}

impl From<isize> for Index {
    fn from(i: isize) -> Self {
        Self(i)
    }
}
