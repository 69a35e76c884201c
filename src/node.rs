//! Types representing nodes within a JSON object
use std::slice::Iter;

use serde::Serialize;
use serde_json::Value;

use crate::path::NormalizedPath;

/// A list of nodes resulting from a JSONPath query
///
/// Each node within the list is a borrowed reference to the node in the original
/// [`serde_json::Value`] that was queried.
#[derive(Debug, Default, Eq, PartialEq, Serialize, Clone)]
pub struct NodeList<'a>(pub(crate) Vec<&'a Value>);

impl<'a> NodeList<'a> {
    /// Extract _at most_ one node from a [`NodeList`]
    ///
    /// This is intended for queries that are expected to optionally yield a single node.
    pub fn at_most_one(&self) -> Result<Option<&'a Value>, AtMostOneError> {
        if self.0.is_empty() {
            Ok(None)
        } else if self.0.len() > 1 {
            Err(AtMostOneError(self.0.len()))
        } else {
            Ok(self.0.first().copied())
        }
    }

    /// Extract _exactly_ one node from a [`NodeList`]
    ///
    /// This is intended for queries that are expected to yield exactly one node.
    pub fn exactly_one(&self) -> Result<&'a Value, ExactlyOneError> {
        if self.0.is_empty() {
            Err(ExactlyOneError::Empty)
        } else if self.0.len() > 1 {
            Err(ExactlyOneError::MoreThanOne(self.0.len()))
        } else {
            Ok(self.0.first().unwrap())
        }
    }

    /// Extract all nodes yielded by the query.
    pub fn all(self) -> Vec<&'a Value> {
        self.0
    }

    /// Get the length of a [`NodeList`]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if a [`NodeList`] is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get an iterator over a [`NodeList`]
    ///
    /// Note that [`NodeList`] also implements [`IntoIterator`].
    pub fn iter(&self) -> Iter<'_, &Value> {
        self.0.iter()
    }

    /// Returns the first node in the [`NodeList`], or `None` if it is empty
    pub fn first(&self) -> Option<&'a Value> {
        self.0.first().copied()
    }

    /// Returns the last node in the [`NodeList`], or `None` if it is empty
    pub fn last(&self) -> Option<&'a Value> {
        self.0.last().copied()
    }

    /// Returns the node at the given index in the [`NodeList`], or `None` if the given index is
    /// out of bounds.
    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.0.get(index).copied()
    }
}

/// Error produced when expecting no more than one node from a query
#[derive(Debug, thiserror::Error)]
#[error("nodelist expected to contain at most one entry, but instead contains {0} entries")]
pub struct AtMostOneError(pub usize);

/// Error produced when expecting exactly one node from a query
#[derive(Debug, thiserror::Error)]
pub enum ExactlyOneError {
    /// The query resulted in an empty [`NodeList`]
    #[error("nodelist expected to contain one entry, but is empty")]
    Empty,
    /// The query resulted in a [`NodeList`] containing more than one node
    #[error("nodelist expected to contain one entry, but instead contains {0} entries")]
    MoreThanOne(usize),
}

impl ExactlyOneError {
    /// Check that it is the `Empty` variant
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Check that it is the `MoreThanOne` variant
    pub fn is_more_than_one(&self) -> bool {
        self.as_more_than_one().is_some()
    }

    /// Extract the number of nodes, if it was more than one, or `None` otherwise
    pub fn as_more_than_one(&self) -> Option<usize> {
        match self {
            ExactlyOneError::Empty => None,
            ExactlyOneError::MoreThanOne(u) => Some(*u),
        }
    }
}

impl<'a> From<Vec<&'a Value>> for NodeList<'a> {
    fn from(nodes: Vec<&'a Value>) -> Self {
        Self(nodes)
    }
}

impl<'a> IntoIterator for NodeList<'a> {
    type Item = &'a Value;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> PartialEq<Vec<&'a Value>> for NodeList<'a> {
    fn eq(&self, other: &Vec<&'a Value>) -> bool {
        self.0.eq(other)
    }
}

/// A single node produced by [`crate::JsonPath::query_located`], paired with its location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedNode<'a> {
    pub(crate) loc: NormalizedPath<'a>,
    pub(crate) node: &'a Value,
}

impl<'a> LocatedNode<'a> {
    /// The location of this node, as a [`NormalizedPath`]
    pub fn location(&self) -> &NormalizedPath<'a> {
        &self.loc
    }

    /// Consume this [`LocatedNode`], producing its [`NormalizedPath`]
    pub fn to_location(self) -> NormalizedPath<'a> {
        self.loc
    }

    /// The node's value
    pub fn node(&self) -> &'a Value {
        self.node
    }
}

/// A list of nodes resulting from a JSONPath query, along with their locations
///
/// This is produced by the [`crate::JsonPath::query_located`] method.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LocatedNodeList<'a>(pub(crate) Vec<LocatedNode<'a>>);

impl<'a> LocatedNodeList<'a> {
    /// Extract _at most_ one node from this list
    pub fn at_most_one(&self) -> Result<Option<&LocatedNode<'a>>, AtMostOneError> {
        if self.0.is_empty() {
            Ok(None)
        } else if self.0.len() > 1 {
            Err(AtMostOneError(self.0.len()))
        } else {
            Ok(self.0.first())
        }
    }

    /// Extract _exactly_ one node from this list
    pub fn exactly_one(&self) -> Result<&LocatedNode<'a>, ExactlyOneError> {
        if self.0.is_empty() {
            Err(ExactlyOneError::Empty)
        } else if self.0.len() > 1 {
            Err(ExactlyOneError::MoreThanOne(self.0.len()))
        } else {
            Ok(self.0.first().unwrap())
        }
    }

    /// The number of nodes in this list
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the located nodes
    pub fn iter(&self) -> std::slice::Iter<'_, LocatedNode<'a>> {
        self.0.iter()
    }

    /// Extract just the nodes, discarding locations, as a [`Nodes`]
    pub fn nodes(&self) -> Nodes<'_, 'a> {
        Nodes(self.0.iter())
    }

    /// Extract just the locations, discarding nodes, as a [`Locations`]
    pub fn locations(&self) -> Locations<'_, 'a> {
        Locations(self.0.iter())
    }

    /// Remove nodes whose (value, location) pair is a duplicate of an earlier one
    ///
    /// Two nodes are duplicates if they point to the same location; since a well-formed query
    /// produces at most one node per location already, this mainly matters for compound queries.
    pub fn dedup(mut self) -> Self {
        let mut seen = std::collections::HashSet::new();
        self.0.retain(|n| seen.insert(n.loc.clone()));
        self
    }
}

impl<'a> From<Vec<LocatedNode<'a>>> for LocatedNodeList<'a> {
    fn from(nodes: Vec<LocatedNode<'a>>) -> Self {
        Self(nodes)
    }
}

impl<'a> IntoIterator for LocatedNodeList<'a> {
    type Item = LocatedNode<'a>;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// An iterator over just the node values of a [`LocatedNodeList`]
#[derive(Debug, Clone)]
pub struct Nodes<'i, 'a>(std::slice::Iter<'i, LocatedNode<'a>>);

impl<'i, 'a> Iterator for Nodes<'i, 'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|n| n.node)
    }
}

/// An iterator over just the locations of a [`LocatedNodeList`]
#[derive(Debug, Clone)]
pub struct Locations<'i, 'a>(std::slice::Iter<'i, LocatedNode<'a>>);

impl<'i, 'a> Iterator for Locations<'i, 'a> {
    type Item = &'i NormalizedPath<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|n| &n.loc)
    }
}

#[cfg(test)]
mod tests {
    use super::NodeList;
    use crate::JsonPath;
    use serde_json::{json, to_value};

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<NodeList>();
    }

    #[test]
    fn test_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<NodeList>();
    }

    #[test]
    fn test_serialize() {
        let v = json!([1, 2, 3, 4]);
        let q = JsonPath::parse("$.*").expect("valid query").query(&v);
        assert_eq!(to_value(q).expect("serialize"), v);
    }
}
