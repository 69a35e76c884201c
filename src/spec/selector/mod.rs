//! Types representing the different selectors in JSONPath
pub mod filter;
pub mod index;
pub mod name;
pub mod slice;

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::{
    eval::{CurrentKey, EvalContext},
    node::LocatedNode,
    path::{NormalizedPath, PathElement},
};

use self::{filter::Filter, filter::SingularQuery, index::Index, name::Name, slice::Slice};

use super::query::Queryable;

/// A JSONPath selector
#[derive(Debug, PartialEq, Clone)]
pub enum Selector {
    /// Select an object key
    Name(Name),
    /// Select all nodes
    ///
    /// For an object, this produces a nodelist of all member values; for an array, this produces a
    /// nodelist of all array elements.
    Wildcard,
    /// Select an array element
    Index(Index),
    /// Select a slice from an array
    ArraySlice(Slice),
    /// Use a filter to select nodes
    Filter(Filter),
    /// The keys selector, `~`, selecting an object's member names as values
    Keys,
    /// A key selector, e.g. `~'foo'`, selecting a single member name as a value if present
    Key(String),
    /// A keys-filter selector, e.g. `~?# == 'foo'`, testing each member's key against a filter
    /// expression, with `@` bound to the member's value and `#` bound to its key
    KeysFilter(Filter),
    /// An embedded singular query used in place of a literal name or index, e.g. `[$.idx]`
    SingularQuerySelector(SingularQuery),
}

impl Selector {
    /// Will the selector select at most only a single node
    pub fn is_singular(&self) -> bool {
        matches!(self, Selector::Name(_) | Selector::Index(_) | Selector::Key(_))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Name(name) => write!(f, "{name}"),
            Selector::Wildcard => write!(f, "*"),
            Selector::Index(index) => write!(f, "{index}"),
            Selector::ArraySlice(slice) => write!(f, "{slice}"),
            Selector::Filter(filter) => write!(f, "?{filter}"),
            Selector::Keys => write!(f, "~"),
            Selector::Key(name) => write!(f, "~'{name}'"),
            Selector::KeysFilter(filter) => write!(f, "~?{filter}"),
            Selector::SingularQuerySelector(query) => write!(f, "{query}"),
        }
    }
}

/// A process-wide cache of leaked key-string [`Value`]s, keyed by the string itself
///
/// See [`leak_key_value`] for why these are leaked at all; this cache bounds the leak to one
/// allocation per *distinct* key string the process ever matches with a keys selector, rather
/// than one per match.
static KEY_VALUE_CACHE: Lazy<Mutex<HashMap<String, &'static Value>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Produce a `'static` reference to a string value equal to `key`, reusing a prior leak for the
/// same key if one exists
///
/// Object member names in a [`serde_json::Map`] are `String`s, not `Value`s, so a keys selector
/// has nothing to borrow a `&Value` from: the matched key is a value synthesized by the query,
/// not a node that lives anywhere in the input document. [`crate::NodeList`] only ever holds
/// borrowed `&'a Value`s, so satisfying that signature for a synthesized value means giving it a
/// `'static` lifetime, which this does by leaking, deduplicated through [`KEY_VALUE_CACHE`] so a
/// repeatedly-matched key (e.g. the same object shape queried many times) leaks only once.
///
/// A fully leak-free version would require widening [`crate::NodeList`]/
/// [`crate::node::LocatedNode`] to hold `Cow<'a, Value>` everywhere, which would ripple through
/// every consumer of a query result for a selector family most queries never touch.
///
/// Shared with the non-standard `keys()` function (see
/// [`crate::spec::functions::keys_function`]), which synthesizes object-key values the same way.
pub(crate) fn leak_key_value(key: &str) -> &'static Value {
    let mut cache = KEY_VALUE_CACHE.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(v) = cache.get(key) {
        return v;
    }
    let v: &'static Value = Box::leak(Box::new(Value::String(key.to_owned())));
    cache.insert(key.to_owned(), v);
    v
}

/// A process-wide cache of leaked array-index [`Value`]s, keyed by the index itself
///
/// Mirrors [`KEY_VALUE_CACHE`]/[`leak_key_value`] for the array-index values the `keys()` function
/// synthesizes for array arguments; indices repeat far more than key strings do (every array of
/// length N shares indices 0..N with every other array of length >= N), so this cache also bounds
/// the total number of leaked allocations to the largest array length any query has ever seen.
static INDEX_VALUE_CACHE: Lazy<Mutex<HashMap<usize, &'static Value>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Produce a `'static` reference to a number value equal to `index`, reusing a prior leak for the
/// same index if one exists
pub(crate) fn leak_index_value(index: usize) -> &'static Value {
    let mut cache = INDEX_VALUE_CACHE.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(v) = cache.get(&index) {
        return v;
    }
    let v: &'static Value = Box::leak(Box::new(Value::from(index)));
    cache.insert(index, v);
    v
}

impl Queryable for Selector {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Selector", level = "trace", parent = None, ret))]
    fn query<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> Vec<&'b Value> {
        let mut query = Vec::new();
        match self {
            Selector::Name(name) => query.append(&mut name.query(current, ctx)),
            Selector::Wildcard => {
                if let Some(list) = current.as_array() {
                    for v in list {
                        query.push(v);
                    }
                } else if let Some(obj) = current.as_object() {
                    for (_, v) in obj {
                        query.push(v);
                    }
                }
            }
            Selector::Index(index) => query.append(&mut index.query(current, ctx)),
            Selector::ArraySlice(slice) => query.append(&mut slice.query(current, ctx)),
            Selector::Filter(filter) => query.append(&mut filter.query(current, ctx)),
            Selector::Keys => {
                if let Some(obj) = current.as_object() {
                    query.extend(obj.keys().map(|k| leak_key_value(k)));
                }
            }
            Selector::Key(name) => {
                if let Some((k, _)) = current.as_object().and_then(|o| o.get_key_value(name)) {
                    query.push(leak_key_value(k));
                }
            }
            Selector::KeysFilter(filter) => {
                if let Some(obj) = current.as_object() {
                    for (k, v) in obj {
                        let member_ctx = ctx.with_key(CurrentKey::Name(k));
                        if filter.0.test_filter(v, &member_ctx) {
                            query.push(leak_key_value(k));
                        }
                    }
                }
            }
            Selector::SingularQuerySelector(sq) => {
                if let Some(v) = sq.eval_query(current, ctx) {
                    match v {
                        Value::String(s) => query.append(&mut Name::from(s.as_str()).query(current, ctx)),
                        Value::Number(n) => {
                            if let Some(i) = n.as_i64() {
                                query.append(&mut Index(i as isize).query(current, ctx));
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
        query
    }

    fn query_located<'b>(
        &self,
        current: &'b Value,
        ctx: &EvalContext<'b>,
        mut parent: NormalizedPath<'b>,
    ) -> Vec<LocatedNode<'b>> {
        let mut result = vec![];
        match self {
            Selector::Name(name) => result.append(&mut name.query_located(current, ctx, parent)),
            Selector::Wildcard => {
                if let Some(list) = current.as_array() {
                    for (i, v) in list.iter().enumerate() {
                        result.push(LocatedNode {
                            loc: parent.clone_and_push(i),
                            node: v,
                        });
                    }
                } else if let Some(obj) = current.as_object() {
                    for (k, v) in obj {
                        result.push(LocatedNode {
                            loc: parent.clone_and_push(k),
                            node: v,
                        });
                    }
                }
            }
            Selector::Index(index) => result.append(&mut index.query_located(current, ctx, parent)),
            Selector::ArraySlice(slice) => result.append(&mut slice.query_located(current, ctx, parent)),
            Selector::Filter(filter) => result.append(&mut filter.query_located(current, ctx, parent)),
            Selector::Keys => {
                if let Some(obj) = current.as_object() {
                    for k in obj.keys() {
                        result.push(LocatedNode {
                            loc: parent.clone_and_push(PathElement::Key(k.as_str())),
                            node: leak_key_value(k),
                        });
                    }
                }
            }
            Selector::Key(name) => {
                if let Some((k, _)) = current.as_object().and_then(|o| o.get_key_value(name)) {
                    result.push(LocatedNode {
                        loc: parent.clone_and_push(PathElement::Key(k.as_str())),
                        node: leak_key_value(k),
                    });
                }
            }
            Selector::KeysFilter(filter) => {
                if let Some(obj) = current.as_object() {
                    for (k, v) in obj {
                        let member_ctx = ctx.with_key(CurrentKey::Name(k));
                        if filter.0.test_filter(v, &member_ctx) {
                            result.push(LocatedNode {
                                loc: parent.clone_and_push(PathElement::Key(k.as_str())),
                                node: leak_key_value(k),
                            });
                        }
                    }
                }
            }
            Selector::SingularQuerySelector(sq) => {
                if let Some(v) = sq.eval_query(current, ctx) {
                    match v {
                        Value::String(s) => {
                            if let Some((k, v)) = current.as_object().and_then(|o| o.get_key_value(s)) {
                                parent.push(k);
                                result.push(LocatedNode { loc: parent, node: v });
                            }
                        }
                        Value::Number(n) => {
                            if let Some(i) = n.as_i64() {
                                result.append(&mut Index(i as isize).query_located(current, ctx, parent));
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{eval::EvalContext, spec::query::Queryable};

    use super::{slice::Slice, Index, Name, Selector};

    #[test]
    fn wildcard() {
        let value = json!([1, 2, 3]);
        let ctx = EvalContext::new(&value);
        assert_eq!(Selector::Wildcard.query(&value, &ctx).len(), 3);
    }

    #[test]
    fn all_selectors() {
        assert_eq!(Selector::Index(Index(0)), Selector::Index(Index(0)));
        assert_eq!(
            Selector::ArraySlice(Slice::new().with_start(0).with_end(3)),
            Selector::ArraySlice(Slice::new().with_start(0).with_end(3))
        );
        assert_eq!(
            Selector::Name(Name(String::from("name"))),
            Selector::Name(Name(String::from("name")))
        );
    }

    #[test]
    fn keys_selector() {
        let value = json!({"a": 1, "b": 2});
        let ctx = EvalContext::new(&value);
        let mut names: Vec<&str> = Selector::Keys
            .query(&value, &ctx)
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        names.sort_unstable();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn key_selector() {
        let value = json!({"a": 1, "b": 2});
        let ctx = EvalContext::new(&value);
        assert_eq!(Selector::Key("a".to_owned()).query(&value, &ctx), vec![&json!("a")]);
        assert!(Selector::Key("z".to_owned()).query(&value, &ctx).is_empty());
    }
}
