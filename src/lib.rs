//! A read-only JSONPath query engine over [`serde_json::Value`], with JSON Pointer and JSON
//! Patch as siblings sharing its location model.
//!
//! The core query engine targets [RFC 9535][rfc], plus a documented set of non-standard
//! extensions available through [`Environment`] (the crate's default, strict-mode entry point,
//! [`JsonPath::parse`], accepts only plain RFC 9535). Check out [RFC 9535][rfc] to read more
//! about JSONPath query syntax and to find many examples of its usage.
//!
//! [rfc]: https://www.rfc-editor.org/rfc/rfc9535.html
//!
//! # Features
//!
//! This crate provides:
//!
//! * The [`JsonPath`] struct, which represents a parsed, strict RFC 9535 JSONPath query.
//! * The [`Environment`] struct, a configurable, reusable compiler and evaluator for the full
//!   extension grammar (non-standard selectors and operators, custom functions, index bounds).
//! * The [`NodeList`] struct, produced by [`JsonPath::query`], representing the matched nodes.
//! * The [`LocatedNodeList`] struct, produced by [`JsonPath::query_located`], pairing each
//!   matched node with its [`NormalizedPath`] location.
//! * The [`pointer`] module (RFC 6901 JSON Pointer, plus Relative JSON Pointer) and the
//!   [`patch`] module (RFC 6902 JSON Patch), both built on the same location model.
//!
//! In addition, the [`JsonPathExt`] trait extends [`serde_json::Value`] with the
//! [`json_path`][JsonPathExt::json_path] method for performing JSONPath queries.
//!
//! # Usage
//!
//! ## Parsing and querying
//!
//! JSONPath query strings can be parsed using the [`JsonPath`] type:
//!
//! ```rust
//! use jsonpath_engine::JsonPath;
//!
//! # fn main() -> Result<(), jsonpath_engine::ParseError> {
//! let path = JsonPath::parse("$.foo.bar")?;
//! # Ok(())
//! # }
//! ```
//!
//! You then have two options to query a [`serde_json::Value`] using the parsed path:
//! [`JsonPath::query`] or [`JsonPath::query_located`]. The former produces a [`NodeList`], while
//! the latter produces a [`LocatedNodeList`]. Use the former unless you need node locations.
//!
//! ## Querying for single nodes
//!
//! For queries that are expected to return a single node, use either
//! [`exactly_one`][NodeList::exactly_one] or [`at_most_one`][NodeList::at_most_one]:
//!
//! ```rust
//! use serde_json::json;
//! # use jsonpath_engine::JsonPath;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let value = json!({ "foo": { "bar": ["baz", 42] } });
//! let path = JsonPath::parse("$.foo.bar[0]")?;
//! let node = path.query(&value).exactly_one()?;
//! assert_eq!(node, "baz");
//! # Ok(())
//! # }
//! ```
//!
//! JSONPath allows access via reverse indices:
//!
//! ```rust
//! # use serde_json::json;
//! # use jsonpath_engine::JsonPath;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let value = json!([1, 2, 3, 4, 5]);
//! let path = JsonPath::parse("$[-1]")?;
//! let node = path.query(&value).at_most_one()?;
//! assert_eq!(node, Some(&json!(5)));
//! # Ok(())
//! # }
//! ```
//!
//! Keep in mind, that for simple queries, the [`serde_json::Value::pointer`] method, or this
//! crate's own [`pointer::Pointer`], may suffice.
//!
//! ## Querying for multiple nodes
//!
//! For queries that are expected to return zero or many nodes, use [`all`][NodeList::all].
//!
//! #### Wildcards (`*`)
//!
//! Wildcards select everything under a current node. They work on both arrays, by selecting all
//! array elements, and on objects, by selecting all object key values:
//!
//! ```rust
//! # use serde_json::json;
//! # use jsonpath_engine::JsonPath;
//! # fn main() -> Result<(), jsonpath_engine::ParseError> {
//! let value = json!({ "foo": { "bar": ["baz", "bop"] } });
//! let path = JsonPath::parse("$.foo.bar[*]")?;
//! let nodes = path.query(&value).all();
//! assert_eq!(nodes, vec!["baz", "bop"]);
//! # Ok(())
//! # }
//! ```
//!
//! #### Slice selectors (`start:end:step`)
//!
//! Extract slices from JSON arrays using optional `start`, `end`, and `step` values. Reverse
//! indices can be used for `start` and `end`, and a negative `step` traverses the array in
//! reverse order:
//!
//! ```rust
//! # use serde_json::json;
//! # use jsonpath_engine::JsonPath;
//! # fn main() -> Result<(), jsonpath_engine::ParseError> {
//! let value = json!({ "foo": [1, 2, 3, 4, 5] });
//! let path = JsonPath::parse("$.foo[::-1]")?;
//! let nodes = path.query(&value).all();
//! assert_eq!(nodes, vec![5, 4, 3, 2, 1]);
//! # Ok(())
//! # }
//! ```
//!
//! #### Filter expressions (`?`)
//!
//! [Filter selectors][rfc-filter-selectors] use logical expressions to decide which members in a
//! JSON object or array are selected. The current node (`@`) operator lets a filter reason about
//! the node being tested, and filters may reference the root (`$`) or call [functions]:
//!
//! [rfc-filter-selectors]: https://www.rfc-editor.org/rfc/rfc9535.html#name-filter-selector
//!
//! ```rust
//! # use serde_json::json;
//! # use jsonpath_engine::JsonPath;
//! # fn main() -> Result<(), jsonpath_engine::ParseError> {
//! let value = json!({
//!     "threshold": 40,
//!     "readings": [
//!         { "val": 35, "msg": "foo" },
//!         { "val": 42, "msg": "biz" },
//!     ]
//! });
//! let path = JsonPath::parse("$.readings[? @.val > $.threshold ].msg")?;
//! let nodes = path.query(&value).all();
//! assert_eq!(nodes, vec!["biz"]);
//! # Ok(())
//! # }
//! ```
//!
//! #### Descendant operator (`..`)
//!
//! Segments following `..` visit the input node and each of its descendants:
//!
//! ```rust
//! # use serde_json::json;
//! # use jsonpath_engine::JsonPath;
//! # fn main() -> Result<(), jsonpath_engine::ParseError> {
//! let value = json!({ "foo": { "bar": { "baz": 1 }, "baz": 2 }, "baz": 3 });
//! let path = JsonPath::parse("$.foo..baz")?;
//! let nodes = path.query(&value).all();
//! assert_eq!(nodes, vec![2, 1]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Node locations and `NormalizedPath`
//!
//! [`JsonPath::query_located`] produces a [`LocatedNodeList`], pairing each node with its
//! [`NormalizedPath`] location:
//!
//! ```rust
//! # use serde_json::json;
//! # use jsonpath_engine::JsonPath;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let value = json!({ "foo": { "bar": { "baz": 1 }, "baz": 2 }, "baz": 3 });
//! let path = JsonPath::parse("$..[? @.baz == 1]")?;
//! let location = path.query_located(&value).exactly_one()?.location().to_string();
//! assert_eq!(location, "$['foo']['bar']");
//! # Ok(())
//! # }
//! ```
//!
//! ## Non-standard extensions and custom functions
//!
//! The extension grammar (`~` keys selectors, `in`/`contains`, `=~` regex match, `^` pseudo-root,
//! `_` extra context, `and`/`or`/`not` word operators, compound `|`/`&` queries, and custom
//! functions) is reached through [`Environment`] rather than [`JsonPath::parse`]:
//!
//! ```rust
//! # use serde_json::json;
//! use jsonpath_engine::Environment;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let value = json!({ "tags": ["a", "b", "c"] });
//! let env = Environment::new();
//! let nodes = env.findall("$.tags[?@ in ['a', 'z']]", &value)?;
//! assert_eq!(nodes.all(), vec!["a"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## JSON Pointer and JSON Patch
//!
//! [`pointer::Pointer`] resolves RFC 6901 pointers directly, and doubles as the addressing
//! scheme for [`patch::Patch`], an RFC 6902 JSON Patch implementation:
//!
//! ```rust
//! # use serde_json::json;
//! use jsonpath_engine::patch::{Patch, PatchOperation};
//! use jsonpath_engine::pointer::Pointer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = json!({ "foo": "bar" });
//! let patch = Patch(vec![PatchOperation::Add {
//!     path: Pointer::parse("/baz")?,
//!     value: json!(42),
//! }]);
//! patch.apply(&mut doc)?;
//! assert_eq!(doc, json!({ "foo": "bar", "baz": 42 }));
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `trace` — enable internal tracing via [tracing](https://docs.rs/tracing/latest/tracing/),
//!   instrumenting the parser combinators and `Queryable` implementations.

#![warn(
    clippy::all,
    clippy::dbg_macro,
    clippy::todo,
    clippy::empty_enum,
    clippy::enum_glob_use,
    clippy::mem_forget,
    clippy::unused_self,
    clippy::filter_map_next,
    clippy::needless_continue,
    clippy::needless_borrow,
    clippy::match_wildcard_for_single_variants,
    clippy::if_let_mutex,
    clippy::mismatched_target_os,
    clippy::await_holding_lock,
    clippy::match_on_vec_items,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::lossy_float_literal,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::fn_params_excessive_bools,
    clippy::exit,
    clippy::inefficient_to_string,
    clippy::linkedlist,
    clippy::macro_use_imports,
    clippy::option_option,
    clippy::verbose_file_reads,
    clippy::unnested_or_patterns,
    clippy::str_to_string,
    rust_2018_idioms,
    future_incompatible,
    nonstandard_style,
    missing_debug_implementations,
    missing_docs
)]
#![deny(unreachable_pub)]
#![allow(elided_lifetimes_in_paths, clippy::type_complexity)]
#![forbid(unsafe_code)]

mod compound;
mod environment;
mod error;
mod eval;
mod ext;
mod jsonpath_type;
mod node;
pub mod patch;
mod parser;
mod path;
pub mod pointer;
mod spec;

#[doc(inline)]
pub use compound::{CompoundOp, CompoundQuery, CompoundQueryError};
#[doc(inline)]
pub use environment::{Environment, FindMatchError};
#[doc(inline)]
pub use error::ParseError;
#[doc(inline)]
pub use ext::JsonPathExt;
#[doc(inline)]
pub use jsonpath_type::JsonPath;
/// A list of nodes resulting from a JSONPath query, along with their locations
///
/// This is produced by the [`JsonPath::query_located`] method.
///
/// As with [`NodeList`], each node is a borrowed reference to the node in the original
/// [`serde_json::Value`] that was queried; however, each node in the list is paired with its
/// location, which is represented by a [`NormalizedPath`].
///
/// In addition to the locations, [`LocatedNodeList`] provides useful functionality over
/// [`NodeList`] such as de-duplication of query results (see [`dedup`][LocatedNodeList::dedup]).
pub use node::LocatedNodeList;
#[doc(inline)]
pub use node::{AtMostOneError, ExactlyOneError, LocatedNode, Locations, NodeList, Nodes};
/// Represents a [Normalized Path][norm-path] from the JSONPath specification
///
/// A [`NormalizedPath`] is used to represent the location of a node within a query result
/// produced by the [`JsonPath::query_located`] method.
///
/// [norm-path]: https://www.rfc-editor.org/rfc/rfc9535.html#name-normalized-paths
pub use path::NormalizedPath;
#[doc(inline)]
pub use path::PathElement;

pub use spec::functions;
