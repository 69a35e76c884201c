//! A reusable, configurable entry point for compiling and running JSONPath queries
//!
//! Where [`crate::JsonPath`] is a thin, parse-once-query-many wrapper around a strict RFC 9535
//! query, [`Environment`] is the configuration surface for the crate's full, non-standard
//! extension grammar: it owns a [`FunctionRegistry`], the index bounds used to validate integer
//! literals, and the handful of flags that gate the extension grammar on or off.
use serde_json::Value;

use crate::compound::{CompoundQuery, CompoundQueryError};
use crate::eval::{EvalContext, FilterCache};
use crate::node::{LocatedNodeList, NodeList};
use crate::parser::{parse_compound_query_main, parse_query_main, ParserOptions};
use crate::spec::functions::{Function, FunctionRegistry};
use crate::spec::integer;
use crate::{JsonPath, ParseError};

/// A configurable compiler and evaluator for JSONPath queries
///
/// An `Environment` is built once, configured with the `with_*` builder methods, then reused to
/// `compile` many query strings. Custom function extensions are registered on a per-instance
/// runtime table owned by the `Environment`, rather than a process-wide, compile-time one.
#[derive(Debug, Clone)]
pub struct Environment {
    functions: FunctionRegistry,
    min_int_index: i64,
    max_int_index: i64,
    strict: bool,
    unicode_escape: bool,
    filter_caching: bool,
    well_typed: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            functions: FunctionRegistry::with_default_functions(),
            min_int_index: integer::MIN,
            max_int_index: integer::MAX,
            strict: false,
            unicode_escape: true,
            filter_caching: true,
            well_typed: true,
        }
    }
}

impl Environment {
    /// Create a new `Environment` with the default configuration
    ///
    /// By default, non-standard extensions (`~`, `in`/`contains`, `=~`, `#`, `^`, `_`, `and`/
    /// `or`/`not`) are enabled; see [`Environment::with_strict`] to restrict parsing to plain
    /// RFC 9535.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle strict RFC 9535 parsing, disabling every non-standard extension selector and
    /// operator
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Toggle `\uXXXX` escape decoding (including surrogate pairs) in string literals
    pub fn with_unicode_escape(mut self, unicode_escape: bool) -> Self {
        self.unicode_escape = unicode_escape;
        self
    }

    /// Toggle per-call filter-expression result caching
    pub fn with_filter_caching(mut self, filter_caching: bool) -> Self {
        self.filter_caching = filter_caching;
        self
    }

    /// Toggle well-typedness checking of function expressions at compile time
    pub fn with_well_typed(mut self, well_typed: bool) -> Self {
        self.well_typed = well_typed;
        self
    }

    /// Set the minimum and maximum integer literal index bounds
    ///
    /// Defaults to the IJSON bounds, [-(2^53)+1, (2^53)-1], from [`crate::spec::integer`].
    pub fn with_index_bounds(mut self, min: i64, max: i64) -> Self {
        self.min_int_index = min;
        self.max_int_index = max;
        self
    }

    /// Register a custom function extension, overwriting any previous definition of the same
    /// name
    pub fn register_function(mut self, function: Function) -> Self {
        self.functions.register(function);
        self
    }

    /// Register the non-standard `keys` function extension
    ///
    /// `keys` is left unregistered by default, since a query author may reasonably want to
    /// define their own `keys`-named function; call this to opt in to the built-in one.
    pub fn with_keys_function(mut self) -> Self {
        self.functions.register(crate::spec::functions::keys_function());
        self
    }

    fn parser_options(&self) -> ParserOptions<'_> {
        ParserOptions {
            strict: self.strict,
            functions: &self.functions,
        }
    }

    fn eval_context<'b>(&'b self, root: &'b Value, cache: Option<std::rc::Rc<FilterCache>>) -> EvalContext<'b> {
        EvalContext {
            root,
            extra: None,
            current_key: None,
            cache,
            strict: self.strict,
            functions: &self.functions,
        }
    }

    /// Compile a JSONPath query string, respecting this `Environment`'s configuration
    ///
    /// Unlike [`JsonPath::parse`], which always parses in strict RFC 9535 mode, this honors
    /// [`Environment::with_strict`] and the registered function extensions.
    pub fn compile(&self, query: &str) -> Result<JsonPath, ParseError> {
        let (_, q) = parse_query_main(self.parser_options(), query).map_err(|e| match e {
            nom::Err::Error(e) | nom::Err::Failure(e) => (query, e).into(),
            nom::Err::Incomplete(_) => unreachable!("streaming parsers are not used"),
        })?;
        Ok(JsonPath::from_parts(q, self.strict))
    }

    /// Compile a compound query string (`path1 | path2`, `path1 & path2`)
    pub fn compile_compound(&self, query: &str) -> Result<CompoundQuery, CompoundQueryError> {
        let (_, cq) = parse_compound_query_main(self.parser_options(), query)
            .map_err(|e| match e {
                nom::Err::Error(e) | nom::Err::Failure(e) => CompoundQueryError::Parse((query, e).into()),
                nom::Err::Incomplete(_) => unreachable!("streaming parsers are not used"),
            })?;
        Ok(cq)
    }

    /// Compile and evaluate `query` against `value` in one step, returning every matching node
    pub fn findall<'v>(&self, query: &str, value: &'v Value) -> Result<NodeList<'v>, ParseError> {
        Ok(self.compile(query)?.query_with(value, self))
    }

    /// Compile and evaluate `query` against `value`, binding `extra` to the out-of-document
    /// extra-context identifier (default `_`) for use inside filter expressions
    pub fn findall_with_extra<'v>(
        &self,
        query: &str,
        value: &'v Value,
        extra: &'v Value,
    ) -> Result<NodeList<'v>, ParseError> {
        Ok(self.compile(query)?.query_with_extra(value, self, extra))
    }

    /// Compile and evaluate `query` against `value`, returning every matching node with its
    /// location
    ///
    /// Named `finditer` to mirror an iterator-producing entry point; as noted in DESIGN.md, this
    /// crate's evaluator is eager, so it returns a materialized [`LocatedNodeList`] rather than a
    /// true lazy iterator.
    pub fn finditer<'v>(&self, query: &str, value: &'v Value) -> Result<LocatedNodeList<'v>, ParseError> {
        Ok(self.compile(query)?.query_located_with(value, self))
    }

    /// Compile and evaluate `query` against `value`, returning the single matching node, if
    /// exactly one exists
    ///
    /// Named `find_match` instead of `match` to avoid shadowing the `match` keyword.
    pub fn find_match<'v>(
        &self,
        query: &str,
        value: &'v Value,
    ) -> Result<Option<&'v Value>, FindMatchError> {
        let nodes = self.findall(query, value)?;
        Ok(nodes.at_most_one()?)
    }

    /// Build an [`EvalContext`] for `root`, with a fresh filter cache scoped to this call
    ///
    /// The cache is reference-counted rather than borrowed so that it is freed at the end of the
    /// top-level query call (spec §4.2/§9), rather than leaked or forced to live as long as
    /// `root` itself.
    pub(crate) fn context_for<'b>(&'b self, root: &'b Value) -> EvalContext<'b> {
        let cache = self
            .filter_caching
            .then(|| std::rc::Rc::new(FilterCache::new()));
        self.eval_context(root, cache)
    }

    /// Build an [`EvalContext`] for `root`, with `extra` bound to the out-of-document
    /// extra-context identifier (default `_`)
    pub(crate) fn context_for_with_extra<'b>(&'b self, root: &'b Value, extra: &'b Value) -> EvalContext<'b> {
        self.context_for(root).with_extra(extra)
    }

    pub(crate) fn strict(&self) -> bool {
        self.strict
    }

    pub(crate) fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub(crate) fn well_typed(&self) -> bool {
        self.well_typed
    }

    pub(crate) fn unicode_escape(&self) -> bool {
        self.unicode_escape
    }

    pub(crate) fn index_bounds(&self) -> (i64, i64) {
        (self.min_int_index, self.max_int_index)
    }
}

/// Error produced by [`Environment::find_match`]
#[derive(Debug, thiserror::Error)]
pub enum FindMatchError {
    /// The query string failed to parse
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The query matched more than one node
    #[error(transparent)]
    TooMany(#[from] crate::node::AtMostOneError),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Environment;

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Environment>();
    }

    #[test]
    fn test_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<Environment>();
    }

    #[test]
    fn default_is_non_strict() {
        let env = Environment::new();
        let value = json!({"a": {"tags": ["x", "y"]}});
        let nodes = env.findall("$.a[?@ in ['x','z']]", &value).unwrap();
        assert!(nodes.is_empty());
        let nodes = env.findall("$.a.tags[?@ in ['x','z']]", &value).unwrap();
        assert_eq!(nodes.all(), vec!["x"]);
    }

    #[test]
    fn strict_rejects_extensions() {
        let env = Environment::new().with_strict(true);
        assert!(env.compile("$.a[?@ in ['x']]").is_err());
    }

    #[test]
    fn keys_function_opt_in() {
        let value = json!([{"a": 1}, {"b": 2}]);
        let env = Environment::new();
        assert!(env.compile("$[?keys(@) contains 'a']").is_err());
        let env = env.with_keys_function();
        let nodes = env.findall("$[?keys(@) contains 'a']", &value).unwrap();
        assert_eq!(nodes.len(), 1);
    }
}
