//! Function Extensions in JSONPath
//!
//! Function Extensions in JSONPath serve as a way to extend the capability of queries in a way that
//! the standard query syntax can not support. There are various functions included in JSONPath, all
//! of which conform to a specified type system.
//!
//! # The JSONPath Type System
//!
//! The type system used in JSONPath function extensions is comprised of three types: [`NodesType`],
//! [`ValueType`], and [`LogicalType`].
//!
//! # Registered Functions
//!
//! The IETF JSONPath Specification defines several functions for use in JSONPath query filter
//! expressions, all of which are provided here by default, and defined below. A handful of
//! additional functions are provided as non-standard extensions, gated the same way as the rest
//! of the extension grammar.
//!
//! ## `length`
//!
//! The `length` function extension provides a way to compute the length of a value and make that
//! available for further processing in the filter expression.
//!
//! ### Parameters
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ValueType`] | string, object, or array, possibly taken from a singular query |
//!
//! ### Result
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ValueType`] | unsigned integer, or nothing |
//!
//! ### Example
//!
//! ```text
//! $[?length(@.authors) >= 5]
//! ```
//!
//! ## `count`
//!
//! The `count` function extension provides a way to obtain the number of nodes in a nodelist and
//! make that available for further processing in the filter expression.
//!
//! ### Parameters
//!
//! | Type | Description |
//! |------|-------------|
//! | [`NodesType`] | the nodelist whose members are being counted |
//!
//! ### Result
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ValueType`] | an unsigned integer |
//!
//! ### Example
//!
//! ```text
//! $[?count(@.*.author) >= 5]
//! ```
//!
//! ## `match`
//!
//! The `match` function extension provides a way to check whether **the entirety** of a given
//! string matches a given regular expression.
//!
//! ### Parameters
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ValueType`] | a string |
//! | [`ValueType`] | a string representing a valid regular expression |
//!
//! ### Result
//!
//! | Type | Description |
//! |------|-------------|
//! | [`LogicalType`] | true for a match, false otherwise |
//!
//! ### Example
//!
//! ```text
//! $[?match(@.date, "1974-05-..")]
//! ```
//!
//! ## `search`
//!
//! The `search` function extension provides a way to check whether a given string contains a
//! substring that matches a given regular expression.
//!
//! ### Parameters
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ValueType`] | a string |
//! | [`ValueType`] | a string representing a valid regular expression |
//!
//! ### Result
//!
//! | Type | Description |
//! |------|-------------|
//! | [`LogicalType`] | true for a match, false otherwise |
//!
//! ### Example
//!
//! ```text
//! $[?search(@.author, "[BR]ob")]
//! ```
//!
//! ## `value`
//!
//! The `value` function extension provides a way to convert an instance of `NodesType` to a value
//! and make that available for further processing in the filter expression.
//!
//! ### Parameters
//!
//! | Type | Description |
//! |------|-------------|
//! | [`NodesType`] | a nodelist to convert to a value |
//!
//! ### Result
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ValueType`] | if the input nodelist contains a single node, the result is the value of that node, otherwise it is nothing |
//!
//! ### Example
//!
//! ```text
//! $[?value(@..color) == "red"]
//! ```
//!
//! ## `isinstance`
//!
//! Non-standard. Tests whether a value's JSON type matches a given type name (one of `"null"`,
//! `"boolean"`, `"number"`, `"string"`, `"array"`, `"object"`).
//!
//! ## `typeof`
//!
//! Non-standard. Returns the name of a value's JSON type as a string, for use in further
//! comparisons.
//!
//! ## `startswith`
//!
//! Non-standard. Tests whether a string starts with a given prefix.
use std::collections::{HashMap, VecDeque};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::{eval::EvalContext, node::NodeList, spec::query::Queryable};

use super::{
    query::Query,
    selector::filter::{Literal, LogicalOrExpr, SingularQuery, TestFilter},
    selector::{leak_index_value, leak_key_value},
};

type Evaluator = fn(VecDeque<JsonPathType<'_>>) -> JsonPathType<'_>;
type Validator = fn(&[FunctionExprArg]) -> Result<(), FunctionValidationError>;

/// The definition of a single named function extension
#[derive(Clone, Copy)]
pub struct Function {
    name: &'static str,
    result_type: JsonPathTypeKind,
    evaluator: Evaluator,
    validator: Validator,
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function").field("name", &self.name).finish()
    }
}

impl Function {
    /// Define a new function extension
    pub const fn new(
        name: &'static str,
        result_type: JsonPathTypeKind,
        evaluator: Evaluator,
        validator: Validator,
    ) -> Self {
        Self {
            name,
            result_type,
            evaluator,
            validator,
        }
    }
}

/// A table of named function extensions available to a query
///
/// A runtime table owned by an [`crate::environment::Environment`], so that callers can register
/// their own function extensions without needing to compile them into the crate.
#[derive(Debug, Clone)]
pub struct FunctionRegistry(HashMap<&'static str, Function>);

impl FunctionRegistry {
    /// An empty registry, with no functions defined
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// A registry containing the functions defined by the JSONPath specification, plus the
    /// non-standard extensions this crate supports
    pub fn with_default_functions() -> Self {
        let mut registry = Self::empty();
        for f in default_functions() {
            registry.register(f);
        }
        registry
    }

    /// Register a function, overwriting any previous definition of the same name
    pub fn register(&mut self, function: Function) {
        self.0.insert(function.name, function);
    }

    fn get(&self, name: &str) -> Option<&Function> {
        self.0.get(name)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_default_functions()
    }
}

static DEFAULT_REGISTRY: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::with_default_functions);

/// Get the default function registry, shared by every [`EvalContext`] that does not come from a
/// custom [`crate::environment::Environment`]
pub(crate) fn default_registry() -> &'static FunctionRegistry {
    &DEFAULT_REGISTRY
}

fn default_functions() -> Vec<Function> {
    vec![
        Function::new("length", JsonPathTypeKind::Value, length_evaluator, length_validator),
        Function::new("count", JsonPathTypeKind::Value, count_evaluator, count_validator),
        Function::new("match", JsonPathTypeKind::Logical, match_evaluator, two_string_args_validator),
        Function::new("search", JsonPathTypeKind::Logical, search_evaluator, two_string_args_validator),
        Function::new("value", JsonPathTypeKind::Value, value_evaluator, value_validator),
        Function::new("isinstance", JsonPathTypeKind::Logical, isinstance_evaluator, two_args_validator),
        Function::new("is", JsonPathTypeKind::Logical, isinstance_evaluator, two_args_validator),
        Function::new("typeof", JsonPathTypeKind::Value, typeof_evaluator, one_value_arg_validator),
        Function::new("type", JsonPathTypeKind::Value, typeof_evaluator, one_value_arg_validator),
        Function::new("startswith", JsonPathTypeKind::Logical, startswith_evaluator, two_string_args_validator),
    ]
}

/// The non-standard `keys` function extension, opt-in via
/// [`crate::environment::Environment::with_keys_function`]
///
/// Given a nodelist, produces a nodelist of the key/index values of an object or array's direct
/// members; any other input produces an empty nodelist.
pub(crate) fn keys_function() -> Function {
    Function::new("keys", JsonPathTypeKind::Nodelist, keys_evaluator, count_validator)
}

fn keys_evaluator<'a>(mut args: VecDeque<JsonPathType<'a>>) -> JsonPathType<'a> {
    let nodes = match args.pop_front() {
        Some(JsonPathType::Nodes(nl)) => nl,
        _ => return JsonPathType::Nodes(Vec::new().into()),
    };
    let keys: Vec<&'a Value> = nodes
        .iter()
        .flat_map(|v| -> Vec<&'a Value> {
            match *v {
                Value::Object(map) => map.keys().map(|k| leak_key_value(k) as &'a Value).collect(),
                Value::Array(arr) => (0..arr.len()).map(|i| leak_index_value(i) as &'a Value).collect(),
                _ => Vec::new(),
            }
        })
        .collect();
    JsonPathType::Nodes(keys.into())
}

fn length_evaluator<'a>(mut args: VecDeque<JsonPathType<'a>>) -> JsonPathType<'a> {
    let value = args.pop_front().and_then(|a| ValueType::try_from(a).ok());
    match value.and_then(|v| v.as_value().cloned()) {
        Some(Value::String(s)) => JsonPathType::Value(Value::from(s.chars().count())),
        Some(Value::Array(a)) => JsonPathType::Value(Value::from(a.len())),
        Some(Value::Object(o)) => JsonPathType::Value(Value::from(o.len())),
        _ => JsonPathType::Nothing,
    }
}

fn length_validator(args: &[FunctionExprArg]) -> Result<(), FunctionValidationError> {
    expect_arg_kinds(args, &[JsonPathTypeKind::Value])
}

fn count_evaluator<'a>(mut args: VecDeque<JsonPathType<'a>>) -> JsonPathType<'a> {
    match args.pop_front() {
        Some(JsonPathType::Nodes(nl)) => JsonPathType::Value(Value::from(nl.len())),
        _ => JsonPathType::Value(Value::from(0)),
    }
}

fn count_validator(args: &[FunctionExprArg]) -> Result<(), FunctionValidationError> {
    expect_arg_kinds(args, &[JsonPathTypeKind::Nodelist])
}

fn match_evaluator<'a>(mut args: VecDeque<JsonPathType<'a>>) -> JsonPathType<'a> {
    let (subject, pattern) = match (args.pop_front(), args.pop_front()) {
        (Some(s), Some(p)) => (s, p),
        _ => return JsonPathType::Logical(LogicalType::False),
    };
    match (as_str(&subject), as_str(&pattern)) {
        (Some(s), Some(p)) => {
            let anchored = format!("^(?:{p})$");
            match Regex::new(&anchored) {
                Ok(re) => LogicalType::from(re.is_match(s)).into(),
                Err(_) => LogicalType::False.into(),
            }
        }
        _ => LogicalType::False.into(),
    }
}

fn search_evaluator<'a>(mut args: VecDeque<JsonPathType<'a>>) -> JsonPathType<'a> {
    let (subject, pattern) = match (args.pop_front(), args.pop_front()) {
        (Some(s), Some(p)) => (s, p),
        _ => return JsonPathType::Logical(LogicalType::False),
    };
    match (as_str(&subject), as_str(&pattern)) {
        (Some(s), Some(p)) => match Regex::new(p) {
            Ok(re) => LogicalType::from(re.is_match(s)).into(),
            Err(_) => LogicalType::False.into(),
        },
        _ => LogicalType::False.into(),
    }
}

fn two_string_args_validator(args: &[FunctionExprArg]) -> Result<(), FunctionValidationError> {
    expect_arg_kinds(args, &[JsonPathTypeKind::Value, JsonPathTypeKind::Value])
}

fn value_evaluator<'a>(mut args: VecDeque<JsonPathType<'a>>) -> JsonPathType<'a> {
    match args.pop_front() {
        Some(JsonPathType::Nodes(nl)) => match nl.exactly_one() {
            Ok(v) => JsonPathType::Node(v),
            Err(_) => JsonPathType::Nothing,
        },
        Some(other) => other,
        None => JsonPathType::Nothing,
    }
}

fn value_validator(args: &[FunctionExprArg]) -> Result<(), FunctionValidationError> {
    expect_arg_kinds(args, &[JsonPathTypeKind::Nodelist])
}

fn isinstance_evaluator<'a>(mut args: VecDeque<JsonPathType<'a>>) -> JsonPathType<'a> {
    let (value, kind) = match (args.pop_front(), args.pop_front()) {
        (Some(v), Some(k)) => (v, k),
        _ => return LogicalType::False.into(),
    };
    let kind_name = match as_str(&kind) {
        Some(s) => s,
        None => return LogicalType::False.into(),
    };
    let matches = match ValueType::try_from(value).ok().and_then(|v| v.as_value().cloned()) {
        Some(Value::Null) => kind_name == "null",
        Some(Value::Bool(_)) => kind_name == "boolean",
        Some(Value::Number(_)) => kind_name == "number",
        Some(Value::String(_)) => kind_name == "string",
        Some(Value::Array(_)) => kind_name == "array",
        Some(Value::Object(_)) => kind_name == "object",
        None => false,
    };
    LogicalType::from(matches).into()
}

fn two_args_validator(args: &[FunctionExprArg]) -> Result<(), FunctionValidationError> {
    expect_arg_kinds(args, &[JsonPathTypeKind::Value, JsonPathTypeKind::Value])
}

fn typeof_evaluator<'a>(mut args: VecDeque<JsonPathType<'a>>) -> JsonPathType<'a> {
    let value = args.pop_front().and_then(|a| ValueType::try_from(a).ok());
    let name = match value.and_then(|v| v.as_value().cloned()) {
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
        None => return JsonPathType::Nothing,
    };
    JsonPathType::Value(Value::from(name))
}

fn one_value_arg_validator(args: &[FunctionExprArg]) -> Result<(), FunctionValidationError> {
    expect_arg_kinds(args, &[JsonPathTypeKind::Value])
}

fn startswith_evaluator<'a>(mut args: VecDeque<JsonPathType<'a>>) -> JsonPathType<'a> {
    let (subject, prefix) = match (args.pop_front(), args.pop_front()) {
        (Some(s), Some(p)) => (s, p),
        _ => return LogicalType::False.into(),
    };
    match (as_str(&subject), as_str(&prefix)) {
        (Some(s), Some(p)) => LogicalType::from(s.starts_with(p)).into(),
        _ => LogicalType::False.into(),
    }
}

fn as_str<'a>(value: &'a JsonPathType<'_>) -> Option<&'a str> {
    match value {
        JsonPathType::Value(Value::String(s)) => Some(s.as_str()),
        JsonPathType::Node(Value::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn expect_arg_kinds(
    args: &[FunctionExprArg],
    expected: &[JsonPathTypeKind],
) -> Result<(), FunctionValidationError> {
    if args.len() != expected.len() {
        return Err(FunctionValidationError::NumberOfArgsMismatch {
            expected: expected.len(),
            received: args.len(),
        });
    }
    for (i, (arg, expected)) in args.iter().zip(expected.iter()).enumerate() {
        let received = arg.as_type_kind()?;
        if !received.converts_to(*expected) {
            return Err(FunctionValidationError::MismatchTypeKind {
                expected: *expected,
                received,
                position: i,
            });
        }
    }
    Ok(())
}

/// JSONPath type representing a Nodelist
///
/// This is a thin wrapper around a [`NodeList`], and generally represents the result of a JSONPath
/// query. It may also be produced by a function.
#[derive(Debug)]
pub struct NodesType<'a>(NodeList<'a>);

impl<'a> NodesType<'a> {
    #[doc(hidden)]
    pub const fn type_kind() -> JsonPathTypeKind {
        JsonPathTypeKind::Nodelist
    }

    /// Extract the inner [`NodeList`]
    pub fn into_inner(self) -> NodeList<'a> {
        self.0
    }
}

impl<'a> From<NodeList<'a>> for NodesType<'a> {
    fn from(value: NodeList<'a>) -> Self {
        Self(value)
    }
}

impl<'a> TryFrom<JsonPathType<'a>> for NodesType<'a> {
    type Error = ConversionError;

    fn try_from(value: JsonPathType<'a>) -> Result<Self, Self::Error> {
        match value {
            JsonPathType::Nodes(nl) => Ok(nl.into()),
            JsonPathType::Value(_) => Err(ConversionError::LiteralToNodes),
            JsonPathType::Logical(_) => Err(ConversionError::IncompatibleTypes {
                from: JsonPathTypeKind::Logical,
                to: JsonPathTypeKind::Nodelist,
            }),
            JsonPathType::Node(n) => Ok(Self(vec![n].into())),
            JsonPathType::Nothing => Ok(Self(vec![].into())),
        }
    }
}

/// JSONPath type representing `LogicalTrue` or `LogicalFalse`
#[derive(Debug, Default, Clone, Copy)]
pub enum LogicalType {
    /// True
    True,
    /// False
    #[default]
    False,
}

impl LogicalType {
    #[doc(hidden)]
    pub const fn type_kind() -> JsonPathTypeKind {
        JsonPathTypeKind::Logical
    }
}

impl<'a> TryFrom<JsonPathType<'a>> for LogicalType {
    type Error = ConversionError;

    fn try_from(value: JsonPathType<'a>) -> Result<Self, Self::Error> {
        match value {
            JsonPathType::Nodes(nl) => {
                if nl.is_empty() {
                    Ok(Self::False)
                } else {
                    Ok(Self::True)
                }
            }
            JsonPathType::Value(_) => Err(ConversionError::IncompatibleTypes {
                from: JsonPathTypeKind::Value,
                to: JsonPathTypeKind::Logical,
            }),
            JsonPathType::Logical(l) => Ok(l),
            JsonPathType::Node(_) => Ok(Self::True),
            JsonPathType::Nothing => Ok(Self::False),
        }
    }
}

impl From<LogicalType> for bool {
    fn from(value: LogicalType) -> Self {
        match value {
            LogicalType::True => true,
            LogicalType::False => false,
        }
    }
}

impl From<bool> for LogicalType {
    fn from(value: bool) -> Self {
        match value {
            true => Self::True,
            false => Self::False,
        }
    }
}

/// JSONPath type representing a JSON value or Nothing
#[derive(Debug)]
pub enum ValueType<'a> {
    /// This may come from a literal value declared in a JSONPath query, or be produced by a
    /// function.
    Value(Value),
    /// This would be a reference to a location in the JSON object being queried, i.e., the result
    /// of a singular query, or produced by a function.
    Node(&'a Value),
    /// This would be the result of a singular query that does not result in any nodes, or be
    /// produced by a function.
    Nothing,
}

impl<'a> ValueType<'a> {
    #[doc(hidden)]
    pub const fn type_kind() -> JsonPathTypeKind {
        JsonPathTypeKind::Value
    }

    /// Convert to a reference of a [`serde_json::Value`] if possible
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ValueType::Value(v) => Some(v),
            ValueType::Node(v) => Some(v),
            ValueType::Nothing => None,
        }
    }

    /// Check if this `ValueType` is nothing
    pub fn is_nothing(&self) -> bool {
        matches!(self, ValueType::Nothing)
    }
}

impl<'a> TryFrom<JsonPathType<'a>> for ValueType<'a> {
    type Error = ConversionError;

    fn try_from(value: JsonPathType<'a>) -> Result<Self, Self::Error> {
        match value {
            JsonPathType::Value(v) => Ok(Self::Value(v)),
            JsonPathType::Node(n) => Ok(Self::Node(n)),
            JsonPathType::Nothing => Ok(Self::Nothing),
            JsonPathType::Nodes(_) => Err(ConversionError::IncompatibleTypes {
                from: JsonPathTypeKind::Nodelist,
                to: JsonPathTypeKind::Value,
            }),
            JsonPathType::Logical(_) => Err(ConversionError::IncompatibleTypes {
                from: JsonPathTypeKind::Nodelist,
                to: JsonPathTypeKind::Value,
            }),
        }
    }
}

impl<'a, T> From<T> for ValueType<'a>
where
    T: Into<Value>,
{
    fn from(value: T) -> Self {
        Self::Value(value.into())
    }
}

/// The internal, unified result type of a function expression or function argument
#[doc(hidden)]
#[derive(Debug)]
pub enum JsonPathType<'a> {
    Nodes(NodeList<'a>),
    Logical(LogicalType),
    Node(&'a Value),
    Value(Value),
    Nothing,
}

impl<'a> JsonPathType<'a> {
    pub fn as_kind(&self) -> JsonPathTypeKind {
        match self {
            JsonPathType::Nodes(_) => JsonPathTypeKind::Nodelist,
            JsonPathType::Value(_) => JsonPathTypeKind::Value,
            JsonPathType::Logical(_) => JsonPathTypeKind::Logical,
            JsonPathType::Node(_) => JsonPathTypeKind::Node,
            JsonPathType::Nothing => JsonPathTypeKind::Nothing,
        }
    }
}

impl<'a> From<NodesType<'a>> for JsonPathType<'a> {
    fn from(value: NodesType<'a>) -> Self {
        Self::Nodes(value.0)
    }
}

impl<'a> From<ValueType<'a>> for JsonPathType<'a> {
    fn from(value: ValueType<'a>) -> Self {
        match value {
            ValueType::Value(v) => Self::Value(v),
            ValueType::Node(n) => Self::Node(n),
            ValueType::Nothing => Self::Nothing,
        }
    }
}

impl<'a> From<LogicalType> for JsonPathType<'a> {
    fn from(value: LogicalType) -> Self {
        Self::Logical(value)
    }
}

#[doc(hidden)]
/// Error used to convey JSONPath queries that are not well-typed
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Cannot convert `from` into `to`
    #[error("attempted to convert {from} to {to}")]
    IncompatibleTypes {
        /// The type being converted from
        from: JsonPathTypeKind,
        /// The type being converted to
        to: JsonPathTypeKind,
    },
    /// Literal values can not be considered nodes
    #[error("cannot use a literal value in place of NodesType")]
    LiteralToNodes,
}

#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsonPathTypeKind {
    Nodelist,
    Node,
    Value,
    Logical,
    Nothing,
}

impl JsonPathTypeKind {
    pub fn converts_to(&self, other: Self) -> bool {
        matches!(
            (self, other),
            (
                JsonPathTypeKind::Nodelist,
                JsonPathTypeKind::Nodelist | JsonPathTypeKind::Logical
            ) | (
                JsonPathTypeKind::Node,
                JsonPathTypeKind::Nodelist | JsonPathTypeKind::Node | JsonPathTypeKind::Value
            ) | (
                JsonPathTypeKind::Value,
                JsonPathTypeKind::Node | JsonPathTypeKind::Value
            ) | (JsonPathTypeKind::Logical, JsonPathTypeKind::Logical)
        )
    }
}

impl std::fmt::Display for JsonPathTypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonPathTypeKind::Nodelist => write!(f, "NodesType"),
            JsonPathTypeKind::Logical => write!(f, "LogicalType"),
            JsonPathTypeKind::Node => write!(f, "ValueType"),
            JsonPathTypeKind::Value => write!(f, "ValueType"),
            JsonPathTypeKind::Nothing => write!(f, "ValueType"),
        }
    }
}

/// A function call within a filter expression, e.g. `length(@.authors)`
#[doc(hidden)]
#[derive(Debug, PartialEq, Clone)]
pub struct FunctionExpr {
    pub name: String,
    pub args: Vec<FunctionExprArg>,
    pub return_type: JsonPathTypeKind,
}

impl FunctionExpr {
    #[cfg_attr(
        feature = "trace",
        tracing::instrument(name = "Evaluate Function Expr", level = "trace", parent = None, ret)
    )]
    pub fn evaluate<'a, 'b: 'a>(&'a self, current: &'b Value, ctx: &EvalContext<'b>) -> JsonPathType<'b> {
        let args: VecDeque<JsonPathType> = self.args.iter().map(|a| a.evaluate(current, ctx)).collect();
        match ctx.functions.get(&self.name) {
            Some(f) => (f.evaluator)(args),
            // Unreachable: a function name surviving `validate` at parse time is always present
            // in the registry the query was compiled against.
            None => JsonPathType::Nothing,
        }
    }

    pub fn validate(
        name: String,
        args: Vec<FunctionExprArg>,
        registry: &FunctionRegistry,
    ) -> Result<Self, FunctionValidationError> {
        match registry.get(&name) {
            Some(f) => {
                (f.validator)(args.as_slice())?;
                Ok(Self {
                    name,
                    args,
                    return_type: f.result_type,
                })
            }
            None => Err(FunctionValidationError::Undefined { name }),
        }
    }
}

impl std::fmt::Display for FunctionExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{name}(", name = self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            write!(
                f,
                "{arg}{comma}",
                comma = if i == self.args.len() - 1 { "" } else { "," }
            )?;
        }
        write!(f, ")")
    }
}

/// An argument passed to a [`FunctionExpr`]
#[doc(hidden)]
#[derive(Debug, PartialEq, Clone)]
pub enum FunctionExprArg {
    Literal(Literal),
    SingularQuery(SingularQuery),
    FilterQuery(Query),
    LogicalExpr(LogicalOrExpr),
    FunctionExpr(FunctionExpr),
    /// The `#` token, referring to the current member's key or index, non-standard
    CurrentKey,
}

impl std::fmt::Display for FunctionExprArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionExprArg::Literal(lit) => write!(f, "{lit}"),
            FunctionExprArg::FilterQuery(query) => write!(f, "{query}"),
            FunctionExprArg::SingularQuery(sq) => write!(f, "{sq}"),
            FunctionExprArg::LogicalExpr(log) => write!(f, "{log}"),
            FunctionExprArg::FunctionExpr(func) => write!(f, "{func}"),
            FunctionExprArg::CurrentKey => write!(f, "#"),
        }
    }
}

impl FunctionExprArg {
    #[cfg_attr(
        feature = "trace",
        tracing::instrument(name = "Evaluate Function Arg", level = "trace", parent = None, ret)
    )]
    fn evaluate<'a, 'b: 'a>(&'a self, current: &'b Value, ctx: &EvalContext<'b>) -> JsonPathType<'b> {
        match self {
            FunctionExprArg::Literal(lit) => lit.into(),
            FunctionExprArg::SingularQuery(q) => match q.eval_query(current, ctx) {
                Some(n) => JsonPathType::Node(n),
                None => JsonPathType::Nothing,
            },
            FunctionExprArg::FilterQuery(q) => JsonPathType::Nodes(q.query(current, ctx).into()),
            FunctionExprArg::LogicalExpr(l) => match l.test_filter(current, ctx) {
                true => JsonPathType::Logical(LogicalType::True),
                false => JsonPathType::Logical(LogicalType::False),
            },
            FunctionExprArg::FunctionExpr(f) => f.evaluate(current, ctx),
            FunctionExprArg::CurrentKey => match ctx.current_key {
                Some(key) => JsonPathType::Value(key.into()),
                None => JsonPathType::Nothing,
            },
        }
    }

    #[cfg_attr(
        feature = "trace",
        tracing::instrument(name = "Function Arg As Type Kind", level = "trace", parent = None, ret)
    )]
    pub fn as_type_kind(&self) -> Result<JsonPathTypeKind, FunctionValidationError> {
        match self {
            FunctionExprArg::Literal(_) => Ok(JsonPathTypeKind::Value),
            FunctionExprArg::SingularQuery(_) => Ok(JsonPathTypeKind::Node),
            FunctionExprArg::FilterQuery(query) => {
                if query.is_singular() {
                    Ok(JsonPathTypeKind::Node)
                } else {
                    Ok(JsonPathTypeKind::Nodelist)
                }
            }
            FunctionExprArg::LogicalExpr(_) => Ok(JsonPathTypeKind::Logical),
            FunctionExprArg::FunctionExpr(func) => Ok(func.return_type),
            FunctionExprArg::CurrentKey => Ok(JsonPathTypeKind::Value),
        }
    }
}

#[doc(hidden)]
/// An error occurred while validating a function
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FunctionValidationError {
    /// Function not defined in the registry
    #[error("function name '{name}' is not defined")]
    Undefined {
        /// The name of the function
        name: String,
    },
    /// Mismatch in number of function arguments
    #[error("expected {expected} args, but received {received}")]
    NumberOfArgsMismatch {
        /// Expected number of arguments
        expected: usize,
        /// Received number of arguments
        received: usize,
    },
    /// The type of received argument does not match the function definition
    #[error("in argument position {position}, expected a type that converts to {expected}, received {received}")]
    MismatchTypeKind {
        /// Expected type
        expected: JsonPathTypeKind,
        /// Received type
        received: JsonPathTypeKind,
        /// Argument position
        position: usize,
    },
    #[error("function with incorrect return type used")]
    IncorrectFunctionReturnType,
}

impl TestFilter for FunctionExpr {
    #[cfg_attr(
        feature = "trace",
        tracing::instrument(name = "Test Function Expr", level = "trace", parent = None, ret)
    )]
    fn test_filter<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> bool {
        match self.evaluate(current, ctx) {
            JsonPathType::Nodes(nl) => !nl.is_empty(),
            JsonPathType::Value(v) => v.test_filter(current, ctx),
            JsonPathType::Logical(l) => l.into(),
            JsonPathType::Node(n) => n.test_filter(current, ctx),
            JsonPathType::Nothing => false,
        }
    }
}
