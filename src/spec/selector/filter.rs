//! Types representing filter selectors in JSONPath
use regex::Regex;
use serde_json::{Number, Value};

use crate::{
    eval::{CurrentKey, EvalContext},
    node::LocatedNode,
    path::NormalizedPath,
    spec::{
        functions::{FunctionExpr, JsonPathType, NodesType, ValueType},
        query::{Query, QueryKind, Queryable},
        segment::{QuerySegment, Segment},
    },
};

use super::{index::Index, name::Name, Selector};

mod sealed {
    use serde_json::Value;

    use crate::spec::functions::FunctionExpr;

    use super::{BasicExpr, ComparisonExpr, ExistExpr, LogicalAndExpr, LogicalOrExpr, MembershipExpr};

    pub trait Sealed {}
    impl Sealed for Value {}
    impl Sealed for LogicalOrExpr {}
    impl Sealed for LogicalAndExpr {}
    impl Sealed for BasicExpr {}
    impl Sealed for ExistExpr {}
    impl Sealed for ComparisonExpr {}
    impl Sealed for MembershipExpr {}
    impl Sealed for FunctionExpr {}
}

/// Trait for testing a filter type
pub trait TestFilter: sealed::Sealed {
    /// Test self using the current node and the ambient [`EvalContext`]
    fn test_filter<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> bool;
}

impl TestFilter for Value {
    fn test_filter<'b>(&self, _current: &'b Value, _ctx: &EvalContext<'b>) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n != &Number::from(0),
            _ => true,
        }
    }
}

/// The main filter type for JSONPath
#[derive(Debug, PartialEq, Clone)]
pub struct Filter(pub LogicalOrExpr);

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{expr}", expr = self.0)
    }
}

impl Filter {
    fn test_cached<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> bool {
        let expr_id = &self.0 as *const LogicalOrExpr as usize;
        match ctx.cache {
            Some(cache) => cache.get_or_insert_with(expr_id, current, ctx.root, || self.0.test_filter(current, ctx)),
            None => self.0.test_filter(current, ctx),
        }
    }
}

impl Queryable for Filter {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Filter", level = "trace", parent = None, ret))]
    fn query<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> Vec<&'b Value> {
        if let Some(list) = current.as_array() {
            list.iter()
                .enumerate()
                .filter(|(i, v)| self.test_cached(v, &ctx.with_key(CurrentKey::Index(*i))))
                .map(|(_, v)| v)
                .collect()
        } else if let Some(obj) = current.as_object() {
            obj.iter()
                .filter(|(k, v)| self.test_cached(v, &ctx.with_key(CurrentKey::Name(k))))
                .map(|(_, v)| v)
                .collect()
        } else {
            vec![]
        }
    }

    fn query_located<'b>(
        &self,
        current: &'b Value,
        ctx: &EvalContext<'b>,
        parent: NormalizedPath<'b>,
    ) -> Vec<LocatedNode<'b>> {
        if let Some(list) = current.as_array() {
            list.iter()
                .enumerate()
                .filter(|(i, v)| self.test_cached(v, &ctx.with_key(CurrentKey::Index(*i))))
                .map(|(i, v)| LocatedNode {
                    loc: parent.clone_and_push(i),
                    node: v,
                })
                .collect()
        } else if let Some(obj) = current.as_object() {
            obj.iter()
                .filter(|(k, v)| self.test_cached(v, &ctx.with_key(CurrentKey::Name(k))))
                .map(|(k, v)| LocatedNode {
                    loc: parent.clone_and_push(k),
                    node: v,
                })
                .collect()
        } else {
            vec![]
        }
    }
}

/// The top level boolean expression type
///
/// This is also `logical-expression` in the JSONPath specification, but the naming was chosen to
/// make it more clear that it represents the logical OR, and to not have an extra wrapping type.
#[derive(Debug, PartialEq, Clone)]
pub struct LogicalOrExpr(pub Vec<LogicalAndExpr>);

impl std::fmt::Display for LogicalOrExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, expr) in self.0.iter().enumerate() {
            write!(
                f,
                "{expr}{logic}",
                logic = if i == self.0.len() - 1 { "" } else { " || " }
            )?;
        }
        Ok(())
    }
}

impl TestFilter for LogicalOrExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Logical Or Expr", level = "trace", parent = None, ret))]
    fn test_filter<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> bool {
        self.0.iter().any(|expr| expr.test_filter(current, ctx))
    }
}

/// A logical AND expression
#[derive(Debug, PartialEq, Clone)]
pub struct LogicalAndExpr(pub Vec<BasicExpr>);

impl std::fmt::Display for LogicalAndExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, expr) in self.0.iter().enumerate() {
            write!(
                f,
                "{expr}{logic}",
                logic = if i == self.0.len() - 1 { "" } else { " && " }
            )?;
        }
        Ok(())
    }
}

impl TestFilter for LogicalAndExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Logical And Expr", level = "trace", parent = None, ret))]
    fn test_filter<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> bool {
        self.0.iter().all(|expr| expr.test_filter(current, ctx))
    }
}

/// The basic form of expression in a filter
#[derive(Debug, PartialEq, Clone)]
pub enum BasicExpr {
    /// An expression wrapped in parenthesis
    Paren(LogicalOrExpr),
    /// A parenthesized expression preceded with a `!` or `not`
    NotParen(LogicalOrExpr),
    /// A relationship expression which compares two JSON values
    Relation(ComparisonExpr),
    /// An existence expression
    Exist(ExistExpr),
    /// The inverse of an existence expression, i.e., preceded by `!`
    NotExist(ExistExpr),
    /// A function expression
    FuncExpr(FunctionExpr),
    /// The inverse of a function expression, i.e., preceded by `!`
    NotFuncExpr(FunctionExpr),
    /// A membership test, `value in collection`, or its reverse, `collection contains value`
    In(MembershipExpr),
    /// The inverse of a membership test, i.e., preceded by `!`
    NotIn(MembershipExpr),
}

impl std::fmt::Display for BasicExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BasicExpr::Paren(expr) => write!(f, "({expr})"),
            BasicExpr::NotParen(expr) => write!(f, "!({expr})"),
            BasicExpr::Relation(rel) => write!(f, "{rel}"),
            BasicExpr::Exist(exist) => write!(f, "{exist}"),
            BasicExpr::NotExist(exist) => write!(f, "!{exist}"),
            BasicExpr::FuncExpr(expr) => write!(f, "{expr}"),
            BasicExpr::NotFuncExpr(expr) => write!(f, "!{expr}"),
            BasicExpr::In(expr) => write!(f, "{expr}"),
            BasicExpr::NotIn(expr) => write!(f, "!{expr}"),
        }
    }
}

impl BasicExpr {
    /// Optionally express as a relation expression
    pub fn as_relation(&self) -> Option<&ComparisonExpr> {
        match self {
            BasicExpr::Relation(cx) => Some(cx),
            _ => None,
        }
    }
}

impl TestFilter for BasicExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Basic Expr", level = "trace", parent = None, ret))]
    fn test_filter<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> bool {
        match self {
            BasicExpr::Paren(expr) => expr.test_filter(current, ctx),
            BasicExpr::NotParen(expr) => !expr.test_filter(current, ctx),
            BasicExpr::Relation(expr) => expr.test_filter(current, ctx),
            BasicExpr::Exist(expr) => expr.test_filter(current, ctx),
            BasicExpr::NotExist(expr) => !expr.test_filter(current, ctx),
            BasicExpr::FuncExpr(expr) => expr.test_filter(current, ctx),
            BasicExpr::NotFuncExpr(expr) => !expr.test_filter(current, ctx),
            BasicExpr::In(expr) => expr.test_filter(current, ctx),
            BasicExpr::NotIn(expr) => !expr.test_filter(current, ctx),
        }
    }
}

/// A collection operand for a [`MembershipExpr`]
#[derive(Debug, PartialEq, Clone)]
pub enum MembershipCollection {
    /// A literal list, e.g. `['a', 'b', 1]`
    List(Vec<Literal>),
    /// A singular query resolving to the sequence or mapping to test membership against, e.g.
    /// `@.tags`
    Query(Query),
    /// A nodelist-returning function call, e.g. `keys(@)`, whose matched nodes are themselves the
    /// candidate members rather than a container to search inside
    Func(FunctionExpr),
}

impl std::fmt::Display for MembershipCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MembershipCollection::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    write!(f, "{item}{comma}", comma = if i == items.len() - 1 { "" } else { "," })?;
                }
                write!(f, "]")
            }
            MembershipCollection::Query(query) => write!(f, "{query}"),
            MembershipCollection::Func(func) => write!(f, "{func}"),
        }
    }
}

/// Test whether `item` is a member of the resolved collection `value`: an array element
/// (structurally equal), or an object key (string items only)
fn value_in_collection(item: &Value, value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|v| value_equal_to(item, v)),
        Value::Object(map) => matches!(item, Value::String(s) if map.contains_key(s)),
        _ => false,
    }
}

/// A membership test, e.g. `@.tag in ['a', 'b']` or `['a', 'b'] contains @.tag`
#[derive(Debug, PartialEq, Clone)]
pub struct MembershipExpr {
    /// The value being tested for membership
    pub item: Comparable,
    /// The collection it is tested against
    pub collection: MembershipCollection,
    /// Whether this was written in `contains` form, i.e. `collection contains item`
    pub contains_form: bool,
}

impl std::fmt::Display for MembershipExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.contains_form {
            write!(f, "{} contains {}", self.collection, self.item)
        } else {
            write!(f, "{} in {}", self.item, self.collection)
        }
    }
}

impl TestFilter for MembershipExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Membership Expr", level = "trace", parent = None, ret))]
    fn test_filter<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> bool {
        let item = ValueType::try_from(self.item.as_value(current, ctx)).ok();
        let item_value = match item.as_ref().and_then(ValueType::as_value) {
            Some(v) => v,
            None => return false,
        };
        match &self.collection {
            MembershipCollection::List(items) => items
                .iter()
                .any(|lit| value_equal_to(item_value, &lit.as_value())),
            MembershipCollection::Query(query) => query
                .query(current, ctx)
                .into_iter()
                .any(|v| value_in_collection(item_value, v)),
            MembershipCollection::Func(func) => match NodesType::try_from(func.evaluate(current, ctx)) {
                Ok(nodes) => nodes.into_inner().all().into_iter().any(|v| value_equal_to(item_value, v)),
                Err(_) => false,
            },
        }
    }
}

/// Existence expression
///
/// ### Implementation Note
///
/// This does not support the function expression notation outlined in the JSONPath spec.
#[derive(Debug, PartialEq, Clone)]
pub struct ExistExpr(pub Query);

impl std::fmt::Display for ExistExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{query}", query = self.0)
    }
}

impl TestFilter for ExistExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Exists Expr", level = "trace", parent = None, ret))]
    fn test_filter<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> bool {
        !self.0.query(current, ctx).is_empty()
    }
}

/// A comparison expression comparing two JSON values
#[derive(Debug, PartialEq, Clone)]
pub struct ComparisonExpr {
    /// The JSON value on the left of the comparison
    pub left: Comparable,
    /// The operator of comparison
    pub op: ComparisonOperator,
    /// The JSON value on the right of the comparison
    pub right: Comparable,
}

fn check_equal_to(left: &JsonPathType, right: &JsonPathType) -> bool {
    match (left, right) {
        (JsonPathType::Node(v1), JsonPathType::Node(v2)) => value_equal_to(v1, v2),
        (JsonPathType::Node(v1), JsonPathType::Value(v2)) => value_equal_to(v1, v2),
        (JsonPathType::Value(v1), JsonPathType::Node(v2)) => value_equal_to(v1, v2),
        (JsonPathType::Value(v1), JsonPathType::Value(v2)) => value_equal_to(v1, v2),
        (JsonPathType::Nothing, JsonPathType::Nothing) => true,
        _ => false,
    }
}

fn value_equal_to(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => number_equal_to(l, r),
        _ => left == right,
    }
}

fn number_equal_to(left: &Number, right: &Number) -> bool {
    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        l == r
    } else if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        l == r
    } else if let (Some(l), Some(r)) = (left.as_u64(), right.as_u64()) {
        l == r
    } else {
        false
    }
}

fn value_less_than(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(n1), Value::Number(n2)) => number_less_than(n1, n2),
        (Value::String(s1), Value::String(s2)) => s1 < s2,
        _ => false,
    }
}

fn check_less_than(left: &JsonPathType, right: &JsonPathType) -> bool {
    match (left, right) {
        (JsonPathType::Node(v1), JsonPathType::Node(v2)) => value_less_than(v1, v2),
        (JsonPathType::Node(v1), JsonPathType::Value(v2)) => value_less_than(v1, v2),
        (JsonPathType::Value(v1), JsonPathType::Node(v2)) => value_less_than(v1, v2),
        (JsonPathType::Value(v1), JsonPathType::Value(v2)) => value_less_than(v1, v2),
        _ => false,
    }
}

fn value_same_type(left: &Value, right: &Value) -> bool {
    matches!((left, right), (Value::Null, Value::Null))
        | matches!((left, right), (Value::Bool(_), Value::Bool(_)))
        | matches!((left, right), (Value::Number(_), Value::Number(_)))
        | matches!((left, right), (Value::String(_), Value::String(_)))
        | matches!((left, right), (Value::Array(_), Value::Array(_)))
        | matches!((left, right), (Value::Object(_), Value::Object(_)))
}

fn check_same_type(left: &JsonPathType, right: &JsonPathType) -> bool {
    match (left, right) {
        (JsonPathType::Node(v1), JsonPathType::Node(v2)) => value_same_type(v1, v2),
        (JsonPathType::Node(v1), JsonPathType::Value(v2)) => value_same_type(v1, v2),
        (JsonPathType::Value(v1), JsonPathType::Node(v2)) => value_same_type(v1, v2),
        (JsonPathType::Value(v1), JsonPathType::Value(v2)) => value_same_type(v1, v2),
        _ => false,
    }
}

fn check_regex_match(left: &JsonPathType, right: &JsonPathType) -> bool {
    let subject = match left {
        JsonPathType::Node(Value::String(s)) | JsonPathType::Value(Value::String(s)) => s.as_str(),
        _ => return false,
    };
    let pattern = match right {
        JsonPathType::Node(Value::String(s)) | JsonPathType::Value(Value::String(s)) => s.as_str(),
        _ => return false,
    };
    Regex::new(pattern).is_ok_and(|re| re.is_match(subject))
}

impl std::fmt::Display for ComparisonExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{left}{op}{right}",
            left = self.left,
            op = self.op,
            right = self.right
        )
    }
}

impl TestFilter for ComparisonExpr {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Test Comparison Expr", level = "trace", parent = None, ret))]
    fn test_filter<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> bool {
        let left = self.left.as_value(current, ctx);
        let right = self.right.as_value(current, ctx);
        match self.op {
            ComparisonOperator::EqualTo => check_equal_to(&left, &right),
            ComparisonOperator::NotEqualTo => !check_equal_to(&left, &right),
            ComparisonOperator::LessThan => {
                check_same_type(&left, &right) && check_less_than(&left, &right)
            }
            ComparisonOperator::GreaterThan => {
                check_same_type(&left, &right)
                    && !check_less_than(&left, &right)
                    && !check_equal_to(&left, &right)
            }
            ComparisonOperator::LessThanEqualTo => {
                check_same_type(&left, &right)
                    && (check_less_than(&left, &right) || check_equal_to(&left, &right))
            }
            ComparisonOperator::GreaterThanEqualTo => {
                check_same_type(&left, &right) && !check_less_than(&left, &right)
            }
            ComparisonOperator::RegexMatch => check_regex_match(&left, &right),
        }
    }
}

fn number_less_than(n1: &Number, n2: &Number) -> bool {
    if let (Some(a), Some(b)) = (n1.as_f64(), n2.as_f64()) {
        a < b
    } else if let (Some(a), Some(b)) = (n1.as_i64(), n2.as_i64()) {
        a < b
    } else if let (Some(a), Some(b)) = (n1.as_u64(), n2.as_u64()) {
        a < b
    } else {
        false
    }
}

/// The comparison operator
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ComparisonOperator {
    /// `==`
    EqualTo,
    /// `!=`
    NotEqualTo,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `<=`
    LessThanEqualTo,
    /// `>=`
    GreaterThanEqualTo,
    /// `=~`, a non-standard regular expression match
    RegexMatch,
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonOperator::EqualTo => write!(f, "=="),
            ComparisonOperator::NotEqualTo => write!(f, "!="),
            ComparisonOperator::LessThan => write!(f, "<"),
            ComparisonOperator::GreaterThan => write!(f, ">"),
            ComparisonOperator::LessThanEqualTo => write!(f, "<="),
            ComparisonOperator::GreaterThanEqualTo => write!(f, ">="),
            ComparisonOperator::RegexMatch => write!(f, "=~"),
        }
    }
}

/// A type that is comparable
#[derive(Debug, PartialEq, Clone)]
pub enum Comparable {
    /// A literal JSON value, excluding objects and arrays
    Literal(Literal),
    /// A singular query
    ///
    /// This will only produce a single node, i.e., JSON value, or nothing
    SingularQuery(SingularQuery),
    /// A function expression that can only produce a `ValueType`
    FunctionExpr(FunctionExpr),
    /// The `#` token, referring to the key or index of the node currently under test
    CurrentKey,
}

impl std::fmt::Display for Comparable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparable::Literal(lit) => write!(f, "{lit}"),
            Comparable::SingularQuery(path) => write!(f, "{path}"),
            Comparable::FunctionExpr(expr) => write!(f, "{expr}"),
            Comparable::CurrentKey => write!(f, "#"),
        }
    }
}

impl Comparable {
    #[doc(hidden)]
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Comparable::as_value", level = "trace", parent = None, ret))]
    pub fn as_value<'a, 'b: 'a>(&'a self, current: &'b Value, ctx: &EvalContext<'b>) -> JsonPathType<'b> {
        match self {
            Comparable::Literal(lit) => lit.into(),
            Comparable::SingularQuery(sp) => match sp.eval_query(current, ctx) {
                Some(v) => JsonPathType::Node(v),
                None => JsonPathType::Nothing,
            },
            Comparable::FunctionExpr(expr) => expr.evaluate(current, ctx),
            Comparable::CurrentKey => match ctx.current_key {
                Some(key) => JsonPathType::Value(Value::from(key)),
                None => JsonPathType::Nothing,
            },
        }
    }

    #[doc(hidden)]
    pub fn as_singular_path(&self) -> Option<&SingularQuery> {
        match self {
            Comparable::SingularQuery(sp) => Some(sp),
            _ => None,
        }
    }
}

/// A literal JSON value that can be represented in a JSONPath query
#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    /// A valid JSON number
    Number(Number),
    /// A string
    String(String),
    /// `true` or `false`
    Bool(bool),
    /// `null`
    Null,
}

impl Literal {
    fn as_value(&self) -> Value {
        match self {
            Literal::Number(n) => Value::from(n.to_owned()),
            Literal::String(s) => Value::from(s.to_owned()),
            Literal::Bool(b) => Value::from(*b),
            Literal::Null => Value::Null,
        }
    }
}

impl<'a> From<&'a Literal> for JsonPathType<'a> {
    fn from(value: &'a Literal) -> Self {
        JsonPathType::Value(value.as_value())
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::String(s) => write!(f, "'{s}'"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Null => write!(f, "null"),
        }
    }
}

/// A segment in a singular query
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SingularQuerySegment {
    /// A single name segment
    Name(Name),
    /// A single index segment
    Index(Index),
}

impl std::fmt::Display for SingularQuerySegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SingularQuerySegment::Name(name) => write!(f, "{name}"),
            SingularQuerySegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl TryFrom<QuerySegment> for SingularQuerySegment {
    type Error = NonSingularQueryError;

    fn try_from(segment: QuerySegment) -> Result<Self, Self::Error> {
        if segment.is_descendent() {
            return Err(NonSingularQueryError::Descendant);
        }
        match segment.segment {
            Segment::LongHand(mut selectors) => {
                if selectors.len() > 1 {
                    Err(NonSingularQueryError::TooManySelectors)
                } else if let Some(sel) = selectors.pop() {
                    sel.try_into()
                } else {
                    Err(NonSingularQueryError::NoSelectors)
                }
            }
            Segment::DotName(name) => Ok(Self::Name(Name(name))),
            Segment::Wildcard => Err(NonSingularQueryError::Wildcard),
        }
    }
}

impl TryFrom<Selector> for SingularQuerySegment {
    type Error = NonSingularQueryError;

    fn try_from(selector: Selector) -> Result<Self, Self::Error> {
        match selector {
            Selector::Name(n) => Ok(Self::Name(n)),
            Selector::Wildcard => Err(NonSingularQueryError::Wildcard),
            Selector::Index(i) => Ok(Self::Index(i)),
            Selector::ArraySlice(_) => Err(NonSingularQueryError::Slice),
            Selector::Filter(_) => Err(NonSingularQueryError::Filter),
            Selector::Keys => Err(NonSingularQueryError::KeysSelector),
            Selector::Key(_) => Err(NonSingularQueryError::KeySelector),
            Selector::KeysFilter(_) => Err(NonSingularQueryError::KeysSelector),
            Selector::SingularQuerySelector(_) => Err(NonSingularQueryError::EmbeddedQuery),
        }
    }
}

/// Represents a singular query in JSONPath
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SingularQuery {
    /// The kind of singular query, relative or absolute
    pub kind: SingularQueryKind,
    /// The segments making up the query
    pub segments: Vec<SingularQuerySegment>,
}

impl SingularQuery {
    /// Evaluate the singular query
    #[cfg_attr(feature = "trace", tracing::instrument(name = "SingularQuery::eval_query", level = "trace", parent = None, ret))]
    pub fn eval_query<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> Option<&'b Value> {
        let mut segments = self.segments.iter();
        let mut target = match self.kind {
            SingularQueryKind::Absolute => ctx.root,
            SingularQueryKind::Relative => current,
            // `^` addresses a synthetic single-element array wrapping the root (see
            // `crate::spec::query::pseudo_root_segment_query`); only its first segment sees that
            // wrapping. An index segment must select the array's sole element (0 or -1) to match;
            // any other first-segment shape falls back to addressing root directly.
            SingularQueryKind::PseudoRoot => match segments.next() {
                Some(SingularQuerySegment::Index(Index(i))) => {
                    if *i == 0 || *i == -1 {
                        ctx.root
                    } else {
                        return None;
                    }
                }
                Some(SingularQuerySegment::Name(_)) | None => ctx.root,
            },
            SingularQueryKind::Extra => ctx.extra?,
        };
        for segment in segments {
            match segment {
                SingularQuerySegment::Name(name) => {
                    if let Some(t) = target.as_object().and_then(|o| o.get(name.as_str())) {
                        target = t;
                    } else {
                        return None;
                    }
                }
                SingularQuerySegment::Index(index) => {
                    if let Some(t) = target
                        .as_array()
                        .and_then(|l| usize::try_from(index.0).ok().and_then(|i| l.get(i)))
                    {
                        target = t;
                    } else {
                        return None;
                    }
                }
            }
        }
        Some(target)
    }
}

impl TryFrom<Query> for SingularQuery {
    type Error = NonSingularQueryError;

    fn try_from(query: Query) -> Result<Self, Self::Error> {
        let kind = SingularQueryKind::from(query.kind);
        let segments = query
            .segments
            .into_iter()
            .map(TryFrom::try_from)
            .collect::<Result<Vec<SingularQuerySegment>, Self::Error>>()?;
        Ok(Self { kind, segments })
    }
}

impl Queryable for SingularQuery {
    fn query<'b>(&self, current: &'b Value, ctx: &EvalContext<'b>) -> Vec<&'b Value> {
        match self.eval_query(current, ctx) {
            Some(v) => vec![v],
            None => vec![],
        }
    }

    fn query_located<'b>(
        &self,
        current: &'b Value,
        ctx: &EvalContext<'b>,
        parent: NormalizedPath<'b>,
    ) -> Vec<LocatedNode<'b>> {
        // Singular queries are only evaluated from within filter expressions, where only the
        // value, not its location, is ever needed.
        match self.eval_query(current, ctx) {
            Some(v) => vec![LocatedNode { loc: parent, node: v }],
            None => vec![],
        }
    }
}

impl std::fmt::Display for SingularQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            SingularQueryKind::Absolute => write!(f, "$")?,
            SingularQueryKind::Relative => write!(f, "@")?,
            SingularQueryKind::PseudoRoot => write!(f, "^")?,
            SingularQueryKind::Extra => write!(f, "_")?,
        }
        for s in &self.segments {
            write!(f, "[{s}]")?;
        }
        Ok(())
    }
}

/// The kind of singular query
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SingularQueryKind {
    /// Referencing the root node, i.e., `$`
    Absolute,
    /// Referencing the current node, i.e., `@`
    Relative,
    /// Referencing the synthetic pseudo-root, i.e., `^`
    PseudoRoot,
    /// Referencing the out-of-document extra context, i.e., `_`
    Extra,
}

impl From<QueryKind> for SingularQueryKind {
    fn from(qk: QueryKind) -> Self {
        match qk {
            QueryKind::Root => Self::Absolute,
            QueryKind::Current => Self::Relative,
            QueryKind::PseudoRoot => Self::PseudoRoot,
            QueryKind::Extra => Self::Extra,
        }
    }
}

/// Error when parsing a singular query
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NonSingularQueryError {
    /// Descendant segment
    #[error("descendant segments are not singular")]
    Descendant,
    /// Long hand segment with too many internal selectors
    #[error("long hand segment contained more than one selector")]
    TooManySelectors,
    /// Long hand segment with no selectors
    #[error("long hand segment contained no selectors")]
    NoSelectors,
    /// A wildcard segment
    #[error("wildcard segments are not singular")]
    Wildcard,
    /// A slice segment
    #[error("slice segments are not singular")]
    Slice,
    /// A filter segment
    #[error("filter segments are not singular")]
    Filter,
    /// A keys (`~`) or keys-filter (`~?expr`) selector
    #[error("keys selectors are not singular")]
    KeysSelector,
    /// A key (`~name`) selector
    #[error("key selectors are not singular")]
    KeySelector,
    /// An embedded singular-query-selector
    #[error("embedded queries are not permitted as singular query segments")]
    EmbeddedQuery,
}
