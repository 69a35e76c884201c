//! Parsers producing [`crate::spec::selector::filter::Filter`] and its sub-expressions
use nom::character::complete::{char, multispace0};
use nom::combinator::{cut, map, map_res};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair, preceded, separated_pair, tuple};
use nom::{branch::alt, bytes::complete::tag, combinator::value};

use crate::spec::functions::{FunctionExpr, FunctionValidationError, JsonPathTypeKind};
use crate::spec::query::Query;
use crate::spec::selector::filter::{
    BasicExpr, Comparable, ComparisonExpr, ComparisonOperator, ExistExpr, Filter, Literal,
    LogicalAndExpr, LogicalOrExpr, MembershipCollection, MembershipExpr, SingularQuery,
};

use super::function::parse_function_expr;
use crate::parser::primitive::number::parse_number;
use crate::parser::primitive::string::parse_string_literal;
use crate::parser::primitive::{parse_bool, parse_null};
use crate::parser::utils::uncut;
use crate::parser::{parse_query, PResult, ParserOptions};

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_filter<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, Filter> {
    map(
        preceded(pair(char('?'), multispace0), |i| parse_logical_or_expr(opts, i)),
        Filter,
    )(input)
}

/// A keys-filter body, `?expr`, used by `~?expr` selectors; identical grammar to a regular filter
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_keys_filter<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, Filter> {
    parse_filter(opts, input)
}

fn or_tag<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, &'a str> {
    if opts.strict {
        tag("||")(input)
    } else {
        alt((tag("||"), tag("or")))(input)
    }
}

fn and_tag<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, &'a str> {
    if opts.strict {
        tag("&&")(input)
    } else {
        alt((tag("&&"), tag("and")))(input)
    }
}

fn not_tag<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, &'a str> {
    if opts.strict {
        tag("!")(input)
    } else {
        alt((tag("!"), tag("not ")))(input)
    }
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_logical_and<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, LogicalAndExpr> {
    map(
        separated_list1(
            tuple((multispace0, |i| and_tag(opts, i), multispace0)),
            |i| parse_basic_expr(opts, i),
        ),
        LogicalAndExpr,
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_logical_or_expr<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, LogicalOrExpr> {
    map(
        separated_list1(
            tuple((multispace0, |i| or_tag(opts, i), multispace0)),
            |i| parse_logical_and(opts, i),
        ),
        LogicalOrExpr,
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_exist_expr_inner<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, ExistExpr> {
    map(|i| parse_query(opts, i), ExistExpr)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_exist_expr<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, BasicExpr> {
    map(|i| parse_exist_expr_inner(opts, i), BasicExpr::Exist)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_not_exist_expr<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, BasicExpr> {
    map(
        preceded(pair(|i| not_tag(opts, i), multispace0), |i| parse_exist_expr_inner(opts, i)),
        BasicExpr::NotExist,
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_func_expr_inner<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, FunctionExpr> {
    map_res(|i| parse_function_expr(opts, i), |fe| match fe.return_type {
        JsonPathTypeKind::Logical | JsonPathTypeKind::Nodelist => Ok(fe),
        _ => Err(FunctionValidationError::IncorrectFunctionReturnType),
    })(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_func_expr<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, BasicExpr> {
    map(|i| parse_func_expr_inner(opts, i), BasicExpr::FuncExpr)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_not_func_expr<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, BasicExpr> {
    map(
        preceded(pair(|i| not_tag(opts, i), multispace0), |i| parse_func_expr_inner(opts, i)),
        BasicExpr::NotFuncExpr,
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_paren_expr_inner<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, LogicalOrExpr> {
    delimited(
        pair(char('('), multispace0),
        |i| parse_logical_or_expr(opts, i),
        pair(multispace0, char(')')),
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_paren_expr<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, BasicExpr> {
    map(|i| parse_paren_expr_inner(opts, i), BasicExpr::Paren)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_not_parent_expr<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, BasicExpr> {
    map(
        preceded(pair(|i| not_tag(opts, i), multispace0), |i| parse_paren_expr_inner(opts, i)),
        BasicExpr::NotParen,
    )(input)
}

/// A nodelist-returning function call used as a membership collection, e.g. `keys(@)`
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_nodelist_func_expr<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, FunctionExpr> {
    map_res(|i| parse_function_expr(opts, i), |fe| match fe.return_type {
        JsonPathTypeKind::Nodelist => Ok(fe),
        _ => Err(FunctionValidationError::IncorrectFunctionReturnType),
    })(input)
}

/// A membership collection operand: a literal list (`['a','b']`), a nodelist-returning function
/// call (`keys(@)`), or a query resolving to the sequence/mapping to search within (`@.tags`)
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_membership_collection<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, MembershipCollection> {
    alt((
        map(
            delimited(
                pair(char('['), multispace0),
                separated_list1(delimited(multispace0, char(','), multispace0), parse_literal),
                pair(multispace0, char(']')),
            ),
            MembershipCollection::List,
        ),
        map(|i| parse_nodelist_func_expr(opts, i), MembershipCollection::Func),
        map(|i| parse_query(opts, i), MembershipCollection::Query),
    ))(input)
}

/// An operand on either side of `in`/`contains`: a comparable value, or (on the collection side) a
/// literal list/query
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_membership_expr<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, MembershipExpr> {
    alt((
        map(
            separated_pair(
                |i| parse_comparable(opts, i),
                tuple((multispace0, tag("in"), multispace0)),
                |i| parse_membership_collection(opts, i),
            ),
            |(item, collection)| MembershipExpr {
                item,
                collection,
                contains_form: false,
            },
        ),
        map(
            separated_pair(
                |i| parse_membership_collection(opts, i),
                tuple((multispace0, tag("contains"), multispace0)),
                |i| parse_comparable(opts, i),
            ),
            |(collection, item)| MembershipExpr {
                item,
                collection,
                contains_form: true,
            },
        ),
    ))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_in_expr<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, BasicExpr> {
    map(|i| parse_membership_expr(opts, i), BasicExpr::In)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_not_in_expr<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, BasicExpr> {
    map(
        preceded(pair(|i| not_tag(opts, i), multispace0), |i| parse_membership_expr(opts, i)),
        BasicExpr::NotIn,
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_basic_expr<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, BasicExpr> {
    if opts.strict {
        alt((
            |i| parse_not_parent_expr(opts, i),
            |i| parse_paren_expr(opts, i),
            map(|i| parse_comp_expr(opts, i), BasicExpr::Relation),
            |i| parse_not_exist_expr(opts, i),
            |i| parse_exist_expr(opts, i),
            |i| parse_not_func_expr(opts, i),
            |i| parse_func_expr(opts, i),
        ))(input)
    } else {
        alt((
            |i| parse_not_parent_expr(opts, i),
            |i| parse_paren_expr(opts, i),
            |i| parse_not_in_expr(opts, i),
            |i| parse_in_expr(opts, i),
            map(|i| parse_comp_expr(opts, i), BasicExpr::Relation),
            |i| parse_not_exist_expr(opts, i),
            |i| parse_exist_expr(opts, i),
            |i| parse_not_func_expr(opts, i),
            |i| parse_func_expr(opts, i),
        ))(input)
    }
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_comp_expr<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, ComparisonExpr> {
    map(
        separated_pair(
            |i| parse_comparable(opts, i),
            multispace0,
            separated_pair(|i| parse_comparison_operator(opts, i), multispace0, |i| parse_comparable(opts, i)),
        ),
        |(left, (op, right))| ComparisonExpr { left, op, right },
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_comparison_operator<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, ComparisonOperator> {
    if opts.strict {
        alt((
            value(ComparisonOperator::EqualTo, tag("==")),
            value(ComparisonOperator::NotEqualTo, tag("!=")),
            value(ComparisonOperator::LessThanEqualTo, tag("<=")),
            value(ComparisonOperator::GreaterThanEqualTo, tag(">=")),
            value(ComparisonOperator::LessThan, char('<')),
            value(ComparisonOperator::GreaterThan, char('>')),
        ))(input)
    } else {
        alt((
            value(ComparisonOperator::EqualTo, tag("==")),
            value(ComparisonOperator::NotEqualTo, tag("!=")),
            value(ComparisonOperator::NotEqualTo, tag("<>")),
            value(ComparisonOperator::LessThanEqualTo, tag("<=")),
            value(ComparisonOperator::GreaterThanEqualTo, tag(">=")),
            value(ComparisonOperator::RegexMatch, tag("=~")),
            value(ComparisonOperator::LessThan, char('<')),
            value(ComparisonOperator::GreaterThan, char('>')),
        ))(input)
    }
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_literal(input: &str) -> PResult<Literal> {
    alt((
        map(parse_string_literal, Literal::String),
        map(parse_number, Literal::Number),
        map(parse_bool, Literal::Bool),
        value(Literal::Null, parse_null),
    ))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_literal_comparable(input: &str) -> PResult<Comparable> {
    map(parse_literal, Comparable::Literal)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_singular_path<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, SingularQuery> {
    map_res(|i| parse_query(opts, i), |q: Query| q.try_into())(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_singular_path_comparable<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, Comparable> {
    map(|i| parse_singular_path(opts, i), Comparable::SingularQuery)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_function_expr_comparable<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, Comparable> {
    map_res(|i| parse_function_expr(opts, i), |fe| {
        match fe.return_type {
            JsonPathTypeKind::Value => Ok(fe),
            _ => Err(FunctionValidationError::IncorrectFunctionReturnType),
        }
        .map(Comparable::FunctionExpr)
    })(input)
}

/// The `#` token, referring to the current member's key or index, non-standard
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_current_key_comparable(input: &str) -> PResult<Comparable> {
    value(Comparable::CurrentKey, char('#'))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_comparable<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, Comparable> {
    if opts.strict {
        uncut(alt((
            parse_literal_comparable,
            |i| parse_singular_path_comparable(opts, i),
            |i| parse_function_expr_comparable(opts, i),
        )))(input)
    } else {
        uncut(alt((
            parse_literal_comparable,
            parse_current_key_comparable,
            |i| parse_singular_path_comparable(opts, i),
            |i| parse_function_expr_comparable(opts, i),
        )))(input)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Number;

    use crate::spec::{
        functions::default_registry,
        selector::{
            filter::{Comparable, Literal, SingularQuerySegment},
            index::Index,
            name::Name,
        },
    };

    use super::{parse_basic_expr, parse_comp_expr, parse_comparable, parse_literal, ComparisonOperator, ParserOptions};

    fn opts(strict: bool) -> ParserOptions<'static> {
        ParserOptions {
            strict,
            functions: default_registry(),
        }
    }

    #[test]
    fn literals() {
        {
            let (_, lit) = parse_literal("null").unwrap();
            assert!(matches!(lit, Literal::Null));
        }
        {
            let (_, lit) = parse_literal("true").unwrap();
            assert!(matches!(lit, Literal::Bool(true)));
        }
        {
            let (_, lit) = parse_literal("false").unwrap();
            assert!(matches!(lit, Literal::Bool(false)));
        }
        {
            let (_, lit) = parse_literal("\"test\"").unwrap();
            assert!(matches!(lit, Literal::String(s) if s == "test"));
        }
        {
            let (_, lit) = parse_literal("'test'").unwrap();
            assert!(matches!(lit, Literal::String(s) if s == "test"));
        }
        {
            let (_, lit) = parse_literal("123").unwrap();
            assert!(matches!(lit, Literal::Number(n) if n == Number::from(123)));
        }
    }

    #[test]
    fn comp_expr() {
        let (_, cxp) = parse_comp_expr(opts(true), "true != false").unwrap();
        assert!(matches!(cxp.left, Comparable::Literal(Literal::Bool(true))));
        assert!(matches!(cxp.op, ComparisonOperator::NotEqualTo));
        assert!(matches!(cxp.right, Comparable::Literal(Literal::Bool(false))));
    }

    #[test]
    fn basic_expr() {
        let (_, bxp) = parse_basic_expr(opts(true), "true == true").unwrap();
        let cx = bxp.as_relation().unwrap();
        assert!(matches!(cx.left, Comparable::Literal(Literal::Bool(true))));
        assert!(matches!(cx.right, Comparable::Literal(Literal::Bool(true))));
        assert!(matches!(cx.op, ComparisonOperator::EqualTo));
    }

    #[test]
    fn singular_path_comparables() {
        {
            let (_, cmp) = parse_comparable(opts(true), "@.name").unwrap();
            let sp = &cmp.as_singular_path().unwrap().segments;
            assert!(matches!(&sp[0], SingularQuerySegment::Name(Name(s)) if s == "name"));
        }
        {
            let (_, cmp) = parse_comparable(opts(true), "$.data[0].id").unwrap();
            let sp = &cmp.as_singular_path().unwrap().segments;
            assert!(matches!(&sp[0], SingularQuerySegment::Name(Name(s)) if s == "data"));
            assert!(matches!(&sp[1], SingularQuerySegment::Index(Index(i)) if i == &0));
            assert!(matches!(&sp[2], SingularQuerySegment::Name(Name(s)) if s == "id"));
        }
    }

    #[test]
    fn regex_match_non_strict_only() {
        let (_, cxp) = parse_comp_expr(opts(false), "@.name =~ 'ab.*'").unwrap();
        assert!(matches!(cxp.op, ComparisonOperator::RegexMatch));
        assert!(parse_comp_expr(opts(true), "@.name =~ 'ab.*'").is_err());
    }

    #[test]
    fn current_key_comparable_non_strict_only() {
        assert!(matches!(parse_comparable(opts(false), "#").unwrap().1, Comparable::CurrentKey));
        assert!(parse_comparable(opts(true), "#").is_err());
    }
}
