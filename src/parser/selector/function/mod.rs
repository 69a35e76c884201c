//! Parsers producing [`crate::spec::functions::FunctionExpr`]
use nom::character::complete::char;
use nom::combinator::{cut, map_res};
use nom::multi::separated_list0;
use nom::sequence::{preceded, terminated};
use nom::{
    branch::alt,
    character::complete::{multispace0, satisfy},
    combinator::map,
    multi::fold_many1,
    sequence::{delimited, pair},
};

use crate::spec::functions::{FunctionExpr, FunctionExprArg};

use crate::parser::{parse_query, PResult, ParserOptions};

use super::filter::{parse_literal, parse_logical_or_expr, parse_singular_path};

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_function_name_first(input: &str) -> PResult<char> {
    satisfy(|c| c.is_ascii_lowercase())(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_function_name_char(input: &str) -> PResult<char> {
    alt((parse_function_name_first, char('_'), satisfy(|c| c.is_ascii_digit())))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_function_name(input: &str) -> PResult<String> {
    map(
        pair(
            parse_function_name_first,
            fold_many1(parse_function_name_char, String::new, |mut string, fragment| {
                string.push(fragment);
                string
            }),
        ),
        |(first, rest)| format!("{first}{rest}"),
    )(input)
}

/// The `#` token, referring to the current member's key or index, non-standard
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_current_key_argument(input: &str) -> PResult<FunctionExprArg> {
    map(char('#'), |_| FunctionExprArg::CurrentKey)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_function_argument<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, FunctionExprArg> {
    if opts.strict {
        alt((
            map(parse_literal, FunctionExprArg::Literal),
            map(|i| parse_singular_path(opts, i), FunctionExprArg::SingularQuery),
            map(|i| parse_query(opts, i), FunctionExprArg::FilterQuery),
            map(|i| parse_function_expr(opts, i), FunctionExprArg::FunctionExpr),
            map(|i| parse_logical_or_expr(opts, i), FunctionExprArg::LogicalExpr),
        ))(input)
    } else {
        alt((
            map(parse_literal, FunctionExprArg::Literal),
            parse_current_key_argument,
            map(|i| parse_singular_path(opts, i), FunctionExprArg::SingularQuery),
            map(|i| parse_query(opts, i), FunctionExprArg::FilterQuery),
            map(|i| parse_function_expr(opts, i), FunctionExprArg::FunctionExpr),
            map(|i| parse_logical_or_expr(opts, i), FunctionExprArg::LogicalExpr),
        ))(input)
    }
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_function_expr<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, FunctionExpr> {
    cut(map_res(
        pair(
            parse_function_name,
            delimited(
                terminated(char('('), multispace0),
                separated_list0(
                    delimited(multispace0, char(','), multispace0),
                    |i| parse_function_argument(opts, i),
                ),
                preceded(multispace0, char(')')),
            ),
        ),
        |(name, args)| FunctionExpr::validate(name, args, opts.functions),
    ))(input)
}
