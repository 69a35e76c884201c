//! Parsers producing [`crate::spec::selector::Selector`] and its sub-parsers
use nom::branch::alt;
use nom::character::complete::char;
use nom::combinator::{map, map_res};
use nom::error::context;
use nom::sequence::preceded;

use crate::spec::selector::{filter::SingularQuery, index::Index, name::Name, Selector};

use self::filter::{parse_filter, parse_keys_filter};
use self::slice::parse_array_slice;

use super::primitive::int::parse_int;
use super::primitive::string::parse_string_literal;
use super::segment::parse_dot_member_name;
use super::{parse_query, PResult, ParserOptions};

pub mod filter;
pub mod function;
pub mod slice;

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_wildcard_selector(input: &str) -> PResult<Selector> {
    map(char('*'), |_| Selector::Wildcard)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_name(input: &str) -> PResult<Name> {
    map(parse_string_literal, Name)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_name_selector(input: &str) -> PResult<Selector> {
    map(parse_name, Selector::Name)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_index(input: &str) -> PResult<Index> {
    map(parse_int, Index)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_index_selector(input: &str) -> PResult<Selector> {
    map(parse_index, Selector::Index)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_array_slice_selector(input: &str) -> PResult<Selector> {
    map(parse_array_slice, Selector::ArraySlice)(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_filter_selector<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, Selector> {
    map(|i| parse_filter(opts, i), Selector::Filter)(input)
}

/// The keys selector, `~`, non-standard
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_keys_selector(input: &str) -> PResult<Selector> {
    map(char('~'), |_| Selector::Keys)(input)
}

/// A single key selector, `~'name'`, non-standard
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_key_selector(input: &str) -> PResult<Selector> {
    alt((
        map(preceded(char('~'), parse_string_literal), Selector::Key),
        map(preceded(char('~'), parse_dot_member_name), Selector::Key),
    ))(input)
}

/// A keys-filter selector, `~?expr`, non-standard
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_keys_filter_selector<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, Selector> {
    map(|i| parse_keys_filter(opts, i), Selector::KeysFilter)(input)
}

/// An embedded singular query used in the place of a literal name/index, e.g. `[$.idx]`,
/// non-standard
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_singular_query_selector<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, Selector> {
    map_res(
        |i| parse_query(opts, i),
        |q| SingularQuery::try_from(q).map(Selector::SingularQuerySelector),
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_selector<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, Selector> {
    if opts.strict {
        context(
            "selector",
            alt((
                parse_wildcard_selector,
                parse_name_selector,
                parse_array_slice_selector,
                parse_index_selector,
                |i| parse_filter_selector(opts, i),
            )),
        )(input)
    } else {
        context(
            "selector",
            alt((
                parse_wildcard_selector,
                parse_name_selector,
                parse_array_slice_selector,
                parse_index_selector,
                |i| parse_filter_selector(opts, i),
                |i| parse_keys_filter_selector(opts, i),
                parse_keys_selector,
                parse_key_selector,
                |i| parse_singular_query_selector(opts, i),
            )),
        )(input)
    }
}

#[cfg(test)]
mod tests {
    use crate::spec::{
        functions::default_registry,
        selector::{index::Index, name::Name, slice::Slice, Selector},
    };

    use super::{parse_selector, parse_wildcard_selector, ParserOptions};

    fn opts(strict: bool) -> ParserOptions<'static> {
        ParserOptions {
            strict,
            functions: default_registry(),
        }
    }

    #[test]
    fn wildcard() {
        assert!(matches!(parse_wildcard_selector("*"), Ok(("", Selector::Wildcard))));
    }

    #[test]
    fn all_selectors() {
        {
            let (_, s) = parse_selector(opts(true), "0").unwrap();
            assert_eq!(s, Selector::Index(Index(0)));
        }
        {
            let (_, s) = parse_selector(opts(true), "10").unwrap();
            assert_eq!(s, Selector::Index(Index(10)));
        }
        {
            let (_, s) = parse_selector(opts(true), "'name'").unwrap();
            assert_eq!(s, Selector::Name(Name(String::from("name"))));
        }
        {
            let (_, s) = parse_selector(opts(true), "\"name\"").unwrap();
            assert_eq!(s, Selector::Name(Name(String::from("name"))));
        }
        {
            let (_, s) = parse_selector(opts(true), "0:3").unwrap();
            assert_eq!(s, Selector::ArraySlice(Slice::new().with_start(0).with_end(3)));
        }
    }

    #[test]
    fn keys_selectors_non_strict_only() {
        assert!(matches!(parse_selector(opts(false), "~").unwrap().1, Selector::Keys));
        assert!(parse_selector(opts(true), "~").is_err());
        assert!(matches!(
            parse_selector(opts(false), "~'foo'").unwrap().1,
            Selector::Key(name) if name == "foo"
        ));
    }
}
