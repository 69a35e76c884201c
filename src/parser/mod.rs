//! The `nom`-based recursive-descent parser for the JSONPath surface syntax
use std::fmt;

use nom::character::complete::{char, multispace0};
use nom::combinator::{all_consuming, map, opt};
use nom::error::{ContextError, ErrorKind, FromExternalError, ParseError as NomParseError};
use nom::sequence::{pair, tuple};
use nom::{branch::alt, multi::many0, sequence::preceded, IResult};

use crate::compound::{CompoundOp, CompoundQuery};
use crate::spec::functions::FunctionRegistry;
use crate::spec::query::{Query, QueryKind};
use crate::spec::segment::QuerySegment;
use crate::JsonPath;

pub(crate) mod primitive;
pub(crate) mod segment;
pub(crate) mod selector;
pub(crate) mod utils;

use self::segment::parse_segment;

/// The options every parser factory function is threaded with
///
/// Generalizes the bare `fn(&str) -> PResult<O>` combinators used elsewhere: the non-standard
/// extension grammar (`^`, `_`, `#`, `~`, `in`/`contains`, ...) is gated on `strict`, and function
/// expressions are validated against `functions` at parse time rather than a process-wide
/// registry.
#[derive(Clone, Copy)]
pub(crate) struct ParserOptions<'r> {
    pub(crate) strict: bool,
    pub(crate) functions: &'r FunctionRegistry,
}

/// A single recorded cause within an [`Error`]'s context stack
#[derive(Debug)]
pub(crate) enum Cause {
    Char(char),
    Context(&'static str),
    Nom(ErrorKind),
    External(String),
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Char(c) => write!(f, "expected '{c}'"),
            Cause::Context(ctx) => write!(f, "invalid {ctx}"),
            Cause::Nom(kind) => write!(f, "{kind:?}"),
            Cause::External(msg) => write!(f, "{msg}"),
        }
    }
}

/// Parser error type accumulating context as it propagates up through `nom` combinators
///
/// Shaped like [`nom::error::VerboseError`] (a stack of `(remaining-input, cause)` pairs, deepest
/// first) but augmented with [`Error::calculate_position`] and a human-readable [`Display`] so
/// [`crate::error::ParseError`] can be built directly from it, without needing the original input
/// a second time the way [`nom::error::convert_error`] does.
#[derive(Debug)]
pub(crate) struct Error<I> {
    errors: Vec<(I, Cause)>,
}

impl<I> Error<I> {
    /// Compute the 1-indexed character position of the deepest recorded cause within `input`
    pub(crate) fn calculate_position(&self, input: I) -> usize
    where
        I: std::ops::Deref<Target = str>,
    {
        match self.errors.first() {
            Some((remaining, _)) => {
                let consumed = input.len().saturating_sub(remaining.len());
                input[..consumed].chars().count() + 1
            }
            None => 1,
        }
    }
}

impl<I> fmt::Display for Error<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.errors.iter();
        match iter.next() {
            Some((_, cause)) => write!(f, "{cause}")?,
            None => write!(f, "invalid JSONPath query")?,
        }
        for (_, cause) in iter {
            if let Cause::Context(ctx) = cause {
                write!(f, ", in {ctx}")?;
            }
        }
        Ok(())
    }
}

impl<I> NomParseError<I> for Error<I> {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        Self {
            errors: vec![(input, Cause::Nom(kind))],
        }
    }

    fn append(input: I, kind: ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, Cause::Nom(kind)));
        other
    }

    fn from_char(input: I, c: char) -> Self {
        Self {
            errors: vec![(input, Cause::Char(c))],
        }
    }
}

impl<I> ContextError<I> for Error<I> {
    fn add_context(input: I, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, Cause::Context(ctx)));
        other
    }
}

impl<I, E: fmt::Display> FromExternalError<I, E> for Error<I> {
    fn from_external_error(input: I, _kind: ErrorKind, e: E) -> Self {
        Self {
            errors: vec![(input, Cause::External(e.to_string()))],
        }
    }
}

pub(crate) type PResult<'a, O> = IResult<&'a str, O, Error<&'a str>>;

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
fn parse_query_segments(opts: ParserOptions<'_>, input: &str) -> PResult<'_, Vec<QuerySegment>> {
    many0(|i| parse_segment(opts, i))(input)
}

/// Parse a `$`-rooted query
fn parse_root_query(opts: ParserOptions<'_>, input: &str) -> PResult<'_, Query> {
    map(preceded(char('$'), |i| parse_query_segments(opts, i)), |segments| Query {
        kind: QueryKind::Root,
        segments,
    })(input)
}

/// Parse a `^`-rooted pseudo-root query (non-standard extension)
fn parse_pseudo_root_query(opts: ParserOptions<'_>, input: &str) -> PResult<'_, Query> {
    map(preceded(char('^'), |i| parse_query_segments(opts, i)), |segments| Query {
        kind: QueryKind::PseudoRoot,
        segments,
    })(input)
}

/// Parse a `@`-rooted current-node query, used inside filter expressions
fn parse_current_query(opts: ParserOptions<'_>, input: &str) -> PResult<'_, Query> {
    map(preceded(char('@'), |i| parse_query_segments(opts, i)), |segments| Query {
        kind: QueryKind::Current,
        segments,
    })(input)
}

/// Parse a `_`-rooted extra-context query (non-standard extension), used inside filter expressions
fn parse_extra_query(opts: ParserOptions<'_>, input: &str) -> PResult<'_, Query> {
    map(preceded(char('_'), |i| parse_query_segments(opts, i)), |segments| Query {
        kind: QueryKind::Extra,
        segments,
    })(input)
}

/// Parse any query form legal inside a filter expression: `$`, `@`, `^`, or `_` (the latter two
/// only in non-strict mode)
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_query(opts: ParserOptions<'_>, input: &str) -> PResult<'_, Query> {
    if opts.strict {
        alt((
            |i| parse_root_query(opts, i),
            |i| parse_current_query(opts, i),
        ))(input)
    } else {
        alt((
            |i| parse_root_query(opts, i),
            |i| parse_current_query(opts, i),
            |i| parse_pseudo_root_query(opts, i),
            |i| parse_extra_query(opts, i),
        ))(input)
    }
}

/// Parse a top-level query: `$`-rooted in strict mode, or optionally `^`-rooted, with an optional
/// leading identifier and bare leading dot tolerated in non-strict mode
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_query_main(opts: ParserOptions<'_>, input: &str) -> PResult<'_, Query> {
    if opts.strict {
        all_consuming(|i| parse_root_query(opts, i))(input)
    } else {
        all_consuming(alt((
            |i| parse_root_query(opts, i),
            |i| parse_pseudo_root_query(opts, i),
            // a bare leading dot, or no leading identifier at all, is implicitly root-relative
            map(preceded(opt(char('.')), |i| parse_query_segments(opts, i)), |segments| Query {
                kind: QueryKind::Root,
                segments,
            }),
        )))(input)
    }
}

fn parse_compound_op(input: &str) -> PResult<'_, CompoundOp> {
    alt((
        map(char('|'), |_| CompoundOp::Union),
        map(char('&'), |_| CompoundOp::Intersection),
    ))(input)
}

/// Parse a top-level compound query: a `$`-rooted query, optionally followed by `|`/`&`-joined
/// further queries, non-standard
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_compound_query_main<'a>(
    opts: ParserOptions<'a>,
    input: &'a str,
) -> PResult<'a, CompoundQuery> {
    map(
        all_consuming(pair(
            |i| parse_root_query(opts, i),
            many0(tuple((
                multispace0,
                parse_compound_op,
                multispace0,
                |i| parse_root_query(opts, i),
            ))),
        )),
        |(head, rest)| {
            CompoundQuery::new(
                JsonPath::from_parts(head, opts.strict),
                rest.into_iter()
                    .map(|(_, op, _, q)| (op, JsonPath::from_parts(q, opts.strict)))
                    .collect(),
            )
        },
    )(input)
}

#[cfg(test)]
mod tests {
    use crate::spec::functions::default_registry;
    use crate::spec::query::QueryKind;
    use crate::spec::segment::Segment;
    use crate::spec::selector::{name::Name, Selector};

    use super::{parse_query, parse_query_main, ParserOptions};

    fn opts(strict: bool) -> ParserOptions<'static> {
        ParserOptions {
            strict,
            functions: default_registry(),
        }
    }

    #[test]
    fn root_query() {
        {
            let (_, p) = parse_query(opts(true), "$").unwrap();
            assert!(matches!(p.kind, QueryKind::Root));
        }
        {
            let (_, p) = parse_query(opts(true), "$.name").unwrap();
            assert_eq!(p.segments[0].segment.as_dot_name().unwrap(), "name");
        }
        {
            let (_, p) = parse_query(opts(true), "$.names['first_name']..*").unwrap();
            assert_eq!(p.segments[0].segment.as_dot_name().unwrap(), "names");
            let clh = p.segments[1].segment.as_long_hand().unwrap();
            assert!(matches!(&clh[0], Selector::Name(Name(s)) if s == "first_name"));
            assert!(matches!(p.segments[2].segment, Segment::Wildcard));
        }
    }

    #[test]
    fn current_query() {
        let (_, p) = parse_query(opts(true), "@").unwrap();
        assert!(matches!(p.kind, QueryKind::Current));
    }

    #[test]
    fn pseudo_root_and_extra_are_non_strict_only() {
        assert!(parse_query(opts(true), "^").is_err());
        assert!(parse_query(opts(true), "_").is_err());
        assert!(matches!(parse_query(opts(false), "^").unwrap().1.kind, QueryKind::PseudoRoot));
        assert!(matches!(parse_query(opts(false), "_").unwrap().1.kind, QueryKind::Extra));
    }

    #[test]
    fn no_tail() {
        assert!(parse_query_main(opts(true), "$.a['b']tail").is_err());
    }

    #[test]
    fn bare_leading_dot_non_strict() {
        let (_, p) = parse_query_main(opts(false), ".name").unwrap();
        assert_eq!(p.segments[0].segment.as_dot_name().unwrap(), "name");
        assert!(parse_query_main(opts(true), ".name").is_err());
    }
}
