//! Parsers producing [`crate::spec::segment::QuerySegment`]
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{alpha1, char, digit1, space0};
use nom::combinator::{cut, map, recognize};
use nom::error::context;
use nom::multi::fold_many0;
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::{branch::alt, multi::separated_list1};

use crate::spec::segment::{QuerySegment, QuerySegmentKind, Segment};
use crate::spec::selector::Selector;

use super::selector::filter::parse_keys_filter;
use super::selector::{parse_selector, parse_wildcard_selector};
use super::{PResult, ParserOptions};

// TODO - I have no idea if this is correct, supposed to be %x80-10FFFF
fn is_non_ascii_unicode(chr: char) -> bool {
    chr >= '\u{0080}'
}

fn parse_non_ascii_unicode(input: &str) -> PResult<&str> {
    take_while1(is_non_ascii_unicode)(input)
}

fn parse_name_first(input: &str) -> PResult<&str> {
    alt((alpha1, recognize(char('_')), parse_non_ascii_unicode))(input)
}

fn parse_name_char(input: &str) -> PResult<&str> {
    alt((digit1, parse_name_first))(input)
}

pub(crate) fn parse_dot_member_name(input: &str) -> PResult<String> {
    map(
        recognize(pair(
            parse_name_first,
            fold_many0(parse_name_char, String::new, |mut s, item| {
                s.push_str(item);
                s
            }),
        )),
        |s| s.to_string(),
    )(input)
}

fn parse_dot_member_name_shorthand(input: &str) -> PResult<Segment> {
    map(preceded(char('.'), parse_dot_member_name), Segment::DotName)(input)
}

fn parse_dot_wildcard_shorthand(input: &str) -> PResult<Segment> {
    map(preceded(char('.'), parse_wildcard_selector), |_| Segment::Wildcard)(input)
}

/// The dot-prefixed keys selector, `.~`, non-standard
fn parse_dot_keys_shorthand(input: &str) -> PResult<Segment> {
    map(preceded(char('.'), char('~')), |_| {
        Segment::LongHand(vec![Selector::Keys])
    })(input)
}

/// The dot-prefixed single-key selector, `.~name`, non-standard
fn parse_dot_key_shorthand(input: &str) -> PResult<Segment> {
    map(preceded(pair(char('.'), char('~')), parse_dot_member_name), |name| {
        Segment::LongHand(vec![Selector::Key(name)])
    })(input)
}

/// The dot-prefixed keys-filter selector, `.~?expr`, non-standard
fn parse_dot_keys_filter_shorthand<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, Segment> {
    map(
        preceded(pair(char('.'), char('~')), |i| parse_keys_filter(opts, i)),
        |filter| Segment::LongHand(vec![Selector::KeysFilter(filter)]),
    )(input)
}

fn parse_multi_selector<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, Vec<Selector>> {
    separated_list1(delimited(space0, char(','), space0), |i| parse_selector(opts, i))(input)
}

fn parse_child_long_hand<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, Segment> {
    context(
        "child long-hand segment",
        preceded(
            pair(char('['), space0),
            cut(terminated(
                map(|i| parse_multi_selector(opts, i), Segment::LongHand),
                pair(space0, char(']')),
            )),
        ),
    )(input)
}

fn parse_child_segment<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, Segment> {
    if opts.strict {
        alt((
            parse_dot_wildcard_shorthand,
            parse_dot_member_name_shorthand,
            |i| parse_child_long_hand(opts, i),
        ))(input)
    } else {
        alt((
            parse_dot_wildcard_shorthand,
            |i| parse_dot_keys_filter_shorthand(opts, i),
            parse_dot_keys_shorthand,
            parse_dot_key_shorthand,
            parse_dot_member_name_shorthand,
            |i| parse_child_long_hand(opts, i),
        ))(input)
    }
}

fn parse_descendant_segment<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, Segment> {
    preceded(
        tag(".."),
        alt((
            map(parse_wildcard_selector, |_| Segment::Wildcard),
            map(parse_dot_member_name, Segment::DotName),
            |i| parse_child_segment(opts, i),
        )),
    )(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_segment<'a>(opts: ParserOptions<'a>, input: &'a str) -> PResult<'a, QuerySegment> {
    alt((
        map(|i| parse_descendant_segment(opts, i), |inner| QuerySegment {
            kind: QuerySegmentKind::Descendant,
            segment: inner,
        }),
        map(|i| parse_child_segment(opts, i), |inner| QuerySegment {
            kind: QuerySegmentKind::Child,
            segment: inner,
        }),
    ))(input)
}

#[cfg(test)]
mod tests {
    use nom::{combinator::all_consuming, error::convert_error};

    use crate::spec::{
        functions::default_registry,
        selector::{index::Index, name::Name, slice::Slice, Selector},
    };

    use super::{
        parse_child_long_hand, parse_child_segment, parse_descendant_segment,
        parse_dot_member_name_shorthand, ParserOptions, Segment,
    };

    fn opts(strict: bool) -> ParserOptions<'static> {
        ParserOptions {
            strict,
            functions: default_registry(),
        }
    }

    #[test]
    fn dot_member_names() {
        assert!(matches!(
            parse_dot_member_name_shorthand(".name"),
            Ok(("", Segment::DotName(s))) if s == "name",
        ));
        assert!(matches!(
            parse_dot_member_name_shorthand(".foo_bar"),
            Ok(("", Segment::DotName(s))) if s == "foo_bar",
        ));
        assert!(parse_dot_member_name_shorthand(". space").is_err());
        assert!(all_consuming(parse_dot_member_name_shorthand)(".no-dash").is_err());
        assert!(parse_dot_member_name_shorthand(".1no_num_1st").is_err());
    }

    #[test]
    fn child_long_hand() {
        {
            let (_, sk) = parse_child_long_hand(opts(true), r#"["name"]"#).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Name(Name::from("name")));
        }
        {
            let (_, sk) = parse_child_long_hand(opts(true), r#"['name']"#).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Name(Name::from("name")));
        }
        {
            let (_, sk) = parse_child_long_hand(opts(true), r#"["name","test"]"#).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Name(Name::from("name")));
            assert_eq!(s[1], Selector::Name(Name::from("test")));
        }
        {
            let (_, sk) = parse_child_long_hand(opts(true), r#"['name',10,0:3]"#).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Name(Name::from("name")));
            assert_eq!(s[1], Selector::Index(Index(10)));
            assert_eq!(s[2], Selector::ArraySlice(Slice::new().with_start(0).with_end(3)));
        }
        {
            let (_, sk) = parse_child_long_hand(opts(true), r#"[::,*]"#).unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::ArraySlice(Slice::new()));
            assert_eq!(s[1], Selector::Wildcard);
        }
        {
            let i = "[010]";
            let err = parse_child_long_hand(opts(true), i).unwrap_err();
            match err {
                nom::Err::Error(e) | nom::Err::Failure(e) => println!("{e:?}"),
                _ => panic!("wrong error kind: {err:?}"),
            }
        }
    }

    #[test]
    fn child_segment() {
        {
            let (_, sk) = parse_child_segment(opts(true), ".name").unwrap();
            assert_eq!(sk.as_dot_name(), Some("name"));
        }
        {
            let (_, sk) = parse_child_segment(opts(true), ".*").unwrap();
            assert!(matches!(sk, Segment::Wildcard));
        }
        {
            let (_, sk) = parse_child_segment(opts(true), "[*]").unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Wildcard);
        }
    }

    #[test]
    fn descendant_segment() {
        {
            let (_, sk) = parse_descendant_segment(opts(true), "..['name']").unwrap();
            let s = sk.as_long_hand().unwrap();
            assert_eq!(s[0], Selector::Name(Name::from("name")));
        }
        {
            let (_, sk) = parse_descendant_segment(opts(true), "..name").unwrap();
            assert_eq!(sk.as_dot_name().unwrap(), "name");
        }
        {
            let (_, sk) = parse_descendant_segment(opts(true), "...name").unwrap();
            assert_eq!(sk.as_dot_name().unwrap(), "name");
        }
        {
            let (_, sk) = parse_descendant_segment(opts(true), "..*").unwrap();
            assert!(matches!(sk, Segment::Wildcard));
        }
        {
            let (_, sk) = parse_descendant_segment(opts(true), "...*").unwrap();
            assert!(matches!(sk, Segment::Wildcard));
        }
    }

    #[test]
    fn keys_shorthand_non_strict_only() {
        let (_, sk) = parse_child_segment(opts(false), ".~").unwrap();
        assert!(matches!(sk.as_long_hand().unwrap()[0], Selector::Keys));
        assert!(parse_child_segment(opts(true), ".~").is_err());
    }
}
