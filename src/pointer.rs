//! RFC 6901 JSON Pointer parsing, resolution, and manipulation, plus this crate's non-standard
//! Relative JSON Pointer extension
//!
//! Grounded on the `Token`/`Pointer` shape of `estuary-flow`'s `crates/json/src/ptr.rs` (a
//! reference file in the example pack), adapted to reuse [`NormalizedPath`]'s RFC 6901 escaping
//! and to report failures through a [`PointerError`] rather than `Option`.
use std::fmt::Display;
use std::str::FromStr;

use serde::{de::Visitor, Deserialize, Serialize};
use serde_json::Value;

use crate::path::{NormalizedPath, PathElement};

fn escape(raw: &str) -> String {
    raw.replace('~', "~0").replace('/', "~1")
}

fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// A single reference token within a [`Pointer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerToken {
    /// An object member name
    Name(String),
    /// A non-negative array index
    Index(usize),
    /// `-`, the position one past the end of an array, per RFC 6901 §4
    Dash,
    /// A non-standard `#name`/`#N` marker, denoting that this location names a key or index
    /// itself rather than the value found there
    Marker(MarkerToken),
}

/// The target of a [`PointerToken::Marker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerToken {
    /// `#name`
    Name(String),
    /// `#N`
    Index(usize),
}

impl PointerToken {
    fn parse(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix('#') {
            return match rest.parse::<usize>() {
                Ok(i) if is_canonical_index(rest) => PointerToken::Marker(MarkerToken::Index(i)),
                _ => PointerToken::Marker(MarkerToken::Name(rest.to_owned())),
            };
        }
        if raw == "-" {
            return PointerToken::Dash;
        }
        match raw.parse::<usize>() {
            Ok(i) if is_canonical_index(raw) => PointerToken::Index(i),
            _ => PointerToken::Name(raw.to_owned()),
        }
    }
}

/// `0` is canonical; `01`, `+1`, `-1` are not valid array index tokens per RFC 6901, and are
/// treated as plain object member names instead (matching the `estuary-flow` reference's
/// `Token::from_str`, which special-cases leading zeroes and `+` the same way).
fn is_canonical_index(raw: &str) -> bool {
    raw == "0" || (raw.starts_with(|c: char| c.is_ascii_digit()) && !raw.starts_with('0'))
}

impl Display for PointerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointerToken::Name(s) => write!(f, "{}", escape(s)),
            PointerToken::Index(i) => write!(f, "{i}"),
            PointerToken::Dash => write!(f, "-"),
            PointerToken::Marker(MarkerToken::Name(s)) => write!(f, "#{}", escape(s)),
            PointerToken::Marker(MarkerToken::Index(i)) => write!(f, "#{i}"),
        }
    }
}

/// A parsed RFC 6901 JSON Pointer, with this crate's non-standard `#name`/`#N` marker segments
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Pointer(Vec<PointerToken>);

impl Pointer {
    /// The pointer referencing the document root, i.e. the empty string
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a JSON Pointer string
    ///
    /// An empty string resolves to the root; any other string that doesn't begin with `/` is a
    /// parse error.
    pub fn parse(s: &str) -> Result<Self, PointerError> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        if !s.starts_with('/') {
            return Err(PointerError::Parse(s.to_owned()));
        }
        let tokens = s
            .split('/')
            .skip(1)
            .map(|raw| PointerToken::parse(&unescape(raw)))
            .collect();
        Ok(Self(tokens))
    }

    /// Whether this pointer references the document root
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of reference tokens in the pointer
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the pointer has no reference tokens (equivalent to [`Pointer::is_root`])
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a single reference token, in place
    pub fn push(&mut self, token: PointerToken) -> &mut Self {
        self.0.push(token);
        self
    }

    /// The parent of this pointer, i.e. with the last reference token dropped
    ///
    /// Returns `None` if this pointer is already the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Split off the last reference token, returning the parent pointer and that token
    pub fn split_last(&self) -> Option<(Self, &PointerToken)> {
        let (last, init) = self.0.split_last()?;
        Some((Self(init.to_vec()), last))
    }

    /// Concatenate `other` onto this pointer
    ///
    /// If `other` begins with `/` (i.e. is itself an absolute pointer string), the join resets
    /// to that absolute pointer rather than appending a relative suffix; otherwise `other` is
    /// treated as a single raw (unescaped) reference token to append.
    pub fn join(&self, other: &str) -> Result<Self, PointerError> {
        if other.starts_with('/') || other.is_empty() {
            return Pointer::parse(other);
        }
        let mut joined = self.clone();
        joined.push(PointerToken::parse(other));
        Ok(joined)
    }

    /// Whether `self` is `other`, or a location nested within `other`
    pub fn is_relative_to(&self, other: &Pointer) -> bool {
        self.0.len() >= other.0.len() && self.0[..other.0.len()] == other.0[..]
    }

    /// Iterate over the pointer's reference tokens
    pub fn iter(&self) -> std::slice::Iter<'_, PointerToken> {
        self.0.iter()
    }

    /// Resolve this pointer against `doc`, returning the referenced value
    pub fn resolve<'v>(&self, doc: &'v Value) -> Result<&'v Value, PointerError> {
        let mut current = doc;
        for token in &self.0 {
            current = step(current, token)?;
        }
        Ok(current)
    }

    /// Resolve this pointer against `doc`, returning a mutable reference to the referenced value
    pub fn resolve_mut<'v>(&self, doc: &'v mut Value) -> Result<&'v mut Value, PointerError> {
        let mut current = doc;
        for token in &self.0 {
            current = step_mut(current, token)?;
        }
        Ok(current)
    }

    /// Whether this pointer resolves to a value in `doc`
    ///
    /// Returns `true` even if the resolved value is `false`, `null`, or `0` — existence is about
    /// the location, not the value's truthiness.
    pub fn exists(&self, doc: &Value) -> bool {
        self.resolve(doc).is_ok()
    }
}

fn token_name(token: &PointerToken) -> Option<&str> {
    match token {
        PointerToken::Name(s) => Some(s),
        PointerToken::Marker(MarkerToken::Name(s)) => Some(s),
        _ => None,
    }
}

fn token_index(token: &PointerToken) -> Option<usize> {
    match token {
        PointerToken::Index(i) => Some(*i),
        PointerToken::Marker(MarkerToken::Index(i)) => Some(*i),
        _ => None,
    }
}

fn step<'v>(current: &'v Value, token: &PointerToken) -> Result<&'v Value, PointerError> {
    match current {
        Value::Object(map) => {
            let name = token_name(token).ok_or_else(|| PointerError::TypeError("object"))?;
            map.get(name).ok_or_else(|| PointerError::KeyError(name.to_owned()))
        }
        Value::Array(arr) => {
            let index = token_index(token).ok_or_else(|| PointerError::TypeError("array"))?;
            arr.get(index).ok_or(PointerError::IndexError(index, arr.len()))
        }
        other => Err(PointerError::TypeError(type_name(other))),
    }
}

fn step_mut<'v>(current: &'v mut Value, token: &PointerToken) -> Result<&'v mut Value, PointerError> {
    match current {
        Value::Object(map) => {
            let name = token_name(token).ok_or_else(|| PointerError::TypeError("object"))?;
            map.get_mut(name).ok_or_else(|| PointerError::KeyError(name.to_owned()))
        }
        Value::Array(arr) => {
            let len = arr.len();
            let index = token_index(token).ok_or(PointerError::TypeError("array"))?;
            arr.get_mut(index).ok_or(PointerError::IndexError(index, len))
        }
        other => Err(PointerError::TypeError(type_name(other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<'a> From<&NormalizedPath<'a>> for Pointer {
    fn from(path: &NormalizedPath<'a>) -> Self {
        Self(
            path.iter()
                .map(|elem| match elem {
                    PathElement::Name(s) => PointerToken::Name((*s).to_owned()),
                    PathElement::Key(s) => PointerToken::Marker(MarkerToken::Name((*s).to_owned())),
                    PathElement::Index(i) => PointerToken::Index(*i),
                })
                .collect(),
        )
    }
}

impl FromStr for Pointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pointer::parse(s)
    }
}

impl Display for Pointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for token in &self.0 {
            write!(f, "/{token}")?;
        }
        Ok(())
    }
}

impl Serialize for Pointer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pointer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct PointerVisitor;

        impl<'de> Visitor<'de> for PointerVisitor {
            type Value = Pointer;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "a JSON Pointer string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Pointer::parse(v).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(PointerVisitor)
    }
}

/// An error produced while parsing or resolving a [`Pointer`]
#[derive(Debug, thiserror::Error)]
pub enum PointerError {
    /// The pointer string was non-empty but didn't begin with `/`
    #[error("invalid JSON pointer: {0:?} must be empty or start with '/'")]
    Parse(String),
    /// An object member referenced by the pointer does not exist
    #[error("no member named {0:?}")]
    KeyError(String),
    /// An array index referenced by the pointer is out of bounds
    #[error("index {0} out of bounds for array of length {1}")]
    IndexError(usize, usize),
    /// The pointer attempted to index into a scalar value
    #[error("cannot index into a {0}")]
    TypeError(&'static str),
}

/// The terminal part of a [`RelativePointer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelativeTerminator {
    /// No `#` or `/rest` suffix: the resolved location itself
    Path(Pointer),
    /// `#`: the key or index of the resolved location, rather than its value
    KeyOrIndex,
}

/// A parsed Relative JSON Pointer (`N[+M|-M](#|/rest)`)
///
/// Resolved against a base [`Pointer`] with [`RelativePointer::to`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativePointer {
    up_levels: usize,
    offset: Option<isize>,
    terminator: RelativeTerminator,
}

impl RelativePointer {
    /// Parse a Relative JSON Pointer string
    pub fn parse(s: &str) -> Result<Self, RelativePointerError> {
        let digits_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        if digits_end == 0 {
            return Err(RelativePointerError::Syntax(s.to_owned()));
        }
        let up_levels: usize = s[..digits_end]
            .parse()
            .map_err(|_| RelativePointerError::Syntax(s.to_owned()))?;
        let rest = &s[digits_end..];

        let (offset, rest) = if rest.starts_with('+') || rest.starts_with('-') {
            let offset_end = rest[1..]
                .find(|c: char| !c.is_ascii_digit())
                .map(|i| i + 1)
                .unwrap_or(rest.len());
            if offset_end == 1 {
                return Err(RelativePointerError::Syntax(s.to_owned()));
            }
            let offset: isize = rest[..offset_end]
                .parse()
                .map_err(|_| RelativePointerError::Syntax(s.to_owned()))?;
            (Some(offset), &rest[offset_end..])
        } else {
            (None, rest)
        };

        let terminator = if rest.is_empty() {
            RelativeTerminator::Path(Pointer::root())
        } else if rest == "#" {
            RelativeTerminator::KeyOrIndex
        } else if rest.starts_with('/') {
            RelativeTerminator::Path(Pointer::parse(rest).map_err(|_| RelativePointerError::Syntax(s.to_owned()))?)
        } else {
            return Err(RelativePointerError::Syntax(s.to_owned()));
        };

        Ok(Self {
            up_levels,
            offset,
            terminator,
        })
    }

    /// Resolve this relative pointer against `base`
    ///
    /// Walks up `up_levels` reference tokens from `base`; if an offset was specified, the
    /// resulting location's last token must be an array index, which the offset is added to;
    /// finally the terminator either appends a subpointer or rewrites the last token into a
    /// `#name`/`#N` marker.
    pub fn to(&self, base: &Pointer) -> Result<Pointer, RelativePointerError> {
        if self.up_levels > base.len() {
            return Err(RelativePointerError::IndexError(self.up_levels));
        }
        let mut tokens = base.0[..base.len() - self.up_levels].to_vec();

        if let Some(offset) = self.offset {
            match tokens.last() {
                Some(PointerToken::Index(i)) => {
                    let new_index = *i as isize + offset;
                    if new_index < 0 {
                        return Err(RelativePointerError::IndexError(self.up_levels));
                    }
                    *tokens.last_mut().unwrap() = PointerToken::Index(new_index as usize);
                }
                _ => return Err(RelativePointerError::Syntax("offset requires an array index origin".to_owned())),
            }
        }

        match &self.terminator {
            RelativeTerminator::Path(sub) => {
                tokens.extend(sub.0.iter().cloned());
                Ok(Pointer(tokens))
            }
            RelativeTerminator::KeyOrIndex => {
                let last = tokens.pop().ok_or(RelativePointerError::IndexError(self.up_levels))?;
                let marker = match last {
                    PointerToken::Name(s) => MarkerToken::Name(s),
                    PointerToken::Index(i) => MarkerToken::Index(i),
                    PointerToken::Dash | PointerToken::Marker(_) => {
                        return Err(RelativePointerError::Syntax("'#' requires a concrete key or index".to_owned()))
                    }
                };
                tokens.push(PointerToken::Marker(marker));
                Ok(Pointer(tokens))
            }
        }
    }
}

/// An error produced while parsing or resolving a [`RelativePointer`]
#[derive(Debug, thiserror::Error)]
pub enum RelativePointerError {
    /// The relative pointer string did not match the `N[+M|-M](#|/rest)` grammar
    #[error("invalid relative JSON pointer syntax: {0:?}")]
    Syntax(String),
    /// `up_levels` exceeded the depth of the base pointer, or an offset produced a negative index
    #[error("relative pointer arithmetic went out of bounds ({0} levels)")]
    IndexError(usize),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{MarkerToken, Pointer, PointerToken, RelativePointer};

    #[test]
    fn parses_rfc6901_examples() {
        let ptr = Pointer::parse("/foo/0/bar").unwrap();
        assert_eq!(
            ptr.iter().cloned().collect::<Vec<_>>(),
            vec![
                PointerToken::Name("foo".to_owned()),
                PointerToken::Index(0),
                PointerToken::Name("bar".to_owned()),
            ]
        );
    }

    #[test]
    fn root_pointer_is_empty_string() {
        assert_eq!(Pointer::parse("").unwrap(), Pointer::root());
        assert!(Pointer::parse("no-leading-slash").is_err());
    }

    #[test]
    fn escapes_tilde_and_slash() {
        let ptr = Pointer::parse("/a~1b/c~0d").unwrap();
        assert_eq!(
            ptr.iter().cloned().collect::<Vec<_>>(),
            vec![PointerToken::Name("a/b".to_owned()), PointerToken::Name("c~d".to_owned())]
        );
        assert_eq!(ptr.to_string(), "/a~1b/c~0d");
    }

    #[test]
    fn resolves_against_document() {
        let doc = json!({"foo": ["bar", "baz"], "": 0, "a/b": 1, "m~n": 8});
        assert_eq!(Pointer::root().resolve(&doc).unwrap(), &doc);
        assert_eq!(Pointer::parse("/foo/1").unwrap().resolve(&doc).unwrap(), "baz");
        assert_eq!(Pointer::parse("/a~1b").unwrap().resolve(&doc).unwrap(), &json!(1));
        assert_eq!(Pointer::parse("/m~0n").unwrap().resolve(&doc).unwrap(), &json!(8));
        assert!(Pointer::parse("/foo/2").unwrap().resolve(&doc).is_err());
        assert!(Pointer::parse("/foo/bar").unwrap().resolve(&doc).is_err());
    }

    #[test]
    fn exists_is_true_for_falsy_values() {
        let doc = json!({"a": false, "b": null, "c": 0});
        assert!(Pointer::parse("/a").unwrap().exists(&doc));
        assert!(Pointer::parse("/b").unwrap().exists(&doc));
        assert!(Pointer::parse("/c").unwrap().exists(&doc));
        assert!(!Pointer::parse("/d").unwrap().exists(&doc));
    }

    #[test]
    fn parent_and_join() {
        let ptr = Pointer::parse("/foo/bar").unwrap();
        assert_eq!(ptr.parent().unwrap(), Pointer::parse("/foo").unwrap());
        assert_eq!(Pointer::root().parent(), None);
        assert_eq!(ptr.join("baz").unwrap(), Pointer::parse("/foo/bar/baz").unwrap());
        assert_eq!(ptr.join("/reset").unwrap(), Pointer::parse("/reset").unwrap());
    }

    #[test]
    fn is_relative_to_is_a_prefix_test() {
        let parent = Pointer::parse("/foo").unwrap();
        let child = Pointer::parse("/foo/bar").unwrap();
        assert!(child.is_relative_to(&parent));
        assert!(!parent.is_relative_to(&child));
    }

    #[test]
    fn relative_pointer_identity_and_parent() {
        let base = Pointer::parse("/foo/bar/2").unwrap();
        assert_eq!(RelativePointer::parse("0").unwrap().to(&base).unwrap(), base);
        assert_eq!(
            RelativePointer::parse("1").unwrap().to(&base).unwrap(),
            Pointer::parse("/foo/bar").unwrap()
        );
        assert_eq!(
            RelativePointer::parse("2/baz").unwrap().to(&base).unwrap(),
            Pointer::parse("/foo/baz").unwrap()
        );
    }

    #[test]
    fn relative_pointer_offset_and_marker() {
        let base = Pointer::parse("/foo/2").unwrap();
        assert_eq!(
            RelativePointer::parse("0+1").unwrap().to(&base).unwrap(),
            Pointer::parse("/foo/3").unwrap()
        );
        let with_marker = RelativePointer::parse("0#").unwrap().to(&base).unwrap();
        assert_eq!(with_marker.iter().last(), Some(&PointerToken::Marker(MarkerToken::Index(2))));
    }

    #[test]
    fn relative_pointer_rejects_out_of_bounds_levels() {
        let base = Pointer::parse("/foo").unwrap();
        assert!(RelativePointer::parse("5").unwrap().to(&base).is_err());
    }
}
