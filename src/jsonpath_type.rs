use std::str::FromStr;

use serde::{de::Visitor, Deserialize, Serialize};
use serde_json::Value;

use crate::environment::Environment;
use crate::eval::EvalContext;
use crate::node::{LocatedNodeList, NodeList};
use crate::parser::parse_query_main;
use crate::path::NormalizedPath;
use crate::spec::query::{Query, Queryable};
use crate::spec::functions::default_registry;
use crate::ParseError;

/// A parsed JSON Path query string
///
/// This type represents a valid, parsed JSON Path query string, parsed in strict RFC 9535 mode.
/// Please refer to the [IETF JSONPath specification][jp_spec] for the details on what
/// constitutes a valid JSON Path query. For the crate's non-standard extensions (`~`, `in`/
/// `contains`, `=~`, `#`, `^`, `_`, custom functions), compile queries through
/// [`Environment::compile`] instead.
///
/// # Usage
///
/// A `JsonPath` can be parsed directly from an `&str` using the [`parse`][JsonPath::parse] method:
/// ```rust
/// # use jsonpath_engine::JsonPath;
/// # fn main() {
/// let path = JsonPath::parse("$.foo.*").expect("valid JSON Path");
/// # }
/// ```
/// It can then be used to query [`serde_json::Value`]'s with the [`query`][JsonPath::query] method:
/// ```rust
/// # use serde_json::json;
/// # use jsonpath_engine::JsonPath;
/// # fn main() {
/// # let path = JsonPath::parse("$.foo.*").expect("valid JSON Path");
/// let value = json!({"foo": [1, 2, 3, 4]});
/// let nodes = path.query(&value);
/// assert_eq!(nodes.all(), vec![1, 2, 3, 4]);
/// # }
/// ```
///
/// [jp_spec]: https://www.rfc-editor.org/rfc/rfc9535.html
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct JsonPath {
    query: Query,
    strict: bool,
}

impl JsonPath {
    pub(crate) fn from_parts(query: Query, strict: bool) -> Self {
        Self { query, strict }
    }

    /// Create a [`JsonPath`] by parsing a valid JSON Path query string in strict RFC 9535 mode
    ///
    /// # Example
    /// ```rust
    /// # use jsonpath_engine::JsonPath;
    /// # fn main() {
    /// let path = JsonPath::parse("$.foo[1:10:2].baz").expect("valid JSON Path");
    /// # }
    /// ```
    pub fn parse(path_str: &str) -> Result<Self, ParseError> {
        let opts = crate::parser::ParserOptions {
            strict: true,
            functions: default_registry(),
        };
        let (_, query) = parse_query_main(opts, path_str).map_err(|err| match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => (path_str, e),
            nom::Err::Incomplete(_) => unreachable!("we do not use streaming parsers"),
        })?;
        Ok(Self::from_parts(query, true))
    }

    fn context<'b>(&self, value: &'b Value) -> EvalContext<'b> {
        EvalContext::new(value).with_strict(self.strict)
    }

    /// Query a [`serde_json::Value`] using this [`JsonPath`]
    ///
    /// # Example
    /// ```rust
    /// # use serde_json::json;
    /// # use jsonpath_engine::JsonPath;
    /// # fn main() -> Result<(), jsonpath_engine::ParseError> {
    /// let path = JsonPath::parse("$.foo[::2]")?;
    /// let value = json!({"foo": [1, 2, 3, 4]});
    /// let nodes = path.query(&value);
    /// assert_eq!(nodes.all(), vec![1, 3]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn query<'b>(&self, value: &'b Value) -> NodeList<'b> {
        let ctx = self.context(value);
        self.query.query(value, &ctx).into()
    }

    /// Query a [`serde_json::Value`], producing the location of each matched node alongside
    /// its value
    ///
    /// # Example
    /// ```rust
    /// # use serde_json::json;
    /// # use jsonpath_engine::JsonPath;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let value = json!({"foo": {"bar": 1}});
    /// let path = JsonPath::parse("$..bar")?;
    /// let location = path.query_located(&value).exactly_one()?.location().to_string();
    /// assert_eq!(location, "$['foo']['bar']");
    /// # Ok(())
    /// # }
    /// ```
    pub fn query_located<'b>(&self, value: &'b Value) -> LocatedNodeList<'b> {
        let ctx = self.context(value);
        self.query
            .query_located(value, &ctx, NormalizedPath::default())
            .into()
    }

    /// Query using a custom [`Environment`], rather than the default, strict-mode context
    pub fn query_with<'b>(&self, value: &'b Value, env: &Environment) -> NodeList<'b> {
        let ctx = env.context_for(value);
        self.query.query(value, &ctx).into()
    }

    /// Query for located nodes using a custom [`Environment`]
    pub fn query_located_with<'b>(&self, value: &'b Value, env: &Environment) -> LocatedNodeList<'b> {
        let ctx = env.context_for(value);
        self.query
            .query_located(value, &ctx, NormalizedPath::default())
            .into()
    }

    /// Query using a custom [`Environment`], binding `extra` to the out-of-document
    /// extra-context identifier (default `_`) for use inside filter expressions
    pub fn query_with_extra<'b>(&self, value: &'b Value, env: &Environment, extra: &'b Value) -> NodeList<'b> {
        let ctx = env.context_for_with_extra(value, extra);
        self.query.query(value, &ctx).into()
    }

    /// Query for located nodes using a custom [`Environment`] and an extra-context value, as
    /// [`JsonPath::query_with_extra`]
    pub fn query_located_with_extra<'b>(
        &self,
        value: &'b Value,
        env: &Environment,
        extra: &'b Value,
    ) -> LocatedNodeList<'b> {
        let ctx = env.context_for_with_extra(value, extra);
        self.query
            .query_located(value, &ctx, NormalizedPath::default())
            .into()
    }
}

impl FromStr for JsonPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonPath::parse(s)
    }
}

impl std::fmt::Display for JsonPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{path}", path = self.query)
    }
}

impl Serialize for JsonPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct JsonPathVisitor;

        impl<'de> Visitor<'de> for JsonPathVisitor {
            type Value = JsonPath;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "a string representing a JSON Path query")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                JsonPath::parse(v).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(JsonPathVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{from_value, json, to_value};

    use crate::JsonPath;

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<JsonPath>();
    }

    #[test]
    fn test_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<JsonPath>();
    }

    #[test]
    fn serde_round_trip() {
        let j1 = json!("$.foo['bar'][1:10][?@.baz > 10 && @.foo.bar < 20]");
        let p1 = from_value::<JsonPath>(j1).expect("deserializes");
        let p2 = to_value(&p1)
            .and_then(from_value::<JsonPath>)
            .expect("round trip");
        assert_eq!(p1, p2);
    }

    #[test]
    fn strict_rejects_extensions() {
        assert!(JsonPath::parse("$[?@ in ['a']]").is_err());
    }
}
