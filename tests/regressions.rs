use serde_json::json;
use jsonpath_engine::JsonPath;
#[cfg(feature = "trace")]
use test_log::test;

// A comparison against a literal inside a parenthesized filter expression must not match when
// the compared member is absent or doesn't equal the literal.
#[test]
fn parenthesized_comparison_against_missing_member() {
    let value = json!({"a": 1, "b": 2});
    let path = JsonPath::parse("$[?(@.a == 2)]").expect("parses JSONPath");
    assert!(path.query(&value).is_empty());
}
