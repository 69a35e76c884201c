use serde_json::json;

use jsonpath_engine::patch::{Patch, PatchError};

#[test]
fn rfc6902_appendix_a1_adding_an_object_member() {
    let mut doc = json!({"foo": "bar"});
    let patch: Patch = serde_json::from_value(json!([
        {"op": "add", "path": "/baz", "value": "qux"}
    ]))
    .unwrap();
    patch.apply(&mut doc).unwrap();
    assert_eq!(doc, json!({"baz": "qux", "foo": "bar"}));
}

#[test]
fn rfc6902_appendix_a2_adding_an_array_element() {
    let mut doc = json!({"foo": ["bar", "baz"]});
    let patch: Patch = serde_json::from_value(json!([
        {"op": "add", "path": "/foo/1", "value": "qux"}
    ]))
    .unwrap();
    patch.apply(&mut doc).unwrap();
    assert_eq!(doc, json!({"foo": ["bar", "qux", "baz"]}));
}

#[test]
fn rfc6902_appendix_a3_removing_an_object_member() {
    let mut doc = json!({"baz": "qux", "foo": "bar"});
    let patch: Patch = serde_json::from_value(json!([
        {"op": "remove", "path": "/baz"}
    ]))
    .unwrap();
    patch.apply(&mut doc).unwrap();
    assert_eq!(doc, json!({"foo": "bar"}));
}

#[test]
fn rfc6902_appendix_a6_adding_a_nested_member_object() {
    let mut doc = json!({"foo": "bar"});
    let patch: Patch = serde_json::from_value(json!([
        {"op": "add", "path": "/child", "value": {"grandchild": {}}}
    ]))
    .unwrap();
    patch.apply(&mut doc).unwrap();
    assert_eq!(doc, json!({"foo": "bar", "child": {"grandchild": {}}}));
}

#[test]
fn rfc6902_appendix_a7_adding_an_array_value() {
    let mut doc = json!({"foo": ["bar"]});
    let patch: Patch = serde_json::from_value(json!([
        {"op": "add", "path": "/foo/-", "value": ["abc", "def"]}
    ]))
    .unwrap();
    patch.apply(&mut doc).unwrap();
    assert_eq!(doc, json!({"foo": ["bar", ["abc", "def"]]}));
}

#[test]
fn rfc6902_appendix_a10_adding_a_comment() {
    let mut doc = json!({"foo": "bar"});
    let patch: Patch = serde_json::from_value(json!([
        {"op": "test", "path": "/baz", "value": "qux"}
    ]))
    .unwrap();
    let err = patch.apply(&mut doc).unwrap_err();
    assert!(matches!(err, PatchError::Pointer(_)));
    assert_eq!(doc, json!({"foo": "bar"}));
}

#[test]
fn rfc6902_appendix_a16_adding_an_array_value_at_an_index() {
    let mut doc = json!({"foo": ["bar"]});
    let patch: Patch = serde_json::from_value(json!([
        {"op": "add", "path": "/foo/0", "value": ["abc", "def"]}
    ]))
    .unwrap();
    patch.apply(&mut doc).unwrap();
    assert_eq!(doc, json!({"foo": [["abc", "def"], "bar"]}));
}

#[test]
fn move_then_replace_sequence() {
    let mut doc = json!({"a": {"b": 1}, "c": {}});
    let patch: Patch = serde_json::from_value(json!([
        {"op": "move", "from": "/a/b", "path": "/c/b"},
        {"op": "replace", "path": "/c/b", "value": 2}
    ]))
    .unwrap();
    patch.apply(&mut doc).unwrap();
    assert_eq!(doc, json!({"a": {}, "c": {"b": 2}}));
}
