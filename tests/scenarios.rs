use serde_json::json;

use jsonpath_engine::patch::{Patch, PatchOperation};
use jsonpath_engine::pointer::Pointer;
use jsonpath_engine::Environment;
use jsonpath_engine::JsonPath;

#[test]
fn filter_selects_users_under_a_score_threshold() {
    let value = json!({
        "users": [
            {"name": "Sue", "score": 100},
            {"name": "John", "score": 86},
            {"name": "Sally", "score": 84},
            {"name": "Jane", "score": 55}
        ]
    });
    let path = JsonPath::parse("$.users[?@.score < 100].name").unwrap();
    let nodes = path.query(&value).all();
    assert_eq!(nodes, vec![&json!("John"), &json!("Sally"), &json!("Jane")]);
}

#[test]
fn wildcard_over_users_preserves_array_order_and_locations() {
    let value = json!({
        "users": [
            {"name": "Sue", "score": 100},
            {"name": "John", "score": 86},
            {"name": "Sally", "score": 84},
            {"name": "Jane", "score": 55}
        ]
    });
    let path = JsonPath::parse("$.users.*.name").unwrap();
    let located = path.query_located(&value);
    let nodes: Vec<&serde_json::Value> = located.nodes().collect();
    assert_eq!(nodes, vec![&json!("Sue"), &json!("John"), &json!("Sally"), &json!("Jane")]);
    let locations: Vec<String> = located.locations().map(|l| l.to_string()).collect();
    assert_eq!(
        locations,
        vec![
            "$['users'][0]['name']",
            "$['users'][1]['name']",
            "$['users'][2]['name']",
            "$['users'][3]['name']"
        ]
    );
}

#[test]
fn bracketed_name_used_as_an_index_into_a_sibling_array() {
    let value = json!({
        "a": {"j": [1, 2, 3], "p": {"q": [4, 5, 6]}},
        "b": ["j", "p", "q"],
        "c d": {"x": {"y": 1}}
    });
    let path = JsonPath::parse("$.a.j[$['c d'].x.y]").unwrap();
    let located = path.query_located(&value).exactly_one().unwrap();
    assert_eq!(located.node(), &json!(2));
    assert_eq!(located.location().to_string(), "$['a']['j'][1]");
}

#[test]
fn descendant_filter_against_root_bound_value() {
    let value = json!({
        "price_cap": 10,
        "products": [
            {"n": "apple", "price": 5},
            {"n": "orange", "price": 12},
            {"n": "banana", "price": 8}
        ]
    });
    let path = JsonPath::parse("$..products[?(@.price < $.price_cap)]").unwrap();
    let nodes = path.query(&value).all();
    assert_eq!(nodes, vec![&json!({"n": "apple", "price": 5}), &json!({"n": "banana", "price": 8})]);
}

#[test]
fn patch_sequence_adds_copies_and_appends() {
    let mut doc = json!({"some": {"other": "thing"}});
    let patch = Patch(vec![
        PatchOperation::Add {
            path: Pointer::parse("/some/foo").unwrap(),
            value: json!({"bar": []}),
        },
        PatchOperation::Copy {
            from: Pointer::parse("/some/other").unwrap(),
            path: Pointer::parse("/some/foo/else").unwrap(),
        },
        PatchOperation::Add {
            path: Pointer::parse("/some/foo/bar/-").unwrap(),
            value: json!(1),
        },
    ]);
    patch.apply(&mut doc).unwrap();
    assert_eq!(
        doc,
        json!({"some": {"other": "thing", "foo": {"bar": [1], "else": "thing"}}})
    );
}

#[test]
fn compound_filter_combines_regex_match_on_current_key_with_length() {
    let value = json!({"abc": [1, 2, 3], "def": [4, 5], "abx": [6], "aby": []});
    let env = Environment::new();
    let located = env
        .finditer("$[?match(#, '^ab.*') && length(@) > 0]", &value)
        .unwrap();
    let mut locations: Vec<String> = located.iter().map(|n| n.location().to_string()).collect();
    locations.sort();
    assert_eq!(locations, vec!["$['abc']", "$['abx']"]);
    let mut nodes: Vec<&serde_json::Value> = located.nodes().collect();
    nodes.sort_by_key(|v| v.to_string());
    assert_eq!(nodes, vec![&json!([1, 2, 3]), &json!([6])]);
}
