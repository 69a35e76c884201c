use serde_json::json;

use jsonpath_engine::Environment;

#[test]
fn keys_selector_lists_member_names_as_values() {
    let env = Environment::new();
    let value = json!({"a": 1, "b": 2, "c": 3});
    let mut names: Vec<&serde_json::Value> = env.findall("$[~]", &value).unwrap().all();
    names.sort_by_key(|v| v.to_string());
    assert_eq!(names, vec![&json!("a"), &json!("b"), &json!("c")]);
}

#[test]
fn key_selector_picks_a_single_member_name() {
    let env = Environment::new();
    let value = json!({"a": 1, "b": 2});
    let nodes = env.findall("$[~'a']", &value).unwrap().all();
    assert_eq!(nodes, vec![&json!("a")]);
    let nodes = env.findall("$[~'missing']", &value).unwrap().all();
    assert!(nodes.is_empty());
}

#[test]
fn keys_filter_tests_each_member_name_with_hash_bound_to_the_key() {
    let env = Environment::new();
    let value = json!({"abc": 1, "abx": 2, "def": 3});
    let mut names: Vec<&serde_json::Value> = env
        .findall("$[~?match(#, '^ab.*')]", &value)
        .unwrap()
        .all();
    names.sort_by_key(|v| v.to_string());
    assert_eq!(names, vec![&json!("abc"), &json!("abx")]);
}

#[test]
fn current_key_is_bound_inside_object_member_filters() {
    let env = Environment::new();
    let value = json!({"abc": 1, "abx": 2, "def": 3});
    let located = env.finditer("$[?match(#, '^ab.*')]", &value).unwrap();
    let mut locations: Vec<String> = located.iter().map(|n| n.location().to_string()).collect();
    locations.sort();
    assert_eq!(locations, vec!["$['abc']", "$['abx']"]);
}

#[test]
fn current_key_is_bound_inside_array_index_filters() {
    let env = Environment::new();
    let value = json!([10, 20, 30, 40]);
    let nodes = env.findall("$[?# >= 2]", &value).unwrap().all();
    assert_eq!(nodes, vec![&json!(30), &json!(40)]);
}

#[test]
fn extra_context_is_reachable_only_through_the_environment_api() {
    let env = Environment::new();
    let value = json!({"products": [{"price": 5}, {"price": 12}, {"price": 8}]});
    let cap = json!(10);
    let nodes = env
        .findall_with_extra("$.products[?@.price < _]", &value, &cap)
        .unwrap()
        .all();
    assert_eq!(nodes, vec![&json!({"price": 5}), &json!({"price": 8})]);
}

#[test]
fn in_and_contains_are_reciprocal_membership_operators() {
    let env = Environment::new();
    let value = json!({"items": [{"tags": ["x", "y"]}, {"tags": ["z"]}]});
    let nodes = env.findall("$.items[?@.tags contains 'x']", &value).unwrap().all();
    assert_eq!(nodes, vec![&json!({"tags": ["x", "y"]})]);
    let nodes = env.findall("$.items[?'x' in @.tags]", &value).unwrap().all();
    assert_eq!(nodes, vec![&json!({"tags": ["x", "y"]})]);
    let nodes = env.findall("$.items[?'z' in @.tags]", &value).unwrap().all();
    assert!(nodes.is_empty());
}

#[test]
fn regex_match_operator_tests_strings_against_a_pattern() {
    let env = Environment::new();
    let value = json!([{"name": "apple"}, {"name": "banana"}, {"name": "avocado"}]);
    let nodes = env.findall("$[?@.name =~ '^a.*']", &value).unwrap().all();
    assert_eq!(nodes, vec![&json!({"name": "apple"}), &json!({"name": "avocado"})]);
}

#[test]
fn word_operators_and_or_not_combine_filter_expressions() {
    let env = Environment::new();
    let value = json!([1, 2, 3, 4, 5, 6]);
    let nodes = env.findall("$[?@ > 1 and @ < 5]", &value).unwrap().all();
    assert_eq!(nodes, vec![&json!(2), &json!(3), &json!(4)]);
    let nodes = env.findall("$[?@ < 2 or @ > 5]", &value).unwrap().all();
    assert_eq!(nodes, vec![&json!(1), &json!(6)]);
    let nodes = env.findall("$[?not (@ > 3)]", &value).unwrap().all();
    assert_eq!(nodes, vec![&json!(1), &json!(2), &json!(3)]);
}

#[test]
fn pseudo_root_addresses_a_synthetic_wrapper_around_the_document_root() {
    let env = Environment::new();
    let value = json!({"a": 1});
    let nodes = env.findall("$[?^[0] == $]", &value).unwrap().all();
    assert_eq!(nodes, vec![&value]);
}

#[test]
fn strict_mode_rejects_every_non_standard_token() {
    let env = Environment::new().with_strict(true);
    assert!(env.compile("$[~]").is_err());
    assert!(env.compile("$[~'a']").is_err());
    assert!(env.compile("$[~?# == 'a']").is_err());
    assert!(env.compile("$[?# == 0]").is_err());
    assert!(env.compile("$[?@ in ['a']]").is_err());
    assert!(env.compile("$[?@ contains 'a']").is_err());
    assert!(env.compile("$[?@ =~ '.*']").is_err());
    assert!(env.compile("$[?@ and @]").is_err());
    assert!(env.compile("$[?^[0] == $]").is_err());
}
