use serde_json::json;

use jsonpath_engine::Environment;

#[test]
fn union_does_not_deduplicate_overlapping_matches() {
    let env = Environment::new();
    let value = json!({"a": [1, 2, 3]});
    let cq = env.compile_compound("$.a[0,1] | $.a[1,2]").unwrap();
    let locations: Vec<String> = cq
        .query_located(&value, &env)
        .locations()
        .map(|l| l.to_string())
        .collect();
    assert_eq!(
        locations,
        vec!["$['a'][0]", "$['a'][1]", "$['a'][1]", "$['a'][2]"]
    );
}

#[test]
fn intersection_across_disjoint_subtrees_is_empty() {
    let env = Environment::new();
    let value = json!({"a": [1, 2], "b": [1, 2]});
    let cq = env.compile_compound("$.a[*] & $.b[*]").unwrap();
    assert!(cq.query_located(&value, &env).is_empty());
}

#[test]
fn mixed_union_then_intersection_is_left_to_right() {
    let env = Environment::new();
    let value = json!({"a": [1, 2, 3], "b": [3]});
    // ($.a[*] | $.b[*]) & $.a[?@ > 1]: union first produces [1,2,3,3], then the intersection
    // keeps only locations also produced by the third query ($['a'][1], $['a'][2]).
    let cq = env.compile_compound("$.a[*] | $.b[*] & $.a[?@ > 1]").unwrap();
    let nodes: Vec<_> = cq.query_located(&value, &env).nodes().collect();
    assert_eq!(nodes, vec![&json!(2), &json!(3)]);
}

#[test]
fn compile_compound_rejects_an_invalid_constituent_query() {
    let env = Environment::new();
    assert!(env.compile_compound("$.a | $[").is_err());
}
