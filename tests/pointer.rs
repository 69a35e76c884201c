use serde_json::json;

use jsonpath_engine::pointer::{Pointer, RelativePointer};

#[test]
fn resolves_rfc6901_wire_format_examples() {
    let doc = json!({
        "foo": ["bar", "baz"],
        "": 0,
        "a/b": 1,
        "c%d": 2,
        "e^f": 3,
        "g|h": 4,
        "i\\j": 5,
        "k\"l": 6,
        " ": 7,
        "m~n": 8
    });
    assert_eq!(Pointer::parse("").unwrap().resolve(&doc).unwrap(), &doc);
    assert_eq!(Pointer::parse("/foo").unwrap().resolve(&doc).unwrap(), &json!(["bar", "baz"]));
    assert_eq!(Pointer::parse("/foo/0").unwrap().resolve(&doc).unwrap(), &json!("bar"));
    assert_eq!(Pointer::parse("/").unwrap().resolve(&doc).unwrap(), &json!(0));
    assert_eq!(Pointer::parse("/a~1b").unwrap().resolve(&doc).unwrap(), &json!(1));
    assert_eq!(Pointer::parse("/m~0n").unwrap().resolve(&doc).unwrap(), &json!(8));
}

#[test]
fn out_of_range_and_missing_members_do_not_resolve() {
    let doc = json!({"foo": [1, 2, 3]});
    assert!(Pointer::parse("/foo/3").unwrap().resolve(&doc).is_err());
    assert!(Pointer::parse("/bar").unwrap().resolve(&doc).is_err());
}

#[test]
fn join_and_parent_compose_pointers() {
    let base = Pointer::parse("/foo/bar").unwrap();
    assert_eq!(base.join("baz").unwrap(), Pointer::parse("/foo/bar/baz").unwrap());
    assert_eq!(base.parent().unwrap(), Pointer::parse("/foo").unwrap());
    assert!(base.is_relative_to(&Pointer::parse("/foo").unwrap()));
    assert!(!Pointer::parse("/foo").unwrap().is_relative_to(&base));
}

#[test]
fn relative_pointer_walks_up_and_rewrites_with_offset() {
    let doc = json!({"foo": ["bar", "baz"]});
    let base = Pointer::parse("/foo/1").unwrap();

    let same_array = RelativePointer::parse("1").unwrap().to(&base).unwrap();
    assert_eq!(same_array, Pointer::parse("/foo").unwrap());

    let prior_element = RelativePointer::parse("0-1").unwrap().to(&base).unwrap();
    assert_eq!(prior_element.resolve(&doc).unwrap(), &json!("bar"));

    let key_of_self = RelativePointer::parse("0#").unwrap().to(&base).unwrap();
    assert_eq!(key_of_self.to_string(), "/foo/#1");
}

#[test]
fn relative_pointer_rejects_walking_past_the_root() {
    let base = Pointer::parse("/foo").unwrap();
    assert!(RelativePointer::parse("5").unwrap().to(&base).is_err());
}
