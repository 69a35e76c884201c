use std::collections::VecDeque;

use serde_json::json;

use jsonpath_engine::functions::{Function, JsonPathType, JsonPathTypeKind};
use jsonpath_engine::Environment;

fn first_evaluator<'a>(mut args: VecDeque<JsonPathType<'a>>) -> JsonPathType<'a> {
    match args.pop_front() {
        Some(JsonPathType::Nodes(nl)) => match nl.first() {
            Some(v) => JsonPathType::Node(v),
            None => JsonPathType::Nothing,
        },
        _ => JsonPathType::Nothing,
    }
}

fn first_validator(
    args: &[jsonpath_engine::functions::FunctionExprArg],
) -> Result<(), jsonpath_engine::functions::FunctionValidationError> {
    use jsonpath_engine::functions::FunctionValidationError;

    if args.len() != 1 {
        return Err(FunctionValidationError::NumberOfArgsMismatch {
            expected: 1,
            received: args.len(),
        });
    }
    let received = args[0].as_type_kind()?;
    if !received.converts_to(JsonPathTypeKind::Nodelist) {
        return Err(FunctionValidationError::MismatchTypeKind {
            expected: JsonPathTypeKind::Nodelist,
            received,
            position: 0,
        });
    }
    Ok(())
}

#[test]
fn first_function() {
    let value = json!([
        {
            "books": [
                {
                    "author": "Alexandre Dumas",
                    "title": "The Three Musketeers"
                },
                {
                    "author": "William Schirer",
                    "title": "The Rise and Fall of the Third Reich"
                }
            ]
        },
        {
            "books": [
                {
                    "author": "Charles Dickens",
                    "title": "Great Expectations"
                },
                {
                    "author": "Fyodor Dostoevsky",
                    "title": "The Brothers Karamazov"
                }
            ]
        }
    ]);
    let env = Environment::new().register_function(Function::new(
        "first",
        JsonPathTypeKind::Value,
        first_evaluator,
        first_validator,
    ));
    let nodes = env
        .findall("$[?first(@.books.*.author) == 'Alexandre Dumas']", &value)
        .unwrap();
    let node = nodes.exactly_one().unwrap();
    assert_eq!(
        "The Rise and Fall of the Third Reich",
        node.pointer("/books/1/title").unwrap().as_str().unwrap(),
    );
}
