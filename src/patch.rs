//! RFC 6902 JSON Patch, implemented purely as a consumer of [`crate::pointer::Pointer`]
//!
//! Per `spec.md` §1, JSON Patch sits outside the core query engine except as a consumer of the
//! Pointer API; this module adds nothing to the location model, it only walks and mutates a
//! [`serde_json::Value`] through [`Pointer`].
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pointer::{Pointer, PointerError, PointerToken};

/// A single RFC 6902 patch operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    /// Insert `value` at `path`, shifting array elements or adding/overwriting an object member
    Add {
        /// The location to insert at
        path: Pointer,
        /// The value to insert
        value: Value,
    },
    /// Remove the value at `path`
    Remove {
        /// The location to remove
        path: Pointer,
    },
    /// Replace the value already present at `path` with `value`
    Replace {
        /// The location to replace
        path: Pointer,
        /// The replacement value
        value: Value,
    },
    /// Remove the value at `from` and insert it at `path`
    Move {
        /// The location to remove from
        from: Pointer,
        /// The location to insert at
        path: Pointer,
    },
    /// Insert a copy of the value at `from` at `path`
    Copy {
        /// The location to copy from
        from: Pointer,
        /// The location to insert at
        path: Pointer,
    },
    /// Assert that the value at `path` equals `value`, failing the whole patch otherwise
    Test {
        /// The location to check
        path: Pointer,
        /// The expected value
        value: Value,
    },
}

/// A sequence of [`PatchOperation`]s, applied in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch(pub Vec<PatchOperation>);

impl Patch {
    /// Apply every operation in this patch to `doc`, in order
    ///
    /// Operations are applied one at a time directly against `doc`; if an operation fails
    /// partway through, the operations preceding it have already been applied (the document is
    /// left partially patched, matching RFC 6902's own non-transactional guidance — callers that
    /// need atomicity should clone `doc` before calling `apply`).
    pub fn apply(&self, doc: &mut Value) -> Result<(), PatchError> {
        for op in &self.0 {
            apply_one(op, doc)?;
        }
        Ok(())
    }
}

fn apply_one(op: &PatchOperation, doc: &mut Value) -> Result<(), PatchError> {
    match op {
        PatchOperation::Add { path, value } => add(doc, path, value.clone()),
        PatchOperation::Remove { path } => remove(doc, path).map(|_| ()),
        PatchOperation::Replace { path, value } => replace(doc, path, value.clone()),
        PatchOperation::Move { from, path } => {
            if path.len() > from.len() && path.is_relative_to(from) {
                return Err(PatchError::InvalidOperation(
                    "move: 'path' may not be a location within 'from'".to_owned(),
                ));
            }
            let value = remove(doc, from)?;
            add(doc, path, value)
        }
        PatchOperation::Copy { from, path } => {
            let value = from.resolve(doc).map_err(PatchError::from)?.clone();
            add(doc, path, value)
        }
        PatchOperation::Test { path, value } => {
            let actual = path.resolve(doc).map_err(PatchError::from)?;
            if actual == value {
                Ok(())
            } else {
                Err(PatchError::TestFailed { path: path.to_string() })
            }
        }
    }
}

fn add(doc: &mut Value, path: &Pointer, value: Value) -> Result<(), PatchError> {
    let Some((parent_path, last)) = path.split_last() else {
        *doc = value;
        return Ok(());
    };
    let parent = parent_path.resolve_mut(doc).map_err(PatchError::from)?;
    match (parent, last) {
        (Value::Object(map), PointerToken::Name(name)) => {
            map.insert(name.clone(), value);
            Ok(())
        }
        (Value::Array(arr), PointerToken::Index(index)) => {
            if *index > arr.len() {
                return Err(PatchError::TargetNotFound(path.to_string()));
            }
            arr.insert(*index, value);
            Ok(())
        }
        (Value::Array(arr), PointerToken::Dash) => {
            arr.push(value);
            Ok(())
        }
        (other, _) => Err(PatchError::InvalidOperation(format!(
            "cannot add a member to a {}",
            describe(other)
        ))),
    }
}

fn remove(doc: &mut Value, path: &Pointer) -> Result<Value, PatchError> {
    let Some((parent_path, last)) = path.split_last() else {
        return Err(PatchError::InvalidOperation("cannot remove the document root".to_owned()));
    };
    let parent = parent_path.resolve_mut(doc).map_err(PatchError::from)?;
    match (parent, last) {
        (Value::Object(map), PointerToken::Name(name)) => map
            .remove(name)
            .ok_or_else(|| PatchError::TargetNotFound(path.to_string())),
        (Value::Array(arr), PointerToken::Index(index)) => {
            if *index >= arr.len() {
                return Err(PatchError::TargetNotFound(path.to_string()));
            }
            Ok(arr.remove(*index))
        }
        (other, _) => Err(PatchError::InvalidOperation(format!(
            "cannot remove a member from a {}",
            describe(other)
        ))),
    }
}

fn replace(doc: &mut Value, path: &Pointer, value: Value) -> Result<(), PatchError> {
    if path.is_root() {
        *doc = value;
        return Ok(());
    }
    let target = path
        .resolve_mut(doc)
        .map_err(|_| PatchError::TargetNotFound(path.to_string()))?;
    *target = value;
    Ok(())
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// An error produced while applying a [`Patch`]
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// A `test` operation's expected value did not match the document
    #[error("test operation failed at {path}")]
    TestFailed {
        /// The location that was tested
        path: String,
    },
    /// An operation's target location does not exist
    #[error("target location not found: {0}")]
    TargetNotFound(String),
    /// An operation's shape is structurally invalid, independent of the document it's applied to
    #[error("invalid patch operation: {0}")]
    InvalidOperation(String),
    /// Resolving a pointer involved in the operation failed
    #[error(transparent)]
    Pointer(#[from] PointerError),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Patch, PatchOperation};
    use crate::pointer::Pointer;

    fn ptr(s: &str) -> Pointer {
        Pointer::parse(s).unwrap()
    }

    #[test]
    fn add_to_object_and_array() {
        let mut doc = json!({"foo": ["bar"]});
        let patch = Patch(vec![
            PatchOperation::Add {
                path: ptr("/baz"),
                value: json!("qux"),
            },
            PatchOperation::Add {
                path: ptr("/foo/0"),
                value: json!("first"),
            },
        ]);
        patch.apply(&mut doc).unwrap();
        assert_eq!(doc, json!({"foo": ["first", "bar"], "baz": "qux"}));
    }

    #[test]
    fn add_with_dash_appends() {
        let mut doc = json!({"foo": [1, 2]});
        let patch = Patch(vec![PatchOperation::Add {
            path: ptr("/foo/-"),
            value: json!(3),
        }]);
        patch.apply(&mut doc).unwrap();
        assert_eq!(doc, json!({"foo": [1, 2, 3]}));
    }

    #[test]
    fn remove_from_object_and_array() {
        let mut doc = json!({"foo": [1, 2, 3], "bar": "baz"});
        let patch = Patch(vec![
            PatchOperation::Remove { path: ptr("/foo/1") },
            PatchOperation::Remove { path: ptr("/bar") },
        ]);
        patch.apply(&mut doc).unwrap();
        assert_eq!(doc, json!({"foo": [1, 3]}));
    }

    #[test]
    fn replace_requires_existing_target() {
        let mut doc = json!({"foo": "bar"});
        let patch = Patch(vec![PatchOperation::Replace {
            path: ptr("/foo"),
            value: json!("baz"),
        }]);
        patch.apply(&mut doc).unwrap();
        assert_eq!(doc, json!({"foo": "baz"}));

        let mut doc = json!({});
        let patch = Patch(vec![PatchOperation::Replace {
            path: ptr("/missing"),
            value: json!(1),
        }]);
        assert!(patch.apply(&mut doc).is_err());
    }

    #[test]
    fn move_relocates_a_value() {
        let mut doc = json!({"foo": {"bar": 1}, "baz": {}});
        let patch = Patch(vec![PatchOperation::Move {
            from: ptr("/foo/bar"),
            path: ptr("/baz/bar"),
        }]);
        patch.apply(&mut doc).unwrap();
        assert_eq!(doc, json!({"foo": {}, "baz": {"bar": 1}}));
    }

    #[test]
    fn move_into_own_descendant_is_rejected() {
        let mut doc = json!({"foo": {"bar": 1}});
        let patch = Patch(vec![PatchOperation::Move {
            from: ptr("/foo"),
            path: ptr("/foo/baz"),
        }]);
        assert!(patch.apply(&mut doc).is_err());
    }

    #[test]
    fn copy_duplicates_a_value() {
        let mut doc = json!({"foo": {"bar": 1}, "baz": {}});
        let patch = Patch(vec![PatchOperation::Copy {
            from: ptr("/foo/bar"),
            path: ptr("/baz/bar"),
        }]);
        patch.apply(&mut doc).unwrap();
        assert_eq!(doc, json!({"foo": {"bar": 1}, "baz": {"bar": 1}}));
    }

    #[test]
    fn test_operation_short_circuits_the_patch() {
        let mut doc = json!({"foo": 1});
        let patch = Patch(vec![
            PatchOperation::Test {
                path: ptr("/foo"),
                value: json!(2),
            },
            PatchOperation::Replace {
                path: ptr("/foo"),
                value: json!(99),
            },
        ]);
        assert!(patch.apply(&mut doc).is_err());
        assert_eq!(doc, json!({"foo": 1}));
    }

    #[test]
    fn deserializes_rfc6902_wire_format() {
        let ops: Vec<PatchOperation> = serde_json::from_value(json!([
            {"op": "add", "path": "/a", "value": 1},
            {"op": "remove", "path": "/b"},
            {"op": "test", "path": "/a", "value": 1},
        ]))
        .unwrap();
        assert_eq!(ops.len(), 3);
    }
}
