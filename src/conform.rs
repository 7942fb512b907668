//! Runtime conformance checking: does a concrete value have the shape a
//! schema node describes?
//!
//! This is the value-level projection of a schema. Optionality and the
//! nullable/list/union structure are checked; `readonly` flags are a
//! mutation-surface concern and play no part here. Checks are total walks:
//! the first violation is reported with its dotted path and the walk stops.

use serde_json::Value;
use thiserror::Error;

use crate::paths::{self, value_kind};
use crate::schema::{Field, Leaf, SchemaNode};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConformError {
    #[error("`{path}`: expected {expected}, found {found}")]
    Kind {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("`{path}`: missing required field `{field}`")]
    MissingField { path: String, field: String },
    #[error("`{path}`: unknown field `{field}`")]
    UnknownField { path: String, field: String },
    #[error("`{path}`: expected one of {keys:?}, found `{found}`")]
    Keys {
        path: String,
        keys: Vec<String>,
        found: String,
    },
    #[error("`{path}`: discriminator `{field}` must be one of {keys:?}")]
    Discriminator {
        path: String,
        field: String,
        keys: Vec<String>,
    },
}

/// Check `value` against `node`, reporting the first violation.
pub fn conform(node: &SchemaNode, value: &Value) -> Result<(), ConformError> {
    conform_at(node, value, "")
}

/// Convenience predicate over [`conform`].
pub fn conforms(node: &SchemaNode, value: &Value) -> bool {
    conform(node, value).is_ok()
}

fn conform_at(node: &SchemaNode, value: &Value, path: &str) -> Result<(), ConformError> {
    match node {
        SchemaNode::Literal { leaf } => conform_leaf(leaf, value, path),
        SchemaNode::Nullable { value: child } => {
            if value.is_null() {
                Ok(())
            } else {
                conform_at(child, value, path)
            }
        }
        SchemaNode::List { element, .. } => {
            let Value::Array(items) = value else {
                return Err(kind_error(path, "array", value));
            };
            for (i, item) in items.iter().enumerate() {
                conform_at(element, item, &paths::join(path, &i.to_string()))?;
            }
            Ok(())
        }
        SchemaNode::Record { fields } => {
            let Value::Object(map) = value else {
                return Err(kind_error(path, "object", value));
            };
            conform_fields(fields, map, path, None)
        }
        SchemaNode::Union { discriminator, variants } => {
            let Value::Object(map) = value else {
                return Err(kind_error(path, "object", value));
            };
            let key = map.get(discriminator).and_then(Value::as_str);
            let Some(fields) = key.and_then(|k| variants.get(k)) else {
                return Err(ConformError::Discriminator {
                    path: path.to_string(),
                    field: discriminator.clone(),
                    keys: variants.keys().cloned().collect(),
                });
            };
            conform_fields(fields, map, path, Some(discriminator))
        }
    }
}

/// Shared record/union-variant field check: exactly the required fields
/// present, optional fields present-or-absent, nothing undeclared.
fn conform_fields(
    fields: &indexmap::IndexMap<String, Field>,
    map: &serde_json::Map<String, Value>,
    path: &str,
    discriminator: Option<&str>,
) -> Result<(), ConformError> {
    for (name, field) in fields {
        match map.get(name) {
            Some(v) => conform_at(&field.value_type, v, &paths::join(path, name))?,
            None if field.optional => {}
            None => {
                return Err(ConformError::MissingField {
                    path: path.to_string(),
                    field: name.clone(),
                });
            }
        }
    }
    for name in map.keys() {
        if Some(name.as_str()) != discriminator && !fields.contains_key(name) {
            return Err(ConformError::UnknownField {
                path: path.to_string(),
                field: name.clone(),
            });
        }
    }
    Ok(())
}

fn conform_leaf(leaf: &Leaf, value: &Value, path: &str) -> Result<(), ConformError> {
    match leaf {
        Leaf::Any => Ok(()),
        Leaf::Bool if value.is_boolean() => Ok(()),
        Leaf::Bool => Err(kind_error(path, "boolean", value)),
        Leaf::Number if value.is_number() => Ok(()),
        Leaf::Number => Err(kind_error(path, "number", value)),
        Leaf::String if value.is_string() => Ok(()),
        Leaf::String => Err(kind_error(path, "string", value)),
        Leaf::Keys(keys) => match value.as_str() {
            Some(s) if keys.iter().any(|k| k == s) => Ok(()),
            _ => Err(ConformError::Keys {
                path: path.to_string(),
                keys: keys.clone(),
                found: value.to_string(),
            }),
        },
    }
}

fn kind_error(path: &str, expected: &'static str, found: &Value) -> ConformError {
    ConformError::Kind {
        path: path.to_string(),
        expected,
        found: value_kind(found),
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive_partial;
    use crate::schema::Field;
    use serde_json::json;

    fn doc() -> SchemaNode {
        SchemaNode::record([
            ("title", Field::of(SchemaNode::literal(Leaf::String))),
            (
                "channels",
                Field::of(SchemaNode::list(SchemaNode::record([
                    ("name", Field::of(SchemaNode::literal(Leaf::String))),
                    ("gain", Field::of(SchemaNode::literal(Leaf::Number)).optional()),
                ]))),
            ),
            (
                "note",
                Field::of(SchemaNode::nullable(SchemaNode::literal(Leaf::String)))
                    .optional(),
            ),
        ])
    }

    #[test]
    fn accepts_a_conforming_document() {
        let v = json!({
            "title": "mix",
            "channels": [{"name": "L", "gain": 0.5}, {"name": "R"}],
            "note": null
        });
        assert!(conforms(&doc(), &v));
    }

    #[test]
    fn rejects_missing_required_and_unknown_fields() {
        let missing = json!({"channels": []});
        assert_eq!(
            conform(&doc(), &missing),
            Err(ConformError::MissingField {
                path: "".into(),
                field: "title".into()
            })
        );

        let unknown = json!({"title": "t", "channels": [], "extra": 1});
        assert_eq!(
            conform(&doc(), &unknown),
            Err(ConformError::UnknownField {
                path: "".into(),
                field: "extra".into()
            })
        );
    }

    #[test]
    fn reports_the_dotted_path_of_a_nested_violation() {
        let v = json!({"title": "t", "channels": [{"name": "L"}, {"name": 3}]});
        assert_eq!(
            conform(&doc(), &v),
            Err(ConformError::Kind {
                path: "channels.1.name".into(),
                expected: "string",
                found: "number",
            })
        );
    }

    #[test]
    fn union_checks_the_active_variant_only() {
        let node = SchemaNode::union(
            "disc",
            [
                ("file", vec![("path", Field::of(SchemaNode::literal(Leaf::String)))]),
                ("live", vec![("port", Field::of(SchemaNode::literal(Leaf::Number)))]),
            ],
        );
        assert!(conforms(&node, &json!({"disc": "file", "path": "/a"})));
        assert!(conforms(&node, &json!({"disc": "live", "port": 8000})));
        // a field from the other arm is unknown for this variant
        assert!(!conforms(&node, &json!({"disc": "file", "port": 8000})));
        // undeclared discriminator value
        assert!(matches!(
            conform(&node, &json!({"disc": "tape", "path": "/a"})),
            Err(ConformError::Discriminator { .. })
        ));
    }

    #[test]
    fn keys_leaf_accepts_member_strings_only() {
        let node = SchemaNode::literal(Leaf::Keys(vec!["a".into(), "b".into()]));
        assert!(conforms(&node, &json!("a")));
        assert!(!conforms(&node, &json!("c")));
        assert!(!conforms(&node, &json!(1)));
    }

    #[test]
    fn partial_shape_accepts_any_subset_of_fields() {
        let partial = derive_partial(&doc());
        assert!(conforms(&partial, &json!({})));
        assert!(conforms(&partial, &json!({"channels": [{}]})));
        // still type-checks what is present
        assert!(!conforms(&partial, &json!({"title": 7})));
    }
}
