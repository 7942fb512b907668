//! The schema definition model: a closed, recursive set of node kinds
//! describing the shape of JSON-ish data.
//!
//! Nodes are plain data. Behavior lives elsewhere (`derive`, `flatten`,
//! `conform`, `instantiate`, `reconcile`); everything there dispatches by
//! exhaustive match over these five variants, so the compiler enforces the
//! closed set.
//!
//! Nodes are immutable, shareable values once built. The only construction
//! constraint is structural depth: [`SchemaNode::validate`] rejects trees
//! nested past [`MAX_SCHEMA_DEPTH`] up front so every later walk is total.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths;

/// Nesting limit enforced at construction time, never at call time.
pub const MAX_SCHEMA_DEPTH: usize = 20;

// ------------------------------- Nodes ------------------------------------ //

/// A recursive type description. Five variants, closed set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaNode {
    /// An opaque leaf: never decomposed, never diffed field-by-field.
    Literal { leaf: Leaf },
    /// `null` or a value of the child shape. Adds no path segment.
    Nullable { value: Box<SchemaNode> },
    /// An ordered sequence. `readonly` covers the outer sequence only;
    /// element mutability is the element node's own business.
    List {
        element: Box<SchemaNode>,
        #[serde(default)]
        readonly: bool,
    },
    /// Named fields, each independently readonly and/or optional.
    Record { fields: IndexMap<String, Field> },
    /// A discriminated union: the `discriminator` field (implicit, not
    /// listed in any variant) selects which field set is active.
    Union {
        discriminator: String,
        variants: IndexMap<String, IndexMap<String, Field>>,
    },
}

/// What a `Literal` leaf accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leaf {
    /// Anything, treated atomically (including whole objects).
    Any,
    Bool,
    Number,
    String,
    /// One of a fixed set of strings. Synthesized for union discriminators.
    Keys(Vec<String>),
}

/// One named slot in a record or union variant. `readonly` and `optional`
/// are independent booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(rename = "type")]
    pub value_type: SchemaNode,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub optional: bool,
}

impl Field {
    pub fn of(value_type: SchemaNode) -> Self {
        Self { value_type, readonly: false, optional: false }
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

// ----------------------------- Constructors ------------------------------- //

impl SchemaNode {
    pub fn literal(leaf: Leaf) -> Self {
        SchemaNode::Literal { leaf }
    }

    pub fn nullable(value: SchemaNode) -> Self {
        SchemaNode::Nullable { value: Box::new(value) }
    }

    pub fn list(element: SchemaNode) -> Self {
        SchemaNode::List { element: Box::new(element), readonly: false }
    }

    pub fn readonly_list(element: SchemaNode) -> Self {
        SchemaNode::List { element: Box::new(element), readonly: true }
    }

    pub fn record<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Field)>,
    {
        SchemaNode::Record {
            fields: fields.into_iter().map(|(k, f)| (k.to_string(), f)).collect(),
        }
    }

    pub fn union<I, J>(discriminator: &str, variants: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, J)>,
        J: IntoIterator<Item = (&'static str, Field)>,
    {
        SchemaNode::Union {
            discriminator: discriminator.to_string(),
            variants: variants
                .into_iter()
                .map(|(key, fields)| {
                    let fields = fields
                        .into_iter()
                        .map(|(k, f)| (k.to_string(), f))
                        .collect();
                    (key.to_string(), fields)
                })
                .collect(),
        }
    }

    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaNode::Literal { .. } => "literal",
            SchemaNode::Nullable { .. } => "nullable",
            SchemaNode::List { .. } => "list",
            SchemaNode::Record { .. } => "record",
            SchemaNode::Union { .. } => "union",
        }
    }
}

// ----------------------------- Validation --------------------------------- //

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema nesting exceeds {MAX_SCHEMA_DEPTH} levels at `{path}`")]
    TooDeep { path: String },
    #[error("union at `{path}` declares no variants")]
    EmptyUnion { path: String },
    #[error(
        "union at `{path}`: discriminator `{discriminator}` collides with a \
         declared field of variant `{variant}`"
    )]
    DiscriminatorCollision {
        path: String,
        discriminator: String,
        variant: String,
    },
}

impl SchemaNode {
    /// Reject malformed trees at construction time: depth past the limit,
    /// empty unions, discriminators shadowing declared fields. `Box`ed
    /// children make structural cycles unrepresentable, so depth is the only
    /// recursion bound needed.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.validate_at("", 0)
    }

    fn validate_at(&self, path: &str, depth: usize) -> Result<(), SchemaError> {
        if depth > MAX_SCHEMA_DEPTH {
            return Err(SchemaError::TooDeep { path: path.to_string() });
        }
        match self {
            SchemaNode::Literal { .. } => Ok(()),
            SchemaNode::Nullable { value } => value.validate_at(path, depth + 1),
            SchemaNode::List { element, .. } => {
                element.validate_at(&paths::join(path, paths::DEFAULT_WILDCARD), depth + 1)
            }
            SchemaNode::Record { fields } => {
                for (name, field) in fields {
                    field
                        .value_type
                        .validate_at(&paths::join(path, name), depth + 1)?;
                }
                Ok(())
            }
            SchemaNode::Union { discriminator, variants } => {
                if variants.is_empty() {
                    return Err(SchemaError::EmptyUnion { path: path.to_string() });
                }
                for (key, fields) in variants {
                    if fields.contains_key(discriminator) {
                        return Err(SchemaError::DiscriminatorCollision {
                            path: path.to_string(),
                            discriminator: discriminator.clone(),
                            variant: key.clone(),
                        });
                    }
                    let arm = paths::join(path, key);
                    for (name, field) in fields {
                        field
                            .value_type
                            .validate_at(&paths::join(&arm, name), depth + 1)?;
                    }
                }
                Ok(())
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> SchemaNode {
        SchemaNode::record([
            ("name", Field::of(SchemaNode::literal(Leaf::String))),
            ("gain", Field::of(SchemaNode::literal(Leaf::Number)).optional()),
        ])
    }

    #[test]
    fn validate_accepts_a_sane_document_schema() {
        let doc = SchemaNode::record([
            ("title", Field::of(SchemaNode::literal(Leaf::String)).readonly()),
            ("channels", Field::of(SchemaNode::list(channel()))),
            ("note", Field::of(SchemaNode::nullable(SchemaNode::literal(Leaf::String)))),
        ]);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn validate_rejects_over_deep_nesting() {
        let mut node = SchemaNode::literal(Leaf::Number);
        for _ in 0..=MAX_SCHEMA_DEPTH {
            node = SchemaNode::list(node);
        }
        assert!(matches!(node.validate(), Err(SchemaError::TooDeep { .. })));
    }

    #[test]
    fn validate_rejects_empty_union_and_discriminator_collision() {
        let empty = SchemaNode::Union {
            discriminator: "disc".into(),
            variants: IndexMap::new(),
        };
        assert_eq!(empty.validate(), Err(SchemaError::EmptyUnion { path: String::new() }));

        let shadowed = SchemaNode::union(
            "disc",
            [("a", [("disc", Field::of(SchemaNode::literal(Leaf::String)))])],
        );
        assert!(matches!(
            shadowed.validate(),
            Err(SchemaError::DiscriminatorCollision { .. })
        ));
    }

    #[test]
    fn schema_round_trips_through_json() {
        let doc = SchemaNode::record([
            ("channels", Field::of(SchemaNode::list(channel()))),
            (
                "source",
                Field::of(SchemaNode::union(
                    "disc",
                    [
                        ("file", [("path", Field::of(SchemaNode::literal(Leaf::String)))]),
                        ("live", [("port", Field::of(SchemaNode::literal(Leaf::Number)))]),
                    ],
                )),
            ),
        ]);
        let text = serde_json::to_string(&doc).unwrap();
        let back: SchemaNode = serde_json::from_str(&text).unwrap();
        assert_eq!(back, doc);
    }
}
