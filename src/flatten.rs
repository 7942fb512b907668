//! Path flattening: enumerate every addressable path through a schema node,
//! or through a concrete value conforming to it.
//!
//! Traversal rules, shared by both levels:
//! - every node contributes its own path;
//! - `Nullable` adds no segment (its child's children land at the same path);
//! - `List` appends the wildcard segment (type level) or the concrete index
//!   (value level);
//! - `Record` appends field names;
//! - `Union` contributes a synthetic key-set literal under the discriminator
//!   segment, then the variant field sets — all of them at the type level
//!   (each under a segment equal to the variant key, since the concrete
//!   variant is statically unknown), exactly the active one at the value
//!   level (unsegmented, the fields live directly on the object).
//!
//! Maps are built fresh per call and owned by the caller; entry order is the
//! traversal order.

use indexmap::IndexMap;
use serde_json::Value;

use crate::paths::{self, PathError, Segment, ValuePath};
use crate::schema::{Leaf, SchemaNode};

// ----------------------------- Type level --------------------------------- //

/// Map every reachable path to the sub-schema at that path. `wildcard` is
/// the segment standing in for list indices (conventionally
/// [`paths::DEFAULT_WILDCARD`], but two enumeration conventions need
/// different names, so it stays a parameter).
pub fn flatten_types(
    node: &SchemaNode,
    prefix: &str,
    wildcard: &str,
) -> IndexMap<String, SchemaNode> {
    let mut out = IndexMap::new();
    walk_types(node, prefix, wildcard, &mut out);
    out
}

fn walk_types(
    node: &SchemaNode,
    path: &str,
    wildcard: &str,
    out: &mut IndexMap<String, SchemaNode>,
) {
    out.insert(path.to_string(), node.clone());
    walk_type_children(node, path, wildcard, out);
}

fn walk_type_children(
    node: &SchemaNode,
    path: &str,
    wildcard: &str,
    out: &mut IndexMap<String, SchemaNode>,
) {
    match node {
        SchemaNode::Literal { .. } => {}
        // same path: the nullable entry stays, only descendants are added
        SchemaNode::Nullable { value } => walk_type_children(value, path, wildcard, out),
        SchemaNode::List { element, .. } => {
            walk_types(element, &paths::join(path, wildcard), wildcard, out);
        }
        SchemaNode::Record { fields } => {
            for (name, field) in fields {
                walk_types(&field.value_type, &paths::join(path, name), wildcard, out);
            }
        }
        SchemaNode::Union { discriminator, variants } => {
            out.insert(
                paths::join(path, discriminator),
                SchemaNode::literal(Leaf::Keys(variants.keys().cloned().collect())),
            );
            for (key, fields) in variants {
                let arm = paths::join(path, key);
                for (name, field) in fields {
                    walk_types(&field.value_type, &paths::join(&arm, name), wildcard, out);
                }
            }
        }
    }
}

// ----------------------------- Value level -------------------------------- //

/// One addressable location in a concrete value. `value` is `None` when the
/// path names an optional field that is absent (the path still appears).
/// `type_path` is the corresponding path in the type-level enumeration:
/// list indices become the wildcard, union fields gain the variant segment.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatValue {
    pub type_path: String,
    pub value: Option<Value>,
}

/// A [`FlatValue`] plus a point-mutation handle. The root entry carries no
/// setter; every other entry does.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatValueMut {
    pub type_path: String,
    pub value: Option<Value>,
    pub set: Option<SetValue>,
}

/// Deferred point mutation: captures the value-path of one location so the
/// caller can assign through it later, against the same root the flat map
/// was built from. Assigning a field inserts/overwrites that key; assigning
/// a list element splices that index.
#[derive(Debug, Clone, PartialEq)]
pub struct SetValue {
    path: ValuePath,
}

impl SetValue {
    pub fn path(&self) -> &ValuePath {
        &self.path
    }

    pub fn apply(&self, root: &mut Value, new: Value) -> Result<(), PathError> {
        paths::set_at(root, &self.path, new)
    }
}

/// Read-only value flattening. List paths use concrete indices; type paths
/// use [`paths::DEFAULT_WILDCARD`].
pub fn flatten_values(
    node: &SchemaNode,
    value: &Value,
    prefix: &str,
) -> IndexMap<String, FlatValue> {
    flatten_values_mut(node, value, prefix)
        .into_iter()
        .map(|(path, entry)| {
            (path, FlatValue { type_path: entry.type_path, value: entry.value })
        })
        .collect()
}

/// Value flattening with setters. Mutations applied through an entry's
/// [`SetValue`] are visible on the original value the caller flattened.
pub fn flatten_values_mut(
    node: &SchemaNode,
    value: &Value,
    prefix: &str,
) -> IndexMap<String, FlatValueMut> {
    let mut out = IndexMap::new();
    let at = Cursor {
        value_path: prefix.to_string(),
        type_path: prefix.to_string(),
        location: None,
    };
    walk_values(node, Some(value), &at, &mut out);
    out
}

/// Where the walk currently stands: the printable value path, the parallel
/// type path, and the segment trail from the flatten root (absent at the
/// root itself, which has no setter).
struct Cursor {
    value_path: String,
    type_path: String,
    location: Option<ValuePath>,
}

impl Cursor {
    fn child(&self, segment: Segment, type_segment: &str) -> Cursor {
        Cursor {
            value_path: paths::join(&self.value_path, &segment.to_string()),
            type_path: paths::join(&self.type_path, type_segment),
            location: Some(
                self.location
                    .clone()
                    .unwrap_or_default()
                    .child(segment),
            ),
        }
    }

    /// Child whose type path inserts an extra segment (union variant arms).
    fn variant_child(&self, segment: Segment, arm: &str, type_segment: &str) -> Cursor {
        Cursor {
            value_path: paths::join(&self.value_path, &segment.to_string()),
            type_path: paths::join(&paths::join(&self.type_path, arm), type_segment),
            location: Some(
                self.location
                    .clone()
                    .unwrap_or_default()
                    .child(segment),
            ),
        }
    }

    fn entry(&self, value: Option<&Value>) -> FlatValueMut {
        FlatValueMut {
            type_path: self.type_path.clone(),
            value: value.cloned(),
            set: self
                .location
                .clone()
                .map(|path| SetValue { path }),
        }
    }
}

fn walk_values(
    node: &SchemaNode,
    value: Option<&Value>,
    at: &Cursor,
    out: &mut IndexMap<String, FlatValueMut>,
) {
    out.insert(at.value_path.clone(), at.entry(value));
    let Some(value) = value else {
        // absent optional field: the path appears, nothing below it does
        return;
    };
    walk_value_children(node, value, at, out);
}

fn walk_value_children(
    node: &SchemaNode,
    value: &Value,
    at: &Cursor,
    out: &mut IndexMap<String, FlatValueMut>,
) {
    match node {
        SchemaNode::Literal { .. } => {}
        SchemaNode::Nullable { value: child } => {
            // null prunes the subtree; non-null recurses at the same path
            if !value.is_null() {
                walk_value_children(child, value, at, out);
            }
        }
        SchemaNode::List { element, .. } => {
            let Value::Array(items) = value else { return };
            for (i, item) in items.iter().enumerate() {
                let child = at.child(Segment::Index(i), paths::DEFAULT_WILDCARD);
                walk_values(element, Some(item), &child, out);
            }
        }
        SchemaNode::Record { fields } => {
            let Value::Object(map) = value else { return };
            for (name, field) in fields {
                let child = at.child(Segment::Field(name.clone()), name);
                walk_values(&field.value_type, map.get(name), &child, out);
            }
        }
        SchemaNode::Union { discriminator, variants } => {
            let Value::Object(map) = value else { return };
            let disc = at.child(Segment::Field(discriminator.clone()), discriminator);
            out.insert(disc.value_path.clone(), disc.entry(map.get(discriminator)));

            // recurse into exactly the field set the discriminator selects;
            // an undeclared discriminator value means an empty field set,
            // never a fault (it can occur transiently mid-reconciliation)
            let key = map.get(discriminator).and_then(Value::as_str);
            let Some((arm, fields)) = key.and_then(|k| variants.get_key_value(k)) else {
                return;
            };
            for (name, field) in fields {
                let child = at.variant_child(Segment::Field(name.clone()), arm, name);
                walk_values(&field.value_type, map.get(name), &child, out);
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use serde_json::json;

    fn pair_schema() -> SchemaNode {
        SchemaNode::record([
            (
                "literal",
                Field::of(SchemaNode::literal(Leaf::Number)).optional(),
            ),
            (
                "list",
                Field::of(SchemaNode::list(SchemaNode::literal(Leaf::Number))).optional(),
            ),
        ])
    }

    #[test]
    fn value_flattening_is_complete_including_absent_optionals() {
        let value = json!({"list": [2]});
        let flat = flatten_values(&pair_schema(), &value, "r");

        let paths: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(paths, ["r", "r.literal", "r.list", "r.list.0"]);

        assert_eq!(flat["r.literal"].value, None);
        assert_eq!(flat["r.list.0"].value, Some(json!(2)));
        assert_eq!(flat["r.list.0"].type_path, "r.list.n");
        assert_eq!(flat["r"].type_path, "r");
    }

    #[test]
    fn type_flattening_enumerates_lists_under_the_wildcard() {
        let flat = flatten_types(&pair_schema(), "r", paths::DEFAULT_WILDCARD);
        let paths: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(paths, ["r", "r.literal", "r.list", "r.list.n"]);
        assert_eq!(flat["r.list.n"], SchemaNode::literal(Leaf::Number));
    }

    #[test]
    fn wildcard_segment_is_caller_supplied() {
        let node = SchemaNode::list(SchemaNode::literal(Leaf::String));
        let flat = flatten_types(&node, "anno", "each");
        assert!(flat.contains_key("anno.each"));
        assert!(!flat.contains_key("anno.n"));
    }

    #[test]
    fn nullable_adds_no_segment() {
        let node = SchemaNode::nullable(SchemaNode::record([(
            "x",
            Field::of(SchemaNode::literal(Leaf::Number)),
        )]));

        let types = flatten_types(&node, "v", paths::DEFAULT_WILDCARD);
        assert_eq!(types.keys().map(String::as_str).collect::<Vec<_>>(), ["v", "v.x"]);
        // the nullable wrapper owns its own path; the child adds descendants
        assert!(matches!(types["v"], SchemaNode::Nullable { .. }));

        let inhabited = flatten_values(&node, &json!({"x": 1}), "v");
        assert_eq!(inhabited.keys().map(String::as_str).collect::<Vec<_>>(), ["v", "v.x"]);
        assert_eq!(inhabited["v.x"].value, Some(json!(1)));

        // null prunes the children but keeps the node's own path
        let null = flatten_values(&node, &json!(null), "v");
        assert_eq!(null.keys().map(String::as_str).collect::<Vec<_>>(), ["v"]);
        assert_eq!(null["v"].value, Some(json!(null)));
    }

    fn source_union() -> SchemaNode {
        SchemaNode::union(
            "disc",
            [
                ("file", vec![("path", Field::of(SchemaNode::literal(Leaf::String)))]),
                ("live", vec![("port", Field::of(SchemaNode::literal(Leaf::Number)))]),
            ],
        )
    }

    #[test]
    fn union_types_enumerate_every_arm_plus_the_discriminator() {
        let flat = flatten_types(&source_union(), "s", paths::DEFAULT_WILDCARD);
        let paths: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(paths, ["s", "s.disc", "s.file.path", "s.live.port"]);
        assert_eq!(
            flat["s.disc"],
            SchemaNode::literal(Leaf::Keys(vec!["file".into(), "live".into()]))
        );
    }

    #[test]
    fn union_values_follow_the_active_variant() {
        let flat = flatten_values(&source_union(), &json!({"disc": "live", "port": 9}), "s");
        let paths: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(paths, ["s", "s.disc", "s.port"]);
        assert_eq!(flat["s.disc"].value, Some(json!("live")));
        assert_eq!(flat["s.port"].type_path, "s.live.port");
    }

    #[test]
    fn union_with_undeclared_discriminator_yields_an_empty_field_set() {
        let flat = flatten_values(&source_union(), &json!({"disc": "tape"}), "s");
        let paths: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(paths, ["s", "s.disc"]);
    }

    #[test]
    fn setters_mutate_the_original_value() {
        let mut value = json!({"list": [2, 3], "literal": 7});
        let flat = flatten_values_mut(&pair_schema(), &value, "r");

        assert!(flat["r"].set.is_none(), "root has no setter");

        flat["r.list.1"].set.as_ref().unwrap().apply(&mut value, json!(30)).unwrap();
        flat["r.literal"].set.as_ref().unwrap().apply(&mut value, json!(8)).unwrap();
        assert_eq!(value, json!({"list": [2, 30], "literal": 8}));
    }

    #[test]
    fn absent_optional_field_still_gets_a_setter() {
        let mut value = json!({"list": []});
        let flat = flatten_values_mut(&pair_schema(), &value, "r");
        assert_eq!(flat["r.literal"].value, None);
        flat["r.literal"].set.as_ref().unwrap().apply(&mut value, json!(5)).unwrap();
        assert_eq!(value, json!({"list": [], "literal": 5}));
    }
}
