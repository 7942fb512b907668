//! Value instantiation strategies: build a value of a schema's shape from a
//! source value.
//!
//! All strategies share one structural recursion ([`instantiate_with`]) and
//! differ only in the per-node modifier applied to each freshly built
//! container on the way back up. Literal leaves are adopted by reference
//! semantics (cloned wholesale, never decomposed); so is any source value
//! whose kind contradicts the schema node — shape drift is the
//! reconciliation layer's problem, not a fault here.

use std::ops::Deref;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::capability::Observe;
use crate::flatten::SetValue;
use crate::schema::{Field, SchemaNode};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstantiateError {
    #[error("cannot assign `{path}`: value is frozen")]
    FrozenMutation { path: String },
}

// ------------------------------ Shared core ------------------------------- //

/// Rebuild `source` along `node`, invoking `modify` on each new list,
/// record, or union container after its children are built. Nullable adds
/// no container of its own and literals are opaque, so neither sees the
/// modifier.
pub fn instantiate_with<F>(node: &SchemaNode, source: &Value, modify: &mut F) -> Value
where
    F: FnMut(Value, &SchemaNode) -> Value,
{
    match node {
        SchemaNode::Literal { .. } => source.clone(),
        SchemaNode::Nullable { value } => {
            if source.is_null() {
                Value::Null
            } else {
                instantiate_with(value, source, modify)
            }
        }
        SchemaNode::List { element, .. } => {
            let Value::Array(items) = source else { return source.clone() };
            let built = items
                .iter()
                .map(|item| instantiate_with(element, item, modify))
                .collect();
            modify(Value::Array(built), node)
        }
        SchemaNode::Record { fields } => {
            let Value::Object(src) = source else { return source.clone() };
            let built = build_fields(fields, src, |field, v| {
                instantiate_with(&field.value_type, v, modify)
            });
            modify(Value::Object(built), node)
        }
        SchemaNode::Union { discriminator, variants } => {
            let Value::Object(src) = source else { return source.clone() };
            let mut built = Map::new();
            if let Some(disc) = src.get(discriminator) {
                built.insert(discriminator.clone(), disc.clone());
            }
            let key = src.get(discriminator).and_then(Value::as_str);
            if let Some(fields) = key.and_then(|k| variants.get(k)) {
                for (name, value) in build_fields(fields, src, |field, v| {
                    instantiate_with(&field.value_type, v, modify)
                }) {
                    built.insert(name, value);
                }
            }
            modify(Value::Object(built), node)
        }
    }
}

fn build_fields(
    fields: &indexmap::IndexMap<String, Field>,
    src: &Map<String, Value>,
    mut build: impl FnMut(&Field, &Value) -> Value,
) -> Map<String, Value> {
    let mut out = Map::new();
    for (name, field) in fields {
        // absent optional fields stay absent
        if let Some(v) = src.get(name) {
            out.insert(name.clone(), build(field, v));
        }
    }
    out
}

// ------------------------------ Strategies -------------------------------- //

/// Structurally independent deep copy: new containers at every level, leaf
/// values cloned as-is.
pub fn instantiate_copy(node: &SchemaNode, source: &Value) -> Value {
    instantiate_with(node, source, &mut |value, _| value)
}

/// Deep copy sealed against mutation. The engine's only mutation surfaces
/// take `&mut Value`, which [`Frozen`] never yields; its own `set` fails
/// loudly instead of silently ignoring the write.
pub fn instantiate_frozen(node: &SchemaNode, source: &Value) -> Frozen {
    Frozen(instantiate_copy(node, source))
}

/// An immutable instantiation result. Shared read access only.
#[derive(Debug, Clone, PartialEq)]
pub struct Frozen(Value);

impl Frozen {
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Always fails: frozen values reject every write attempt.
    pub fn set(&self, set: &SetValue, _new: Value) -> Result<(), InstantiateError> {
        Err(InstantiateError::FrozenMutation {
            path: set.path().to_string(),
        })
    }

    /// Give up the freeze by transferring ownership out.
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl Deref for Frozen {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.0
    }
}

/// Deep copy whose list/record/union containers are marked trackable
/// through the injected capability. Literal leaves are never tracked, and a
/// subtree reached through a readonly field is built by plain copy: an
/// inner container only reachable through an untracked one is invisible to
/// the reactive system anyway.
pub fn instantiate_observable(
    node: &SchemaNode,
    source: &Value,
    observe: &dyn Observe,
) -> Value {
    match node {
        SchemaNode::Literal { .. } => source.clone(),
        SchemaNode::Nullable { value } => {
            if source.is_null() {
                Value::Null
            } else {
                instantiate_observable(value, source, observe)
            }
        }
        SchemaNode::List { element, .. } => {
            let Value::Array(items) = source else { return source.clone() };
            let built = items
                .iter()
                .map(|item| instantiate_observable(element, item, observe))
                .collect();
            observe.track(Value::Array(built))
        }
        SchemaNode::Record { fields } => {
            let Value::Object(src) = source else { return source.clone() };
            let built = build_fields(fields, src, |field, v| {
                build_field_observable(field, v, observe)
            });
            observe.track(Value::Object(built))
        }
        SchemaNode::Union { discriminator, variants } => {
            let Value::Object(src) = source else { return source.clone() };
            let mut built = Map::new();
            if let Some(disc) = src.get(discriminator) {
                built.insert(discriminator.clone(), disc.clone());
            }
            let key = src.get(discriminator).and_then(Value::as_str);
            if let Some(fields) = key.and_then(|k| variants.get(k)) {
                for (name, value) in build_fields(fields, src, |field, v| {
                    build_field_observable(field, v, observe)
                }) {
                    built.insert(name, value);
                }
            }
            observe.track(Value::Object(built))
        }
    }
}

fn build_field_observable(field: &Field, v: &Value, observe: &dyn Observe) -> Value {
    if field.readonly {
        instantiate_copy(&field.value_type, v)
    } else {
        instantiate_observable(&field.value_type, v, observe)
    }
}

// ----------------------------- Instantiator ------------------------------- //

/// Pluggable "build a fresh value of this shape" strategy, consumed by the
/// reconciliation walk whenever it has nothing to reconcile against.
pub trait Instantiator {
    fn instantiate(&self, node: &SchemaNode, source: &Value) -> Value;
}

pub struct CopyInstantiator;

impl Instantiator for CopyInstantiator {
    fn instantiate(&self, node: &SchemaNode, source: &Value) -> Value {
        instantiate_copy(node, source)
    }
}

pub struct ObservableInstantiator<'a> {
    pub observe: &'a dyn Observe,
}

impl Instantiator for ObservableInstantiator<'_> {
    fn instantiate(&self, node: &SchemaNode, source: &Value) -> Value {
        instantiate_observable(node, source, self.observe)
    }
}

// ------------------------------- Tests ------------------------------------ //
