//! Incremental reconciliation: mutate a target value in place, minimally,
//! until it matches a prototype value.
//!
//! The walk mirrors instantiation but works on two values at once. It only
//! ever creates new sub-values through the supplied [`Instantiator`], and
//! only where the target has nothing to reconcile against (a grown list
//! slot, a newly present optional field, an incompatible union variant).
//! The prototype is never touched.

use serde_json::{Map, Value};

use crate::instantiate::Instantiator;
use crate::schema::{Field, SchemaNode};

/// Mutate `target` toward `prototype` along `node`.
///
/// Per-variant policy:
/// - literal: prototype adopted wholesale, never diffed;
/// - nullable: null prototype nulls the target; a null target is replaced
///   by a fresh instantiation; otherwise recurse;
/// - list: strictly positional element-wise reconcile, growth instantiated,
///   shrink truncated, no identity diffing or reordering;
/// - record: field-wise; an absent optional prototype field removes the
///   key, a newly present one is instantiated fresh;
/// - union: a discriminator mismatch replaces the whole target with one
///   instantiator call over the union node — that mismatch is a control
///   signal, not an error; a matching discriminator reconciles the active
///   variant's fields like a record.
///
/// A target container whose kind contradicts the schema is replaced the
/// same way a mismatched union variant is.
pub fn reconcile(
    node: &SchemaNode,
    instantiator: &dyn Instantiator,
    target: &mut Value,
    prototype: &Value,
) {
    match node {
        SchemaNode::Literal { .. } => *target = prototype.clone(),
        SchemaNode::Nullable { value } => {
            if prototype.is_null() {
                *target = Value::Null;
            } else if target.is_null() {
                *target = instantiator.instantiate(value, prototype);
            } else {
                reconcile(value, instantiator, target, prototype);
            }
        }
        SchemaNode::List { element, .. } => match (&mut *target, prototype) {
            (Value::Array(tgt), Value::Array(proto)) => {
                let shared = tgt.len().min(proto.len());
                for i in 0..shared {
                    reconcile(element, instantiator, &mut tgt[i], &proto[i]);
                }
                if proto.len() > tgt.len() {
                    for item in &proto[shared..] {
                        tgt.push(instantiator.instantiate(element, item));
                    }
                } else {
                    tgt.truncate(proto.len());
                }
            }
            _ => *target = instantiator.instantiate(node, prototype),
        },
        SchemaNode::Record { fields } => match (&mut *target, prototype) {
            (Value::Object(tgt), Value::Object(proto)) => {
                reconcile_fields(fields, instantiator, tgt, proto);
            }
            _ => *target = instantiator.instantiate(node, prototype),
        },
        SchemaNode::Union { discriminator, variants } => match (&mut *target, prototype) {
            (Value::Object(tgt), Value::Object(proto))
                if tgt.get(discriminator) == proto.get(discriminator) =>
            {
                let key = proto.get(discriminator).and_then(Value::as_str);
                if let Some(fields) = key.and_then(|k| variants.get(k)) {
                    reconcile_fields(fields, instantiator, tgt, proto);
                }
                // a discriminator neither side declares selects an empty
                // field set: nothing to reconcile
            }
            _ => *target = instantiator.instantiate(node, prototype),
        },
    }
}

fn reconcile_fields(
    fields: &indexmap::IndexMap<String, Field>,
    instantiator: &dyn Instantiator,
    tgt: &mut Map<String, Value>,
    proto: &Map<String, Value>,
) {
    for (name, field) in fields {
        match proto.get(name) {
            None if field.optional => {
                tgt.shift_remove(name);
            }
            None => {}
            Some(p) => match tgt.get_mut(name) {
                Some(t) => reconcile(&field.value_type, instantiator, t, p),
                None => {
                    tgt.insert(name.clone(), instantiator.instantiate(&field.value_type, p));
                }
            },
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
