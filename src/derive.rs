//! Shape derivation: rewrite the `readonly`/`optional` flags threaded
//! through a schema tree without touching its topology.
//!
//! Each derivation is a pure clone-and-rebuild recursion over the five node
//! kinds. Field maps are rebuilt preserving keys and order; literals are the
//! base case. Derivation cannot fail for a validated schema, is
//! deterministic, and is idempotent, so callers may recompute freely.

use indexmap::IndexMap;

use crate::schema::{Field, SchemaNode};

/// Every field and list becomes `readonly = true`, at every depth.
/// `optional` flags are untouched; literals pass through unchanged.
pub fn derive_readonly(node: &SchemaNode) -> SchemaNode {
    match node {
        SchemaNode::Literal { .. } => node.clone(),
        SchemaNode::Nullable { value } => SchemaNode::Nullable {
            value: Box::new(derive_readonly(value)),
        },
        SchemaNode::List { element, .. } => SchemaNode::List {
            element: Box::new(derive_readonly(element)),
            readonly: true,
        },
        SchemaNode::Record { fields } => SchemaNode::Record {
            fields: map_fields(fields, |field| Field {
                value_type: derive_readonly(&field.value_type),
                readonly: true,
                optional: field.optional,
            }),
        },
        SchemaNode::Union { discriminator, variants } => SchemaNode::Union {
            discriminator: discriminator.clone(),
            variants: map_variants(variants, |field| Field {
                value_type: derive_readonly(&field.value_type),
                readonly: true,
                optional: field.optional,
            }),
        },
    }
}

/// Every field becomes `optional = true`, at every depth: partial-ness
/// propagates through nullables and list elements into nested records and
/// unions. `readonly` flags are untouched.
pub fn derive_partial(node: &SchemaNode) -> SchemaNode {
    match node {
        SchemaNode::Literal { .. } => node.clone(),
        SchemaNode::Nullable { value } => SchemaNode::Nullable {
            value: Box::new(derive_partial(value)),
        },
        SchemaNode::List { element, readonly } => SchemaNode::List {
            element: Box::new(derive_partial(element)),
            readonly: *readonly,
        },
        SchemaNode::Record { fields } => SchemaNode::Record {
            fields: map_fields(fields, |field| Field {
                value_type: derive_partial(&field.value_type),
                readonly: field.readonly,
                optional: true,
            }),
        },
        SchemaNode::Union { discriminator, variants } => SchemaNode::Union {
            discriminator: discriminator.clone(),
            variants: map_variants(variants, |field| Field {
                value_type: derive_partial(&field.value_type),
                readonly: field.readonly,
                optional: true,
            }),
        },
    }
}

/// Shallow variant of [`derive_partial`]: only the immediate field sets of
/// the outermost record or union become optional; the field value types are
/// not transformed. `Nullable` is transparent (it has no structure of its
/// own); lists and literals pass through unchanged.
pub fn derive_optional(node: &SchemaNode) -> SchemaNode {
    match node {
        SchemaNode::Literal { .. } | SchemaNode::List { .. } => node.clone(),
        SchemaNode::Nullable { value } => SchemaNode::Nullable {
            value: Box::new(derive_optional(value)),
        },
        SchemaNode::Record { fields } => SchemaNode::Record {
            fields: map_fields(fields, |field| Field {
                value_type: field.value_type.clone(),
                readonly: field.readonly,
                optional: true,
            }),
        },
        SchemaNode::Union { discriminator, variants } => SchemaNode::Union {
            discriminator: discriminator.clone(),
            variants: map_variants(variants, |field| Field {
                value_type: field.value_type.clone(),
                readonly: field.readonly,
                optional: true,
            }),
        },
    }
}

fn map_fields(
    fields: &IndexMap<String, Field>,
    f: impl Fn(&Field) -> Field,
) -> IndexMap<String, Field> {
    fields.iter().map(|(name, field)| (name.clone(), f(field))).collect()
}

fn map_variants(
    variants: &IndexMap<String, IndexMap<String, Field>>,
    f: impl Fn(&Field) -> Field,
) -> IndexMap<String, IndexMap<String, Field>> {
    variants
        .iter()
        .map(|(key, fields)| (key.clone(), map_fields(fields, &f)))
        .collect()
}

// ------------------------------- Tests ------------------------------------ //
