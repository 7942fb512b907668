//! Structural type descriptions over JSON values.
//!
//! One canonical schema tree (five node kinds: literal, nullable, list,
//! record, discriminated union) drives everything else:
//! - sibling shapes derived on demand (readonly / partial / optional);
//! - runtime conformance checks of concrete values;
//! - flattening of a schema or a value into every addressable dotted path,
//!   with point-mutation handles;
//! - instantiation strategies (copy, frozen, observable) and in-place
//!   reconciliation of a target value toward a prototype.
//!
//! Design goals:
//! - Pure, synchronous tree walks; no I/O, no hidden state, no caching.
//! - Exhaustive match over a closed node set; the compiler owns dispatch.
//! - Schema trees are validated once at construction (depth-bounded) so
//!   every later walk is total.
//! - Reactive systems stay injected behind the [`capability::Observe`] seam.

pub mod capability;
pub mod cli;
pub mod conform;
pub mod derive;
pub mod descriptor;
pub mod flatten;
pub mod instantiate;
pub mod paths;
pub mod reconcile;
pub mod schema;

pub use capability::{NoopObserve, Observe};
pub use conform::{conform, conforms, ConformError};
pub use derive::{derive_optional, derive_partial, derive_readonly};
pub use descriptor::Descriptor;
pub use flatten::{
    flatten_types, flatten_values, flatten_values_mut, FlatValue, FlatValueMut, SetValue,
};
pub use instantiate::{
    instantiate_copy, instantiate_frozen, instantiate_observable, instantiate_with,
    CopyInstantiator, Frozen, Instantiator, ObservableInstantiator,
};
pub use paths::{PathError, Segment, ValuePath, DEFAULT_WILDCARD};
pub use reconcile::reconcile;
pub use schema::{Field, Leaf, SchemaError, SchemaNode, MAX_SCHEMA_DEPTH};
