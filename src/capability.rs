//! Injected observability seam.
//!
//! The engine never picks a reactive system. Whoever wants observable
//! instances hands in an [`Observe`] implementation; the engine decides
//! *which* containers to mark (lists, records, union variants — never
//! literal leaves, never anything behind a readonly field) and the
//! capability decides *how*.

use serde_json::Value;

/// Marks a freshly built plain container as trackable for some external
/// reactive system, returning the value to splice into its parent (usually
/// the input, possibly wrapped or registered elsewhere).
pub trait Observe {
    fn track(&self, value: Value) -> Value;
}

/// Passthrough capability for call sites that need the observable code path
/// without a reactive system attached.
pub struct NoopObserve;

impl Observe for NoopObserve {
    fn track(&self, value: Value) -> Value {
        value
    }
}
