//! Descriptor facade: the minimal shape vocabulary application code uses to
//! declare a concrete data model and build observable instances of it.
//!
//! This is deliberately a parallel, smaller vocabulary — not a wrapper over
//! [`crate::schema::SchemaNode`]. No unions, no derived shapes, no path
//! flattening: one operation, `create`, over four shapes. The only seam it
//! shares with the full engine is the injected [`Observe`] capability.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::capability::Observe;

#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    /// Opaque passthrough.
    Literal,
    /// Ordered sequence; every element goes through the element descriptor
    /// and the rebuilt sequence is marked observable.
    List(Box<Descriptor>),
    /// Present-or-absent; `null` (and kind-mismatched input) maps to absent.
    Optional(Box<Descriptor>),
    /// Named sub-descriptors; the rebuilt object is marked observable.
    Record(IndexMap<String, Descriptor>),
}

impl Descriptor {
    pub fn list(element: Descriptor) -> Self {
        Descriptor::List(Box::new(element))
    }

    pub fn optional(inner: Descriptor) -> Self {
        Descriptor::Optional(Box::new(inner))
    }

    pub fn record<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Descriptor)>,
    {
        Descriptor::Record(fields.into_iter().map(|(k, d)| (k.to_string(), d)).collect())
    }

    /// Build a mutable instance from a prototype value. `None` means absent
    /// (an optional hole, or a prototype that does not fit this shape).
    pub fn create(&self, prototype: &Value, observe: &dyn Observe) -> Option<Value> {
        match self {
            Descriptor::Literal => Some(prototype.clone()),
            Descriptor::Optional(inner) => {
                if prototype.is_null() {
                    None
                } else {
                    inner.create(prototype, observe)
                }
            }
            Descriptor::List(element) => {
                let items = prototype.as_array()?;
                let built = items
                    .iter()
                    .filter_map(|item| element.create(item, observe))
                    .collect();
                Some(observe.track(Value::Array(built)))
            }
            Descriptor::Record(fields) => {
                let src = prototype.as_object()?;
                let mut built = Map::new();
                for (name, descriptor) in fields {
                    let value = src.get(name).unwrap_or(&Value::Null);
                    if let Some(v) = descriptor.create(value, observe) {
                        built.insert(name.clone(), v);
                    }
                }
                Some(observe.track(Value::Object(built)))
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::NoopObserve;
    use serde_json::json;
    use std::cell::RefCell;

    fn document() -> Descriptor {
        Descriptor::record([
            ("title", Descriptor::Literal),
            (
                "channels",
                Descriptor::list(Descriptor::record([
                    ("name", Descriptor::Literal),
                    ("gain", Descriptor::optional(Descriptor::Literal)),
                ])),
            ),
        ])
    }

    #[test]
    fn create_rebuilds_the_prototype_shape() {
        let built = document()
            .create(
                &json!({"title": "mix", "channels": [{"name": "L", "gain": 0.5}]}),
                &NoopObserve,
            )
            .unwrap();
        assert_eq!(
            built,
            json!({"title": "mix", "channels": [{"name": "L", "gain": 0.5}]})
        );
    }

    #[test]
    fn optional_holes_stay_absent() {
        let built = document()
            .create(
                &json!({"title": "t", "channels": [{"name": "L", "gain": null}]}),
                &NoopObserve,
            )
            .unwrap();
        assert_eq!(built, json!({"title": "t", "channels": [{"name": "L"}]}));
    }

    struct Counting(RefCell<usize>);

    impl Observe for Counting {
        fn track(&self, value: Value) -> Value {
            *self.0.borrow_mut() += 1;
            value
        }
    }

    #[test]
    fn every_list_and_record_container_is_tracked() {
        let observer = Counting(RefCell::new(0));
        let _ = document()
            .create(
                &json!({"title": "t", "channels": [{"name": "L"}, {"name": "R"}]}),
                &observer,
            )
            .unwrap();
        // two channel records, the channel list, the document record
        assert_eq!(*observer.0.borrow(), 4);
    }

    #[test]
    fn kind_mismatch_means_absent_not_fault() {
        assert_eq!(document().create(&json!(42), &NoopObserve), None);
        let inner = Descriptor::optional(Descriptor::record([("x", Descriptor::Literal)]));
        assert_eq!(inner.create(&json!("nope"), &NoopObserve), None);
    }
}
