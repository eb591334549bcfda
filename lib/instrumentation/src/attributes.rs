use indexmap::IndexMap;
use opentelemetry::KeyValue;
use tracing::debug;

use crate::catalog::{labels, values};
use crate::introspect::{Introspect, Introspection};

/// Ordered string attributes describing one call.
///
/// Values are never empty placeholders: anything absent is stored as
/// [`values::UNKNOWN`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet(IndexMap<String, String>);

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_key_values(&self) -> Vec<KeyValue> {
        self.0
            .iter()
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = AttributeSet::new();
        for (key, value) in iter {
            set.insert(key, value);
        }
        set
    }
}

/// Derives the attributes of a call from the handling service and the request.
///
/// The set always starts with `endpoint = "<service>.<RequestType>"`, followed
/// by every field (schematized requests, declaration order) or property (plain
/// objects). A field that is itself named `endpoint` replaces the synthesized
/// value.
pub fn dynamic_attributes<R>(service_name: &str, request: &R) -> AttributeSet
where
    R: Introspect + ?Sized,
{
    let introspection = request.introspect();
    let mut attributes = AttributeSet::new();

    attributes.insert(
        labels::ENDPOINT,
        format!("{}.{}", service_name, introspection.short_name()),
    );

    match introspection {
        Introspection::Schema(message) => {
            for field in message.descriptor().fields {
                let value = message
                    .field_value(field)
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| values::UNKNOWN.to_string());
                merge(&mut attributes, field.name, value);
            }
        }
        Introspection::Generic(object) => {
            for (name, value) in object.properties() {
                merge(
                    &mut attributes,
                    &name,
                    value.unwrap_or_else(|| values::UNKNOWN.to_string()),
                );
            }
        }
    }

    attributes
}

fn merge(attributes: &mut AttributeSet, key: &str, value: String) {
    if let Some(previous) = attributes.insert(key, value) {
        debug!(
            attribute = key,
            replaced = %previous,
            "request field overrides a derived attribute"
        );
    }
}
