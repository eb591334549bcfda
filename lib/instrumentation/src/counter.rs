use std::sync::Arc;

use opentelemetry::{
    metrics::{Counter, Meter},
    KeyValue,
};

use crate::catalog::names;

/// Monotonic per-call counter, labelled with the call attributes.
pub trait CounterSink: Send + Sync {
    fn increment(&self, attributes: &[KeyValue]);
}

impl CounterSink for Counter<u64> {
    fn increment(&self, attributes: &[KeyValue]) {
        self.add(1, attributes);
    }
}

impl<C: CounterSink + ?Sized> CounterSink for Arc<C> {
    fn increment(&self, attributes: &[KeyValue]) {
        (**self).increment(attributes);
    }
}

/// The `requests_total` instrument.
#[derive(Clone)]
pub struct RequestMetrics {
    requests_total: Counter<u64>,
}

impl RequestMetrics {
    pub fn new(meter: &Meter, description: &str) -> Self {
        let requests_total = meter
            .u64_counter(names::REQUESTS_TOTAL)
            .with_unit("1")
            .with_description(description.to_string())
            .build();

        Self { requests_total }
    }
}

impl CounterSink for RequestMetrics {
    fn increment(&self, attributes: &[KeyValue]) {
        self.requests_total.add(1, attributes);
    }
}
