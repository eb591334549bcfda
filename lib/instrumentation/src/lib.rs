//! Request instrumentation for asynchronous service handlers.
//!
//! [`Instrumented`] wraps any [`Handler`] and, for every call, opens a server
//! span named after the handling service and request type, derives a flat set
//! of string attributes from the request, counts the call, and records how it
//! ended: success, an error status reported through the [`CallContext`] side
//! channel, or a fault returned (or panicked) by the handler.
pub mod attributes;
pub mod catalog;
pub mod counter;
pub mod introspect;
pub mod naming;
pub mod outcome;
pub mod status;
pub mod telemetry;
pub mod wrapper;

pub use attributes::{dynamic_attributes, AttributeSet};
pub use counter::{CounterSink, RequestMetrics};
pub use introspect::{
    FieldDescriptor, FieldValue, Introspect, Introspection, MessageDescriptor,
    SchemaIntrospectable,
};
pub use naming::dynamic_span_name;
pub use outcome::{classify, CallOutcome};
pub use status::{CallContext, CallStatus, StatusCode};
pub use telemetry::{error::TelemetryError, Telemetry};
pub use wrapper::{wrap, Handler, Instrumented};

pub use opentelemetry;
pub use opentelemetry_sdk;
