use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt as _;
use opentelemetry::{
    trace::{FutureExt as _, SpanBuilder, SpanKind, Status, TraceContextExt, Tracer},
    Context,
};
use tracing::debug;

use crate::attributes::{dynamic_attributes, AttributeSet};
use crate::counter::CounterSink;
use crate::introspect::Introspect;
use crate::naming::dynamic_span_name;
use crate::outcome::{classify, record_fault, record_outcome, record_panic};
use crate::status::CallContext;

/// An asynchronous endpoint handler.
///
/// Application-level failures are reported through the [`CallContext`] while
/// still returning a response. `Err` is reserved for faults.
#[async_trait]
pub trait Handler<Req>: Send + Sync
where
    Req: Send + 'static,
{
    type Response: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    fn service_name(&self) -> &str;

    async fn call(
        &self,
        request: Req,
        context: Option<&CallContext>,
    ) -> Result<Self::Response, Self::Error>;
}

#[async_trait]
impl<H, Req> Handler<Req> for Arc<H>
where
    H: Handler<Req> + ?Sized,
    Req: Send + 'static,
{
    type Response = H::Response;
    type Error = H::Error;

    fn service_name(&self) -> &str {
        (**self).service_name()
    }

    async fn call(
        &self,
        request: Req,
        context: Option<&CallContext>,
    ) -> Result<Self::Response, Self::Error> {
        (**self).call(request, context).await
    }
}

pub type SpanNameFn<Req> = fn(&str, &Req) -> String;
pub type AttributesFn<Req> = fn(&str, &Req) -> AttributeSet;

/// A handler with tracing and the request counter attached.
///
/// Every call opens one server span carrying the derived attributes, bumps the
/// counter once with the same attributes, and closes the span exactly once
/// whatever the outcome, including when the call future is dropped midway.
pub struct Instrumented<H, Req, T, C> {
    inner: H,
    tracer: T,
    counter: C,
    span_name: SpanNameFn<Req>,
    attributes: AttributesFn<Req>,
}

/// Wraps `handler` with explicit naming and attribute functions.
pub fn wrap<H, Req, T, C>(
    tracer: T,
    counter: C,
    span_name: SpanNameFn<Req>,
    attributes: AttributesFn<Req>,
    handler: H,
) -> Instrumented<H, Req, T, C> {
    Instrumented {
        inner: handler,
        tracer,
        counter,
        span_name,
        attributes,
    }
}

impl<H, Req, T, C> Instrumented<H, Req, T, C>
where
    Req: Introspect,
{
    /// Wraps `handler` with span names and attributes derived from the request.
    pub fn new(handler: H, tracer: T, counter: C) -> Self {
        wrap(
            tracer,
            counter,
            dynamic_span_name::<Req>,
            dynamic_attributes::<Req>,
            handler,
        )
    }
}

#[async_trait]
impl<H, Req, T, C> Handler<Req> for Instrumented<H, Req, T, C>
where
    H: Handler<Req>,
    Req: Send + 'static,
    T: Tracer + Send + Sync,
    T::Span: Send + Sync + 'static,
    C: CounterSink,
{
    type Response = H::Response;
    type Error = H::Error;

    fn service_name(&self) -> &str {
        self.inner.service_name()
    }

    async fn call(
        &self,
        request: Req,
        context: Option<&CallContext>,
    ) -> Result<Self::Response, Self::Error> {
        let service_name = self.inner.service_name();
        let span_name = (self.span_name)(service_name, &request);
        let labels = (self.attributes)(service_name, &request).to_key_values();

        let span = self.tracer.build_with_context(
            SpanBuilder::from_name(span_name.clone())
                .with_kind(SpanKind::Server)
                .with_attributes(labels.clone()),
            &Context::current(),
        );
        let active = ActiveCall::new(Context::current_with_span(span));

        self.counter.increment(&labels);
        debug!(span = %span_name, "handler call started");

        let result = AssertUnwindSafe(self.inner.call(request, context))
            .catch_unwind()
            .with_context(active.cx.clone())
            .await;

        match result {
            Ok(Ok(response)) => {
                record_outcome(&active.cx.span(), &span_name, &classify(context));
                active.settle();
                Ok(response)
            }
            Ok(Err(fault)) => {
                record_fault(&active.cx.span(), &span_name, &fault);
                active.settle();
                Err(fault)
            }
            Err(payload) => {
                record_panic(&active.cx.span(), &span_name, &*payload);
                active.settle();
                std::panic::resume_unwind(payload)
            }
        }
    }
}

/// Owns the span of an in-flight call and ends it when dropped.
struct ActiveCall {
    cx: Context,
    settled: bool,
}

impl ActiveCall {
    fn new(cx: Context) -> Self {
        Self { cx, settled: false }
    }

    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for ActiveCall {
    fn drop(&mut self) {
        let span = self.cx.span();
        if !self.settled {
            span.set_status(Status::error("call cancelled"));
            debug!("handler call dropped before completion");
        }
        span.end();
    }
}
