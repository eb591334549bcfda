//! Builds the tracer and meter providers from configuration and owns them
//! for the lifetime of the process. Nothing here touches the global
//! OpenTelemetry providers; callers pass the tracer and meter on explicitly.
use opentelemetry::{
    metrics::{Meter, MeterProvider},
    trace::TracerProvider,
    InstrumentationScope, KeyValue,
};
use opentelemetry_sdk::{
    metrics::SdkMeterProvider,
    trace::{self, SdkTracerProvider},
    Resource,
};
use tracing::warn;
use user_service_config::telemetry::TelemetryConfig;

use crate::counter::RequestMetrics;
use crate::telemetry::error::TelemetryError;

pub mod error;
mod metrics;
mod traces;

const SCOPE_NAME: &str = "user-service.instrumentation";

#[derive(Clone)]
pub struct Telemetry {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
    requests_total_description: String,
}

impl Telemetry {
    pub fn from_config(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let resource = Resource::builder()
            .with_attributes([KeyValue::new("service.name", config.service.name.clone())])
            .build();

        Ok(Self {
            tracer_provider: traces::build_trace_provider(config, resource.clone())?,
            meter_provider: metrics::build_meter_provider(config, resource)?,
            requests_total_description: config.metrics.requests_total_description.clone(),
        })
    }

    fn scope() -> InstrumentationScope {
        InstrumentationScope::builder(SCOPE_NAME)
            .with_version(env!("CARGO_PKG_VERSION"))
            .build()
    }

    pub fn tracer(&self) -> trace::Tracer {
        self.tracer_provider.tracer_with_scope(Self::scope())
    }

    pub fn meter(&self) -> Meter {
        self.meter_provider.meter_with_scope(Self::scope())
    }

    pub fn request_metrics(&self) -> RequestMetrics {
        RequestMetrics::new(&self.meter(), &self.requests_total_description)
    }

    /// Flushes and stops both providers. Shutdown blocks on pending exports,
    /// so it runs on the blocking pool.
    pub async fn graceful_shutdown(&self) {
        use tokio::task::spawn_blocking;

        let tracer_provider = self.tracer_provider.clone();
        let shutdown_tracer = spawn_blocking(move || {
            if let Err(err) = tracer_provider.shutdown() {
                warn!(error = %err, "failed to shut down the tracer provider");
            }
        });

        let meter_provider = self.meter_provider.clone();
        let shutdown_meter = spawn_blocking(move || {
            if let Err(err) = meter_provider.shutdown() {
                warn!(error = %err, "failed to shut down the meter provider");
            }
        });

        let _ = tokio::join!(shutdown_tracer, shutdown_meter);
    }
}
