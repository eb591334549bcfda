use std::collections::HashMap;
use std::str::FromStr;

use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig, WithHttpConfig, WithTonicConfig};
use opentelemetry_sdk::{
    trace::{
        self, BatchConfigBuilder, BatchSpanProcessor, Sampler, SdkTracerProvider,
        TracerProviderBuilder,
    },
    Resource,
};
use tonic::metadata::{MetadataKey, MetadataMap};
use user_service_config::telemetry::{
    tracing::{BatchProcessorConfig, TracingExporterConfig, TracingOtlpConfig},
    OtlpProtocol, TelemetryConfig,
};

use crate::telemetry::error::TelemetryError;

pub(super) fn build_trace_provider(
    config: &TelemetryConfig,
    resource: Resource,
) -> Result<SdkTracerProvider, TelemetryError> {
    let sampling = config.tracing.sampling;
    if !(0.0..=1.0).contains(&sampling) {
        return Err(TelemetryError::InvalidSampling(sampling));
    }

    let base_sampler = Sampler::TraceIdRatioBased(sampling);
    let mut builder = TracerProviderBuilder::default().with_resource(resource);

    if config.tracing.parent_based_sampler {
        builder = builder.with_sampler(Sampler::ParentBased(Box::new(base_sampler)));
    } else {
        builder = builder.with_sampler(base_sampler);
    }

    Ok(setup_exporters(config, builder)?.build())
}

fn setup_exporters(
    config: &TelemetryConfig,
    mut tracer_provider_builder: TracerProviderBuilder,
) -> Result<TracerProviderBuilder, TelemetryError> {
    for exporter_config in &config.tracing.exporters {
        match exporter_config {
            TracingExporterConfig::Otlp(otlp_config) if otlp_config.enabled => {
                let exporter = build_otlp_exporter(otlp_config)?;
                tracer_provider_builder = tracer_provider_builder.with_span_processor(
                    build_batched_span_processor(&otlp_config.batch_processor, exporter),
                );
            }
            TracingExporterConfig::Otlp(_) => {}
        }
    }

    Ok(tracer_provider_builder)
}

fn build_otlp_exporter(otlp_config: &TracingOtlpConfig) -> Result<SpanExporter, TelemetryError> {
    match otlp_config.protocol {
        OtlpProtocol::Grpc => SpanExporter::builder()
            .with_tonic()
            .with_endpoint(otlp_config.endpoint.clone())
            .with_timeout(otlp_config.batch_processor.max_export_timeout)
            .with_metadata(build_metadata(&otlp_config.headers)?)
            .build()
            .map_err(|e| TelemetryError::SpanExporterSetup(e.to_string())),
        OtlpProtocol::Http => SpanExporter::builder()
            .with_http()
            .with_endpoint(otlp_config.endpoint.clone())
            .with_timeout(otlp_config.batch_processor.max_export_timeout)
            .with_headers(otlp_config.headers.clone())
            .with_protocol(Protocol::HttpBinary)
            .build()
            .map_err(|e| TelemetryError::SpanExporterSetup(e.to_string())),
    }
}

fn build_batched_span_processor(
    config: &BatchProcessorConfig,
    exporter: impl trace::SpanExporter + 'static,
) -> BatchSpanProcessor {
    BatchSpanProcessor::builder(exporter)
        .with_batch_config(
            BatchConfigBuilder::default()
                .with_max_export_batch_size(config.max_export_batch_size as usize)
                .with_max_queue_size(config.max_queue_size as usize)
                .with_scheduled_delay(config.scheduled_delay)
                .build(),
        )
        .build()
}

pub(super) fn build_metadata(
    entries: &HashMap<String, String>,
) -> Result<MetadataMap, TelemetryError> {
    entries.iter().try_fold(
        MetadataMap::with_capacity(entries.len()),
        |mut metadata, (name, value)| {
            // gRPC metadata keys must be lowercase
            let key = MetadataKey::from_str(&name.to_lowercase()).map_err(|e| {
                TelemetryError::Internal(format!("invalid OTLP metadata key '{name}': {e}"))
            })?;
            metadata.insert(
                key,
                value.as_str().parse().map_err(|e| {
                    TelemetryError::Internal(format!(
                        "invalid OTLP metadata value for '{name}': {e}"
                    ))
                })?,
            );
            Ok(metadata)
        },
    )
}
