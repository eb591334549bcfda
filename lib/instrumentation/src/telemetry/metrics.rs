use opentelemetry_otlp::{MetricExporter, Protocol, WithExportConfig, WithHttpConfig, WithTonicConfig};
use opentelemetry_sdk::{
    metrics::{
        exporter::PushMetricExporter, periodic_reader_with_async_runtime::PeriodicReader,
        SdkMeterProvider,
    },
    runtime, Resource,
};
use user_service_config::telemetry::{
    metrics::{MetricsExporterConfig, MetricsOtlpConfig},
    OtlpProtocol, TelemetryConfig,
};

use crate::telemetry::{error::TelemetryError, traces::build_metadata};

/// A meter provider that exports through every enabled OTLP exporter, or
/// keeps measurements in-process when none is configured.
pub(super) fn build_meter_provider(
    config: &TelemetryConfig,
    resource: Resource,
) -> Result<SdkMeterProvider, TelemetryError> {
    let mut builder = SdkMeterProvider::builder().with_resource(resource);

    for exporter_config in &config.metrics.exporters {
        match exporter_config {
            MetricsExporterConfig::Otlp(otlp) if otlp.enabled => {
                builder = builder.with_reader(build_otlp_reader(otlp)?);
            }
            MetricsExporterConfig::Otlp(_) => {}
        }
    }

    Ok(builder.build())
}

fn build_otlp_reader(
    otlp_config: &MetricsOtlpConfig,
) -> Result<PeriodicReader<impl PushMetricExporter>, TelemetryError> {
    let exporter = build_otlp_exporter(otlp_config)?;

    // The async-runtime reader keeps exports on tokio, which the tonic and
    // reqwest clients require.
    Ok(
        PeriodicReader::builder(exporter, runtime::TokioCurrentThread)
            .with_interval(otlp_config.interval)
            .with_timeout(otlp_config.max_export_timeout)
            .build(),
    )
}

fn build_otlp_exporter(otlp_config: &MetricsOtlpConfig) -> Result<MetricExporter, TelemetryError> {
    match otlp_config.protocol {
        OtlpProtocol::Grpc => MetricExporter::builder()
            .with_tonic()
            .with_endpoint(otlp_config.endpoint.clone())
            .with_timeout(otlp_config.max_export_timeout)
            .with_metadata(build_metadata(&otlp_config.headers)?)
            .build()
            .map_err(|err| TelemetryError::MetricsExporterSetup(err.to_string())),
        OtlpProtocol::Http => MetricExporter::builder()
            .with_http()
            .with_endpoint(otlp_config.endpoint.clone())
            .with_timeout(otlp_config.max_export_timeout)
            .with_headers(otlp_config.headers.clone())
            .with_protocol(Protocol::HttpBinary)
            .build()
            .map_err(|err| TelemetryError::MetricsExporterSetup(err.to_string())),
    }
}
