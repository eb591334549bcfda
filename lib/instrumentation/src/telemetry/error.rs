#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("internal error: {0}")]
    Internal(String),
    #[error("unable to configure span exporter: {0}")]
    SpanExporterSetup(String),
    #[error("unable to configure metrics exporter: {0}")]
    MetricsExporterSetup(String),
    #[error("invalid sampling ratio {0}, expected a value between 0.0 and 1.0")]
    InvalidSampling(f64),
}
