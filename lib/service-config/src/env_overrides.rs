use config::{builder::BuilderState, ConfigBuilder, ConfigError};
use envconfig::Envconfig;
use tracing::debug;

use crate::{
    log::{LogFormat, LogLevel},
    telemetry::{
        metrics::{MetricsExporterConfig, MetricsOtlpConfig},
        tracing::{TracingExporterConfig, TracingOtlpConfig},
        OtlpProtocol, TelemetryConfig,
    },
};

#[derive(Envconfig)]
pub struct EnvVarOverrides {
    // Logger overrides
    #[envconfig(from = "LOG_LEVEL")]
    pub log_level: Option<LogLevel>,
    #[envconfig(from = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
    #[envconfig(from = "LOG_FILTER")]
    pub log_filter: Option<String>,

    // HTTP overrides
    #[envconfig(from = "PORT")]
    pub http_port: Option<u64>,
    #[envconfig(from = "HOST")]
    pub http_host: Option<String>,

    // Storage overrides
    #[envconfig(from = "CLICKHOUSE_URL")]
    pub clickhouse_url: Option<String>,
    #[envconfig(from = "CLICKHOUSE_HOST")]
    pub clickhouse_host: Option<String>,
    #[envconfig(from = "CLICKHOUSE_PORT")]
    pub clickhouse_port: Option<u16>,
    #[envconfig(from = "CLICKHOUSE_USER")]
    pub clickhouse_user: Option<String>,
    #[envconfig(from = "CLICKHOUSE_PASSWORD")]
    pub clickhouse_password: Option<String>,
    #[envconfig(from = "CLICKHOUSE_DATABASE")]
    pub clickhouse_database: Option<String>,

    // Telemetry overrides
    #[envconfig(from = "SERVICE_NAME")]
    pub service_name: Option<String>,
    #[envconfig(from = "REQUESTS_TOTAL_DESCRIPTION")]
    pub requests_total_description: Option<String>,
    #[envconfig(from = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
    #[envconfig(from = "OTEL_EXPORTER_OTLP_PROTOCOL")]
    pub otlp_protocol: Option<OtlpProtocol>,
    #[envconfig(from = "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT")]
    pub otlp_traces_endpoint: Option<String>,
    #[envconfig(from = "OTEL_EXPORTER_OTLP_TRACES_PROTOCOL")]
    pub otlp_traces_protocol: Option<OtlpProtocol>,
    #[envconfig(from = "OTEL_EXPORTER_OTLP_METRICS_ENDPOINT")]
    pub otlp_metrics_endpoint: Option<String>,
    #[envconfig(from = "OTEL_EXPORTER_OTLP_METRICS_PROTOCOL")]
    pub otlp_metrics_protocol: Option<OtlpProtocol>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvVarOverridesError {
    #[error("Failed to override configuration: {0}")]
    FailedToOverrideConfig(#[from] ConfigError),
    #[error("Cannot override storage due to conflict: CLICKHOUSE_URL and CLICKHOUSE_HOST cannot be used together")]
    ConflictingClickHouseAddress,
    #[error("Missing required environment variable: {0}")]
    MissingRequiredEnvVar(&'static str),
}

impl EnvVarOverrides {
    pub fn apply_overrides<T: BuilderState>(
        &mut self,
        mut config: ConfigBuilder<T>,
    ) -> Result<ConfigBuilder<T>, EnvVarOverridesError> {
        if let Some(log_level) = self.log_level.take() {
            debug!("[config-override] 'log.level' = {:?}", log_level);
            config = config.set_override("log.level", log_level.as_str())?;
        }
        if let Some(log_format) = self.log_format.take() {
            debug!("[config-override] 'log.format' = {:?}", log_format);
            config = config.set_override("log.format", log_format.as_str())?;
        }
        if let Some(log_filter) = self.log_filter.take() {
            debug!("[config-override] 'log.filter' = {:?}", log_filter);
            config = config.set_override("log.filter", log_filter)?;
        }

        if let Some(http_port) = self.http_port.take() {
            debug!("[config-override] 'http.port' = {}", http_port);
            config = config.set_override("http.port", http_port)?;
        }
        if let Some(http_host) = self.http_host.take() {
            debug!("[config-override] 'http.host' = {}", http_host);
            config = config.set_override("http.host", http_host)?;
        }

        config = self.apply_storage_overrides(config)?;

        if let Some(service_name) = self.service_name.take() {
            debug!("[config-override] 'telemetry.service.name' = {}", service_name);
            config = config.set_override("telemetry.service.name", service_name)?;
        }
        if let Some(description) = self.requests_total_description.take() {
            config = config
                .set_override("telemetry.metrics.requests_total_description", description)?;
        }

        Ok(config)
    }

    fn apply_storage_overrides<T: BuilderState>(
        &mut self,
        mut config: ConfigBuilder<T>,
    ) -> Result<ConfigBuilder<T>, EnvVarOverridesError> {
        if self.clickhouse_url.is_some() && self.clickhouse_host.is_some() {
            return Err(EnvVarOverridesError::ConflictingClickHouseAddress);
        }

        let url = match (self.clickhouse_url.take(), self.clickhouse_host.take()) {
            (Some(url), None) => Some(url),
            (None, Some(host)) => {
                let port = self.clickhouse_port.take().unwrap_or(8123);
                Some(format!("http://{host}:{port}"))
            }
            _ => None,
        };

        let Some(url) = url else {
            if self.clickhouse_port.is_some() {
                return Err(EnvVarOverridesError::MissingRequiredEnvVar(
                    "CLICKHOUSE_HOST",
                ));
            }
            return Ok(config);
        };

        debug!("[config-override] 'storage.url' = {}", url);
        config = config.set_override("storage.kind", "clickhouse")?;
        config = config.set_override("storage.url", url)?;

        if let Some(user) = self.clickhouse_user.take() {
            config = config.set_override("storage.user", user)?;
        }
        if let Some(password) = self.clickhouse_password.take() {
            config = config.set_override("storage.password", password)?;
        }
        if let Some(database) = self.clickhouse_database.take() {
            config = config.set_override("storage.database", database)?;
        }

        Ok(config)
    }

    /// Exporter lists cannot be expressed as flat overrides, so they are patched
    /// onto the deserialized configuration instead.
    ///
    /// A signal-specific variable wins over `OTEL_EXPORTER_OTLP_*`, and an
    /// override replaces every exporter configured for that signal in the file.
    pub fn apply_telemetry_overrides(&mut self, telemetry: &mut TelemetryConfig) {
        let default_protocol = self.otlp_protocol.take();

        let traces_endpoint = self
            .otlp_traces_endpoint
            .take()
            .or_else(|| self.otlp_endpoint.clone());
        if let Some(endpoint) = traces_endpoint {
            let protocol = self
                .otlp_traces_protocol
                .take()
                .or(default_protocol)
                .unwrap_or(OtlpProtocol::Grpc);
            debug!(
                "[config-override] 'telemetry.tracing.exporters' = otlp {:?} {}",
                protocol, endpoint
            );
            telemetry.tracing.exporters = vec![TracingExporterConfig::Otlp(
                TracingOtlpConfig::new(endpoint, protocol),
            )];
        }

        let metrics_endpoint = self
            .otlp_metrics_endpoint
            .take()
            .or_else(|| self.otlp_endpoint.take());
        if let Some(endpoint) = metrics_endpoint {
            let protocol = self
                .otlp_metrics_protocol
                .take()
                .or(default_protocol)
                .unwrap_or(OtlpProtocol::Grpc);
            debug!(
                "[config-override] 'telemetry.metrics.exporters' = otlp {:?} {}",
                protocol, endpoint
            );
            telemetry.metrics.exporters = vec![MetricsExporterConfig::Otlp(
                MetricsOtlpConfig::new(endpoint, protocol),
            )];
        }
    }
}
