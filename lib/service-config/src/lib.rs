mod env_overrides;
pub mod http_server;
pub mod log;
pub mod storage;
pub mod telemetry;

use std::convert::Infallible;
use std::path::PathBuf;

use config::{Config, File, FileFormat, FileSourceFile};
use envconfig::Envconfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    env_overrides::{EnvVarOverrides, EnvVarOverridesError},
    http_server::HttpServerConfig,
    log::LoggingConfig,
    storage::StorageConfig,
    telemetry::TelemetryConfig,
};

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct UserServiceConfig {
    /// The service logger configuration.
    ///
    /// Defaults to `info` in release builds, and prints only important messages, warnings, and errors.
    #[serde(default)]
    pub log: LoggingConfig,

    /// Configuration for the listener serving the `UserService` endpoints and the probes.
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Where user records live. Defaults to process-local memory.
    #[serde(default)]
    #[schemars(extend("type" = "object"))]
    pub storage: StorageConfig,

    /// Tracing and metrics.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to apply configuration overrides: {0}")]
    EnvVarOverridesError(#[from] EnvVarOverridesError),
    #[error("Failed to load the environment variables: {0}")]
    EnvVarLoadError(#[from] envconfig::Error),
    #[error("Failed to parse the configuration file path: {0}")]
    ConfigPathParseError(Infallible),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "service.config.yaml",
    "service.config.yml",
    "service.config.json",
    "service.config.json5",
];

pub fn load_config(
    override_config_path: Option<String>,
) -> Result<UserServiceConfig, ServiceConfigError> {
    let mut env_overrides = EnvVarOverrides::init_from_env()?;
    let mut config = Config::builder();

    if let Some(path_str) = override_config_path {
        let path_buf = path_str
            .parse::<PathBuf>()
            .map_err(ServiceConfigError::ConfigPathParseError)?;
        let as_file: File<FileSourceFile, _> = path_buf.into();

        config = config.add_source(as_file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    config = env_overrides.apply_overrides(config)?;

    let mut service_config = config.build()?.try_deserialize::<UserServiceConfig>()?;
    env_overrides.apply_telemetry_overrides(&mut service_config.telemetry);

    Ok(service_config)
}

pub fn parse_yaml_config(config_raw: &str) -> Result<UserServiceConfig, ServiceConfigError> {
    Config::builder()
        .add_source(File::from_str(config_raw, FileFormat::Yaml))
        .build()?
        .try_deserialize::<UserServiceConfig>()
        .map_err(ServiceConfigError::ConfigLoadError)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{
        env_overrides::EnvVarOverrides,
        log::{LogFormat, LogLevel},
        parse_yaml_config,
        storage::StorageConfig,
        telemetry::{
            metrics::MetricsExporterConfig, tracing::TracingExporterConfig, OtlpProtocol,
            TelemetryConfig,
        },
        UserServiceConfig,
    };

    fn empty_overrides() -> EnvVarOverrides {
        EnvVarOverrides {
            log_level: None,
            log_format: None,
            log_filter: None,
            http_port: None,
            http_host: None,
            clickhouse_url: None,
            clickhouse_host: None,
            clickhouse_port: None,
            clickhouse_user: None,
            clickhouse_password: None,
            clickhouse_database: None,
            service_name: None,
            requests_total_description: None,
            otlp_endpoint: None,
            otlp_protocol: None,
            otlp_traces_endpoint: None,
            otlp_traces_protocol: None,
            otlp_metrics_endpoint: None,
            otlp_metrics_protocol: None,
        }
    }

    #[test]
    fn empty_document_falls_back_to_defaults() {
        let config = parse_yaml_config("{}").expect("empty config should parse");

        assert_eq!(config.http.socket_addr().to_string(), "0.0.0.0:50051");
        assert_eq!(config.telemetry.service.name, "user-service");
        assert!(matches!(config.storage, StorageConfig::Memory(_)));
        assert!(!config.telemetry.is_tracing_enabled());
        assert!(!config.telemetry.is_metrics_enabled());
    }

    #[test]
    fn parses_full_document() {
        let config = parse_yaml_config(
            r#"
            log:
              level: warn
              format: json
            http:
              host: 127.0.0.1
              port: 8080
              workers: 2
            storage:
              kind: clickhouse
              url: http://clickhouse:8123
              user: svc
              database: users_db
              timeout: 3s
            telemetry:
              service:
                name: users
              tracing:
                sampling: 0.5
                exporters:
                  - kind: otlp
                    endpoint: http://collector:4317
                    protocol: grpc
              metrics:
                requests_total_description: Requests seen
                exporters:
                  - kind: otlp
                    endpoint: http://collector:4318/v1/metrics
                    protocol: http
                    interval: 10s
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.log.level, LogLevel::Warn);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.http.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.http.workers.map(|workers| workers.get()), Some(2));

        let StorageConfig::ClickHouse(clickhouse) = &config.storage else {
            panic!("expected clickhouse storage");
        };
        assert_eq!(clickhouse.url, "http://clickhouse:8123");
        assert_eq!(clickhouse.user, "svc");
        assert_eq!(clickhouse.password, "");
        assert_eq!(clickhouse.database, "users_db");
        assert_eq!(clickhouse.timeout, Duration::from_secs(3));

        assert_eq!(config.telemetry.service.name, "users");
        assert_eq!(config.telemetry.tracing.sampling, 0.5);
        assert!(config.telemetry.is_tracing_enabled());

        let MetricsExporterConfig::Otlp(metrics) = &config.telemetry.metrics.exporters[0];
        assert_eq!(metrics.protocol, OtlpProtocol::Http);
        assert_eq!(metrics.interval, Duration::from_secs(10));
        assert_eq!(
            config.telemetry.metrics.requests_total_description,
            "Requests seen"
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = parse_yaml_config("http:\n  listen: 1234\n").expect_err("should fail");
        assert!(err.to_string().contains("listen"));
    }

    #[test]
    fn otlp_endpoint_override_configures_both_signals() {
        let mut overrides = empty_overrides();
        overrides.otlp_endpoint = Some("http://collector:4317".to_string());

        let mut telemetry = TelemetryConfig::default();
        overrides.apply_telemetry_overrides(&mut telemetry);

        let TracingExporterConfig::Otlp(traces) = &telemetry.tracing.exporters[0];
        assert_eq!(traces.endpoint, "http://collector:4317");
        assert_eq!(traces.protocol, OtlpProtocol::Grpc);

        let MetricsExporterConfig::Otlp(metrics) = &telemetry.metrics.exporters[0];
        assert_eq!(metrics.endpoint, "http://collector:4317");
        assert_eq!(metrics.interval, Duration::from_secs(5));
    }

    #[test]
    fn signal_specific_override_wins() {
        let mut overrides = empty_overrides();
        overrides.otlp_endpoint = Some("http://collector:4317".to_string());
        overrides.otlp_protocol = Some(OtlpProtocol::Grpc);
        overrides.otlp_metrics_endpoint = Some("http://metrics:4318".to_string());
        overrides.otlp_metrics_protocol = Some(OtlpProtocol::Http);

        let mut telemetry = TelemetryConfig::default();
        overrides.apply_telemetry_overrides(&mut telemetry);

        let TracingExporterConfig::Otlp(traces) = &telemetry.tracing.exporters[0];
        assert_eq!(traces.endpoint, "http://collector:4317");

        let MetricsExporterConfig::Otlp(metrics) = &telemetry.metrics.exporters[0];
        assert_eq!(metrics.endpoint, "http://metrics:4318");
        assert_eq!(metrics.protocol, OtlpProtocol::Http);
    }

    #[test]
    fn clickhouse_host_override_switches_storage() {
        let mut overrides = empty_overrides();
        overrides.clickhouse_host = Some("db".to_string());
        overrides.clickhouse_port = Some(9000);
        overrides.clickhouse_user = Some("reader".to_string());

        let builder = overrides
            .apply_overrides(config::Config::builder())
            .expect("overrides should apply");
        let config = builder
            .build()
            .and_then(|c| c.try_deserialize::<UserServiceConfig>())
            .expect("config should deserialize");

        let StorageConfig::ClickHouse(clickhouse) = config.storage else {
            panic!("expected clickhouse storage");
        };
        assert_eq!(clickhouse.url, "http://db:9000");
        assert_eq!(clickhouse.user, "reader");
    }

    #[test]
    fn conflicting_clickhouse_address_is_rejected() {
        let mut overrides = empty_overrides();
        overrides.clickhouse_host = Some("db".to_string());
        overrides.clickhouse_url = Some("http://db:8123".to_string());

        let err = overrides
            .apply_overrides(config::Config::builder())
            .err()
            .expect("should conflict");
        insta::assert_snapshot!(err, @"Cannot override storage due to conflict: CLICKHOUSE_URL and CLICKHOUSE_HOST cannot be used together");
    }
}
