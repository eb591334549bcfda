use std::collections::HashMap;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::telemetry::{tracing::default_otlp_config_enabled, OtlpProtocol};

/// Configures the request counter and how it is exported.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Description attached to the `requests_total` counter.
    ///
    /// Can also be set via the `REQUESTS_TOTAL_DESCRIPTION` environment variable.
    #[serde(default = "default_requests_total_description")]
    pub requests_total_description: String,
    /// List of metrics exporters.
    ///
    /// Without an enabled exporter the counter is still recorded, but never leaves the process.
    #[serde(default)]
    pub exporters: Vec<MetricsExporterConfig>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            requests_total_description: default_requests_total_description(),
            exporters: Vec::new(),
        }
    }
}

impl MetricsConfig {
    pub fn is_enabled(&self) -> bool {
        self.exporters.iter().any(|exporter| exporter.is_enabled())
    }
}

fn default_requests_total_description() -> String {
    "Total number of handled requests".to_string()
}

fn default_metrics_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_metrics_max_export_timeout() -> Duration {
    Duration::from_secs(5)
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields, tag = "kind")]
pub enum MetricsExporterConfig {
    #[serde(rename = "otlp")]
    Otlp(MetricsOtlpConfig),
}

impl MetricsExporterConfig {
    fn is_enabled(&self) -> bool {
        match self {
            MetricsExporterConfig::Otlp(config) => config.enabled,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct MetricsOtlpConfig {
    /// Default: `true`.
    #[serde(default = "default_otlp_config_enabled")]
    pub enabled: bool,
    pub endpoint: String,
    pub protocol: OtlpProtocol,
    /// Interval between periodic metric export attempts.
    ///
    /// Default: `5s`.
    #[serde(
        default = "default_metrics_interval",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "String")]
    pub interval: Duration,
    /// Maximum time allowed for a single metrics export attempt.
    ///
    /// Default: `5s`.
    #[serde(
        default = "default_metrics_max_export_timeout",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "String")]
    pub max_export_timeout: Duration,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl MetricsOtlpConfig {
    pub fn new(endpoint: String, protocol: OtlpProtocol) -> Self {
        Self {
            enabled: true,
            endpoint,
            protocol,
            interval: default_metrics_interval(),
            max_export_timeout: default_metrics_max_export_timeout(),
            headers: HashMap::new(),
        }
    }
}
