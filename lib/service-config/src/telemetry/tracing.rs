use std::collections::HashMap;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::telemetry::OtlpProtocol;

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct TracingConfig {
    /// Ratio of traces to record, between `0.0` and `1.0`.
    #[serde(default = "default_sampling")]
    pub sampling: f64,
    /// Respect the sampling decision of an incoming parent span.
    #[serde(default)]
    pub parent_based_sampler: bool,
    #[serde(default)]
    pub exporters: Vec<TracingExporterConfig>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            sampling: default_sampling(),
            parent_based_sampler: false,
            exporters: Vec::new(),
        }
    }
}

fn default_sampling() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields, tag = "kind")]
pub enum TracingExporterConfig {
    #[serde(rename = "otlp")]
    Otlp(TracingOtlpConfig),
}

impl TracingExporterConfig {
    pub fn is_enabled(&self) -> bool {
        match self {
            TracingExporterConfig::Otlp(config) => config.enabled,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct TracingOtlpConfig {
    #[serde(default = "default_otlp_config_enabled")]
    pub enabled: bool,
    pub endpoint: String,
    pub protocol: OtlpProtocol,
    /// Extra headers (HTTP) or metadata entries (gRPC) sent with every export.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub batch_processor: BatchProcessorConfig,
}

impl TracingOtlpConfig {
    pub fn new(endpoint: String, protocol: OtlpProtocol) -> Self {
        Self {
            enabled: true,
            endpoint,
            protocol,
            headers: HashMap::new(),
            batch_processor: BatchProcessorConfig::default(),
        }
    }
}

pub(crate) fn default_otlp_config_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct BatchProcessorConfig {
    #[serde(default = "default_batch_max_export_batch_size")]
    pub max_export_batch_size: u32,
    #[serde(default = "default_batch_max_queue_size")]
    pub max_queue_size: u32,
    #[serde(
        default = "default_batch_max_export_timeout",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "String")]
    pub max_export_timeout: Duration,
    #[serde(
        default = "default_batch_scheduled_delay",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "String")]
    pub scheduled_delay: Duration,
}

impl Default for BatchProcessorConfig {
    fn default() -> Self {
        Self {
            max_export_batch_size: default_batch_max_export_batch_size(),
            max_queue_size: default_batch_max_queue_size(),
            max_export_timeout: default_batch_max_export_timeout(),
            scheduled_delay: default_batch_scheduled_delay(),
        }
    }
}

fn default_batch_max_export_batch_size() -> u32 {
    512
}

fn default_batch_max_queue_size() -> u32 {
    2048
}

fn default_batch_max_export_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_batch_scheduled_delay() -> Duration {
    Duration::from_secs(5)
}
