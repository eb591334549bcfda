use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where user records are kept.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(tag = "kind")]
pub enum StorageConfig {
    /// Process-local storage. Records are lost on restart.
    #[serde(rename = "memory")]
    Memory(MemoryStorageConfig),
    /// A ClickHouse server, reached through its HTTP interface.
    #[serde(rename = "clickhouse")]
    ClickHouse(ClickHouseConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory(MemoryStorageConfig::default())
    }
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct MemoryStorageConfig {
    /// Users inserted when the service starts.
    #[serde(default)]
    pub seed: Vec<SeedUser>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct ClickHouseConfig {
    /// Base URL of the ClickHouse HTTP interface.
    ///
    /// Can also be set via `CLICKHOUSE_URL`, or `CLICKHOUSE_HOST` and `CLICKHOUSE_PORT`.
    #[serde(default = "default_clickhouse_url")]
    pub url: String,

    /// Can also be set via the `CLICKHOUSE_USER` environment variable.
    #[serde(default = "default_clickhouse_user")]
    pub user: String,

    /// Can also be set via the `CLICKHOUSE_PASSWORD` environment variable.
    #[serde(default)]
    pub password: String,

    /// Can also be set via the `CLICKHOUSE_DATABASE` environment variable.
    #[serde(default = "default_clickhouse_database")]
    pub database: String,

    /// Upper bound for a single query round-trip.
    #[serde(
        default = "default_clickhouse_timeout",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "String")]
    pub timeout: Duration,
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            url: default_clickhouse_url(),
            user: default_clickhouse_user(),
            password: String::new(),
            database: default_clickhouse_database(),
            timeout: default_clickhouse_timeout(),
        }
    }
}

fn default_clickhouse_url() -> String {
    "http://localhost:8123".to_string()
}

fn default_clickhouse_user() -> String {
    "default".to_string()
}

fn default_clickhouse_database() -> String {
    "default".to_string()
}

fn default_clickhouse_timeout() -> Duration {
    Duration::from_secs(10)
}
