use user_service_config::ServiceConfigError;
use user_service_instrumentation::TelemetryError;

use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceInitError {
    #[error(transparent)]
    ServiceConfigError(#[from] ServiceConfigError),
    #[error(transparent)]
    TelemetryError(#[from] TelemetryError),
    #[error("Failed to initialize storage: {0}")]
    StorageError(#[from] StorageError),
    #[error("Invalid log filter '{0}': {1}")]
    InvalidLogFilter(String, String),
    #[error("Failed to install the log subscriber: {0}")]
    LoggerInitError(String),
    #[error("Failed to bind HTTP server to address: {0}. Error: {1}")]
    HttpServerBindError(String, std::io::Error),
    #[error("Failed to start HTTP server: {0}")]
    HttpServerStartError(std::io::Error),
}
