use std::{io::IsTerminal, str::FromStr};

use tracing_subscriber::{
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use user_service_config::{log::LogFormat, UserServiceConfig};
use user_service_instrumentation::Telemetry;

use crate::error::ServiceInitError;

/// Installs the log subscriber and builds the OpenTelemetry providers.
///
/// Spans produced by the request instrumentation go straight to the
/// OpenTelemetry exporters; `tracing` only carries log events.
pub fn init(config: &UserServiceConfig) -> Result<Telemetry, ServiceInitError> {
    configure_logging(config)?;
    Ok(Telemetry::from_config(&config.telemetry)?)
}

fn configure_logging(config: &UserServiceConfig) -> Result<(), ServiceInitError> {
    let filter_str = config.log.env_filter_str();
    let filter = EnvFilter::from_str(filter_str).map_err(|err| {
        ServiceInitError::InvalidLogFilter(filter_str.to_string(), err.to_string())
    })?;

    let timer = UtcTime::rfc_3339();
    let is_terminal = std::io::stdout().is_terminal();
    let registry = tracing_subscriber::registry();

    let installed = match config.log.format {
        LogFormat::PrettyTree => registry
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_ansi(is_terminal)
                    .with_bracketed_fields(true)
                    .with_indent_lines(true)
                    .with_timer(tracing_tree::time::Uptime::default())
                    .with_targets(false),
            )
            .with(filter)
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_timer(timer))
            .with(filter)
            .try_init(),
        LogFormat::PrettyCompact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_ansi(is_terminal)
                    .with_timer(timer),
            )
            .with(filter)
            .try_init(),
    };

    installed.map_err(|err| ServiceInitError::LoggerInitError(err.to_string()))
}
