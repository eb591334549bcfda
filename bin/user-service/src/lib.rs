pub mod endpoint;
pub mod error;
mod http_utils;
pub mod messages;
pub mod service;
pub mod shared_state;
pub mod storage;
pub mod telemetry;
pub mod validation;

use std::sync::Arc;

use ntex::web;
use tracing::info;
use user_service_config::{load_config, UserServiceConfig};
use user_service_instrumentation::Telemetry;

use crate::{
    endpoint::configure_endpoints,
    error::ServiceInitError,
    http_utils::probes::{health_check_handler, readiness_check_handler},
    service::UserService,
    shared_state::RequestCounter,
    storage::store_from_config,
};

pub use crate::shared_state::ServiceSharedState;

pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn service_entrypoint() -> Result<(), ServiceInitError> {
    let config_path = std::env::var("SERVICE_CONFIG_FILE_PATH").ok();
    let service_config = load_config(config_path)?;
    let telemetry = telemetry::init(&service_config)?;
    info!("user-service@{} starting...", SERVICE_VERSION);

    let addr = service_config.http.socket_addr();
    let shared_state = configure_app_from_config(&service_config, &telemetry).await?;

    let server_state = shared_state.clone();
    let mut server = web::HttpServer::new(async move || {
        web::App::new()
            .state(server_state.clone())
            .configure(configure_ntex_app)
    });
    if let Some(workers) = service_config.http.workers {
        server = server.workers(workers.get());
    }
    let server = server
        .bind(addr)
        .map_err(|err| ServiceInitError::HttpServerBindError(addr.to_string(), err))?;

    shared_state.mark_serving();
    info!("listening on {}", addr);

    let maybe_error = server
        .run()
        .await
        .map_err(ServiceInitError::HttpServerStartError);

    shared_state.mark_not_serving();
    info!("server stopped, flushing telemetry");
    telemetry.graceful_shutdown().await;

    maybe_error
}

pub async fn configure_app_from_config(
    service_config: &UserServiceConfig,
    telemetry: &Telemetry,
) -> Result<Arc<ServiceSharedState>, ServiceInitError> {
    let store = store_from_config(&service_config.storage).await?;
    let counter: RequestCounter = Arc::new(telemetry.request_metrics());

    Ok(Arc::new(ServiceSharedState::new(
        UserService::new(store),
        telemetry.tracer(),
        counter,
    )))
}

pub fn configure_ntex_app(service_config: &mut web::ServiceConfig) {
    configure_endpoints(service_config);
    service_config
        .route("/health", web::to(health_check_handler))
        .route("/readiness", web::to(readiness_check_handler));
}
