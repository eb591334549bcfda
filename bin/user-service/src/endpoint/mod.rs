pub mod error;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use ntex::{
    http::ResponseBuilder,
    util::Bytes,
    web::{self, HttpResponse},
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};
use user_service_instrumentation::{CallContext, Handler, StatusCode};

use crate::endpoint::error::{EndpointError, STATUS_CODE_HEADER};
use crate::messages::SERVICE_FULL_NAME;
use crate::shared_state::ServiceSharedState;

pub const GET_USER_METHOD: &str = "GetUser";
pub const LIST_USERS_METHOD: &str = "ListUsers";
pub const INSERT_USER_METHOD: &str = "InsertUser";

pub fn method_path(method: &str) -> String {
    format!("/{SERVICE_FULL_NAME}/{method}")
}

/// Decodes the body, runs the handler with a fresh call context and turns the
/// outcome into a response. The status left on the context wins over the
/// returned message.
pub async fn dispatch<H, Req>(handler: &H, method: &str, body: Bytes) -> HttpResponse
where
    H: Handler<Req>,
    H::Response: Serialize,
    Req: DeserializeOwned + Send + 'static,
{
    let path = method_path(method);
    info!("Received call to {}", path);

    let response: HttpResponse = match serde_json::from_slice::<Req>(&body) {
        Err(err) => EndpointError::MalformedBody(err).into(),
        Ok(request) => {
            let context = CallContext::new();
            let outcome = AssertUnwindSafe(handler.call(request, Some(&context)))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(message)) => match context.status() {
                    Some(status) if !status.code.is_ok() => EndpointError::from(&*status).into(),
                    _ => ResponseBuilder::new(http::StatusCode::OK)
                        .header(STATUS_CODE_HEADER, StatusCode::Ok.value())
                        .json(&message),
                },
                Ok(Err(fault)) => {
                    error!(method = %path, error = %fault, "call failed");
                    EndpointError::Fault(fault.to_string()).into()
                }
                Err(_) => {
                    error!(method = %path, "call panicked");
                    EndpointError::Panicked.into()
                }
            }
        }
    };

    info!(method = %path, status = response.status().as_u16(), "Completed call");
    response
}

async fn get_user_endpoint(
    body: Bytes,
    state: web::types::State<Arc<ServiceSharedState>>,
) -> HttpResponse {
    dispatch(&state.get_user, GET_USER_METHOD, body).await
}

async fn list_users_endpoint(
    body: Bytes,
    state: web::types::State<Arc<ServiceSharedState>>,
) -> HttpResponse {
    dispatch(&state.list_users, LIST_USERS_METHOD, body).await
}

async fn insert_user_endpoint(
    body: Bytes,
    state: web::types::State<Arc<ServiceSharedState>>,
) -> HttpResponse {
    dispatch(&state.insert_user, INSERT_USER_METHOD, body).await
}

pub fn configure_endpoints(service_config: &mut web::ServiceConfig) {
    service_config
        .route(
            &method_path(GET_USER_METHOD),
            web::post().to(get_user_endpoint),
        )
        .route(
            &method_path(LIST_USERS_METHOD),
            web::post().to(list_users_endpoint),
        )
        .route(
            &method_path(INSERT_USER_METHOD),
            web::post().to(insert_user_endpoint),
        );
}
