use std::sync::Arc;

use ntex::web::{self, Responder};
use serde::Serialize;

use crate::shared_state::ServiceSharedState;

#[derive(Serialize)]
struct ProbeBody {
    status: &'static str,
}

pub async fn health_check_handler() -> impl Responder {
    web::HttpResponse::Ok().json(&ProbeBody { status: "SERVING" })
}

pub async fn readiness_check_handler(
    state: web::types::State<Arc<ServiceSharedState>>,
) -> impl Responder {
    if state.is_serving() {
        web::HttpResponse::Ok().json(&ProbeBody { status: "SERVING" })
    } else {
        web::HttpResponse::ServiceUnavailable().json(&ProbeBody {
            status: "NOT_SERVING",
        })
    }
}
