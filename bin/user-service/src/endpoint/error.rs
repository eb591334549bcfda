use http::StatusCode as HttpStatusCode;
use ntex::http::{Response, ResponseBuilder};
use serde::{Deserialize, Serialize};
use user_service_instrumentation::{CallStatus, StatusCode};

/// Carries the RPC status code of every response.
pub const STATUS_CODE_HEADER: &str = "x-status-code";

/// Everything an endpoint can answer with besides a successful message.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("Failed to parse the request body: {0}")]
    MalformedBody(serde_json::Error),
    #[error("{details}")]
    Status { code: StatusCode, details: String },
    #[error("{0}")]
    Fault(String),
    #[error("handler panicked")]
    Panicked,
}

impl From<&CallStatus> for EndpointError {
    fn from(status: &CallStatus) -> Self {
        EndpointError::Status {
            code: status.code,
            details: status.details.clone(),
        }
    }
}

impl EndpointError {
    pub fn rpc_code(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) => StatusCode::InvalidArgument,
            Self::Status { code, .. } => *code,
            Self::Fault(_) | Self::Panicked => StatusCode::Unknown,
        }
    }
}

/// JSON body of a failed call.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// The HTTP status conventionally paired with an RPC status code.
pub fn http_status_for(code: StatusCode) -> HttpStatusCode {
    match code {
        StatusCode::Ok => HttpStatusCode::OK,
        StatusCode::Cancelled => {
            HttpStatusCode::from_u16(499).unwrap_or(HttpStatusCode::INTERNAL_SERVER_ERROR)
        }
        StatusCode::InvalidArgument
        | StatusCode::FailedPrecondition
        | StatusCode::OutOfRange => HttpStatusCode::BAD_REQUEST,
        StatusCode::DeadlineExceeded => HttpStatusCode::GATEWAY_TIMEOUT,
        StatusCode::NotFound => HttpStatusCode::NOT_FOUND,
        StatusCode::AlreadyExists | StatusCode::Aborted => HttpStatusCode::CONFLICT,
        StatusCode::PermissionDenied => HttpStatusCode::FORBIDDEN,
        StatusCode::ResourceExhausted => HttpStatusCode::TOO_MANY_REQUESTS,
        StatusCode::Unimplemented => HttpStatusCode::NOT_IMPLEMENTED,
        StatusCode::Unavailable => HttpStatusCode::SERVICE_UNAVAILABLE,
        StatusCode::Unauthenticated => HttpStatusCode::UNAUTHORIZED,
        StatusCode::Unknown | StatusCode::Internal | StatusCode::DataLoss => {
            HttpStatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<EndpointError> for Response {
    fn from(err: EndpointError) -> Self {
        let code = err.rpc_code();
        let body = ErrorBody {
            code: code.as_str().to_string(),
            message: err.to_string(),
        };

        ResponseBuilder::new(http_status_for(code))
            .header(STATUS_CODE_HEADER, code.value())
            .json(&body)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;
    use user_service_instrumentation::StatusCode;

    use super::http_status_for;

    #[test]
    fn only_ok_maps_to_success() {
        for code in StatusCode::iter() {
            assert_eq!(
                http_status_for(code).is_success(),
                code.is_ok(),
                "{code}"
            );
        }
    }

    #[test]
    fn common_codes() {
        assert_eq!(http_status_for(StatusCode::InvalidArgument).as_u16(), 400);
        assert_eq!(http_status_for(StatusCode::NotFound).as_u16(), 404);
        assert_eq!(http_status_for(StatusCode::Cancelled).as_u16(), 499);
        assert_eq!(http_status_for(StatusCode::Unavailable).as_u16(), 503);
    }
}
