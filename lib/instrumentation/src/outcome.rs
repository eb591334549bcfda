use std::any::Any;
use std::error::Error;

use opentelemetry::{
    trace::{SpanRef, Status},
    KeyValue,
};
use tracing::error;

use crate::catalog::{events, labels};
use crate::status::{CallContext, StatusCode};

/// How a call that returned normally ended, as seen through its side channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Ok,
    ApplicationError { code: StatusCode, details: String },
}

/// Reads the side channel after the handler has returned. A missing context,
/// an unset status, or an `OK` status all classify as success.
pub fn classify(context: Option<&CallContext>) -> CallOutcome {
    let Some(status) = context.and_then(CallContext::status) else {
        return CallOutcome::Ok;
    };

    if status.code.is_ok() {
        CallOutcome::Ok
    } else {
        CallOutcome::ApplicationError {
            code: status.code,
            details: status.details.clone(),
        }
    }
}

pub(crate) fn record_outcome(span: &SpanRef<'_>, span_name: &str, outcome: &CallOutcome) {
    match outcome {
        CallOutcome::Ok => span.set_status(Status::Ok),
        CallOutcome::ApplicationError { code, details } => {
            span.set_status(Status::error(format!("{code}: {details}")));
            span.set_attributes([
                KeyValue::new(labels::ERROR, true),
                KeyValue::new(labels::ERROR_CODE, code.as_str()),
                KeyValue::new(labels::ERROR_DESCRIPTION, details.clone()),
            ]);
            error!(
                span = span_name,
                code = code.as_str(),
                details = %details,
                "handler reported an error status"
            );
        }
    }
}

pub(crate) fn record_fault(span: &SpanRef<'_>, span_name: &str, fault: &(dyn Error + 'static)) {
    span.record_error(fault);
    span.set_status(Status::error(fault.to_string()));
    span.set_attribute(KeyValue::new(labels::ERROR, true));
    error!(span = span_name, error = %fault, "handler failed");
}

pub(crate) fn record_panic(span: &SpanRef<'_>, span_name: &str, payload: &(dyn Any + Send)) {
    let message = panic_message(payload);

    span.add_event(
        events::EXCEPTION,
        vec![
            KeyValue::new(events::EXCEPTION_TYPE, "panic"),
            KeyValue::new(events::EXCEPTION_MESSAGE, message.clone()),
        ],
    );
    span.set_status(Status::error(message.clone()));
    span.set_attribute(KeyValue::new(labels::ERROR, true));
    error!(span = span_name, panic = %message, "handler panicked");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, panic_message, CallOutcome};
    use crate::status::{CallContext, StatusCode};

    #[test]
    fn no_context_is_ok() {
        assert_eq!(classify(None), CallOutcome::Ok);
    }

    #[test]
    fn unset_or_ok_status_is_ok() {
        let context = CallContext::new();
        assert_eq!(classify(Some(&context)), CallOutcome::Ok);

        context.set_status(StatusCode::Ok, "fine");
        assert_eq!(classify(Some(&context)), CallOutcome::Ok);
    }

    #[test]
    fn non_ok_status_is_application_error() {
        let context = CallContext::new();
        context.set_status(StatusCode::NotFound, "User not found");

        assert_eq!(
            classify(Some(&context)),
            CallOutcome::ApplicationError {
                code: StatusCode::NotFound,
                details: "User not found".to_string(),
            }
        );
    }

    #[test]
    fn extracts_panic_payloads() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&"boom".to_string()), "boom");
        assert_eq!(panic_message(&42u8), "handler panicked");
    }
}
