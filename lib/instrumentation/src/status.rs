use std::sync::Arc;

use arc_swap::ArcSwapOption;

/// Canonical status codes shared by RPC frameworks.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::IntoStaticStr,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
)]
#[repr(i32)]
pub enum StatusCode {
    #[strum(serialize = "OK")]
    Ok = 0,
    #[strum(serialize = "CANCELLED")]
    Cancelled = 1,
    #[strum(serialize = "UNKNOWN")]
    Unknown = 2,
    #[strum(serialize = "INVALID_ARGUMENT")]
    InvalidArgument = 3,
    #[strum(serialize = "DEADLINE_EXCEEDED")]
    DeadlineExceeded = 4,
    #[strum(serialize = "NOT_FOUND")]
    NotFound = 5,
    #[strum(serialize = "ALREADY_EXISTS")]
    AlreadyExists = 6,
    #[strum(serialize = "PERMISSION_DENIED")]
    PermissionDenied = 7,
    #[strum(serialize = "RESOURCE_EXHAUSTED")]
    ResourceExhausted = 8,
    #[strum(serialize = "FAILED_PRECONDITION")]
    FailedPrecondition = 9,
    #[strum(serialize = "ABORTED")]
    Aborted = 10,
    #[strum(serialize = "OUT_OF_RANGE")]
    OutOfRange = 11,
    #[strum(serialize = "UNIMPLEMENTED")]
    Unimplemented = 12,
    #[strum(serialize = "INTERNAL")]
    Internal = 13,
    #[strum(serialize = "UNAVAILABLE")]
    Unavailable = 14,
    #[strum(serialize = "DATA_LOSS")]
    DataLoss = 15,
    #[strum(serialize = "UNAUTHENTICATED")]
    Unauthenticated = 16,
}

impl StatusCode {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn value(self) -> i32 {
        self as i32
    }

    pub fn is_ok(self) -> bool {
        self == StatusCode::Ok
    }
}

/// The status a handler reported for the call it just served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStatus {
    pub code: StatusCode,
    pub details: String,
}

/// Per-call side channel.
///
/// A handler signals an application-level failure by setting a status here and
/// still returning a (default) response. The status is only read once the
/// handler has returned.
#[derive(Debug, Default)]
pub struct CallContext {
    status: ArcSwapOption<CallStatus>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, code: StatusCode, details: impl Into<String>) {
        self.status.store(Some(Arc::new(CallStatus {
            code,
            details: details.into(),
        })));
    }

    pub fn status(&self) -> Option<Arc<CallStatus>> {
        self.status.load_full()
    }

    pub fn code(&self) -> Option<StatusCode> {
        self.status.load().as_ref().map(|status| status.code)
    }

    pub fn details(&self) -> Option<String> {
        self.status
            .load()
            .as_ref()
            .map(|status| status.details.clone())
    }
}
