pub mod names {
    pub const REQUESTS_TOTAL: &str = "requests_total";
}

pub mod labels {
    pub const ENDPOINT: &str = "endpoint";
    pub const ERROR: &str = "error";
    pub const ERROR_CODE: &str = "error.code";
    pub const ERROR_DESCRIPTION: &str = "error.description";
}

pub mod values {
    pub const UNKNOWN: &str = "unknown";
}

pub mod events {
    pub const EXCEPTION: &str = "exception";
    pub const EXCEPTION_TYPE: &str = "exception.type";
    pub const EXCEPTION_MESSAGE: &str = "exception.message";
}
