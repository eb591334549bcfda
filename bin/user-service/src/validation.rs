use crate::messages::{GetUserRequest, InsertUserRequest, ListUsersRequest};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("User ID must be positive")]
    NonPositiveUserId,
    #[error("Page must be >= 1")]
    PageOutOfRange,
    #[error("Page size must be > 0")]
    PageSizeOutOfRange,
    #[error("Username cannot be empty")]
    EmptyUsername,
    #[error("value is not a valid email address: {0}")]
    InvalidEmail(&'static str),
}

pub fn validate_get_user(request: &GetUserRequest) -> Result<i64, ValidationError> {
    if request.user_id <= 0 {
        return Err(ValidationError::NonPositiveUserId);
    }

    Ok(request.user_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub limit: u64,
    pub offset: u64,
}

pub fn validate_list_users(request: &ListUsersRequest) -> Result<Paging, ValidationError> {
    let page = request.page.unwrap_or(DEFAULT_PAGE);
    let page_size = request.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    if page < 1 {
        return Err(ValidationError::PageOutOfRange);
    }
    if page_size <= 0 {
        return Err(ValidationError::PageSizeOutOfRange);
    }

    // both are positive at this point
    let page = page.unsigned_abs();
    let limit = page_size.unsigned_abs();

    Ok(Paging {
        limit,
        offset: (page - 1).saturating_mul(limit),
    })
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
}

pub fn validate_insert_user(request: &InsertUserRequest) -> Result<NewUser<'_>, ValidationError> {
    if request.username.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    check_email(&request.email)?;

    Ok(NewUser {
        username: &request.username,
        email: &request.email,
    })
}

/// Syntactic check only: `local@domain.tld`, no whitespace.
fn check_email(email: &str) -> Result<(), ValidationError> {
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail("contains whitespace"));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail("missing an @-sign"));
    };

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail("nothing before the @-sign"));
    }
    if domain.contains('@') {
        return Err(ValidationError::InvalidEmail("more than one @-sign"));
    }
    if !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || domain.contains("..")
    {
        return Err(ValidationError::InvalidEmail("invalid domain"));
    }

    Ok(())
}
