use async_trait::async_trait;
use user_service_instrumentation::{CallContext, Handler, StatusCode};

use crate::messages::{
    Empty, GetUserRequest, GetUserResponse, InsertUserRequest, ListUsersRequest,
    ListUsersResponse, SERVICE_NAME,
};
use crate::storage::{run_blocking, SharedUserStore, StorageError};
use crate::validation::{validate_get_user, validate_insert_user, validate_list_users};

/// Faults a handler returns instead of reporting them on the call context.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The `myservice.UserService` handlers. Rejections and lookups that find
/// nothing are reported on the call context with an empty response; storage
/// failures are returned as faults.
#[derive(Clone)]
pub struct UserService {
    store: SharedUserStore,
}

impl UserService {
    pub fn new(store: SharedUserStore) -> Self {
        Self { store }
    }
}

fn report(context: Option<&CallContext>, code: StatusCode, details: impl Into<String>) {
    if let Some(context) = context {
        context.set_status(code, details);
    }
}

#[async_trait]
impl Handler<GetUserRequest> for UserService {
    type Response = GetUserResponse;
    type Error = ServiceError;

    fn service_name(&self) -> &str {
        SERVICE_NAME
    }

    async fn call(
        &self,
        request: GetUserRequest,
        context: Option<&CallContext>,
    ) -> Result<GetUserResponse, ServiceError> {
        let user_id = match validate_get_user(&request) {
            Ok(user_id) => user_id,
            Err(err) => {
                report(context, StatusCode::InvalidArgument, err.to_string());
                return Ok(GetUserResponse::default());
            }
        };

        let user = run_blocking(&self.store, move |store| store.find_user(user_id)).await?;

        match user {
            Some(user) => Ok(GetUserResponse { user: Some(user) }),
            None => {
                report(context, StatusCode::NotFound, "User not found");
                Ok(GetUserResponse::default())
            }
        }
    }
}

#[async_trait]
impl Handler<ListUsersRequest> for UserService {
    type Response = ListUsersResponse;
    type Error = ServiceError;

    fn service_name(&self) -> &str {
        SERVICE_NAME
    }

    async fn call(
        &self,
        request: ListUsersRequest,
        context: Option<&CallContext>,
    ) -> Result<ListUsersResponse, ServiceError> {
        let paging = match validate_list_users(&request) {
            Ok(paging) => paging,
            Err(err) => {
                report(context, StatusCode::InvalidArgument, err.to_string());
                return Ok(ListUsersResponse::default());
            }
        };

        let users = run_blocking(&self.store, move |store| {
            store.list_users(paging.limit, paging.offset)
        })
        .await?;
        let total = run_blocking(&self.store, |store| store.count_users()).await?;

        Ok(ListUsersResponse { users, total })
    }
}

#[async_trait]
impl Handler<InsertUserRequest> for UserService {
    type Response = Empty;
    type Error = ServiceError;

    fn service_name(&self) -> &str {
        SERVICE_NAME
    }

    async fn call(
        &self,
        request: InsertUserRequest,
        context: Option<&CallContext>,
    ) -> Result<Empty, ServiceError> {
        let new_user = match validate_insert_user(&request) {
            Ok(new_user) => new_user,
            Err(err) => {
                report(context, StatusCode::InvalidArgument, err.to_string());
                return Ok(Empty {});
            }
        };

        let username = new_user.username.to_string();
        let email = new_user.email.to_string();
        run_blocking(&self.store, move |store| store.insert_user(&username, &email)).await?;

        Ok(Empty {})
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use user_service_instrumentation::{CallContext, Handler, StatusCode};

    use super::UserService;
    use crate::messages::{GetUserRequest, InsertUserRequest, ListUsersRequest, User};
    use crate::storage::InMemoryUserStore;

    fn seeded(count: i64) -> UserService {
        let store = InMemoryUserStore::with_seed((1..=count).map(|id| User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
        }));
        UserService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn get_user_rejects_non_positive_ids() {
        let service = seeded(1);
        let context = CallContext::new();

        let response = service
            .call(GetUserRequest { user_id: 0 }, Some(&context))
            .await
            .unwrap();

        assert_eq!(response.user, None);
        assert_eq!(context.code(), Some(StatusCode::InvalidArgument));
        assert_eq!(
            context.details().as_deref(),
            Some("User ID must be positive")
        );
    }

    #[tokio::test]
    async fn get_user_reports_missing_records() {
        let service = seeded(1);
        let context = CallContext::new();

        let response = service
            .call(GetUserRequest { user_id: 42 }, Some(&context))
            .await
            .unwrap();

        assert_eq!(response.user, None);
        assert_eq!(context.code(), Some(StatusCode::NotFound));
        assert_eq!(context.details().as_deref(), Some("User not found"));
    }

    #[tokio::test]
    async fn get_user_returns_the_record() {
        let service = seeded(3);
        let context = CallContext::new();

        let response = service
            .call(GetUserRequest { user_id: 2 }, Some(&context))
            .await
            .unwrap();

        assert_eq!(response.user.map(|user| user.username).as_deref(), Some("user2"));
        assert_eq!(context.status(), None);
    }

    #[tokio::test]
    async fn list_users_pages_and_totals() {
        let service = seeded(12);

        let response = service
            .call(
                ListUsersRequest {
                    page: Some(2),
                    page_size: Some(5),
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(
            response.users.iter().map(|user| user.id).collect::<Vec<_>>(),
            vec![6, 7, 8, 9, 10]
        );
        assert_eq!(response.total, 12);
    }

    #[tokio::test]
    async fn insert_user_validates_then_stores() {
        let service = seeded(0);
        let context = CallContext::new();

        service
            .call(
                InsertUserRequest {
                    username: "".to_string(),
                    email: "x@example.com".to_string(),
                },
                Some(&context),
            )
            .await
            .unwrap();
        assert_eq!(context.code(), Some(StatusCode::InvalidArgument));

        service
            .call(
                InsertUserRequest {
                    username: "carol".to_string(),
                    email: "carol@example.com".to_string(),
                },
                None,
            )
            .await
            .unwrap();

        let listed = service
            .call(ListUsersRequest::default(), None)
            .await
            .unwrap();
        assert_eq!(listed.total, 1);
        assert_eq!(listed.users[0].username, "carol");
    }
}
