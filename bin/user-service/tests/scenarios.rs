mod testkit;

use ntex::web::test;
use serde_json::json;
use user_service::{
    endpoint::error::ErrorBody,
    messages::{GetUserResponse, ListUsersResponse},
};
use user_service_config::storage::{ClickHouseConfig, StorageConfig};
use user_service_instrumentation::opentelemetry::{
    trace::{SpanKind, Status},
    KeyValue, Value,
};

use crate::testkit::{
    find_attribute, has_exception_event, init_service_app, rpc_request, seed_users,
    string_attribute,
};

#[ntex::test]
async fn rejected_user_id_is_reported_as_invalid_argument() {
    let service = init_service_app(seed_users(3)).await;

    let req = rpc_request("GetUser", json!({ "user_id": 0 }));
    let resp = test::call_service(&service.app, req.to_request()).await;

    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(
        resp.headers()
            .get("x-status-code")
            .and_then(|value| value.to_str().ok()),
        Some("3")
    );
    let body: ErrorBody =
        serde_json::from_slice(&test::read_body(resp).await).expect("error body is JSON");
    assert_eq!(
        body,
        ErrorBody {
            code: "INVALID_ARGUMENT".to_string(),
            message: "User ID must be positive".to_string(),
        }
    );

    let span = service.single_span();
    assert_eq!(span.name, "Handler: UserService.myservice.GetUserRequest");
    assert_eq!(span.span_kind, SpanKind::Server);
    assert_eq!(
        span.status,
        Status::error("INVALID_ARGUMENT: User ID must be positive")
    );
    assert_eq!(find_attribute(&span, "error"), Some(&Value::Bool(true)));
    assert_eq!(
        string_attribute(&span, "error.code").as_deref(),
        Some("INVALID_ARGUMENT")
    );

    assert_eq!(
        service.counter.calls(),
        vec![vec![
            KeyValue::new("endpoint", "UserService.GetUserRequest"),
            KeyValue::new("user_id", "0"),
        ]]
    );
}

#[ntex::test]
async fn missing_user_is_reported_as_not_found() {
    let service = init_service_app(seed_users(3)).await;

    let req = rpc_request("GetUser", json!({ "user_id": 42 }));
    let resp = test::call_service(&service.app, req.to_request()).await;

    assert_eq!(resp.status().as_u16(), 404);
    let body: ErrorBody =
        serde_json::from_slice(&test::read_body(resp).await).expect("error body is JSON");
    assert_eq!(body.code, "NOT_FOUND");
    assert_eq!(body.message, "User not found");

    let span = service.single_span();
    assert_eq!(span.status, Status::error("NOT_FOUND: User not found"));
    assert_eq!(
        string_attribute(&span, "error.description").as_deref(),
        Some("User not found")
    );
    assert!(!has_exception_event(&span));
    assert_eq!(service.counter.calls().len(), 1);
}

#[ntex::test]
async fn listing_users_succeeds_with_paging_attributes() {
    let service = init_service_app(seed_users(5)).await;

    let req = rpc_request("ListUsers", json!({ "page": 1, "page_size": 10 }));
    let resp = test::call_service(&service.app, req.to_request()).await;

    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers()
            .get("x-status-code")
            .and_then(|value| value.to_str().ok()),
        Some("0")
    );
    let body: ListUsersResponse =
        serde_json::from_slice(&test::read_body(resp).await).expect("response is JSON");
    assert_eq!(body.users.len(), 5);
    assert_eq!(body.total, 5);

    let span = service.single_span();
    assert_eq!(span.name, "Handler: UserService.myservice.ListUsersRequest");
    assert_eq!(span.status, Status::Ok);
    assert_eq!(
        string_attribute(&span, "endpoint").as_deref(),
        Some("UserService.ListUsersRequest")
    );
    assert_eq!(string_attribute(&span, "page").as_deref(), Some("1"));
    assert_eq!(string_attribute(&span, "page_size").as_deref(), Some("10"));
    assert!(find_attribute(&span, "error").is_none());
    assert_eq!(service.counter.calls().len(), 1);
}

#[ntex::test]
async fn unreachable_storage_fails_the_call() {
    let service = init_service_app(StorageConfig::ClickHouse(ClickHouseConfig {
        url: "http://127.0.0.1:1".to_string(),
        ..ClickHouseConfig::default()
    }))
    .await;

    let req = rpc_request("GetUser", json!({ "user_id": 7 }));
    let resp = test::call_service(&service.app, req.to_request()).await;

    assert_eq!(resp.status().as_u16(), 500);
    let body: ErrorBody =
        serde_json::from_slice(&test::read_body(resp).await).expect("error body is JSON");
    assert_eq!(body.code, "UNKNOWN");
    assert!(
        body.message
            .starts_with("failed to reach the storage backend"),
        "{}",
        body.message
    );

    let span = service.single_span();
    assert!(matches!(
        &span.status,
        Status::Error { description } if description.starts_with("failed to reach the storage backend")
    ));
    assert_eq!(find_attribute(&span, "error"), Some(&Value::Bool(true)));
    assert!(has_exception_event(&span));
    assert_eq!(service.counter.calls().len(), 1);
}

#[ntex::test]
async fn inserted_users_can_be_fetched() {
    let service = init_service_app(seed_users(2)).await;

    let req = rpc_request(
        "InsertUser",
        json!({ "username": "dana", "email": "dana@example.com" }),
    );
    let resp = test::call_service(&service.app, req.to_request()).await;
    assert_eq!(resp.status().as_u16(), 200);

    let req = rpc_request("GetUser", json!({ "user_id": 3 }));
    let resp = test::call_service(&service.app, req.to_request()).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: GetUserResponse =
        serde_json::from_slice(&test::read_body(resp).await).expect("response is JSON");
    assert_eq!(
        body.user.map(|user| user.email).as_deref(),
        Some("dana@example.com")
    );

    let spans = service.finished_spans();
    assert_eq!(spans.len(), 2);
    assert!(spans.iter().all(|span| span.status == Status::Ok));

    let insert_attributes = &service.counter.calls()[0];
    assert!(insert_attributes.contains(&KeyValue::new("username", "dana")));
    assert!(insert_attributes.contains(&KeyValue::new("email", "dana@example.com")));
}

#[ntex::test]
async fn invalid_email_is_rejected() {
    let service = init_service_app(seed_users(0)).await;

    let req = rpc_request(
        "InsertUser",
        json!({ "username": "erin", "email": "not-an-email" }),
    );
    let resp = test::call_service(&service.app, req.to_request()).await;

    assert_eq!(resp.status().as_u16(), 400);
    let body: ErrorBody =
        serde_json::from_slice(&test::read_body(resp).await).expect("error body is JSON");
    insta::assert_snapshot!(body.message, @"value is not a valid email address: missing an @-sign");
}

#[ntex::test]
async fn malformed_body_never_reaches_the_handler() {
    let service = init_service_app(seed_users(1)).await;

    let req = test::TestRequest::post()
        .uri("/myservice.UserService/GetUser")
        .header("content-type", "application/json")
        .set_payload("{ not json");
    let resp = test::call_service(&service.app, req.to_request()).await;

    assert_eq!(resp.status().as_u16(), 400);
    assert!(service.finished_spans().is_empty());
    assert!(service.counter.calls().is_empty());
}
