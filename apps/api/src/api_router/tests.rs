use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderName, Method, Request, StatusCode};
use serde_json::{Value, json};
use tessera_application::{InviteSettings, TenancyPorts, TenancyServices};
use tessera_infrastructure::{InMemoryTenancyStore, SystemClock};
use tower::ServiceExt;

use super::build_router;
use crate::state::AppState;

const IDENTITY_HEADER: &str = "x-caller-identity";
const HOUR_NANOS: i64 = 3_600 * 1_000_000_000;

fn app() -> Router {
    let ports = TenancyPorts::from_store(Arc::new(InMemoryTenancyStore::new()));
    let settings =
        InviteSettings::from_max_validity_seconds(86_400).unwrap_or_else(|_| unreachable!());
    let services = TenancyServices::new(ports, Arc::new(SystemClock), settings);
    let state = AppState::new(
        services,
        HeaderName::from_static(IDENTITY_HEADER),
        "memory",
    );

    build_router(state, "http://localhost:3000").unwrap_or_else(|_| unreachable!())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    identity: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(identity) = identity {
        builder = builder.header(IDENTITY_HEADER, identity);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap_or_else(|_| unreachable!());

    let response = app
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|_| unreachable!());
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|_| unreachable!());
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|error| panic!("invalid json: {error}"))
    };

    (status, value)
}

async fn register(app: &Router, identity: &str, company_id: &str) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/companies",
        Some(identity),
        Some(json!({
            "company_id": company_id,
            "name": format!("{company_id} Ltd"),
            "owner_name": format!("{identity} owner"),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
}

async fn issue_invite(app: &Router, identity: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/invites",
        Some(identity),
        Some(json!({ "target_role": role, "validity_nanos": HOUR_NANOS })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "invite failed: {body}");

    body["code"]
        .as_str()
        .map(str::to_owned)
        .unwrap_or_else(|| panic!("missing code in {body}"))
}

#[tokio::test]
async fn health_is_public_and_reports_the_store() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "store": "memory" }));
}

#[tokio::test]
async fn protected_routes_require_the_identity_header() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "session_unavailable");

    let (status, _) = send(&app, Method::GET, "/api/profile", Some("   "), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_bootstraps_the_owner_profile() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/profile", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    register(&app, "alice", "acme").await;

    let (status, body) = send(&app, Method::GET, "/api/profile", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company_id"], "acme");
    assert_eq!(body["role"], "owner");
    assert_eq!(body["active"], true);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/companies/acme/exists",
        Some("bob"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "exists": true }));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/companies",
        Some("bob"),
        Some(json!({ "company_id": "acme", "name": "Other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "duplicate");
}

#[tokio::test]
async fn invites_admit_one_member_and_then_report_already_used() {
    let app = app();
    register(&app, "alice", "acme").await;
    let code = issue_invite(&app, "alice", "employee").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/invites/redeem",
        Some("erin"),
        Some(json!({ "code": code, "user_name": "Erin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "redeem failed: {body}");
    assert_eq!(body["company_id"], "acme");
    assert_eq!(body["role"], "employee");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/invites/redeem",
        Some("frank"),
        Some(json!({ "code": code, "user_name": "Frank" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "already_used");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/invites/redeem",
        Some("frank"),
        Some(json!({ "code": "not-a-code", "user_name": "Frank" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "invalid_code");

    let (status, body) = send(&app, Method::GET, "/api/invites", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["status"], "consumed");
}

#[tokio::test]
async fn employees_cannot_issue_invites() {
    let app = app();
    register(&app, "alice", "acme").await;
    let code = issue_invite(&app, "alice", "employee").await;
    send(
        &app,
        Method::POST,
        "/api/invites/redeem",
        Some("erin"),
        Some(json!({ "code": code, "user_name": "Erin" })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/invites",
        Some("erin"),
        Some(json!({ "target_role": "employee", "validity_nanos": HOUR_NANOS })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "unauthorized");
}

#[tokio::test]
async fn foreign_and_missing_tasks_are_indistinguishable() {
    let app = app();
    register(&app, "alice", "acme").await;
    register(&app, "bob", "globex").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tasks",
        Some("alice"),
        Some(json!({
            "id": "t-1",
            "description": "Stock count",
            "priority": 2,
            "assignee": "alice",
            "starts_at": 10,
            "ends_at": 20,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "task create failed: {body}");
    assert_eq!(body["status"], "pending");

    let (foreign_status, foreign_body) =
        send(&app, Method::GET, "/api/tasks/t-1", Some("bob"), None).await;
    let (missing_status, missing_body) =
        send(&app, Method::GET, "/api/tasks/t-404", Some("bob"), None).await;

    assert_eq!(foreign_status, StatusCode::NOT_FOUND);
    assert_eq!(missing_status, StatusCode::NOT_FOUND);
    assert_eq!(foreign_body, missing_body);
    assert_eq!(foreign_body["kind"], "not_found");

    let (status, body) = send(&app, Method::GET, "/api/tasks/t-1", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company_id"], "acme");
}

#[tokio::test]
async fn reports_validate_their_type() {
    let app = app();
    register(&app, "alice", "acme").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/reports/gorev_tamamlanma",
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "report failed: {body}");
    assert_eq!(body["report_type"], "gorev_tamamlanma");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/reports/quarterly",
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/reports/gorev_tamamlanma",
        Some("stranger"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
