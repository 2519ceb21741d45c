use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::auth::ServerState;
use server::startup::build_app;
use service::auth::domain::UserStatus;
use service::auth::otp::CodeGenerator;
use service::auth::repository::mock::MockAuthRepository;
use service::auth::{AuthConfig, AuthService};
use service::email::memory::MemoryEmailSender;

const CODE: &str = "135790";

struct FixedCode;

impl CodeGenerator for FixedCode {
    fn generate(&self) -> String { CODE.into() }
}

struct TestApp {
    app: Router,
    repo: Arc<MockAuthRepository>,
    mailer: Arc<MemoryEmailSender>,
}

fn test_app() -> TestApp {
    let repo = Arc::new(MockAuthRepository::default());
    let mailer = Arc::new(MemoryEmailSender::default());
    let svc = AuthService::new(repo.clone(), mailer.clone(), AuthConfig::new("router-test-secret"))
        .with_code_generator(Arc::new(FixedCode));
    let app = build_app(ServerState { auth: Arc::new(svc) });
    TestApp { app, repo, mailer }
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn send(app: &Router, req: Request<Body>) -> Reply {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply { status, headers, body }
}

async fn post(app: &Router, uri: &str, body: Value) -> Reply {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

async fn with_bearer(app: &Router, method: &str, uri: &str, token: &str, body: Option<Value>) -> Reply {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    let req = match body {
        Some(b) => builder.header(header::CONTENT_TYPE, "application/json").body(Body::from(b.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    send(app, req).await
}

fn driver(email: &str) -> Value {
    json!({
        "name": "Ann Driver",
        "email": email,
        "password": "Secret123",
        "plateNumber": "KDA 001A",
        "preferredEntryTime": "08:00",
        "preferredExitTime": "17:00"
    })
}

/// Register, verify and approve a driver; returns a bearer token.
async fn approved_driver(t: &TestApp, email: &str) -> String {
    assert_eq!(post(&t.app, "/register", driver(email)).await.status, StatusCode::OK);
    assert_eq!(post(&t.app, "/verify-email", json!({"email": email, "code": CODE})).await.status, StatusCode::OK);
    t.repo.set_user_status(email, UserStatus::Approved);
    let login = post(&t.app, "/login", json!({"email": email, "password": "Secret123"})).await;
    assert_eq!(login.status, StatusCode::OK);
    login.body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_ok() {
    let t = test_app();
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let reply = send(&t.app, req).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({"status": "ok"}));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let t = test_app();
    let req = Request::builder().uri("/api-docs/openapi.json").body(Body::empty()).unwrap();
    let reply = send(&t.app, req).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body["paths"]["/register"].is_object());
}

#[tokio::test]
async fn registration_to_profile_walkthrough() {
    let t = test_app();
    let email = "ann@example.com";

    let reply = post(&t.app, "/register", driver(email)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["success"], true);
    assert!(reply.body["data"]["userId"].is_string());
    assert_eq!(t.mailer.sent_to(email).len(), 1);

    let dup = post(&t.app, "/register", driver(email)).await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.body["success"], false);
    assert_eq!(dup.body["message"], "Email already registered");
    assert_eq!(t.repo.user_count(), 1);

    let wrong = post(&t.app, "/verify-email", json!({"email": email, "code": "000000"})).await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);

    let ok = post(&t.app, "/verify-email", json!({"email": email, "code": CODE})).await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["success"], true);

    let pending = post(&t.app, "/login", json!({"email": email, "password": "Secret123"})).await;
    assert_eq!(pending.status, StatusCode::UNAUTHORIZED);
    assert_eq!(pending.body["message"], "Your account is pending approval");

    t.repo.set_user_status(email, UserStatus::Approved);
    let login = post(&t.app, "/login", json!({"email": email, "password": "Secret123"})).await;
    assert_eq!(login.status, StatusCode::OK);
    let user = &login.body["data"]["user"];
    assert_eq!(user["email"], email);
    assert_eq!(user["status"], "approved");
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());
    let cookie = login.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("HttpOnly"));

    let token = login.body["data"]["token"].as_str().unwrap();
    let profile = with_bearer(&t.app, "GET", "/profile", token, None).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["data"]["plateNumber"], "KDA 001A");
    assert_eq!(profile.body["data"]["role"], "user");
}

#[tokio::test]
async fn missing_field_is_rejected_without_row() {
    let t = test_app();
    let mut body = driver("ann@example.com");
    body.as_object_mut().unwrap().remove("plateNumber");
    let reply = post(&t.app, "/register", body).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "All fields are required");
    assert_eq!(t.repo.user_count(), 0);
}

#[tokio::test]
async fn malformed_json_gets_the_envelope() {
    let t = test_app();
    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let reply = send(&t.app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["success"], false);
}

#[tokio::test]
async fn unverified_login_is_distinct_from_bad_credentials() {
    let t = test_app();
    post(&t.app, "/register", driver("ann@example.com")).await;

    let bad = post(&t.app, "/login", json!({"email": "ann@example.com", "password": "nope-nope"})).await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad.body["message"], "Invalid credentials");

    let unverified = post(&t.app, "/login", json!({"email": "ann@example.com", "password": "Secret123"})).await;
    assert_eq!(unverified.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unverified.body["message"], "Please verify your email before logging in");
}

#[tokio::test]
async fn profile_requires_a_user_token() {
    let t = test_app();

    let req = Request::builder().uri("/profile").body(Body::empty()).unwrap();
    let missing = send(&t.app, req).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["success"], false);

    let garbage = with_bearer(&t.app, "GET", "/profile", "not.a.jwt", None).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    post(&t.app, "/admin/register", json!({"name": "Ops", "email": "ops@example.com", "password": "Secret123"})).await;
    post(&t.app, "/admin/verify-email", json!({"email": "ops@example.com", "code": CODE})).await;
    let admin = post(&t.app, "/admin/login", json!({"email": "ops@example.com", "password": "Secret123"})).await;
    assert_eq!(admin.status, StatusCode::OK);
    assert_eq!(admin.body["data"]["user"]["role"], "admin");
    let admin_token = admin.body["data"]["token"].as_str().unwrap();
    let denied = with_bearer(&t.app, "GET", "/profile", admin_token, None).await;
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cookie_authenticates_profile_requests() {
    let t = test_app();
    let token = approved_driver(&t, "ann@example.com").await;
    let req = Request::builder()
        .uri("/profile")
        .header(header::COOKIE, format!("auth_token={token}"))
        .body(Body::empty())
        .unwrap();
    let reply = send(&t.app, req).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["email"], "ann@example.com");
}

#[tokio::test]
async fn profile_update_and_conflict() {
    let t = test_app();
    let token = approved_driver(&t, "ann@example.com").await;
    post(&t.app, "/register", driver("bob@example.com")).await;

    let taken = with_bearer(&t.app, "PUT", "/profile", &token, Some(json!({"email": "bob@example.com"}))).await;
    assert_eq!(taken.status, StatusCode::BAD_REQUEST);

    let renamed = with_bearer(&t.app, "PUT", "/profile", &token, Some(json!({"name": "Ann B."}))).await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["data"]["name"], "Ann B.");
    assert_eq!(renamed.body["data"]["email"], "ann@example.com");
}

#[tokio::test]
async fn change_password_with_wrong_current_keeps_hash() {
    let t = test_app();
    let token = approved_driver(&t, "ann@example.com").await;
    let before = t.repo.user_by_email("ann@example.com").unwrap().password_hash;

    let reply = with_bearer(
        &t.app,
        "PUT",
        "/change-password",
        &token,
        Some(json!({"currentPassword": "wrong-one", "newPassword": "Another123"})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["message"], "Current password is incorrect");
    assert_eq!(t.repo.user_by_email("ann@example.com").unwrap().password_hash, before);

    let ok = with_bearer(
        &t.app,
        "PUT",
        "/change-password",
        &token,
        Some(json!({"currentPassword": "Secret123", "newPassword": "Another123"})),
    )
    .await;
    assert_eq!(ok.status, StatusCode::OK);
    let relogin = post(&t.app, "/login", json!({"email": "ann@example.com", "password": "Another123"})).await;
    assert_eq!(relogin.status, StatusCode::OK);
}

#[tokio::test]
async fn password_reset_over_http() {
    let t = test_app();
    approved_driver(&t, "ann@example.com").await;

    let bad_role = post(&t.app, "/forgot-password", json!({"email": "ann@example.com", "role": "root"})).await;
    assert_eq!(bad_role.status, StatusCode::BAD_REQUEST);

    let unknown = post(&t.app, "/forgot-password", json!({"email": "ghost@example.com", "role": "user"})).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let forgot = post(&t.app, "/forgot-password", json!({"email": "ann@example.com", "role": "user"})).await;
    assert_eq!(forgot.status, StatusCode::OK);

    let short = post(
        &t.app,
        "/reset-password",
        json!({"email": "ann@example.com", "code": CODE, "newPassword": "short", "role": "user"}),
    )
    .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let reset = post(
        &t.app,
        "/reset-password",
        json!({"email": "ann@example.com", "code": CODE, "newPassword": "BrandNew123", "role": "user"}),
    )
    .await;
    assert_eq!(reset.status, StatusCode::OK);

    let old = post(&t.app, "/login", json!({"email": "ann@example.com", "password": "Secret123"})).await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
    let new = post(&t.app, "/login", json!({"email": "ann@example.com", "password": "BrandNew123"})).await;
    assert_eq!(new.status, StatusCode::OK);
}

#[tokio::test]
async fn downstream_failure_is_a_generic_500() {
    let t = test_app();
    t.mailer.set_failing(true);
    let reply = post(&t.app, "/register", driver("ann@example.com")).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.body, json!({"success": false, "message": "Internal server error"}));
}
