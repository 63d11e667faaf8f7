//! HTTP API tests
//!
//! Drives the full router (routes, extractors, error mapping) through
//! `axum_test::TestServer` over an in-memory store.

mod common;

use axum::http::{header, HeaderValue, StatusCode};
use common::{admin_token, registered_user_token, test_server, test_state, ADMIN_EMAIL};
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_check() {
    let (state, _) = test_state().await;
    let server = test_server(state);

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_login_and_first_password_change() {
    let (state, notifier) = test_state().await;
    let server = test_server(state);

    let response = server
        .post("/auth/register")
        .json(&json!({
            "first_name": "Jane",
            "last_name": "Doe",
            "birth_date": "1990-04-12",
            "email": "jane@example.com"
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["email"], "jane@example.com");

    let temp = notifier.temp_password_for("jane@example.com").unwrap();
    let response = server
        .post("/auth/login")
        .json(&json!({ "email": "jane@example.com", "password": temp }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["must_change_password"], true);
    let token = body["access_token"].as_str().unwrap().to_string();

    // Default role when none is given
    let me: Value = server
        .get("/auth/me")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(me["email"], "jane@example.com");
    assert_eq!(me["roles"], json!(["employee"]));

    server
        .put("/auth/change-password-on-first-login")
        .authorization_bearer(&token)
        .json(&json!({ "new_password": "MyNewPass!" }))
        .await
        .assert_status_ok();

    let body: Value = server
        .post("/auth/login")
        .json(&json!({ "email": "jane@example.com", "password": "MyNewPass!" }))
        .await
        .json();
    assert_eq!(body["must_change_password"], false);
}

#[tokio::test]
async fn test_register_duplicate_email_is_conflict() {
    let (state, _) = test_state().await;
    let server = test_server(state);
    let payload = json!({
        "first_name": "Jane",
        "last_name": "Doe",
        "email": "dup@example.com",
        "roles": ["employee"]
    });

    server.post("/auth/register").json(&payload).await.assert_status_ok();
    let response = server.post("/auth/register").json(&payload).await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_register_bad_birth_date() {
    let (state, _) = test_state().await;
    let server = test_server(state);

    let response = server
        .post("/auth/register")
        .json(&json!({
            "first_name": "Jane",
            "last_name": "Doe",
            "birth_date": "12/04/1990",
            "email": "date@example.com"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let (state, _) = test_state().await;
    let server = test_server(state);

    let response = server
        .post("/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": "x" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.header(header::WWW_AUTHENTICATE), "Bearer");
    let body: Value = response.json();
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["detail"], "Invalid credentials");
}

#[tokio::test]
async fn test_malformed_bodies_use_error_format() {
    let (state, _) = test_state().await;
    let server = test_server(state);

    let response = server
        .post("/auth/login")
        .json(&json!({ "email": "a@x.com" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "bad_request");
    assert!(body["detail"].as_str().unwrap().contains("password"));

    let response = server
        .post("/auth/register")
        .json(&json!({ "first_name": 42 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_non_numeric_user_id_uses_error_format() {
    let (state, _) = test_state().await;
    let token = admin_token(&state).await;
    let server = test_server(state);

    let response = server
        .get("/users/abc")
        .authorization_bearer(&token)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (state, _) = test_state().await;
    let server = test_server(state);

    server
        .get("/auth/me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server.get("/me").await.assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/users/1")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/auth/me")
        .authorization_bearer("not-a-token")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/auth/me")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_of_deleted_user_is_rejected() {
    let (state, notifier) = test_state().await;
    let (user_id, token) = registered_user_token(&state, &notifier, "gone@example.com").await;
    state.db.delete_user(user_id).await.unwrap();
    let server = test_server(state);

    server
        .get("/me")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_employee_is_forbidden_from_admin_routes() {
    let (state, notifier) = test_state().await;
    let (user_id, token) = registered_user_token(&state, &notifier, "emp@example.com").await;
    let server = test_server(state);

    let response = server.get("/users").authorization_bearer(&token).await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"], "forbidden");

    server
        .post("/roles")
        .authorization_bearer(&token)
        .json(&json!({ "name": "manager" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    server
        .put("/organization")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Hijacked" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    server
        .delete(&format!("/users/{}", user_id))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    // Any authenticated user may read a user record
    server
        .get(&format!("/users/{}", user_id))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_admin_user_management() {
    let (state, notifier) = test_state().await;
    let admin = admin_token(&state).await;
    let (user_id, _) = registered_user_token(&state, &notifier, "staff@example.com").await;
    let server = test_server(state);

    let users: Value = server.get("/users").authorization_bearer(&admin).await.json();
    let list = users.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.iter().any(|u| u["email"] == ADMIN_EMAIL));
    assert!(list.iter().all(|u| u.get("password_hash").is_none()));

    server
        .put(&format!("/users/{}", user_id))
        .authorization_bearer(&admin)
        .json(&json!({
            "last_name": "Smith",
            "is_active": false,
            "roles": ["super_admin"]
        }))
        .await
        .assert_status_ok();

    let details: Value = server
        .get(&format!("/users/{}", user_id))
        .authorization_bearer(&admin)
        .await
        .json();
    assert_eq!(details["last_name"], "Smith");
    assert_eq!(details["first_name"], "Jane");
    assert_eq!(details["is_active"], false);
    assert_eq!(details["roles"][0]["name"], "super_admin");

    server
        .put(&format!("/users/reactivate/{}", user_id))
        .authorization_bearer(&admin)
        .await
        .assert_status_ok();
    let details: Value = server
        .get(&format!("/users/{}", user_id))
        .authorization_bearer(&admin)
        .await
        .json();
    assert_eq!(details["is_active"], true);

    server
        .put(&format!("/users/{}", user_id))
        .authorization_bearer(&admin)
        .json(&json!({ "email": ADMIN_EMAIL }))
        .await
        .assert_status(StatusCode::CONFLICT);

    server
        .delete(&format!("/users/{}", user_id))
        .authorization_bearer(&admin)
        .await
        .assert_status_ok();
    server
        .get(&format!("/users/{}", user_id))
        .authorization_bearer(&admin)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .put("/users/reactivate/9999")
        .authorization_bearer(&admin)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_own_profile() {
    let (state, notifier) = test_state().await;
    let (_, token) = registered_user_token(&state, &notifier, "me@example.com").await;
    let server = test_server(state);

    server
        .put("/users/me")
        .authorization_bearer(&token)
        .json(&json!({ "theme": "dark", "language": "en" }))
        .await
        .assert_status_ok();

    let me: Value = server.get("/me").authorization_bearer(&token).await.json();
    assert_eq!(me["theme"], "dark");
    assert_eq!(me["language"], "en");
    assert_eq!(me["first_name"], "Jane");

    server
        .put("/users/me")
        .authorization_bearer(&token)
        .json(&json!({ "birth_date": "not-a-date" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_roles_endpoints() {
    let (state, _) = test_state().await;
    let admin = admin_token(&state).await;
    let server = test_server(state);

    // Public listing
    let roles: Value = server.get("/roles").await.json();
    assert_eq!(roles.as_array().unwrap().len(), 2);

    let created: Value = server
        .post("/roles")
        .authorization_bearer(&admin)
        .json(&json!({ "name": "manager" }))
        .await
        .json();
    assert_eq!(created["name"], "manager");
    let id = created["id"].as_i64().unwrap();

    server
        .post("/roles")
        .authorization_bearer(&admin)
        .json(&json!({ "name": "manager" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    let renamed: Value = server
        .put(&format!("/roles/{}", id))
        .authorization_bearer(&admin)
        .json(&json!({ "name": "team_lead" }))
        .await
        .json();
    assert_eq!(renamed["name"], "team_lead");

    server
        .delete(&format!("/roles/{}", id))
        .authorization_bearer(&admin)
        .await
        .assert_status_ok();
    server
        .delete(&format!("/roles/{}", id))
        .authorization_bearer(&admin)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_organization_endpoints() {
    let (state, _) = test_state().await;
    let admin = admin_token(&state).await;
    let server = test_server(state);

    server
        .get("/organization")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let created: Value = server
        .post("/organization")
        .authorization_bearer(&admin)
        .json(&json!({
            "name": "Acme",
            "smtp_host": "smtp.acme.test",
            "smtp_port": 587,
            "smtp_password": "hunter2",
            "smtp_use_tls": true
        }))
        .await
        .json();
    assert_eq!(created["id"], 1);
    assert_eq!(created["name"], "Acme");

    server
        .post("/organization")
        .authorization_bearer(&admin)
        .json(&json!({ "name": "Second" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    let updated: Value = server
        .put("/organization")
        .authorization_bearer(&admin)
        .json(&json!({ "default_from_email": "noreply@acme.test" }))
        .await
        .json();
    assert_eq!(updated["name"], "Acme");
    assert_eq!(updated["default_from_email"], "noreply@acme.test");

    // Public read never exposes the SMTP password
    let org: Value = server.get("/organization").await.json();
    assert_eq!(org["smtp_port"], 587);
    assert_eq!(org["smtp_use_tls"], true);
    assert!(org.get("smtp_password").is_none());
}

#[tokio::test]
async fn test_forgot_and_reset_password_endpoints() {
    let (state, notifier) = test_state().await;
    registered_user_token(&state, &notifier, "forgot@example.com").await;
    let server = test_server(state);

    server
        .post("/auth/forgot-password")
        .json(&json!({ "email": "unknown@example.com" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .post("/auth/forgot-password")
        .json(&json!({ "email": "forgot@example.com" }))
        .await
        .assert_status_ok();
    let token = notifier.reset_token_for("forgot@example.com").unwrap();

    let response = server
        .post("/auth/reset-password")
        .json(&json!({ "token": "garbage", "new_password": "x1y2z3" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Invalid or expired token");

    server
        .post("/auth/reset-password")
        .json(&json!({ "token": token, "new_password": "FreshPass42" }))
        .await
        .assert_status_ok();

    server
        .post("/auth/login")
        .json(&json!({ "email": "forgot@example.com", "password": "FreshPass42" }))
        .await
        .assert_status_ok();
}
