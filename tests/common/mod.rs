//! Shared helpers for the integration tests.

#![allow(dead_code)]

pub mod mocks;

use axum_test::TestServer;
use elstudio::{
    auth::jwt::TokenService,
    build_app,
    cli::admin::create_admin,
    db::DatabaseProvider,
    notify::Notifier,
    types::RegisterRequest,
    AppState, DatabaseClient, ElStudioConfig,
};
use mocks::RecordingNotifier;
use std::sync::Arc;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-pass-123";

/// Defaults with an in-memory store and mail disabled.
pub fn test_config() -> ElStudioConfig {
    let mut config = ElStudioConfig::default();
    config.database.url = ":memory:".to_string();
    config.mail.enabled = false;
    config
}

pub async fn memory_store() -> Arc<dyn DatabaseClient> {
    DatabaseProvider::Memory
        .create_client()
        .await
        .expect("Failed to create in-memory database")
}

/// State over a fresh store, wired to the given notifier.
pub async fn test_state_with(notifier: Arc<dyn Notifier>) -> AppState {
    AppState::new(test_config(), memory_store().await, notifier)
        .expect("Failed to build application state")
}

pub async fn test_state() -> (AppState, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let state = test_state_with(notifier.clone()).await;
    (state, notifier)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(build_app(state)).expect("Failed to create test server")
}

/// Token service using the same secret as `test_state`.
pub fn test_tokens() -> TokenService {
    let auth = test_config()
        .auth_settings()
        .expect("auth settings should resolve");
    TokenService::new(&auth.secret, auth.algorithm).expect("HMAC token service")
}

pub fn register_request(email: &str, roles: &[&str]) -> RegisterRequest {
    RegisterRequest {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        birth_date: Some("1990-04-12".to_string()),
        email: email.to_string(),
        password: None,
        roles: roles.iter().map(|r| r.to_string()).collect(),
    }
}

/// Creates the bootstrap super_admin and returns a session token for it.
pub async fn admin_token(state: &AppState) -> String {
    create_admin(state.db.as_ref(), ADMIN_EMAIL, ADMIN_PASSWORD, "Root", "Admin")
        .await
        .expect("Failed to create admin");

    state
        .accounts
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("admin login")
        .access_token
}

/// Registers `email` and logs in with the mailed temporary password.
pub async fn registered_user_token(
    state: &AppState,
    notifier: &RecordingNotifier,
    email: &str,
) -> (i64, String) {
    let registration = state
        .accounts
        .register(&register_request(email, &["employee"]))
        .await
        .expect("register");
    let temp = notifier
        .temp_password_for(email)
        .expect("invitation should carry the temporary password");
    let login = state.accounts.login(email, &temp).await.expect("login");
    (registration.user_id, login.access_token)
}
