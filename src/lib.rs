//! # ElStudio - administration backend
//!
//! An HTTP API for authentication, user and role administration and the
//! organization record that holds outbound mail settings.
//!
//! ## Overview
//!
//! ElStudio can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `elstudio-server` binary
//! 2. **As a library** - Build the router yourself, e.g. in integration tests
//!
//! ### Building the application
//!
//! ```rust,ignore
//! use elstudio::{build_app, AppState, ElStudioConfig};
//! use elstudio::db::DatabaseProvider;
//! use elstudio::notify::LogNotifier;
//! use std::sync::Arc;
//!
//! let config = ElStudioConfig::load("elstudio.toml")?;
//! let db = DatabaseProvider::from_config(&config.database).create_client().await?;
//! let state = AppState::new(config, db, Arc::new(LogNotifier))?;
//! let app = build_app(state);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! //! | `turso` | Remote Turso database |
//! | `swagger-ui` | Interactive API documentation at `/swagger-ui` |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - Password hashing, tokens, authentication gate, role guard, account flows
//! - [`db`] - Credential store (SQLite, Turso)
//! - [`notify`] - Account e-mails
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Authentication, authorization and account flows.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// Database clients (Turso/SQLite).
pub mod db;
/// Outbound account notifications.
pub mod notify;
/// Core types (domain records, requests, responses, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use db::{DatabaseClient, TursoClient};
pub use types::{AppError, Result};
pub use utils::toml_config::ElStudioConfig;

use crate::auth::{accounts::AccountService, jwt::TokenService};
use crate::notify::{LogNotifier, MailTemplates, Notifier, SmtpNotifier};
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded at startup
    pub config: Arc<ElStudioConfig>,
    /// Credential store
    pub db: Arc<dyn DatabaseClient>,
    /// Token issuance and verification
    pub tokens: Arc<TokenService>,
    /// Account lifecycle flows
    pub accounts: Arc<AccountService>,
}

impl AppState {
    /// Wires the token service and account flows from the configuration.
    ///
    /// Fails when the signing secret or algorithm cannot be resolved.
    pub fn new(
        config: ElStudioConfig,
        db: Arc<dyn DatabaseClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let auth = config
            .auth_settings()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let tokens = Arc::new(TokenService::new(&auth.secret, auth.algorithm)?);
        let accounts = Arc::new(AccountService::new(
            db.clone(),
            tokens.clone(),
            notifier,
            auth.account_settings(),
        ));

        Ok(Self {
            config: Arc::new(config),
            db,
            tokens,
            accounts,
        })
    }
}

/// Picks the notifier for the `[mail]` section: SMTP when enabled, log-only otherwise.
pub fn build_notifier(config: &ElStudioConfig, db: Arc<dyn DatabaseClient>) -> Arc<dyn Notifier> {
    if config.mail.enabled {
        let templates = MailTemplates::new(&config.mail.product_name, &config.mail.frontend_url);
        Arc::new(SmtpNotifier::new(db, templates))
    } else {
        Arc::new(LogNotifier)
    }
}

/// Builds the full application: routes, CORS, request tracing and, with the
/// `swagger-ui` feature, the API documentation.
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors.allowed_origins);

    let router = api::routes::create_router();

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::openapi::ApiDoc::openapi()),
        )
    };

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
