//! Authentication and Authorization
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - Argon2 hashing and temporary password generation
//! - [`auth::jwt`](crate::auth::jwt) - signed, expiring session and reset tokens
//! - [`auth::middleware`](crate::auth::middleware) - bearer token resolution and the [`AuthUser`](crate::auth::middleware::AuthUser) extractor
//! - [`auth::guard`](crate::auth::guard) - role checks for protected operations
//! - [`auth::accounts`](crate::auth::accounts) - login, registration and password flows
//!
//! # Extracting the Current User in Handlers
//!
//! ```ignore
//! use elstudio::auth::{guard, middleware::AuthUser};
//!
//! async fn admin_only(AuthUser(user): AuthUser) -> Result<Json<MeResponse>> {
//!     guard::require(&user, &[guard::SUPER_ADMIN])?;
//!     Ok(Json(MeResponse::from(&user)))
//! }
//! ```
//!
//! # Configuration
//!
//! Configure via `elstudio.toml`:
//! ```toml
//! [auth]
//! secret_key_env = "SECRET_KEY"   # Name of the env var holding the signing secret
//! algorithm = "HS256"
//! access_token_minutes = 15
//! reset_token_minutes = 30
//! ```

/// Account lifecycle flows.
pub mod accounts;
/// Role-based access checks.
pub mod guard;
/// Token issuance and verification.
pub mod jwt;
/// Authentication gate and extractors for protected routes.
pub mod middleware;
/// Password hashing.
pub mod password;
