//! HTTP API Handlers and Routes
//!
//! # Module Structure
//!
//! - [`api::extract`](crate::api::extract) - Body and path extractors
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route table
//! - [`api::openapi`](crate::api::openapi) - OpenAPI document
//!
//! # API Endpoints
//!
//! ## Authentication (`/auth`)
//! - `POST /auth/login` - Exchange credentials for a bearer token
//! - `POST /auth/register` - Create an account and mail a temporary password
//! - `PUT /auth/change-password-on-first-login` - Replace the temporary password
//! - `GET /auth/me` (also `GET /me`) - Current user
//! - `POST /auth/forgot-password` - Mail a reset link
//! - `POST /auth/reset-password` - Set a new password from a reset token
//!
//! ## Users (`/users`)
//! - `GET /users` - List users (super_admin)
//! - `GET /users/{id}` - User details
//! - `PUT /users/me` - Update own profile
//! - `PUT /users/{id}`, `DELETE /users/{id}` - Administer a user (super_admin)
//! - `PUT /users/reactivate/{id}` - Reactivate a user (super_admin)
//!
//! ## Roles (`/roles`)
//! - `GET /roles` - List roles (public)
//! - `POST /roles`, `PUT /roles/{id}`, `DELETE /roles/{id}` - super_admin
//!
//! ## Organization (`/organization`)
//! - `GET /organization` - Organization record (public)
//! - `POST /organization`, `PUT /organization` - super_admin
//!
//! # Authentication
//!
//! Protected endpoints require a valid token in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

/// JSON body and path extractors with API-shaped rejections.
pub mod extract;
/// Request and response handlers for all API endpoints.
pub mod handlers;
/// OpenAPI document.
pub mod openapi;
/// Router configuration and route definitions.
pub mod routes;
