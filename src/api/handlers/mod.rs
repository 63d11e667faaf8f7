//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Authentication handlers (login, registration, password flows).
pub mod auth;
/// Health check.
pub mod health;
/// Organization record handlers.
pub mod organization;
/// Role management handlers.
pub mod roles;
/// User management handlers.
pub mod users;
