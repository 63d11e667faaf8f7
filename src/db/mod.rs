//! Credential store.
//!
//! Users, roles and the organization record live in a libsql database:
//! - **In-memory**: ephemeral, used by the test suite
//! - **Local SQLite**: default for development (`[database] url`)
//! - **Turso**: remote libsql, enabled with the `turso` feature
//!
//! Handlers and account flows only see the [`DatabaseClient`] trait.

#![allow(missing_docs)]

pub mod traits;
pub mod turso;

// Re-exports
pub use traits::{DatabaseClient, DatabaseProvider};
pub use turso::TursoClient;
