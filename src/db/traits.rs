//! Database abstraction traits
//!
//! This module provides the `DatabaseClient` trait that abstracts over different
//! database backends (in-memory SQLite, file-based SQLite, remote Turso).
//!
//! # Example
//!
//! ```rust,ignore
//! use elstudio::db::{DatabaseClient, DatabaseProvider};
//!
//! // Use in-memory database (default for development/testing)
//! let db = DatabaseProvider::Memory.create_client().await?;
//!
//! // Use file-based SQLite
//! let db = DatabaseProvider::SQLite { path: "data.db".into() }.create_client().await?;
//! ```

use crate::types::{NewUser, Organization, Result, Role, User};
use async_trait::async_trait;
use std::sync::Arc;

/// Database provider configuration
#[derive(Debug, Clone, Default)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
    /// Remote Turso database (requires network access)
    #[cfg(feature = "turso")]
    Turso {
        /// The Turso database URL (e.g., `libsql://your-db.turso.io`)
        url: String,
        /// Authentication token for the Turso database
        auth_token: String,
    },
}

impl DatabaseProvider {
    /// Create a database client from this provider configuration
    pub async fn create_client(&self) -> Result<Arc<dyn DatabaseClient>> {
        match self {
            DatabaseProvider::Memory => {
                let client = super::turso::TursoClient::new_memory().await?;
                Ok(Arc::new(client))
            }
            DatabaseProvider::SQLite { path } => {
                let client = super::turso::TursoClient::new_local(path).await?;
                Ok(Arc::new(client))
            }
            #[cfg(feature = "turso")]
            DatabaseProvider::Turso { url, auth_token } => {
                let client =
                    super::turso::TursoClient::new_remote(url.clone(), auth_token.clone()).await?;
                Ok(Arc::new(client))
            }
        }
    }

    /// Picks a provider from the `[database]` configuration section.
    ///
    /// Turso wins when both of its environment variables are set and the
    /// `turso` feature is enabled; `:memory:` selects the ephemeral store.
    pub fn from_config(config: &crate::utils::toml_config::DatabaseConfig) -> Self {
        #[cfg(feature = "turso")]
        {
            if let (Some(url_env), Some(token_env)) =
                (&config.turso_url_env, &config.turso_token_env)
            {
                if let (Ok(url), Ok(token)) = (std::env::var(url_env), std::env::var(token_env)) {
                    if !url.is_empty() && !token.is_empty() {
                        return DatabaseProvider::Turso {
                            url,
                            auth_token: token,
                        };
                    }
                }
            }
        }

        if config.url.is_empty() || config.url == ":memory:" {
            DatabaseProvider::Memory
        } else {
            DatabaseProvider::SQLite {
                path: config.url.clone(),
            }
        }
    }
}

/// Credential store operations used by the API and the account flows.
///
/// Every write is a single commit; concurrent updates to one record are
/// last-write-wins.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    // ============== User Operations ==============

    /// Insert a user and link the given role ids. Fails with `Conflict` when the email is taken.
    async fn create_user(&self, user: &NewUser, role_ids: &[i64]) -> Result<i64>;

    /// Get a user (with roles) by primary key
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get a user (with roles) by exact email match
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List every user with their roles, oldest first
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Persist every mutable column of `user`. Roles are not touched.
    async fn update_user(&self, user: &User) -> Result<()>;

    /// Replace the role set of a user
    async fn set_user_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<()>;

    /// Delete a user and its role links. Returns false when no such user exists.
    async fn delete_user(&self, id: i64) -> Result<bool>;

    // ============== Role Operations ==============

    /// List every role
    async fn list_roles(&self) -> Result<Vec<Role>>;

    /// Resolve role names to stored roles; unknown names are skipped
    async fn get_roles_by_names(&self, names: &[String]) -> Result<Vec<Role>>;

    /// Create a role. Fails with `Conflict` on a duplicate name.
    async fn create_role(&self, name: &str) -> Result<Role>;

    /// Rename a role. Returns `None` when the id does not exist.
    async fn rename_role(&self, id: i64, name: &str) -> Result<Option<Role>>;

    /// Delete a role and unlink it from users
    async fn delete_role(&self, id: i64) -> Result<bool>;

    // ============== Organization Operations ==============

    /// The organization record, if it has been created
    async fn get_organization(&self) -> Result<Option<Organization>>;

    /// Create the organization record. Fails with `Conflict` if it already exists.
    async fn create_organization(&self, org: &Organization) -> Result<Organization>;

    /// Persist every column of the organization record
    async fn update_organization(&self, org: &Organization) -> Result<()>;
}

// ============== Implement DatabaseClient for TursoClient ==============

#[async_trait]
impl DatabaseClient for super::turso::TursoClient {
    async fn create_user(&self, user: &NewUser, role_ids: &[i64]) -> Result<i64> {
        self.insert_user(user, role_ids).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.find_user("id", id.into()).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_user("email", email.into()).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.all_users().await
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        self.write_user(user).await
    }

    async fn set_user_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<()> {
        self.replace_roles(user_id, role_ids).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.remove_user(id).await
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        self.all_roles().await
    }

    async fn get_roles_by_names(&self, names: &[String]) -> Result<Vec<Role>> {
        let roles = self.all_roles().await?;

        Ok(roles
            .into_iter()
            .filter(|role| names.iter().any(|n| n == &role.name))
            .collect())
    }

    async fn create_role(&self, name: &str) -> Result<Role> {
        self.insert_role(name).await
    }

    async fn rename_role(&self, id: i64, name: &str) -> Result<Option<Role>> {
        if self.write_role_name(id, name).await? {
            Ok(Some(Role {
                id,
                name: name.to_string(),
            }))
        } else {
            Ok(None)
        }
    }

    async fn delete_role(&self, id: i64) -> Result<bool> {
        self.remove_role(id).await
    }

    async fn get_organization(&self) -> Result<Option<Organization>> {
        self.load_organization().await
    }

    async fn create_organization(&self, org: &Organization) -> Result<Organization> {
        self.insert_organization(org).await
    }

    async fn update_organization(&self, org: &Organization) -> Result<()> {
        self.write_organization(org).await
    }
}
