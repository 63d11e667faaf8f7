use crate::types::{AppError, NewUser, Organization, Result, Role, User, DATE_FORMAT};
use chrono::{DateTime, NaiveDate, Utc};
use libsql::{params, Builder, Connection, Database, Row};
use std::collections::HashMap;

/// Roles present in every fresh database.
pub const SEED_ROLES: [&str; 2] = ["employee", "super_admin"];

/// Fixed primary key of the single organization row.
pub const ORGANIZATION_ID: i64 = 1;

const USER_COLUMNS: &str = "id, first_name, last_name, birth_date, email, password_hash, \
     is_active, must_change_password, language, date_format, theme, created_at";

const ORGANIZATION_COLUMNS: &str = "id, name, logo_url, smtp_host, smtp_port, smtp_user, \
     smtp_password, smtp_use_tls, smtp_use_ssl, default_from_email";

/// libsql-backed credential store.
///
/// A single connection is opened at startup and shared; for `:memory:`
/// databases this is what keeps the data alive between calls.
pub struct TursoClient {
    _db: Database,
    conn: Connection,
}

impl TursoClient {
    /// Opens an ephemeral in-memory database.
    pub async fn new_memory() -> Result<Self> {
        Self::new_local(":memory:").await
    }

    /// Opens (or creates) a local SQLite file.
    pub async fn new_local(path: &str) -> Result<Self> {
        if path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::Database(format!("Failed to create database directory: {}", e))
                    })?;
                }
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        Self::from_database(db).await
    }

    /// Connects to a remote Turso database.
    pub async fn new_remote(url: String, auth_token: String) -> Result<Self> {
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Turso: {}", e)))?;

        Self::from_database(db).await
    }

    async fn from_database(db: Database) -> Result<Self> {
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let client = Self { _db: db, conn };
        client.initialize_schema().await?;

        Ok(client)
    }

    pub fn connection(&self) -> Result<Connection> {
        Ok(self.conn.clone())
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to enable foreign keys: {}", e)))?;

        // Users table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                birth_date TEXT,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                must_change_password INTEGER NOT NULL DEFAULT 1,
                language TEXT NOT NULL DEFAULT 'fr',
                date_format TEXT NOT NULL DEFAULT 'DD/MM/YYYY',
                theme TEXT NOT NULL DEFAULT 'light',
                created_at TEXT NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        // Roles table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS roles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create roles table: {}", e)))?;

        // User <-> role association
        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_roles (
                user_id INTEGER NOT NULL,
                role_id INTEGER NOT NULL,
                PRIMARY KEY (user_id, role_id),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (role_id) REFERENCES roles(id) ON DELETE CASCADE
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create user_roles table: {}", e)))?;

        // Organization table, restricted to a single row
        conn.execute(
            "CREATE TABLE IF NOT EXISTS organizations (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                name TEXT,
                logo_url TEXT,
                smtp_host TEXT,
                smtp_port INTEGER,
                smtp_user TEXT,
                smtp_password TEXT,
                smtp_use_tls INTEGER NOT NULL DEFAULT 0,
                smtp_use_ssl INTEGER NOT NULL DEFAULT 0,
                default_from_email TEXT
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create organizations table: {}", e)))?;

        for name in SEED_ROLES {
            conn.execute("INSERT OR IGNORE INTO roles (name) VALUES (?)", [name])
                .await
                .map_err(|e| AppError::Database(format!("Failed to seed role {}: {}", name, e)))?;
        }

        Ok(())
    }

    // User operations
    pub(crate) async fn insert_user(&self, user: &NewUser, role_ids: &[i64]) -> Result<i64> {
        let conn = self.connection()?;
        let now = Utc::now().to_rfc3339();

        let mut rows = conn
            .query(
                "INSERT INTO users (first_name, last_name, birth_date, email, password_hash,
                                    is_active, must_change_password, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                 RETURNING id",
                params![
                    user.first_name.as_str(),
                    user.last_name.as_str(),
                    format_date(user.birth_date),
                    user.email.as_str(),
                    user.password_hash.as_str(),
                    user.is_active as i64,
                    user.must_change_password as i64,
                    now,
                ],
            )
            .await
            .map_err(|e| write_error("create user", e))?;

        let id = returned_id(&mut rows, "create user").await?;
        drop(rows);
        self.replace_roles(id, role_ids).await?;

        Ok(id)
    }

    pub(crate) async fn find_user(&self, column: &str, value: libsql::Value) -> Result<Option<User>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                &format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, column),
                [value],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        let row = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(row) => {
                let mut user = user_from_row(&row)?;
                user.roles = self.roles_for_user(user.id).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    pub(crate) async fn all_users(&self) -> Result<Vec<User>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                &format!("SELECT {} FROM users ORDER BY id ASC", USER_COLUMNS),
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query users: {}", e)))?;

        let mut users = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            users.push(user_from_row(&row)?);
        }

        let mut roles_by_user = self.role_links().await?;
        for user in &mut users {
            user.roles = roles_by_user.remove(&user.id).unwrap_or_default();
        }

        Ok(users)
    }

    pub(crate) async fn write_user(&self, user: &User) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "UPDATE users SET first_name = ?, last_name = ?, birth_date = ?, email = ?,
                    password_hash = ?, is_active = ?, must_change_password = ?,
                    language = ?, date_format = ?, theme = ?
             WHERE id = ?",
            params![
                user.first_name.as_str(),
                user.last_name.as_str(),
                format_date(user.birth_date),
                user.email.as_str(),
                user.password_hash.as_str(),
                user.is_active as i64,
                user.must_change_password as i64,
                user.language.as_str(),
                user.date_format.as_str(),
                user.theme.as_str(),
                user.id,
            ],
        )
        .await
        .map_err(|e| write_error("update user", e))?;

        Ok(())
    }

    pub(crate) async fn remove_user(&self, id: i64) -> Result<bool> {
        let conn = self.connection()?;

        conn.execute("DELETE FROM user_roles WHERE user_id = ?", [id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to unlink user roles: {}", e)))?;

        let affected = conn
            .execute("DELETE FROM users WHERE id = ?", [id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete user: {}", e)))?;

        Ok(affected > 0)
    }

    pub(crate) async fn replace_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<()> {
        let conn = self.connection()?;

        conn.execute("DELETE FROM user_roles WHERE user_id = ?", [user_id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to clear user roles: {}", e)))?;

        for role_id in role_ids {
            conn.execute(
                "INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?, ?)",
                params![user_id, *role_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to link role: {}", e)))?;
        }

        Ok(())
    }

    async fn roles_for_user(&self, user_id: i64) -> Result<Vec<Role>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT r.id, r.name FROM roles r
                 JOIN user_roles ur ON ur.role_id = r.id
                 WHERE ur.user_id = ?
                 ORDER BY r.id ASC",
                [user_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user roles: {}", e)))?;

        let mut roles = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            roles.push(role_from_row(&row)?);
        }

        Ok(roles)
    }

    async fn role_links(&self) -> Result<HashMap<i64, Vec<Role>>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT ur.user_id, r.id, r.name FROM user_roles ur
                 JOIN roles r ON r.id = ur.role_id
                 ORDER BY r.id ASC",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query role links: {}", e)))?;

        let mut links: HashMap<i64, Vec<Role>> = HashMap::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            let user_id: i64 = row.get(0).map_err(|e| AppError::Database(e.to_string()))?;
            links.entry(user_id).or_default().push(Role {
                id: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
                name: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
            });
        }

        Ok(links)
    }

    // Role operations
    pub(crate) async fn all_roles(&self) -> Result<Vec<Role>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query("SELECT id, name FROM roles ORDER BY id ASC", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query roles: {}", e)))?;

        let mut roles = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            roles.push(role_from_row(&row)?);
        }

        Ok(roles)
    }

    pub(crate) async fn insert_role(&self, name: &str) -> Result<Role> {
        let conn = self.connection()?;

        let mut rows = conn
            .query("INSERT INTO roles (name) VALUES (?) RETURNING id", [name])
            .await
            .map_err(|e| write_error("create role", e))?;

        Ok(Role {
            id: returned_id(&mut rows, "create role").await?,
            name: name.to_string(),
        })
    }

    pub(crate) async fn write_role_name(&self, id: i64, name: &str) -> Result<bool> {
        let conn = self.connection()?;

        let affected = conn
            .execute("UPDATE roles SET name = ? WHERE id = ?", params![name, id])
            .await
            .map_err(|e| write_error("rename role", e))?;

        Ok(affected > 0)
    }

    pub(crate) async fn remove_role(&self, id: i64) -> Result<bool> {
        let conn = self.connection()?;

        conn.execute("DELETE FROM user_roles WHERE role_id = ?", [id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to unlink role: {}", e)))?;

        let affected = conn
            .execute("DELETE FROM roles WHERE id = ?", [id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete role: {}", e)))?;

        Ok(affected > 0)
    }

    // Organization operations
    pub(crate) async fn load_organization(&self) -> Result<Option<Organization>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                &format!(
                    "SELECT {} FROM organizations WHERE id = ?",
                    ORGANIZATION_COLUMNS
                ),
                [ORGANIZATION_ID],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query organization: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(organization_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn insert_organization(&self, org: &Organization) -> Result<Organization> {
        let conn = self.connection()?;

        conn.execute(
            &format!(
                "INSERT INTO organizations ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                ORGANIZATION_COLUMNS
            ),
            params![
                ORGANIZATION_ID,
                org.name.clone(),
                org.logo_url.clone(),
                org.smtp_host.clone(),
                org.smtp_port.map(i64::from),
                org.smtp_user.clone(),
                org.smtp_password.clone(),
                org.smtp_use_tls as i64,
                org.smtp_use_ssl as i64,
                org.default_from_email.clone(),
            ],
        )
        .await
        .map_err(|e| write_error("create organization", e))?;

        Ok(Organization {
            id: ORGANIZATION_ID,
            ..org.clone()
        })
    }

    pub(crate) async fn write_organization(&self, org: &Organization) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "UPDATE organizations SET name = ?, logo_url = ?, smtp_host = ?, smtp_port = ?,
                    smtp_user = ?, smtp_password = ?, smtp_use_tls = ?, smtp_use_ssl = ?,
                    default_from_email = ?
             WHERE id = ?",
            params![
                org.name.clone(),
                org.logo_url.clone(),
                org.smtp_host.clone(),
                org.smtp_port.map(i64::from),
                org.smtp_user.clone(),
                org.smtp_password.clone(),
                org.smtp_use_tls as i64,
                org.smtp_use_ssl as i64,
                org.default_from_email.clone(),
                ORGANIZATION_ID,
            ],
        )
        .await
        .map_err(|e| write_error("update organization", e))?;

        Ok(())
    }
}

/// Maps a write failure, turning unique-index violations into `Conflict`.
fn write_error(action: &str, e: libsql::Error) -> AppError {
    let message = e.to_string();
    if message.contains("UNIQUE constraint failed") {
        AppError::Conflict(format!("Failed to {}: record already exists", action))
    } else {
        AppError::Database(format!("Failed to {}: {}", action, message))
    }
}

/// Reads the id produced by an `INSERT ... RETURNING id` statement.
async fn returned_id(rows: &mut libsql::Rows, action: &str) -> Result<i64> {
    let row = rows
        .next()
        .await
        .map_err(|e| write_error(action, e))?
        .ok_or_else(|| AppError::Database(format!("Failed to {}: no id returned", action)))?;

    row.get(0).map_err(|e| AppError::Database(e.to_string()))
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn user_from_row(row: &Row) -> Result<User> {
    let birth_date: Option<String> = row.get(3).map_err(|e| AppError::Database(e.to_string()))?;
    let birth_date = birth_date
        .filter(|s| !s.is_empty())
        .map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT))
        .transpose()
        .map_err(|e| AppError::Database(format!("Invalid stored birth date: {}", e)))?;

    let created_at: String = row.get(11).map_err(|e| AppError::Database(e.to_string()))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Database(format!("Invalid stored timestamp: {}", e)))?;

    Ok(User {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        first_name: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
        last_name: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
        birth_date,
        email: row.get(4).map_err(|e| AppError::Database(e.to_string()))?,
        password_hash: row.get(5).map_err(|e| AppError::Database(e.to_string()))?,
        is_active: row
            .get::<i64>(6)
            .map_err(|e| AppError::Database(e.to_string()))?
            != 0,
        must_change_password: row
            .get::<i64>(7)
            .map_err(|e| AppError::Database(e.to_string()))?
            != 0,
        language: row.get(8).map_err(|e| AppError::Database(e.to_string()))?,
        date_format: row.get(9).map_err(|e| AppError::Database(e.to_string()))?,
        theme: row.get(10).map_err(|e| AppError::Database(e.to_string()))?,
        created_at,
        roles: Vec::new(),
    })
}

fn role_from_row(row: &Row) -> Result<Role> {
    Ok(Role {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        name: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
    })
}

fn organization_from_row(row: &Row) -> Result<Organization> {
    let smtp_port: Option<i64> = row.get(4).map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Organization {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        name: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
        logo_url: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
        smtp_host: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
        smtp_port: smtp_port.and_then(|p| u16::try_from(p).ok()),
        smtp_user: row.get(5).map_err(|e| AppError::Database(e.to_string()))?,
        smtp_password: row.get(6).map_err(|e| AppError::Database(e.to_string()))?,
        smtp_use_tls: row
            .get::<i64>(7)
            .map_err(|e| AppError::Database(e.to_string()))?
            != 0,
        smtp_use_ssl: row
            .get::<i64>(8)
            .map_err(|e| AppError::Database(e.to_string()))?
            != 0,
        default_from_email: row.get(9).map_err(|e| AppError::Database(e.to_string()))?,
    })
}
