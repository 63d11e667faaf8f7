//! TOML-based configuration for ElStudio
//!
//! Server, auth, database, CORS and mail settings are read from a single
//! TOML file (`elstudio.toml`). Every section has defaults, so a missing
//! file yields a working development configuration. Secrets are never
//! written in the file itself: the file names the environment variables
//! that hold them (`*_env` keys).

use crate::auth::accounts::AccountSettings;
use crate::types::Organization;
use chrono::Duration;
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Secret used outside production when the secret variable is unset.
pub const DEVELOPMENT_SECRET: &str = "elstudio-development-secret-change-me";

/// Upper bound for configured token lifetimes (five years).
pub const MAX_TOKEN_MINUTES: i64 = 5 * 366 * 24 * 60;

/// Root configuration structure loaded from elstudio.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElStudioConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub mail: MailConfig,

    /// Organization record inserted on first start when none exists yet
    #[serde(default)]
    pub organization: Option<Organization>,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::ValidationError(format!(
                "Unknown environment '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Overridden by `APP_ENV` when set
    #[serde(default)]
    pub environment: Environment,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            environment: Environment::default(),
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the signing secret
    #[serde(default = "default_secret_key_env")]
    pub secret_key_env: String,

    /// Environment variable name that may override `algorithm`
    #[serde(default = "default_algorithm_env")]
    pub algorithm_env: String,

    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    #[serde(default = "default_access_token_minutes")]
    pub access_token_minutes: i64,

    #[serde(default = "default_reset_token_minutes")]
    pub reset_token_minutes: i64,

    #[serde(default = "default_temp_password_length")]
    pub temp_password_length: usize,
}

fn default_secret_key_env() -> String {
    "SECRET_KEY".to_string()
}

fn default_algorithm_env() -> String {
    "ALGORITHM".to_string()
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_token_minutes() -> i64 {
    15
}

fn default_reset_token_minutes() -> i64 {
    30
}

fn default_temp_password_length() -> usize {
    12
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key_env: default_secret_key_env(),
            algorithm_env: default_algorithm_env(),
            algorithm: default_algorithm(),
            access_token_minutes: default_access_token_minutes(),
            reset_token_minutes: default_reset_token_minutes(),
            temp_password_length: default_temp_password_length(),
        }
    }
}

/// Auth settings with the secret and algorithm resolved from the environment.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub algorithm: Algorithm,
    pub access_token_ttl: Duration,
    pub reset_token_ttl: Duration,
    pub temp_password_length: usize,
}

impl AuthSettings {
    pub fn account_settings(&self) -> AccountSettings {
        AccountSettings {
            access_token_ttl: self.access_token_ttl,
            reset_token_ttl: self.reset_token_ttl,
            temp_password_length: self.temp_password_length,
        }
    }
}

impl AuthConfig {
    /// Resolves secret and algorithm through `lookup` (normally `std::env::var`).
    pub fn resolve<F>(&self, environment: Environment, lookup: F) -> Result<AuthSettings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = match lookup(&self.secret_key_env).filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if environment == Environment::Production => {
                return Err(ConfigError::MissingEnvVar(self.secret_key_env.clone()));
            }
            None => {
                tracing::warn!(
                    var = %self.secret_key_env,
                    "signing secret not set, using the development default"
                );
                DEVELOPMENT_SECRET.to_string()
            }
        };

        let algorithm_name = lookup(&self.algorithm_env)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.algorithm.clone());
        let algorithm = parse_algorithm(&algorithm_name)?;

        if self.access_token_minutes <= 0 || self.reset_token_minutes <= 0 {
            return Err(ConfigError::ValidationError(
                "Token lifetimes must be positive".to_string(),
            ));
        }
        if self.access_token_minutes > MAX_TOKEN_MINUTES
            || self.reset_token_minutes > MAX_TOKEN_MINUTES
        {
            return Err(ConfigError::ValidationError(format!(
                "Token lifetimes must not exceed {} minutes",
                MAX_TOKEN_MINUTES
            )));
        }
        if self.temp_password_length == 0 {
            return Err(ConfigError::ValidationError(
                "temp_password_length must be at least 1".to_string(),
            ));
        }

        Ok(AuthSettings {
            secret,
            algorithm,
            access_token_ttl: Duration::minutes(self.access_token_minutes),
            reset_token_ttl: Duration::minutes(self.reset_token_minutes),
            temp_password_length: self.temp_password_length,
        })
    }
}

/// Parses an HMAC algorithm name (HS256, HS384, HS512).
pub fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(name.trim()).map_err(|_| {
        ConfigError::ValidationError(format!("Unknown signing algorithm '{}'", name))
    })?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(ConfigError::ValidationError(format!(
            "Signing algorithm {:?} is not supported, use HS256, HS384 or HS512",
            other
        ))),
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local database path, or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Environment variable for Turso URL (optional cloud config)
    pub turso_url_env: Option<String>,

    /// Environment variable for Turso auth token
    pub turso_token_env: Option<String>,
}

fn default_database_url() -> String {
    "./data/elstudio.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            turso_url_env: None,
            turso_token_env: None,
        }
    }
}

// ============= CORS Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

// ============= Mail Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// When false, notifications are only logged
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the front-end, used in links
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    #[serde(default = "default_product_name")]
    pub product_name: String,
}

fn default_true() -> bool {
    true
}

fn default_frontend_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_product_name() -> String {
    "ElStudio".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frontend_url: default_frontend_url(),
            product_name: default_product_name(),
        }
    }
}

// ============= Loading =============

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}", path = .0.display(), source = .1)]
    ReadError(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl ElStudioConfig {
    /// Loads the file at `path`; a missing file means all defaults.
    ///
    /// `APP_ENV` overrides `[server] environment`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;
            Self::from_toml(&content)?
        } else {
            tracing::info!(path = %path.display(), "no configuration file, using defaults");
            Self::default()
        };

        if let Ok(env) = std::env::var("APP_ENV") {
            config.server.environment = env.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_algorithm(&self.auth.algorithm)?;

        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must not be empty".to_string(),
            ));
        }

        if self.database.turso_url_env.is_some() != self.database.turso_token_env.is_some() {
            return Err(ConfigError::ValidationError(
                "database.turso_url_env and database.turso_token_env must be set together"
                    .to_string(),
            ));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.environment == Environment::Production
    }

    /// Resolves auth settings against the process environment.
    pub fn auth_settings(&self) -> Result<AuthSettings, ConfigError> {
        self.auth
            .resolve(self.server.environment, |name| std::env::var(name).ok())
    }

    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
