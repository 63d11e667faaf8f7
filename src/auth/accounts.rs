//! Account lifecycle: login, invitation-based registration, forced first-login
//! password change, and the forgot/reset password pair.

use crate::auth::jwt::{ResetClaims, TokenService};
use crate::auth::password::{self, DEFAULT_TEMP_PASSWORD_LENGTH};
use crate::db::DatabaseClient;
use crate::notify::Notifier;
use crate::types::{parse_birth_date, AppError, NewUser, RegisterRequest, Result, User};
use chrono::Duration;
use std::sync::Arc;

/// Message used for every rejected login, whatever the reason.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Token lifetimes and invitation settings.
#[derive(Debug, Clone)]
pub struct AccountSettings {
    pub access_token_ttl: Duration,
    pub reset_token_ttl: Duration,
    pub temp_password_length: usize,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            access_token_ttl: Duration::minutes(15),
            reset_token_ttl: Duration::minutes(30),
            temp_password_length: DEFAULT_TEMP_PASSWORD_LENGTH,
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub user_id: i64,
    pub must_change_password: bool,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_id: i64,
    pub email: String,
}

/// Orchestrates the account flows over the store, the token service and the notifier.
pub struct AccountService {
    db: Arc<dyn DatabaseClient>,
    tokens: Arc<TokenService>,
    notifier: Arc<dyn Notifier>,
    settings: AccountSettings,
}

impl AccountService {
    pub fn new(
        db: Arc<dyn DatabaseClient>,
        tokens: Arc<TokenService>,
        notifier: Arc<dyn Notifier>,
        settings: AccountSettings,
    ) -> Self {
        Self {
            db,
            tokens,
            notifier,
            settings,
        }
    }

    /// Checks credentials and issues a session token carrying the user's current roles.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let matched = match self.db.get_user_by_email(email).await? {
            Some(user) if password::verify_password(password, &user.password_hash) => Some(user),
            Some(_) => None,
            None => {
                password::verify_dummy(password);
                None
            }
        };
        let Some(user) = matched else {
            tracing::debug!("login rejected");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let access_token =
            self.tokens
                .issue_session(user.id, user.role_names(), self.settings.access_token_ttl)?;

        tracing::info!(user_id = user.id, "user logged in");
        Ok(LoginOutcome {
            access_token,
            user_id: user.id,
            must_change_password: user.must_change_password,
        })
    }

    /// Creates an account with a generated temporary password and mails it to the user.
    ///
    /// Role names that do not exist are skipped. The plaintext password is
    /// only ever handed to the notifier.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Registration> {
        if self.db.get_user_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        let roles = self.db.get_roles_by_names(&request.roles).await?;
        if roles.len() < request.roles.len() {
            tracing::debug!(requested = ?request.roles, "unknown role names ignored");
        }

        let birth_date = parse_birth_date(request.birth_date.as_deref())?;

        let temp_password = password::generate_temporary(self.settings.temp_password_length);
        let new_user = NewUser {
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            birth_date,
            email: request.email.clone(),
            password_hash: password::hash_password(&temp_password)?,
            is_active: true,
            must_change_password: true,
        };

        let role_ids: Vec<i64> = roles.iter().map(|r| r.id).collect();
        let user_id = self
            .db
            .create_user(&new_user, &role_ids)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => AppError::Conflict("Email already in use".to_string()),
                other => other,
            })?;

        tracing::info!(user_id, "user registered");

        let sent = self
            .notifier
            .send_invitation(&new_user.email, &temp_password)
            .await;
        log_delivery("invitation", &new_user.email, sent);

        Ok(Registration {
            user_id,
            email: new_user.email,
        })
    }

    /// Replaces the password of the authenticated user and clears the forced-change flag.
    ///
    /// Authentication is the only gate: the old password is not asked for.
    pub async fn change_password_on_first_login(
        &self,
        current: &User,
        new_password: &str,
    ) -> Result<()> {
        require_password(new_password)?;

        let mut user = self
            .db
            .get_user_by_id(current.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        user.password_hash = password::hash_password(new_password)?;
        user.must_change_password = false;
        self.db.update_user(&user).await?;

        tracing::info!(user_id = user.id, "password changed on first login");

        let sent = self
            .notifier
            .send_password_changed(&user.email, &user.first_name)
            .await;
        log_delivery("password_changed", &user.email, sent);

        Ok(())
    }

    /// Mails a reset link to the account registered under `email`.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let user = self
            .db
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("No user with this email".to_string()))?;

        let token = self
            .tokens
            .issue_reset(user.id, self.settings.reset_token_ttl)?;

        tracing::info!(user_id = user.id, "password reset requested");

        let sent = self.notifier.send_reset_link(&user.email, &token).await;
        log_delivery("reset_link", &user.email, sent);

        Ok(())
    }

    /// Sets a new password for the subject of a reset token.
    ///
    /// Every token problem is reported as the same `BadRequest`.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let invalid = || AppError::BadRequest("Invalid or expired token".to_string());

        let claims: ResetClaims = self.tokens.verify(token).map_err(|_| invalid())?;
        let user_id: i64 = claims.sub.parse().map_err(|_| invalid())?;

        require_password(new_password)?;

        let mut user = self
            .db
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        user.password_hash = password::hash_password(new_password)?;
        self.db.update_user(&user).await?;

        tracing::info!(user_id, "password reset");
        Ok(())
    }
}

fn require_password(new_password: &str) -> Result<()> {
    if new_password.is_empty() {
        return Err(AppError::BadRequest("Password must not be empty".to_string()));
    }
    Ok(())
}

fn log_delivery(kind: &str, to: &str, result: Result<()>) {
    if let Err(e) = result {
        tracing::warn!(error = %e, kind, to, "notification not delivered");
    }
}
