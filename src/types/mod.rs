use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Date format accepted for birth dates on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============= Domain Types =============

/// Named permission tag attached to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// A stored account, always loaded together with its roles.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub must_change_password: bool,
    pub language: String,
    pub date_format: String,
    pub theme: String,
    pub created_at: DateTime<Utc>,
    pub roles: Vec<Role>,
}

impl User {
    /// Role names in storage order.
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }
}

/// Fields needed to insert a user row. Preferences take their column defaults.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub must_change_password: bool,
}

/// Singleton record holding outbound mail settings and display metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Organization {
    #[serde(default)]
    pub id: i64,
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    /// Write-only: never included in responses
    #[serde(default, skip_serializing)]
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub smtp_use_tls: bool,
    #[serde(default)]
    pub smtp_use_ssl: bool,
    pub default_from_email: Option<String>,
}

// ============= Authentication Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub must_change_password: bool,
}

fn default_register_roles() -> Vec<String> {
    vec!["employee".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`; empty means unknown
    #[serde(default)]
    pub birth_date: Option<String>,
    pub email: String,
    /// Accepted for compatibility; a temporary password is always generated
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_register_roles")]
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PasswordChangeRequest {
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Profile of the authenticated user (`GET /auth/me`).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub language: String,
    pub date_format: String,
    pub theme: String,
}

impl From<&User> for MeResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            roles: user.role_names(),
            language: user.language.clone(),
            date_format: user.date_format.clone(),
            theme: user.theme.clone(),
        }
    }
}

// ============= User Management Types =============

/// User row as listed by `GET /users`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub is_active: bool,
    pub roles: Vec<Role>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            birth_date: user.birth_date,
            is_active: user.is_active,
            roles: user.roles,
        }
    }
}

/// Full user record as returned by `GET /users/{id}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDetails {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub language: String,
    pub date_format: String,
    pub theme: String,
    pub is_active: bool,
    pub roles: Vec<Role>,
}

impl From<User> for UserDetails {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            birth_date: user.birth_date,
            created_at: user.created_at,
            language: user.language,
            date_format: user.date_format,
            theme: user.theme,
            is_active: user.is_active,
            roles: user.roles,
        }
    }
}

/// Self-service profile update (`PUT /users/me`). Absent fields are left untouched.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub language: Option<String>,
    pub date_format: Option<String>,
    pub theme: Option<String>,
}

/// Administrative update (`PUT /users/{id}`). Absent fields are left untouched;
/// a non-empty `roles` list replaces the user's roles.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<String>,
    pub language: Option<String>,
    pub date_format: Option<String>,
    pub theme: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

// ============= Role & Organization Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleRequest {
    pub name: String,
}

/// Partial organization update (`PUT /organization`).
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct OrganizationUpdate {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_use_tls: Option<bool>,
    pub smtp_use_ssl: Option<bool>,
    pub default_from_email: Option<String>,
}

impl OrganizationUpdate {
    /// Merges the provided fields into `org`.
    pub fn apply(self, org: &mut Organization) {
        if let Some(v) = self.name {
            org.name = Some(v);
        }
        if let Some(v) = self.logo_url {
            org.logo_url = Some(v);
        }
        if let Some(v) = self.smtp_host {
            org.smtp_host = Some(v);
        }
        if let Some(v) = self.smtp_port {
            org.smtp_port = Some(v);
        }
        if let Some(v) = self.smtp_user {
            org.smtp_user = Some(v);
        }
        if let Some(v) = self.smtp_password {
            org.smtp_password = Some(v);
        }
        if let Some(v) = self.smtp_use_tls {
            org.smtp_use_tls = v;
        }
        if let Some(v) = self.smtp_use_ssl {
            org.smtp_use_ssl = v;
        }
        if let Some(v) = self.default_from_email {
            org.default_from_email = Some(v);
        }
    }
}

/// Parses an optional `YYYY-MM-DD` string. Empty strings count as absent.
pub fn parse_birth_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|_| AppError::BadRequest("Invalid date format, expected YYYY-MM-DD".to_string())),
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Short machine-checkable kind used in response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::BadRequest(_) => "bad_request",
            AppError::Database(_) | AppError::Notification(_) | AppError::Internal(_) => {
                "internal"
            }
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::{header, StatusCode};

        let kind = self.kind();
        let (status, detail) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Database(msg) | AppError::Notification(msg) | AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = axum::Json(serde_json::json!({
            "error": kind,
            "detail": detail,
        }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_parse_birth_date() {
        assert_eq!(parse_birth_date(None).unwrap(), None);
        assert_eq!(parse_birth_date(Some("")).unwrap(), None);
        assert_eq!(
            parse_birth_date(Some("1990-04-12")).unwrap(),
            NaiveDate::from_ymd_opt(1990, 4, 12)
        );
        assert!(matches!(
            parse_birth_date(Some("12/04/1990")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::Database("disk on fire".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_unauthorized_sets_bearer_challenge() {
        let response = AppError::Unauthorized("missing token".into()).into_response();
        assert_eq!(
            response.headers().get("www-authenticate").unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_organization_update_merges_only_provided_fields() {
        let mut org = Organization {
            id: 1,
            name: Some("ElStudio".into()),
            smtp_host: Some("smtp.old.test".into()),
            smtp_port: Some(25),
            ..Default::default()
        };

        OrganizationUpdate {
            smtp_host: Some("smtp.new.test".into()),
            smtp_use_tls: Some(true),
            ..Default::default()
        }
        .apply(&mut org);

        assert_eq!(org.name.as_deref(), Some("ElStudio"));
        assert_eq!(org.smtp_host.as_deref(), Some("smtp.new.test"));
        assert_eq!(org.smtp_port, Some(25));
        assert!(org.smtp_use_tls);
    }
}
