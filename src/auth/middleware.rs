use crate::auth::jwt::{SessionClaims, TokenService};
use crate::db::DatabaseClient;
use crate::types::{AppError, Result, User};
use crate::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

const NOT_AUTHENTICATED: &str = "Could not validate credentials";

/// Turns a bearer token into the stored user it names.
///
/// Signature, expiry, a non-numeric subject and a missing user are all
/// reported as the same `Unauthorized`. The returned user carries the roles
/// currently in the store, not the ones embedded in the token.
pub async fn resolve(tokens: &TokenService, db: &dyn DatabaseClient, token: &str) -> Result<User> {
    let unauthorized = || AppError::Unauthorized(NOT_AUTHENTICATED.to_string());

    let claims: SessionClaims = tokens.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "bearer token rejected");
        unauthorized()
    })?;

    let user_id: i64 = claims.sub.parse().map_err(|_| unauthorized())?;

    db.get_user_by_id(user_id).await?.ok_or_else(unauthorized)
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Extractor for the authenticated user on protected routes.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| AppError::Unauthorized(NOT_AUTHENTICATED.to_string()))?;

        resolve(&state.tokens, state.db.as_ref(), token)
            .await
            .map(AuthUser)
    }
}
