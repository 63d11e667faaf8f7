use crate::{
    api::extract::Json,
    auth::middleware::AuthUser,
    types::{
        ForgotPasswordRequest, LoginRequest, LoginResponse, MeResponse, MessageResponse,
        PasswordChangeRequest, RegisterRequest, RegisterResponse, ResetPasswordRequest, Result,
    },
    AppState,
};
use axum::extract::State;

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let outcome = state
        .accounts
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        access_token: outcome.access_token,
        token_type: "bearer".to_string(),
        must_change_password: outcome.must_change_password,
    }))
}

/// Register a new user; a temporary password is generated and mailed
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered, invitation sent", body = RegisterResponse),
        (status = 400, description = "Invalid birth date"),
        (status = 409, description = "Email already in use")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    let registration = state.accounts.register(&payload).await?;

    Ok(Json(RegisterResponse {
        message: "User registered, a temporary password has been sent by e-mail".to_string(),
        email: registration.email,
    }))
}

/// Replace the temporary password after the first login
#[utoipa::path(
    put,
    path = "/auth/change-password-on-first-login",
    request_body = PasswordChangeRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User no longer exists")
    ),
    tag = "auth",
    security(("bearer" = []))
)]
pub async fn change_password_on_first_login(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<PasswordChangeRequest>,
) -> Result<Json<MessageResponse>> {
    state
        .accounts
        .change_password_on_first_login(&user, &payload.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password updated")))
}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "auth",
    security(("bearer" = []))
)]
pub async fn me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse::from(&user))
}

/// Send a password reset link
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent", body = MessageResponse),
        (status = 404, description = "Unknown email")
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    state.accounts.forgot_password(&payload.email).await?;

    Ok(Json(MessageResponse::new("A reset link has been sent")))
}

/// Set a new password from a reset token
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid or expired token"),
        (status = 404, description = "User no longer exists")
    ),
    tag = "auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    state
        .accounts
        .reset_password(&payload.token, &payload.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password has been reset")))
}
