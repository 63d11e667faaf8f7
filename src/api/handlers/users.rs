use crate::{
    api::extract::{Json, Path},
    auth::{guard, middleware::AuthUser, password},
    types::{
        parse_birth_date, AppError, MessageResponse, Result, UpdateProfileRequest,
        UpdateUserRequest, User, UserDetails, UserSummary,
    },
    AppState,
};
use axum::extract::State;

/// List every user with their roles
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = Vec<UserSummary>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "super_admin required")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
) -> Result<Json<Vec<UserSummary>>> {
    guard::require(&current, &[guard::SUPER_ADMIN])?;

    let users = state.db.list_users().await?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

/// Get one user's details
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User details", body = UserDetails),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_current): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<UserDetails>> {
    let user = load_user(&state, id).await?;
    Ok(Json(UserDetails::from(user)))
}

/// Update the authenticated user's own profile
#[utoipa::path(
    put,
    path = "/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = MessageResponse),
        (status = 400, description = "Invalid birth date"),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Email already in use")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(mut user): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(email) = &payload.email {
        ensure_email_free(&state, email, user.id).await?;
    }

    apply_common(
        &mut user,
        CommonFields {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            birth_date: payload.birth_date,
            password: payload.password,
            language: payload.language,
            date_format: payload.date_format,
            theme: payload.theme,
        },
    )?;

    state.db.update_user(&user).await?;
    tracing::info!(user_id = user.id, "profile updated");

    Ok(Json(MessageResponse::new("Profile updated")))
}

/// Administrative update of any user
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 400, description = "Invalid birth date"),
        (status = 403, description = "super_admin required"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>> {
    guard::require(&current, &[guard::SUPER_ADMIN])?;

    let mut user = load_user(&state, id).await?;

    if let Some(email) = &payload.email {
        ensure_email_free(&state, email, user.id).await?;
    }

    apply_common(
        &mut user,
        CommonFields {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            birth_date: payload.birth_date,
            password: payload.password,
            language: payload.language,
            date_format: payload.date_format,
            theme: payload.theme,
        },
    )?;
    if let Some(is_active) = payload.is_active {
        user.is_active = is_active;
    }

    state.db.update_user(&user).await?;

    // An empty list leaves the roles untouched.
    if !payload.roles.is_empty() {
        let roles = state.db.get_roles_by_names(&payload.roles).await?;
        let role_ids: Vec<i64> = roles.iter().map(|r| r.id).collect();
        state.db.set_user_roles(user.id, &role_ids).await?;
    }

    tracing::info!(user_id = user.id, admin_id = current.id, "user updated");
    Ok(Json(MessageResponse::new("User updated")))
}

/// Permanently delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 403, description = "super_admin required"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    guard::require(&current, &[guard::SUPER_ADMIN])?;

    if !state.db.delete_user(id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = id, admin_id = current.id, "user deleted");
    Ok(Json(MessageResponse::new("User deleted")))
}

/// Mark a deactivated user as active again
#[utoipa::path(
    put,
    path = "/users/reactivate/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User reactivated", body = MessageResponse),
        (status = 403, description = "super_admin required"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn reactivate_user(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    guard::require(&current, &[guard::SUPER_ADMIN])?;

    let mut user = load_user(&state, id).await?;
    user.is_active = true;
    state.db.update_user(&user).await?;

    tracing::info!(user_id = id, admin_id = current.id, "user reactivated");
    Ok(Json(MessageResponse::new("User reactivated")))
}

async fn load_user(state: &AppState, id: i64) -> Result<User> {
    state
        .db
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

async fn ensure_email_free(state: &AppState, email: &str, owner_id: i64) -> Result<()> {
    match state.db.get_user_by_email(email).await? {
        Some(other) if other.id != owner_id => {
            Err(AppError::Conflict("Email already in use".to_string()))
        }
        _ => Ok(()),
    }
}

/// Fields shared by the self-service and the administrative update.
struct CommonFields {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    birth_date: Option<String>,
    password: Option<String>,
    language: Option<String>,
    date_format: Option<String>,
    theme: Option<String>,
}

fn apply_common(user: &mut User, fields: CommonFields) -> Result<()> {
    if let Some(raw) = fields.birth_date.as_deref().filter(|s| !s.is_empty()) {
        user.birth_date = parse_birth_date(Some(raw))?;
    }
    if let Some(password) = fields.password.as_deref().filter(|s| !s.is_empty()) {
        user.password_hash = password::hash_password(password)?;
    }
    if let Some(v) = fields.first_name {
        user.first_name = v;
    }
    if let Some(v) = fields.last_name {
        user.last_name = v;
    }
    if let Some(v) = fields.email {
        user.email = v;
    }
    if let Some(v) = fields.language.filter(|s| !s.is_empty()) {
        user.language = v;
    }
    if let Some(v) = fields.date_format.filter(|s| !s.is_empty()) {
        user.date_format = v;
    }
    if let Some(v) = fields.theme.filter(|s| !s.is_empty()) {
        user.theme = v;
    }
    Ok(())
}
