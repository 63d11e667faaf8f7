use crate::{
    api::extract::{Json, Path},
    auth::{guard, middleware::AuthUser},
    types::{AppError, MessageResponse, Result, Role, RoleRequest},
    AppState,
};
use axum::extract::State;

fn role_name(payload: &RoleRequest) -> Result<&str> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Role name must not be empty".to_string()));
    }
    Ok(name)
}

/// List every role (public: the registration form needs it)
#[utoipa::path(
    get,
    path = "/roles",
    responses((status = 200, description = "All roles", body = Vec<Role>)),
    tag = "roles"
)]
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>> {
    Ok(Json(state.db.list_roles().await?))
}

/// Create a role
#[utoipa::path(
    post,
    path = "/roles",
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Role created", body = Role),
        (status = 403, description = "super_admin required"),
        (status = 409, description = "Role already exists")
    ),
    tag = "roles",
    security(("bearer" = []))
)]
pub async fn create_role(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Json(payload): Json<RoleRequest>,
) -> Result<Json<Role>> {
    guard::require(&current, &[guard::SUPER_ADMIN])?;

    let role = state.db.create_role(role_name(&payload)?).await?;
    tracing::info!(role = %role.name, admin_id = current.id, "role created");

    Ok(Json(role))
}

/// Rename a role
#[utoipa::path(
    put,
    path = "/roles/{id}",
    params(("id" = i64, Path, description = "Role id")),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Role renamed", body = Role),
        (status = 403, description = "super_admin required"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role name already taken")
    ),
    tag = "roles",
    security(("bearer" = []))
)]
pub async fn update_role(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<RoleRequest>,
) -> Result<Json<Role>> {
    guard::require(&current, &[guard::SUPER_ADMIN])?;

    let role = state
        .db
        .rename_role(id, role_name(&payload)?)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".to_string()))?;

    Ok(Json(role))
}

/// Delete a role and unlink it from every user
#[utoipa::path(
    delete,
    path = "/roles/{id}",
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role deleted", body = MessageResponse),
        (status = 403, description = "super_admin required"),
        (status = 404, description = "Role not found")
    ),
    tag = "roles",
    security(("bearer" = []))
)]
pub async fn delete_role(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    guard::require(&current, &[guard::SUPER_ADMIN])?;

    if !state.db.delete_role(id).await? {
        return Err(AppError::NotFound("Role not found".to_string()));
    }

    tracing::info!(role_id = id, admin_id = current.id, "role deleted");
    Ok(Json(MessageResponse::new("Role deleted")))
}
