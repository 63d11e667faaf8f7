use crate::{
    api::extract::Json,
    auth::{guard, middleware::AuthUser},
    types::{AppError, Organization, OrganizationUpdate, Result},
    AppState,
};
use axum::extract::State;

/// Get the organization record
#[utoipa::path(
    get,
    path = "/organization",
    responses(
        (status = 200, description = "Organization", body = Organization),
        (status = 404, description = "Organization not configured")
    ),
    tag = "organization"
)]
pub async fn get_organization(State(state): State<AppState>) -> Result<Json<Organization>> {
    let org = state
        .db
        .get_organization()
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    Ok(Json(org))
}

/// Create the organization record (only one may exist)
#[utoipa::path(
    post,
    path = "/organization",
    request_body = OrganizationUpdate,
    responses(
        (status = 200, description = "Organization created", body = Organization),
        (status = 403, description = "super_admin required"),
        (status = 409, description = "Organization already exists")
    ),
    tag = "organization",
    security(("bearer" = []))
)]
pub async fn create_organization(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Json(payload): Json<OrganizationUpdate>,
) -> Result<Json<Organization>> {
    guard::require(&current, &[guard::SUPER_ADMIN])?;

    let mut org = Organization::default();
    payload.apply(&mut org);

    let created = state.db.create_organization(&org).await.map_err(|e| match e {
        AppError::Conflict(_) => AppError::Conflict("Organization already exists".to_string()),
        other => other,
    })?;

    tracing::info!(admin_id = current.id, "organization created");
    Ok(Json(created))
}

/// Update the organization record; absent fields are left untouched
#[utoipa::path(
    put,
    path = "/organization",
    request_body = OrganizationUpdate,
    responses(
        (status = 200, description = "Organization updated", body = Organization),
        (status = 403, description = "super_admin required"),
        (status = 404, description = "Organization not configured")
    ),
    tag = "organization",
    security(("bearer" = []))
)]
pub async fn update_organization(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Json(payload): Json<OrganizationUpdate>,
) -> Result<Json<Organization>> {
    guard::require(&current, &[guard::SUPER_ADMIN])?;

    let mut org = state
        .db
        .get_organization()
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    payload.apply(&mut org);
    state.db.update_organization(&org).await?;

    tracing::info!(admin_id = current.id, "organization updated");
    Ok(Json(org))
}
