//! OpenAPI document for the HTTP surface.
//!
//! New endpoints need their handler listed in `paths(...)` and their body
//! types in `components(schemas(...))`.

use crate::api::handlers::{auth, health, organization, roles, users};
use crate::types::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MeResponse, MessageResponse,
    Organization, OrganizationUpdate, PasswordChangeRequest, RegisterRequest, RegisterResponse,
    ResetPasswordRequest, Role, RoleRequest, UpdateProfileRequest, UpdateUserRequest, UserDetails,
    UserSummary,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ElStudio API",
        description = "Authentication, user, role and organization administration"
    ),
    paths(
        auth::login,
        auth::register,
        auth::change_password_on_first_login,
        auth::me,
        auth::forgot_password,
        auth::reset_password,
        users::list_users,
        users::get_user,
        users::update_me,
        users::update_user,
        users::delete_user,
        users::reactivate_user,
        roles::list_roles,
        roles::create_role,
        roles::update_role,
        roles::delete_role,
        organization::get_organization,
        organization::create_organization,
        organization::update_organization,
        health::health,
    ),
    components(schemas(
        LoginRequest,
        LoginResponse,
        RegisterRequest,
        RegisterResponse,
        PasswordChangeRequest,
        ForgotPasswordRequest,
        ResetPasswordRequest,
        MessageResponse,
        MeResponse,
        UserSummary,
        UserDetails,
        UpdateProfileRequest,
        UpdateUserRequest,
        Role,
        RoleRequest,
        Organization,
        OrganizationUpdate,
        health::HealthResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Login, registration and password flows"),
        (name = "users", description = "User administration"),
        (name = "roles", description = "Role administration"),
        (name = "organization", description = "Organization and mail settings"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
