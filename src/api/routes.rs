use crate::api::handlers::{auth, health, organization, roles, users};
use crate::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

/// Route table. Authentication and role checks happen inside the handlers
/// through the `AuthUser` extractor and `guard::require`.
pub fn create_router() -> Router<AppState> {
    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route(
            "/auth/change-password-on-first-login",
            put(auth::change_password_on_first_login),
        )
        .route("/auth/me", get(auth::me))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/me", get(auth::me));

    let user_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/me", put(users::update_me))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/reactivate/{id}", put(users::reactivate_user));

    let role_routes = Router::new()
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        .route(
            "/roles/{id}",
            put(roles::update_role).delete(roles::delete_role),
        );

    let organization_routes = Router::new().route(
        "/organization",
        get(organization::get_organization)
            .post(organization::create_organization)
            .put(organization::update_organization),
    );

    Router::new()
        .route("/health", get(health::health))
        .merge(auth_routes)
        .merge(user_routes)
        .merge(role_routes)
        .merge(organization_routes)
}
