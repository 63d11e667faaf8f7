//! Bootstrap of the first administrator account.

use crate::auth::{guard, password};
use crate::db::DatabaseClient;
use crate::types::{AppError, NewUser, Result};

/// What `create_admin` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOutcome {
    Created(i64),
    /// The email already existed; super_admin was added to its roles
    Promoted(i64),
}

/// Creates a super_admin account with a chosen password, or adds the
/// super_admin role to the existing account with that email.
///
/// The password of an existing account is left unchanged.
pub async fn create_admin(
    db: &dyn DatabaseClient,
    email: &str,
    plain_password: &str,
    first_name: &str,
    last_name: &str,
) -> Result<AdminOutcome> {
    if plain_password.is_empty() {
        return Err(AppError::BadRequest("Password must not be empty".to_string()));
    }

    let admin_role = db
        .get_roles_by_names(&[guard::SUPER_ADMIN.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal("super_admin role is missing".to_string()))?;

    if let Some(user) = db.get_user_by_email(email).await? {
        let mut role_ids: Vec<i64> = user.roles.iter().map(|r| r.id).collect();
        if !role_ids.contains(&admin_role.id) {
            role_ids.push(admin_role.id);
            db.set_user_roles(user.id, &role_ids).await?;
        }
        tracing::info!(user_id = user.id, "existing account granted super_admin");
        return Ok(AdminOutcome::Promoted(user.id));
    }

    let new_user = NewUser {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        birth_date: None,
        email: email.to_string(),
        password_hash: password::hash_password(plain_password)?,
        is_active: true,
        must_change_password: false,
    };

    let id = db.create_user(&new_user, &[admin_role.id]).await?;
    tracing::info!(user_id = id, "super_admin account created");

    Ok(AdminOutcome::Created(id))
}
