//! Role-based access checks.

use crate::types::{AppError, Result, User};

/// Administrator role: may manage users, roles and the organization.
pub const SUPER_ADMIN: &str = "super_admin";
/// Default role handed to newly registered accounts.
pub const EMPLOYEE: &str = "employee";

/// Grants access when `user` holds at least one of the `allowed` role names.
///
/// Several names in one call are alternatives: `require(&user, &[EMPLOYEE, SUPER_ADMIN])`
/// passes for either role.
pub fn require(user: &User, allowed: &[&str]) -> Result<()> {
    if allowed.iter().any(|name| user.has_role(name)) {
        return Ok(());
    }

    tracing::debug!(user_id = user.id, ?allowed, "role check denied");
    Err(AppError::Forbidden(
        "You do not have the required permissions".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use chrono::Utc;
    use rstest::rstest;

    fn user_with_roles(names: &[&str]) -> User {
        User {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            birth_date: None,
            email: "ada@example.com".into(),
            password_hash: String::new(),
            is_active: true,
            must_change_password: false,
            language: "fr".into(),
            date_format: "DD/MM/YYYY".into(),
            theme: "light".into(),
            created_at: Utc::now(),
            roles: names
                .iter()
                .enumerate()
                .map(|(i, n)| Role {
                    id: i as i64 + 1,
                    name: n.to_string(),
                })
                .collect(),
        }
    }

    #[rstest]
    #[case(&["employee"], &["super_admin"], false)]
    #[case(&["employee"], &["employee", "super_admin"], true)]
    #[case(&["super_admin"], &["super_admin"], true)]
    #[case(&[], &["employee"], false)]
    #[case(&["employee", "auditor"], &["auditor"], true)]
    #[case(&["employee"], &[], false)]
    fn test_require(#[case] held: &[&str], #[case] allowed: &[&str], #[case] granted: bool) {
        let user = user_with_roles(held);
        let result = require(&user, allowed);

        assert_eq!(result.is_ok(), granted);
        if !granted {
            assert!(matches!(result, Err(AppError::Forbidden(_))));
        }
    }
}
