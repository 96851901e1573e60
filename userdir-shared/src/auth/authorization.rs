/// Organization-scoped authorization
///
/// # Permission Model
///
/// 1. **Authentication**: the caller must be `admin` or `org_admin` (see `authenticator`)
/// 2. **Organization scope**: an `org_admin` may only act on users of its own
///    organization; an `admin` may act on any organization
///
/// For registration the scope is checked against the requested `org_id`. For every
/// other operation it is checked against the *target* user's `org_id`, never the
/// caller-supplied one.
///
/// # Example
///
/// ```no_run
/// use userdir_shared::auth::authorization::require_org_scope;
/// use userdir_shared::models::User;
///
/// fn check(caller: &User, target: &User) -> Result<(), Box<dyn std::error::Error>> {
///     require_org_scope(caller, target.org_id)?;
///     Ok(())
/// }
/// ```

use crate::models::{Role, User};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// An org_admin targeted another organization
    #[error("An org_admin user can only manage users in their own organization")]
    OutsideOrganization { caller_org_id: i64, target_org_id: i64 },

    /// The caller's role grants no management rights at all
    #[error("Role {0} cannot manage users")]
    NotAdministrator(Role),
}

/// Whether `caller` may manage users belonging to `org_id`
pub fn can_manage_org(caller: &User, org_id: i64) -> bool {
    caller.role.can_manage_users() && (!caller.role.is_org_scoped() || caller.org_id == org_id)
}

/// Requires that `caller` may manage users belonging to `target_org_id`
///
/// # Errors
///
/// - `OutsideOrganization` when an org_admin targets another organization
/// - `NotAdministrator` when the caller is not an administrator at all
pub fn require_org_scope(caller: &User, target_org_id: i64) -> Result<(), AuthzError> {
    if can_manage_org(caller, target_org_id) {
        return Ok(());
    }

    if caller.role.can_manage_users() {
        Err(AuthzError::OutsideOrganization {
            caller_org_id: caller.org_id,
            target_org_id,
        })
    } else {
        Err(AuthzError::NotAdministrator(caller.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn caller(role: Role, org_id: i64) -> User {
        User {
            id: 1,
            email: "caller@example.com".to_string(),
            username: "caller".to_string(),
            password_hash: String::new(),
            api_key_hash: String::new(),
            org_id,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_admin_manages_every_org() {
        let admin = caller(Role::Admin, 1);
        for org_id in [1, 2, 7, 1000] {
            assert!(can_manage_org(&admin, org_id));
            assert!(require_org_scope(&admin, org_id).is_ok());
        }
    }

    #[test]
    fn test_org_admin_limited_to_own_org() {
        let org_admin = caller(Role::OrgAdmin, 3);

        assert!(require_org_scope(&org_admin, 3).is_ok());

        let err = require_org_scope(&org_admin, 4).unwrap_err();
        assert!(matches!(
            err,
            AuthzError::OutsideOrganization {
                caller_org_id: 3,
                target_org_id: 4
            }
        ));
    }

    #[test]
    fn test_members_manage_nothing() {
        for role in [Role::Readonly, Role::Readwrite] {
            let member = caller(role, 3);
            assert!(!can_manage_org(&member, 3));
            assert!(matches!(
                require_org_scope(&member, 3),
                Err(AuthzError::NotAdministrator(r)) if r == role
            ));
        }
    }
}
