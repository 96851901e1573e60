/// User directory service
///
/// Implements the directory operations over an explicitly supplied [`UserStore`]:
///
/// | Operation | Authenticated | Scope check against |
/// |---|---|---|
/// | `list_users` | opt-in | caller's `org_id` for an org_admin |
/// | `list_organization_users` | opt-in | requested `org_id` |
/// | `login` | no (password) | - |
/// | `register_user` | yes | requested `org_id` |
/// | `edit_user_role` | yes | target user's `org_id` |
/// | `get_user` | yes | target user's `org_id` |
/// | `delete_user` | yes | target user's `org_id` |
///
/// Authenticated operations run in a fixed order: authenticate the caller, validate
/// the input, look up the target, check organization scope, then touch the store.
/// Any failure returns immediately; nothing after a failed step runs.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use userdir_shared::directory::{UserDirectoryService, GetUserRequest};
/// use userdir_shared::store::MemoryUserStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let directory = UserDirectoryService::new(Arc::new(MemoryUserStore::new()));
///
/// let user = directory
///     .get_user(GetUserRequest {
///         api_key: Some("udk_...".to_string()),
///         username: "demouser1".to_string(),
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use tracing::{debug, info, warn};
use validator::Validate;

use crate::auth::api_key::generate_api_key;
use crate::auth::authenticator::authenticate;
use crate::auth::authorization::require_org_scope;
use crate::auth::password::{
    hash_password_blocking, verify_decoy_password_blocking, verify_password_blocking, PasswordError,
};
use crate::models::{NewOrganization, NewUser, Role, User};
use crate::store::{StoreError, UserStore};

mod error;
mod types;

pub use error::{DirectoryError, DirectoryResult};
pub use types::{
    Acknowledgement, DeleteUserRequest, EditUserRoleRequest, GetUserRequest,
    ListOrganizationUsersRequest, ListUsersRequest, LoginRequest, LoginResponse, RegisterUserRequest,
    RegisteredUser,
};

/// How many fresh keys to try if a generated API key collides with a stored one
const API_KEY_ATTEMPTS: usize = 3;

const INVALID_ROLE_MESSAGE: &str = "Possible roles are admin, org_admin, readonly, and readwrite";

/// First administrator created on an empty directory
///
/// Held to the same field rules as [`RegisterUserRequest`].
#[derive(Debug, Clone, Validate)]
pub struct BootstrapAdmin {
    #[validate(length(min = 1, max = 255, message = "organization name must be 1-255 characters"))]
    pub org_name: String,

    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, max = 255, message = "username must be 1-255 characters"))]
    pub username: String,

    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

impl BootstrapAdmin {
    /// Trims surrounding whitespace from everything but the password
    pub fn normalized(mut self) -> Self {
        self.org_name = self.org_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.username = self.username.trim().to_string();
        self
    }
}

/// Directory operations over a shared store
#[derive(Clone)]
pub struct UserDirectoryService {
    store: Arc<dyn UserStore>,
    listing_requires_auth: bool,
}

impl UserDirectoryService {
    /// Creates a service with public listing
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            listing_requires_auth: false,
        }
    }

    /// Requires an admin or org_admin `api_key` for both listing operations
    ///
    /// An org_admin then only ever sees its own organization.
    pub fn with_authenticated_listing(mut self, required: bool) -> Self {
        self.listing_requires_auth = required;
        self
    }

    /// Checks that the backing store is reachable
    pub async fn ping(&self) -> DirectoryResult<()> {
        self.store.ping().await?;
        Ok(())
    }

    /// Returns every user in the directory
    ///
    /// With authenticated listing, an org_admin caller gets its own organization only.
    pub async fn list_users(&self, req: ListUsersRequest) -> DirectoryResult<Vec<User>> {
        if self.listing_requires_auth {
            let caller = authenticate(self.store.as_ref(), req.api_key.as_deref()).await?;
            if caller.role.is_org_scoped() {
                let users = self.store.list_users_by_org(caller.org_id).await?;
                debug!(caller_id = caller.id, count = users.len(), "Listed own organization users");
                return Ok(users);
            }
        }

        let users = self.store.list_users().await?;
        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    /// Returns the users of one organization
    ///
    /// The organization isn't required to exist; an unknown `org_id` yields an empty list.
    pub async fn list_organization_users(
        &self,
        req: ListOrganizationUsersRequest,
    ) -> DirectoryResult<Vec<User>> {
        if self.listing_requires_auth {
            let caller = authenticate(self.store.as_ref(), req.api_key.as_deref()).await?;
            require_org_scope(&caller, req.org_id)?;
        }

        let users = self.store.list_users_by_org(req.org_id).await?;
        debug!(org_id = req.org_id, count = users.len(), "Listed organization users");
        Ok(users)
    }

    /// Verifies a username/password pair and returns the user with its organization
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown username and for a wrong password alike.
    /// Both paths pay for one Argon2id verification.
    pub async fn login(&self, req: LoginRequest) -> DirectoryResult<LoginResponse> {
        let Some(user) = self.store.find_user_by_username(&req.username).await? else {
            verify_decoy_password_blocking(req.password).await?;
            debug!("Login for unknown username");
            return Err(DirectoryError::InvalidCredentials);
        };

        match verify_password_blocking(req.password, user.password_hash.clone()).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(user_id = user.id, "Login with wrong password");
                return Err(DirectoryError::InvalidCredentials);
            }
            Err(PasswordError::InvalidHash(reason)) => {
                warn!(user_id = user.id, %reason, "Stored password is not a valid hash");
                return Err(DirectoryError::InvalidCredentials);
            }
            Err(err) => return Err(err.into()),
        }

        let org = self.store.find_organization(user.org_id).await?;
        if org.is_none() {
            warn!(user_id = user.id, org_id = user.org_id, "User references a missing organization");
        }

        info!(user_id = user.id, org_id = user.org_id, "User logged in");
        Ok(LoginResponse { user, org })
    }

    /// Creates a user and issues its API key
    ///
    /// An org_admin may only register users into its own organization.
    pub async fn register_user(&self, req: RegisterUserRequest) -> DirectoryResult<RegisteredUser> {
        let caller = authenticate(self.store.as_ref(), req.api_key.as_deref()).await?;
        let role = parse_role(&req.role)?;

        let req = req.normalized();
        req.validate()?;

        require_org_scope(&caller, req.org_id)?;

        let password_hash = hash_password_blocking(req.password).await?;

        for attempt in 1..=API_KEY_ATTEMPTS {
            let (api_key, api_key_hash) = generate_api_key();
            let new_user = NewUser {
                email: req.email.clone(),
                username: req.username.clone(),
                password_hash: password_hash.clone(),
                api_key_hash,
                org_id: req.org_id,
                role,
            };

            match self.store.insert_user(new_user).await {
                Ok(user) => {
                    info!(
                        caller_id = caller.id,
                        user_id = user.id,
                        org_id = user.org_id,
                        role = %user.role,
                        "Registered user"
                    );
                    return Ok(RegisteredUser { user, api_key });
                }
                Err(StoreError::Conflict(field)) if field == "api_key" => {
                    warn!(attempt, "Generated api_key collided, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(DirectoryError::Internal(
            "Could not allocate a unique api_key".to_string(),
        ))
    }

    /// Changes a user's role
    pub async fn edit_user_role(&self, req: EditUserRoleRequest) -> DirectoryResult<Acknowledgement> {
        let caller = authenticate(self.store.as_ref(), req.api_key.as_deref()).await?;
        let role = parse_role(&req.role)?;

        let target = self.find_target_by_id(req.user_id).await?;
        require_org_scope(&caller, target.org_id)?;

        if !self.store.update_user_role(target.id, role).await? {
            return Err(user_id_not_found());
        }

        info!(
            caller_id = caller.id,
            user_id = target.id,
            from = %target.role,
            to = %role,
            "Updated user role"
        );
        Ok(Acknowledgement::new("Successfully updated user role"))
    }

    /// Fetches one user by username
    pub async fn get_user(&self, req: GetUserRequest) -> DirectoryResult<User> {
        let caller = authenticate(self.store.as_ref(), req.api_key.as_deref()).await?;

        let user = self
            .store
            .find_user_by_username(&req.username)
            .await?
            .ok_or_else(|| {
                DirectoryError::NotFound("A user with that username does not exist".to_string())
            })?;
        require_org_scope(&caller, user.org_id)?;

        debug!(caller_id = caller.id, user_id = user.id, "Fetched user");
        Ok(user)
    }

    /// Deletes one user by ID
    pub async fn delete_user(&self, req: DeleteUserRequest) -> DirectoryResult<Acknowledgement> {
        let caller = authenticate(self.store.as_ref(), req.api_key.as_deref()).await?;

        let target = self.find_target_by_id(req.user_id).await?;
        require_org_scope(&caller, target.org_id)?;

        if !self.store.delete_user(target.id).await? {
            return Err(user_id_not_found());
        }

        info!(
            caller_id = caller.id,
            user_id = target.id,
            org_id = target.org_id,
            "Deleted user"
        );
        Ok(Acknowledgement::new("Successfully deleted user"))
    }

    /// Creates the first organization and admin when the directory is empty
    ///
    /// # Returns
    ///
    /// The new admin (with its one-time API key), or `None` if users already exist
    pub async fn bootstrap_admin(
        &self,
        admin: BootstrapAdmin,
    ) -> DirectoryResult<Option<RegisteredUser>> {
        if self.store.count_users().await? > 0 {
            debug!("Directory already has users, skipping bootstrap");
            return Ok(None);
        }

        // Validate and hash before the first write
        let admin = admin.normalized();
        admin.validate()?;
        let password_hash = hash_password_blocking(admin.password).await?;
        let (api_key, api_key_hash) = generate_api_key();

        let org = self
            .store
            .insert_organization(NewOrganization {
                name: admin.org_name,
            })
            .await?;

        let user = self
            .store
            .insert_user(NewUser {
                email: admin.email,
                username: admin.username,
                password_hash,
                api_key_hash,
                org_id: org.id,
                role: Role::Admin,
            })
            .await?;

        info!(user_id = user.id, org_id = org.id, "Bootstrapped first admin");
        Ok(Some(RegisteredUser { user, api_key }))
    }

    async fn find_target_by_id(&self, user_id: i64) -> DirectoryResult<User> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(user_id_not_found)
    }
}

fn parse_role(role: &str) -> DirectoryResult<Role> {
    Role::parse(role).ok_or_else(|| DirectoryError::BadRequest(INVALID_ROLE_MESSAGE.to_string()))
}

fn user_id_not_found() -> DirectoryError {
    DirectoryError::NotFound("A user with that user_id does not exist".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        for role in Role::ALL {
            assert_eq!(parse_role(role.as_str()).unwrap(), role);
        }

        let err = parse_role("superuser").unwrap_err();
        assert!(matches!(err, DirectoryError::BadRequest(ref m) if m == INVALID_ROLE_MESSAGE));
    }

    #[test]
    fn test_user_id_not_found() {
        assert_eq!(user_id_not_found().status_code(), 404);
    }
}
