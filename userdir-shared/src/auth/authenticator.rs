/// API key authentication for directory callers
///
/// Resolves the caller behind a request's `api_key` field and enforces the minimum
/// privilege tier for the mutating directory operations.
///
/// # Flow
///
/// ```text
/// api_key field ──> present? ──> well-formed? ──> SHA-256 ──> store lookup ──> admin/org_admin?
///                      │              │                            │                 │
///              MissingCredential  UnknownCredential     UnknownCredential  InsufficientPrivilege
/// ```
///
/// The resolved user record is returned so callers can apply organization scoping.

use tracing::{debug, warn};

use super::api_key::{display_prefix, hash_api_key, validate_api_key_format};
use crate::models::User;
use crate::store::{StoreError, UserStore};

/// Error type for caller authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request carried no `api_key`
    #[error("An api_key is required to continue")]
    MissingCredential,

    /// No user owns the supplied key
    #[error("No user has this api_key")]
    UnknownCredential,

    /// The caller exists but is neither admin nor org_admin
    #[error("This user is not an admin")]
    InsufficientPrivilege,

    /// The lookup itself failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Authenticates a caller and requires an administrative role
///
/// # Errors
///
/// - `MissingCredential` if `api_key` is `None`
/// - `UnknownCredential` if the key is malformed or matches no user
/// - `InsufficientPrivilege` if the user's role is `readonly` or `readwrite`
/// - `Store` if the lookup fails
pub async fn authenticate(store: &dyn UserStore, api_key: Option<&str>) -> Result<User, AuthError> {
    let api_key = api_key.ok_or(AuthError::MissingCredential)?;

    if !validate_api_key_format(api_key) {
        debug!("Rejected malformed api_key");
        return Err(AuthError::UnknownCredential);
    }

    let user = store
        .find_user_by_api_key_hash(&hash_api_key(api_key))
        .await?
        .ok_or_else(|| {
            warn!(key_prefix = %display_prefix(api_key), "Unknown api_key");
            AuthError::UnknownCredential
        })?;

    if !user.role.can_manage_users() {
        warn!(user_id = user.id, role = %user.role, "Caller lacks an administrative role");
        return Err(AuthError::InsufficientPrivilege);
    }

    debug!(user_id = user.id, role = %user.role, "Caller authenticated");
    Ok(user)
}
