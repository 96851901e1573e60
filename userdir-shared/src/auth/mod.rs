/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`api_key`]: API key generation, hashing and format checks
/// - [`authenticator`]: Resolves a caller from an `api_key` and enforces admin/org_admin
/// - [`authorization`]: Organization-scope checks for org_admin callers
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **API Keys**: 190 bits of randomness, stored as SHA-256 digests only
///
/// # Example
///
/// ```
/// use userdir_shared::auth::password::{hash_password, verify_password};
/// use userdir_shared::auth::api_key::generate_api_key;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let (key, key_hash) = generate_api_key();
/// assert_eq!(key_hash.len(), 64);
/// # Ok(())
/// # }
/// ```

pub mod api_key;
pub mod authenticator;
pub mod authorization;
pub mod password;
