//! Directory operation errors
//!
//! Every directory operation returns `Result<T, DirectoryError>`. Expected failure
//! paths (missing credential, not found, out-of-scope) are ordinary variants, and
//! store failures are carried as `Internal` so a failed mutation can never be
//! reported as a success.

use validator::ValidationErrors;

use crate::auth::authenticator::AuthError;
use crate::auth::authorization::AuthzError;
use crate::auth::password::PasswordError;
use crate::store::StoreError;

/// Directory result type alias
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Error kinds surfaced by the directory operations
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("An api_key is required to continue")]
    MissingCredential,

    #[error("No user has this api_key")]
    UnknownCredential,

    #[error("This user is not an admin")]
    InsufficientPrivilege,

    /// Invalid role or malformed input
    #[error("{0}")]
    BadRequest(String),

    /// Login failed; never says whether username or password was wrong
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    /// Organization-scope violation
    #[error("{0}")]
    Forbidden(String),

    /// Duplicate email or username
    #[error("{0}")]
    Conflict(String),

    /// Store or hashing failure
    #[error("{0}")]
    Internal(String),
}

impl DirectoryError {
    /// HTTP-style status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            DirectoryError::MissingCredential
            | DirectoryError::UnknownCredential
            | DirectoryError::InsufficientPrivilege => 401,
            DirectoryError::BadRequest(_) | DirectoryError::InvalidCredentials => 400,
            DirectoryError::Forbidden(_) => 403,
            DirectoryError::NotFound(_) => 404,
            DirectoryError::Conflict(_) => 409,
            DirectoryError::Internal(_) => 500,
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            DirectoryError::MissingCredential => "missing_credential",
            DirectoryError::UnknownCredential => "unknown_credential",
            DirectoryError::InsufficientPrivilege => "insufficient_privilege",
            DirectoryError::BadRequest(_) => "bad_request",
            DirectoryError::InvalidCredentials => "invalid_credentials",
            DirectoryError::NotFound(_) => "not_found",
            DirectoryError::Forbidden(_) => "forbidden",
            DirectoryError::Conflict(_) => "conflict",
            DirectoryError::Internal(_) => "internal_error",
        }
    }
}

impl From<AuthError> for DirectoryError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential => DirectoryError::MissingCredential,
            AuthError::UnknownCredential => DirectoryError::UnknownCredential,
            AuthError::InsufficientPrivilege => DirectoryError::InsufficientPrivilege,
            AuthError::Store(err) => err.into(),
        }
    }
}

impl From<AuthzError> for DirectoryError {
    fn from(err: AuthzError) -> Self {
        DirectoryError::Forbidden(err.to_string())
    }
}

impl From<StoreError> for DirectoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => DirectoryError::Conflict(err.to_string()),
            StoreError::Unavailable(_) | StoreError::Database(_) => {
                DirectoryError::Internal(err.to_string())
            }
        }
    }
}

impl From<PasswordError> for DirectoryError {
    fn from(err: PasswordError) -> Self {
        DirectoryError::Internal(err.to_string())
    }
}

impl From<ValidationErrors> for DirectoryError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();

        DirectoryError::BadRequest(messages.join("; "))
    }
}
