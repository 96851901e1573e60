/// Error handling for the API server
///
/// Every handler returns `Result<T, ApiError>`. Directory failures convert through
/// `From<DirectoryError>` and request bodies that fail to parse convert through
/// `From<JsonRejection>`, so no handler builds a status code by hand.
///
/// # Response body
///
/// ```json
/// { "error": "missing_credential", "message": "An api_key is required to continue" }
/// ```
///
/// 500 responses never carry the underlying cause; it's logged instead.

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use userdir_shared::directory::DirectoryError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400): malformed body, invalid role or input, failed login
    BadRequest { code: &'static str, message: String },

    /// Unauthorized (401): missing or unknown api_key, or a non-admin caller
    Unauthorized { code: &'static str, message: String },

    /// Forbidden (403): organization-scope violation
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409): duplicate email or username
    Conflict(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. `"unknown_credential"`
    pub error: String,

    /// Human-readable message
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code: "bad_request",
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest { message, .. } => write!(f, "Bad request: {}", message),
            ApiError::Unauthorized { message, .. } => write!(f, "Unauthorized: {}", message),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error_code, message) = match self {
            ApiError::BadRequest { code, message } => (code, message),
            ApiError::Unauthorized { code, message } => (code, message),
            ApiError::Forbidden(msg) => ("forbidden", msg),
            ApiError::NotFound(msg) => ("not_found", msg),
            ApiError::Conflict(msg) => ("conflict", msg),
            ApiError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ("internal_error", "An internal error occurred".to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        let code = err.code();
        let message = err.to_string();

        match err {
            DirectoryError::MissingCredential
            | DirectoryError::UnknownCredential
            | DirectoryError::InsufficientPrivilege => ApiError::Unauthorized { code, message },
            DirectoryError::BadRequest(_) | DirectoryError::InvalidCredentials => {
                ApiError::BadRequest { code, message }
            }
            DirectoryError::Forbidden(msg) => ApiError::Forbidden(msg),
            DirectoryError::NotFound(msg) => ApiError::NotFound(msg),
            DirectoryError::Conflict(msg) => ApiError::Conflict(msg),
            DirectoryError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Malformed JSON, a wrong content type, or missing and mistyped fields
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// JSON body extractor whose rejection is an [`ApiError`]
///
/// Use instead of `axum::Json` for request bodies so parse failures produce the
/// standard error body with status 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
