//! Request and response payloads for the directory operations
//!
//! Requests deserialize straight from JSON bodies. `api_key` is optional at the type
//! level so that its absence reaches the authenticator as `MissingCredential` rather
//! than failing deserialization. `role` is a raw string for the same reason: an
//! unknown role is a `BadRequest`, reported after authentication.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Organization, User};

/// `api_key` is only consulted when listing requires authentication
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersRequest {
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListOrganizationUsersRequest {
    pub api_key: Option<String>,
    pub org_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUserRequest {
    pub api_key: Option<String>,

    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, max = 255, message = "username must be 1-255 characters"))]
    pub username: String,

    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,

    pub role: String,

    pub org_id: i64,
}

impl RegisterUserRequest {
    /// Trims surrounding whitespace from email and username
    ///
    /// Passwords are kept byte-for-byte; login compares them exactly.
    pub fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_string();
        self.username = self.username.trim().to_string();
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditUserRoleRequest {
    pub api_key: Option<String>,
    pub user_id: i64,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetUserRequest {
    pub api_key: Option<String>,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteUserRequest {
    pub api_key: Option<String>,
    pub user_id: i64,
}

/// Successful login: the user's record with its organization embedded
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: User,

    /// `null` when the organization row doesn't exist
    pub org: Option<Organization>,
}

/// Successful registration
///
/// The only response that ever carries a plaintext API key.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    #[serde(flatten)]
    pub user: User,

    pub api_key: String,
}

/// Acknowledgement for operations that don't return a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub message: String,
}

impl Acknowledgement {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_register_request_missing_api_key_deserializes() {
        let req: RegisterUserRequest = serde_json::from_value(json!({
            "email": "a@example.com",
            "username": "a",
            "password": "pw",
            "role": "superuser",
            "org_id": 7
        }))
        .unwrap();

        assert!(req.api_key.is_none());
        assert_eq!(req.role, "superuser");
    }

    #[test]
    fn test_register_request_normalized_trims() {
        let req = RegisterUserRequest {
            api_key: None,
            email: "  a@example.com\n".to_string(),
            username: "\talice ".to_string(),
            password: " spaced ".to_string(),
            role: "readonly".to_string(),
            org_id: 1,
        }
        .normalized();

        assert_eq!(req.email, "a@example.com");
        assert_eq!(req.username, "alice");
        assert_eq!(req.password, " spaced ");
    }

    #[test]
    fn test_register_request_validation() {
        let mut req = RegisterUserRequest {
            api_key: None,
            email: "not-an-email".to_string(),
            username: "alice".to_string(),
            password: "pw".to_string(),
            role: "readonly".to_string(),
            org_id: 1,
        };
        assert!(req.validate().is_err());

        req.email = "alice@example.com".to_string();
        assert!(req.validate().is_ok());

        req.username = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_login_response_embeds_org() {
        let now = Utc::now();
        let response = LoginResponse {
            user: User {
                id: 3,
                email: "a@example.com".to_string(),
                username: "a".to_string(),
                password_hash: "secret".to_string(),
                api_key_hash: "secret".to_string(),
                org_id: 9,
                role: Role::Readwrite,
                created_at: now,
                updated_at: now,
            },
            org: None,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["role"], "readwrite");
        assert!(value["org"].is_null());
        assert!(value.get("password_hash").is_none());
        assert!(value.get("api_key_hash").is_none());
    }
}
