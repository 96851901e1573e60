/// User model and database operations
///
/// This module provides the User model, the closed set of directory roles, and the
/// PostgreSQL CRUD operations backing the directory store.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'org_admin', 'readonly', 'readwrite');
///
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     username VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     api_key_hash CHAR(64) NOT NULL UNIQUE,
///     org_id BIGINT NOT NULL,
///     role user_role NOT NULL DEFAULT 'readonly',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Roles
///
/// - **admin**: Manage users in every organization
/// - **org_admin**: Manage users in its own organization only
/// - **readonly** / **readwrite**: No directory management rights
///
/// # Example
///
/// ```no_run
/// use userdir_shared::models::user::{NewUser, Role, User};
/// use userdir_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, NewUser {
///     email: "user@example.com".to_string(),
///     username: "user".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     api_key_hash: "0".repeat(64),
///     org_id: 1,
///     role: Role::Readonly,
/// }).await?;
///
/// let found = User::find_by_username(&pool, "user").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Directory roles
///
/// Stored as the `user_role` PostgreSQL enum and serialized in snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unrestricted cross-organization management
    Admin,

    /// Management scoped to the caller's own organization
    OrgAdmin,

    /// Read-only member
    Readonly,

    /// Read-write member
    Readwrite,
}

impl Role {
    /// Every valid role, in declaration order
    pub const ALL: [Role; 4] = [Role::Admin, Role::OrgAdmin, Role::Readonly, Role::Readwrite];

    /// Converts role to its wire/database name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::OrgAdmin => "org_admin",
            Role::Readonly => "readonly",
            Role::Readwrite => "readwrite",
        }
    }

    /// Parses a role from its exact wire name
    ///
    /// Matching is case-sensitive and does not trim whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "org_admin" => Some(Role::OrgAdmin),
            "readonly" => Some(Role::Readonly),
            "readwrite" => Some(Role::Readwrite),
            _ => None,
        }
    }

    /// Whether this role may call the authenticated directory operations
    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Admin | Role::OrgAdmin)
    }

    /// Whether this role's management rights are limited to its own organization
    pub fn is_org_scoped(&self) -> bool {
        matches!(self, Role::OrgAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User model representing a directory account
///
/// Credential material is never serialized: `password_hash` and `api_key_hash`
/// are skipped so any `User` can be returned to a client as-is.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Store-assigned user ID
    pub id: i64,

    /// Email address, unique across all users
    pub email: String,

    /// Login name, unique across all users
    pub username: String,

    /// Argon2id password hash (PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// SHA-256 hex digest of the user's API key
    #[serde(skip_serializing)]
    pub api_key_hash: String,

    /// Owning organization
    pub org_id: i64,

    /// Directory role
    pub role: Role,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a new user
///
/// Both credentials arrive already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub api_key_hash: String,
    pub org_id: i64,
    pub role: Role,
}

const USER_COLUMNS: &str =
    "id, email, username, password_hash, api_key_hash, org_id, role, created_at, updated_at";

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email, username or API key hash already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: NewUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO users (email, username, password_hash, api_key_hash, org_id, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.email)
            .bind(data.username)
            .bind(data.password_hash)
            .bind(data.api_key_hash)
            .bind(data.org_id)
            .bind(data.role)
            .fetch_one(pool)
            .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by exact username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Finds the user owning an API key, by the key's SHA-256 digest
    pub async fn find_by_api_key_hash(
        pool: &PgPool,
        api_key_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE api_key_hash = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(api_key_hash)
            .fetch_optional(pool)
            .await
    }

    /// Lists every user, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC");

        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Lists the users of one organization, oldest first
    pub async fn list_by_org(pool: &PgPool, org_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE org_id = $1 ORDER BY id ASC");

        sqlx::query_as::<_, User>(&query)
            .bind(org_id)
            .fetch_all(pool)
            .await
    }

    /// Changes a user's role
    ///
    /// Only the role column is written; timestamps are left untouched.
    ///
    /// # Returns
    ///
    /// True if the user existed and was updated
    pub async fn update_role(pool: &PgPool, id: i64, role: Role) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user by ID
    ///
    /// # Returns
    ///
    /// True if the user was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts total number of users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
