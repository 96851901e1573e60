/// Directory store interface
///
/// The directory service never touches a global connection. It is handed an
/// `Arc<dyn UserStore>` and performs every read and write through it.
///
/// # Implementations
///
/// - [`postgres::PgUserStore`]: PostgreSQL via a pooled sqlx connection
/// - [`memory::MemoryUserStore`]: in-process maps, for tests and local runs
///
/// Both implementations enforce the same uniqueness invariants (email, username,
/// API key hash) and report violations as [`StoreError::Conflict`].

use async_trait::async_trait;

use crate::models::{NewOrganization, NewUser, Organization, Role, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique field already holds this value (field name: email, username, api_key)
    #[error("A user with this {0} already exists")]
    Conflict(String),

    /// The store refused or could not complete the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Underlying database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let field = db_err
                    .constraint()
                    .map(conflicting_field)
                    .unwrap_or("value");
                return StoreError::Conflict(field.to_string());
            }
        }

        StoreError::Database(err)
    }
}

/// Maps a unique constraint name from the users table to the field it guards
fn conflicting_field(constraint: &str) -> &'static str {
    if constraint.contains("email") {
        "email"
    } else if constraint.contains("username") {
        "username"
    } else if constraint.contains("api_key") {
        "api_key"
    } else {
        "value"
    }
}

/// Parameterized CRUD over the users and organizations tables
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Checks that the store is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Lists every user
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Lists the users whose `org_id` matches
    async fn list_users_by_org(&self, org_id: i64) -> StoreResult<Vec<User>>;

    /// Counts all users
    async fn count_users(&self) -> StoreResult<i64>;

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_api_key_hash(&self, api_key_hash: &str) -> StoreResult<Option<User>>;

    /// Inserts a user with server-assigned ID and timestamps
    async fn insert_user(&self, data: NewUser) -> StoreResult<User>;

    /// Updates the role column only; returns false if the user doesn't exist
    async fn update_user_role(&self, id: i64, role: Role) -> StoreResult<bool>;

    /// Deletes a user; returns false if the user doesn't exist
    async fn delete_user(&self, id: i64) -> StoreResult<bool>;

    async fn find_organization(&self, id: i64) -> StoreResult<Option<Organization>>;

    async fn insert_organization(&self, data: NewOrganization) -> StoreResult<Organization>;
}
