//! # UserDir Shared Library
//!
//! Domain types and business logic for the multi-tenant user directory. The HTTP
//! server in `userdir-api` is a thin transport over [`directory::UserDirectoryService`].
//!
//! ## Module Organization
//!
//! - `models`: `User`, `Organization`, `Role` and their SQL queries
//! - `store`: the `UserStore` trait with PostgreSQL and in-memory implementations
//! - `auth`: password hashing, API keys, caller authentication, organization scoping
//! - `directory`: the directory operations and their request/response types
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod directory;
pub mod models;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
