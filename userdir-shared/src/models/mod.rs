/// Database models for the user directory
///
/// # Models
///
/// - `user`: Directory accounts, credentials (hashed) and roles
/// - `organization`: Organizations that own users
///
/// Each model carries its own PostgreSQL queries; the `store` module wraps them
/// behind the `UserStore` trait.

pub mod organization;
pub mod user;

pub use organization::{NewOrganization, Organization};
pub use user::{NewUser, Role, User};
