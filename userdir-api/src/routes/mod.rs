/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Password login
/// - `users`: Directory listing and user management

pub mod auth;
pub mod health;
pub mod users;
