/// API route handlers
///
/// # Modules
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, password reset, email verification
/// - `authenticated`: Token check endpoint
/// - `tasks`: Task CRUD
/// - `users`: Profile and user administration

pub mod auth;
pub mod authenticated;
pub mod health;
pub mod tasks;
pub mod users;
