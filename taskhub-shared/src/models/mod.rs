/// Database models
///
/// Row types and their persistence operations:
/// - `user`: accounts, credentials and privilege flags
/// - `task`: owner-scoped tasks
pub mod task;
pub mod user;
