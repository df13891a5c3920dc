//! # TaskHub Shared Library
//!
//! Types, persistence and authentication used by the TaskHub API server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and embedded migrations
//! - `models`: Entities and their repository operations (users, tasks)
//! - `auth`: Password hashing, JWT, bearer authentication, authorization
//!   and the user manager

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
