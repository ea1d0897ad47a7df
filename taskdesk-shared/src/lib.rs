//! # TaskDesk Shared Library
//!
//! Types and business logic used by both the TaskDesk API server and the
//! dashboard.
//!
//! ## Module Organization
//!
//! - `db`: connection pools and embedded migrations for SQLite and PostgreSQL
//! - `models`: users and tasks with their queries
//! - `auth`: password hashing, bearer tokens, request authentication and
//!   permission checks
//! - `web`: HTTP middleware shared by both servers

pub mod auth;
pub mod db;
pub mod models;
pub mod web;

/// Current version of the TaskDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
