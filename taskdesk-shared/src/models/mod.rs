/// Database models for TaskDesk
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, password hashes and roles
/// - `task`: Tasks owned by users
///
/// All operations take a `&AnyPool` and run a single statement, so each
/// call acquires a pooled connection and releases it when the query
/// completes.

pub mod task;
pub mod user;
