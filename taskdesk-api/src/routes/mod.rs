/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Token issue and user account endpoints
/// - `tasks`: Task CRUD endpoints

pub mod auth;
pub mod health;
pub mod tasks;
