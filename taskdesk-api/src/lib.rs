//! # TaskDesk API Server Library
//!
//! Core of the TaskDesk REST server. The binary in `main.rs` only loads
//! configuration, connects the database and serves [`app::build_router`].
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and bearer-token layer
//! - `bootstrap`: Startup admin account provisioning
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Validating body extractors and pagination
//! - `routes`: API route handlers

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
