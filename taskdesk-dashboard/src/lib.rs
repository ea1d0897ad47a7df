//! # TaskDesk Dashboard Library
//!
//! Server-rendered web front end for the TaskDesk API. Holds no data of its
//! own: every page is built from one or two calls to the REST backend, and
//! the login token travels in HttpOnly cookies.
//!
//! ## Modules
//!
//! - `app`: Dashboard state and router builder
//! - `client`: Typed HTTP client for the REST API
//! - `config`: Configuration management
//! - `render`: HTML page rendering
//! - `routes`: Form and page handlers
//! - `session`: Cookie-backed browser session

pub mod app;
pub mod client;
pub mod config;
pub mod render;
pub mod routes;
pub mod session;
