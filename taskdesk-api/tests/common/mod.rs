//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - A fresh in-memory SQLite database per test
//! - Test user creation with real password hashes
//! - Bearer token generation
//! - Request helpers that drive the router in-process

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::AnyPool;
use std::collections::HashMap;
use taskdesk_api::app::{build_router, AppState};
use taskdesk_api::config::Config;
use taskdesk_shared::auth::jwt::{create_token, Claims};
use taskdesk_shared::auth::password::hash_password;
use taskdesk_shared::db::{connect, pool::DatabaseConfig};
use taskdesk_shared::models::task::{CreateTask, Task};
use taskdesk_shared::models::user::{CreateUser, Role, User};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Password every fixture user is created with
pub const TEST_PASSWORD: &str = "s3cret-pass";

/// Configuration for tests; nothing is read from the process environment
pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [
        ("JWT_SECRET", TEST_SECRET),
        ("DATABASE_URL", "sqlite::memory:"),
        ("FRONTEND_URL", "http://localhost:8501"),
    ]
    .into_iter()
    .collect();

    Config::from_vars(|key| vars.get(key).map(|v| v.to_string()))
        .expect("test configuration should be valid")
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: AnyPool,
    pub app: Router,
    pub config: Config,
}

/// Parsed response from the router
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestContext {
    /// Creates a new test context with a fresh database
    pub async fn new() -> Self {
        let config = test_config();

        let db = connect(DatabaseConfig::in_memory())
            .await
            .expect("Failed to set up test database");

        let app = build_router(AppState::new(db.clone(), config.clone()));

        TestContext { db, app, config }
    }

    /// Inserts a user directly, bypassing the API
    pub async fn create_user(&self, username: &str, role: Role) -> User {
        User::create(
            &self.db,
            CreateUser {
                username: username.to_string(),
                password_hash: hash_password(TEST_PASSWORD).expect("hash"),
                role,
            },
        )
        .await
        .expect("Failed to create test user")
    }

    /// Inserts a task directly, bypassing the API
    pub async fn create_task(&self, owner: &User, title: &str) -> Task {
        Task::create(
            &self.db,
            CreateTask {
                title: title.to_string(),
                description: None,
            },
            owner.id,
        )
        .await
        .expect("Failed to create test task")
    }

    /// Signs a token for `username` without going through /token
    pub fn token_for(&self, username: &str) -> String {
        let claims = Claims::new(username, chrono::Duration::minutes(5)).expect("claims");
        create_token(&claims, &self.config.jwt.secret).expect("token")
    }

    /// Sends a request with an optional bearer token and JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.dispatch(request).await
    }

    /// Posts the login form to /token
    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        let form = format!("username={}&password={}", username, password);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();

        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
