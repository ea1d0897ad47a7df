/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdesk_api::{app::{build_router, AppState}, config::Config};
/// use taskdesk_shared::db::{connect, pool::DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = connect(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let app = build_router(AppState::new(pool, config));
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::Duration;
use sqlx::AnyPool;
use std::sync::Arc;
use taskdesk_shared::{
    auth::middleware::{bearer_token, resolve_token},
    web::SecurityHeadersLayer,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: AnyPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: AnyPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Lifetime of newly issued access tokens
    pub fn token_lifetime(&self) -> Duration {
        Duration::minutes(self.config.jwt.expire_minutes)
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health            # Health check (public)
/// ├── POST   /token             # Password login, form-encoded (public)
/// ├── POST   /users/            # Sign up (public)
/// ├── GET    /users/            # List users (admin)
/// ├── GET    /users/me/         # Caller profile
/// ├── POST   /tasks/            # Create task
/// ├── GET    /tasks/            # List tasks (own, or all for admins)
/// ├── GET    /tasks/:id         # Read task
/// ├── PUT    /tasks/:id         # Overwrite task
/// └── DELETE /tasks/:id         # Delete task
/// ```
///
/// Collection paths also answer without the trailing slash.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Bearer authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/token", post(routes::auth::login_for_access_token))
        .route("/users/", post(routes::auth::create_user))
        .route("/users", post(routes::auth::create_user));

    let protected_routes = Router::new()
        .route("/users/", get(routes::auth::list_users))
        .route("/users", get(routes::auth::list_users))
        .route("/users/me/", get(routes::auth::read_users_me))
        .route("/users/me", get(routes::auth::read_users_me))
        .route(
            "/tasks/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/tasks/:task_id",
            get(routes::tasks::read_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(from_fn_with_state(state.clone(), bearer_auth_layer));

    let production = state.config.api.production;
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

/// CORS policy from `FRONTEND_URL`
fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        // Development mode: any origin, no credentials
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Bearer authentication middleware layer
///
/// Validates the token from the Authorization header, loads the user it
/// names and injects an `AuthContext` into request extensions.
async fn bearer_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let token = bearer_token(req.headers())?.to_string();

    let auth_context = resolve_token(&state.db, state.jwt_secret(), &token).await?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
