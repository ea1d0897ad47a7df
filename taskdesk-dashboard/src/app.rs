/// Dashboard state and router builder
///
/// # Example
///
/// ```no_run
/// use taskdesk_dashboard::{app::{build_router, DashboardState}, config::Config};
///
/// # fn example() -> anyhow::Result<()> {
/// let state = DashboardState::new(Config::from_env()?)?;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use taskdesk_shared::web::{SecurityHeadersLayer, PAGE_CSP};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::{
    client::{ApiClient, ClientError},
    config::Config,
};

/// Shared dashboard state
#[derive(Clone)]
pub struct DashboardState {
    /// Client for the REST API
    pub client: ApiClient,

    /// Dashboard configuration
    pub config: Arc<Config>,
}

impl DashboardState {
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let client = ApiClient::new(config.api_url.clone(), config.api_timeout_seconds)?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Whether session cookies carry the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.config.secure_cookies
    }
}

/// Builds the dashboard router
///
/// ```text
/// GET  /                    # Login page, or dashboard (?status=<filter>)
/// POST /login               # Log in
/// POST /signup              # Create account
/// POST /logout              # Clear session
/// POST /tasks               # Create task
/// POST /tasks/:id/update    # Overwrite task
/// POST /tasks/:id/delete    # Delete task
/// ```
pub fn build_router(state: DashboardState) -> Router {
    use crate::routes;

    let hsts = state.secure_cookies();

    Router::new()
        .route("/", get(routes::index))
        .route("/login", post(routes::login))
        .route("/signup", post(routes::signup))
        .route("/logout", post(routes::logout))
        .route("/tasks", post(routes::create_task))
        .route("/tasks/:task_id/update", post(routes::update_task))
        .route("/tasks/:task_id/delete", post(routes::delete_task))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(hsts).with_csp(PAGE_CSP))
        .with_state(state)
}
