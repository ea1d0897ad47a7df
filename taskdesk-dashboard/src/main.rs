//! # TaskDesk Dashboard
//!
//! Browser front end for TaskDesk. Talks to the REST API at `API_URL` and
//! renders plain HTML forms for login, sign-up and task management.
//!
//! ## Usage
//!
//! ```bash
//! API_URL=http://127.0.0.1:8000 cargo run -p taskdesk-dashboard
//! ```

use anyhow::Context;
use taskdesk_dashboard::{
    app::{build_router, DashboardState},
    config::Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdesk_dashboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskDesk Dashboard v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;
    let bind_address = config.bind_address();
    let api_url = config.api_url.clone();

    let state = DashboardState::new(config).context("Failed to build API client")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!(api_url = %api_url, "Dashboard listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Dashboard stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
