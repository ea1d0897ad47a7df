/// Database layer for TaskDesk
///
/// # Modules
///
/// - `pool`: SQLite/PostgreSQL connection pool behind sqlx's `Any` driver
/// - `migrations`: embedded per-backend schema migrations
/// - Models are in the `models` module at crate root level
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::db::{connect, pool::DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = connect(DatabaseConfig::default()).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;

use sqlx::AnyPool;

use pool::{DatabaseConfig, DbError};

/// Creates the database if needed, opens a pool and applies migrations
///
/// This is the single entry point the binaries and tests use to obtain a
/// ready-to-query pool.
pub async fn connect(config: DatabaseConfig) -> Result<AnyPool, DbError> {
    let backend = config
        .backend()
        .ok_or_else(|| DbError::UnsupportedScheme(pool::scheme_of(&config.url).to_string()))?;

    migrations::ensure_database_exists(&config.url, backend).await?;
    let pool = pool::create_pool(config).await?;
    migrations::run_migrations(&pool, backend).await?;

    Ok(pool)
}
