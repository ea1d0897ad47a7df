/// Database migration runner
///
/// Migrations live in the workspace `migrations/` directory, one
/// subdirectory per backend because the id column DDL differs:
///
/// - `migrations/sqlite/` - `INTEGER PRIMARY KEY AUTOINCREMENT`
/// - `migrations/postgres/` - `BIGSERIAL`
///
/// Both sets are embedded at compile time with `sqlx::migrate!` and the
/// one matching the pool's backend is applied at startup.
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::db::pool::{create_pool, DatabaseBackend, DatabaseConfig};
/// use taskdesk_shared::db::migrations::{run_migrations, get_migration_status};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig::default()).await?;
///
///     run_migrations(&pool, DatabaseBackend::Sqlite).await?;
///
///     let status = get_migration_status(&pool, DatabaseBackend::Sqlite).await?;
///     println!("Applied {} migrations", status.applied_migrations);
///     Ok(())
/// }
/// ```

use sqlx::{
    migrate::{MigrateDatabase, Migrator},
    Any, AnyPool,
};
use tracing::{debug, info, warn};

use super::pool::{is_in_memory, DatabaseBackend};

static SQLITE_MIGRATIONS: Migrator = sqlx::migrate!("../migrations/sqlite");
static POSTGRES_MIGRATIONS: Migrator = sqlx::migrate!("../migrations/postgres");

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Number of migrations that have been applied
    pub applied_migrations: usize,

    /// Latest applied migration version (timestamp)
    pub latest_version: Option<i64>,

    /// Whether every embedded migration has been applied
    pub is_up_to_date: bool,
}

fn migrator_for(backend: DatabaseBackend) -> &'static Migrator {
    match backend {
        DatabaseBackend::Sqlite => &SQLITE_MIGRATIONS,
        DatabaseBackend::Postgres => &POSTGRES_MIGRATIONS,
    }
}

/// Runs all pending database migrations for the given backend
///
/// # Errors
///
/// Returns an error if a migration fails to apply or the database
/// connection is lost mid-run.
pub async fn run_migrations(
    pool: &AnyPool,
    backend: DatabaseBackend,
) -> Result<(), sqlx::migrate::MigrateError> {
    info!(backend = backend.as_str(), "Starting database migrations");

    match migrator_for(backend).run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Gets the current migration status
///
/// # Errors
///
/// Returns an error if the migrations table cannot be queried.
pub async fn get_migration_status(
    pool: &AnyPool,
    backend: DatabaseBackend,
) -> Result<MigrationStatus, sqlx::Error> {
    debug!("Checking migration status");

    let table_query = match backend {
        DatabaseBackend::Sqlite => {
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'"
        }
        DatabaseBackend::Postgres => {
            "SELECT COUNT(*) FROM information_schema.tables
             WHERE table_schema = current_schema() AND table_name = '_sqlx_migrations'"
        }
    };

    let (tables,): (i64,) = sqlx::query_as(table_query).fetch_one(pool).await?;

    if tables == 0 {
        debug!("Migrations table does not exist yet");
        return Ok(MigrationStatus {
            applied_migrations: 0,
            latest_version: None,
            is_up_to_date: migrator_for(backend).iter().next().is_none(),
        });
    }

    let (count, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success = TRUE",
    )
    .fetch_one(pool)
    .await?;

    let expected = migrator_for(backend).iter().count() as i64;

    debug!(
        applied_migrations = count,
        expected_migrations = expected,
        latest_version = ?latest_version,
        "Migration status retrieved"
    );

    Ok(MigrationStatus {
        applied_migrations: count as usize,
        latest_version,
        is_up_to_date: count >= expected,
    })
}

/// Creates the SQLite database file if it doesn't exist
///
/// PostgreSQL databases are expected to be provisioned already, and
/// in-memory SQLite needs no file, so both are left alone.
///
/// # Errors
///
/// Returns an error if the file cannot be created.
pub async fn ensure_database_exists(
    database_url: &str,
    backend: DatabaseBackend,
) -> Result<(), sqlx::Error> {
    if backend != DatabaseBackend::Sqlite || is_in_memory(database_url) {
        return Ok(());
    }

    sqlx::any::install_default_drivers();

    if !Any::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Any::create_database(database_url).await?;
        info!("Database created successfully");
    } else {
        debug!("Database already exists");
    }

    Ok(())
}
