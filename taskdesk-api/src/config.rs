/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8000)
/// - `DATABASE_URL`: SQLite or PostgreSQL URL (default: sqlite://tasks.db?mode=rwc)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for token signing (required, at least 32 characters)
/// - `ACCESS_TOKEN_EXPIRE_MINUTES`: Token lifetime, at most one year (default: 30)
/// - `FRONTEND_URL`: Comma-separated CORS origins, `*` for any (default: *)
/// - `PRODUCTION`: Enables HSTS when true (default: false)
/// - `ADMIN_USERNAME` / `ADMIN_PASSWORD`: Admin account ensured at startup
/// - `RUST_LOG`: Log level (default: taskdesk_api=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use taskdesk_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use taskdesk_shared::auth::jwt::{DEFAULT_EXPIRE_MINUTES, MAX_EXPIRE_MINUTES};
use taskdesk_shared::db::pool::DEFAULT_DATABASE_URL;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Admin account to provision at startup
    pub admin: Option<AdminConfig>,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any origin
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite or PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be kept secret and at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Access token lifetime in minutes
    pub expire_minutes: i64,
}

/// Credentials of the admin account ensured at startup
#[derive(Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is read first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 characters
    /// - A numeric or boolean variable has an invalid value
    /// - Only one of `ADMIN_USERNAME` / `ADMIN_PASSWORD` is set
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "API_PORT", 8000u16)?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let expire_minutes =
            parse_or(&lookup, "ACCESS_TOKEN_EXPIRE_MINUTES", DEFAULT_EXPIRE_MINUTES)?;
        if expire_minutes <= 0 {
            anyhow::bail!("ACCESS_TOKEN_EXPIRE_MINUTES must be positive");
        }
        if expire_minutes > MAX_EXPIRE_MINUTES {
            anyhow::bail!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be at most {}",
                MAX_EXPIRE_MINUTES
            );
        }

        let cors_origins: Vec<String> = lookup("FRONTEND_URL")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = parse_or(&lookup, "PRODUCTION", false)?;

        let admin = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(AdminConfig { username, password })
            }
            (None, None) => None,
            _ => anyhow::bail!("ADMIN_USERNAME and ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expire_minutes,
            },
            admin,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether CORS accepts any origin
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.is_empty() || self.api.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        None => Ok(default),
    }
}
