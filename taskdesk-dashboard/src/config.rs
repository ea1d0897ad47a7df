/// Configuration for the dashboard server
///
/// # Environment Variables
///
/// - `DASHBOARD_HOST`: Host to bind to (default: 0.0.0.0)
/// - `DASHBOARD_PORT`: Port to bind to (default: 8501)
/// - `API_URL`: Base URL of the TaskDesk API (default: http://127.0.0.1:8000)
/// - `API_TIMEOUT_SECONDS`: Timeout for each API call (default: 10)
/// - `SECURE_COOKIES`: Mark session cookies `Secure` (default: false)
/// - `RUST_LOG`: Log level (default: taskdesk_dashboard=debug,tower_http=debug)

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// API base URL without a trailing slash
    pub api_url: String,

    /// Per-request timeout for API calls
    pub api_timeout_seconds: u64,

    /// Send session cookies only over HTTPS
    pub secure_cookies: bool,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("API_URL")
            .unwrap_or_else(|| "http://127.0.0.1:8000".to_string())
            .trim_end_matches('/')
            .to_string();

        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            anyhow::bail!("API_URL must start with http:// or https://");
        }

        let api_timeout_seconds = parse_or(&lookup, "API_TIMEOUT_SECONDS", 10u64)?;
        if api_timeout_seconds == 0 {
            anyhow::bail!("API_TIMEOUT_SECONDS must be positive");
        }

        Ok(Self {
            host: lookup("DASHBOARD_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "DASHBOARD_PORT", 8501u16)?,
            api_url,
            api_timeout_seconds,
            secure_cookies: parse_or(&lookup, "SECURE_COOKIES", false)?,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(|_| None).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8501");
        assert_eq!(config.api_url, "http://127.0.0.1:8000");
        assert_eq!(config.api_timeout_seconds, 10);
        assert!(!config.secure_cookies);
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let config = Config::from_vars(|key| {
            (key == "API_URL").then(|| "https://api.example.com/".to_string())
        })
        .unwrap();

        assert_eq!(config.api_url, "https://api.example.com");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_vars(|key| (key == "API_URL").then(|| "ftp://x".to_string())).is_err());
        assert!(
            Config::from_vars(|key| (key == "API_TIMEOUT_SECONDS").then(|| "0".to_string()))
                .is_err()
        );
        assert!(
            Config::from_vars(|key| (key == "SECURE_COOKIES").then(|| "maybe".to_string()))
                .is_err()
        );
    }
}
