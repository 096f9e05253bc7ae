//! Reports service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `REPORTS_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   the generic `DATABASE_URL`)
//!
//! ## Optional
//! - `REPORTS_HOST` - Bind address (default: 127.0.0.1)
//! - `REPORTS_PORT` - Listen port (default: 3002)
//! - `REPORT_TIMEZONE` - IANA zone used for all report bucketing
//!   (default: UTC). This is a deliberate configuration value: day/week
//!   boundaries must be deterministic regardless of where the service is
//!   deployed, so the host's ambient zone is never consulted.
//! - `REPORT_QUERY_TIMEOUT_SECS` - Request-level timeout around the report
//!   computation (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use chrono_tz::Tz;
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_REPORT_TIMEZONE: &str = "UTC";
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Reports service configuration.
#[derive(Debug, Clone)]
pub struct ReportsConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Fixed IANA zone for all time-bucket boundaries
    pub report_timezone: Tz,
    /// Request-level timeout around one report computation
    pub query_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl ReportsConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("REPORTS_DATABASE_URL")?;
        let host = get_env_or_default("REPORTS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("REPORTS_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("REPORTS_PORT", "3002")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("REPORTS_PORT".to_string(), e.to_string()))?;
        let report_timezone = get_env_or_default("REPORT_TIMEZONE", DEFAULT_REPORT_TIMEZONE)
            .parse::<Tz>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("REPORT_TIMEZONE".to_string(), e.to_string())
            })?;
        let query_timeout_secs = get_optional_env("REPORT_QUERY_TIMEOUT_SECS")
            .map_or(Ok(DEFAULT_QUERY_TIMEOUT_SECS), |s| {
                s.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "REPORT_QUERY_TIMEOUT_SECS".to_string(),
                        e.to_string(),
                    )
                })
            })?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            report_timezone,
            query_timeout: Duration::from_secs(query_timeout_secs),
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> ReportsConfig {
        ReportsConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3002,
            report_timezone: chrono_tz::UTC,
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3002);
    }

    #[test]
    fn test_default_timezone_is_named_zone() {
        let tz = DEFAULT_REPORT_TIMEZONE.parse::<Tz>().unwrap();
        assert_eq!(tz, chrono_tz::UTC);
    }

    #[test]
    fn test_timezone_parse_rejects_garbage() {
        assert!("Not/AZone".parse::<Tz>().is_err());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("REPORTS_DATABASE_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: REPORTS_DATABASE_URL"
        );
    }
}
