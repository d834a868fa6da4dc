//! Runtime settings read from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::AppError;

const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;
const DEFAULT_COMMAND_CHANNEL_SIZE: usize = 1000;
const DEFAULT_WORKER_CONCURRENCY: usize = 16;

/// Which ledger store backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Connection mode for the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry the connection every retry interval until successful.
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Anything but `json` selects pretty output.
    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Settings for the binary.
///
/// # Environment Variables
///
/// - `LEDGER_STORE`: `postgres` or `memory` (default: `postgres` when `DATABASE_URL` is set)
/// - `DATABASE_URL`: PostgreSQL connection string
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `DATABASE_CONNECTION_MODE`: `fail-fast` or `retry` (default: retry)
/// - `DATABASE_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
/// - `COMMAND_CHANNEL_SIZE`: Consumer channel buffer (default: 1000)
/// - `WORKER_CONCURRENCY`: Maximum commands in flight (default: 16)
/// - `LOG_FORMAT`: `json` or `pretty` (default: pretty)
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    pub command_channel_size: usize,
    pub worker_concurrency: usize,
    pub log_format: LogFormat,
}

/// Parses `name` with `lookup`, falling back to `default` when unset or invalid.
fn parse_or<T, F>(lookup: &F, name: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, "Invalid value, using default");
            default
        }),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let store = match lookup("LEDGER_STORE").map(|s| s.to_lowercase()).as_deref() {
            Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            None if database_url.is_some() => StoreBackend::Postgres,
            None => StoreBackend::Memory,
            Some(other) => {
                return Err(AppError::config(format!("Unknown LEDGER_STORE: {other}")));
            }
        };
        if store == StoreBackend::Postgres && database_url.is_none() {
            return Err(AppError::config("DATABASE_URL must be set for the postgres store"));
        }

        let connection_mode = match lookup("DATABASE_CONNECTION_MODE")
            .unwrap_or_else(|| "retry".to_string())
            .to_lowercase()
            .as_str()
        {
            "fail-fast" | "failfast" | "fail_fast" => ConnectionMode::FailFast,
            "retry" => ConnectionMode::Retry,
            _ => {
                warn!("Invalid DATABASE_CONNECTION_MODE, defaulting to 'retry'");
                ConnectionMode::Retry
            }
        };

        Ok(Self {
            store,
            database_url,
            database_max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            ),
            connection_mode,
            retry_interval: Duration::from_secs(parse_or(
                &lookup,
                "DATABASE_RETRY_INTERVAL_SECS",
                DEFAULT_RETRY_INTERVAL_SECS,
            )),
            command_channel_size: parse_or(&lookup, "COMMAND_CHANNEL_SIZE", DEFAULT_COMMAND_CHANNEL_SIZE)
                .max(1),
            worker_concurrency: parse_or(&lookup, "WORKER_CONCURRENCY", DEFAULT_WORKER_CONCURRENCY).max(1),
            log_format: LogFormat::parse(lookup("LOG_FORMAT").as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_database() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.store, StoreBackend::Memory);
        assert_eq!(settings.database_max_connections, 10);
        assert_eq!(settings.connection_mode, ConnectionMode::Retry);
        assert_eq!(settings.retry_interval, Duration::from_secs(15));
        assert_eq!(settings.command_channel_size, 1000);
        assert_eq!(settings.worker_concurrency, 16);
        assert_eq!(settings.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_database_url_selects_postgres() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/qa"),
            ("DATABASE_CONNECTION_MODE", "fail-fast"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert_eq!(settings.store, StoreBackend::Postgres);
        assert_eq!(settings.connection_mode, ConnectionMode::FailFast);
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn test_log_format_drives_tracing_output() {
        let json = Settings::from_lookup(lookup(&[("LOG_FORMAT", " json ")])).unwrap();
        assert_eq!(json.log_format, LogFormat::Json);

        let other = Settings::from_lookup(lookup(&[("LOG_FORMAT", "compact")])).unwrap();
        assert_eq!(other.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_postgres_without_url_is_rejected() {
        let result = Settings::from_lookup(lookup(&[("LEDGER_STORE", "postgres")]));
        assert!(matches!(result, Err(AppError::ConfigError(_))));

        let result = Settings::from_lookup(lookup(&[("LEDGER_STORE", "redis")]));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let settings = Settings::from_lookup(lookup(&[
            ("WORKER_CONCURRENCY", "lots"),
            ("COMMAND_CHANNEL_SIZE", "0"),
            ("DATABASE_MAX_CONNECTIONS", "25"),
        ]))
        .unwrap();
        assert_eq!(settings.worker_concurrency, 16);
        assert_eq!(settings.command_channel_size, 1);
        assert_eq!(settings.database_max_connections, 25);
    }
}
