// ABOUTME: Database configuration types for MySQL connections
// ABOUTME: Handles the connection URL, pool sizing, and SQLx connection settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use rowgate_core::constants::{env_config, pool};
use rowgate_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Type-safe database URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `MySQL` server
    MySql {
        /// `mysql://` connection string
        connection_string: String,
    },
    /// `MariaDB` server, spoken to with the `MySQL` protocol
    MariaDb {
        /// `mariadb://` connection string
        connection_string: String,
    },
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error if the URL scheme is not a `MySQL`-protocol scheme
    pub fn parse_url(s: &str) -> AppResult<Self> {
        if s.starts_with("mysql://") {
            Ok(Self::MySql {
                connection_string: s.to_owned(),
            })
        } else if s.starts_with("mariadb://") {
            Ok(Self::MariaDb {
                connection_string: s.to_owned(),
            })
        } else {
            Err(AppError::config_invalid(format!(
                "Unsupported database URL scheme in '{}': expected mysql:// or mariadb://",
                redact(s)
            )))
        }
    }

    /// Convert to connection string understood by the `MySQL` driver
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::MySql { connection_string } => connection_string.clone(),
            Self::MariaDb { connection_string } => connection_string
                .strip_prefix("mariadb://")
                .map_or_else(|| connection_string.clone(), |rest| format!("mysql://{rest}")),
        }
    }
}

impl FromStr for DatabaseUrl {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_url(s)
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", redact(&self.to_connection_string()))
    }
}

/// Hide the password part of a connection URL
fn redact(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_owned();
    };
    match rest.split_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{scheme}://{user}:***@{host}")
        }
        None => url.to_owned(),
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Server URL
    pub url: DatabaseUrl,
    /// Connection pool sizing
    pub pool: PoolConfig,
    /// `SQLx` connection settings
    pub sqlx: SqlxConfig,
}

impl DatabaseConfig {
    /// Configuration for `url` with default pool settings
    #[must_use]
    pub fn new(url: DatabaseUrl) -> Self {
        Self {
            url,
            pool: PoolConfig::default(),
            sqlx: SqlxConfig::default(),
        }
    }

    /// Load database configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or any pool variable is invalid
    pub fn from_env() -> AppResult<Self> {
        let url = env::var(env_config::DATABASE_URL)
            .map_err(|_| AppError::config_missing(env_config::DATABASE_URL))?;
        Ok(Self {
            url: DatabaseUrl::parse_url(&url)?,
            pool: PoolConfig::from_env()?,
            sqlx: SqlxConfig::from_env()?,
        })
    }
}

/// Connection pool sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections kept open
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        // CI environment detection at config load time
        let is_ci = env::var("CI").is_ok();
        Self {
            max_connections: if is_ci {
                pool::CI_MAX_CONNECTIONS
            } else {
                pool::DEFAULT_MAX_CONNECTIONS
            },
            min_connections: pool::DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: pool::DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    /// Load pool configuration from environment (or defaults)
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but not a valid number, or if the
    /// minimum exceeds the maximum
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        let config = Self {
            max_connections: parse_env(env_config::DB_MAX_CONNECTIONS, defaults.max_connections)?,
            min_connections: parse_env(env_config::DB_MIN_CONNECTIONS, defaults.min_connections)?,
            acquire_timeout_secs: parse_env(
                env_config::DB_ACQUIRE_TIMEOUT,
                defaults.acquire_timeout_secs,
            )?,
        };
        if config.max_connections == 0 || config.min_connections > config.max_connections {
            return Err(AppError::config_invalid(format!(
                "Invalid pool bounds: min {} / max {}",
                config.min_connections, config.max_connections
            )));
        }
        Ok(config)
    }
}

/// `SQLx` connection settings
///
/// Values of `None` use `SQLx` defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlxConfig {
    /// Maximum time a connection can sit idle before being closed (seconds)
    pub idle_timeout_secs: Option<u64>,
    /// Maximum lifetime of a connection before it's closed (seconds)
    pub max_lifetime_secs: Option<u64>,
    /// Whether to test connections before acquiring from pool
    pub test_before_acquire: bool,
}

impl Default for SqlxConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: None,
            max_lifetime_secs: None,
            test_before_acquire: true,
        }
    }
}

impl SqlxConfig {
    /// Load from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            idle_timeout_secs: parse_optional_env("SQLX_IDLE_TIMEOUT_SECS")?,
            max_lifetime_secs: parse_optional_env("SQLX_MAX_LIFETIME_SECS")?,
            test_before_acquire: parse_env(
                "SQLX_TEST_BEFORE_ACQUIRE",
                defaults.test_before_acquire,
            )?,
        })
    }
}

/// Parse an environment variable, falling back to `default` when unset
pub(crate) fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config_invalid(format!("Invalid {key} value '{raw}': {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse an environment variable that has no default
fn parse_optional_env<T>(key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AppError::config_invalid(format!("Invalid {key} value '{raw}': {e}"))),
        Err(_) => Ok(None),
    }
}
