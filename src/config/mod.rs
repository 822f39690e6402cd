// ABOUTME: Configuration management for the row engine and its database connection
// ABOUTME: Environment-only configuration: database URL, pool sizing, and engine behaviour
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! - **Database**: connection URL, pool sizing, `SQLx` settings
//! - **Engine**: reconciliation mode, dialect, statement logging

/// Database connection configuration
pub mod database;

pub use database::{DatabaseConfig, DatabaseUrl, PoolConfig, SqlxConfig};

use crate::placeholders::{ReconcileOptions, SqlDialect};
use database::parse_env;
use rowgate_core::constants::env_config;
use rowgate_core::errors::AppResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Row engine behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Bind NULL for named placeholders missing from the values instead of failing
    pub force_missing_params: bool,
    /// Dialect used to lex statements
    pub dialect: SqlDialect,
    /// Log full statement text at debug level
    pub log_statements: bool,
}

impl EngineConfig {
    /// Load engine configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if a boolean variable is set to something other than `true`/`false`
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            force_missing_params: parse_env(env_config::FORCE_PARAMS, false)?,
            dialect: SqlDialect::MySql,
            log_statements: parse_env(env_config::LOG_STATEMENTS, false)?,
        };
        debug!(?config, "engine configuration loaded");
        Ok(config)
    }

    /// Reconciliation options derived from this configuration
    #[must_use]
    pub const fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            force: self.force_missing_params,
            dialect: self.dialect,
        }
    }
}
