// ABOUTME: Constants with domain-separated organization for the rowgate core
// ABOUTME: Column flag bits, placeholder naming, pool defaults, and environment variable names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single flat list.

/// Column definition flag bits as reported by the driver for every result-set column
pub mod column_flags {
    /// Column cannot hold NULL
    pub const NOT_NULL: u16 = 1;
    /// Column is part of the primary key
    pub const PRIMARY_KEY: u16 = 2;
    /// Column is part of a unique index
    pub const UNIQUE_KEY: u16 = 4;
    /// Column is part of a non-unique index
    pub const MULTIPLE_KEY: u16 = 8;
}

/// Named placeholder conventions used by generated statements
pub mod placeholders {
    /// Prefix for the pre-transform identity values bound by `edit`
    pub const OLD_VALUE_PREFIX: &str = "old";
    /// Marker introducing a named placeholder
    pub const NAMED_MARKER: char = ':';
    /// Positional placeholder
    pub const POSITIONAL_MARKER: char = '?';
}

/// Connection pool defaults
pub mod pool {
    /// Default maximum number of pooled connections
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    /// Default minimum number of idle connections
    pub const DEFAULT_MIN_CONNECTIONS: u32 = 0;
    /// Default connection acquire timeout in seconds
    pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
    /// Reduced pool size when running under CI
    pub const CI_MAX_CONNECTIONS: u32 = 3;
}

/// Environment variable names read by the configuration layer
pub mod env_config {
    /// Database connection URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Maximum pool size
    pub const DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
    /// Minimum idle pool size
    pub const DB_MIN_CONNECTIONS: &str = "DB_MIN_CONNECTIONS";
    /// Acquire timeout in seconds
    pub const DB_ACQUIRE_TIMEOUT: &str = "DB_ACQUIRE_TIMEOUT";
    /// Bind NULL for missing named parameters instead of failing
    pub const FORCE_PARAMS: &str = "ROWGATE_FORCE_PARAMS";
    /// Log full statement text at debug level
    pub const LOG_STATEMENTS: &str = "ROWGATE_LOG_STATEMENTS";
}

/// Service identity used in structured logs
pub mod service_names {
    /// Service name reported in startup logs
    pub const ROWGATE: &str = "rowgate";
}
