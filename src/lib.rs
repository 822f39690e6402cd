// ABOUTME: Main library entry point for the rowgate data-access layer
// ABOUTME: Value normalization, placeholder reconciliation, statement execution, and generic row CRUD
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # rowgate
//!
//! A generic data-access layer between application code and a relational
//! connection pool. Callers hand over loosely-typed values and in-memory
//! filters; rowgate produces correctly ordered, parameterized statements.
//!
//! ## Architecture
//!
//! - **Normalize**: coerces input values into bind-safe scalars or JSON text
//! - **Placeholders**: infers positional or named style and shapes the bind payload
//! - **Database**: pool/connection traits, the statement executor, the `MySQL` backend
//! - **Engine**: `set`, `get`, `edit`, `del` with identity-based WHERE clauses
//! - **Config**: environment-driven database and engine settings
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rowgate::config::{DatabaseConfig, EngineConfig};
//! use rowgate::database::mysql::MySqlConnectionPool;
//! use rowgate::engine::RowEngine;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     rowgate::logging::init_from_env()?;
//!     let pool = MySqlConnectionPool::connect(&DatabaseConfig::from_env()?).await?;
//!     let engine = RowEngine::open(Arc::new(pool), EngineConfig::from_env()?);
//!
//!     let active = |row: &rowgate::models::Row| row["active"] == true;
//!     let users = engine.get("users", None, Some(&active)).await?;
//!     println!("{} active users", users.rows.len());
//!
//!     engine.close().await;
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Shared constants
pub use rowgate_core::constants;

/// Pool traits, statement executor, and database backends
pub mod database;

/// Generic row engine
pub mod engine;

/// Error types
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Input, bind, and result models
pub use rowgate_core::models;

/// Value normalization
pub mod normalize;

/// Placeholder detection and reconciliation
pub mod placeholders;

pub use engine::RowEngine;
pub use normalize::{bind_value, process_value};
pub use placeholders::parse_query_string_values;
