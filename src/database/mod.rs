// ABOUTME: Connection pool abstraction and statement execution for the row engine
// ABOUTME: Pool/connection traits, prepared statements, the executor, and the MySQL backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Access
//!
//! The pool is an external collaborator: anything implementing [`ConnectionPool`]
//! can back the engine. The sqlx `MySQL` pool is provided; tests use scripted pools.

mod errors;
mod executor;

/// sqlx-backed `MySQL` connection pool
#[cfg(feature = "mysql")]
pub mod mysql;

pub use errors::*;
pub use executor::StatementExecutor;

use crate::placeholders::StatementKind;
use async_trait::async_trait;
use rowgate_core::models::{BindPayload, PlaceholderStyle, QueryDescriptor, QueryOutput};

/// A statement ready to be sent: text, class, reconciled arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Statement text with its original placeholders
    pub sql: String,
    /// Leading keyword class, decides between rows and header
    pub kind: StatementKind,
    /// Reconciled bind arguments
    pub payload: Option<BindPayload>,
    /// Table a read targets, so the backend can report key flags for its columns
    pub source_table: Option<String>,
}

impl Statement {
    /// Statement without a source table hint
    pub fn new(sql: impl Into<String>, kind: StatementKind, payload: Option<BindPayload>) -> Self {
        Self {
            sql: sql.into(),
            kind,
            payload,
            source_table: None,
        }
    }

    /// Text and placeholder style this statement was reconciled with
    #[must_use]
    pub fn descriptor(&self) -> QueryDescriptor {
        QueryDescriptor {
            sql: self.sql.clone(),
            style: self
                .payload
                .as_ref()
                .map_or(PlaceholderStyle::None, BindPayload::style),
        }
    }

    /// Attach the table a read targets
    #[must_use]
    pub fn with_source_table(mut self, table: impl Into<String>) -> Self {
        self.source_table = Some(table.into());
        self
    }
}

/// Shared pool of database connections
#[async_trait]
pub trait ConnectionPool: Send + Sync + 'static {
    /// Connection handle handed out by this pool
    type Connection: PooledConnection;

    /// Acquire a connection, waiting for one to become free
    async fn acquire(&self) -> DatabaseResult<Self::Connection>;

    /// Close the pool; outstanding connections are closed when released
    async fn close(&self);

    /// Whether [`ConnectionPool::close`] has been called
    fn is_closed(&self) -> bool;
}

/// One connection taken from a [`ConnectionPool`]
#[async_trait]
pub trait PooledConnection: Send {
    /// Execute a statement and return its rows or header
    async fn execute(&mut self, statement: &Statement) -> DatabaseResult<QueryOutput>;

    /// Whether this handle can be returned to its pool
    fn can_release(&self) -> bool {
        true
    }

    /// Return the connection to its pool
    async fn release(self);

    /// Tear the connection down instead of returning it
    async fn destroy(self);
}
