// ABOUTME: Statement executor that reconciles arguments and runs them on a pooled connection
// ABOUTME: Owns acquire/release discipline for internally acquired connections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{ConnectionPool, DatabaseResult, PooledConnection, Statement};
use crate::placeholders::Reconciler;
use rowgate_core::models::{Param, QueryOutput};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Runs statements against a pool
///
/// Connections acquired here are always handed back after the statement
/// finishes, whether it succeeded or not. Connections passed in by the caller
/// are left alone.
pub struct StatementExecutor<P: ConnectionPool> {
    pool: Arc<P>,
    reconciler: Reconciler,
    log_statements: bool,
}

impl<P: ConnectionPool> StatementExecutor<P> {
    /// Executor over `pool`
    #[must_use]
    pub fn new(pool: Arc<P>, reconciler: Reconciler, log_statements: bool) -> Self {
        Self {
            pool,
            reconciler,
            log_statements,
        }
    }

    /// Pool handle
    #[must_use]
    pub fn pool(&self) -> &Arc<P> {
        &self.pool
    }

    /// Reconciler used to shape arguments
    #[must_use]
    pub const fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Reconcile `values` and classify `sql` without touching the database
    ///
    /// # Errors
    ///
    /// Returns an error if a named placeholder is missing and force mode is off
    pub fn prepare(&self, sql: &str, values: Option<&Param>) -> DatabaseResult<Statement> {
        let payload = self.reconciler.reconcile(sql, values)?;
        let options = self.reconciler.options();
        let kind = self.reconciler.parser().leading_kind(sql, options.dialect);
        Ok(Statement::new(sql, kind, payload))
    }

    /// Reconcile and execute on a freshly acquired connection
    ///
    /// # Errors
    ///
    /// Returns reconciliation errors before any connection is acquired, or the
    /// pool/driver error unchanged
    pub async fn execute(&self, sql: &str, values: Option<&Param>) -> DatabaseResult<QueryOutput> {
        let statement = self.prepare(sql, values)?;
        self.run(&statement).await
    }

    /// Reconcile and execute on a caller-owned connection
    ///
    /// # Errors
    ///
    /// Returns reconciliation errors or the driver error unchanged
    pub async fn execute_on(
        &self,
        connection: &mut P::Connection,
        sql: &str,
        values: Option<&Param>,
    ) -> DatabaseResult<QueryOutput> {
        let statement = self.prepare(sql, values)?;
        self.run_on(connection, &statement).await
    }

    /// Execute a prepared statement on a freshly acquired connection
    ///
    /// # Errors
    ///
    /// Returns the pool or driver error unchanged
    pub async fn run(&self, statement: &Statement) -> DatabaseResult<QueryOutput> {
        let mut connection = self.pool.acquire().await?;
        let result = self.run_on(&mut connection, statement).await;
        if connection.can_release() {
            connection.release().await;
        } else {
            debug!("connection handle cannot be pooled, destroying it");
            connection.destroy().await;
        }
        result
    }

    /// Execute a prepared statement on a caller-owned connection
    ///
    /// # Errors
    ///
    /// Returns the driver error unchanged
    pub async fn run_on(
        &self,
        connection: &mut P::Connection,
        statement: &Statement,
    ) -> DatabaseResult<QueryOutput> {
        let start = Instant::now();
        if self.log_statements {
            let descriptor = statement.descriptor();
            debug!(
                db.statement = %descriptor.sql,
                db.placeholders = ?descriptor.style,
                "executing statement"
            );
        }
        let result = connection.execute(statement).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(QueryOutput::Rows(selection)) => debug!(
                db.kind = ?statement.kind,
                db.rows = selection.rows.len(),
                db.duration_ms = duration_ms,
                "statement returned rows"
            ),
            Ok(QueryOutput::Header(header)) => debug!(
                db.kind = ?statement.kind,
                db.affected_rows = header.affected_rows,
                db.duration_ms = duration_ms,
                "statement completed"
            ),
            Err(e) => warn!(
                db.kind = ?statement.kind,
                db.duration_ms = duration_ms,
                error = %e,
                "statement failed"
            ),
        }
        result
    }
}
