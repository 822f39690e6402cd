// ABOUTME: Generic row engine: bulk insert, filtered read, read-transform-write, and read-then-delete
// ABOUTME: Builds identity-based WHERE clauses from key metadata of a point-in-time read
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Row Engine
//!
//! Each operation runs the same pipeline: read the targets, derive their
//! identity columns, build one statement per row, run the statements
//! concurrently, and collect one header per row. Nothing is kept between calls.
//!
//! The read and write phases are not locked together. A row that changes or
//! disappears in between simply reports zero affected rows.

/// Identity key derivation
pub mod identity;
/// SQL text builders
pub mod statements;

pub use identity::{Identity, IdentitySource};

use crate::config::EngineConfig;
use crate::database::{ConnectionPool, DatabaseResult, StatementExecutor};
use crate::logging::AppLogger;
use crate::placeholders::{LexicalStatementParser, Reconciler, StatementParser};
use futures_util::future::join_all;
use rowgate_core::models::{Param, QueryOutput, ResultHeader, Row, Selection};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

/// In-memory row filter applied after a read
pub type RowFilter<'a> = &'a (dyn Fn(&Row) -> bool + Send + Sync);

/// Row transform applied by [`RowEngine::edit`] to a copy of each target row
pub type RowTransform<'a> = &'a (dyn Fn(Row) -> Row + Send + Sync);

/// Generic data-access engine over a connection pool
pub struct RowEngine<P: ConnectionPool> {
    executor: StatementExecutor<P>,
    config: EngineConfig,
}

impl<P: ConnectionPool> RowEngine<P> {
    /// Engine over `pool` using the lexical statement parser
    #[must_use]
    pub fn open(pool: Arc<P>, config: EngineConfig) -> Self {
        Self::with_parser(pool, config, Arc::new(LexicalStatementParser))
    }

    /// Engine over `pool` with a custom statement parser
    #[must_use]
    pub fn with_parser(
        pool: Arc<P>,
        config: EngineConfig,
        parser: Arc<dyn StatementParser>,
    ) -> Self {
        let reconciler = Reconciler::new(parser, config.reconcile_options());
        Self {
            executor: StatementExecutor::new(pool, reconciler, config.log_statements),
            config,
        }
    }

    /// Close the underlying pool
    pub async fn close(&self) {
        self.executor.pool().close().await;
        debug!("row engine closed");
    }

    /// Configuration in effect
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Statement executor used by every operation
    #[must_use]
    pub const fn executor(&self) -> &StatementExecutor<P> {
        &self.executor
    }

    /// Run `sql` with `values` reconciled against its placeholders
    ///
    /// # Errors
    ///
    /// Returns reconciliation errors before anything is sent, or the pool/driver error
    pub async fn query(&self, sql: &str, values: Option<&Param>) -> DatabaseResult<QueryOutput> {
        self.executor.execute(sql, values).await
    }

    /// Like [`RowEngine::query`], on a connection owned by the caller
    ///
    /// The connection is not released afterwards.
    ///
    /// # Errors
    ///
    /// Returns reconciliation errors before anything is sent, or the driver error
    pub async fn query_on(
        &self,
        connection: &mut P::Connection,
        sql: &str,
        values: Option<&Param>,
    ) -> DatabaseResult<QueryOutput> {
        self.executor.execute_on(connection, sql, values).await
    }

    /// Insert every row, one statement each, returning headers in input order
    ///
    /// # Errors
    ///
    /// Returns the first failure; rows already inserted stay inserted
    #[instrument(skip(self, rows), fields(db.table = %table, db.rows = rows.len()))]
    pub async fn set(&self, table: &str, rows: &[Row]) -> DatabaseResult<Vec<ResultHeader>> {
        let start = Instant::now();
        let statements = rows
            .iter()
            .map(|row| statements::insert(table, row))
            .collect::<DatabaseResult<Vec<_>>>()?;
        let result = self.dispatch(statements.iter().map(Some)).await;
        log_outcome("set", table, start, &result);
        result
    }

    /// Read `columns` (or every column) of `table`, keeping rows accepted by `predicate`
    ///
    /// Column metadata always describes the full read, before filtering.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is invalid or the read fails
    #[instrument(skip(self, predicate), fields(db.table = %table))]
    pub async fn get(
        &self,
        table: &str,
        columns: Option<&[&str]>,
        predicate: Option<RowFilter<'_>>,
    ) -> DatabaseResult<Selection> {
        let start = Instant::now();
        let result = self.read(table, columns, predicate).await;
        AppLogger::log_database_operation(
            "get",
            table,
            result.is_ok(),
            start.elapsed().as_millis() as u64,
        );
        result
    }

    /// Apply `transform` to every row accepted by `predicate` and write the changes back
    ///
    /// Identity columns are matched against the values read, never assigned.
    /// Columns missing from the transformed row are left untouched. A row with
    /// nothing to assign is skipped and reports zero affected rows.
    ///
    /// # Errors
    ///
    /// Returns the first failure; rows already updated stay updated
    #[instrument(skip(self, transform, predicate), fields(db.table = %table))]
    pub async fn edit(
        &self,
        table: &str,
        transform: RowTransform<'_>,
        predicate: Option<RowFilter<'_>>,
    ) -> DatabaseResult<Vec<ResultHeader>> {
        let start = Instant::now();
        let targets = self.read(table, None, predicate).await?;
        if targets.rows.is_empty() {
            debug!("no rows matched, nothing to update");
            return Ok(Vec::new());
        }
        let identity = Identity::derive(&targets.columns);
        debug!(identity = ?identity.columns(), source = ?identity.source(), "derived row identity");

        let statements = targets
            .rows
            .iter()
            .map(|snapshot| {
                let transformed = transform(snapshot.clone());
                statements::update(table, &identity, snapshot, &transformed)
            })
            .collect::<DatabaseResult<Vec<_>>>()?;
        let result = self.dispatch(statements.iter().map(Option::as_ref)).await;
        log_outcome("edit", table, start, &result);
        result
    }

    /// Delete every row accepted by `predicate`, matched by its identity columns
    ///
    /// # Errors
    ///
    /// Returns the first failure; rows already deleted stay deleted
    #[instrument(skip(self, predicate), fields(db.table = %table))]
    pub async fn del(
        &self,
        table: &str,
        predicate: Option<RowFilter<'_>>,
    ) -> DatabaseResult<Vec<ResultHeader>> {
        let start = Instant::now();
        let targets = self.read(table, None, predicate).await?;
        if targets.rows.is_empty() {
            debug!("no rows matched, nothing to delete");
            return Ok(Vec::new());
        }
        let identity = Identity::derive(&targets.columns);
        let statements = targets
            .rows
            .iter()
            .map(|snapshot| statements::delete(table, &identity, snapshot))
            .collect::<DatabaseResult<Vec<_>>>()?;
        let result = self.dispatch(statements.iter().map(Some)).await;
        log_outcome("del", table, start, &result);
        result
    }

    async fn read(
        &self,
        table: &str,
        columns: Option<&[&str]>,
        predicate: Option<RowFilter<'_>>,
    ) -> DatabaseResult<Selection> {
        let sql = statements::select(table, columns)?;
        let statement = self.executor.prepare(&sql, None)?.with_source_table(table);
        let mut selection = self.executor.run(&statement).await?.into_selection();
        if let Some(keep) = predicate {
            selection.rows.retain(|row| keep(row));
        }
        Ok(selection)
    }

    /// Run statements concurrently; `None` entries report zero affected rows
    ///
    /// Every statement runs to completion and hands its connection back before
    /// the first failure, in input order, is returned.
    async fn dispatch<'s, I>(&self, statements: I) -> DatabaseResult<Vec<ResultHeader>>
    where
        I: IntoIterator<Item = Option<&'s (String, Param)>>,
    {
        join_all(statements.into_iter().map(|statement| async move {
            match statement {
                Some((sql, values)) => self
                    .executor
                    .execute(sql, Some(values))
                    .await
                    .map(|output| output.header()),
                None => Ok(ResultHeader::default()),
            }
        }))
        .await
        .into_iter()
        .collect()
    }
}

fn log_outcome(
    operation: &str,
    table: &str,
    start: Instant,
    result: &DatabaseResult<Vec<ResultHeader>>,
) {
    let duration_ms = start.elapsed().as_millis() as u64;
    AppLogger::log_database_operation(operation, table, result.is_ok(), duration_ms);
    if let Ok(headers) = result {
        AppLogger::log_batch_outcome(
            operation,
            table,
            headers.len(),
            headers.iter().map(|h| h.affected_rows).sum(),
        );
    }
}
