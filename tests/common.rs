// ABOUTME: Shared test utilities and a scripted connection pool for integration tests
// ABOUTME: Records every statement and counts acquire/release/destroy calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `rowgate`
//!
//! `MockPool` stands in for a database: a responder closure decides what each
//! statement returns, and the pool keeps a log of everything it was asked to run.

use async_trait::async_trait;
use rowgate::config::EngineConfig;
use rowgate::database::{ConnectionPool, DatabaseResult, PooledConnection, Statement};
use rowgate::engine::RowEngine;
use rowgate::models::{ColumnMetadata, QueryOutput, ResultHeader, Row, Selection};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // Check for TEST_LOG environment variable to control test logging level
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN, // Default to WARN for quiet tests
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Decides the outcome of each statement
pub type Responder = Arc<dyn Fn(&Statement) -> DatabaseResult<QueryOutput> + Send + Sync>;

/// How long a statement takes before it is answered
pub type Latency = Arc<dyn Fn(&Statement) -> Option<Duration> + Send + Sync>;

struct MockState {
    responder: Responder,
    latency: Mutex<Option<Latency>>,
    log: Mutex<Vec<Statement>>,
    completed: AtomicUsize,
    acquired: AtomicUsize,
    released: AtomicUsize,
    destroyed: AtomicUsize,
    releasable: AtomicBool,
    closed: AtomicBool,
}

/// Scripted pool
#[derive(Clone)]
pub struct MockPool {
    state: Arc<MockState>,
}

impl MockPool {
    pub fn new(
        responder: impl Fn(&Statement) -> DatabaseResult<QueryOutput> + Send + Sync + 'static,
    ) -> Self {
        Self {
            state: Arc::new(MockState {
                responder: Arc::new(responder),
                latency: Mutex::new(None),
                log: Mutex::new(Vec::new()),
                completed: AtomicUsize::new(0),
                acquired: AtomicUsize::new(0),
                released: AtomicUsize::new(0),
                destroyed: AtomicUsize::new(0),
                releasable: AtomicBool::new(true),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Reads return `rows` described by `columns`; writes affect one row
    pub fn with_table(columns: Vec<ColumnMetadata>, rows: Vec<Row>) -> Self {
        Self::with_table_and_writes(columns, rows, |_| Ok(ResultHeader::affected(1)))
    }

    /// Reads return `rows` described by `columns`; writes are answered by `write`
    pub fn with_table_and_writes(
        columns: Vec<ColumnMetadata>,
        rows: Vec<Row>,
        write: impl Fn(&Statement) -> DatabaseResult<ResultHeader> + Send + Sync + 'static,
    ) -> Self {
        Self::new(move |statement| {
            if statement.kind.returns_rows() {
                Ok(QueryOutput::Rows(Selection {
                    rows: rows.clone(),
                    columns: columns.clone(),
                }))
            } else {
                write(statement).map(QueryOutput::Header)
            }
        })
    }

    /// Handles stop being releasable and get destroyed instead
    pub fn refuse_release(&self) {
        self.state.releasable.store(false, Ordering::SeqCst);
    }

    /// Statements for which `latency` returns a duration sleep before answering
    pub fn delay(
        &self,
        latency: impl Fn(&Statement) -> Option<Duration> + Send + Sync + 'static,
    ) {
        *self.state.latency.lock().unwrap() = Some(Arc::new(latency));
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.state.log.lock().unwrap().clone()
    }

    /// Statements that do not return rows
    pub fn writes(&self) -> Vec<Statement> {
        self.statements()
            .into_iter()
            .filter(|s| !s.kind.returns_rows())
            .collect()
    }

    pub fn acquired(&self) -> usize {
        self.state.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.state.released.load(Ordering::SeqCst)
    }

    pub fn destroyed(&self) -> usize {
        self.state.destroyed.load(Ordering::SeqCst)
    }

    /// Statements that ran to the end, successfully or not
    pub fn completed(&self) -> usize {
        self.state.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionPool for MockPool {
    type Connection = MockConnection;

    async fn acquire(&self) -> DatabaseResult<Self::Connection> {
        if self.is_closed() {
            return Err(rowgate::database::DatabaseError::PoolClosed);
        }
        self.state.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            state: Arc::clone(&self.state),
        })
    }

    async fn close(&self) {
        self.state.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }
}

/// Connection handed out by [`MockPool`]
pub struct MockConnection {
    state: Arc<MockState>,
}

#[async_trait]
impl PooledConnection for MockConnection {
    async fn execute(&mut self, statement: &Statement) -> DatabaseResult<QueryOutput> {
        self.state.log.lock().unwrap().push(statement.clone());
        let latency = self.state.latency.lock().unwrap().clone();
        if let Some(pause) = latency.and_then(|latency| latency(statement)) {
            tokio::time::sleep(pause).await;
        }
        let result = (self.state.responder)(statement);
        self.state.completed.fetch_add(1, Ordering::SeqCst);
        result
    }

    fn can_release(&self) -> bool {
        self.state.releasable.load(Ordering::SeqCst)
    }

    async fn release(self) {
        self.state.released.fetch_add(1, Ordering::SeqCst);
    }

    async fn destroy(self) {
        self.state.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Engine over `pool` with default configuration
pub fn engine(pool: &MockPool) -> RowEngine<MockPool> {
    init_test_logging();
    RowEngine::open(Arc::new(pool.clone()), EngineConfig::default())
}

/// Row from a JSON object literal
pub fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap()
}
