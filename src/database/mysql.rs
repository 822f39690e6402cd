// ABOUTME: sqlx-backed MySQL implementation of the connection pool collaborator
// ABOUTME: Binds reconciled payloads, decodes rows to JSON, and reports key flags per column
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{ConnectionPool, DatabaseError, DatabaseResult, PooledConnection, Statement};
use crate::config::DatabaseConfig;
use crate::placeholders::compile_named;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rowgate_core::constants::column_flags;
use rowgate_core::models::{
    BindPayload, BindValue, ColumnMetadata, QueryOutput, ResultHeader, Row, Scalar, Selection,
};
use serde_json::Value;
use sqlx::mysql::{MySql, MySqlArguments, MySqlColumn, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::{Column, Decode, Executor, Row as _, Type, TypeInfo};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Unique index members of a table, `PRIMARY` marking the primary key
const KEY_COLUMNS_QUERY: &str = "SELECT COLUMN_NAME, INDEX_NAME FROM information_schema.STATISTICS \
     WHERE TABLE_SCHEMA = COALESCE(?, DATABASE()) AND TABLE_NAME = ? AND NON_UNIQUE = 0";

/// Connection pool over `sqlx::MySqlPool`
#[derive(Clone)]
pub struct MySqlConnectionPool {
    pool: MySqlPool,
}

impl MySqlConnectionPool {
    /// Open a pool using `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the initial connection cannot be established
    pub async fn connect(config: &DatabaseConfig) -> DatabaseResult<Self> {
        let mut options = MySqlPoolOptions::new()
            .max_connections(config.pool.max_connections)
            .min_connections(config.pool.min_connections)
            .acquire_timeout(Duration::from_secs(config.pool.acquire_timeout_secs))
            .test_before_acquire(config.sqlx.test_before_acquire);
        if let Some(secs) = config.sqlx.idle_timeout_secs {
            options = options.idle_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.sqlx.max_lifetime_secs {
            options = options.max_lifetime(Duration::from_secs(secs));
        }

        let pool = options
            .connect(&config.url.to_connection_string())
            .await
            .map_err(|e| DatabaseError::ConnectionError {
                context: format!("Failed to connect to {}: {e}", config.url),
            })?;

        info!(
            db.url = %config.url,
            db.max_connections = config.pool.max_connections,
            db.min_connections = config.pool.min_connections,
            "MySQL connection pool ready"
        );
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    #[must_use]
    pub const fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Underlying sqlx pool
    #[must_use]
    pub const fn inner(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl ConnectionPool for MySqlConnectionPool {
    type Connection = MySqlPooledConnection;

    async fn acquire(&self) -> DatabaseResult<Self::Connection> {
        if self.pool.is_closed() {
            return Err(DatabaseError::PoolClosed);
        }
        let conn = self.pool.acquire().await.map_err(|e| match e {
            sqlx::Error::PoolClosed => DatabaseError::PoolClosed,
            other => DatabaseError::ConnectionError {
                context: format!("Failed to acquire connection: {other}"),
            },
        })?;
        Ok(MySqlPooledConnection { conn, broken: false })
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

/// Connection checked out of a [`MySqlConnectionPool`]
pub struct MySqlPooledConnection {
    conn: PoolConnection<MySql>,
    broken: bool,
}

impl MySqlPooledConnection {
    async fn fetch(&mut self, statement: &Statement) -> DatabaseResult<Selection> {
        let (sql, binds) = compile(statement);
        let rows = bind_all(sqlx::query(&sql), &binds)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| self.observe(e))?;

        let described;
        let columns: &[MySqlColumn] = if let Some(first) = rows.first() {
            first.columns()
        } else {
            described = (&mut *self.conn)
                .describe(&sql)
                .await
                .map_err(|e| self.observe(e))?;
            described.columns()
        };

        let flags = match statement.source_table.as_deref() {
            Some(table) => self.key_flags(table).await?,
            None => HashMap::new(),
        };
        let columns = columns
            .iter()
            .map(|c| {
                let bits = flags.get(c.name()).copied().unwrap_or_default();
                ColumnMetadata::from_flags(c.name(), bits)
            })
            .collect();

        Ok(Selection {
            rows: rows.iter().map(decode_row).collect(),
            columns,
        })
    }

    async fn write(&mut self, statement: &Statement) -> DatabaseResult<ResultHeader> {
        let (sql, binds) = compile(statement);
        let result = bind_all(sqlx::query(&sql), &binds)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| self.observe(e))?;
        Ok(ResultHeader {
            affected_rows: result.rows_affected(),
            last_insert_id: Some(result.last_insert_id()).filter(|id| *id != 0),
        })
    }

    /// Key flags of every unique index member of `table`
    async fn key_flags(&mut self, table: &str) -> DatabaseResult<HashMap<String, u16>> {
        let (schema, name) = match table.split_once('.') {
            Some((schema, name)) => (Some(schema.trim_matches('`')), name),
            None => (None, table),
        };
        let rows = sqlx::query(KEY_COLUMNS_QUERY)
            .bind(schema.map(str::to_owned))
            .bind(name.trim_matches('`').to_owned())
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| self.observe(e))?;

        let mut flags: HashMap<String, u16> = HashMap::new();
        for row in &rows {
            let column: String = row.try_get_unchecked(0)?;
            let index: String = row.try_get_unchecked(1)?;
            *flags.entry(column).or_default() |= index_flag(&index);
        }
        debug!(db.table = %table, db.key_columns = flags.len(), "resolved key columns");
        Ok(flags)
    }

    /// Note transport failures so the handle is destroyed instead of pooled
    fn observe(&mut self, error: sqlx::Error) -> DatabaseError {
        if matches!(
            error,
            sqlx::Error::Io(_) | sqlx::Error::Protocol(_) | sqlx::Error::Tls(_)
        ) {
            self.broken = true;
        }
        DatabaseError::from(error)
    }
}

#[async_trait]
impl PooledConnection for MySqlPooledConnection {
    async fn execute(&mut self, statement: &Statement) -> DatabaseResult<QueryOutput> {
        if statement.kind.returns_rows() {
            self.fetch(statement).await.map(QueryOutput::Rows)
        } else {
            self.write(statement).await.map(QueryOutput::Header)
        }
    }

    fn can_release(&self) -> bool {
        !self.broken
    }

    async fn release(self) {
        drop(self.conn);
    }

    async fn destroy(self) {
        if let Err(e) = self.conn.close().await {
            warn!(error = %e, "failed to close connection");
        }
    }
}

/// Statement text and binds in driver order
/// Column flag bit for a member of the named index
fn index_flag(index_name: &str) -> u16 {
    if index_name == "PRIMARY" {
        column_flags::PRIMARY_KEY
    } else {
        column_flags::UNIQUE_KEY
    }
}

fn compile(statement: &Statement) -> (String, Vec<BindValue>) {
    match &statement.payload {
        Some(BindPayload::Named(params)) => compile_named(&statement.sql, params),
        Some(BindPayload::Positional(values)) => (statement.sql.clone(), values.clone()),
        None => (statement.sql.clone(), Vec::new()),
    }
}

fn bind_all<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    values: &[BindValue],
) -> Query<'q, MySql, MySqlArguments> {
    for value in values {
        query = match value {
            BindValue::Null => query.bind(None::<String>),
            BindValue::Scalar(Scalar::Bool(b)) => query.bind(*b),
            BindValue::Scalar(Scalar::Int(i)) => query.bind(*i),
            BindValue::Scalar(Scalar::UInt(u)) => query.bind(*u),
            BindValue::Scalar(Scalar::Float(f)) => query.bind(*f),
            BindValue::Text(s) | BindValue::JsonText(s) => query.bind(s.clone()),
        };
    }
    query
}

fn decode_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .map(|column| {
            let index = column.ordinal();
            (column.name().to_owned(), decode_column(row, index, column))
        })
        .collect()
}

fn decode_column(row: &MySqlRow, index: usize, column: &MySqlColumn) -> Value {
    let type_name = column.type_info().name();
    let decoded = match type_name {
        "NULL" => Some(Value::Null),
        "BOOLEAN" => decode_as::<bool, _>(row, index, Value::Bool),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => decode_as::<u64, _>(row, index, Value::from),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            decode_as::<i64, _>(row, index, Value::from)
        }
        "FLOAT" => decode_as::<f32, _>(row, index, |f| Value::from(f64::from(f))),
        "DOUBLE" => decode_as::<f64, _>(row, index, Value::from),
        "JSON" => decode_as::<Value, _>(row, index, |v| v),
        "DATETIME" | "TIMESTAMP" => decode_as::<NaiveDateTime, _>(row, index, |v| {
            Value::String(v.format("%Y-%m-%d %H:%M:%S%.f").to_string())
        }),
        "DATE" => decode_as::<NaiveDate, _>(row, index, |v| Value::String(v.to_string())),
        "TIME" => decode_as::<NaiveTime, _>(row, index, |v| Value::String(v.to_string())),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            decode_as::<Vec<u8>, _>(row, index, |bytes| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        }
        _ => None,
    };
    decoded.unwrap_or_else(|| decode_text(row, index))
}

fn decode_as<'r, T, F>(row: &'r MySqlRow, index: usize, convert: F) -> Option<Value>
where
    T: Decode<'r, MySql> + Type<MySql>,
    F: FnOnce(T) -> Value,
{
    row.try_get::<Option<T>, _>(index)
        .ok()
        .map(|value| value.map_or(Value::Null, convert))
}

/// Text form of any column the typed decoders did not handle (DECIMAL, ENUM, SET, ...)
fn decode_text(row: &MySqlRow, index: usize) -> Value {
    row.try_get_unchecked::<Option<String>, _>(index)
        .map(|value| value.map_or(Value::Null, Value::String))
        .or_else(|_| {
            row.try_get_unchecked::<Option<Vec<u8>>, _>(index)
                .map(|value| {
                    value.map_or(Value::Null, |bytes| {
                        Value::String(String::from_utf8_lossy(&bytes).into_owned())
                    })
                })
        })
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholders::StatementKind;
    use rowgate_core::models::NamedParams;

    #[test]
    fn test_compile_named_payload_uses_positional_markers() {
        let params: NamedParams = [("id", BindValue::from(3_i64))].into_iter().collect();
        let statement = Statement::new(
            "DELETE FROM `t` WHERE `id` <=> :id",
            StatementKind::Delete,
            Some(BindPayload::Named(params)),
        );
        let (sql, binds) = compile(&statement);
        assert_eq!(sql, "DELETE FROM `t` WHERE `id` <=> ?");
        assert_eq!(binds, vec![BindValue::from(3_i64)]);
    }

    #[test]
    fn test_index_flags_decode_to_key_capabilities() {
        let mut bits = index_flag("PRIMARY");
        bits |= index_flag("uniq_email");
        let column = ColumnMetadata::from_flags("id", bits);
        assert!(column.is_primary_key);
        assert!(column.is_unique_index);
        assert_eq!(
            ColumnMetadata::from_flags("email", index_flag("uniq_email")),
            ColumnMetadata::unique("email")
        );
    }

    #[test]
    fn test_compile_without_payload_keeps_text() {
        let statement = Statement::new("SELECT 1", StatementKind::Select, None);
        assert_eq!(compile(&statement), ("SELECT 1".to_owned(), Vec::new()));
    }
}
