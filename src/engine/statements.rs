// ABOUTME: SQL text builders for the generic row operations
// ABOUTME: Validates and quotes identifiers, and pairs each statement with its bind values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::identity::Identity;
use regex::Regex;
use rowgate_core::constants::placeholders::OLD_VALUE_PREFIX;
use rowgate_core::errors::{DatabaseError, DatabaseResult};
use rowgate_core::models::{Param, Row};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Unquoted identifier, optionally schema-qualified
/// Stored as Option to handle compilation failures gracefully (should never fail for static patterns)
static IDENTIFIER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*(\.[A-Za-z_][A-Za-z0-9_$]*)?$").ok()
});

/// Column name usable verbatim as a named placeholder
static PLACEHOLDER_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").ok());

fn matches(pattern: &LazyLock<Option<Regex>>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(text))
}

/// Backtick-quote a table name, accepting one `schema.` prefix
///
/// # Errors
///
/// Returns [`DatabaseError::InvalidIdentifier`] for anything but plain identifiers
pub fn quote_table(name: &str) -> DatabaseResult<String> {
    if !matches(&IDENTIFIER, name) {
        return Err(DatabaseError::InvalidIdentifier {
            identifier: name.to_owned(),
            reason: "table names must be plain identifiers",
        });
    }
    Ok(name
        .split('.')
        .map(|part| format!("`{part}`"))
        .collect::<Vec<_>>()
        .join("."))
}

/// Backtick-quote a column name
///
/// # Errors
///
/// Returns [`DatabaseError::InvalidIdentifier`] for anything but a plain identifier
pub fn quote_column(name: &str) -> DatabaseResult<String> {
    if !matches(&IDENTIFIER, name) || name.contains('.') {
        return Err(DatabaseError::InvalidIdentifier {
            identifier: name.to_owned(),
            reason: "column names must be plain identifiers",
        });
    }
    Ok(format!("`{name}`"))
}

fn placeholder(name: &str) -> DatabaseResult<String> {
    if !matches(&PLACEHOLDER_NAME, name) {
        return Err(DatabaseError::InvalidIdentifier {
            identifier: name.to_owned(),
            reason: "columns matched by name must start with a letter and use only letters, digits, and underscores",
        });
    }
    Ok(format!(":{name}"))
}

/// `SELECT <columns|*> FROM <table>`
///
/// # Errors
///
/// Returns an error if the table or a column name is invalid
pub fn select(table: &str, columns: Option<&[&str]>) -> DatabaseResult<String> {
    let list = match columns {
        Some(columns) if !columns.is_empty() => columns
            .iter()
            .map(|c| quote_column(c))
            .collect::<DatabaseResult<Vec<_>>>()?
            .join(", "),
        _ => "*".to_owned(),
    };
    Ok(format!("SELECT {list} FROM {}", quote_table(table)?))
}

/// `INSERT INTO <table> (<keys>) VALUES (?, ...)` with the row's values in key order
///
/// # Errors
///
/// Returns an error if the table or a column name is invalid
pub fn insert(table: &str, row: &Row) -> DatabaseResult<(String, Param)> {
    let columns = row
        .keys()
        .map(|c| quote_column(c))
        .collect::<DatabaseResult<Vec<_>>>()?;
    let markers = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({markers})",
        quote_table(table)?,
        columns.join(", ")
    );
    Ok((sql, Param::List(row.values().map(Param::from).collect())))
}

/// `UPDATE <table> SET c=:c, ... WHERE k=:oldk AND ...`
///
/// Returns `None` when no column is left to assign.
///
/// # Errors
///
/// Returns an error if a name is invalid or an assigned column's placeholder
/// collides with an identity placeholder
pub fn update(
    table: &str,
    identity: &Identity,
    snapshot: &Row,
    transformed: &Row,
) -> DatabaseResult<Option<(String, Param)>> {
    let mut values = BTreeMap::new();
    let mut assignments = Vec::new();
    for column in snapshot.keys() {
        let Some(value) = transformed.get(column) else {
            continue;
        };
        if identity.excludes_from_set(column) {
            continue;
        }
        assignments.push(format!("{}={}", quote_column(column)?, placeholder(column)?));
        values.insert(column.clone(), Param::from(value));
    }
    if assignments.is_empty() {
        return Ok(None);
    }

    let mut conditions = Vec::new();
    for (column, value) in identity.values(snapshot) {
        let name = format!("{OLD_VALUE_PREFIX}{column}");
        if values.contains_key(&name) {
            return Err(DatabaseError::InvalidIdentifier {
                identifier: name,
                reason: "column name collides with the placeholder of an identity column",
            });
        }
        conditions.push(condition(column, &name, value)?);
        values.insert(name, Param::from(value));
    }

    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        quote_table(table)?,
        assignments.join(", "),
        conditions.join(" AND ")
    );
    Ok(Some((sql, Param::Map(values))))
}

/// `DELETE FROM <table> WHERE k=:k AND ...` bound to the snapshot values
///
/// # Errors
///
/// Returns an error if a name is invalid
pub fn delete(table: &str, identity: &Identity, snapshot: &Row) -> DatabaseResult<(String, Param)> {
    let mut values = BTreeMap::new();
    let mut conditions = Vec::new();
    for (column, value) in identity.values(snapshot) {
        conditions.push(condition(column, column, value)?);
        values.insert(column.to_owned(), Param::from(value));
    }
    let sql = format!(
        "DELETE FROM {} WHERE {}",
        quote_table(table)?,
        conditions.join(" AND ")
    );
    Ok((sql, Param::Map(values)))
}

/// `col=:name`, or the null-safe `col<=>:name` when the snapshot value is NULL
fn condition(column: &str, name: &str, value: &Value) -> DatabaseResult<String> {
    let operator = if value.is_null() { "<=>" } else { "=" };
    Ok(format!("{}{operator}{}", quote_column(column)?, placeholder(name)?))
}
