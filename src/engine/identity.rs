// ABOUTME: Identity key derivation from result-set column metadata
// ABOUTME: Picks primary key columns, then unique index columns, then every column
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use rowgate_core::models::{ColumnMetadata, Row};
use serde_json::Value;

static NULL: Value = Value::Null;

/// Where an [`Identity`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Primary key columns
    PrimaryKey,
    /// Unique index columns of a table without a primary key
    UniqueIndex,
    /// No key metadata: every column of the read
    AllColumns,
}

/// Columns that single out one row of a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    columns: Vec<String>,
    source: IdentitySource,
}

impl Identity {
    /// Derive the identity of rows described by `columns`
    #[must_use]
    pub fn derive(columns: &[ColumnMetadata]) -> Self {
        let pick = |keep: fn(&ColumnMetadata) -> bool| -> Vec<String> {
            columns
                .iter()
                .filter(|c| keep(c))
                .map(|c| c.name.clone())
                .collect()
        };

        let primary = pick(|c| c.is_primary_key);
        if !primary.is_empty() {
            return Self {
                columns: primary,
                source: IdentitySource::PrimaryKey,
            };
        }
        let unique = pick(|c| c.is_unique_index);
        if !unique.is_empty() {
            return Self {
                columns: unique,
                source: IdentitySource::UniqueIndex,
            };
        }
        Self {
            columns: pick(|_| true),
            source: IdentitySource::AllColumns,
        }
    }

    /// Identity column names in result order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Source of the identity columns
    #[must_use]
    pub const fn source(&self) -> IdentitySource {
        self.source
    }

    /// Whether `column` must stay out of an UPDATE's SET list
    ///
    /// Key columns are never rewritten. With the all-columns fallback every
    /// column is both matched and assignable.
    #[must_use]
    pub fn excludes_from_set(&self, column: &str) -> bool {
        self.source != IdentitySource::AllColumns && self.columns.iter().any(|c| c == column)
    }

    /// Snapshot values of the identity columns; a column missing from the row is NULL
    #[must_use]
    pub fn values<'r>(&self, row: &'r Row) -> Vec<(&str, &'r Value)> {
        self.columns
            .iter()
            .map(|c| (c.as_str(), row.get(c).unwrap_or(&NULL)))
            .collect()
    }
}
