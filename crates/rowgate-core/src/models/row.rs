// ABOUTME: Rows, result headers, and query output returned by the database collaborator
// ABOUTME: Row snapshots are plain JSON maps captured at read time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ColumnMetadata;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column name to raw value, as read from the database
pub type Row = Map<String, Value>;

/// Outcome of a statement that does not return rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultHeader {
    /// Rows inserted, updated, or deleted
    pub affected_rows: u64,
    /// Auto-increment id generated by an insert
    pub last_insert_id: Option<u64>,
}

impl ResultHeader {
    /// Header reporting `affected_rows` and no generated id
    #[must_use]
    pub const fn affected(affected_rows: u64) -> Self {
        Self {
            affected_rows,
            last_insert_id: None,
        }
    }
}

/// Rows of a read together with the read's column metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Rows, possibly filtered
    pub rows: Vec<Row>,
    /// Column metadata of the full read
    pub columns: Vec<ColumnMetadata>,
}

/// Raw result of executing one statement
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// Result set with per-column metadata
    Rows(Selection),
    /// Header of a write or DDL statement
    Header(ResultHeader),
}

impl QueryOutput {
    /// Result header, or a zero-affected header for reads
    #[must_use]
    pub fn header(&self) -> ResultHeader {
        match self {
            Self::Header(header) => *header,
            Self::Rows(_) => ResultHeader::default(),
        }
    }

    /// Result set, or an empty selection for writes
    #[must_use]
    pub fn into_selection(self) -> Selection {
        match self {
            Self::Rows(selection) => selection,
            Self::Header(_) => Selection::default(),
        }
    }

    /// Rows of a result set
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        match self {
            Self::Rows(selection) => &selection.rows,
            Self::Header(_) => &[],
        }
    }
}
