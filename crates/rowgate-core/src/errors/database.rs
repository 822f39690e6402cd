// ABOUTME: Database error types for reconciliation, identifier validation, and execution
// ABOUTME: Provides domain-specific errors with enough context to diagnose a failed statement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::models::PlaceholderSummary;

/// Errors raised between receiving a statement and getting its result back
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// A named placeholder has no value and force mode is off
    #[error("Missing value for named parameter ':{parameter}' in query: {query}")]
    MissingParameter {
        /// Parameter name without the leading colon
        parameter: String,
        /// Query text as supplied
        query: String,
        /// Placeholders detected in the query
        placeholders: PlaceholderSummary,
        /// Original values, rendered as JSON for diagnostics
        values: serde_json::Value,
    },

    /// A table or column name cannot be used in generated SQL
    #[error("Invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier {
        /// Offending identifier
        identifier: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Statement failed inside the database collaborator
    #[error("Query failed: {context}")]
    QueryError {
        /// Driver message or surrounding context
        context: String,
    },

    /// A pooled connection could not be obtained or has been lost
    #[error("Connection error: {context}")]
    ConnectionError {
        /// Driver message or surrounding context
        context: String,
    },

    /// The engine's pool has already been closed
    #[error("Connection pool is closed")]
    PoolClosed,

    /// Error reported by sqlx
    #[cfg(feature = "database-errors")]
    #[error("Database driver error")]
    Sqlx {
        /// Underlying sqlx error
        #[from]
        source: sqlx::Error,
    },
}

impl DatabaseError {
    /// Whether this failure happened before any statement reached the database
    #[must_use]
    pub const fn is_pre_execution(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter { .. } | Self::InvalidIdentifier { .. }
        )
    }
}

/// Result alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
