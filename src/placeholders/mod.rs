// ABOUTME: Placeholder reconciler matching query placeholders against supplied values
// ABOUTME: Infers positional vs named style and shapes the bind payload the driver expects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Placeholder Reconciliation
//!
//! Placeholder style is inferred from the query text rather than declared by the
//! caller. Rules are applied in order and the first match wins:
//!
//! 1. exactly one `?`: bind a single value (first element of a sequence, or the value itself)
//! 2. several `?` and a sequence: bind every element in order
//! 3. `:name` placeholders and a keyed structure: bind each distinct name
//! 4. otherwise nothing is bound

/// Statement parser collaborator and the default lexical implementation
pub mod parser;

pub use parser::{
    IdentifiedStatement, LexicalStatementParser, SqlDialect, StatementKind, StatementParser,
};

use crate::normalize::bind_value;
use regex::Regex;
use rowgate_core::constants::placeholders::{NAMED_MARKER, POSITIONAL_MARKER};
use rowgate_core::errors::{DatabaseError, DatabaseResult};
use rowgate_core::models::{BindPayload, BindValue, NamedParams, Param, PlaceholderSummary};
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Named placeholder: a colon followed by an identifier that starts with a letter
/// Stored as Option to handle compilation failures gracefully (should never fail for static patterns)
static NAMED_PLACEHOLDER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i):[a-z][a-z0-9_]*").ok());

/// Options for [`parse_query_string_values`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Bind NULL for named placeholders missing from the values instead of failing
    pub force: bool,
    /// Dialect handed to the statement parser
    pub dialect: SqlDialect,
}

/// Named placeholders in order of appearance, colon included, duplicates retained
#[must_use]
pub fn named_placeholders(sql: &str) -> Vec<String> {
    NAMED_PLACEHOLDER.as_ref().map_or_else(Vec::new, |re| {
        re.find_iter(sql).map(|m| m.as_str().to_owned()).collect()
    })
}

/// Reconcile `values` against the placeholders of `sql` using the default parser
///
/// # Errors
///
/// Returns [`DatabaseError::MissingParameter`] when a named placeholder has no
/// value and `options.force` is off.
pub fn parse_query_string_values(
    sql: &str,
    values: Option<&Param>,
    options: ReconcileOptions,
) -> DatabaseResult<Option<BindPayload>> {
    Reconciler::new(Arc::new(LexicalStatementParser), options).reconcile(sql, values)
}

/// Placeholder reconciler bound to a statement parser
#[derive(Clone)]
pub struct Reconciler {
    parser: Arc<dyn StatementParser>,
    options: ReconcileOptions,
}

impl Reconciler {
    /// Reconciler using `parser` to count positional placeholders
    #[must_use]
    pub fn new(parser: Arc<dyn StatementParser>, options: ReconcileOptions) -> Self {
        Self { parser, options }
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> ReconcileOptions {
        self.options
    }

    /// Statement parser in use
    #[must_use]
    pub fn parser(&self) -> &dyn StatementParser {
        self.parser.as_ref()
    }

    /// Placeholders detected in `sql`
    #[must_use]
    pub fn summarize(&self, sql: &str) -> PlaceholderSummary {
        PlaceholderSummary {
            positional: self.parser.count_positional(sql, self.options.dialect),
            named: named_placeholders(sql),
        }
    }

    /// Produce the bind payload for `sql`, or `None` when nothing should be bound
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::MissingParameter`] when a named placeholder has no
    /// value and force mode is off.
    pub fn reconcile(
        &self,
        sql: &str,
        values: Option<&Param>,
    ) -> DatabaseResult<Option<BindPayload>> {
        let Some(values) = values else {
            return Ok(None);
        };
        let summary = self.summarize(sql);

        if summary.positional == 1 {
            let single = values.as_list().map_or_else(
                || bind_value(values),
                |items| items.first().map_or(BindValue::Null, bind_value),
            );
            return Ok(Some(BindPayload::Positional(vec![single])));
        }

        if summary.positional > 1 {
            if let Some(items) = values.as_list() {
                if items.len() != summary.positional {
                    debug!(
                        expected = summary.positional,
                        supplied = items.len(),
                        "positional value count differs from placeholder count"
                    );
                }
                return Ok(Some(BindPayload::Positional(
                    items.iter().map(bind_value).collect(),
                )));
            }
        }

        if let (false, Some(entries)) = (summary.named.is_empty(), values.as_map()) {
            let mut params = NamedParams::new();
            for placeholder in &summary.named {
                let name = placeholder.trim_start_matches(NAMED_MARKER);
                if params.contains(name) {
                    continue;
                }
                match entries.get(name) {
                    Some(value) => params.insert(name, bind_value(value)),
                    None if self.options.force => params.insert(name, BindValue::Null),
                    None => {
                        return Err(DatabaseError::MissingParameter {
                            parameter: name.to_owned(),
                            query: sql.to_owned(),
                            placeholders: summary.clone(),
                            values: values.to_json(),
                        })
                    }
                }
            }
            return Ok(Some(BindPayload::Named(params)));
        }

        Ok(None)
    }
}

/// Rewrite named placeholders as `?` and list their values in appearance order
///
/// A name used several times is bound once per occurrence; a name without a
/// value binds NULL.
#[must_use]
pub fn compile_named(sql: &str, params: &NamedParams) -> (String, Vec<BindValue>) {
    let Some(re) = NAMED_PLACEHOLDER.as_ref() else {
        return (sql.to_owned(), Vec::new());
    };
    let mut values = Vec::new();
    let rewritten = re.replace_all(sql, |caps: &regex::Captures<'_>| {
        let name = caps[0].trim_start_matches(NAMED_MARKER);
        values.push(params.get(name).cloned().unwrap_or(BindValue::Null));
        POSITIONAL_MARKER.to_string()
    });
    (rewritten.into_owned(), values)
}
