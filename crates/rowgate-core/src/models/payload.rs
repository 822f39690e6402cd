// ABOUTME: Bind payload shapes and placeholder descriptors for reconciled statements
// ABOUTME: Positional sequences, first-appearance ordered named parameters, and summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::BindValue;
use serde::Serialize;

/// Placeholder style inferred from the query text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaceholderStyle {
    /// `?` placeholders
    Positional,
    /// `:name` placeholders
    Named,
    /// Nothing to bind
    None,
}

/// Query text plus the placeholder style it was reconciled with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    /// Statement text
    pub sql: String,
    /// Inferred placeholder style
    pub style: PlaceholderStyle,
}

/// Placeholders detected in a query, reported with reconciliation failures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaceholderSummary {
    /// Number of `?` placeholders counted by the statement parser
    pub positional: usize,
    /// Named placeholders in order of appearance, duplicates retained
    pub named: Vec<String>,
}

/// Named arguments keyed by parameter name, in first-appearance order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedParams {
    entries: Vec<(String, BindValue)>,
}

impl NamedParams {
    /// Empty set of named arguments
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a value; a name seen before keeps its position and takes the new value
    pub fn insert(&mut self, name: impl Into<String>, value: BindValue) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Value bound to `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BindValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Whether `name` has a value
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Parameter names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Name/value pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BindValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of distinct names
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no names are bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, BindValue)> for NamedParams {
    fn from_iter<I: IntoIterator<Item = (K, BindValue)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Arguments for one statement, shaped the way the execution primitive expects
#[derive(Debug, Clone, PartialEq)]
pub enum BindPayload {
    /// Values for `?` placeholders, in order
    Positional(Vec<BindValue>),
    /// Values for `:name` placeholders
    Named(NamedParams),
}

impl BindPayload {
    /// Placeholder style this payload satisfies
    #[must_use]
    pub const fn style(&self) -> PlaceholderStyle {
        match self {
            Self::Positional(_) => PlaceholderStyle::Positional,
            Self::Named(_) => PlaceholderStyle::Named,
        }
    }

    /// Positional values, if positional
    #[must_use]
    pub fn as_positional(&self) -> Option<&[BindValue]> {
        match self {
            Self::Positional(values) => Some(values),
            Self::Named(_) => None,
        }
    }

    /// Named values, if named
    #[must_use]
    pub const fn as_named(&self) -> Option<&NamedParams> {
        match self {
            Self::Named(params) => Some(params),
            Self::Positional(_) => None,
        }
    }

    /// Number of bound entries
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Positional(values) => values.len(),
            Self::Named(params) => params.len(),
        }
    }

    /// Whether nothing is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
