// ABOUTME: Loosely-typed input values accepted by the query and row APIs
// ABOUTME: Converts from Rust scalars, collections, chrono dates and serde_json values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt::Display;

/// An input value as handed over by application code
///
/// This is the only untyped shape the API accepts. It never reaches a driver
/// directly: the normalizer turns it into a [`crate::models::BindValue`] first.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Param {
    /// No value supplied at all
    #[default]
    Undefined,
    /// Explicit SQL NULL
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Signed integer scalar
    Int(i64),
    /// Unsigned integer scalar
    UInt(u64),
    /// Floating point scalar
    Float(f64),
    /// Text scalar
    Text(String),
    /// Ordered sequence
    List(Vec<Param>),
    /// Keyed structure
    Map(BTreeMap<String, Param>),
    /// Anything else, captured by its text representation (dates, custom objects)
    Other(String),
}

impl Param {
    /// Capture an arbitrary displayable value by its text representation
    pub fn other(value: impl Display) -> Self {
        Self::Other(value.to_string())
    }

    /// Build a keyed structure from name/value pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Self>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a sequence from anything convertible into params
    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<Self>,
        I: IntoIterator<Item = V>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Keyed structure entries, if this is one
    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Sequence items, if this is one
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// JSON view of this value
    ///
    /// Undefined entries are dropped from keyed structures and become `null`
    /// inside sequences. Non-finite floats become `null`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Undefined | Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::UInt(u) => Value::from(*u),
            Self::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Text(s) | Self::Other(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .filter(|(_, v)| !matches!(v, Self::Undefined))
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Param {
    fn from(value: u32) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<u64> for Param {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Param {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<DateTime<Utc>> for Param {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Other(value.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }
}

impl From<NaiveDateTime> for Param {
    fn from(value: NaiveDateTime) -> Self {
        Self::Other(value.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }
}

impl From<NaiveDate> for Param {
    fn from(value: NaiveDate) -> Self {
        Self::Other(value.format("%Y-%m-%d").to_string())
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_u64().map(Self::UInt))
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => {
                Self::Map(entries.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for Param {
    fn from(value: &Value) -> Self {
        Self::from(value.clone())
    }
}

impl From<Map<String, Value>> for Param {
    fn from(value: Map<String, Value>) -> Self {
        Self::from(Value::Object(value))
    }
}
