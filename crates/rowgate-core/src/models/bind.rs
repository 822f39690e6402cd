// ABOUTME: Closed set of bind-safe values produced exclusively by the value normalizer
// ABOUTME: Null, scalars, plain text, and JSON text for composite inputs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde_json::{Number, Value};

/// Scalar that a driver binds natively
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Floating point
    Float(f64),
}

/// A value ready to be bound to a placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    /// SQL NULL
    Null,
    /// Native scalar
    Scalar(Scalar),
    /// Plain text, either caller text or the text form of an opaque value
    Text(String),
    /// JSON serialization of a sequence or keyed structure
    JsonText(String),
}

impl BindValue {
    /// JSON view used for diagnostics and logging
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Self::Scalar(Scalar::Int(i)) => Value::from(*i),
            Self::Scalar(Scalar::UInt(u)) => Value::from(*u),
            Self::Scalar(Scalar::Float(f)) => {
                Number::from_f64(*f).map_or(Value::Null, Value::Number)
            }
            Self::Text(s) | Self::JsonText(s) => Value::String(s.clone()),
        }
    }
}

impl From<bool> for BindValue {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for BindValue {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::Int(value))
    }
}

impl From<u64> for BindValue {
    fn from(value: u64) -> Self {
        Self::Scalar(Scalar::UInt(value))
    }
}

impl From<f64> for BindValue {
    fn from(value: f64) -> Self {
        Self::Scalar(Scalar::Float(value))
    }
}

impl From<&str> for BindValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for BindValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
