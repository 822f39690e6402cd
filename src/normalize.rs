// ABOUTME: Value normalizer turning loosely-typed inputs into bind-safe values
// ABOUTME: Scalars pass through, composites become JSON text, opaque values become text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Value Normalization
//!
//! Every value that reaches a placeholder goes through [`bind_value`], so a driver
//! only ever sees one of `Null`, a native scalar, plain text, or JSON text.
//! [`process_value`] additionally supports the recursive (non-JSON) mode for callers
//! that want to keep a composite's shape.

use rowgate_core::models::{BindValue, Param, Scalar};
use std::collections::BTreeMap;

/// Options for [`process_value`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Serialize sequences and keyed structures to JSON text instead of recursing
    pub as_json: bool,
}

impl ProcessOptions {
    /// Composite values become JSON text
    pub const JSON: Self = Self { as_json: true };
    /// Composite values are normalized element by element
    pub const RECURSIVE: Self = Self { as_json: false };
}

/// Result of [`process_value`]: a bind value, or a composite of normalized values
#[derive(Debug, Clone, PartialEq)]
pub enum Processed {
    /// Leaf ready for binding
    Value(BindValue),
    /// Sequence whose elements were normalized
    List(Vec<Processed>),
    /// Keyed structure whose values were normalized
    Map(BTreeMap<String, Processed>),
}

impl Processed {
    /// The bind value, when this is a leaf
    #[must_use]
    pub fn into_bind_value(self) -> Option<BindValue> {
        match self {
            Self::Value(value) => Some(value),
            Self::List(_) | Self::Map(_) => None,
        }
    }
}

/// Normalize a value, serializing composites to JSON text
///
/// Undefined becomes `Null`; scalars and text pass through unchanged; anything
/// opaque is bound by its text representation.
#[must_use]
pub fn bind_value(value: &Param) -> BindValue {
    match value {
        Param::Undefined | Param::Null => BindValue::Null,
        Param::Bool(b) => BindValue::Scalar(Scalar::Bool(*b)),
        Param::Int(i) => BindValue::Scalar(Scalar::Int(*i)),
        Param::UInt(u) => BindValue::Scalar(Scalar::UInt(*u)),
        Param::Float(f) => BindValue::Scalar(Scalar::Float(*f)),
        Param::Text(s) | Param::Other(s) => BindValue::Text(s.clone()),
        Param::List(_) | Param::Map(_) => BindValue::JsonText(value.to_json().to_string()),
    }
}

/// Normalize a value according to `options`
#[must_use]
pub fn process_value(value: &Param, options: ProcessOptions) -> Processed {
    match value {
        Param::List(items) if !options.as_json => Processed::List(
            items
                .iter()
                .map(|item| process_value(item, options))
                .collect(),
        ),
        Param::Map(entries) if !options.as_json => Processed::Map(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), process_value(item, options)))
                .collect(),
        ),
        _ => Processed::Value(bind_value(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_undefined_and_null_become_null() {
        assert_eq!(bind_value(&Param::Undefined), BindValue::Null);
        assert_eq!(bind_value(&Param::Null), BindValue::Null);
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(bind_value(&Param::Int(5)), BindValue::from(5_i64));
        assert_eq!(bind_value(&Param::Bool(true)), BindValue::from(true));
        assert_eq!(bind_value(&Param::Float(1.5)), BindValue::from(1.5));
        assert_eq!(bind_value(&Param::from("x")), BindValue::from("x"));
    }

    #[test]
    fn test_composite_json_round_trips() {
        let original = json!({"a": 1, "tags": ["x", "y"], "nested": {"ok": true}});
        let BindValue::JsonText(text) = bind_value(&Param::from(original.clone())) else {
            panic!("composite should serialize to JSON text");
        };
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_opaque_values_use_text_representation() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(bind_value(&Param::from(date)), BindValue::from("2024-02-29"));
        assert_eq!(bind_value(&Param::other(42_u8)), BindValue::from("42"));
    }

    #[test]
    fn test_recursive_mode_keeps_shape() {
        let value = Param::list(vec![Param::Undefined, Param::from(vec![1_i64, 2])]);
        let processed = process_value(&value, ProcessOptions::RECURSIVE);
        assert_eq!(
            processed,
            Processed::List(vec![
                Processed::Value(BindValue::Null),
                Processed::List(vec![
                    Processed::Value(BindValue::from(1_i64)),
                    Processed::Value(BindValue::from(2_i64)),
                ]),
            ])
        );
    }

    #[test]
    fn test_json_mode_flattens_composites() {
        let value = Param::map([("a", 1_i64)]);
        let processed = process_value(&value, ProcessOptions::JSON);
        assert_eq!(
            processed.into_bind_value(),
            Some(BindValue::JsonText(r#"{"a":1}"#.to_owned()))
        );
    }
}
