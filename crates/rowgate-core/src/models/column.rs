// ABOUTME: Column metadata decoded once from the driver's column definition flags
// ABOUTME: Exposes primary-key and unique-index capabilities without scattered bit arithmetic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::column_flags;
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Column definition flags as carried in a result-set column description
    ///
    /// Only the key-related bits are modelled; unknown bits are dropped on decode.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ColumnFlags: u16 {
        /// Column cannot hold NULL
        const NOT_NULL = column_flags::NOT_NULL;
        /// Column is part of the primary key
        const PRIMARY_KEY = column_flags::PRIMARY_KEY;
        /// Column is part of a unique index
        const UNIQUE_KEY = column_flags::UNIQUE_KEY;
        /// Column is part of a non-unique index
        const MULTIPLE_KEY = column_flags::MULTIPLE_KEY;
    }
}

/// Identity capabilities of one result-set column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name as returned by the read
    pub name: String,
    /// Column belongs to the primary key
    pub is_primary_key: bool,
    /// Column belongs to a unique index
    pub is_unique_index: bool,
}

impl ColumnMetadata {
    /// Column without identity capabilities
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_primary_key: false,
            is_unique_index: false,
        }
    }

    /// Decode capabilities from a raw driver bitmask
    pub fn from_flags(name: impl Into<String>, bits: u16) -> Self {
        Self::with_flags(name, ColumnFlags::from_bits_truncate(bits))
    }

    /// Decode capabilities from typed flags
    pub fn with_flags(name: impl Into<String>, flags: ColumnFlags) -> Self {
        Self {
            name: name.into(),
            is_primary_key: flags.contains(ColumnFlags::PRIMARY_KEY),
            is_unique_index: flags.contains(ColumnFlags::UNIQUE_KEY),
        }
    }

    /// Primary key column
    pub fn primary_key(name: impl Into<String>) -> Self {
        Self::with_flags(name, ColumnFlags::PRIMARY_KEY)
    }

    /// Unique index column
    pub fn unique(name: impl Into<String>) -> Self {
        Self::with_flags(name, ColumnFlags::UNIQUE_KEY)
    }
}
