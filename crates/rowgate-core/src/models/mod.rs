// ABOUTME: Core data models shared by the normalizer, reconciler, executor, and row engine
// ABOUTME: Re-exports Param, BindValue, BindPayload, ColumnMetadata, Row and result types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `Param`: loosely-typed caller input (scalars, sequences, keyed structures, opaque values)
//! - `BindValue`: the closed set of values a driver can bind directly
//! - `BindPayload`: positional or named arguments for one statement
//! - `ColumnMetadata`: per-column identity capabilities decoded from driver flags
//! - `Row`, `ResultHeader`, `QueryOutput`: what comes back from the database

mod bind;
mod column;
mod param;
mod payload;
mod row;

pub use bind::{BindValue, Scalar};
pub use column::{ColumnFlags, ColumnMetadata};
pub use param::Param;
pub use payload::{BindPayload, NamedParams, PlaceholderStyle, PlaceholderSummary, QueryDescriptor};
pub use row::{QueryOutput, ResultHeader, Row, Selection};
