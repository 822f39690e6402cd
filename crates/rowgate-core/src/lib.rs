// ABOUTME: Core types and constants for the rowgate data-access layer
// ABOUTME: Foundation crate with error handling, bind values, column metadata, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Rowgate Core
//!
//! Foundation crate providing shared types and constants for the rowgate
//! generic row engine. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `DatabaseError`
//! - **constants**: Column flag bits, dialect defaults, and environment variable names
//! - **models**: Loose input values (`Param`), bind values, payloads, rows, and column metadata

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (`Param`, `BindValue`, `BindPayload`, `ColumnMetadata`, etc.)
pub mod models;
