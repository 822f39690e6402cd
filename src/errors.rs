// ABOUTME: Error types surfaced by the public API
// ABOUTME: Re-exports the core error enums and result aliases
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use rowgate_core::errors::{AppError, AppResult, DatabaseError, DatabaseResult, ErrorCode};
