// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectipage — Core geometry types, error definitions, and configuration
// shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::RectipageConfig;
pub use error::RectipageError;
pub use types::*;
