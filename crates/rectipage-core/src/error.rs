// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Rectipage.

use thiserror::Error;

/// Top-level error type for all Rectipage operations.
///
/// Every variant is terminal for a single rectification request: nothing is
/// retried automatically and no partially warped image is ever returned.
#[derive(Debug, Error)]
pub enum RectipageError {
    // -- Geometry errors --
    /// The corners do not admit a unique homography (collinear points,
    /// duplicate points, or a numerically singular system).
    #[error("degenerate corner configuration: {0}")]
    DegenerateConfiguration(String),

    #[error("invalid dimensions {width}x{height}: width and height must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid corners: {0}")]
    InvalidCorners(String),

    // -- Pipeline errors --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("rectification cancelled")]
    Cancelled,

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RectipageError>;
