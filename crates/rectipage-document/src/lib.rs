// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// rectipage-document — Perspective rectification of photographed documents.
//
// Provides the homography solver (four corner correspondences to a 3x3
// projective matrix), the inverse-mapping perspective resampler, and a
// page-level pipeline (decode, rectify, crop, encode).

pub mod scan;
pub mod warp;

// Re-export the primary entry points so callers can use
// `rectipage_document::solve_homography` etc.
pub use scan::rectify::DocumentRectifier;
pub use warp::cancel::CancelToken;
pub use warp::homography::{rectification_homography, solve_homography};
pub use warp::resample::{Execution, ResampleOptions, resample, resample_with};
pub use warp::PixelBuffer;
