// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective warp — homography solving, inverse-mapped resampling, and
// cooperative cancellation.

pub mod cancel;
pub mod homography;
pub mod resample;

pub use cancel::CancelToken;
pub use homography::{rectification_homography, solve_homography};
pub use resample::{Execution, ResampleOptions, resample, resample_with};

/// In-memory RGBA8 pixel grid consumed and produced by the warp.
pub type PixelBuffer = image::RgbaImage;
