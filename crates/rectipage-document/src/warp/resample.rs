// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective resampler — paints every destination pixel by pulling it back
// through the inverse homography into the source image.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use rectipage_core::RectipageConfig;
use rectipage_core::error::{RectipageError, Result};
use rectipage_core::types::{Homography, Point2D, Sampling};
use tracing::{debug, instrument};

use super::cancel::CancelToken;

const CHANNELS: usize = 4;

/// Written wherever the source has no coverage.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// How the destination rows are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// Row batches on the global rayon pool.
    #[default]
    Parallel,
    /// Everything on the calling thread.
    Serial,
}

/// Resampling knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleOptions {
    pub sampling: Sampling,
    pub background: Rgba<u8>,
    pub execution: Execution,
    /// Destination rows per batch. Cancellation is polled once per batch.
    pub batch_rows: usize,
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self {
            sampling: Sampling::Nearest,
            background: TRANSPARENT,
            execution: Execution::Parallel,
            batch_rows: 16,
        }
    }
}

impl From<&RectipageConfig> for ResampleOptions {
    fn from(config: &RectipageConfig) -> Self {
        Self {
            sampling: config.sampling,
            background: Rgba(config.background),
            execution: if config.parallel {
                Execution::Parallel
            } else {
                Execution::Serial
            },
            batch_rows: config.batch_rows,
        }
    }
}

/// Warp `source` into a `dst_width` x `dst_height` image with nearest
/// neighbour sampling and a transparent background.
///
/// `homography` maps source coordinates to destination coordinates; its
/// inverse is what gets applied per pixel.
pub fn resample(
    source: &RgbaImage,
    homography: &Homography,
    dst_width: u32,
    dst_height: u32,
) -> Result<RgbaImage> {
    resample_with(
        source,
        homography,
        dst_width,
        dst_height,
        &ResampleOptions::default(),
        None,
    )
}

/// [`resample`] with explicit options and an optional cancellation token.
///
/// Zero destination dimensions are rejected before the source is read.
/// Source lookups outside the image are not errors; those pixels receive
/// `options.background`.
#[instrument(
    level = "debug",
    skip(source, homography, options, cancel),
    fields(src_w = source.width(), src_h = source.height())
)]
pub fn resample_with(
    source: &RgbaImage,
    homography: &Homography,
    dst_width: u32,
    dst_height: u32,
    options: &ResampleOptions,
    cancel: Option<&CancelToken>,
) -> Result<RgbaImage> {
    if dst_width == 0 || dst_height == 0 {
        return Err(RectipageError::InvalidDimensions {
            width: dst_width,
            height: dst_height,
        });
    }
    if options.batch_rows == 0 {
        return Err(RectipageError::InvalidConfig(
            "batch_rows must be at least 1".into(),
        ));
    }

    let sampler = Sampler {
        source,
        inverse: homography.inverse()?,
        sampling: options.sampling,
        background: options.background,
    };

    let output = warp_rows(&sampler, dst_width, dst_height, options, cancel, &|_| {})?;
    debug!(dst_width, dst_height, sampling = ?options.sampling, "Resample complete");
    Ok(output)
}

/// Fill a fresh destination image batch by batch. `after_batch` receives the
/// index of every batch that finished.
fn warp_rows(
    sampler: &Sampler<'_>,
    dst_width: u32,
    dst_height: u32,
    options: &ResampleOptions,
    cancel: Option<&CancelToken>,
    after_batch: &(dyn Fn(usize) + Sync),
) -> Result<RgbaImage> {
    let mut output = RgbaImage::new(dst_width, dst_height);
    let row_len = dst_width as usize * CHANNELS;
    // A batch never spans more than the whole image, so the chunk length
    // cannot overflow for any configured batch size.
    let batch_rows = options.batch_rows.min(dst_height as usize);
    let chunk_len = row_len.saturating_mul(batch_rows);

    let process_batch = |(batch, chunk): (usize, &mut [u8])| -> Result<()> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(RectipageError::Cancelled);
        }
        let first_row = batch * batch_rows;
        for (offset, row) in chunk.chunks_exact_mut(row_len).enumerate() {
            let y = (first_row + offset) as f64;
            for (x, pixel) in row.chunks_exact_mut(CHANNELS).enumerate() {
                pixel.copy_from_slice(&sampler.sample(x as f64, y).0);
            }
        }
        after_batch(batch);
        Ok(())
    };

    let buffer: &mut [u8] = &mut output;
    match options.execution {
        Execution::Parallel => buffer
            .par_chunks_mut(chunk_len)
            .enumerate()
            .try_for_each(process_batch)?,
        Execution::Serial => buffer
            .chunks_mut(chunk_len)
            .enumerate()
            .try_for_each(process_batch)?,
    }
    Ok(output)
}

/// Per-pixel inverse mapping and source lookup.
struct Sampler<'a> {
    source: &'a RgbaImage,
    inverse: Homography,
    sampling: Sampling,
    background: Rgba<u8>,
}

impl Sampler<'_> {
    fn sample(&self, x: f64, y: f64) -> Rgba<u8> {
        let Some(src) = self.inverse.apply(Point2D::new(x, y)) else {
            return self.background;
        };

        // Round half up, so -0.5 still lands on column 0.
        let (ix, iy) = ((src.x + 0.5).floor(), (src.y + 0.5).floor());
        let (w, h) = (self.source.width() as f64, self.source.height() as f64);
        if ix < 0.0 || iy < 0.0 || ix >= w || iy >= h {
            return self.background;
        }

        match self.sampling {
            Sampling::Nearest => *self.source.get_pixel(ix as u32, iy as u32),
            Sampling::Bilinear => self.bilinear(src.x.clamp(0.0, w - 1.0), src.y.clamp(0.0, h - 1.0)),
        }
    }

    /// Blend the 2x2 neighbourhood around `(u, v)`, which must already be
    /// clamped to the image. Integer coordinates reproduce the pixel exactly.
    fn bilinear(&self, u: f64, v: f64) -> Rgba<u8> {
        let (max_x, max_y) = (self.source.width() - 1, self.source.height() - 1);
        let (x0, y0) = (u.floor() as u32, v.floor() as u32);
        let (x1, y1) = ((x0 + 1).min(max_x), (y0 + 1).min(max_y));
        let (fx, fy) = (u - x0 as f64, v - y0 as f64);

        let p00 = self.source.get_pixel(x0, y0).0;
        let p10 = self.source.get_pixel(x1, y0).0;
        let p01 = self.source.get_pixel(x0, y1).0;
        let p11 = self.source.get_pixel(x1, y1).0;

        let mut out = [0u8; CHANNELS];
        for (k, channel) in out.iter_mut().enumerate() {
            let top = p00[k] as f64 * (1.0 - fx) + p10[k] as f64 * fx;
            let bottom = p01[k] as f64 * (1.0 - fx) + p11[k] as f64 * fx;
            *channel = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
        }
        Rgba(out)
    }
}
