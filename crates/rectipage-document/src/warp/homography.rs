// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Homography solver — four point correspondences to a 3x3 projective matrix
// via an 8x8 linear system and Gaussian elimination with partial pivoting.

use rectipage_core::error::{RectipageError, Result};
use rectipage_core::types::{COLLINEAR_TOLERANCE, DETERMINANT_EPSILON, Homography, Quadrilateral};
use tracing::{debug, instrument, warn};

/// Pivot magnitude, relative to the largest entry of its column in the
/// assembled system, below which the system is singular.
pub const PIVOT_EPSILON: f64 = 1e-10;

/// Number of unknowns: `h11, h12, h13, h21, h22, h23, h31, h32`.
const UNKNOWNS: usize = 8;

/// Row-major augmented system `[A | b]`.
type Augmented = [[f64; UNKNOWNS + 1]; UNKNOWNS];

/// Solve the homography mapping each corner of `src` onto the corner of
/// `dst` at the same position.
///
/// Fails with [`RectipageError::DegenerateConfiguration`] when either
/// quadrilateral has three collinear (or two coincident) corners, or when
/// the linear system turns out singular after pivoting.
#[instrument(level = "debug", skip_all)]
pub fn solve_homography(src: &Quadrilateral, dst: &Quadrilateral) -> Result<Homography> {
    for (name, quad) in [("source", src), ("destination", dst)] {
        if !quad.is_finite() {
            return Err(RectipageError::InvalidCorners(format!(
                "{name} corners contain non-finite coordinates"
            )));
        }
        // A collinear source can still produce a solvable system whose
        // solution is a rank-deficient matrix, so this is checked up front.
        if quad.has_collinear_triple(COLLINEAR_TOLERANCE) {
            warn!(quad = name, corners = ?quad.points(), "Rejecting collinear corners");
            return Err(RectipageError::DegenerateConfiguration(format!(
                "three {name} corners are collinear or coincide"
            )));
        }
    }

    let mut system = build_system(src, dst);
    let solution = eliminate(&mut system)?;
    let homography = Homography::from_solution(solution);

    if !homography.is_finite() || homography.determinant().abs() < DETERMINANT_EPSILON {
        return Err(RectipageError::DegenerateConfiguration(
            "solved homography is not invertible".into(),
        ));
    }

    debug!(rows = ?homography.rows(), "Homography solved");
    Ok(homography)
}

/// Homography taking `src` onto the `width` x `height` destination
/// rectangle `(0,0),(0,h),(w,h),(w,0)`.
pub fn rectification_homography(
    src: &Quadrilateral,
    width: u32,
    height: u32,
) -> Result<Homography> {
    if width == 0 || height == 0 {
        return Err(RectipageError::InvalidDimensions { width, height });
    }
    solve_homography(src, &Quadrilateral::rectangle(width, height))
}

/// Two equations per correspondence `(x, y) -> (dx, dy)`:
///
/// ```text
/// h11 x + h12 y + h13 - dx h31 x - dx h32 y = dx
/// h21 x + h22 y + h23 - dy h31 x - dy h32 y = dy
/// ```
fn build_system(src: &Quadrilateral, dst: &Quadrilateral) -> Augmented {
    let mut a = [[0.0; UNKNOWNS + 1]; UNKNOWNS];
    for (i, (s, d)) in src.points().iter().zip(dst.points()).enumerate() {
        let (x, y, dx, dy) = (s.x, s.y, d.x, d.y);
        a[2 * i] = [x, y, 1.0, 0.0, 0.0, 0.0, -dx * x, -dx * y, dx];
        a[2 * i + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -dy * x, -dy * y, dy];
    }
    a
}

/// Forward elimination with partial pivoting, then back-substitution.
fn eliminate(a: &mut Augmented) -> Result<[f64; UNKNOWNS]> {
    // Column scale of the untouched system, so the singularity threshold
    // follows the coordinate units instead of assuming pixel-sized ones.
    let mut col_scale = [0.0_f64; UNKNOWNS];
    for row in a.iter() {
        for (scale, value) in col_scale.iter_mut().zip(row) {
            *scale = scale.max(value.abs());
        }
    }

    for col in 0..UNKNOWNS {
        let (pivot_row, pivot_mag) = (col..UNKNOWNS)
            .map(|row| (row, a[row][col].abs()))
            .fold((col, -1.0), |best, cand| if cand.1 > best.1 { cand } else { best });

        if pivot_mag.is_nan() || pivot_mag <= PIVOT_EPSILON * col_scale[col] {
            return Err(RectipageError::DegenerateConfiguration(format!(
                "singular system at column {col} (pivot {pivot_mag:e})"
            )));
        }
        a.swap(col, pivot_row);

        let pivot = a[col][col];
        for row in (col + 1)..UNKNOWNS {
            let factor = a[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for c in col..=UNKNOWNS {
                a[row][c] -= factor * a[col][c];
            }
        }
    }

    let mut h = [0.0; UNKNOWNS];
    for row in (0..UNKNOWNS).rev() {
        let mut sum = a[row][UNKNOWNS];
        for c in (row + 1)..UNKNOWNS {
            sum -= a[row][c] * h[c];
        }
        h[row] = sum / a[row][row];
    }
    Ok(h)
}
