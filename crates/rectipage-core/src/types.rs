// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core geometry types: points, corner quadrilaterals, the 3x3 homography,
// crop rectangles, and the sampling policy.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RectipageError, Result};

/// Relative tolerance for the collinearity test on quadrilateral corners.
///
/// Scaled by the squared extent of the quadrilateral so that the check is
/// independent of image resolution.
pub const COLLINEAR_TOLERANCE: f64 = 1e-9;

/// Below this magnitude a homography determinant is treated as zero.
pub const DETERMINANT_EPSILON: f64 = 1e-12;

/// Below this magnitude the projective denominator `h31 x + h32 y + h33`
/// is treated as zero (the point maps to infinity).
pub const PROJECTIVE_EPSILON: f64 = 1e-12;

/// A point in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Four corners in the fixed winding order top-left, bottom-left,
/// bottom-right, top-right.
///
/// Correspondence between two quadrilaterals is positional: corner `i` of the
/// source maps to corner `i` of the destination. No sorting or geometric
/// matching is ever performed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    corners: [Point2D; 4],
}

impl Quadrilateral {
    pub const fn new(corners: [Point2D; 4]) -> Self {
        Self { corners }
    }

    /// The axis-aligned destination rectangle `(0,0),(0,h),(w,h),(w,0)`.
    pub fn rectangle(width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        Self::new([
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, h),
            Point2D::new(w, h),
            Point2D::new(w, 0.0),
        ])
    }

    /// Build from eight numbers `x0, y0, x1, y1, x2, y2, x3, y3`.
    pub fn from_flat(values: &[f64]) -> Result<Self> {
        if values.len() != 8 {
            return Err(RectipageError::InvalidCorners(format!(
                "expected 8 coordinates (4 points), got {}",
                values.len()
            )));
        }
        let mut corners = [Point2D::default(); 4];
        for (corner, pair) in corners.iter_mut().zip(values.chunks_exact(2)) {
            *corner = Point2D::new(pair[0], pair[1]);
        }
        Ok(Self::new(corners))
    }

    pub fn points(&self) -> &[Point2D; 4] {
        &self.corners
    }

    pub fn top_left(&self) -> Point2D {
        self.corners[0]
    }

    pub fn bottom_left(&self) -> Point2D {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point2D {
        self.corners[2]
    }

    pub fn top_right(&self) -> Point2D {
        self.corners[3]
    }

    pub fn is_finite(&self) -> bool {
        self.corners.iter().all(Point2D::is_finite)
    }

    /// Larger side of the axis-aligned bounding box.
    pub fn extent(&self) -> f64 {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.corners {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        (max_x - min_x).max(max_y - min_y)
    }

    /// Whether any three of the four corners are collinear. Coincident
    /// corners count as collinear.
    ///
    /// `tolerance` is relative to the squared extent of the quadrilateral.
    pub fn has_collinear_triple(&self, tolerance: f64) -> bool {
        let extent = self.extent();
        if extent <= 0.0 {
            return true;
        }
        let threshold = tolerance * extent * extent;
        const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
        TRIPLES.iter().any(|&[a, b, c]| {
            let (pa, pb, pc) = (self.corners[a], self.corners[b], self.corners[c]);
            let cross = (pb.x - pa.x) * (pc.y - pa.y) - (pb.y - pa.y) * (pc.x - pa.x);
            cross.abs() <= threshold
        })
    }
}

impl Default for Quadrilateral {
    /// Initial corner handles placed by the interactive editor.
    fn default() -> Self {
        Self::new([
            Point2D::new(20.0, 20.0),
            Point2D::new(20.0, 200.0),
            Point2D::new(200.0, 200.0),
            Point2D::new(200.0, 20.0),
        ])
    }
}

impl FromStr for Quadrilateral {
    type Err = RectipageError;

    /// Parse `x0,y0,x1,y1,x2,y2,x3,y3`.
    fn from_str(s: &str) -> Result<Self> {
        let values = parse_numbers(s)?;
        Self::from_flat(&values)
    }
}

/// A planar projective transform as a 3x3 matrix acting on homogeneous
/// coordinates:
///
/// ```text
/// x' = (h11 x + h12 y + h13) / (h31 x + h32 y + h33)
/// y' = (h21 x + h22 y + h23) / (h31 x + h32 y + h33)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    m: [[f64; 3]; 3],
}

impl Homography {
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Build from the eight solved coefficients
    /// `h11, h12, h13, h21, h22, h23, h31, h32`.
    ///
    /// `h33` is not part of the solution; it is fixed to 1.
    pub const fn from_solution(h: [f64; 8]) -> Self {
        Self {
            m: [[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]],
        }
    }

    pub const fn from_rows(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    pub fn rows(&self) -> &[[f64; 3]; 3] {
        &self.m
    }

    pub fn h11(&self) -> f64 {
        self.m[0][0]
    }
    pub fn h12(&self) -> f64 {
        self.m[0][1]
    }
    pub fn h13(&self) -> f64 {
        self.m[0][2]
    }
    pub fn h21(&self) -> f64 {
        self.m[1][0]
    }
    pub fn h22(&self) -> f64 {
        self.m[1][1]
    }
    pub fn h23(&self) -> f64 {
        self.m[1][2]
    }
    pub fn h31(&self) -> f64 {
        self.m[2][0]
    }
    pub fn h32(&self) -> f64 {
        self.m[2][1]
    }
    pub fn h33(&self) -> f64 {
        self.m[2][2]
    }

    pub fn is_finite(&self) -> bool {
        self.m.iter().flatten().all(|v| v.is_finite())
    }

    /// Map a point, returning `None` when it lands at infinity.
    pub fn apply(&self, p: Point2D) -> Option<Point2D> {
        let m = &self.m;
        let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
        if !w.is_finite() || w.abs() < PROJECTIVE_EPSILON {
            return None;
        }
        let x = (m[0][0] * p.x + m[0][1] * p.y + m[0][2]) / w;
        let y = (m[1][0] * p.x + m[1][1] * p.y + m[1][2]) / w;
        let mapped = Point2D::new(x, y);
        mapped.is_finite().then_some(mapped)
    }

    #[rustfmt::skip]
    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1]) -
        m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0]) +
        m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// The inverse transform (adjugate over determinant).
    ///
    /// The result is a general 3x3 matrix; its bottom-right entry is not
    /// renormalised to 1.
    pub fn inverse(&self) -> Result<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < DETERMINANT_EPSILON {
            return Err(RectipageError::DegenerateConfiguration(format!(
                "homography is not invertible (determinant {det:e})"
            )));
        }

        let m = &self.m;
        let inv_det = 1.0 / det;
        let adj = [
            [
                m[1][1] * m[2][2] - m[1][2] * m[2][1],
                m[0][2] * m[2][1] - m[0][1] * m[2][2],
                m[0][1] * m[1][2] - m[0][2] * m[1][1],
            ],
            [
                m[1][2] * m[2][0] - m[1][0] * m[2][2],
                m[0][0] * m[2][2] - m[0][2] * m[2][0],
                m[0][2] * m[1][0] - m[0][0] * m[1][2],
            ],
            [
                m[1][0] * m[2][1] - m[1][1] * m[2][0],
                m[0][1] * m[2][0] - m[0][0] * m[2][1],
                m[0][0] * m[1][1] - m[0][1] * m[1][0],
            ],
        ];

        Ok(Self {
            m: adj.map(|row| row.map(|v| v * inv_det)),
        })
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned crop region in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalise a drag gesture between two points into a rectangle.
    ///
    /// The drag may go in any direction; negative coordinates are clamped
    /// to the image origin.
    pub fn from_drag(start: Point2D, end: Point2D) -> Self {
        let left = start.x.min(end.x).max(0.0);
        let top = start.y.min(end.y).max(0.0);
        let right = start.x.max(end.x).max(0.0);
        let bottom = start.y.max(end.y).max(0.0);
        Self {
            x: left.round() as u32,
            y: top.round() as u32,
            width: (right - left).round() as u32,
            height: (bottom - top).round() as u32,
        }
    }
}

impl FromStr for CropRect {
    type Err = RectipageError;

    /// Parse `x,y,width,height`.
    fn from_str(s: &str) -> Result<Self> {
        let values = parse_numbers(s)?;
        match values.as_slice() {
            &[x, y, w, h] if [x, y, w, h].iter().all(|v| *v >= 0.0) => {
                Ok(Self::new(x as u32, y as u32, w as u32, h as u32))
            }
            _ => Err(RectipageError::InvalidConfig(format!(
                "crop must be four non-negative numbers x,y,width,height, got `{s}`"
            ))),
        }
    }
}

/// How a fractional source coordinate is turned into a pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sampling {
    /// Copy the closest source pixel verbatim.
    #[default]
    Nearest,
    /// Blend the 2x2 neighbourhood. Exact at integer coordinates.
    Bilinear,
}

impl FromStr for Sampling {
    type Err = RectipageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "bilinear" => Ok(Self::Bilinear),
            other => Err(RectipageError::InvalidConfig(format!(
                "unknown sampling `{other}` (expected `nearest` or `bilinear`)"
            ))),
        }
    }
}

fn parse_numbers(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(|part| {
            part.trim().parse::<f64>().map_err(|err| {
                RectipageError::InvalidCorners(format!("`{}` is not a number: {}", part.trim(), err))
            })
        })
        .collect()
}
