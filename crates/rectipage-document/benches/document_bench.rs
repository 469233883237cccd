// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the rectipage-document crate: homography solving
// and perspective resampling, with imageproc's warp as a reference point.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

use rectipage_core::types::{Point2D, Quadrilateral, Sampling};
use rectipage_document::{Execution, ResampleOptions, rectification_homography, resample_with};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const SRC_SIZE: (u32, u32) = (800, 600);
const DST_SIZE: (u32, u32) = (500, 700);

fn photo() -> RgbaImage {
    RgbaImage::from_fn(SRC_SIZE.0, SRC_SIZE.1, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8, 255])
    })
}

/// A tilted page, as if photographed from the lower left.
fn corners() -> Quadrilateral {
    Quadrilateral::new([
        Point2D::new(180.0, 60.0),
        Point2D::new(90.0, 560.0),
        Point2D::new(720.0, 540.0),
        Point2D::new(610.0, 40.0),
    ])
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_solve(c: &mut Criterion) {
    let quad = corners();
    c.bench_function("solve_homography", |b| {
        b.iter(|| rectification_homography(black_box(&quad), DST_SIZE.0, DST_SIZE.1));
    });
}

fn bench_resample(c: &mut Criterion) {
    let source = photo();
    let h = rectification_homography(&corners(), DST_SIZE.0, DST_SIZE.1)
        .expect("benchmark corners are valid");

    let mut group = c.benchmark_group("resample (800x600 -> 500x700)");
    for (name, sampling, execution) in [
        ("nearest/parallel", Sampling::Nearest, Execution::Parallel),
        ("nearest/serial", Sampling::Nearest, Execution::Serial),
        ("bilinear/parallel", Sampling::Bilinear, Execution::Parallel),
    ] {
        let options = ResampleOptions {
            sampling,
            execution,
            ..ResampleOptions::default()
        };
        group.bench_function(name, |b| {
            b.iter(|| {
                resample_with(black_box(&source), &h, DST_SIZE.0, DST_SIZE.1, &options, None)
            });
        });
    }

    // Same warp through imageproc, for comparison.
    let to_f32 = |q: &Quadrilateral| q.points().map(|p| (p.x as f32, p.y as f32));
    let projection = Projection::from_control_points(
        to_f32(&corners()),
        to_f32(&Quadrilateral::rectangle(DST_SIZE.0, DST_SIZE.1)),
    )
    .expect("benchmark corners are valid");
    group.bench_function("imageproc warp_into (nearest)", |b| {
        b.iter(|| {
            let mut out = RgbaImage::new(DST_SIZE.0, DST_SIZE.1);
            warp_into(
                black_box(&source),
                &projection,
                Interpolation::Nearest,
                Rgba([0, 0, 0, 0]),
                &mut out,
            );
            black_box(out);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_solve, bench_resample);
criterion_main!(benches);
