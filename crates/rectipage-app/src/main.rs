// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectipage — Straighten photographed documents.
//
// Entry point. Initialises logging, resolves configuration, and runs a
// single rectification: load, warp from four corners, optionally crop, save.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rectipage_core::error::{RectipageError, Result};
use rectipage_core::human_errors::humanize_error;
use rectipage_core::types::{CropRect, Point2D, Quadrilateral, Sampling};
use rectipage_document::{DocumentRectifier, Execution, ResampleOptions};

/// Straighten a photographed document from its four corners.
#[derive(Parser, Debug)]
#[command(name = "rectipage", version)]
struct Args {
    /// Photo of the document.
    input: PathBuf,

    /// Where to write the straightened page (format from the extension).
    #[arg(short, long)]
    output: PathBuf,

    /// Corners as x0,y0,x1,y1,x2,y2,x3,y3 in the order top-left,
    /// bottom-left, bottom-right, top-right.
    /// Defaults to 20,20,20,200,200,200,200,20.
    #[arg(short, long, allow_hyphen_values = true)]
    corners: Option<Quadrilateral>,

    /// Output width in pixels (defaults to the input width).
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Output height in pixels (defaults to the input height).
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Sampling policy: nearest or bilinear (overrides the config file).
    #[arg(long)]
    sampling: Option<Sampling>,

    /// Run on the calling thread only.
    #[arg(long)]
    serial: bool,

    /// Crop the straightened page to x,y,width,height.
    #[arg(long)]
    crop: Option<CropRect>,

    /// Crop the straightened page to the box spanned by two drag points
    /// x0,y0,x1,y1, in any order.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, conflicts_with = "crop")]
    crop_from: Option<Vec<f64>>,

    /// JSON config file (defaults to the per-user config if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the homography as JSON on stdout.
    #[arg(long)]
    print_matrix: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::info!(input = %args.input.display(), "Rectipage starting");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "rectification failed");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = services::config_dir::resolve_config(args.config.as_deref())?;

    let mut options = ResampleOptions::from(&config);
    if let Some(sampling) = args.sampling {
        options.sampling = sampling;
    }
    if args.serial {
        options.execution = Execution::Serial;
    }

    let corners = args.corners.unwrap_or_default();
    let size = args.width.zip(args.height);

    let mut rectifier = DocumentRectifier::open(&args.input)?
        .with_options(options)
        .rectify(&corners, size)?;

    if args.print_matrix {
        if let Some(homography) = rectifier.last_homography() {
            println!("{}", serde_json::to_string_pretty(homography)?);
        }
    }

    if let Some(rect) = crop_rect(args)? {
        rectifier = rectifier.crop(rect)?;
    }

    rectifier.save(&args.output)?;
    tracing::info!(
        output = %args.output.display(),
        width = rectifier.width(),
        height = rectifier.height(),
        "page written"
    );
    Ok(())
}

fn crop_rect(args: &Args) -> Result<Option<CropRect>> {
    let Some(drag) = &args.crop_from else {
        return Ok(args.crop);
    };
    match drag.as_slice() {
        &[x0, y0, x1, y1] => Ok(Some(CropRect::from_drag(
            Point2D::new(x0, y0),
            Point2D::new(x1, y1),
        ))),
        other => Err(RectipageError::InvalidConfig(format!(
            "--crop-from expects x0,y0,x1,y1, got {} numbers",
            other.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_photo(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("photo.png");
        RgbaImage::from_fn(256, 256, |x, y| Rgba([x as u8, y as u8, 0, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("rectipage").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn rectifies_with_default_corners() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_photo(dir.path());
        let output = dir.path().join("page.png");
        let config = dir.path().join("config.json");
        std::fs::write(&config, "{}").unwrap();

        run(&args(&[
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--width",
            "200",
            "--height",
            "200",
            "--config",
            config.to_str().unwrap(),
        ]))
        .unwrap();

        let page = image::open(&output).unwrap().into_rgba8();
        assert_eq!(page.dimensions(), (200, 200));
        assert_eq!(page.get_pixel(0, 0).0, [20, 20, 0, 255]);
    }

    #[test]
    fn crops_after_rectifying() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_photo(dir.path());
        let output = dir.path().join("page.png");
        let config = dir.path().join("config.json");
        std::fs::write(&config, "{}").unwrap();

        run(&args(&[
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--corners",
            "0,0,0,256,256,256,256,0",
            "--crop",
            "10,20,30,40",
            "--serial",
            "--config",
            config.to_str().unwrap(),
        ]))
        .unwrap();

        let page = image::open(&output).unwrap().into_rgba8();
        assert_eq!(page.dimensions(), (30, 40));
        assert_eq!(page.get_pixel(0, 0).0, [10, 20, 0, 255]);
    }

    #[test]
    fn crops_from_reversed_drag() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_photo(dir.path());
        let output = dir.path().join("page.png");
        let config = dir.path().join("config.json");
        std::fs::write(&config, "{}").unwrap();

        run(&args(&[
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--corners",
            "0,0,0,256,256,256,256,0",
            "--crop-from",
            "40,60,10,20",
            "--config",
            config.to_str().unwrap(),
        ]))
        .unwrap();

        let page = image::open(&output).unwrap().into_rgba8();
        assert_eq!(page.dimensions(), (30, 40));
        assert_eq!(page.get_pixel(0, 0).0, [10, 20, 0, 255]);
    }

    #[test]
    fn crop_from_needs_two_points() {
        let parsed = args(&["in.png", "-o", "out.png", "--crop-from", "1,2,3"]);
        assert!(matches!(
            crop_rect(&parsed),
            Err(RectipageError::InvalidConfig(_))
        ));

        let both = Args::try_parse_from([
            "rectipage", "in.png", "-o", "out.png", "--crop", "0,0,5,5", "--crop-from", "0,0,5,5",
        ]);
        assert!(both.is_err());
    }

    #[test]
    fn degenerate_corners_fail() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_photo(dir.path());
        let output = dir.path().join("page.png");
        let config = dir.path().join("config.json");
        std::fs::write(&config, "{}").unwrap();

        let err = run(&args(&[
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--corners",
            "10,10,10,10,50,50,90,10",
            "--config",
            config.to_str().unwrap(),
        ]))
        .unwrap_err();
        assert!(matches!(err, RectipageError::DegenerateConfiguration(_)));
        assert!(!output.exists());
    }

    #[test]
    fn width_requires_height() {
        let parsed = Args::try_parse_from(["rectipage", "in.png", "-o", "out.png", "--width", "10"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn malformed_corners_rejected_by_parser() {
        let parsed = Args::try_parse_from(["rectipage", "in.png", "-o", "out.png", "-c", "1,2,3"]);
        assert!(parsed.is_err());
    }
}
