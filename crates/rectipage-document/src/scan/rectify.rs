// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document rectifier — decode a photographed page, straighten it from four
// user-chosen corners, optionally crop, and encode the result.

use image::{DynamicImage, ImageFormat, RgbaImage};
use rectipage_core::error::{RectipageError, Result};
use rectipage_core::types::{CropRect, Homography, Quadrilateral};
use tracing::{debug, info, instrument, warn};

use crate::warp::cancel::CancelToken;
use crate::warp::homography::rectification_homography;
use crate::warp::resample::{ResampleOptions, resample_with};

/// Rectification pipeline operating on a single in-memory page.
///
/// Each step consumes `self` and returns a new `DocumentRectifier` wrapping
/// the transformed page, enabling method chaining:
///
/// ```ignore
/// let png = DocumentRectifier::open("photo.jpg")?
///     .rectify(&corners, Some((850, 1100)))?
///     .crop(CropRect::new(10, 10, 830, 1080))?
///     .to_png_bytes()?;
/// ```
pub struct DocumentRectifier {
    /// The working page, always RGBA8.
    image: RgbaImage,
    options: ResampleOptions,
    cancel: Option<CancelToken>,
    /// Homography used by the most recent `rectify` call.
    last_homography: Option<Homography>,
}

impl DocumentRectifier {
    // -- Construction ---------------------------------------------------------

    /// Create a rectifier from raw image bytes (JPEG, PNG, TIFF, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data).map_err(|err| {
            RectipageError::ImageError(format!("failed to decode page image: {}", err))
        })?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Page decoded from bytes"
        );
        Ok(Self::from_dynamic(image))
    }

    /// Create a rectifier from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let image = image::open(path.as_ref()).map_err(|err| {
            RectipageError::ImageError(format!(
                "failed to open page image {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(
            width = image.width(),
            height = image.height(),
            "Page loaded"
        );
        Ok(Self::from_dynamic(image))
    }

    /// Wrap an already-decoded image, converting it to RGBA8.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::from_rgba(image.into_rgba8())
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        Self {
            image,
            options: ResampleOptions::default(),
            cancel: None,
            last_homography: None,
        }
    }

    pub fn with_options(mut self, options: ResampleOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach a token polled between row batches of every later warp.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.image
    }

    pub fn last_homography(&self) -> Option<&Homography> {
        self.last_homography.as_ref()
    }

    // -- Operations -----------------------------------------------------------

    /// Straighten the page so that `corners` (top-left, bottom-left,
    /// bottom-right, top-right) become the corners of the output.
    ///
    /// `size` is the output `(width, height)`; `None` keeps the current page
    /// size. The rectifier is consumed, so on error the page is dropped
    /// along with it and only the error is returned.
    #[instrument(skip(self), fields(src_w = self.image.width(), src_h = self.image.height()))]
    pub fn rectify(self, corners: &Quadrilateral, size: Option<(u32, u32)>) -> Result<Self> {
        let (width, height) = size.unwrap_or(self.image.dimensions());
        info!(width, height, "Rectifying page");

        let homography = rectification_homography(corners, width, height).inspect_err(|err| {
            warn!(error = %err, corners = ?corners.points(), "Rectification rejected");
        })?;

        let warped = resample_with(
            &self.image,
            &homography,
            width,
            height,
            &self.options,
            self.cancel.as_ref(),
        )?;

        info!(width, height, "Rectification complete");
        Ok(Self {
            image: warped,
            last_homography: Some(homography),
            ..self
        })
    }

    /// Crop a rectangular region. The rectangle is clamped to the page; a
    /// rectangle that does not overlap the page is an error.
    #[instrument(skip(self))]
    pub fn crop(self, rect: CropRect) -> Result<Self> {
        let (img_w, img_h) = self.image.dimensions();
        let safe_w = rect.width.min(img_w.saturating_sub(rect.x));
        let safe_h = rect.height.min(img_h.saturating_sub(rect.y));
        if safe_w == 0 || safe_h == 0 {
            return Err(RectipageError::InvalidDimensions {
                width: safe_w,
                height: safe_h,
            });
        }

        info!(x = rect.x, y = rect.y, safe_w, safe_h, "Cropping page");
        let cropped = image::imageops::crop_imm(&self.image, rect.x, rect.y, safe_w, safe_h).to_image();
        Ok(Self {
            image: cropped,
            ..self
        })
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current page as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| RectipageError::ImageError(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Write the page to a file. The format is inferred from the file
    /// extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.image.save(path.as_ref()).map_err(|err| {
            RectipageError::ImageError(format!(
                "failed to save page to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use rectipage_core::types::{Point2D, Sampling};

    fn page(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 128, 255]))
    }

    #[test]
    fn rectify_defaults_to_source_size() {
        let rectifier = DocumentRectifier::from_rgba(page(240, 220))
            .rectify(&Quadrilateral::default(), None)
            .unwrap();
        assert_eq!((rectifier.width(), rectifier.height()), (240, 220));
        assert!(rectifier.last_homography().is_some());
    }

    #[test]
    fn rectify_explicit_size() {
        let rectifier = DocumentRectifier::from_rgba(page(256, 256))
            .rectify(&Quadrilateral::default(), Some((200, 200)))
            .unwrap();
        assert_eq!(rectifier.as_rgba().dimensions(), (200, 200));
        assert_eq!(rectifier.as_rgba().get_pixel(0, 0).0, [20, 20, 128, 255]);
    }

    #[test]
    fn rectify_rejects_degenerate_corners() {
        let corners = Quadrilateral::new([
            Point2D::new(10.0, 10.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(50.0, 50.0),
            Point2D::new(90.0, 10.0),
        ]);
        let result = DocumentRectifier::from_rgba(page(100, 100)).rectify(&corners, None);
        assert!(matches!(
            result,
            Err(RectipageError::DegenerateConfiguration(_))
        ));
    }

    #[test]
    fn rectify_rejects_zero_size() {
        let result = DocumentRectifier::from_rgba(page(100, 100))
            .rectify(&Quadrilateral::default(), Some((0, 100)));
        assert!(matches!(
            result,
            Err(RectipageError::InvalidDimensions { width: 0, .. })
        ));
    }

    #[test]
    fn cancelled_rectification_errors() {
        let token = CancelToken::new();
        token.cancel();
        let result = DocumentRectifier::from_rgba(page(100, 100))
            .with_cancel_token(token)
            .rectify(&Quadrilateral::rectangle(100, 100), None);
        assert!(matches!(result, Err(RectipageError::Cancelled)));
    }

    #[test]
    fn bilinear_options_apply() {
        let options = ResampleOptions {
            sampling: Sampling::Bilinear,
            ..ResampleOptions::default()
        };
        let source = page(64, 64);
        let rectifier = DocumentRectifier::from_rgba(source.clone())
            .with_options(options)
            .rectify(&Quadrilateral::rectangle(64, 64), None)
            .unwrap();
        assert_eq!(rectifier.as_rgba(), &source);
    }

    #[test]
    fn crop_clamps_to_page() {
        let rectifier = DocumentRectifier::from_rgba(page(50, 40))
            .crop(CropRect::new(30, 20, 100, 100))
            .unwrap();
        assert_eq!(rectifier.as_rgba().dimensions(), (20, 20));
        assert_eq!(rectifier.as_rgba().get_pixel(0, 0).0, [30, 20, 128, 255]);
    }

    #[test]
    fn crop_outside_page_errors() {
        let result = DocumentRectifier::from_rgba(page(50, 40)).crop(CropRect::new(60, 0, 10, 10));
        assert!(matches!(
            result,
            Err(RectipageError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn png_round_trip_preserves_pixels() {
        let source = page(16, 12);
        let bytes = DocumentRectifier::from_rgba(source.clone())
            .to_png_bytes()
            .unwrap();
        let decoded = DocumentRectifier::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.as_rgba(), &source);
    }

    #[test]
    fn save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        let source = page(10, 10);
        DocumentRectifier::from_rgba(source.clone()).save(&path).unwrap();
        assert_eq!(DocumentRectifier::open(&path).unwrap().as_rgba(), &source);
    }

    #[test]
    fn garbage_bytes_are_image_error() {
        let result = DocumentRectifier::from_bytes(b"not an image");
        assert!(matches!(result, Err(RectipageError::ImageError(_))));
    }
}
