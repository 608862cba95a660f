// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory RGB raster shared by every editing operation.

use image::{DynamicImage, RgbImage};
use retouch_core::Rgb;
use retouch_core::error::{Result, RetouchError};

/// A dense, row-major RGB8 raster.
///
/// `as_raw().len() == width * height * 3` always holds, and every channel is
/// a `u8`, so values are in `[0, 255]` by construction. Editing operations
/// take a `&PixelBuffer` and return a new one; the input is never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbImage,
}

impl PixelBuffer {
    // -- Construction ---------------------------------------------------------

    /// A black buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::new(width, height),
        }
    }

    /// A buffer where every pixel is `color`.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, image::Rgb(color.channels())),
        }
    }

    /// Wrap raw interleaved RGB samples.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        let actual = data.len();
        let image = RgbImage::from_raw(width, height, data).ok_or_else(|| {
            RetouchError::InvalidParameter(format!(
                "{width}x{height} RGB buffer needs {expected} bytes, got {actual}"
            ))
        })?;
        Ok(Self { image })
    }

    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    /// Convert any decoded image (grayscale, RGBA, 16-bit) to RGB8.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self {
            image: image.to_rgb8(),
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Colour at `(x, y)`. Panics when out of bounds, like `RgbImage::get_pixel`.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let image::Rgb([r, g, b]) = *self.image.get_pixel(x, y);
        Rgb::new(r, g, b)
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn into_rgb(self) -> RgbImage {
        self.image
    }

    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageRgb8(self.image.clone())
    }

    /// True when every pixel equals `color`.
    pub fn is_uniform(&self, color: Rgb) -> bool {
        self.image.pixels().all(|p| p.0 == color.channels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    #[test]
    fn raw_length_must_match_dimensions() {
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 12]).is_ok());
        assert!(matches!(
            PixelBuffer::from_raw(2, 2, vec![0; 11]),
            Err(RetouchError::InvalidParameter(_))
        ));
    }

    #[test]
    fn grayscale_sources_expand_to_rgb() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 2, image::Luma([77])));
        let buffer = PixelBuffer::from_dynamic(&gray);
        assert_eq!(buffer.dimensions(), (3, 2));
        assert_eq!(buffer.as_raw().len(), 3 * 2 * 3);
        assert_eq!(buffer.pixel(2, 1), Rgb::new(77, 77, 77));
    }

    #[test]
    fn filled_is_uniform() {
        let buffer = PixelBuffer::filled(4, 4, Rgb::new(1, 2, 3));
        assert!(buffer.is_uniform(Rgb::new(1, 2, 3)));
        assert!(!buffer.is_uniform(Rgb::BLACK));
    }
}
