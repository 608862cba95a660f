// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filter pipeline. Dispatches a FilterSpec to the matching pixel transform.
// Every transform reads the input buffer and writes a fresh one of the same
// size.

use image::ImageBuffer;
use retouch_core::error::Result;
use retouch_core::{DEFAULT_MAX_BLUR_RADIUS, EditorConfig, FilterSpec};
use tracing::{info, instrument};

use super::blur::box_blur;
use crate::raster::PixelBuffer;

/// Applies [`FilterSpec`]s to pixel buffers.
#[derive(Debug, Clone)]
pub struct FilterPipeline {
    max_blur_radius: u32,
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self {
            max_blur_radius: DEFAULT_MAX_BLUR_RADIUS,
        }
    }
}

impl FilterPipeline {
    pub fn new(max_blur_radius: u32) -> Self {
        Self { max_blur_radius }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.max_blur_radius)
    }

    /// Apply one filter, returning a new buffer with the same dimensions.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when the filter's parameter is out of range.
    #[instrument(skip(self, buffer), fields(width = buffer.width(), height = buffer.height()))]
    pub fn apply(&self, buffer: &PixelBuffer, spec: &FilterSpec) -> Result<PixelBuffer> {
        spec.validate(self.max_blur_radius)?;
        info!(filter = spec.name(), "Applying filter");

        let output = match *spec {
            FilterSpec::Brightness { factor } => scale_channels(buffer, factor),
            // Observed behaviour: identical to brightness, not mean-centred.
            FilterSpec::Contrast { factor } => scale_channels(buffer, factor),
            FilterSpec::Grayscale => grayscale(buffer),
            FilterSpec::Sepia => sepia(buffer),
            FilterSpec::Blur { radius } => box_blur(buffer, radius),
        };
        Ok(output)
    }
}

/// Build a new buffer by mapping each RGB triple independently.
fn map_pixels(buffer: &PixelBuffer, f: impl Fn([u8; 3]) -> [u8; 3]) -> PixelBuffer {
    let src = buffer.as_rgb();
    let mapped = ImageBuffer::from_fn(src.width(), src.height(), |x, y| {
        image::Rgb(f(src.get_pixel(x, y).0))
    });
    PixelBuffer::from_rgb(mapped)
}

/// `c' = clamp(c * factor, 0, 255)`, truncated.
pub fn scale_channels(buffer: &PixelBuffer, factor: f32) -> PixelBuffer {
    let scale = |c: u8| -> u8 { (f32::from(c) * factor).clamp(0.0, 255.0) as u8 };
    map_pixels(buffer, |[r, g, b]| [scale(r), scale(g), scale(b)])
}

/// Luma `0.299r + 0.587g + 0.114b`, truncated, written to all three channels.
///
/// Integer weights keep the truncation exact, so gray input maps to itself.
pub fn grayscale(buffer: &PixelBuffer) -> PixelBuffer {
    map_pixels(buffer, |[r, g, b]| {
        let luma = luma(r, g, b);
        [luma, luma, luma]
    })
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)) / 1000) as u8
}

/// Classic sepia matrix, each channel capped at 255.
pub fn sepia(buffer: &PixelBuffer) -> PixelBuffer {
    map_pixels(buffer, |[r, g, b]| {
        let (r, g, b) = (u32::from(r), u32::from(g), u32::from(b));
        let tone = |kr: u32, kg: u32, kb: u32| -> u8 {
            ((kr * r + kg * g + kb * b) / 1000).min(255) as u8
        };
        [tone(393, 769, 189), tone(349, 686, 168), tone(272, 534, 131)]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use retouch_core::{RetouchError, Rgb};

    fn gradient(w: u32, h: u32) -> PixelBuffer {
        let mut img = image::RgbImage::new(w, h);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = image::Rgb([
                (x * 255 / w.max(1)) as u8,
                (y * 255 / h.max(1)) as u8,
                ((x + y) * 7 % 256) as u8,
            ]);
        }
        PixelBuffer::from_rgb(img)
    }

    fn all_specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::Brightness { factor: 3.5 },
            FilterSpec::Brightness { factor: 0.0 },
            FilterSpec::Contrast { factor: 0.4 },
            FilterSpec::Grayscale,
            FilterSpec::Sepia,
            FilterSpec::Blur { radius: 2 },
        ]
    }

    #[test]
    fn identities() {
        let pipeline = FilterPipeline::default();
        let src = gradient(17, 11);
        let bright = pipeline
            .apply(&src, &FilterSpec::Brightness { factor: 1.0 })
            .unwrap();
        assert_eq!(bright, src);
        let blurred = pipeline.apply(&src, &FilterSpec::Blur { radius: 0 }).unwrap();
        assert_eq!(blurred, src);
    }

    #[test]
    fn every_filter_preserves_dimensions_and_input() {
        let pipeline = FilterPipeline::default();
        let src = gradient(9, 6);
        let before = src.clone();
        for spec in all_specs() {
            let out = pipeline.apply(&src, &spec).unwrap();
            assert_eq!(out.dimensions(), src.dimensions(), "{spec:?}");
            assert_eq!(out.as_raw().len(), 9 * 6 * 3);
        }
        assert_eq!(src, before);
    }

    #[test]
    fn grayscale_is_idempotent() {
        let pipeline = FilterPipeline::default();
        let once = pipeline.apply(&gradient(32, 32), &FilterSpec::Grayscale).unwrap();
        let twice = pipeline.apply(&once, &FilterSpec::Grayscale).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn grayscale_of_every_gray_level_is_itself() {
        for v in 0..=255u8 {
            assert_eq!(luma(v, v, v), v);
        }
    }

    #[test]
    fn grayscale_weights() {
        let src = PixelBuffer::filled(1, 1, Rgb::new(255, 0, 0));
        // 0.299 * 255 = 76.245
        assert_eq!(grayscale(&src).pixel(0, 0), Rgb::new(76, 76, 76));
    }

    #[test]
    fn sepia_on_black_and_white() {
        let black = sepia(&PixelBuffer::filled(2, 2, Rgb::BLACK));
        assert!(black.is_uniform(Rgb::BLACK));

        let white = sepia(&PixelBuffer::filled(2, 2, Rgb::WHITE));
        // r and g overflow and clamp; b = 0.937 * 255 = 238.9
        assert!(white.is_uniform(Rgb::new(255, 255, 238)));
    }

    #[test]
    fn brightness_clamps_high_values() {
        let src = PixelBuffer::filled(1, 1, Rgb::new(100, 200, 10));
        let out = scale_channels(&src, 2.0);
        assert_eq!(out.pixel(0, 0), Rgb::new(200, 255, 20));
    }

    #[test]
    fn brightness_on_black_stays_black() {
        let pipeline = FilterPipeline::default();
        let src = PixelBuffer::new(100, 100);
        let out = pipeline
            .apply(&src, &FilterSpec::Brightness { factor: 2.0 })
            .unwrap();
        assert!(out.is_uniform(Rgb::BLACK));
    }

    #[test]
    fn contrast_matches_brightness() {
        let pipeline = FilterPipeline::default();
        let src = gradient(20, 20);
        let a = pipeline.apply(&src, &FilterSpec::Contrast { factor: 1.7 }).unwrap();
        let b = pipeline.apply(&src, &FilterSpec::Brightness { factor: 1.7 }).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn blur_on_uniform_gray() {
        let pipeline = FilterPipeline::default();
        let src = PixelBuffer::filled(10, 10, Rgb::new(128, 128, 128));
        let out = pipeline.apply(&src, &FilterSpec::Blur { radius: 1 }).unwrap();
        assert!(out.is_uniform(Rgb::new(128, 128, 128)));
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        let pipeline = FilterPipeline::new(5);
        let src = gradient(4, 4);
        assert!(matches!(
            pipeline.apply(&src, &FilterSpec::Blur { radius: 6 }),
            Err(RetouchError::InvalidParameter(_))
        ));
        assert!(matches!(
            pipeline.apply(&src, &FilterSpec::Brightness { factor: -0.5 }),
            Err(RetouchError::InvalidParameter(_))
        ));
        assert!(matches!(
            pipeline.apply(&src, &FilterSpec::Contrast { factor: f32::INFINITY }),
            Err(RetouchError::InvalidParameter(_))
        ));
    }
}
