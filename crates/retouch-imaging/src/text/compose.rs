// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text compositing: draws a single line of text onto a copy of an image.
//
// Glyphs are rendered into a coverage mask first, so a missing bold or
// italic face can be synthesized on the mask before it is blended with the
// requested colour.

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{GrayImage, Luma, RgbImage};
use imageproc::drawing::draw_text_mut;
use imageproc::geometric_transformations::{Interpolation, Projection, warp};
use retouch_core::config::FontSettings;
use retouch_core::error::Result;
use retouch_core::{DEFAULT_MAX_FONT_SIZE, EditorConfig, TextStyle};
use tracing::{debug, instrument};

use super::fonts::FontBook;
use crate::raster::PixelBuffer;

/// Horizontal shear of a synthesized oblique, roughly 11 degrees.
const OBLIQUE_SHEAR: f32 = 0.2;

/// Something that can render text onto an image.
pub trait TextRenderer {
    /// Return a copy of `image` with `text` drawn so its baseline starts at
    /// `(x, y)`.
    ///
    /// No wrapping is done and nothing is clipped except by the image edges.
    fn draw(&self, image: &PixelBuffer, text: &str, x: i32, y: i32, style: &TextStyle)
    -> Result<PixelBuffer>;
}

/// [`TextRenderer`] backed by discovered system fonts.
#[derive(Debug)]
pub struct TextCompositor {
    fonts: FontBook,
    max_size: u32,
}

impl TextCompositor {
    pub fn new(fonts: FontBook) -> Self {
        Self {
            fonts,
            max_size: DEFAULT_MAX_FONT_SIZE,
        }
    }

    pub fn from_settings(settings: &FontSettings) -> Self {
        Self::new(FontBook::discover(settings))
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::from_settings(&config.fonts).with_max_size(config.max_font_size)
    }

    /// Reject point sizes above `max_size`.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }
}

impl TextRenderer for TextCompositor {
    #[instrument(skip(self, image, style), fields(
        width = image.width(),
        height = image.height(),
        family = %style.family,
        size = style.size,
    ))]
    fn draw(
        &self,
        image: &PixelBuffer,
        text: &str,
        x: i32,
        y: i32,
        style: &TextStyle,
    ) -> Result<PixelBuffer> {
        style.validate(self.max_size)?;
        if text.is_empty() {
            return Ok(image.clone());
        }

        let resolved = self.fonts.resolve(&style.family, style.style)?;
        let font = resolved.font.as_ref();
        let scale = point_size_scale(font, style.size);
        let top = y - font.as_scaled(scale).ascent().round() as i32;
        let overstrike = style.style.is_bold() && !resolved.style.is_bold();
        let oblique = style.style.is_italic() && !resolved.style.is_italic();

        let (width, height) = image.dimensions();
        let mut coverage = GrayImage::new(width, height);
        draw_text_mut(&mut coverage, Luma([255]), x, top, scale, font, text);
        if overstrike {
            draw_text_mut(&mut coverage, Luma([255]), x + 1, top, scale, font, text);
        }
        if oblique {
            coverage = shear_about_baseline(&coverage, y);
        }
        let canvas = blend_coverage(image.as_rgb(), &coverage, style.color.channels());

        debug!(
            face = %resolved.family,
            px = scale.y,
            synthetic_bold = overstrike,
            synthetic_italic = oblique,
            "Text composited"
        );
        Ok(PixelBuffer::from_rgb(canvas))
    }
}

/// Pixel scale for a point size at 72 dpi, where one point is one pixel per
/// em. `PxScale` measures the full ascent-to-descent height, so the em size
/// is stretched by that ratio.
pub fn point_size_scale(font: &FontVec, size: u32) -> PxScale {
    let em = size as f32;
    let ratio = font
        .units_per_em()
        .filter(|upem| *upem > 0.0)
        .map_or(1.0, |upem| font.height_unscaled() / upem);
    PxScale::from(em * ratio)
}

/// Lean the mask to the right, keeping the row at `baseline` in place.
fn shear_about_baseline(coverage: &GrayImage, baseline: i32) -> GrayImage {
    #[rustfmt::skip]
    let matrix = [
        1.0, -OBLIQUE_SHEAR, OBLIQUE_SHEAR * baseline as f32,
        0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,
    ];
    match Projection::from_matrix(matrix) {
        Some(projection) => warp(coverage, &projection, Interpolation::Bilinear, Luma([0])),
        None => coverage.clone(),
    }
}

/// Mix `color` into `base` weighted by the mask value at each pixel.
fn blend_coverage(base: &RgbImage, coverage: &GrayImage, color: [u8; 3]) -> RgbImage {
    let mut out = base.clone();
    for (px, mask) in out.pixels_mut().zip(coverage.pixels()) {
        let alpha = u16::from(mask.0[0]);
        if alpha == 0 {
            continue;
        }
        for (channel, target) in px.0.iter_mut().zip(color) {
            let mixed = u16::from(*channel) * (255 - alpha) + u16::from(target) * alpha;
            *channel = ((mixed + 127) / 255) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::fonts::TEST_FONT;
    use retouch_core::error::RetouchError;
    use retouch_core::{FontStyle, Rgb};

    fn test_book() -> FontBook {
        let mut book = FontBook::empty("DejaVu Sans");
        book.register("DejaVu Sans", FontStyle::Plain, TEST_FONT.to_vec())
            .unwrap();
        book
    }

    fn inked(buffer: &PixelBuffer) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        for (x, y, px) in buffer.as_rgb().enumerate_pixels() {
            if px.0 != [255, 255, 255] {
                out.push((x, y));
            }
        }
        out
    }

    /// Leftmost dark pixel of the first and last dark rows.
    fn stem_edges(buffer: &PixelBuffer) -> (u32, u32) {
        let dark: Vec<(u32, u32)> = buffer
            .as_rgb()
            .enumerate_pixels()
            .filter(|(_, _, px)| px.0[0] < 100)
            .map(|(x, y, _)| (x, y))
            .collect();
        let top = dark.iter().map(|&(_, y)| y).min().unwrap();
        let bottom = dark.iter().map(|&(_, y)| y).max().unwrap();
        let left_at = |row: u32| {
            dark.iter()
                .filter(|&&(_, y)| y == row)
                .map(|&(x, _)| x)
                .min()
                .unwrap()
        };
        (left_at(top), left_at(bottom))
    }

    #[test]
    fn no_fonts_is_font_unavailable() {
        let compositor = TextCompositor::new(FontBook::empty("DejaVu Sans"));
        let image = PixelBuffer::filled(20, 20, Rgb::WHITE);
        assert!(matches!(
            compositor.draw(&image, "Hi", 2, 15, &TextStyle::default()),
            Err(RetouchError::FontUnavailable(_))
        ));
    }

    #[test]
    fn zero_size_is_rejected() {
        let compositor = TextCompositor::new(FontBook::empty("x"));
        let style = TextStyle {
            size: 0,
            ..TextStyle::default()
        };
        assert!(matches!(
            compositor.draw(&PixelBuffer::new(4, 4), "a", 0, 0, &style),
            Err(RetouchError::InvalidParameter(_))
        ));
    }

    #[test]
    fn oversized_text_is_rejected_before_rendering() {
        let compositor = TextCompositor::new(test_book());
        let image = PixelBuffer::filled(10, 10, Rgb::WHITE);
        let huge = TextStyle {
            size: 200_000,
            ..TextStyle::default()
        };
        assert!(matches!(
            compositor.draw(&image, "W", 0, 9, &huge),
            Err(RetouchError::InvalidParameter(_))
        ));

        let capped = TextCompositor::new(test_book()).with_max_size(30);
        let style = TextStyle {
            size: 31,
            ..TextStyle::default()
        };
        assert!(capped.draw(&image, "W", 0, 9, &style).is_err());
        let style = TextStyle {
            size: 30,
            ..style
        };
        assert!(capped.draw(&image, "W", 0, 9, &style).is_ok());
    }

    #[test]
    fn empty_text_is_a_plain_copy() {
        let compositor = TextCompositor::new(FontBook::empty("x"));
        let image = PixelBuffer::filled(5, 5, Rgb::new(9, 9, 9));
        let out = compositor
            .draw(&image, "", 1, 1, &TextStyle::default())
            .unwrap();
        assert_eq!(out, image);
    }

    #[test]
    fn text_sits_on_the_baseline() {
        let compositor = TextCompositor::new(test_book());
        let image = PixelBuffer::filled(120, 60, Rgb::WHITE);
        let style = TextStyle::new("Unknown Family", 20, Rgb::BLACK, FontStyle::Plain).unwrap();

        let out = compositor.draw(&image, "HIH", 10, 40, &style).unwrap();
        assert_eq!(out.dimensions(), image.dimensions());
        assert!(image.is_uniform(Rgb::WHITE));

        let ink = inked(&out);
        assert!(!ink.is_empty());
        // Capitals have no descenders: ink stays above the baseline and
        // roughly one cap height tall.
        assert!(ink.iter().all(|&(x, y)| x >= 9 && y <= 41), "{ink:?}");
        assert!(ink.iter().any(|&(_, y)| y < 30));
    }

    #[test]
    fn colour_is_applied() {
        let compositor = TextCompositor::new(test_book());
        let image = PixelBuffer::filled(60, 40, Rgb::WHITE);
        let style = TextStyle::new("DejaVu Sans", 24, Rgb::new(255, 0, 0), FontStyle::Plain).unwrap();
        let out = compositor.draw(&image, "I", 10, 30, &style).unwrap();
        assert!(out.as_rgb().pixels().any(|p| p.0 == [255, 0, 0]));
    }

    #[test]
    fn bold_without_bold_face_is_overstruck() {
        let compositor = TextCompositor::new(test_book());
        let image = PixelBuffer::filled(100, 40, Rgb::WHITE);
        let plain = TextStyle::new("DejaVu Sans", 18, Rgb::BLACK, FontStyle::Plain).unwrap();
        let bold = TextStyle {
            style: FontStyle::Bold,
            ..plain.clone()
        };
        let thin = compositor.draw(&image, "lil", 5, 30, &plain).unwrap();
        let thick = compositor.draw(&image, "lil", 5, 30, &bold).unwrap();
        assert!(inked(&thick).len() > inked(&thin).len());
    }

    #[test]
    fn italic_without_italic_face_is_slanted() {
        let compositor = TextCompositor::new(test_book());
        let image = PixelBuffer::filled(80, 60, Rgb::WHITE);
        let plain = TextStyle::new("DejaVu Sans", 40, Rgb::BLACK, FontStyle::Plain).unwrap();
        let italic = TextStyle {
            style: FontStyle::Italic,
            ..plain.clone()
        };

        let upright = compositor.draw(&image, "l", 10, 50, &plain).unwrap();
        let slanted = compositor.draw(&image, "l", 10, 50, &italic).unwrap();
        assert_ne!(upright, slanted);

        let (top, bottom) = stem_edges(&upright);
        assert!(top.abs_diff(bottom) <= 1, "upright stem moved: {top} vs {bottom}");
        let (top, bottom) = stem_edges(&slanted);
        assert!(top >= bottom + 3, "stem does not lean right: {top} vs {bottom}");

        let word = compositor.draw(&image, "Hello", 5, 45, &plain).unwrap();
        let word_italic = compositor.draw(&image, "Hello", 5, 45, &italic).unwrap();
        assert_ne!(word, word_italic);
    }

    #[test]
    fn scale_tracks_point_size() {
        let font = FontVec::try_from_vec(TEST_FONT.to_vec()).unwrap();
        let small = point_size_scale(&font, 10);
        let large = point_size_scale(&font, 20);
        assert!((large.y - 2.0 * small.y).abs() < 1e-3);
        assert!(small.y > 10.0);
    }
}
