// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text removal by flat-fill inpainting.
//
// The background colour is estimated as the mean of a band of pixels around
// the region's box (the box itself excluded, clipped to the image), and the
// whole box is painted with it. No blending at the fill boundary.

use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use retouch_core::{BoundingBox, EditorConfig, Rgb, TextRegion};
use tracing::{debug, instrument};

use crate::raster::PixelBuffer;

pub const DEFAULT_MARGIN: u32 = 10;

/// Fill colour when the band around a box contains no pixels.
const FALLBACK_FILL: Rgb = Rgb::WHITE;

#[derive(Debug, Clone, Copy)]
pub struct Inpainter {
    margin: u32,
}

impl Default for Inpainter {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN)
    }
}

impl Inpainter {
    pub fn new(margin: u32) -> Self {
        Self { margin }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.inpaint_margin)
    }

    pub fn margin(&self) -> u32 {
        self.margin
    }

    /// Paint over `region` with the estimated background colour.
    pub fn remove(&self, image: &PixelBuffer, region: &TextRegion) -> PixelBuffer {
        self.remove_box(image, &region.bbox)
    }

    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn remove_box(&self, image: &PixelBuffer, bbox: &BoundingBox) -> PixelBuffer {
        if bbox.is_empty() {
            return image.clone();
        }

        let fill = self.background_colour(image, bbox);
        let mut canvas = image.as_rgb().clone();
        let rect = Rect::at(bbox.x, bbox.y).of_size(bbox.width, bbox.height);
        draw_filled_rect_mut(&mut canvas, rect, image::Rgb(fill.channels()));

        debug!(fill = %fill.to_hex(), "Region inpainted");
        PixelBuffer::from_rgb(canvas)
    }

    /// Mean colour of the margin band around `bbox`, or white when the band
    /// is empty.
    pub fn background_colour(&self, image: &PixelBuffer, bbox: &BoundingBox) -> Rgb {
        let (w, h) = (i64::from(image.width()), i64::from(image.height()));
        let margin = i64::from(self.margin);
        let x0 = (i64::from(bbox.x) - margin).max(0);
        let y0 = (i64::from(bbox.y) - margin).max(0);
        let x1 = (bbox.right() + margin).min(w);
        let y1 = (bbox.bottom() + margin).min(h);

        let mut sum = [0u64; 3];
        let mut count = 0u64;
        for y in y0..y1 {
            for x in x0..x1 {
                if bbox.contains(x, y) {
                    continue;
                }
                let px = image.pixel(x as u32, y as u32);
                sum[0] += u64::from(px.r);
                sum[1] += u64::from(px.g);
                sum[2] += u64::from(px.b);
                count += 1;
            }
        }

        if count == 0 {
            debug!("No background samples around region; using fallback fill");
            return FALLBACK_FILL;
        }
        Rgb::new(
            (sum[0] / count) as u8,
            (sum[1] / count) as u8,
            (sum[2] / count) as u8,
        )
    }
}
