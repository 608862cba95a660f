// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Box blur via per-channel summed-area tables.
//
// Each output pixel is the truncated integer mean of the input pixels inside
// a (2r+1)x(2r+1) window clipped to the image. The integral image makes each
// window sum O(1), and output rows are filled in parallel.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::raster::PixelBuffer;

/// Summed-area table over the three RGB channels, with a zero row and column
/// prepended so window lookups need no edge cases.
struct IntegralImage {
    stride: usize,
    table: Vec<[u64; 3]>,
}

impl IntegralImage {
    fn build(buffer: &PixelBuffer) -> Self {
        let (w, h) = buffer.dimensions();
        let stride = w as usize + 1;
        let mut table = vec![[0u64; 3]; stride * (h as usize + 1)];
        let raw = buffer.as_raw();

        for y in 0..h as usize {
            let mut row_sum = [0u64; 3];
            for x in 0..w as usize {
                let src = (y * w as usize + x) * 3;
                let idx = (y + 1) * stride + (x + 1);
                let above = y * stride + (x + 1);
                for ch in 0..3 {
                    row_sum[ch] += u64::from(raw[src + ch]);
                    table[idx][ch] = row_sum[ch] + table[above][ch];
                }
            }
        }

        Self { stride, table }
    }

    /// Channel sums over the half-open window `[x1, x2) x [y1, y2)`.
    fn window_sum(&self, x1: usize, y1: usize, x2: usize, y2: usize) -> [u64; 3] {
        let s = self.stride;
        let mut sum = [0u64; 3];
        for (ch, out) in sum.iter_mut().enumerate() {
            *out = self.table[y2 * s + x2][ch] + self.table[y1 * s + x1][ch]
                - self.table[y1 * s + x2][ch]
                - self.table[y2 * s + x1][ch];
        }
        sum
    }
}

/// Blur `buffer` with a square box of side `2 * radius + 1`.
///
/// Edge pixels average only the samples that fall inside the image.
/// `radius == 0` returns an identical copy.
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn box_blur(buffer: &PixelBuffer, radius: u32) -> PixelBuffer {
    let (w, h) = buffer.dimensions();
    if radius == 0 || w == 0 || h == 0 {
        return buffer.clone();
    }

    let integral = IntegralImage::build(buffer);
    let (w, h, r) = (w as usize, h as usize, radius as usize);
    let mut out = image::RgbImage::new(w as u32, h as u32);
    let raw: &mut [u8] = &mut out;

    raw.par_chunks_mut(w * 3).enumerate().for_each(|(y, row)| {
        let y1 = y.saturating_sub(r);
        let y2 = (y + r + 1).min(h);
        for x in 0..w {
            let x1 = x.saturating_sub(r);
            let x2 = (x + r + 1).min(w);
            let area = ((x2 - x1) * (y2 - y1)) as u64;
            let sum = integral.window_sum(x1, y1, x2, y2);
            for ch in 0..3 {
                row[x * 3 + ch] = (sum[ch] / area) as u8;
            }
        }
    });

    debug!(radius, "Box blur complete");
    PixelBuffer::from_rgb(out)
}
