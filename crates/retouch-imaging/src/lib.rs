// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// retouch-imaging — Raster editing engine for Retouch.
//
// Provides the in-memory pixel buffer and its codecs, pixel filters
// (brightness, contrast, grayscale, sepia, box blur), text detection through
// a pluggable recognition engine, flat-fill inpainting, text compositing, and
// the edit workflows that tie them together.

pub mod filter;
pub mod inpaint;
pub mod raster;
pub mod text;
pub mod workflow;

// Re-export the primary structs so callers can use `retouch_imaging::PixelBuffer` etc.
pub use filter::FilterPipeline;
pub use inpaint::Inpainter;
pub use raster::PixelBuffer;
pub use text::{
    FontBook, TextCompositor, TextDetector, TextRegions, TextRenderer, UnavailableDetector,
};
pub use workflow::{EditOutcome, EditWorkflow};

#[cfg(feature = "ocr")]
pub use text::{OcrAdapter, OcrConfig};
