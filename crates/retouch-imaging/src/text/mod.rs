// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text handling: detection through a recognition engine, font lookup, and
// compositing new text onto images.

pub mod compose;
pub mod detect;
pub mod fonts;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use compose::{TextCompositor, TextRenderer};
pub use detect::{TextDetector, TextRegions, UnavailableDetector};
pub use fonts::{FontBook, ResolvedFont};

#[cfg(feature = "ocr")]
pub use ocr::{OcrAdapter, OcrConfig};
