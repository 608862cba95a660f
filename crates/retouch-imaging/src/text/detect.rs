// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text detection seam between the editor and a recognition engine.

use retouch_core::TextRegion;
use retouch_core::error::{Result, RetouchError};
use tracing::warn;

use crate::raster::PixelBuffer;

/// The regions found by one detection pass, in engine scan order.
///
/// Scan order is not reading order. The sequence is consumed once; run
/// detection again for a fresh pass.
#[derive(Debug)]
pub struct TextRegions {
    inner: std::vec::IntoIter<TextRegion>,
}

impl TextRegions {
    pub fn empty() -> Self {
        Self::from(Vec::new())
    }
}

impl From<Vec<TextRegion>> for TextRegions {
    fn from(regions: Vec<TextRegion>) -> Self {
        Self {
            inner: regions.into_iter(),
        }
    }
}

impl Iterator for TextRegions {
    type Item = TextRegion;

    fn next(&mut self) -> Option<TextRegion> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for TextRegions {}

/// A text recognition engine that can locate words and read plain text.
///
/// Implementations that wrap a non-reentrant engine must serialize calls
/// internally; callers may share one detector across threads.
pub trait TextDetector {
    /// Locate words in `image`.
    ///
    /// # Errors
    ///
    /// `EngineUnavailable` when the engine cannot run.
    fn detect(&self, image: &PixelBuffer) -> Result<TextRegions>;

    /// Read all text in `image` as one trimmed string.
    ///
    /// # Errors
    ///
    /// `EngineUnavailable` when the engine cannot run, so callers can tell an
    /// empty page from a broken engine.
    fn extract_text(&self, image: &PixelBuffer) -> Result<String>;

    /// Whether the engine is loaded and able to run.
    fn is_available(&self) -> bool;

    /// Like [`detect`](Self::detect), but any failure becomes an empty
    /// sequence. For overlays and status pages that must not break.
    fn detect_lenient(&self, image: &PixelBuffer) -> TextRegions {
        match self.detect(image) {
            Ok(regions) => regions,
            Err(err) => {
                warn!(error = %err, "Text detection failed; returning no regions");
                TextRegions::empty()
            }
        }
    }
}

impl<T: TextDetector + ?Sized> TextDetector for Box<T> {
    fn detect(&self, image: &PixelBuffer) -> Result<TextRegions> {
        (**self).detect(image)
    }

    fn extract_text(&self, image: &PixelBuffer) -> Result<String> {
        (**self).extract_text(image)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// A detector with no engine behind it. Every call fails with
/// `EngineUnavailable` carrying `reason`.
#[derive(Debug, Clone)]
pub struct UnavailableDetector {
    reason: String,
}

impl UnavailableDetector {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl TextDetector for UnavailableDetector {
    fn detect(&self, _image: &PixelBuffer) -> Result<TextRegions> {
        Err(RetouchError::EngineUnavailable(self.reason.clone()))
    }

    fn extract_text(&self, _image: &PixelBuffer) -> Result<String> {
        Err(RetouchError::EngineUnavailable(self.reason.clone()))
    }

    fn is_available(&self) -> bool {
        false
    }
}
