// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edit workflows: replace text, add text, apply a filter.
//
// Each workflow takes the source image by reference and returns a new buffer
// together with the metadata a storage layer needs to save it as a new
// artifact. The source artifact is never modified.

use retouch_core::error::{Result, RetouchError};
use retouch_core::{
    ArtifactInfo, EditKind, EditorConfig, FilterSpec, OutputFormat, TextRegion, TextStyle,
};
use tracing::{debug, info, instrument};

use crate::filter::FilterPipeline;
use crate::inpaint::Inpainter;
use crate::raster::PixelBuffer;
use crate::text::{TextDetector, TextRegions, TextRenderer};

/// The product of one workflow: the edited image and how to store it.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub image: PixelBuffer,
    pub artifact: ArtifactInfo,
}

impl EditOutcome {
    fn new(
        image: PixelBuffer,
        kind: EditKind,
        original_name: Option<&str>,
        format: OutputFormat,
    ) -> Self {
        let artifact =
            ArtifactInfo::derive(kind, original_name, format, image.width(), image.height());
        Self { image, artifact }
    }

    /// Encode the image in the artifact's format.
    pub fn encode(&self, jpeg_quality: u8) -> Result<Vec<u8>> {
        self.image.encode(self.artifact.format, jpeg_quality)
    }
}

/// Orchestrates detection, inpainting, compositing and filtering.
pub struct EditWorkflow<D, R> {
    detector: D,
    renderer: R,
    inpainter: Inpainter,
    filters: FilterPipeline,
    default_style: TextStyle,
    default_anchor: (i32, i32),
    output_format: OutputFormat,
}

impl<D: TextDetector, R: TextRenderer> EditWorkflow<D, R> {
    pub fn new(detector: D, renderer: R, config: &EditorConfig) -> Self {
        Self {
            detector,
            renderer,
            inpainter: Inpainter::from_config(config),
            filters: FilterPipeline::from_config(config),
            default_style: config.default_style.clone(),
            default_anchor: config.default_anchor,
            output_format: config.output_format,
        }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn default_style(&self) -> &TextStyle {
        &self.default_style
    }

    /// Replace the first detected word equal to `target` (ignoring case)
    /// with `replacement`.
    ///
    /// The matched box is inpainted, then `replacement` is drawn with its
    /// baseline at the box's bottom-left corner, kept inside the image.
    ///
    /// # Errors
    ///
    /// `TextNotFound` when no region matches; detector errors are passed
    /// through unchanged.
    #[instrument(skip(self, image, style), fields(width = image.width(), height = image.height()))]
    pub fn replace_text(
        &self,
        image: &PixelBuffer,
        original_name: Option<&str>,
        target: &str,
        replacement: &str,
        style: Option<&TextStyle>,
    ) -> Result<EditOutcome> {
        info!("Replacing text");
        let region = self
            .detector
            .detect(image)?
            .find(|region| region.matches(target))
            .ok_or_else(|| RetouchError::TextNotFound(target.to_string()))?;
        debug!(%region, "Matched region");

        let cleaned = self.inpainter.remove(image, &region);
        let (x, y) = replacement_anchor(&region, image.height());
        let style = style.unwrap_or(&self.default_style);
        let edited = self.renderer.draw(&cleaned, replacement, x, y, style)?;

        Ok(EditOutcome::new(
            edited,
            EditKind::TextEdited,
            original_name,
            self.output_format,
        ))
    }

    /// Draw `text` onto the image at `anchor`, or the configured default.
    #[instrument(skip(self, image, style), fields(width = image.width(), height = image.height()))]
    pub fn add_text(
        &self,
        image: &PixelBuffer,
        original_name: Option<&str>,
        text: &str,
        anchor: Option<(i32, i32)>,
        style: Option<&TextStyle>,
    ) -> Result<EditOutcome> {
        let (x, y) = anchor.unwrap_or(self.default_anchor);
        info!(x, y, "Adding text");
        let style = style.unwrap_or(&self.default_style);
        let edited = self.renderer.draw(image, text, x, y, style)?;
        Ok(EditOutcome::new(
            edited,
            EditKind::TextAdded,
            original_name,
            self.output_format,
        ))
    }

    pub fn apply_filter(
        &self,
        image: &PixelBuffer,
        original_name: Option<&str>,
        spec: &FilterSpec,
    ) -> Result<EditOutcome> {
        let filtered = self.filters.apply(image, spec)?;
        Ok(EditOutcome::new(
            filtered,
            EditKind::Filtered,
            original_name,
            self.output_format,
        ))
    }

    pub fn detect(&self, image: &PixelBuffer) -> Result<TextRegions> {
        self.detector.detect(image)
    }

    /// Detection that reports engine failure as "no regions".
    pub fn detect_lenient(&self, image: &PixelBuffer) -> TextRegions {
        self.detector.detect_lenient(image)
    }

    pub fn extract_text(&self, image: &PixelBuffer) -> Result<String> {
        self.detector.extract_text(image)
    }
}

/// Baseline anchor for replacement text: the region's bottom-left corner,
/// with `x >= 0` and `y` within `[0, image_height]`.
fn replacement_anchor(region: &TextRegion, image_height: u32) -> (i32, i32) {
    let x = region.bbox.x.max(0);
    let y = region.bbox.bottom().clamp(0, i64::from(image_height));
    (x, y as i32)
}
