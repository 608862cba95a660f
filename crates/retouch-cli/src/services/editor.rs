// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer. Owns the configuration, the recognition engine and
// the font book, and exposes the edit workflows to the command handlers.
//
// The recognition engine is constructed here, once, and injected into the
// workflow. Without the `ocr` feature a detector that always reports
// `EngineUnavailable` takes its place.

use std::path::{Path, PathBuf};

use retouch_core::EditorConfig;
use retouch_core::error::{Result, RetouchError};
use retouch_imaging::raster::decode_base64;
use retouch_imaging::{
    EditOutcome, EditWorkflow, PixelBuffer, TextCompositor, TextDetector, TextRenderer,
};
use serde::Serialize;
use tracing::{info, warn};

use super::config_dir;

pub type Detector = Box<dyn TextDetector>;

/// Engine status reported by `retouch health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub ocr_compiled: bool,
    pub ocr_available: bool,
    pub model_dirs: Vec<PathBuf>,
    pub font_faces: usize,
    pub fonts_usable: bool,
    pub default_family: String,
    pub config_path: Option<PathBuf>,
}

pub struct EditorServices {
    workflow: EditWorkflow<Detector, TextCompositor>,
    config: EditorConfig,
    config_path: Option<PathBuf>,
}

impl EditorServices {
    /// Load configuration and build every service. Call once at startup.
    ///
    /// An explicit `config_path` must exist; the default location is
    /// optional and falls back to built-in defaults.
    pub fn init(config_path: Option<&Path>) -> Result<Self> {
        let (config, path) = match config_path {
            Some(path) => (EditorConfig::load(path)?, Some(path.to_path_buf())),
            None => {
                let path = config_dir::default_config_path();
                let config = EditorConfig::load_or_default(&path)?;
                let found = path.exists().then_some(path);
                (config, found)
            }
        };
        info!(config = ?path, "initialising editor services");
        let mut services = Self::with_config(config);
        services.config_path = path;
        Ok(services)
    }

    /// Build services from an already-loaded configuration.
    pub fn with_config(config: EditorConfig) -> Self {
        let detector = build_detector(&config);
        if !detector.is_available() {
            warn!("text recognition unavailable; detect, extract and replace-text will fail");
        }
        let compositor = TextCompositor::from_config(&config);
        let workflow = EditWorkflow::new(detector, compositor, &config);
        Self {
            workflow,
            config,
            config_path: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn workflow(&self) -> &EditWorkflow<Detector, TextCompositor> {
        &self.workflow
    }

    /// Read an image file. With `base64`, the file holds base64 text (a
    /// data URL is fine) rather than encoded image bytes.
    pub fn load_image(&self, path: &Path, base64: bool) -> Result<PixelBuffer> {
        if !base64 {
            return PixelBuffer::open(path);
        }
        let text = std::fs::read_to_string(path)?;
        let bytes = decode_base64(&text)?;
        PixelBuffer::from_bytes(&bytes)
    }

    /// Encode an outcome and write it to `output`, or to the artifact's
    /// generated file name inside `out_dir`.
    pub fn write_outcome(
        &self,
        outcome: &EditOutcome,
        output: Option<&Path>,
        out_dir: &Path,
    ) -> Result<PathBuf> {
        let path = match output {
            Some(path) => path.to_path_buf(),
            None => out_dir.join(&outcome.artifact.file_name),
        };
        let bytes = outcome.encode(self.config.jpeg_quality)?;
        std::fs::write(&path, bytes)?;
        info!(path = %path.display(), "edited image written");
        Ok(path)
    }

    pub fn health(&self) -> HealthReport {
        let fonts = self.workflow.renderer().fonts();
        HealthReport {
            ocr_compiled: cfg!(feature = "ocr"),
            ocr_available: self.workflow.detector().is_available(),
            model_dirs: self.config.ocr.model_dirs.clone(),
            font_faces: fonts.len(),
            fonts_usable: self.check_fonts().is_ok(),
            default_family: fonts.default_family().to_string(),
            config_path: self.config_path.clone(),
        }
    }

    /// Write the active configuration as JSON, creating parent directories.
    pub fn save_config(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.config.save(path)
    }

    /// Draw one glyph in the default style to confirm a font can be loaded.
    pub fn check_fonts(&self) -> Result<()> {
        let probe = PixelBuffer::new(1, 1);
        self.workflow
            .renderer()
            .draw(&probe, "A", 0, 0, self.workflow.default_style())
            .map(|_| ())
            .map_err(|err| match err {
                RetouchError::FontUnavailable(detail) => RetouchError::FontUnavailable(format!(
                    "{detail}; searched {:?}",
                    self.config.fonts.search_dirs
                )),
                other => other,
            })
    }
}

#[cfg(feature = "ocr")]
fn build_detector(config: &EditorConfig) -> Detector {
    use retouch_imaging::text::{OcrAdapter, OcrConfig};
    Box::new(OcrAdapter::new(&OcrConfig::from(&config.ocr)))
}

#[cfg(not(feature = "ocr"))]
fn build_detector(_config: &EditorConfig) -> Detector {
    Box::new(retouch_imaging::UnavailableDetector::new(
        "retouch was built without the `ocr` feature",
    ))
}
