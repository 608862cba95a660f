// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR adapter backed by the `ocrs` crate, a pure-Rust OCR engine whose neural
// network models are executed via `rten`.
//
// # Feature Gate
//
// This module is only available when the `ocr` feature is enabled:
//
// ```toml
// retouch-imaging = { path = "crates/retouch-imaging", features = ["ocr"] }
// ```
//
// # Model Setup
//
// The engine requires two model files, looked up in each configured model
// directory in order:
//
// - **Detection model** (`text-detection.rten`) locates words in the image.
// - **Recognition model** (`text-recognition.rten`) decodes characters.
//
// Running the `ocrs-cli` tool once downloads both to `~/.cache/ocrs/`:
//   ```sh
//   cargo install ocrs-cli
//   ocrs some-image.png
//   ```

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsEngine, OcrEngineParams, TextItem};
use retouch_core::config::{DecodeMode, OcrSettings};
use retouch_core::error::{Result, RetouchError};
use retouch_core::{BoundingBox, TextRegion};
use rten::Model;
use rten_imageproc::Rect;
use tracing::{debug, info, instrument, warn};

use super::detect::{TextDetector, TextRegions};
use crate::filter::pipeline::grayscale;
use crate::raster::PixelBuffer;

/// Well-known filenames for the detection and recognition models.
const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// `ocrs` does not score words; every region it returns carries this.
const WORD_CONFIDENCE: f32 = 1.0;

/// Extraction results shorter than this are retried on the unprocessed image.
const MIN_EXTRACTED_CHARS: usize = 3;

/// Configuration for constructing an [`OcrAdapter`].
#[derive(Debug, Clone, Default)]
pub struct OcrConfig {
    /// Directories searched in order for both model files.
    pub model_dirs: Vec<PathBuf>,
    pub decode_mode: DecodeMode,
    pub alphabet: Option<String>,
}

impl From<&OcrSettings> for OcrConfig {
    fn from(settings: &OcrSettings) -> Self {
        Self {
            model_dirs: settings.model_dirs.clone(),
            decode_mode: settings.decode_mode,
            alphabet: settings.alphabet.clone(),
        }
    }
}

impl OcrConfig {
    /// A config that only looks in `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            model_dirs: vec![dir.as_ref().to_path_buf()],
            ..Self::default()
        }
    }

    /// The first directory that holds both model files, as
    /// `(detection, recognition)` paths.
    pub fn locate_models(&self) -> Result<(PathBuf, PathBuf)> {
        for dir in &self.model_dirs {
            let detection = dir.join(DETECTION_MODEL_FILENAME);
            let recognition = dir.join(RECOGNITION_MODEL_FILENAME);
            if detection.exists() && recognition.exists() {
                debug!(dir = %dir.display(), "OCR models found");
                return Ok((detection, recognition));
            }
            debug!(dir = %dir.display(), "OCR models not found");
        }
        Err(RetouchError::EngineUnavailable(format!(
            "no directory among {:?} contains {DETECTION_MODEL_FILENAME} and \
             {RECOGNITION_MODEL_FILENAME}; run `ocrs-cli` once to download models",
            self.model_dirs
        )))
    }
}

/// Text-region adapter over an `ocrs` engine.
///
/// Constructed once by the caller and shared; the engine is behind a mutex so
/// concurrent calls are serialized. When the models fail to load the adapter
/// still exists but reports itself unavailable.
pub struct OcrAdapter {
    engine: std::result::Result<Mutex<OcrsEngine>, String>,
}

impl OcrAdapter {
    /// Load the engine, keeping the adapter usable (but unavailable) when the
    /// models cannot be loaded.
    pub fn new(config: &OcrConfig) -> Self {
        match Self::try_new(config) {
            Ok(adapter) => adapter,
            Err(err) => {
                warn!(error = %err, "OCR engine unavailable");
                Self {
                    engine: Err(err.to_string()),
                }
            }
        }
    }

    /// Load the engine or fail.
    ///
    /// # Errors
    ///
    /// `EngineUnavailable` if model files are missing or corrupt.
    ///
    /// # Performance
    ///
    /// **Important:** The `ocrs` and `rten` crates must be compiled in release
    /// mode. Debug builds will be extremely slow (10-100x slower).
    #[instrument(skip_all, fields(dirs = config.model_dirs.len()))]
    pub fn try_new(config: &OcrConfig) -> Result<Self> {
        let (detection_path, recognition_path) = config.locate_models()?;

        info!(path = %detection_path.display(), "Loading OCR detection model");
        let detection_model = Model::load_file(&detection_path).map_err(|err| {
            RetouchError::EngineUnavailable(format!(
                "failed to load detection model from {}: {err}",
                detection_path.display()
            ))
        })?;

        info!(path = %recognition_path.display(), "Loading OCR recognition model");
        let recognition_model = Model::load_file(&recognition_path).map_err(|err| {
            RetouchError::EngineUnavailable(format!(
                "failed to load recognition model from {}: {err}",
                recognition_path.display()
            ))
        })?;

        let decode_method = match config.decode_mode {
            DecodeMode::Greedy => DecodeMethod::Greedy,
            DecodeMode::BeamSearch { width } => DecodeMethod::BeamSearch { width },
        };

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method,
            alphabet: config.alphabet.clone(),
            ..Default::default()
        })
        .map_err(|err| {
            RetouchError::EngineUnavailable(format!("failed to initialise OCR engine: {err}"))
        })?;

        info!("OCR engine initialised successfully");
        Ok(Self {
            engine: Ok(Mutex::new(engine)),
        })
    }

    fn engine(&self) -> Result<MutexGuard<'_, OcrsEngine>> {
        match &self.engine {
            Ok(engine) => engine.lock().map_err(|_| {
                RetouchError::EngineUnavailable("OCR engine lock poisoned".into())
            }),
            Err(reason) => Err(RetouchError::EngineUnavailable(reason.clone())),
        }
    }

    /// Run plain-text recognition on one buffer.
    fn read_text(&self, image: &PixelBuffer) -> Result<String> {
        let engine = self.engine()?;
        let source = ImageSource::from_bytes(image.as_raw(), image.dimensions()).map_err(|err| {
            RetouchError::EngineUnavailable(format!(
                "failed to create image source ({}x{}): {err}",
                image.width(),
                image.height()
            ))
        })?;
        let input = engine.prepare_input(source).map_err(|err| {
            RetouchError::EngineUnavailable(format!("OCR preprocessing failed: {err}"))
        })?;
        let text = engine.get_text(&input).map_err(|err| {
            RetouchError::EngineUnavailable(format!("OCR text recognition failed: {err}"))
        })?;
        Ok(text.trim().to_string())
    }
}

impl TextDetector for OcrAdapter {
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn detect(&self, image: &PixelBuffer) -> Result<TextRegions> {
        info!("Starting text region detection");
        let engine = self.engine()?;

        let source = ImageSource::from_bytes(image.as_raw(), image.dimensions()).map_err(|err| {
            RetouchError::EngineUnavailable(format!(
                "failed to create image source ({}x{}): {err}",
                image.width(),
                image.height()
            ))
        })?;
        let input = engine.prepare_input(source).map_err(|err| {
            RetouchError::EngineUnavailable(format!("OCR preprocessing failed: {err}"))
        })?;

        // Step 1: Detect word bounding boxes.
        let word_rects = engine
            .detect_words(&input)
            .map_err(|err| RetouchError::EngineUnavailable(format!("word detection failed: {err}")))?;
        debug!(word_count = word_rects.len(), "Words detected");

        // Step 2: Group words into text lines.
        let line_rects = engine.find_text_lines(&input, &word_rects);

        // Step 3: Recognise each line, then split it back into words.
        let lines = engine.recognize_text(&input, &line_rects).map_err(|err| {
            RetouchError::EngineUnavailable(format!("line recognition failed: {err}"))
        })?;

        let mut regions = Vec::new();
        for line in lines.iter().flatten() {
            for word in line.words() {
                let text = word.to_string();
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                regions.push(TextRegion::new(
                    text,
                    word_box(word.bounding_rect()),
                    WORD_CONFIDENCE,
                ));
            }
        }

        info!(regions = regions.len(), "Text region detection complete");
        Ok(regions.into())
    }

    /// Recognise on a grayscale copy first; when that yields fewer than
    /// three characters, retry on the original colours.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn extract_text(&self, image: &PixelBuffer) -> Result<String> {
        let text = self.read_text(&grayscale(image))?;
        if text.chars().count() >= MIN_EXTRACTED_CHARS {
            debug!(chars = text.len(), "OCR extraction complete");
            return Ok(text);
        }
        debug!("Grayscale pass found little text; retrying on original");
        self.read_text(image)
    }

    fn is_available(&self) -> bool {
        self.engine.is_ok()
    }
}

/// Axis-aligned pixel box of a recognised word.
fn word_box(rect: Rect) -> BoundingBox {
    BoundingBox::new(
        rect.left(),
        rect.top(),
        rect.width().max(0) as u32,
        rect.height().max(0) as u32,
    )
}
