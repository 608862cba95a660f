// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{DEFAULT_MAX_BLUR_RADIUS, DEFAULT_MAX_FONT_SIZE, OutputFormat, TextStyle};

/// Settings for the editing engine, passed explicitly to whatever constructs
/// the adapters. Every field has a default so partial JSON files load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Text-recognition engine settings.
    pub ocr: OcrSettings,
    /// Where fonts are discovered and which family is the fallback.
    pub fonts: FontSettings,
    /// Width in pixels of the band sampled around a region when inpainting.
    pub inpaint_margin: u32,
    /// Style used when a caller does not supply one.
    pub default_style: TextStyle,
    /// Anchor used by add-text when the caller gives no position.
    pub default_anchor: (i32, i32),
    /// Encoding for edited outputs.
    pub output_format: OutputFormat,
    /// JPEG quality (1-100) when `output_format` is JPEG.
    pub jpeg_quality: u8,
    /// Largest blur radius a filter request may ask for.
    pub max_blur_radius: u32,
    /// Largest point size a text request may ask for.
    pub max_font_size: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            ocr: OcrSettings::default(),
            fonts: FontSettings::default(),
            inpaint_margin: 10,
            default_style: TextStyle::default(),
            default_anchor: (50, 50),
            output_format: OutputFormat::Png,
            jpeg_quality: 90,
            max_blur_radius: DEFAULT_MAX_BLUR_RADIUS,
            max_font_size: DEFAULT_MAX_FONT_SIZE,
        }
    }
}

impl EditorConfig {
    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Read `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

/// How the recogniser turns model output into characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DecodeMode {
    #[default]
    Greedy,
    BeamSearch { width: u32 },
}

/// Text-recognition engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Directories searched in order for the detection and recognition models.
    pub model_dirs: Vec<PathBuf>,
    pub decode_mode: DecodeMode,
    /// Restrict recognition to this alphabet (engine default when `None`).
    pub alphabet: Option<String>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            model_dirs: default_model_dirs(),
            decode_mode: DecodeMode::Greedy,
            alphabet: None,
        }
    }
}

/// Font discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    /// Directories scanned recursively for `.ttf`, `.otf` and `.ttc` files.
    pub search_dirs: Vec<PathBuf>,
    /// Family used when a requested family is not installed.
    pub default_family: String,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            search_dirs: default_font_dirs(),
            default_family: "DejaVu Sans".into(),
        }
    }
}

/// Model directory candidates: `./ocrs-models`, then the XDG cache.
fn default_model_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("ocrs-models")];
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        dirs.push(PathBuf::from(xdg).join("ocrs"));
    } else if let Ok(home) = std::env::var("HOME") {
        dirs.push(PathBuf::from(home).join(".cache").join("ocrs"));
    }
    dirs
}

fn default_font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from("C:\\Windows\\Fonts"),
    ];
    if let Ok(home) = std::env::var("HOME") {
        dirs.push(PathBuf::from(&home).join(".local").join("share").join("fonts"));
        dirs.push(PathBuf::from(home).join(".fonts"));
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FontStyle, Rgb};

    #[test]
    fn defaults_match_documented_values() {
        let config = EditorConfig::default();
        assert_eq!(config.inpaint_margin, 10);
        assert_eq!(config.default_anchor, (50, 50));
        assert_eq!(config.output_format, OutputFormat::Png);
        assert_eq!(config.default_style.size, 20);
        assert_eq!(config.max_blur_radius, DEFAULT_MAX_BLUR_RADIUS);
        assert_eq!(config.max_font_size, DEFAULT_MAX_FONT_SIZE);
        assert_eq!(config.ocr.decode_mode, DecodeMode::Greedy);
        assert!(!config.ocr.model_dirs.is_empty());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r##"{
            "inpaint_margin": 4,
            "default_style": { "family": "Arial", "size": 12, "color": "#ff0000", "style": "bold" },
            "ocr": { "decode_mode": { "mode": "beam_search", "width": 5 } }
        }"##;
        let config: EditorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.inpaint_margin, 4);
        assert_eq!(config.default_style.color, Rgb::new(255, 0, 0));
        assert_eq!(config.default_style.style, FontStyle::Bold);
        assert_eq!(config.ocr.decode_mode, DecodeMode::BeamSearch { width: 5 });
        assert_eq!(config.default_anchor, (50, 50));
        assert!(!config.fonts.default_family.is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = EditorConfig::default();
        config.inpaint_margin = 7;
        config.output_format = OutputFormat::Jpeg;
        config.save(&path).unwrap();

        let loaded = EditorConfig::load(&path).unwrap();
        assert_eq!(loaded.inpaint_margin, 7);
        assert_eq!(loaded.output_format, OutputFormat::Jpeg);
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load_or_default(dir.path().join("missing.json")).unwrap();
        assert_eq!(config.inpaint_margin, 10);
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            EditorConfig::load(&path),
            Err(crate::error::RetouchError::Serialization(_))
        ));
    }
}
