// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Retouch editing engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, RetouchError};

/// Blur radius accepted when no configuration overrides it.
pub const DEFAULT_MAX_BLUR_RADIUS: u32 = 100;

/// Largest point size accepted when no configuration overrides it. Glyphs
/// are rasterized at full size before clipping, so this also bounds memory.
pub const DEFAULT_MAX_FONT_SIZE: u32 = 1000;

/// Unique identifier for an edited artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId(pub Uuid);

impl ArtifactId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -- Colour -------------------------------------------------------------------

/// An 8-bit RGB colour. Serialized as a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `rrggbb` or `0xrrggbb`.
    pub fn from_hex(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RetouchError::InvalidParameter(format!(
                "colour must be a 6-digit hex value like #000000, got {value:?}"
            )));
        }

        let packed = u32::from_str_radix(digits, 16).map_err(|err| {
            RetouchError::InvalidParameter(format!("bad colour {value:?}: {err}"))
        })?;
        Ok(Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        })
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl TryFrom<String> for Rgb {
    type Error = RetouchError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

// -- Text styling -------------------------------------------------------------

/// Font weight/slant combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Plain,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    /// Parse a caller-supplied style keyword (`normal`, `bold`, `italic`,
    /// `bold italic`). Anything unrecognised is treated as plain.
    pub fn parse(value: &str) -> Self {
        let words: Vec<String> = value
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|w| !w.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        match words.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["bold"] => Self::Bold,
            ["italic"] => Self::Italic,
            ["bold", "italic"] | ["bolditalic"] => Self::BoldItalic,
            _ => Self::Plain,
        }
    }

    /// Caller-facing keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Plain => "normal",
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::BoldItalic => "bold italic",
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, Self::Bold | Self::BoldItalic)
    }

    pub fn is_italic(&self) -> bool {
        matches!(self, Self::Italic | Self::BoldItalic)
    }
}

/// Font family, point size, colour and style used when compositing text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    pub family: String,
    pub size: u32,
    pub color: Rgb,
    pub style: FontStyle,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: "default".into(),
            size: 20,
            color: Rgb::BLACK,
            style: FontStyle::Plain,
        }
    }
}

impl TextStyle {
    /// Construct a style, rejecting a zero point size or one above
    /// [`DEFAULT_MAX_FONT_SIZE`].
    pub fn new(family: impl Into<String>, size: u32, color: Rgb, style: FontStyle) -> Result<Self> {
        let text_style = Self {
            family: family.into(),
            size,
            color,
            style,
        };
        text_style.validate(DEFAULT_MAX_FONT_SIZE)?;
        Ok(text_style)
    }

    /// Check the point size is in `1..=max_font_size`.
    pub fn validate(&self, max_font_size: u32) -> Result<()> {
        match self.size {
            0 => Err(RetouchError::InvalidParameter(
                "font size must be a positive integer".into(),
            )),
            size if size > max_font_size => Err(RetouchError::InvalidParameter(format!(
                "font size {size} exceeds the maximum of {max_font_size}"
            ))),
            _ => Ok(()),
        }
    }

    /// Build a style from optional caller parameters, filling gaps from `base`.
    pub fn from_params(
        base: &TextStyle,
        family: Option<&str>,
        size: Option<u32>,
        color: Option<&str>,
        style: Option<&str>,
    ) -> Result<Self> {
        let color = match color {
            Some(hex) => Rgb::from_hex(hex)?,
            None => base.color,
        };
        Self::new(
            family.unwrap_or(&base.family),
            size.unwrap_or(base.size),
            color,
            style.map_or(base.style, FontStyle::parse),
        )
    }
}

// -- Text regions -------------------------------------------------------------

/// Axis-aligned box in pixel coordinates with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= i64::from(self.x) && x < self.right() && y >= i64::from(self.y) && y < self.bottom()
    }
}

/// A piece of text recognised in an image, with where it was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    pub text: String,
    #[serde(flatten)]
    pub bbox: BoundingBox,
    /// Engine confidence, `0.0..=1.0`.
    pub confidence: f32,
}

impl TextRegion {
    pub fn new(text: impl Into<String>, bbox: BoundingBox, confidence: f32) -> Self {
        Self {
            text: text.into(),
            bbox,
            confidence,
        }
    }

    /// Case-insensitive exact comparison against `target`.
    pub fn matches(&self, target: &str) -> bool {
        self.text.to_lowercase() == target.to_lowercase()
    }
}

impl std::fmt::Display for TextRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} at ({},{}) size {}x{} confidence {:.2}",
            self.text, self.bbox.x, self.bbox.y, self.bbox.width, self.bbox.height, self.confidence
        )
    }
}

// -- Filters ------------------------------------------------------------------

/// A pixel filter and its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterSpec {
    /// Multiply every channel by `factor`.
    Brightness { factor: f32 },
    /// Multiplicative channel scaling; same formula as brightness.
    Contrast { factor: f32 },
    Grayscale,
    Sepia,
    /// Box blur over a `(2 * radius + 1)` square window.
    Blur { radius: u32 },
}

impl FilterSpec {
    /// Parse a filter kind and its textual parameter.
    ///
    /// Brightness and contrast take a float, blur a non-negative integer;
    /// grayscale and sepia ignore `value`.
    pub fn parse(kind: &str, value: Option<&str>) -> Result<Self> {
        let spec = match kind.trim().to_ascii_lowercase().as_str() {
            "brightness" => Self::Brightness {
                factor: parse_factor(kind, value)?,
            },
            "contrast" => Self::Contrast {
                factor: parse_factor(kind, value)?,
            },
            "grayscale" | "greyscale" => Self::Grayscale,
            "sepia" => Self::Sepia,
            "blur" => Self::Blur {
                radius: parse_radius(value)?,
            },
            other => return Err(RetouchError::UnsupportedFilter(other.to_string())),
        };
        spec.validate(DEFAULT_MAX_BLUR_RADIUS)?;
        Ok(spec)
    }

    /// Check the parameter is within range.
    pub fn validate(&self, max_blur_radius: u32) -> Result<()> {
        match *self {
            Self::Brightness { factor } | Self::Contrast { factor } => {
                if !factor.is_finite() || factor < 0.0 {
                    return Err(RetouchError::InvalidParameter(format!(
                        "{} factor must be a finite number >= 0, got {factor}",
                        self.name()
                    )));
                }
            }
            Self::Blur { radius } if radius > max_blur_radius => {
                return Err(RetouchError::InvalidParameter(format!(
                    "blur radius {radius} exceeds the maximum of {max_blur_radius}"
                )));
            }
            Self::Blur { .. } | Self::Grayscale | Self::Sepia => {}
        }
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Brightness { .. } => "brightness",
            Self::Contrast { .. } => "contrast",
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Blur { .. } => "blur",
        }
    }
}

fn parse_factor(kind: &str, value: Option<&str>) -> Result<f32> {
    let raw = value.map(str::trim).unwrap_or_default();
    raw.parse::<f32>().map_err(|_| {
        RetouchError::InvalidParameter(format!("{kind} needs a numeric factor, got {raw:?}"))
    })
}

fn parse_radius(value: Option<&str>) -> Result<u32> {
    let raw = value.map(str::trim).unwrap_or_default();
    let radius = raw.parse::<i64>().map_err(|_| {
        RetouchError::InvalidParameter(format!("blur needs an integer radius, got {raw:?}"))
    })?;
    u32::try_from(radius).map_err(|_| {
        RetouchError::InvalidParameter(format!("blur radius must be >= 0, got {radius}"))
    })
}

// -- Output artifacts ---------------------------------------------------------

/// Encoded output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
        }
    }

    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }
}

/// What kind of edit produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    TextEdited,
    TextAdded,
    Filtered,
}

impl EditKind {
    fn file_prefix(&self) -> &'static str {
        match self {
            Self::TextEdited => "edited",
            Self::TextAdded => "added_text",
            Self::Filtered => "filtered",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::TextEdited => "Text Edited",
            Self::TextAdded => "Text Added",
            Self::Filtered => "Filtered",
        }
    }
}

/// Metadata a storage collaborator needs to persist an edited image as a new
/// artifact. The original artifact is never touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub id: ArtifactId,
    pub kind: EditKind,
    /// Generated file name, e.g. `edited_<uuid>.png`.
    pub file_name: String,
    /// Human-facing name derived from the source, e.g. `photo.jpg (Text Edited)`.
    pub display_name: String,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub created_at: DateTime<Utc>,
}

impl ArtifactInfo {
    pub fn derive(
        kind: EditKind,
        original_name: Option<&str>,
        format: OutputFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let id = ArtifactId::new();
        let source = original_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("untitled");
        Self {
            id,
            kind,
            file_name: format!("{}_{}.{}", kind.file_prefix(), id, format.extension()),
            display_name: format!("{source} ({})", kind.label()),
            format,
            width,
            height,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colours_parse_in_all_accepted_forms() {
        assert_eq!(Rgb::from_hex("#000000").unwrap(), Rgb::BLACK);
        assert_eq!(Rgb::from_hex("ffffff").unwrap(), Rgb::WHITE);
        assert_eq!(Rgb::from_hex("0x10Ab20").unwrap(), Rgb::new(0x10, 0xab, 0x20));
        assert!(matches!(
            Rgb::from_hex("#fff"),
            Err(RetouchError::InvalidParameter(_))
        ));
        assert!(Rgb::from_hex("#gg0000").is_err());
    }

    #[test]
    fn rgb_serializes_as_hex_string() {
        let json = serde_json::to_string(&Rgb::new(255, 0, 16)).unwrap();
        assert_eq!(json, "\"#ff0010\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(255, 0, 16));
    }

    #[test]
    fn font_style_keywords() {
        assert_eq!(FontStyle::parse("normal"), FontStyle::Plain);
        assert_eq!(FontStyle::parse("BOLD"), FontStyle::Bold);
        assert_eq!(FontStyle::parse("italic"), FontStyle::Italic);
        assert_eq!(FontStyle::parse("bold italic"), FontStyle::BoldItalic);
        assert_eq!(FontStyle::parse("wavy"), FontStyle::Plain);
        assert!(FontStyle::BoldItalic.is_bold() && FontStyle::BoldItalic.is_italic());
    }

    #[test]
    fn default_text_style() {
        let style = TextStyle::default();
        assert_eq!(style.family, "default");
        assert_eq!(style.size, 20);
        assert_eq!(style.color, Rgb::BLACK);
        assert_eq!(style.style, FontStyle::Plain);
    }

    #[test]
    fn text_style_from_params_rejects_zero_size() {
        let base = TextStyle::default();
        let err = TextStyle::from_params(&base, None, Some(0), None, None).unwrap_err();
        assert!(matches!(err, RetouchError::InvalidParameter(_)));

        let style =
            TextStyle::from_params(&base, Some("Arial"), Some(32), Some("#ff0000"), Some("bold"))
                .unwrap();
        assert_eq!(style.family, "Arial");
        assert_eq!(style.size, 32);
        assert_eq!(style.color, Rgb::new(255, 0, 0));
        assert_eq!(style.style, FontStyle::Bold);
    }

    #[test]
    fn oversized_fonts_are_rejected() {
        let base = TextStyle::default();
        assert!(TextStyle::from_params(&base, None, Some(DEFAULT_MAX_FONT_SIZE), None, None).is_ok());
        assert!(matches!(
            TextStyle::from_params(&base, None, Some(200_000), None, None),
            Err(RetouchError::InvalidParameter(_))
        ));

        let large = TextStyle {
            size: 300,
            ..TextStyle::default()
        };
        assert!(large.validate(300).is_ok());
        assert!(matches!(
            large.validate(299),
            Err(RetouchError::InvalidParameter(_))
        ));
    }

    #[test]
    fn region_matching_is_case_insensitive_and_exact() {
        let region = TextRegion::new("Hello", BoundingBox::new(5, 5, 40, 12), 0.9);
        assert!(region.matches("hello"));
        assert!(region.matches("HELLO"));
        assert!(!region.matches("hell"));
        assert!(!region.matches("Hello!"));
    }

    #[test]
    fn filter_parse_known_kinds() {
        assert_eq!(
            FilterSpec::parse("Brightness", Some("1.5")).unwrap(),
            FilterSpec::Brightness { factor: 1.5 }
        );
        assert_eq!(
            FilterSpec::parse("contrast", Some(" 0.5 ")).unwrap(),
            FilterSpec::Contrast { factor: 0.5 }
        );
        assert_eq!(FilterSpec::parse("grayscale", None).unwrap(), FilterSpec::Grayscale);
        assert_eq!(FilterSpec::parse("sepia", Some("ignored")).unwrap(), FilterSpec::Sepia);
        assert_eq!(
            FilterSpec::parse("blur", Some("3")).unwrap(),
            FilterSpec::Blur { radius: 3 }
        );
    }

    #[test]
    fn filter_parse_errors() {
        assert!(matches!(
            FilterSpec::parse("vignette", Some("1")),
            Err(RetouchError::UnsupportedFilter(_))
        ));
        assert!(matches!(
            FilterSpec::parse("brightness", Some("bright")),
            Err(RetouchError::InvalidParameter(_))
        ));
        assert!(matches!(
            FilterSpec::parse("brightness", None),
            Err(RetouchError::InvalidParameter(_))
        ));
        assert!(matches!(
            FilterSpec::parse("contrast", Some("-1")),
            Err(RetouchError::InvalidParameter(_))
        ));
        assert!(matches!(
            FilterSpec::parse("brightness", Some("NaN")),
            Err(RetouchError::InvalidParameter(_))
        ));
        assert!(matches!(
            FilterSpec::parse("blur", Some("-2")),
            Err(RetouchError::InvalidParameter(_))
        ));
        assert!(matches!(
            FilterSpec::parse("blur", Some("1.5")),
            Err(RetouchError::InvalidParameter(_))
        ));
        assert!(matches!(
            FilterSpec::parse("blur", Some("101")),
            Err(RetouchError::InvalidParameter(_))
        ));
    }

    #[test]
    fn filter_spec_json_is_tagged() {
        let json = serde_json::to_string(&FilterSpec::Blur { radius: 2 }).unwrap();
        assert_eq!(json, r#"{"kind":"blur","radius":2}"#);
        let spec: FilterSpec = serde_json::from_str(r#"{"kind":"sepia"}"#).unwrap();
        assert_eq!(spec, FilterSpec::Sepia);
    }

    #[test]
    fn artifact_names_follow_edit_kind() {
        let info = ArtifactInfo::derive(
            EditKind::TextEdited,
            Some("holiday.jpg"),
            OutputFormat::Png,
            640,
            480,
        );
        assert!(info.file_name.starts_with("edited_"));
        assert!(info.file_name.ends_with(".png"));
        assert_eq!(info.display_name, "holiday.jpg (Text Edited)");
        assert_eq!((info.width, info.height), (640, 480));

        let added = ArtifactInfo::derive(EditKind::TextAdded, None, OutputFormat::Jpeg, 1, 1);
        assert!(added.file_name.starts_with("added_text_"));
        assert!(added.file_name.ends_with(".jpg"));
        assert_eq!(added.display_name, "untitled (Text Added)");
    }

    #[test]
    fn output_format_from_extension() {
        assert_eq!(OutputFormat::from_extension("JPEG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("png"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_extension("gif"), None);
    }
}
