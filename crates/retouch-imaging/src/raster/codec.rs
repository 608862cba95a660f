// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decoding and encoding of PixelBuffers: raw bytes, tolerant base64 (with or
// without a data-URL prefix), files, and the supported output formats.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use image::{DynamicImage, ImageFormat};
use retouch_core::OutputFormat;
use retouch_core::error::{Result, RetouchError};
use tracing::{debug, info, instrument};

use super::buffer::PixelBuffer;

/// Base64 engine that accepts missing or extra padding and non-canonical
/// trailing bits.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

impl PixelBuffer {
    // -- Decoding -------------------------------------------------------------

    /// Decode raw encoded bytes (PNG, JPEG, BMP, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| RetouchError::DecodeFailure(err.to_string()))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self::from_dynamic(&img))
    }

    /// Decode a base64 payload, tolerating a `data:<mime>;base64,` prefix,
    /// stray characters and missing padding.
    #[instrument(skip(input), fields(input_len = input.len()))]
    pub fn from_base64(input: &str) -> Result<Self> {
        let bytes = decode_base64(input)?;
        Self::from_bytes(&bytes)
    }

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        let buffer = Self::from_bytes(&data)?;
        info!(
            width = buffer.width(),
            height = buffer.height(),
            "Image loaded"
        );
        Ok(buffer)
    }

    // -- Encoding -------------------------------------------------------------

    /// Encode in `format`. `jpeg_quality` (1-100) only applies to JPEG.
    pub fn encode(&self, format: OutputFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Png => encode_to_format(&self.to_dynamic(), ImageFormat::Png),
            OutputFormat::Bmp => encode_to_format(&self.to_dynamic(), ImageFormat::Bmp),
            OutputFormat::Jpeg => self.to_jpeg_bytes(jpeg_quality),
        }
    }

    /// Encode the buffer as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encode_to_format(&self.to_dynamic(), ImageFormat::Png)
    }

    /// Encode the buffer as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        self.as_rgb()
            .write_with_encoder(encoder)
            .map_err(|err| RetouchError::EncodeFailure(format!("JPEG encoding failed: {err}")))?;
        Ok(buffer)
    }

    /// Write the buffer to a file. The format is inferred from the extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>, jpeg_quality: u8) -> Result<()> {
        let path = path.as_ref();
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(OutputFormat::from_extension)
            .ok_or_else(|| {
                RetouchError::InvalidParameter(format!(
                    "cannot infer an output format from {}",
                    path.display()
                ))
            })?;
        let bytes = self.encode(format, jpeg_quality)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Normalize caller-supplied base64 text: drop a data-URL prefix, strip
/// characters outside the standard alphabet, and pad to a multiple of 4.
pub fn normalize_base64(input: &str) -> String {
    let payload = match input.split_once(',') {
        Some((_, rest)) => rest.split(',').next().unwrap_or(rest),
        None => input,
    };
    let mut cleaned: String = payload
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();
    while cleaned.len() % 4 != 0 {
        cleaned.push('=');
    }
    cleaned
}

/// Decode caller-supplied base64 text into raw bytes.
pub fn decode_base64(input: &str) -> Result<Vec<u8>> {
    let normalized = normalize_base64(input);
    if normalized.is_empty() {
        return Err(RetouchError::DecodeFailure("no image data provided".into()));
    }
    debug!(length = normalized.len(), "Processing base64 data");
    LENIENT_BASE64
        .decode(normalized.as_bytes())
        .map_err(|err| RetouchError::DecodeFailure(format!("invalid base64: {err}")))
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| RetouchError::EncodeFailure(format!("image encoding failed: {err}")))?;
    Ok(buffer)
}
