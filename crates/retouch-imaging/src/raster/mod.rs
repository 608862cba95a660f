// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module: the in-memory RGB buffer and its codecs.

pub mod buffer;
pub mod codec;

pub use buffer::PixelBuffer;
pub use codec::{decode_base64, normalize_base64};
