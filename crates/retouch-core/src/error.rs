// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Retouch.

use thiserror::Error;

/// Top-level error type for all Retouch operations.
#[derive(Debug, Error)]
pub enum RetouchError {
    // -- Caller input errors --
    #[error("failed to decode image: {0}")]
    DecodeFailure(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("text not found in image: {0}")]
    TextNotFound(String),

    // -- Engine / rendering errors --
    #[error("text recognition engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("no usable font: {0}")]
    FontUnavailable(String),

    #[error("failed to encode image: {0}")]
    EncodeFailure(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RetouchError>;
