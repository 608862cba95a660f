// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the editor UI.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how a front end presents it.

use crate::error::RetouchError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something on our side hiccupped; trying again may work.
    Transient,
    /// The user must change their input (different file, other value).
    ActionRequired,
    /// Cannot be fixed by retrying or changing input.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether retrying the same request could succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `RetouchError` into a `HumanError`.
pub fn humanize_error(err: &RetouchError) -> HumanError {
    match err {
        RetouchError::DecodeFailure(_) => HumanError {
            message: "We couldn't open this image.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try saving it as a PNG or JPEG first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        RetouchError::InvalidParameter(detail) => HumanError {
            message: "One of the settings isn't valid.".into(),
            suggestion: format!("Check the values you entered and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        RetouchError::UnsupportedFilter(kind) => HumanError {
            message: "That filter isn't available.".into(),
            suggestion: format!(
                "Choose one of brightness, contrast, grayscale, sepia or blur. (Requested: {kind})"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        RetouchError::TextNotFound(text) => HumanError {
            message: "We couldn't find that text in the photo.".into(),
            suggestion: format!(
                "Make sure \"{text}\" is typed exactly as it appears, as a single word, and that it is clearly readable."
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        RetouchError::EngineUnavailable(_) => HumanError {
            message: "Text recognition isn't working right now.".into(),
            suggestion: "The recognition models may be missing. Check the OCR model directory in the settings, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        RetouchError::FontUnavailable(_) => HumanError {
            message: "No font is available to draw text.".into(),
            suggestion: "Install a TrueType font or add a font directory in the settings.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        RetouchError::EncodeFailure(_) => HumanError {
            message: "We couldn't save the edited image.".into(),
            suggestion: "Try saving in a different format such as PNG.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        RetouchError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "We don't have permission to use this file.".into(),
                    suggestion: "Check the file's permissions or pick a different location.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Make sure there is enough disk space and try again.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        RetouchError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "The file may have a typo. Fix it or delete it to go back to the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
