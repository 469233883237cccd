// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the host application.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the host presents the message.

use crate::error::RectipageError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth trying again as-is (interrupted or transient I/O).
    Transient,
    /// The user must change something (move a corner, pick another size).
    ActionRequired,
    /// Cannot be fixed by retrying — damaged file, bad settings file.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether repeating the same request could succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `RectipageError` into a `HumanError`.
pub fn humanize_error(err: &RectipageError) -> HumanError {
    match err {
        // -- Geometry errors --
        RectipageError::DegenerateConfiguration(_) => HumanError {
            message: "The corners don't outline a page.".into(),
            suggestion: "Drag the four corners onto the four corners of the document. No three of them may lie on one straight line.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        RectipageError::InvalidDimensions { width, height } => HumanError {
            message: "The output size is empty.".into(),
            suggestion: format!("Choose a width and height of at least one pixel each. (Requested: {width}x{height})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        RectipageError::InvalidCorners(detail) => HumanError {
            message: "The corner positions couldn't be read.".into(),
            suggestion: format!("Give exactly four corners as x,y pairs. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Pipeline errors --
        RectipageError::InvalidConfig(detail) => HumanError {
            message: "A setting has an invalid value.".into(),
            suggestion: format!("Check the settings and try again. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        RectipageError::Cancelled => HumanError {
            message: "Straightening was stopped.".into(),
            suggestion: "Start it again when you're ready.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        RectipageError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Storage --
        RectipageError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "The app doesn't have permission to use that file.".into(),
                suggestion: "Check the file permissions, or try copying the file to a different location first.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        RectipageError::Serialization(_) => HumanError {
            message: "The settings file couldn't be understood.".into(),
            suggestion: "Fix or delete the settings file; defaults will be used for anything missing.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_corners_need_action() {
        let err = RectipageError::DegenerateConfiguration("three corners are collinear".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn invalid_dimensions_mention_size() {
        let human = humanize_error(&RectipageError::InvalidDimensions {
            width: 0,
            height: 100,
        });
        assert!(human.suggestion.contains("0x100"));
    }

    #[test]
    fn cancelled_is_retriable() {
        let human = humanize_error(&RectipageError::Cancelled);
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn missing_file_needs_action() {
        let err = RectipageError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }
}
