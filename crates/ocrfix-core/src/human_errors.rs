// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for batch status output.
//
// Every technical error is mapped to a short plain-English message with a
// suggestion. Severity tells the caller whether running again can help.

use crate::error::OcrFixError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Provider hiccup or timeout; running the document again may succeed.
    Transient,
    /// The operator must fix something (missing file, bad flag, bad config).
    ActionRequired,
    /// The input itself cannot be processed.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert an `OcrFixError` into a `HumanError`.
pub fn humanize_error(err: &OcrFixError) -> HumanError {
    match err {
        OcrFixError::Rasterization { source_id, .. } => HumanError {
            message: format!("Couldn't read the pages of {source_id}."),
            suggestion: "The file may be damaged or contain no scanned page images. Re-export it as an image-only PDF or as page images.".into(),
            severity: Severity::Permanent,
        },

        OcrFixError::Ocr { page, .. } => HumanError {
            message: format!("Text recognition failed on page {page}."),
            suggestion: "The OCR provider returned an error. Run the document again; if it keeps failing, check the provider setup.".into(),
            severity: Severity::Transient,
        },

        OcrFixError::Composition { page, .. } => HumanError {
            message: format!("Page {page} couldn't be assembled into the output PDF."),
            suggestion: "The page image may be in an unusual format. Convert it to PNG or JPEG and try again.".into(),
            severity: Severity::Permanent,
        },

        OcrFixError::ImageError(_) => HumanError {
            message: "There's a problem with a page image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as PNG first.".into(),
            severity: Severity::Permanent,
        },

        OcrFixError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged. Try opening it in a viewer first to check it works.".into(),
            severity: Severity::Permanent,
        },

        OcrFixError::UnsupportedInput(detail) => HumanError {
            message: "This type of file isn't supported.".into(),
            suggestion: format!("Use a PDF or a PNG/JPEG/TIFF page image. ({detail})"),
            severity: Severity::Permanent,
        },

        OcrFixError::Config(detail) => HumanError {
            message: "The configuration isn't valid.".into(),
            suggestion: format!("Fix the setting and run again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        OcrFixError::Cancelled => HumanError {
            message: "Processing was stopped.".into(),
            suggestion: "Run the command again to process the remaining files.".into(),
            severity: Severity::ActionRequired,
        },

        OcrFixError::Worker(_) => HumanError {
            message: "Processing stopped unexpectedly.".into(),
            suggestion: "Run the document again. If it keeps happening, report it with the log output.".into(),
            severity: Severity::Transient,
        },

        OcrFixError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "A file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Permission denied while reading or writing a file.".into(),
                suggestion: "Check the permissions of the input file and output folder.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                severity: Severity::Transient,
            },
        },

        OcrFixError::Serialization(_) => HumanError {
            message: "A settings or report file couldn't be read.".into(),
            suggestion: "Check that the file is valid JSON.".into(),
            severity: Severity::ActionRequired,
        },
    }
}
