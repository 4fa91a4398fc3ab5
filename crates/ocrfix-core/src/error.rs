// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for ocrfix.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline stage an error belongs to, used for per-document batch status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Setup,
    Rasterize,
    Ocr,
    Compose,
    Persist,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::Rasterize => "rasterize",
            Self::Ocr => "ocr",
            Self::Compose => "compose",
            Self::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// Top-level error type for all ocrfix operations.
#[derive(Debug, Error)]
pub enum OcrFixError {
    // -- Pipeline stages --
    #[error("rasterization of {source_id} failed: {detail}")]
    Rasterization { source_id: String, detail: String },

    #[error("OCR of {source_id} page {page} failed: {detail}")]
    Ocr {
        source_id: String,
        page: usize,
        detail: String,
    },

    #[error("composition of page {page} failed: {detail}")]
    Composition { page: usize, detail: String },

    // -- Document / image data --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    // -- Setup --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("processing cancelled")]
    Cancelled,

    #[error("worker task failed: {0}")]
    Worker(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OcrFixError {
    /// The pipeline stage this error is attributed to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Rasterization { .. } | Self::UnsupportedInput(_) => Stage::Rasterize,
            Self::Ocr { .. } => Stage::Ocr,
            Self::Composition { .. } | Self::ImageError(_) | Self::PdfError(_) => Stage::Compose,
            Self::Io(_) | Self::Serialization(_) => Stage::Persist,
            Self::Config(_) | Self::Cancelled | Self::Worker(_) => Stage::Setup,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, OcrFixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_follow_variants() {
        let err = OcrFixError::Ocr {
            source_id: "a.pdf".into(),
            page: 2,
            detail: "timeout".into(),
        };
        assert_eq!(err.stage(), Stage::Ocr);
        assert_eq!(err.to_string(), "OCR of a.pdf page 2 failed: timeout");

        let io = OcrFixError::from(std::io::Error::other("disk full"));
        assert_eq!(io.stage(), Stage::Persist);
        assert_eq!(OcrFixError::PdfError("x".into()).stage(), Stage::Compose);
    }

    #[test]
    fn every_stage_is_reachable() {
        let errors = [
            OcrFixError::Config("x".into()),
            OcrFixError::UnsupportedInput("x".into()),
            OcrFixError::Ocr {
                source_id: "a".into(),
                page: 1,
                detail: "x".into(),
            },
            OcrFixError::Composition {
                page: 1,
                detail: "x".into(),
            },
            OcrFixError::from(std::io::Error::other("x")),
        ];
        let stages: Vec<Stage> = errors.iter().map(OcrFixError::stage).collect();
        assert_eq!(
            stages,
            [
                Stage::Setup,
                Stage::Rasterize,
                Stage::Ocr,
                Stage::Compose,
                Stage::Persist
            ]
        );
        let names: Vec<String> = stages.iter().map(Stage::to_string).collect();
        assert_eq!(names, ["setup", "rasterize", "ocr", "compose", "persist"]);
    }
}
