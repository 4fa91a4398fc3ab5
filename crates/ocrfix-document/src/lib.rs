// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ocrfix-document — Page images in, searchable PDF out.
//
// Provides the page rasterizers (image files, scanned PDFs), the page
// compositor and document synthesizer that lay an invisible text layer over
// each scan, a PDF reader for inspecting results, and optionally an on-device
// OCR engine.

pub mod image;
pub mod pdf;

#[cfg(feature = "ocr")]
pub mod ocr;

use std::path::Path;

use ocrfix_core::error::{OcrFixError, Result};
use ocrfix_core::{Rasterizer, SourceKind};

pub use crate::image::{ImageFileRasterizer, PageImage, detect_resolution};
pub use pdf::{DocumentSynthesizer, OutputPage, PageCompositor, PdfReader, ScannedPdfRasterizer};

#[cfg(feature = "ocr")]
pub use ocr::{LocalOcrConfig, LocalOcrEngine};

/// Pick the rasterizer for `source` by its extension.
pub fn rasterizer_for(source: &Path) -> Result<Box<dyn Rasterizer>> {
    match SourceKind::from_path(source) {
        Some(SourceKind::Pdf) => Ok(Box::new(ScannedPdfRasterizer)),
        Some(_) => Ok(Box::new(ImageFileRasterizer)),
        None => Err(OcrFixError::UnsupportedInput(format!(
            "{} has no supported extension",
            source.display()
        ))),
    }
}
