// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single image files as one-page documents.

use std::path::Path;

use ocrfix_core::error::{OcrFixError, Result};
use ocrfix_core::{RasterPage, Rasterizer, SourceKind};
use tracing::{debug, instrument};

use super::metadata::detect_resolution;

/// Treats an image file as a document with exactly one page.
///
/// The page references the file instead of copying it; the image is read
/// again when the page is composed. The requested DPI is irrelevant here, the
/// scan already has its own density.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileRasterizer;

impl Rasterizer for ImageFileRasterizer {
    #[instrument(skip_all, fields(source = %source.display()))]
    fn render(&self, source: &Path, _dpi: u32) -> Result<Vec<RasterPage>> {
        let source_id = source.display().to_string();
        match SourceKind::from_path(source) {
            Some(kind) if kind.is_image() => {}
            _ => {
                return Err(OcrFixError::UnsupportedInput(format!(
                    "{source_id} is not a supported image file"
                )));
            }
        }

        let bytes = std::fs::read(source).map_err(|err| OcrFixError::Rasterization {
            source_id: source_id.clone(),
            detail: err.to_string(),
        })?;
        let mut page = RasterPage::from_path(0, source);
        if let Some(resolution) = detect_resolution(&bytes) {
            debug!(x = resolution.x, y = resolution.y, "embedded resolution found");
            page = page.with_resolution(resolution);
        }
        Ok(vec![page])
    }
}
