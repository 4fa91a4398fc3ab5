// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR provider that replays recorded text from files next to the source.
//
// Lookup for page n of `plan.pdf` (first match wins):
//   plan.p<n>.md, plan.p<n>.txt   one file per page
//   plan.md, plan.txt             whole document, pages split on the separator
//
// For an image source the whole-document file is the page text as is.

use std::path::{Path, PathBuf};

use ocrfix_core::error::{OcrFixError, Result};
use ocrfix_core::{OcrProvider, RasterPage, SourceKind};
use tracing::{debug, instrument};

const EXTENSIONS: [&str; 2] = ["md", "txt"];

/// Reads recorded OCR output instead of running recognition.
#[derive(Debug, Clone)]
pub struct SidecarTextProvider {
    /// Directory holding the text files. `None` means next to the source.
    dir: Option<PathBuf>,
    separator: String,
}

impl SidecarTextProvider {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            dir: None,
            separator: separator.into(),
        }
    }

    /// Look for the text files in `dir` instead of beside the source.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    fn base_dir<'a>(&'a self, source: &'a Path) -> &'a Path {
        self.dir
            .as_deref()
            .or_else(|| source.parent())
            .unwrap_or_else(|| Path::new("."))
    }
}

impl OcrProvider for SidecarTextProvider {
    fn name(&self) -> &str {
        "sidecar"
    }

    #[instrument(skip_all, fields(source = %source.display(), page = page.number()))]
    fn recognize(&self, source: &Path, page: &RasterPage) -> Result<String> {
        let ocr_error = |detail: String| OcrFixError::Ocr {
            source_id: source.display().to_string(),
            page: page.number(),
            detail,
        };
        let stem = source
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| ocr_error("source has no file name".into()))?;
        let dir = self.base_dir(source);

        for ext in EXTENSIONS {
            let path = dir.join(format!("{stem}.p{}.{ext}", page.number()));
            if path.is_file() {
                debug!(path = %path.display(), "per-page text found");
                return std::fs::read_to_string(&path).map_err(|err| ocr_error(err.to_string()));
            }
        }

        for ext in EXTENSIONS {
            let path = dir.join(format!("{stem}.{ext}"));
            if !path.is_file() {
                continue;
            }
            let text = std::fs::read_to_string(&path).map_err(|err| ocr_error(err.to_string()))?;
            let is_image = SourceKind::from_path(source).is_some_and(|kind| kind.is_image());
            if is_image {
                return Ok(text);
            }
            return text
                .split(self.separator.as_str())
                .nth(page.index)
                .map(str::to_string)
                .ok_or_else(|| {
                    ocr_error(format!(
                        "{} has no section for this page",
                        path.display()
                    ))
                });
        }

        Err(ocr_error(format!(
            "no recorded text for {stem} in {}",
            dir.display()
        )))
    }
}
