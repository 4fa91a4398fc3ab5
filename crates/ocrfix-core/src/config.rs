// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OcrFixError, Result};
use crate::types::DEFAULT_PPI;

/// Layout constants for the invisible text overlay, all in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Font size of the invisible glyphs.
    pub font_size: f32,
    /// Leading factor; natural line pitch is `font_size * leading`.
    pub leading: f32,
    /// Left margin of every overlay line.
    pub margin_x: f32,
    /// Top and bottom margin of the usable vertical span.
    pub margin_y: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            leading: 1.4,
            margin_x: 10.0,
            margin_y: 20.0,
        }
    }
}

impl OverlayConfig {
    /// Natural distance between two overlay baselines.
    pub fn line_height(&self) -> f32 {
        self.font_size * self.leading
    }
}

/// Settings for one ocrfix run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrFixConfig {
    /// Resolution requested from the rasterizer.
    pub render_dpi: u32,
    /// Pixels-per-inch assumed when a page image carries no resolution.
    pub default_resolution: f32,
    /// Invisible text layout.
    pub overlay: OverlayConfig,
    /// Also write the corrected text as a markdown file next to the PDF.
    pub write_markdown: bool,
    /// Separator placed between pages in the markdown artifact.
    pub page_separator: String,
    /// Pages processed concurrently per document (1 = sequential).
    pub workers: usize,
    /// Appended to the input stem when naming outputs in folder mode.
    pub output_suffix: String,
}

impl Default for OcrFixConfig {
    fn default() -> Self {
        Self {
            render_dpi: 300,
            default_resolution: DEFAULT_PPI,
            overlay: OverlayConfig::default(),
            write_markdown: false,
            page_separator: "\n\n---\n\n".to_string(),
            workers: 1,
            output_suffix: String::new(),
        }
    }
}

impl OcrFixConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject values the compositor or pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.render_dpi == 0 {
            return Err(OcrFixError::Config("render_dpi must be greater than 0".into()));
        }
        if !(self.default_resolution > 0.0) {
            return Err(OcrFixError::Config(format!(
                "default_resolution must be positive, got {}",
                self.default_resolution
            )));
        }
        if !(self.overlay.font_size > 0.0) || !(self.overlay.leading > 0.0) {
            return Err(OcrFixError::Config(
                "overlay font_size and leading must be positive".into(),
            ));
        }
        if self.overlay.margin_x < 0.0 || self.overlay.margin_y < 0.0 {
            return Err(OcrFixError::Config("overlay margins must not be negative".into()));
        }
        if self.workers == 0 {
            return Err(OcrFixError::Config("workers must be at least 1".into()));
        }
        Ok(())
    }
}
