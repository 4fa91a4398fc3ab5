// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the ocrfix pipeline.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Pixels-per-inch assumed when nothing better is known.
pub const DEFAULT_PPI: f32 = 96.0;

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Horizontal and vertical pixel density of a raster page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: f32,
    pub y: f32,
}

impl Resolution {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Same density on both axes.
    pub fn uniform(ppi: f32) -> Self {
        Self { x: ppi, y: ppi }
    }

    /// Both axes finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::uniform(DEFAULT_PPI)
    }
}

/// Where the encoded pixels of a page live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterSource {
    /// Encoded image bytes held in memory (PNG, JPEG, ...).
    Bytes(Vec<u8>),
    /// An image file on disk, read when the page is composed.
    Path(PathBuf),
}

/// One rasterized page, produced by a [`crate::Rasterizer`] and consumed once
/// by the compositor.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterPage {
    /// Zero-based position of the page in its document.
    pub index: usize,
    /// Encoded image data or a reference to it.
    pub source: RasterSource,
    /// Resolution declared by the producer. When absent the compositor reads
    /// embedded image metadata and finally falls back to [`DEFAULT_PPI`].
    pub resolution: Option<Resolution>,
}

impl RasterPage {
    pub fn from_bytes(index: usize, bytes: Vec<u8>) -> Self {
        Self {
            index,
            source: RasterSource::Bytes(bytes),
            resolution: None,
        }
    }

    pub fn from_path(index: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            source: RasterSource::Path(path.into()),
            resolution: None,
        }
    }

    /// Attach a producer-declared resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// One-based page number for reports.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Borrow the encoded bytes, reading them from disk for path sources.
    pub fn load_bytes(&self) -> Result<Cow<'_, [u8]>> {
        match &self.source {
            RasterSource::Bytes(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
            RasterSource::Path(path) => Ok(Cow::Owned(std::fs::read(path)?)),
        }
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            RasterSource::Path(path) => Some(path),
            RasterSource::Bytes(_) => None,
        }
    }
}

/// Supported input document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Pdf,
    Png,
    Jpeg,
    Tiff,
    Bmp,
    Webp,
}

impl SourceKind {
    /// Infer the kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "tif" | "tiff" => Some(Self::Tiff),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Infer the kind from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// MIME type string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Tiff => "image/tiff",
            Self::Bmp => "image/bmp",
            Self::Webp => "image/webp",
        }
    }

    pub fn is_image(&self) -> bool {
        !matches!(self, Self::Pdf)
    }
}
