// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page compositor — pairs a page image with its corrected text.
//
// The page is sized so the image fills it at its native resolution; the text
// becomes an invisible layer that viewers can search and select.

use ocrfix_core::error::{OcrFixError, Result};
use ocrfix_core::{OcrFixConfig, OverlayConfig, POINTS_PER_INCH, RasterPage, Resolution};
use tracing::{debug, instrument, warn};

use super::encoding::encode_win_ansi;
use super::layout::layout_lines;
use crate::image::{PageImage, detect_resolution};

/// Page size in points together with the image it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
    pub resolution: Resolution,
}

impl PageGeometry {
    /// `pixels * 72 / ppi` on each axis.
    pub fn from_pixels(width_px: u32, height_px: u32, resolution: Resolution) -> Self {
        Self {
            width_pt: width_px as f32 * POINTS_PER_INCH / resolution.x,
            height_pt: height_px as f32 * POINTS_PER_INCH / resolution.y,
            resolution,
        }
    }
}

/// One line of the invisible text layer, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    /// WinAnsi bytes of `text`.
    pub encoded: Vec<u8>,
    pub x: f32,
    pub y: f32,
}

/// A composed page: explicit size, a visible image, and invisible text.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPage {
    /// Zero-based position in the source document.
    pub index: usize,
    pub geometry: PageGeometry,
    pub image: PageImage,
    pub font_size: f32,
    pub lines: Vec<PlacedLine>,
    /// Lines that did not fit below the last placed one.
    pub dropped_lines: usize,
    /// Lines the overlay font cannot encode.
    pub skipped_lines: usize,
}

/// Builds [`OutputPage`]s.
#[derive(Debug, Clone)]
pub struct PageCompositor {
    overlay: OverlayConfig,
    default_resolution: Resolution,
}

impl Default for PageCompositor {
    fn default() -> Self {
        Self::from_config(&OcrFixConfig::default())
    }
}

impl PageCompositor {
    pub fn new(overlay: OverlayConfig, default_resolution: Resolution) -> Self {
        Self {
            overlay,
            default_resolution,
        }
    }

    pub fn from_config(config: &OcrFixConfig) -> Self {
        Self::new(config.overlay, Resolution::uniform(config.default_resolution))
    }

    pub fn overlay(&self) -> &OverlayConfig {
        &self.overlay
    }

    /// Compose one page from its raster image and corrected text.
    ///
    /// Only an unusable image fails the page. A text line that cannot be
    /// encoded is skipped with a warning, so the page always keeps its image.
    #[instrument(skip_all, fields(page = page.number()))]
    pub fn compose(&self, page: &RasterPage, text: &str) -> Result<OutputPage> {
        let composition_error = |detail: String| OcrFixError::Composition {
            page: page.number(),
            detail,
        };

        let bytes = page
            .load_bytes()
            .map_err(|err| composition_error(format!("cannot read page image: {err}")))?;
        let image = PageImage::from_encoded(&bytes)
            .map_err(|err| composition_error(err.to_string()))?;
        let resolution = self.resolve_resolution(page, &bytes);
        let geometry = PageGeometry::from_pixels(image.width, image.height, resolution);
        drop(bytes);

        let raw_lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
        let layout = layout_lines(raw_lines.len(), geometry.height_pt, &self.overlay);
        if layout.dropped > 0 {
            warn!(
                dropped = layout.dropped,
                total = raw_lines.len(),
                "text overflows the page; trailing lines dropped"
            );
        }

        let mut lines = Vec::with_capacity(layout.placements.len());
        let mut skipped_lines = 0;
        for placement in &layout.placements {
            let line = raw_lines[placement.line];
            match encode_win_ansi(line) {
                Ok(encoded) => lines.push(PlacedLine {
                    text: line.to_string(),
                    encoded,
                    x: placement.x,
                    y: placement.y,
                }),
                Err(bad) => {
                    skipped_lines += 1;
                    warn!(
                        line = placement.line,
                        character = %bad.escape_unicode(),
                        "line skipped: overlay font cannot encode it"
                    );
                }
            }
        }

        debug!(
            width_pt = geometry.width_pt,
            height_pt = geometry.height_pt,
            lines = lines.len(),
            pitch = layout.pitch,
            "page composed"
        );

        Ok(OutputPage {
            index: page.index,
            geometry,
            image,
            font_size: self.overlay.font_size,
            lines,
            dropped_lines: layout.dropped,
            skipped_lines,
        })
    }

    /// Producer-declared resolution, then image metadata, then the default.
    fn resolve_resolution(&self, page: &RasterPage, bytes: &[u8]) -> Resolution {
        page.resolution
            .filter(Resolution::is_valid)
            .or_else(|| detect_resolution(bytes))
            .unwrap_or(self.default_resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::metadata::tests::png_with_phys;

    #[test]
    fn geometry_follows_resolution() {
        let g = PageGeometry::from_pixels(2480, 3508, Resolution::uniform(300.0));
        assert!((g.width_pt - 595.2).abs() < 0.01);
        assert!((g.height_pt - 841.92).abs() < 0.01);

        let g = PageGeometry::from_pixels(96, 192, Resolution::default());
        assert_eq!((g.width_pt, g.height_pt), (72.0, 144.0));
    }

    #[test]
    fn declared_resolution_wins_over_metadata() {
        let page = RasterPage::from_bytes(0, png_with_phys(300, 600, Some(11811)))
            .with_resolution(Resolution::uniform(150.0));
        let out = PageCompositor::default().compose(&page, "").unwrap();
        assert_eq!((out.geometry.width_pt, out.geometry.height_pt), (144.0, 288.0));
    }

    #[test]
    fn metadata_then_default_resolution() {
        let compositor = PageCompositor::default();
        let tagged = RasterPage::from_bytes(0, png_with_phys(300, 300, Some(11811)));
        assert_eq!(compositor.compose(&tagged, "").unwrap().geometry.width_pt, 72.0);

        let untagged = RasterPage::from_bytes(0, png_with_phys(96, 96, None));
        assert_eq!(compositor.compose(&untagged, "").unwrap().geometry.width_pt, 72.0);
    }

    #[test]
    fn blank_lines_are_not_placed() {
        let page = RasterPage::from_bytes(2, png_with_phys(600, 800, None));
        let out = PageCompositor::default()
            .compose(&page, "first\n\n   \nsecond\n")
            .unwrap();
        assert_eq!(out.index, 2);
        let texts: Vec<&str> = out.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert!(out.lines[0].y > out.lines[1].y);
    }

    #[test]
    fn unencodable_line_is_skipped_not_fatal() {
        let page = RasterPage::from_bytes(0, png_with_phys(600, 800, None));
        let out = PageCompositor::default()
            .compose(&page, "keep me\n→ arrow\nme too")
            .unwrap();
        assert_eq!(out.skipped_lines, 1);
        let texts: Vec<&str> = out.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["keep me", "me too"]);
    }

    #[test]
    fn broken_image_fails_the_page() {
        let page = RasterPage::from_bytes(4, b"garbage".to_vec());
        let err = PageCompositor::default().compose(&page, "text").unwrap_err();
        assert!(matches!(err, OcrFixError::Composition { page: 5, .. }));
    }

    #[test]
    fn header_only_jpeg_fails_the_page() {
        let bytes = crate::image::metadata::tests::jpeg_header_bytes(1, 300, 64, 32);
        let page = RasterPage::from_bytes(0, bytes);
        let err = PageCompositor::default().compose(&page, "text").unwrap_err();
        assert!(matches!(err, OcrFixError::Composition { page: 1, .. }));
    }
}
