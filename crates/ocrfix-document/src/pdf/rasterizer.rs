// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanned PDFs as page images: each page yields the scan it displays.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::Object;
use ocrfix_core::error::{OcrFixError, Result};
use ocrfix_core::{POINTS_PER_INCH, RasterPage, Rasterizer, Resolution};
use tracing::{debug, info, instrument, warn};

use super::reader::{PageImageRef, PdfReader};

/// Extracts the largest image of every page of a scanned PDF.
///
/// JPEG (`DCTDecode`) scans are handed on unchanged; 8-bit grey or RGB Flate
/// images are re-encoded as PNG. Anything drawn on top of the scan, an old
/// text layer included, is left behind. The requested DPI is not used: the
/// page resolution is the scan's own, derived from the MediaBox.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScannedPdfRasterizer;

impl Rasterizer for ScannedPdfRasterizer {
    #[instrument(skip_all, fields(source = %source.display()))]
    fn render(&self, source: &Path, _dpi: u32) -> Result<Vec<RasterPage>> {
        let source_id = source.display().to_string();
        let rasterization_error = |detail: String| OcrFixError::Rasterization {
            source_id: source_id.clone(),
            detail,
        };

        let reader = PdfReader::open(source).map_err(|err| rasterization_error(err.to_string()))?;
        if reader.has_text_layer() {
            info!("source already has a text layer; it will be replaced");
        }

        let page_count = reader.page_count();
        let mut pages = Vec::with_capacity(page_count);
        for page_number in 1..=page_count as u32 {
            let image = reader
                .largest_image(page_number)
                .map_err(|err| rasterization_error(err.to_string()))?
                .ok_or_else(|| {
                    rasterization_error(format!("page {page_number} has no image to extract"))
                })?;
            let bytes = encoded_image(&image)
                .map_err(|detail| rasterization_error(format!("page {page_number}: {detail}")))?;

            let mut page = RasterPage::from_bytes(page_number as usize - 1, bytes);
            match reader.page_size(page_number) {
                Ok((width_pt, height_pt)) if width_pt > 0.0 && height_pt > 0.0 => {
                    page = page.with_resolution(Resolution::new(
                        image.width as f32 * POINTS_PER_INCH / width_pt,
                        image.height as f32 * POINTS_PER_INCH / height_pt,
                    ));
                }
                _ => warn!(page_number, "no usable MediaBox; resolution left to the compositor"),
            }
            debug!(page_number, width = image.width, height = image.height, "page image extracted");
            pages.push(page);
        }

        Ok(pages)
    }
}

/// Encoded bytes of an image XObject: JPEG as stored, Flate samples as PNG.
fn encoded_image(image: &PageImageRef<'_>) -> std::result::Result<Vec<u8>, String> {
    let dict = &image.stream.dict;
    let filters: Vec<&[u8]> = match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.as_slice()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok())
            .collect(),
        _ => Vec::new(),
    };

    if filters == [b"DCTDecode".as_slice()] {
        return Ok(image.stream.content.clone());
    }
    if !filters.iter().all(|f| *f == b"FlateDecode") {
        return Err(format!(
            "unsupported image filter {:?}",
            filters
                .iter()
                .map(|f| String::from_utf8_lossy(f))
                .collect::<Vec<_>>()
        ));
    }

    let bits = dict.get(b"BitsPerComponent").ok().and_then(|obj| obj.as_i64().ok());
    if bits != Some(8) {
        return Err(format!("unsupported bits per component {bits:?}"));
    }
    let samples = if filters.is_empty() {
        image.stream.content.clone()
    } else {
        image
            .stream
            .decompressed_content()
            .map_err(|err| format!("cannot decompress image: {err}"))?
    };

    let color_space = dict.get(b"ColorSpace").ok().and_then(|obj| obj.as_name().ok());
    let decoded = match color_space {
        Some(b"DeviceRGB") => RgbImage::from_raw(image.width, image.height, samples)
            .map(DynamicImage::ImageRgb8),
        Some(b"DeviceGray") => GrayImage::from_raw(image.width, image.height, samples)
            .map(DynamicImage::ImageLuma8),
        other => {
            return Err(format!(
                "unsupported colour space {:?}",
                other.map(String::from_utf8_lossy)
            ));
        }
    }
    .ok_or_else(|| "image samples do not match its dimensions".to_string())?;

    let mut png = Cursor::new(Vec::new());
    decoded
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|err| format!("cannot encode page as PNG: {err}"))?;
    Ok(png.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentSynthesizer;
    use crate::image::metadata::tests::png_with_phys;

    #[test]
    fn round_trips_a_synthesized_scan() {
        // 300x600 px at 150 ppi -> 144x288 pt.
        let page = RasterPage::from_bytes(0, png_with_phys(300, 600, None))
            .with_resolution(Resolution::uniform(150.0));
        let pdf = DocumentSynthesizer::default()
            .synthesize(&[(page, "old text layer".to_string())])
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, pdf).unwrap();

        let pages = ScannedPdfRasterizer.render(&path, 300).unwrap();
        assert_eq!(pages.len(), 1);
        let resolution = pages[0].resolution.unwrap();
        assert!((resolution.x - 150.0).abs() < 0.01);
        assert!((resolution.y - 150.0).abs() < 0.01);

        let bytes = pages[0].load_bytes().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 600));
    }

    #[test]
    fn missing_file_is_a_rasterization_error() {
        let err = ScannedPdfRasterizer
            .render(Path::new("/nonexistent/doc.pdf"), 300)
            .unwrap_err();
        assert!(matches!(err, OcrFixError::Rasterization { .. }));
    }
}
