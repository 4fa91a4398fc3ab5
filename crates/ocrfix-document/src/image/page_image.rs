// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page image prepared for embedding as a PDF image XObject.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use ocrfix_core::error::{OcrFixError, Result};
use tracing::{debug, instrument};

use super::metadata::parse_jpeg;

/// PDF colour space of the embedded samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Rgb,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Gray => "DeviceGray",
            Self::Rgb => "DeviceRGB",
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
        }
    }
}

/// How `data` is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    /// Baseline JPEG bytes, embedded unchanged under `DCTDecode`.
    Jpeg,
    /// Raw 8-bit samples, Flate-compressed by the writer.
    Raw,
}

/// Pixel data of one page, exactly as it will be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub width: u32,
    pub height: u32,
    pub color: ColorSpace,
    pub encoding: ImageEncoding,
    pub data: Vec<u8>,
}

impl PageImage {
    /// Prepare encoded image bytes for embedding.
    ///
    /// 8-bit grey or YCbCr JPEGs are kept as they are; every other input is
    /// decoded to 8-bit grey or RGB samples, with transparency flattened onto
    /// white.
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    pub fn from_encoded(bytes: &[u8]) -> Result<Self> {
        if let Some(image) = Self::jpeg_passthrough(bytes)? {
            debug!(width = image.width, height = image.height, "JPEG embedded as-is");
            return Ok(image);
        }

        let decoded = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|err| OcrFixError::ImageError(format!("failed to read image: {err}")))?
            .decode()
            .map_err(|err| OcrFixError::ImageError(format!("failed to decode image: {err}")))?;

        let image = Self::from_dynamic(&decoded);
        if image.width == 0 || image.height == 0 {
            return Err(OcrFixError::ImageError("image has no pixels".into()));
        }
        debug!(
            width = image.width,
            height = image.height,
            color = ?image.color,
            "image decoded for embedding"
        );
        Ok(image)
    }

    /// Convert decoded pixels to raw samples.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let color_type = image.color();
        let (color, data) = match (color_type.has_color(), color_type.has_alpha()) {
            (false, false) => (ColorSpace::Gray, image.to_luma8().into_raw()),
            (true, false) => (ColorSpace::Rgb, image.to_rgb8().into_raw()),
            (_, true) => (ColorSpace::Rgb, flatten_on_white(image).into_raw()),
        };
        Self {
            width,
            height,
            color,
            encoding: ImageEncoding::Raw,
            data,
        }
    }

    /// `Ok(None)` when the bytes are not a JPEG that can be embedded as is.
    /// A JPEG that would be embedded but does not decode is an error, since
    /// the PDF viewer would fail on it later.
    fn jpeg_passthrough(bytes: &[u8]) -> Result<Option<Self>> {
        if !matches!(image::guess_format(bytes), Ok(ImageFormat::Jpeg)) {
            return Ok(None);
        }
        let Some(header) = parse_jpeg(bytes) else {
            return Ok(None);
        };
        let color = match (header.precision, header.components) {
            (8, 1) => ColorSpace::Gray,
            (8, 3) => ColorSpace::Rgb,
            _ => return Ok(None),
        };
        if header.width == 0 || header.height == 0 {
            return Ok(None);
        }

        if !bytes.windows(2).any(|marker| marker == [0xFF, 0xD9]) {
            return Err(OcrFixError::ImageError(
                "JPEG data is truncated (no end-of-image marker)".into(),
            ));
        }
        ImageReader::with_format(Cursor::new(bytes), ImageFormat::Jpeg)
            .decode()
            .map_err(|err| OcrFixError::ImageError(format!("corrupt JPEG data: {err}")))?;

        Ok(Some(Self {
            width: header.width,
            height: header.height,
            color,
            encoding: ImageEncoding::Jpeg,
            data: bytes.to_vec(),
        }))
    }
}

fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| ((c as u16 * a as u16 + 255 * (255 - a as u16)) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}
