// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Header inspection for encoded page images: embedded resolution (PNG pHYs,
// JPEG JFIF density) and the JPEG frame header needed to embed a JPEG as-is.

use std::io::Cursor;

use image::ImageFormat;
use ocrfix_core::Resolution;
use tracing::debug;

const INCHES_PER_METRE: f32 = 0.0254;
const CM_PER_INCH: f32 = 2.54;

/// Resolution recorded in the image header, if any.
///
/// Only PNG and JPEG carry one reliably; other formats yield `None` and the
/// caller falls back to its default.
pub fn detect_resolution(bytes: &[u8]) -> Option<Resolution> {
    let resolution = match image::guess_format(bytes).ok()? {
        ImageFormat::Png => png_resolution(bytes),
        ImageFormat::Jpeg => parse_jpeg(bytes).and_then(|header| header.density),
        _ => None,
    };
    resolution.filter(Resolution::is_valid)
}

/// Read the `pHYs` chunk. Only the metre unit describes a physical density.
fn png_resolution(bytes: &[u8]) -> Option<Resolution> {
    let reader = png::Decoder::new(Cursor::new(bytes)).read_info().ok()?;
    let dims = reader.info().pixel_dims?;
    match dims.unit {
        png::Unit::Meter => Some(Resolution::new(
            per_metre_to_ppi(dims.xppu),
            per_metre_to_ppi(dims.yppu),
        )),
        png::Unit::Unspecified => {
            debug!("pHYs chunk carries only an aspect ratio");
            None
        }
    }
}

/// Pixels per metre to pixels per inch, rounded to 1/100 so that the usual
/// 11811 ppm reads back as 300.
fn per_metre_to_ppi(ppm: u32) -> f32 {
    (ppm as f32 * INCHES_PER_METRE * 100.0).round() / 100.0
}

/// The parts of a JPEG header the compositor cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JpegHeader {
    pub width: u32,
    pub height: u32,
    /// Colour components in the frame (1 = grey, 3 = YCbCr, 4 = CMYK).
    pub components: u8,
    /// Bits per sample.
    pub precision: u8,
    /// JFIF density, when the APP0 segment declares one.
    pub density: Option<Resolution>,
}

/// Walk the JPEG marker segments up to the first start-of-frame.
pub fn parse_jpeg(bytes: &[u8]) -> Option<JpegHeader> {
    if bytes.get(..2)? != [0xFF, 0xD8] {
        return None;
    }

    let mut density = None;
    let mut pos = 2;
    loop {
        // Fill bytes may precede a marker.
        while *bytes.get(pos)? == 0xFF && *bytes.get(pos + 1)? == 0xFF {
            pos += 1;
        }
        if *bytes.get(pos)? != 0xFF {
            return None;
        }
        let marker = *bytes.get(pos + 1)?;
        let length = u16::from_be_bytes([*bytes.get(pos + 2)?, *bytes.get(pos + 3)?]) as usize;
        if length < 2 {
            return None;
        }
        let segment = bytes.get(pos + 4..pos + 2 + length)?;

        match marker {
            0xE0 => density = density.or_else(|| jfif_density(segment)),
            // SOF0..SOF15 minus DHT, JPG and DAC.
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                let precision = *segment.first()?;
                let height = u16::from_be_bytes([*segment.get(1)?, *segment.get(2)?]) as u32;
                let width = u16::from_be_bytes([*segment.get(3)?, *segment.get(4)?]) as u32;
                let components = *segment.get(5)?;
                return Some(JpegHeader {
                    width,
                    height,
                    components,
                    precision,
                    density,
                });
            }
            // Start of scan or end of image before any frame header.
            0xDA | 0xD9 => return None,
            _ => {}
        }
        pos += 2 + length;
    }
}

/// Density from a JFIF APP0 payload. Unit 0 is only an aspect ratio.
fn jfif_density(segment: &[u8]) -> Option<Resolution> {
    if segment.get(..5)? != b"JFIF\0" {
        return None;
    }
    let unit = *segment.get(7)?;
    let x = u16::from_be_bytes([*segment.get(8)?, *segment.get(9)?]) as f32;
    let y = u16::from_be_bytes([*segment.get(10)?, *segment.get(11)?]) as f32;
    match unit {
        1 => Some(Resolution::new(x, y)),
        2 => Some(Resolution::new(x * CM_PER_INCH, y * CM_PER_INCH)),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal JPEG header: SOI, JFIF APP0 and a baseline SOF0 frame.
    pub(crate) fn jpeg_header_bytes(unit: u8, density: u16, width: u16, height: u16) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        bytes.extend_from_slice(b"JFIF\0");
        bytes.extend_from_slice(&[1, 2, unit]);
        bytes.extend_from_slice(&density.to_be_bytes());
        bytes.extend_from_slice(&density.to_be_bytes());
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 8]);
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&[3, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1]);
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        bytes
    }

    pub(crate) fn png_with_phys(width: u32, height: u32, ppm: Option<u32>) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            if let Some(ppm) = ppm {
                encoder.set_pixel_dims(Some(png::PixelDimensions {
                    xppu: ppm,
                    yppu: ppm,
                    unit: png::Unit::Meter,
                }));
            }
            let mut writer = encoder.write_header().unwrap();
            let data = vec![255u8; (width * height * 3) as usize];
            writer.write_image_data(&data).unwrap();
        }
        out
    }

    #[test]
    fn png_phys_in_metres_becomes_ppi() {
        let bytes = png_with_phys(4, 4, Some(11811));
        assert_eq!(detect_resolution(&bytes), Some(Resolution::uniform(300.0)));
    }

    #[test]
    fn png_without_phys_has_no_resolution() {
        assert_eq!(detect_resolution(&png_with_phys(4, 4, None)), None);
    }

    #[test]
    fn jfif_dpi_and_dpcm() {
        let dpi = jpeg_header_bytes(1, 200, 100, 50);
        assert_eq!(detect_resolution(&dpi), Some(Resolution::uniform(200.0)));

        let dpcm = jpeg_header_bytes(2, 100, 100, 50);
        let res = detect_resolution(&dpcm).unwrap();
        assert!((res.x - 254.0).abs() < 1e-3);

        // Aspect ratio only.
        assert_eq!(detect_resolution(&jpeg_header_bytes(0, 1, 100, 50)), None);
    }

    #[test]
    fn jpeg_frame_header_is_read() {
        let header = parse_jpeg(&jpeg_header_bytes(1, 300, 640, 480)).unwrap();
        assert_eq!((header.width, header.height), (640, 480));
        assert_eq!(header.components, 3);
        assert_eq!(header.precision, 8);
    }

    #[test]
    fn garbage_is_ignored() {
        assert_eq!(detect_resolution(b"not an image"), None);
        assert_eq!(parse_jpeg(&[0xFF, 0xD8, 0xFF]), None);
    }
}
