// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — header metadata, embeddable page images, and image-file input.

pub mod metadata;
pub mod page_image;
pub mod rasterizer;

pub use metadata::detect_resolution;
pub use page_image::{ColorSpace, ImageEncoding, PageImage};
pub use rasterizer::ImageFileRasterizer;
