// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — page composition, searchable-PDF output, and reading scanned
// PDFs back in.

pub mod compositor;
pub mod encoding;
pub mod layout;
pub mod rasterizer;
pub mod reader;
pub mod writer;

pub use compositor::{OutputPage, PageCompositor, PageGeometry, PlacedLine};
pub use layout::{LinePlacement, OverlayLayout, layout_lines};
pub use rasterizer::ScannedPdfRasterizer;
pub use reader::{PdfReader, TextRun};
pub use writer::DocumentSynthesizer;
