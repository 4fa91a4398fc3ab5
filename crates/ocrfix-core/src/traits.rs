// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// External collaborators consumed by the pipeline. Implementations live in
// other crates (or outside this workspace entirely).

use std::path::Path;

use crate::error::Result;
use crate::types::RasterPage;

/// Turns a source document into an ordered list of flat page images.
///
/// Implementations discard any pre-existing text layer by construction.
pub trait Rasterizer: Send + Sync {
    /// Render every page of `source` at roughly `dpi`. Pages are returned in
    /// document order with `index` set to their position.
    fn render(&self, source: &Path, dpi: u32) -> Result<Vec<RasterPage>>;
}

/// Recognises the text on one page image.
///
/// A failure is surfaced to the caller; implementations must not retry.
pub trait OcrProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Return the raw (markdown or plain) text of `page`.
    fn recognize(&self, source: &Path, page: &RasterPage) -> Result<String>;
}
