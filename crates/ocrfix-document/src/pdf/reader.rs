// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — inspect existing PDF documents with `lopdf`: page sizes, text
// layers, and the scanned image behind each page.

use std::collections::HashSet;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use ocrfix_core::error::{OcrFixError, Result};
use tracing::{debug, info, instrument};

use super::encoding::decode_win_ansi;

const TEXT_SHOWING_OPERATORS: [&str; 4] = ["Tj", "TJ", "'", "\""];

/// Reads existing PDF files.
pub struct PdfReader {
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

/// A page's largest image XObject, borrowed from the document.
#[derive(Debug, Clone, Copy)]
pub struct PageImageRef<'a> {
    pub width: u32,
    pub height: u32,
    pub stream: &'a Stream,
}

/// A run of text drawn on a page, with the render mode it was drawn in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub render_mode: i64,
}

impl TextRun {
    /// Render mode 3 paints nothing.
    pub fn is_invisible(&self) -> bool {
        self.render_mode == 3
    }
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            OcrFixError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            OcrFixError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// MediaBox width and height of page `page_number` (1-indexed), in points.
    pub fn page_size(&self, page_number: u32) -> Result<(f32, f32)> {
        let page_id = self.page_id(page_number)?;
        let media_box = self
            .inherited(page_id, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .ok_or_else(|| {
                OcrFixError::PdfError(format!("page {page_number} has no MediaBox"))
            })?;
        let coords: Vec<f32> = media_box.iter().filter_map(number).collect();
        match coords.as_slice() {
            [x0, y0, x1, y1] => Ok(((x1 - x0).abs(), (y1 - y0).abs())),
            _ => Err(OcrFixError::PdfError(format!(
                "page {page_number} has a malformed MediaBox"
            ))),
        }
    }

    /// True when any page shows text, visible or not.
    #[instrument(skip(self))]
    pub fn has_text_layer(&self) -> bool {
        self.document.get_pages().keys().any(|&page_number| {
            self.page_content(page_number)
                .map(|content| {
                    content
                        .operations
                        .iter()
                        .any(|op| TEXT_SHOWING_OPERATORS.contains(&op.operator.as_str()))
                })
                .unwrap_or(false)
        })
    }

    // -- Extraction -----------------------------------------------------------

    /// Every text run on page `page_number` (1-indexed), in content order.
    ///
    /// Strings are decoded as WinAnsi. A run ends at each text positioning
    /// operator and at the end of each text object.
    #[instrument(skip(self))]
    pub fn text_runs(&self, page_number: u32) -> Result<Vec<TextRun>> {
        let content = self.page_content(page_number)?;

        let mut runs = Vec::new();
        let mut current = String::new();
        let mut render_mode = 0;
        let mut saved_modes = Vec::new();

        let mut flush = |current: &mut String, mode: i64| {
            if !current.is_empty() {
                runs.push(TextRun {
                    text: std::mem::take(current),
                    render_mode: mode,
                });
            }
        };

        for op in &content.operations {
            match op.operator.as_str() {
                "q" => saved_modes.push(render_mode),
                "Q" => render_mode = saved_modes.pop().unwrap_or(render_mode),
                "Tr" => {
                    flush(&mut current, render_mode);
                    if let Some(mode) = op.operands.first().and_then(number) {
                        render_mode = mode as i64;
                    }
                }
                "Td" | "TD" | "Tm" | "T*" | "ET" => flush(&mut current, render_mode),
                "Tj" | "'" | "\"" => {
                    if matches!(op.operator.as_str(), "'" | "\"") {
                        flush(&mut current, render_mode);
                    }
                    if let Some(Object::String(bytes, _)) = op.operands.last() {
                        current.push_str(&decode_win_ansi(bytes));
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        for item in items {
                            if let Object::String(bytes, _) = item {
                                current.push_str(&decode_win_ansi(bytes));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        flush(&mut current, render_mode);

        debug!(page_number, runs = runs.len(), "text runs extracted");
        Ok(runs)
    }

    /// Lines of the invisible text layer on page `page_number`, in order.
    pub fn invisible_text_lines(&self, page_number: u32) -> Result<Vec<String>> {
        Ok(self
            .text_runs(page_number)?
            .into_iter()
            .filter(TextRun::is_invisible)
            .map(|run| run.text)
            .collect())
    }

    /// The largest image XObject drawn from page `page_number`'s resources.
    pub fn largest_image(&self, page_number: u32) -> Result<Option<PageImageRef<'_>>> {
        let page_id = self.page_id(page_number)?;
        let Some(xobjects) = self
            .inherited(page_id, b"Resources")
            .and_then(|obj| self.resolve(obj).as_dict().ok())
            .and_then(|resources| resources.get(b"XObject").ok())
            .and_then(|obj| self.resolve(obj).as_dict().ok())
        else {
            return Ok(None);
        };

        let largest = xobjects
            .iter()
            .filter_map(|(_, obj)| self.resolve(obj).as_stream().ok())
            .filter(|stream| is_image(&stream.dict))
            .filter_map(|stream| {
                let width = stream.dict.get(b"Width").ok().and_then(number)? as u32;
                let height = stream.dict.get(b"Height").ok().and_then(number)? as u32;
                Some(PageImageRef {
                    width,
                    height,
                    stream,
                })
            })
            .max_by_key(|image| image.width as u64 * image.height as u64);
        Ok(largest)
    }

    // -- Internals ------------------------------------------------------------

    fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            OcrFixError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            ))
        })
    }

    fn page_content(&self, page_number: u32) -> Result<Content> {
        let page_id = self.page_id(page_number)?;
        let bytes = self.document.get_page_content(page_id).map_err(|err| {
            OcrFixError::PdfError(format!("failed to read content of page {page_number}: {err}"))
        })?;
        Content::decode(&bytes).map_err(|err| {
            OcrFixError::PdfError(format!("failed to parse content of page {page_number}: {err}"))
        })
    }

    /// Look up `key` on the page, walking up the page tree via /Parent.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut visited = HashSet::new();
        let mut current = page_id;
        // A malformed page tree may loop back through /Parent.
        while visited.insert(current) {
            let dict = self.document.get_object(current).ok()?.as_dict().ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            current = dict.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }

    /// Follow a single indirect reference.
    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.document.get_object(*id).unwrap_or(obj),
            other => other,
        }
    }
}

fn is_image(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}

/// Integer or real operand as `f32`.
pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}
