// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document synthesizer — assembles composed pages into one searchable PDF
// using `lopdf`.
//
// Each page draws its image over the full MediaBox and then writes the
// corrected text with render mode 3 (neither fill nor stroke), so the glyphs
// are selectable and searchable but never visible.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use ocrfix_core::RasterPage;
use ocrfix_core::error::{OcrFixError, Result};
use tracing::{debug, info, instrument};

use super::compositor::{OutputPage, PageCompositor};
use crate::image::{ImageEncoding, PageImage};

const IMAGE_NAME: &str = "Im0";
const FONT_NAME: &str = "F1";
const INVISIBLE_RENDER_MODE: i64 = 3;
const PRODUCER: &str = "ocrfix";

/// Builds the output PDF, one page per input page and in input order.
#[derive(Debug, Clone, Default)]
pub struct DocumentSynthesizer {
    compositor: PageCompositor,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl DocumentSynthesizer {
    pub fn new(compositor: PageCompositor) -> Self {
        Self {
            compositor,
            title: None,
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn compositor(&self) -> &PageCompositor {
        &self.compositor
    }

    /// Compose every `(page, text)` pair and assemble the result.
    ///
    /// Any page that cannot be composed fails the whole document; a partial
    /// PDF is never returned.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn synthesize(&self, pages: &[(RasterPage, String)]) -> Result<Vec<u8>> {
        let composed = pages
            .iter()
            .map(|(page, text)| self.compositor.compose(page, text))
            .collect::<Result<Vec<_>>>()?;
        self.assemble(&composed)
    }

    /// Serialise already composed pages, in the order given.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn assemble(&self, pages: &[OutputPage]) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut kids = Vec::with_capacity(pages.len());
        for page in pages {
            let page_id = add_page(&mut doc, pages_id, font_id, page)?;
            kids.push(Object::Reference(page_id));
        }

        let page_count = kids.len();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut info_dict = dictionary! {
            "Producer" => Object::string_literal(PRODUCER),
        };
        if let Some(title) = &self.title {
            info_dict.set("Title", Object::string_literal(title.as_str()));
        }
        let info_id = doc.add_object(info_dict);
        doc.trailer.set("Info", info_id);

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|err| OcrFixError::PdfError(format!("failed to serialise PDF: {err}")))?;

        info!(pages = page_count, bytes = output.len(), "PDF assembled");
        Ok(output)
    }

    /// Assemble and write to `path`, returning the bytes written.
    pub fn write_to_file(&self, pages: &[OutputPage], path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let bytes = self.assemble(pages)?;
        std::fs::write(path.as_ref(), &bytes)?;
        debug!(path = %path.as_ref().display(), "PDF written");
        Ok(bytes)
    }
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    page: &OutputPage,
) -> Result<ObjectId> {
    let page_error = |detail: String| OcrFixError::Composition {
        page: page.index + 1,
        detail,
    };

    let image_id = doc.add_object(image_stream(&page.image).map_err(&page_error)?);

    let content = Content {
        operations: page_operations(page),
    };
    let encoded = content
        .encode()
        .map_err(|err| page_error(format!("failed to encode content stream: {err}")))?;
    let mut content_stream = Stream::new(Dictionary::new(), encoded);
    content_stream
        .compress()
        .map_err(|err| page_error(format!("failed to compress content stream: {err}")))?;
    let content_id = doc.add_object(content_stream);

    let mut resources = dictionary! {
        "XObject" => dictionary! { IMAGE_NAME => image_id },
    };
    if !page.lines.is_empty() {
        resources.set("Font", dictionary! { FONT_NAME => font_id });
    }

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(page.geometry.width_pt),
            Object::Real(page.geometry.height_pt),
        ],
        "Contents" => content_id,
        "Resources" => resources,
    });
    Ok(page_id)
}

/// Image first, then the invisible text block.
fn page_operations(page: &OutputPage) -> Vec<Operation> {
    let (w, h) = (page.geometry.width_pt, page.geometry.height_pt);
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![w.into(), 0f32.into(), 0f32.into(), h.into(), 0f32.into(), 0f32.into()],
        ),
        Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ];

    if page.lines.is_empty() {
        return ops;
    }

    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(FONT_NAME.as_bytes().to_vec()), page.font_size.into()],
    ));
    ops.push(Operation::new("Tr", vec![INVISIBLE_RENDER_MODE.into()]));
    for line in &page.lines {
        ops.push(Operation::new(
            "Tm",
            vec![1f32.into(), 0f32.into(), 0f32.into(), 1f32.into(), line.x.into(), line.y.into()],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(line.encoded.clone(), StringFormat::Literal)],
        ));
    }
    ops.push(Operation::new("ET", vec![]));
    ops
}

/// Image XObject for the page. JPEG data is embedded unchanged, raw samples
/// are Flate-compressed.
fn image_stream(image: &PageImage) -> std::result::Result<Stream, String> {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width as i64,
        "Height" => image.height as i64,
        "ColorSpace" => image.color.pdf_name(),
        "BitsPerComponent" => 8i64,
    };

    match image.encoding {
        ImageEncoding::Jpeg => {
            dict.set("Filter", "DCTDecode");
            Ok(Stream::new(dict, image.data.clone()).with_compression(false))
        }
        ImageEncoding::Raw => {
            let expected = image.width as usize * image.height as usize * image.color.channels();
            if image.data.len() != expected {
                return Err(format!(
                    "image has {} bytes of samples, expected {expected}",
                    image.data.len()
                ));
            }
            let mut stream = Stream::new(dict, image.data.clone());
            stream
                .compress()
                .map_err(|err| format!("failed to compress image: {err}"))?;
            Ok(stream)
        }
    }
}
