// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end checks of the searchable PDF: compose pages, write them, and
// read the invisible text layer back.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use ocrfix_core::{OverlayConfig, RasterPage, Resolution};
use ocrfix_document::{DocumentSynthesizer, PageCompositor, PdfReader};

fn scan(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([240])));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn page(index: usize, width: u32, height: u32) -> RasterPage {
    RasterPage::from_bytes(index, scan(width, height)).with_resolution(Resolution::uniform(72.0))
}

#[test]
fn invisible_text_reads_back_in_order() {
    let text = "Drawing Register\n\n| 26437-RIA-001-DR-CLG-PC-00205 | General Arrangement |\n  \nIssued for construction\n";
    let pdf = DocumentSynthesizer::default()
        .synthesize(&[(page(0, 612, 792), text.to_string())])
        .unwrap();

    let reader = PdfReader::from_bytes(&pdf).unwrap();
    assert_eq!(reader.page_count(), 1);
    assert!(reader.has_text_layer());

    let expected: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    assert_eq!(reader.invisible_text_lines(1).unwrap(), expected);

    // Nothing visible was written.
    let runs = reader.text_runs(1).unwrap();
    assert!(runs.iter().all(|run| run.is_invisible()));
}

#[test]
fn one_output_page_per_input_page_in_order() {
    let inputs: Vec<(RasterPage, String)> = (0..4)
        .map(|i| (page(i, 100 + i as u32 * 10, 200), format!("page {}", i + 1)))
        .collect();
    let pdf = DocumentSynthesizer::default().synthesize(&inputs).unwrap();

    let reader = PdfReader::from_bytes(&pdf).unwrap();
    assert_eq!(reader.page_count(), 4);
    for number in 1..=4u32 {
        let (width, height) = reader.page_size(number).unwrap();
        assert!((width - (90.0 + number as f32 * 10.0)).abs() < 0.01);
        assert!((height - 200.0).abs() < 0.01);
        assert_eq!(
            reader.invisible_text_lines(number).unwrap(),
            vec![format!("page {number}")]
        );
    }
}

#[test]
fn page_size_follows_image_resolution() {
    let p = RasterPage::from_bytes(0, scan(600, 300)).with_resolution(Resolution::uniform(300.0));
    let pdf = DocumentSynthesizer::default()
        .synthesize(&[(p, String::new())])
        .unwrap();
    let reader = PdfReader::from_bytes(&pdf).unwrap();
    let (width, height) = reader.page_size(1).unwrap();
    assert!((width - 144.0).abs() < 0.01);
    assert!((height - 72.0).abs() < 0.01);
    assert!(!reader.has_text_layer());
    assert!(reader.largest_image(1).unwrap().is_some());
}

#[test]
fn compressed_pitch_keeps_every_line() {
    // usable span 70pt: 6 lines need 84pt at natural pitch.
    let text = (1..=6).map(|i| format!("row {i}")).collect::<Vec<_>>().join("\n");
    let out = PageCompositor::default().compose(&page(0, 200, 110), &text).unwrap();
    assert_eq!(out.lines.len(), 6);
    assert_eq!(out.dropped_lines, 0);
    let pitch = out.lines[0].y - out.lines[1].y;
    assert!(pitch < OverlayConfig::default().line_height());
}

#[test]
fn overflowing_page_drops_trailing_lines_deterministically() {
    // usable span 28pt: pitch 5.6 leaves the fifth baseline past the margin.
    let text = "one\ntwo\nthree\nfour\nfive";
    let compositor = PageCompositor::default();
    let first = compositor.compose(&page(0, 200, 68), text).unwrap();
    let second = compositor.compose(&page(0, 200, 68), text).unwrap();
    assert_eq!(first, second);

    let kept: Vec<&str> = first.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(kept, vec!["one", "two", "three", "four"]);
    assert_eq!(first.dropped_lines, 1);

    let pdf = DocumentSynthesizer::default().assemble(std::slice::from_ref(&first)).unwrap();
    let reader = PdfReader::from_bytes(&pdf).unwrap();
    assert_eq!(reader.invisible_text_lines(1).unwrap(), kept);
}

#[test]
fn unencodable_line_keeps_the_page() {
    let pdf = DocumentSynthesizer::default()
        .synthesize(&[(page(0, 300, 300), "before\n箭头 → after\nafter".to_string())])
        .unwrap();
    let reader = PdfReader::from_bytes(&pdf).unwrap();
    assert_eq!(reader.page_count(), 1);
    assert_eq!(reader.invisible_text_lines(1).unwrap(), vec!["before", "after"]);
    assert!(reader.largest_image(1).unwrap().is_some());
}

#[test]
fn special_characters_survive_the_round_trip() {
    let text = "Note (see detail 4) \\ back-slash, café — 5€";
    let pdf = DocumentSynthesizer::default()
        .synthesize(&[(page(0, 400, 200), text.to_string())])
        .unwrap();
    let reader = PdfReader::from_bytes(&pdf).unwrap();
    assert_eq!(reader.invisible_text_lines(1).unwrap(), vec![text]);
}

#[test]
fn jpeg_scan_is_embedded() {
    let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 32, Luma([128])));
    let mut jpeg = Cursor::new(Vec::new());
    img.write_to(&mut jpeg, ImageFormat::Jpeg).unwrap();
    let p = RasterPage::from_bytes(0, jpeg.into_inner()).with_resolution(Resolution::uniform(64.0));

    let pdf = DocumentSynthesizer::default()
        .synthesize(&[(p, "jpeg page".to_string())])
        .unwrap();
    let reader = PdfReader::from_bytes(&pdf).unwrap();
    let image = reader.largest_image(1).unwrap().unwrap();
    assert_eq!((image.width, image.height), (64, 32));
    let (width, _) = reader.page_size(1).unwrap();
    assert!((width - 72.0).abs() < 0.01);
}
