// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for page composition and PDF assembly.

use std::io::Cursor;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};

use ocrfix_core::{RasterPage, Resolution};
use ocrfix_document::{DocumentSynthesizer, PageCompositor};

/// A blank A4 scan at 150 ppi.
fn a4_scan() -> Vec<u8> {
    let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(1240, 1754, Luma([250])));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn register_text(rows: usize) -> String {
    (0..rows)
        .map(|row| format!("| 26437-RIA-001-DR-CLG-PC-{row:05} | Sheet {row} |"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_compose(c: &mut Criterion) {
    let page = RasterPage::from_bytes(0, a4_scan()).with_resolution(Resolution::uniform(150.0));
    let text = register_text(50);
    let compositor = PageCompositor::default();

    c.bench_function("compose A4 page (50 lines)", |b| {
        b.iter(|| {
            let out = compositor.compose(black_box(&page), black_box(&text)).unwrap();
            black_box(out.lines.len());
        });
    });
}

fn bench_assemble(c: &mut Criterion) {
    let page = RasterPage::from_bytes(0, a4_scan()).with_resolution(Resolution::uniform(150.0));
    let compositor = PageCompositor::default();
    let composed: Vec<_> = (0..5)
        .map(|_| compositor.compose(&page, &register_text(50)).unwrap())
        .collect();
    let synthesizer = DocumentSynthesizer::default();

    c.bench_function("assemble 5-page PDF", |b| {
        b.iter(|| {
            let bytes = synthesizer.assemble(black_box(&composed)).unwrap();
            black_box(bytes.len());
        });
    });
}

criterion_group!(benches, bench_compose, bench_assemble);
criterion_main!(benches);
