// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ocrfix-pipeline — Orchestration from source document to searchable PDF.
//
// A document pipeline runs rasterize → recognise → correct → compose for every
// page, assembles the PDF and writes it atomically. The batch runner drives
// many documents and keeps one status per document.

pub mod batch;
pub mod outcome;
pub mod pipeline;
pub mod sidecar;
pub mod sink;

pub use batch::{
    BatchRunner, BatchSummary, DocumentResult, DocumentStatus, discover_inputs, output_path_for,
};
pub use outcome::DocumentOutcome;
pub use pipeline::{DocumentPipeline, hash_bytes};
pub use sidecar::SidecarTextProvider;
pub use sink::{CollectingSink, NullSink, ReportSink, TracingSink};
