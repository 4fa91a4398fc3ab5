// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report sinks — where per-page correction reports go.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ocrfix_correct::PageCorrectionReport;
use tracing::info;

use crate::outcome::DocumentOutcome;

/// Receives reports while documents are processed.
///
/// Page reports arrive in page order for each document. Formatting is the
/// sink's business.
pub trait ReportSink: Send + Sync {
    fn page_corrected(&self, source: &Path, report: &PageCorrectionReport);

    fn document_finished(&self, _outcome: &DocumentOutcome) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn page_corrected(&self, _source: &Path, _report: &PageCorrectionReport) {}
}

/// Emits one structured log event per page.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn page_corrected(&self, source: &Path, report: &PageCorrectionReport) {
        info!(
            source = %source.display(),
            page = report.page,
            rule_fixes = report.rule_fix_count(),
            identifier_fixes = report.identifier_fix_count(),
            total = report.total_fixes,
            "page corrected"
        );
    }

    fn document_finished(&self, outcome: &DocumentOutcome) {
        info!(
            source = %outcome.source.display(),
            output = %outcome.output.display(),
            pages = outcome.pages.len(),
            total_fixes = outcome.total_fixes,
            "document finished"
        );
    }
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pages: Mutex<Vec<(PathBuf, PageCorrectionReport)>>,
    documents: Mutex<Vec<PathBuf>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> Vec<(PathBuf, PageCorrectionReport)> {
        self.pages.lock().map(|pages| pages.clone()).unwrap_or_default()
    }

    /// Sources of finished documents, in completion order.
    pub fn documents(&self) -> Vec<PathBuf> {
        self.documents.lock().map(|docs| docs.clone()).unwrap_or_default()
    }
}

impl ReportSink for CollectingSink {
    fn page_corrected(&self, source: &Path, report: &PageCorrectionReport) {
        if let Ok(mut pages) = self.pages.lock() {
            pages.push((source.to_path_buf(), report.clone()));
        }
    }

    fn document_finished(&self, outcome: &DocumentOutcome) {
        if let Ok(mut docs) = self.documents.lock() {
            docs.push(outcome.source.clone());
        }
    }
}
