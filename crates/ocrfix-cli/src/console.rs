// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Console rendering of correction reports and batch results.

use std::path::Path;

use ocrfix_core::human_errors::{HumanError, Severity};
use ocrfix_correct::PageCorrectionReport;
use ocrfix_pipeline::{BatchSummary, DocumentOutcome, DocumentStatus, ReportSink};

const RULE: &str = "────────────────────────────────────────────────────────────";

/// Prints each page report as it arrives.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn page_corrected(&self, _source: &Path, report: &PageCorrectionReport) {
        println!("  Page {}", report.page);
        if report.is_clean() {
            println!("    no corrections");
            return;
        }
        for hit in &report.rule_hits {
            println!("    {:>3}×  {}", hit.count, hit.label);
        }
        for change in &report.identifier_changes {
            let fields: Vec<String> = change
                .fields
                .iter()
                .map(|f| format!("field {}: {} → {}", f.field, f.original, f.corrected))
                .collect();
            println!("    id   {} → {}  ({})", change.raw, change.fixed, fields.join(", "));
        }
        let delta = report.length_delta();
        if delta != 0 {
            println!(
                "    length {} → {} ({delta:+})",
                report.chars_before, report.chars_after
            );
        }
    }

    fn document_finished(&self, outcome: &DocumentOutcome) {
        println!("{RULE}");
        println!(
            "  {} → {}  ({} KB)",
            display_name(&outcome.source),
            outcome.output.display(),
            outcome.output_bytes / 1024
        );
        if let Some(markdown) = &outcome.markdown {
            println!("  markdown → {}", markdown.display());
        }
        if outcome.total_fixes > 0 {
            println!(
                "  {} correction(s) across {} page(s).",
                outcome.total_fixes,
                outcome.pages.len()
            );
        } else {
            println!("  No corrections needed; OCR output looked clean.");
        }
        println!("{RULE}");
    }
}

/// Final table for folder mode.
pub fn print_batch(summary: &BatchSummary) {
    println!("{RULE}");
    for result in &summary.results {
        let name = display_name(&result.source);
        match &result.status {
            DocumentStatus::Done(outcome) => {
                println!("  done     {name}  {} fix(es)", outcome.total_fixes)
            }
            DocumentStatus::Failed {
                stage,
                error,
                suggestion,
            } => {
                println!("  FAILED   {name}  [{stage}] {error}");
                println!("           {suggestion}");
            }
            DocumentStatus::Skipped => println!("  skipped  {name}"),
        }
    }
    println!("{RULE}");
    println!(
        "  All done. {} total correction(s) across {} file(s): {} done, {} failed, {} skipped.",
        summary.total_fixes(),
        summary.results.len(),
        summary.done(),
        summary.failed(),
        summary.skipped()
    );
}

pub fn print_error(human: &HumanError) {
    let tag = match human.severity {
        Severity::Transient => "error (may succeed on retry)",
        Severity::ActionRequired => "error",
        Severity::Permanent => "error (input cannot be processed)",
    };
    eprintln!("{tag}: {}", human.message);
    eprintln!("  {}", human.suggestion);
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
