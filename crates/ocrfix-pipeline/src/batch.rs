// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch runner — many documents, one status each. A failing document never
// stops its siblings.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ocrfix_core::error::{OcrFixError, Result};
use ocrfix_core::human_errors::humanize_error;
use ocrfix_core::{SourceKind, Stage};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::outcome::DocumentOutcome;
use crate::pipeline::DocumentPipeline;
use crate::sink::ReportSink;

/// How one document of a batch ended.
#[derive(Debug, Clone, Serialize)]
pub enum DocumentStatus {
    Done(DocumentOutcome),
    Failed {
        stage: Stage,
        error: String,
        /// What the operator can do about it.
        suggestion: String,
    },
    /// Not processed because the batch was cancelled.
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    pub source: PathBuf,
    pub output: PathBuf,
    pub status: DocumentStatus,
}

/// Per-document results of a batch, in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub results: Vec<DocumentResult>,
}

impl BatchSummary {
    pub fn done(&self) -> usize {
        self.count(|status| matches!(status, DocumentStatus::Done(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, DocumentStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, DocumentStatus::Skipped))
    }

    /// Corrections applied across every finished document.
    pub fn total_fixes(&self) -> usize {
        self.results
            .iter()
            .filter_map(|result| match &result.status {
                DocumentStatus::Done(outcome) => Some(outcome.total_fixes),
                _ => None,
            })
            .sum()
    }

    /// True when every document finished.
    pub fn all_done(&self) -> bool {
        self.done() == self.results.len()
    }

    /// Write the whole summary as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn count(&self, predicate: impl Fn(&DocumentStatus) -> bool) -> usize {
        self.results.iter().filter(|result| predicate(&result.status)).count()
    }
}

/// `<output_dir>/<input stem><suffix>.pdf`. Refuses to overwrite the input.
pub fn output_path_for(input: &Path, output_dir: &Path, suffix: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| {
            OcrFixError::UnsupportedInput(format!("{} has no file name", input.display()))
        })?;
    let output = output_dir.join(format!("{stem}{suffix}.pdf"));
    if output == input {
        return Err(OcrFixError::Config(format!(
            "output {} would overwrite its input; use another output folder or a suffix",
            output.display()
        )));
    }
    Ok(output)
}

/// Supported documents directly inside `dir`, sorted by path.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && SourceKind::from_path(&path).is_some() {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Runs a [`DocumentPipeline`] over a set of documents.
pub struct BatchRunner {
    pipeline: DocumentPipeline,
}

impl BatchRunner {
    pub fn new(pipeline: DocumentPipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &DocumentPipeline {
        &self.pipeline
    }

    /// Process `inputs` in sorted order into `output_dir`.
    #[instrument(skip_all, fields(documents = inputs.len(), output_dir = %output_dir.display()))]
    pub async fn run(
        &self,
        inputs: &[PathBuf],
        output_dir: &Path,
        sink: &dyn ReportSink,
        cancel: &CancellationToken,
    ) -> BatchSummary {
        let mut sorted = inputs.to_vec();
        sorted.sort();

        let suffix = self.pipeline.config().output_suffix.clone();
        let mut summary = BatchSummary::default();
        let mut claimed = HashSet::new();
        for (position, source) in sorted.into_iter().enumerate() {
            // Inputs sharing a stem (scan.jpg, scan.png) would share an output.
            let resolved = output_path_for(&source, output_dir, &suffix).and_then(|output| {
                if claimed.insert(output.clone()) {
                    Ok(output)
                } else {
                    Err(OcrFixError::Config(format!(
                        "{} is already the output of an earlier document",
                        output.display()
                    )))
                }
            });
            let output = match &resolved {
                Ok(output) => output.clone(),
                Err(_) => output_dir.join(source.file_name().unwrap_or_default()),
            };

            let status = if cancel.is_cancelled() {
                DocumentStatus::Skipped
            } else {
                info!(document = position + 1, source = %source.display(), "processing document");
                let result = match resolved {
                    Ok(output) => self.pipeline.process(&source, &output, sink, cancel).await,
                    Err(err) => Err(err),
                };
                match result {
                    Ok(outcome) => DocumentStatus::Done(outcome),
                    Err(OcrFixError::Cancelled) => {
                        warn!(source = %source.display(), "cancelled; document skipped");
                        DocumentStatus::Skipped
                    }
                    Err(err) => {
                        error!(source = %source.display(), stage = %err.stage(), error = %err, "document failed");
                        DocumentStatus::Failed {
                            stage: err.stage(),
                            error: err.to_string(),
                            suggestion: humanize_error(&err).suggestion,
                        }
                    }
                }
            };

            summary.results.push(DocumentResult {
                source,
                output,
                status,
            });
        }

        info!(
            done = summary.done(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            total_fixes = summary.total_fixes(),
            "batch finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_uses_stem_and_suffix() {
        let out = output_path_for(Path::new("in/plan.pdf"), Path::new("out"), "").unwrap();
        assert_eq!(out, PathBuf::from("out/plan.pdf"));
        let out = output_path_for(Path::new("in/scan.png"), Path::new("out"), "_ocr").unwrap();
        assert_eq!(out, PathBuf::from("out/scan_ocr.pdf"));
    }

    #[test]
    fn output_never_overwrites_input() {
        let err = output_path_for(Path::new("docs/plan.pdf"), Path::new("docs"), "").unwrap_err();
        assert!(matches!(err, OcrFixError::Config(_)));
    }

    #[test]
    fn discovery_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.png", "notes.docx", "c.JPG"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.pdf")).unwrap();
        let found: Vec<String> = discover_inputs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(found, vec!["a.png", "b.pdf", "c.JPG"]);
    }
}
