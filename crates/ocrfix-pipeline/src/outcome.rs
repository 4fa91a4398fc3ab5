// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// What processing one document produced.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ocrfix_core::error::Result;
use ocrfix_correct::{DocumentSummary, PageCorrectionReport};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of a successful document run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutcome {
    /// Unique id of this run, for correlating logs and artifacts.
    pub run_id: Uuid,
    pub source: PathBuf,
    /// The searchable PDF.
    pub output: PathBuf,
    /// The markdown artifact, when one was written.
    pub markdown: Option<PathBuf>,
    /// One report per page, in page order.
    pub pages: Vec<PageCorrectionReport>,
    pub total_fixes: usize,
    /// Size of the written PDF.
    pub output_bytes: u64,
    /// Hex SHA-256 of the written PDF.
    pub sha256: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DocumentOutcome {
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary::from_reports(&self.pages)
    }

    /// Wall-clock duration of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Write this outcome as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
