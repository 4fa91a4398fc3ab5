// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document pipeline — rasterize, then per page recognise, correct and
// compose, then assemble and persist.
//
// Pages are independent units of work. Up to `workers` of them run at once
// on tokio's blocking pool; results are keyed by page position and handed on
// in input order whatever order they finish in. Cancellation is checked
// before each page starts, never while one is running.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use ocrfix_core::error::{OcrFixError, Result};
use ocrfix_core::{OcrFixConfig, OcrProvider, RasterPage, Rasterizer};
use ocrfix_correct::{CorrectionEngine, PageCorrectionReport};
use ocrfix_document::{DocumentSynthesizer, OutputPage, PageCompositor, rasterizer_for};
use sha2::{Digest, Sha256};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::outcome::DocumentOutcome;
use crate::sink::ReportSink;

/// Lowercase hex SHA-256 of `data`.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Everything one page needs, shared by the blocking workers.
struct PageWorker {
    ocr: Arc<dyn OcrProvider>,
    engine: CorrectionEngine,
    compositor: PageCompositor,
}

/// What one page produced.
struct PageResult {
    report: PageCorrectionReport,
    text: String,
    output: OutputPage,
}

impl PageWorker {
    fn run(&self, source: &Path, page: &RasterPage) -> Result<PageResult> {
        debug!(page = page.number(), provider = self.ocr.name(), "recognising page");
        let raw = self.ocr.recognize(source, page)?;
        let corrected = self.engine.correct(page.number(), &raw);
        let output = self.compositor.compose(page, &corrected.text)?;
        Ok(PageResult {
            report: corrected.report,
            text: corrected.text,
            output,
        })
    }
}

/// Turns one source document into a searchable PDF.
pub struct DocumentPipeline {
    config: OcrFixConfig,
    ocr: Arc<dyn OcrProvider>,
    engine: CorrectionEngine,
    compositor: PageCompositor,
    /// Fixed rasterizer; when unset one is picked from the source extension.
    rasterizer: Option<Arc<dyn Rasterizer>>,
}

impl DocumentPipeline {
    /// Build a pipeline with the default correction engine.
    pub fn new(config: OcrFixConfig, ocr: Arc<dyn OcrProvider>) -> Result<Self> {
        config.validate()?;
        let compositor = PageCompositor::from_config(&config);
        Ok(Self {
            config,
            ocr,
            engine: CorrectionEngine::default(),
            compositor,
            rasterizer: None,
        })
    }

    pub fn with_engine(mut self, engine: CorrectionEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn config(&self) -> &OcrFixConfig {
        &self.config
    }

    /// Process `source` into the PDF at `output`.
    ///
    /// The document succeeds or fails as a whole: on any page failure nothing
    /// is written. Page reports reach `sink` in page order as they complete.
    #[instrument(skip_all, fields(source = %source.display(), output = %output.display()))]
    pub async fn process(
        &self,
        source: &Path,
        output: &Path,
        sink: &dyn ReportSink,
        cancel: &CancellationToken,
    ) -> Result<DocumentOutcome> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        if cancel.is_cancelled() {
            return Err(OcrFixError::Cancelled);
        }

        let pages = self.rasterize(source).await?;
        info!(%run_id, pages = pages.len(), workers = self.config.workers, "document rasterized");

        let results = self.process_pages(source, pages, sink, cancel).await?;
        if cancel.is_cancelled() {
            return Err(OcrFixError::Cancelled);
        }

        let mut reports = Vec::with_capacity(results.len());
        let mut texts = Vec::with_capacity(results.len());
        let mut output_pages = Vec::with_capacity(results.len());
        for result in results {
            reports.push(result.report);
            texts.push(result.text);
            output_pages.push(result.output);
        }

        let mut synthesizer = DocumentSynthesizer::new(self.compositor.clone());
        if let Some(stem) = source.file_stem().and_then(|stem| stem.to_str()) {
            synthesizer.set_title(stem);
        }
        let bytes = tokio::task::spawn_blocking(move || synthesizer.assemble(&output_pages))
            .await
            .map_err(|err| OcrFixError::Worker(err.to_string()))??;

        write_atomically(output, &bytes).await?;
        let markdown = if self.config.write_markdown {
            let path = output.with_extension("md");
            tokio::fs::write(&path, texts.join(self.config.page_separator.as_str())).await?;
            debug!(path = %path.display(), "markdown written");
            Some(path)
        } else {
            None
        };

        let total_fixes: usize = reports.iter().map(|report| report.total_fixes).sum();
        let outcome = DocumentOutcome {
            run_id,
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            markdown,
            pages: reports,
            total_fixes,
            output_bytes: bytes.len() as u64,
            sha256: hash_bytes(&bytes),
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            %run_id,
            output = %output.display(),
            bytes = outcome.output_bytes,
            total_fixes,
            "document written"
        );
        sink.document_finished(&outcome);
        Ok(outcome)
    }

    async fn rasterize(&self, source: &Path) -> Result<Vec<RasterPage>> {
        let rasterizer: Arc<dyn Rasterizer> = match &self.rasterizer {
            Some(rasterizer) => Arc::clone(rasterizer),
            None => Arc::from(rasterizer_for(source)?),
        };
        let path = source.to_path_buf();
        let dpi = self.config.render_dpi;
        let pages = tokio::task::spawn_blocking(move || rasterizer.render(&path, dpi))
            .await
            .map_err(|err| OcrFixError::Worker(err.to_string()))??;

        if pages.is_empty() {
            return Err(OcrFixError::Rasterization {
                source_id: source.display().to_string(),
                detail: "document has no pages".into(),
            });
        }
        Ok(pages)
    }

    /// Scatter pages over at most `workers` blocking tasks and gather the
    /// results back in input order.
    async fn process_pages(
        &self,
        source: &Path,
        pages: Vec<RasterPage>,
        sink: &dyn ReportSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<PageResult>> {
        let total = pages.len();
        let limit = self.config.workers.max(1);
        let worker = Arc::new(PageWorker {
            ocr: Arc::clone(&self.ocr),
            engine: self.engine.clone(),
            compositor: self.compositor.clone(),
        });
        let shared_source: Arc<PathBuf> = Arc::new(source.to_path_buf());

        let mut pending = pages.into_iter().enumerate();
        let mut tasks: JoinSet<(usize, Result<PageResult>)> = JoinSet::new();
        let mut finished: BTreeMap<usize, PageResult> = BTreeMap::new();
        let mut ordered = Vec::with_capacity(total);

        loop {
            while tasks.len() < limit {
                let Some((position, page)) = pending.next() else {
                    break;
                };
                if cancel.is_cancelled() {
                    warn!(completed = ordered.len(), total, "cancelled between pages");
                    return Err(OcrFixError::Cancelled);
                }
                let worker = Arc::clone(&worker);
                let source = Arc::clone(&shared_source);
                tasks.spawn_blocking(move || (position, worker.run(&source, &page)));
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            let (position, result) = joined.map_err(|err| OcrFixError::Worker(err.to_string()))?;
            finished.insert(position, result?);

            while let Some(result) = finished.remove(&ordered.len()) {
                sink.page_corrected(source, &result.report);
                ordered.push(result);
            }
        }

        Ok(ordered)
    }
}

/// Write through a temporary sibling so a failed write never leaves a
/// truncated PDF at `path`.
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let partial = path.with_extension("pdf.partial");
    tokio::fs::write(&partial, bytes).await?;
    if let Err(err) = tokio::fs::rename(&partial, path).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(err.into());
    }
    Ok(())
}
