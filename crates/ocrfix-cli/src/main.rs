// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ocrfix — scanned documents in, corrected searchable PDFs out.
//
// Entry point. Parses arguments, initialises logging, and runs either one
// document or every document in ./input.

mod console;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use ocrfix_core::human_errors::humanize_error;
use ocrfix_core::{OcrFixConfig, OcrFixError, OcrProvider, SourceKind};
use ocrfix_pipeline::{BatchRunner, DocumentPipeline, SidecarTextProvider, discover_inputs};
use tokio_util::sync::CancellationToken;

use console::ConsoleSink;

const INPUT_DIR: &str = "input";
const OUTPUT_DIR: &str = "output";

#[derive(Parser, Debug)]
#[command(name = "ocrfix", version)]
#[command(
    about = "Re-OCR scanned drawings and registers, repair document numbers, and write searchable PDFs",
    long_about = "With no INPUT every PDF or image in ./input is processed into ./output."
)]
struct Args {
    /// PDF or image file to process
    input: Option<PathBuf>,

    /// Output PDF (single file) or output folder (folder mode)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the corrected text as markdown next to each PDF
    #[arg(long)]
    md: bool,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Rasterization resolution
    #[arg(long, value_name = "N")]
    dpi: Option<u32>,

    /// Pages processed in parallel
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Folder holding recorded OCR text (<stem>.md, <stem>.p<n>.md)
    #[arg(long, value_name = "DIR")]
    text_dir: Option<PathBuf>,

    /// Folder holding the on-device recognition models (needs the `ocr` feature)
    #[arg(long, value_name = "DIR")]
    models: Option<PathBuf>,

    /// Write a JSON report of the run
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            match err.downcast_ref::<OcrFixError>() {
                Some(ocr_err) => console::print_error(&humanize_error(ocr_err)),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every document succeeded.
async fn run(args: Args) -> anyhow::Result<bool> {
    let config = load_config(&args)?;
    let provider = ocr_provider(&args, &config)?;
    tracing::info!(
        provider = provider.name(),
        dpi = config.render_dpi,
        workers = config.workers,
        "ocrfix starting"
    );
    let pipeline = DocumentPipeline::new(config, provider)?;
    let cancel = interrupt_token();

    match &args.input {
        Some(input) => single_file(&args, input, pipeline, &cancel).await,
        None => folder_mode(&args, pipeline, &cancel).await,
    }
}

fn load_config(args: &Args) -> anyhow::Result<OcrFixConfig> {
    let mut config = match &args.config {
        Some(path) => OcrFixConfig::load(path)?,
        None => OcrFixConfig::default(),
    };
    if let Some(dpi) = args.dpi {
        config.render_dpi = dpi;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    config.write_markdown |= args.md;
    Ok(config)
}

fn ocr_provider(args: &Args, config: &OcrFixConfig) -> anyhow::Result<Arc<dyn OcrProvider>> {
    if args.text_dir.is_none() {
        if let Some(engine) = recognition_engine(args)? {
            return Ok(engine);
        }
    }
    let mut sidecar = SidecarTextProvider::new(config.page_separator.clone());
    if let Some(dir) = &args.text_dir {
        sidecar = sidecar.with_dir(dir);
    }
    Ok(Arc::new(sidecar))
}

#[cfg(feature = "ocr")]
fn recognition_engine(args: &Args) -> anyhow::Result<Option<Arc<dyn OcrProvider>>> {
    use ocrfix_document::LocalOcrEngine;

    let engine = match &args.models {
        Some(dir) => LocalOcrEngine::from_model_dir(dir)?,
        None => LocalOcrEngine::with_defaults()?,
    };
    Ok(Some(Arc::new(engine)))
}

#[cfg(not(feature = "ocr"))]
fn recognition_engine(args: &Args) -> anyhow::Result<Option<Arc<dyn OcrProvider>>> {
    if args.models.is_some() {
        tracing::warn!("--models ignored: built without the `ocr` feature; using recorded text");
    }
    Ok(None)
}

/// Cancelled on Ctrl+C. Work stops before the next page.
fn interrupt_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; stopping after the pages in flight");
            on_interrupt.cancel();
        }
    });
    cancel
}

async fn single_file(
    args: &Args,
    input: &Path,
    pipeline: DocumentPipeline,
    cancel: &CancellationToken,
) -> anyhow::Result<bool> {
    if !input.is_file() {
        bail!("file not found: {}", input.display());
    }
    if SourceKind::from_path(input).is_none() {
        return Err(OcrFixError::UnsupportedInput(format!(
            "{} is not a PDF or a supported image",
            input.display()
        ))
        .into());
    }

    let output = match &args.output {
        Some(output) => output.clone(),
        None => {
            let stem = input
                .file_stem()
                .context("input has no file name")?
                .to_string_lossy();
            Path::new(OUTPUT_DIR).join(format!("{stem}{}.pdf", pipeline.config().output_suffix))
        }
    };
    if output == input {
        bail!("refusing to overwrite the input {}", input.display());
    }

    println!("  Input   {}", input.display());
    println!("  Output  {}", output.display());
    let outcome = pipeline.process(input, &output, &ConsoleSink, cancel).await?;
    if let Some(report) = &args.report {
        outcome
            .write_json(report)
            .with_context(|| format!("writing report {}", report.display()))?;
    }
    Ok(true)
}

async fn folder_mode(
    args: &Args,
    pipeline: DocumentPipeline,
    cancel: &CancellationToken,
) -> anyhow::Result<bool> {
    let input_dir = PathBuf::from(INPUT_DIR);
    let output_dir = args.output.clone().unwrap_or_else(|| PathBuf::from(OUTPUT_DIR));
    std::fs::create_dir_all(&input_dir)
        .with_context(|| format!("creating {}", input_dir.display()))?;
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    println!("  Input folder   {}", input_dir.display());
    println!("  Output folder  {}", output_dir.display());

    let inputs = discover_inputs(&input_dir)?;
    if inputs.is_empty() {
        println!("  No PDF or image files found. Drop documents into {}", input_dir.display());
        return Ok(true);
    }
    println!("  Found {} document(s)", inputs.len());

    let runner = BatchRunner::new(pipeline);
    let summary = runner.run(&inputs, &output_dir, &ConsoleSink, cancel).await;
    console::print_batch(&summary);

    if let Some(report) = &args.report {
        summary
            .write_json(report)
            .with_context(|| format!("writing report {}", report.display()))?;
    }
    Ok(summary.failed() == 0)
}
