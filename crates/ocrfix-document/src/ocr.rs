// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// On-device OCR provider backed by `ocrs`, a pure-Rust engine running neural
// network models through `rten`.
//
// Only available with the `ocr` feature:
//
// ```toml
// ocrfix-document = { path = "crates/ocrfix-document", features = ["ocr"] }
// ```
//
// The engine needs two model files, `text-detection.rten` and
// `text-recognition.rten`. Running `ocrs-cli` once downloads them to
// `$XDG_CACHE_HOME/ocrs` (typically `~/.cache/ocrs`), which is where
// [`LocalOcrConfig::default`] looks.

use std::path::{Path, PathBuf};

use ocrfix_core::error::{OcrFixError, Result};
use ocrfix_core::{OcrProvider, RasterPage};
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use tracing::{debug, info, instrument};

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// `$XDG_CACHE_HOME/ocrs`, else `~/.cache/ocrs`.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Where the two model files live.
#[derive(Debug, Clone)]
pub struct LocalOcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for LocalOcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl LocalOcrConfig {
    /// Both models inside `dir` under their usual file names.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Fail early, naming the missing model file.
    pub fn validate(&self) -> Result<()> {
        for path in [&self.detection_model_path, &self.recognition_model_path] {
            if !path.exists() {
                return Err(OcrFixError::Config(format!(
                    "OCR model not found at {}; run `ocrs-cli` once to download the models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Recognises page text locally. Model loading is the expensive step, so one
/// engine should serve every page of a run.
pub struct LocalOcrEngine {
    engine: OcrEngine,
}

impl LocalOcrEngine {
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: LocalOcrConfig) -> Result<Self> {
        config.validate()?;

        let load = |path: &Path| {
            Model::load_file(path).map_err(|err| {
                OcrFixError::Config(format!("failed to load OCR model {}: {err}", path.display()))
            })
        };
        info!("Loading OCR models");
        let detection_model = load(&config.detection_model_path)?;
        let recognition_model = load(&config.recognition_model_path)?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| OcrFixError::Config(format!("failed to initialise OCR engine: {err}")))?;

        Ok(Self { engine })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(LocalOcrConfig::default())
    }

    pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(LocalOcrConfig::from_dir(dir))
    }
}

impl OcrProvider for LocalOcrEngine {
    fn name(&self) -> &str {
        "ocrs"
    }

    #[instrument(skip_all, fields(page = page.number()))]
    fn recognize(&self, source: &Path, page: &RasterPage) -> Result<String> {
        let ocr_error = |detail: String| OcrFixError::Ocr {
            source_id: source.display().to_string(),
            page: page.number(),
            detail,
        };

        let bytes = page.load_bytes().map_err(|err| ocr_error(err.to_string()))?;
        let rgb = image::load_from_memory(&bytes)
            .map_err(|err| ocr_error(format!("cannot decode page image: {err}")))?
            .into_rgb8();
        let (width, height) = rgb.dimensions();

        let image_source = ImageSource::from_bytes(rgb.as_raw(), (width, height))
            .map_err(|err| ocr_error(format!("bad image source ({width}x{height}): {err}")))?;
        let input = self
            .engine
            .prepare_input(image_source)
            .map_err(|err| ocr_error(format!("preprocessing failed: {err}")))?;
        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| ocr_error(format!("recognition failed: {err}")))?;

        debug!(lines = text.lines().count(), chars = text.len(), "page recognised");
        Ok(text)
    }
}
