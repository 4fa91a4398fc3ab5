// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ocrfix — Core types, errors, configuration, and collaborator traits shared
// across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod traits;
pub mod types;

pub use config::{OcrFixConfig, OverlayConfig};
pub use error::{OcrFixError, Stage};
pub use traits::{OcrProvider, Rasterizer};
pub use types::*;
