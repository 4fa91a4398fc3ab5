// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structural reconstruction of document identifiers.
//
// Target format: `26437-RIA-001-DR-CLG-PC-00001`
//   project - org - series - doctype - discipline - subcode - sequence
//
// The capture pattern is deliberately lenient about field lengths so that an
// identifier mangled by OCR is still found; the segment classification then
// decides which fields may be digit-normalised.

use ocrfix_core::error::{OcrFixError, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::segments::{FIELD_COUNT, SegmentSpec};

/// Lenient seven-field pattern, anchored on word boundaries so it never
/// matches inside a longer alphanumeric run.
const STANDARD_PATTERN: &str = concat!(
    r"\b",
    r"(\d{2,6})",   // project number
    r"-(\w{2,4})",  // org code
    r"-(\w{2,5})",  // series / revision
    r"-(\w{2,3})",  // document type
    r"-(\w{2,5})",  // discipline
    r"-(\w{2,5})",  // sub-code
    r"-(\w{4,6})",  // sequence number
    r"\b",
);

/// A compiled identifier pattern with exactly [`FIELD_COUNT`] capture groups.
#[derive(Debug, Clone)]
pub struct IdentifierPattern {
    regex: Regex,
}

impl IdentifierPattern {
    /// Compile a custom pattern. Each field must be one capture group, in
    /// field order; no other capture groups are allowed.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|err| {
            OcrFixError::Config(format!("invalid identifier pattern {pattern:?}: {err}"))
        })?;
        // captures_len counts the implicit whole-match group.
        if regex.captures_len() != FIELD_COUNT + 1 {
            return Err(OcrFixError::Config(format!(
                "identifier pattern must have {} capture groups, found {}",
                FIELD_COUNT,
                regex.captures_len() - 1
            )));
        }
        Ok(Self { regex })
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_PATTERN).expect("built-in identifier pattern is valid")
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Raw text of every identifier found in `text`, left to right.
    pub fn find_all<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.regex.find_iter(text).map(|m| m.as_str()).collect()
    }
}

impl Default for IdentifierPattern {
    fn default() -> Self {
        Self::standard()
    }
}

/// One field that changed during reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// One-based field position.
    pub field: usize,
    pub original: String,
    pub corrected: String,
}

/// An identifier that was rewritten, with its per-field edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierChange {
    pub raw: String,
    pub fixed: String,
    pub fields: Vec<ChangeRecord>,
}

/// Finds identifiers and normalises their digit-only fields.
#[derive(Debug, Clone, Default)]
pub struct IdentifierReconstructor {
    pattern: IdentifierPattern,
    spec: SegmentSpec,
}

impl IdentifierReconstructor {
    pub fn new(pattern: IdentifierPattern, spec: SegmentSpec) -> Self {
        Self { pattern, spec }
    }

    pub fn pattern(&self) -> &IdentifierPattern {
        &self.pattern
    }

    pub fn spec(&self) -> &SegmentSpec {
        &self.spec
    }

    /// Rewrite every identifier in `text`. Matches are non-overlapping and
    /// processed left to right; unchanged identifiers are not reported.
    pub fn fix(&self, text: &str) -> (String, Vec<IdentifierChange>) {
        let mut changes = Vec::new();
        let output = self.pattern.regex.replace_all(text, |caps: &Captures<'_>| {
            let raw = &caps[0];
            let (fixed, fields) = self.rebuild(caps);
            if fixed != raw {
                debug!(raw, fixed = %fixed, "identifier corrected");
                changes.push(IdentifierChange {
                    raw: raw.to_string(),
                    fixed: fixed.clone(),
                    fields,
                });
            }
            fixed
        });
        (output.into_owned(), changes)
    }

    /// Normalise each captured field and join them with hyphens.
    fn rebuild(&self, caps: &Captures<'_>) -> (String, Vec<ChangeRecord>) {
        let mut parts = Vec::with_capacity(FIELD_COUNT);
        let mut fields = Vec::new();
        for index in 0..FIELD_COUNT {
            let original = caps.get(index + 1).map_or("", |m| m.as_str());
            let corrected = self.spec.normalize(index, original);
            if corrected != original {
                fields.push(ChangeRecord {
                    field: index + 1,
                    original: original.to_string(),
                    corrected: corrected.to_string(),
                });
            }
            parts.push(corrected);
        }
        (parts.join("-"), fields)
    }
}
