// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ocrfix-correct — Deterministic repair of OCR text.
//
// Two passes per page: an ordered table of optical-confusion rules applied
// globally, then structural reconstruction of hyphenated document identifiers
// whose numeric fields are re-validated character by character.

pub mod engine;
pub mod identifier;
pub mod report;
pub mod rules;
pub mod segments;

pub use engine::{CorrectedPage, CorrectionEngine};
pub use identifier::{ChangeRecord, IdentifierChange, IdentifierPattern, IdentifierReconstructor};
pub use report::{DocumentSummary, PageCorrectionReport};
pub use rules::{CorrectionRule, RuleHit, RuleTable, Tier};
pub use segments::{SegmentKind, SegmentSpec};
