// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ordered rule table for optical-confusion repair.
//
// Rules run in table order and each one scans the output of the rules before
// it, so later rules may depend on earlier normalisation. The table is grouped
// into five precedence tiers; within a tier rules keep their listed order.

use ocrfix_core::error::{OcrFixError, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Name of the optional capture group that holds trailing context. Its text
/// is matched but re-emitted unchanged after the replacement.
pub const TAIL_GROUP: &str = "tail";

/// Precedence tier of a rule. Tables must list tiers in non-decreasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Long, fully literal multi-character corrections.
    Literal = 1,
    /// A fixed prefix followed by a class of look-alike characters.
    AnchoredPrefix = 2,
    /// Ambiguous leading character before a fixed sequence.
    LeadingChar = 3,
    /// One character swapped inside a fixed surrounding context.
    ContextSwap = 4,
    /// Undo damage from an upstream blanket O→0 normalisation.
    OverCorrection = 5,
}

/// One pattern → replacement correction.
#[derive(Debug, Clone)]
pub struct CorrectionRule {
    tier: Tier,
    pattern: Regex,
    replacement: String,
    label: String,
}

impl CorrectionRule {
    /// Build a rule from a regular expression. Text from the start of a
    /// named group `tail`, if present, to the end of the match is kept
    /// verbatim after the replacement.
    pub fn new(
        tier: Tier,
        pattern: &str,
        replacement: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|err| OcrFixError::Config(format!("invalid rule pattern {pattern:?}: {err}")))?;
        Ok(Self {
            tier,
            pattern,
            replacement: replacement.into(),
            label: label.into(),
        })
    }

    /// Build a rule matching `needle` literally.
    pub fn literal(
        tier: Tier,
        needle: &str,
        replacement: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<Self> {
        Self::new(tier, &regex::escape(needle), replacement, label)
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Replace every non-overlapping match in `text`.
    ///
    /// Returns the new text and the number of matches whose text actually
    /// changed; a match already equal to its replacement is not a fix.
    pub fn apply(&self, text: &str) -> (String, usize) {
        let mut changed = 0usize;
        let output = self.pattern.replace_all(text, |caps: &Captures<'_>| {
            let matched = &caps[0];
            let head_len = match (caps.get(0), caps.name(TAIL_GROUP)) {
                (Some(whole), Some(tail)) => tail.start() - whole.start(),
                _ => matched.len(),
            };
            let (head, tail) = matched.split_at(head_len);
            if head != self.replacement {
                changed += 1;
            }
            let mut out = String::with_capacity(self.replacement.len() + tail.len());
            out.push_str(&self.replacement);
            out.push_str(tail);
            out
        });
        (output.into_owned(), changed)
    }
}

/// A rule that fired on a page, with its hit count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHit {
    pub tier: Tier,
    pub pattern: String,
    pub replacement: String,
    pub label: String,
    pub count: usize,
}

/// Immutable, ordered set of correction rules.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<CorrectionRule>,
}

/// Built-in rules: (tier, regex, replacement, label).
const STANDARD_RULES: &[(Tier, &str, &str, &str)] = &[
    // Tier 1: longest literals first so later rules cannot break them up.
    (Tier::Literal, r"0002B", "00028", "0002B → 00028  [B↔8]"),
    (Tier::Literal, r"OOI", "001", "OOI → 001  [O=0, I=1]"),
    // Tier 2: OCR reads 1 as I or l after a known prefix.
    (Tier::AnchoredPrefix, r"PR[I1l]{1,2}", "PR1", "PR{I|II|1} → PR1"),
    (Tier::AnchoredPrefix, r"IN[I1l]{1,2}", "IN1", "IN{I|II|1} → IN1"),
    (Tier::AnchoredPrefix, r"GR[I1l]{1,2}", "GR1", "GR{I|II|1} → GR1"),
    // Tier 3
    (Tier::LeadingChar, r"[1Il]N2", "IN2", "[1/I]N2 → IN2"),
    (Tier::LeadingChar, r"[1Il]N1", "IN1", "[1/I]N1 → IN1"),
    // Tier 4
    (Tier::ContextSwap, r"P[I1]E", "PLE", "P[I/1]E → PLE  [I=L, 1=L]"),
    (Tier::ContextSwap, r"028", "02B", "028 → 02B  [8=B]"),
    (Tier::ContextSwap, r"040", "04C", "040 → 04C  [0=C]"),
    // Tier 5: digit 0 where the letter O is correct.
    (Tier::OverCorrection, r"0P(?P<tail>[^0-9])", "OP", "0P → OP  [O over-zeroed]"),
    (Tier::OverCorrection, r"0TH", "OTH", "0TH → OTH  [O over-zeroed]"),
];

impl RuleTable {
    /// Build a table, rejecting one whose tiers are out of order.
    pub fn new(rules: Vec<CorrectionRule>) -> Result<Self> {
        if let Some(pair) = rules.windows(2).find(|pair| pair[0].tier > pair[1].tier) {
            return Err(OcrFixError::Config(format!(
                "rule {:?} ({:?}) listed after {:?} ({:?})",
                pair[1].pattern(),
                pair[1].tier,
                pair[0].pattern(),
                pair[0].tier
            )));
        }
        Ok(Self { rules })
    }

    /// The built-in confusion rules for project document registers.
    pub fn standard() -> Self {
        let rules = STANDARD_RULES
            .iter()
            .map(|&(tier, pattern, replacement, label)| {
                CorrectionRule::new(tier, pattern, replacement, label)
            })
            .collect::<Result<Vec<_>>>()
            .expect("built-in rule patterns are valid");
        Self { rules }
    }

    /// A table with no rules.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[CorrectionRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Table index of the rule with this pattern, `len()` if absent.
    pub fn position(&self, pattern: &str) -> usize {
        self.rules
            .iter()
            .position(|rule| rule.pattern() == pattern)
            .unwrap_or(self.rules.len())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule in order. Rules with no effective match produce no hit.
    pub fn apply(&self, text: &str) -> (String, Vec<RuleHit>) {
        let mut current = text.to_string();
        let mut hits = Vec::new();
        for rule in &self.rules {
            let (next, count) = rule.apply(&current);
            if count > 0 {
                trace!(pattern = rule.pattern(), count, "rule fired");
                hits.push(RuleHit {
                    tier: rule.tier,
                    pattern: rule.pattern().to_string(),
                    replacement: rule.replacement.clone(),
                    label: rule.label.clone(),
                    count,
                });
            }
            current = next;
        }
        (current, hits)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}
