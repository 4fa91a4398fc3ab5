// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structured correction reports. Formatting for a particular medium is left
// to the report sink.

use serde::{Deserialize, Serialize};

use crate::identifier::IdentifierChange;
use crate::rules::RuleHit;

/// Everything the correction engine changed on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCorrectionReport {
    /// One-based page number.
    pub page: usize,
    /// Rules that fired at least once, in table order.
    pub rule_hits: Vec<RuleHit>,
    /// Identifiers that were rewritten, left to right.
    pub identifier_changes: Vec<IdentifierChange>,
    /// Rule replacements plus one per rewritten identifier.
    pub total_fixes: usize,
    /// Character count of the raw text.
    pub chars_before: usize,
    /// Character count of the corrected text.
    pub chars_after: usize,
}

impl PageCorrectionReport {
    pub fn new(page: usize) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    /// Add rule hits, merging counts for a rule already recorded.
    pub(crate) fn record_rule_hits(&mut self, hits: Vec<RuleHit>) {
        for hit in hits {
            self.total_fixes += hit.count;
            match self
                .rule_hits
                .iter_mut()
                .find(|known| known.pattern == hit.pattern)
            {
                Some(known) => known.count += hit.count,
                None => self.rule_hits.push(hit),
            }
        }
    }

    pub(crate) fn record_identifier_changes(&mut self, changes: Vec<IdentifierChange>) {
        self.total_fixes += changes.len();
        self.identifier_changes.extend(changes);
    }

    /// True when the page needed no corrections.
    pub fn is_clean(&self) -> bool {
        self.rule_hits.is_empty() && self.identifier_changes.is_empty()
    }

    pub fn rule_fix_count(&self) -> usize {
        self.rule_hits.iter().map(|hit| hit.count).sum()
    }

    pub fn identifier_fix_count(&self) -> usize {
        self.identifier_changes.len()
    }

    /// Signed change in character count.
    pub fn length_delta(&self) -> i64 {
        self.chars_after as i64 - self.chars_before as i64
    }
}

/// Aggregate of the page reports of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub pages: usize,
    pub clean_pages: usize,
    pub total_fixes: usize,
    pub rule_fixes: usize,
    pub identifier_fixes: usize,
}

impl DocumentSummary {
    pub fn from_reports<'a>(reports: impl IntoIterator<Item = &'a PageCorrectionReport>) -> Self {
        reports.into_iter().fold(Self::default(), |mut acc, report| {
            acc.pages += 1;
            acc.clean_pages += usize::from(report.is_clean());
            acc.total_fixes += report.total_fixes;
            acc.rule_fixes += report.rule_fix_count();
            acc.identifier_fixes += report.identifier_fix_count();
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Tier;

    fn hit(count: usize) -> RuleHit {
        RuleHit {
            tier: Tier::Literal,
            pattern: "OOI".into(),
            replacement: "001".into(),
            label: "OOI → 001".into(),
            count,
        }
    }

    #[test]
    fn totals_count_rule_matches_and_identifiers() {
        let mut report = PageCorrectionReport::new(1);
        assert!(report.is_clean());
        report.record_rule_hits(vec![hit(3)]);
        report.record_identifier_changes(vec![IdentifierChange {
            raw: "a".into(),
            fixed: "b".into(),
            fields: Vec::new(),
        }]);
        assert_eq!(report.total_fixes, 4);
        assert_eq!(report.rule_fix_count(), 3);
        assert_eq!(report.identifier_fix_count(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn hits_for_the_same_rule_are_merged() {
        let mut report = PageCorrectionReport::new(1);
        report.record_rule_hits(vec![hit(2)]);
        report.record_rule_hits(vec![hit(1)]);
        assert_eq!(report.rule_hits.len(), 1);
        assert_eq!(report.rule_hits[0].count, 3);
        assert_eq!(report.total_fixes, 3);
    }

    #[test]
    fn summary_aggregates_pages() {
        let mut dirty = PageCorrectionReport::new(2);
        dirty.record_rule_hits(vec![hit(2)]);
        let reports = [PageCorrectionReport::new(1), dirty];
        let summary = DocumentSummary::from_reports(&reports);
        assert_eq!(summary.pages, 2);
        assert_eq!(summary.clean_pages, 1);
        assert_eq!(summary.total_fixes, 2);
    }

    #[test]
    fn report_serialises_to_json() {
        let mut report = PageCorrectionReport::new(5);
        report.record_rule_hits(vec![hit(1)]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["page"], 5);
        assert_eq!(json["rule_hits"][0]["tier"], "Literal");
    }
}
