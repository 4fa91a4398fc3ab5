// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Correction engine — rule table first, identifier reconstruction second.

use tracing::{debug, instrument, warn};

use crate::identifier::{IdentifierChange, IdentifierReconstructor};
use crate::report::PageCorrectionReport;
use crate::rules::{RuleHit, RuleTable};

/// Upper bound on rule + identifier passes over one page.
const MAX_PASSES: usize = 8;

/// Corrected text of one page together with what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectedPage {
    pub text: String,
    pub report: PageCorrectionReport,
}

/// Applies the full correction pipeline to page text.
///
/// The engine holds only immutable configuration, so one instance can be
/// shared across threads and every call is independent of the previous ones.
#[derive(Debug, Clone, Default)]
pub struct CorrectionEngine {
    rules: RuleTable,
    identifiers: IdentifierReconstructor,
}

impl CorrectionEngine {
    pub fn new(rules: RuleTable, identifiers: IdentifierReconstructor) -> Self {
        Self { rules, identifiers }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn identifiers(&self) -> &IdentifierReconstructor {
        &self.identifiers
    }

    /// Correct the text of page `page` (one-based).
    ///
    /// A repair can expose text that an earlier rule or the identifier fold
    /// would change again, so passes repeat until the text settles. Passes
    /// that only lead back to an earlier text are dropped along with their
    /// hits, which keeps a second call on the result clean.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub fn correct(&self, page: usize, text: &str) -> CorrectedPage {
        let mut report = PageCorrectionReport::new(page);
        report.chars_before = text.chars().count();

        let mut seen = vec![text.to_string()];
        let mut passes: Vec<(Vec<RuleHit>, Vec<IdentifierChange>)> = Vec::new();
        for pass in 1..=MAX_PASSES {
            let current = &seen[seen.len() - 1];
            let (ruled, hits) = self.rules.apply(current);
            let (fixed, changes) = self.identifiers.fix(&ruled);
            if let Some(start) = seen.iter().position(|earlier| *earlier == fixed) {
                seen.truncate(start + 1);
                passes.truncate(start);
                break;
            }
            seen.push(fixed);
            passes.push((hits, changes));
            if pass == MAX_PASSES {
                warn!(page, passes = MAX_PASSES, "correction did not settle");
            }
        }

        for (hits, changes) in passes {
            report.record_rule_hits(hits);
            report.record_identifier_changes(changes);
        }
        report
            .rule_hits
            .sort_by_key(|hit| self.rules.position(&hit.pattern));

        let fixed = seen.pop().unwrap_or_default();
        report.chars_after = fixed.chars().count();
        debug!(
            rule_fixes = report.rule_fix_count(),
            identifier_fixes = report.identifier_fix_count(),
            "page corrected"
        );

        CorrectedPage {
            text: fixed,
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::IdentifierPattern;
    use crate::segments::SegmentSpec;
    use proptest::prelude::*;

    const NOISY_PAGE: &str = "\
# Drawing Register

| Document | Title |
|---|---|
| 26437-RIA-OOI-DR-CLG-PC-O0205 | General Arrangement |
| 26437-RIA-PRII-DR-CLG-PC-00001 | Sections |
| 26437-RIA-04C-SH-GEM-ID-0001l | Schedule |

Notes: 0PEN joints to be sealed. 0THER finishes per schedule.
";

    #[test]
    fn noisy_register_is_repaired() {
        let engine = CorrectionEngine::default();
        let page = engine.correct(1, NOISY_PAGE);

        assert!(page.text.contains("| 26437-RIA-001-DR-CLG-PC-00205 |"));
        assert!(page.text.contains("| 26437-RIA-PR1-DR-CLG-PC-00001 |"));
        assert!(page.text.contains("| 26437-RIA-04C-SH-GEM-ID-00011 |"));
        assert!(page.text.contains("OPEN joints"));
        assert!(page.text.contains("OTHER finishes"));

        let report = &page.report;
        assert_eq!(report.page, 1);
        // OOI, PRII, 0P, 0TH
        assert_eq!(report.rule_fix_count(), 4);
        // O0205 and 0001l
        assert_eq!(report.identifier_fix_count(), 2);
        assert_eq!(report.total_fixes, 6);
        assert_eq!(report.length_delta(), -1);
    }

    #[test]
    fn rules_run_before_identifiers() {
        let engine = CorrectionEngine::default();
        let page = engine.correct(3, "26437-RIA-OOI-DR-CLG-PC-O0205");
        assert_eq!(page.text, "26437-RIA-001-DR-CLG-PC-00205");

        // The series field was repaired by the tier-1 rule, so only the
        // sequence field is left for the reconstructor.
        assert_eq!(page.report.rule_hits.len(), 1);
        assert_eq!(page.report.rule_hits[0].pattern, "OOI");
        let change = &page.report.identifier_changes[0];
        assert_eq!(change.raw, "26437-RIA-001-DR-CLG-PC-O0205");
        assert_eq!(change.fields.len(), 1);
        assert_eq!(change.fields[0].field, 7);
    }

    #[test]
    fn reconstructor_alone_reports_series_and_sequence() {
        let engine = CorrectionEngine::new(
            RuleTable::empty(),
            IdentifierReconstructor::new(IdentifierPattern::standard(), SegmentSpec::numeric_series()),
        );
        let page = engine.correct(1, "26437-RIA-OOI-DR-CLG-PC-O0205");
        assert_eq!(page.text, "26437-RIA-001-DR-CLG-PC-00205");
        assert_eq!(page.report.identifier_changes.len(), 1);
        assert_eq!(page.report.identifier_changes[0].fields.len(), 2);
        assert_eq!(page.report.total_fixes, 1);
        assert!(page.text.contains("-RIA-") && page.text.contains("-DR-"));
    }

    #[test]
    fn clean_page_has_clean_report() {
        let engine = CorrectionEngine::default();
        let page = engine.correct(2, "Issued for construction\n26437-RIA-001-DR-CLG-PC-00205\n");
        assert!(page.report.is_clean());
        assert_eq!(page.report.total_fixes, 0);
    }

    #[test]
    fn second_pass_finds_nothing_to_fix() {
        let engine = CorrectionEngine::default();
        let first = engine.correct(1, NOISY_PAGE);
        let second = engine.correct(1, &first.text);
        assert_eq!(second.text, first.text);
        assert!(second.report.is_clean(), "{:?}", second.report);
    }

    #[test]
    fn cascading_repairs_settle_in_one_call() {
        let engine = CorrectionEngine::default();
        let page = engine.correct(1, "1N11");
        assert_eq!(page.text, "IN1");
        let counts: Vec<(&str, usize)> = page
            .report
            .rule_hits
            .iter()
            .map(|hit| (hit.pattern.as_str(), hit.count))
            .collect();
        assert_eq!(counts, [("IN[I1l]{1,2}", 1), ("[1Il]N1", 1)]);
        assert!(engine.correct(1, &page.text).report.is_clean());
    }

    #[test]
    fn folded_sequence_is_revisited_by_the_rules() {
        let engine = CorrectionEngine::default();
        let page = engine.correct(1, "26437-RIA-001-DR-CLG-PC-1O28");
        assert_eq!(page.text, "26437-RIA-001-DR-CLG-PC-102B");
        assert_eq!(page.report.identifier_fix_count(), 1);
        assert_eq!(page.report.rule_hits.len(), 1);
        assert_eq!(page.report.rule_hits[0].pattern, "028");
        assert_eq!(page.report.total_fixes, 2);

        let again = engine.correct(1, &page.text);
        assert_eq!(again.text, page.text);
        assert!(again.report.is_clean(), "{:?}", again.report);
    }

    #[test]
    fn repairs_that_undo_each_other_are_dropped() {
        let engine = CorrectionEngine::default();
        // 0002B → 00028 → 0002B within one pass.
        let page = engine.correct(1, "0002B");
        assert_eq!(page.text, "0002B");
        assert!(page.report.is_clean(), "{:?}", page.report);

        // The tier-5 O restore is folded back to 0 in a sequence field.
        let page = engine.correct(1, "26437-RIA-001-DR-CLG-PC-0PEN1");
        assert_eq!(page.text, "26437-RIA-001-DR-CLG-PC-0PEN1");
        assert!(page.report.is_clean(), "{:?}", page.report);
    }

    #[test]
    fn no_op_cascade_is_counted_alongside_real_fixes() {
        let engine = CorrectionEngine::default();
        let page = engine.correct(1, "0002B OOI");
        assert_eq!(page.text, "0002B 001");
        let patterns: Vec<&str> = page.report.rule_hits.iter().map(|h| h.pattern.as_str()).collect();
        assert_eq!(patterns, ["0002B", "OOI", "028"]);
        assert_eq!(page.report.rule_fix_count(), 3);

        let again = engine.correct(1, &page.text);
        assert_eq!(again.text, page.text);
        assert!(again.report.is_clean(), "{:?}", again.report);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let engine = CorrectionEngine::default();
        assert_eq!(engine.correct(1, NOISY_PAGE), engine.correct(1, NOISY_PAGE));
    }

    /// Tokens typical of register pages, including common OCR damage.
    fn token() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            "26437-RIA-OOI-DR-CLG-PC-O0205",
            "26437-RIA-PRII-DR-CLG-PC-00001",
            "26437-RIA-04C-SH-GEM-ID-0001l",
            "26437-8lR-001-DR-CLG-PC-OO2O5",
            "GRl",
            "1N2",
            "P1E",
            "0PEN",
            "0THER",
            "1N11",
            "0002B",
            "26437-RIA-001-DR-CLG-PC-1O28",
            "26437-RIA-001-DR-CLG-PC-0PEN1",
            "Drawing",
            "Schedule",
            "Revision",
            "Status",
            "S4",
            "|",
            "#",
            "---",
            "1:100",
            "A1",
        ])
    }

    fn page_text() -> impl Strategy<Value = String> {
        prop::collection::vec(
            (token(), prop::sample::select(vec![" ", "\n", " | ", "\n\n"])),
            0..40,
        )
        .prop_map(|parts| {
            parts
                .into_iter()
                .flat_map(|(tok, sep)| [tok, sep])
                .collect::<String>()
        })
    }

    proptest! {
        #[test]
        fn correction_is_idempotent(text in page_text()) {
            let engine = CorrectionEngine::default();
            let once = engine.correct(1, &text);
            let twice = engine.correct(1, &once.text);
            prop_assert_eq!(&twice.text, &once.text);
            prop_assert!(twice.report.is_clean());
        }
    }
}
