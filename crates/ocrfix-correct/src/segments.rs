// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-field classification of the seven-field document identifier.

use serde::{Deserialize, Serialize};

/// Number of hyphen-delimited fields in a document identifier:
/// `project-org-series-doctype-discipline-subcode-sequence`.
pub const FIELD_COUNT: usize = 7;

/// Whether a field must end up purely numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// All-digit field: letter/digit look-alikes are converted to digits.
    Digit,
    /// Alphanumeric field: left untouched; only the rule table may change it.
    Mixed,
}

/// Classification of every identifier field, in field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSpec([SegmentKind; FIELD_COUNT]);

impl SegmentSpec {
    pub const fn new(kinds: [SegmentKind; FIELD_COUNT]) -> Self {
        Self(kinds)
    }

    /// Project number and sequence number are digit-only; everything else may
    /// legitimately mix letters and digits (`GR1`, `04C`, `02B`).
    pub const fn standard() -> Self {
        use SegmentKind::{Digit, Mixed};
        Self([Digit, Mixed, Mixed, Mixed, Mixed, Mixed, Digit])
    }

    /// Like [`standard`](Self::standard) but the series field is numeric too,
    /// for organisations whose series never carries a revision letter.
    pub const fn numeric_series() -> Self {
        use SegmentKind::{Digit, Mixed};
        Self([Digit, Mixed, Digit, Mixed, Mixed, Mixed, Digit])
    }

    /// Kind of the zero-based field `index`.
    pub fn kind(&self, index: usize) -> SegmentKind {
        self.0[index]
    }

    pub fn kinds(&self) -> &[SegmentKind; FIELD_COUNT] {
        &self.0
    }

    /// Normalise one field according to its classification.
    pub fn normalize<'a>(&self, index: usize, field: &'a str) -> std::borrow::Cow<'a, str> {
        match self.kind(index) {
            SegmentKind::Digit => fix_digit_segment(field),
            SegmentKind::Mixed => std::borrow::Cow::Borrowed(field),
        }
    }
}

impl Default for SegmentSpec {
    fn default() -> Self {
        Self::standard()
    }
}

/// Letters OCR commonly returns in place of `0` and `1`.
const CONFUSABLE_DIGITS: &[char] = &['O', 'o', 'I', 'l', 'L'];

/// Replace characters commonly misread for digits: `O`/`o` → `0`,
/// `I`/`l`/`L` → `1`. Context-free, so only safe on digit-only fields.
pub fn fix_digit_segment(field: &str) -> std::borrow::Cow<'_, str> {
    if !field.contains(CONFUSABLE_DIGITS) {
        return std::borrow::Cow::Borrowed(field);
    }
    let fixed = field
        .chars()
        .map(|c| match c {
            'O' | 'o' => '0',
            'I' | 'l' | 'L' => '1',
            other => other,
        })
        .collect();
    std::borrow::Cow::Owned(fixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_fix_maps_confusables() {
        assert_eq!(fix_digit_segment("O0205"), "00205");
        assert_eq!(fix_digit_segment("oIlL9"), "01119");
        assert_eq!(fix_digit_segment("26437"), "26437");
    }

    #[test]
    fn digit_fix_leaves_other_letters() {
        // B and S are not in the confusion set.
        assert_eq!(fix_digit_segment("0B5S"), "0B5S");
        // Lowercase i is not a known confusion.
        assert_eq!(fix_digit_segment("i0"), "i0");
    }

    #[test]
    fn mixed_fields_untouched() {
        let spec = SegmentSpec::standard();
        assert_eq!(spec.normalize(1, "8lR"), "8lR");
        assert_eq!(spec.normalize(2, "OOI"), "OOI");
        assert_eq!(spec.normalize(6, "OOOlI"), "00011");
    }

    #[test]
    fn numeric_series_classifies_third_field() {
        assert_eq!(SegmentSpec::standard().kind(2), SegmentKind::Mixed);
        assert_eq!(SegmentSpec::numeric_series().kind(2), SegmentKind::Digit);
        assert_eq!(SegmentSpec::numeric_series().kind(1), SegmentKind::Mixed);
    }
}
