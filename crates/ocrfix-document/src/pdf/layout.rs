// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vertical placement of invisible overlay lines.
//
// Lines are stacked from the top margin at the natural pitch
// (`font_size * leading`). When they do not fit in the usable span the pitch
// is compressed to `usable / n`; a line whose baseline would still fall past
// the bottom margin, and every line after it, is dropped.

use ocrfix_core::OverlayConfig;

/// Where one overlay line goes, in PDF coordinates (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePlacement {
    /// Index into the list of lines that was laid out.
    pub line: usize,
    pub x: f32,
    /// Baseline height above the bottom edge.
    pub y: f32,
}

/// Result of laying out `n` lines on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayout {
    /// Distance between consecutive baselines.
    pub pitch: f32,
    /// Placed lines, top to bottom.
    pub placements: Vec<LinePlacement>,
    /// Trailing lines that did not fit.
    pub dropped: usize,
}

impl OverlayLayout {
    /// True when the pitch had to be reduced below the natural line height.
    pub fn compressed(&self, overlay: &OverlayConfig) -> bool {
        self.pitch < overlay.line_height()
    }
}

/// Lay out `line_count` lines on a page `page_height` points tall.
///
/// Pure and deterministic: the same inputs always give the same placements.
pub fn layout_lines(line_count: usize, page_height: f32, overlay: &OverlayConfig) -> OverlayLayout {
    let natural = overlay.line_height();
    let usable = page_height - 2.0 * overlay.margin_y;

    if line_count == 0 {
        return OverlayLayout {
            pitch: natural,
            placements: Vec::new(),
            dropped: 0,
        };
    }
    if usable <= 0.0 {
        return OverlayLayout {
            pitch: 0.0,
            placements: Vec::new(),
            dropped: line_count,
        };
    }

    let pitch = if line_count as f32 * natural <= usable {
        natural
    } else {
        usable / line_count as f32
    };
    let bottom_limit = page_height - overlay.margin_y;

    let mut placements = Vec::with_capacity(line_count);
    for line in 0..line_count {
        let from_top = overlay.margin_y + line as f32 * pitch + overlay.font_size;
        if from_top > bottom_limit {
            break;
        }
        placements.push(LinePlacement {
            line,
            x: overlay.margin_x,
            y: page_height - from_top,
        });
    }

    let dropped = line_count - placements.len();
    OverlayLayout {
        pitch,
        placements,
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay() -> OverlayConfig {
        OverlayConfig::default()
    }

    #[test]
    fn natural_pitch_when_lines_fit() {
        let layout = layout_lines(3, 792.0, &overlay());
        assert!((layout.pitch - 14.0).abs() < 1e-4);
        assert_eq!(layout.dropped, 0);
        let ys: Vec<f32> = layout.placements.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![792.0 - 30.0, 792.0 - 44.0, 792.0 - 58.0]);
        assert!(layout.placements.iter().all(|p| p.x == 10.0));
    }

    #[test]
    fn compressed_pitch_still_fits_everything() {
        // usable 70pt, 6 lines -> pitch 11.67, last baseline at 20+58.3+10 = 88.3 <= 90
        let layout = layout_lines(6, 110.0, &overlay());
        assert!(layout.compressed(&overlay()));
        assert_eq!(layout.placements.len(), 6);
        assert_eq!(layout.dropped, 0);
    }

    #[test]
    fn trailing_lines_dropped_when_compression_is_not_enough() {
        // usable 28pt, 5 lines -> pitch 5.6; line 4 would sit at 20+22.4+10 = 52.4 > 48
        let layout = layout_lines(5, 68.0, &overlay());
        assert!((layout.pitch - 5.6).abs() < 1e-4);
        assert_eq!(layout.placements.len(), 4);
        assert_eq!(layout.dropped, 1);
        let lines: Vec<usize> = layout.placements.iter().map(|p| p.line).collect();
        assert_eq!(lines, vec![0, 1, 2, 3]);
    }

    #[test]
    fn baselines_stay_inside_margins() {
        for n in [1, 10, 60, 200] {
            let layout = layout_lines(n, 842.0, &overlay());
            for p in &layout.placements {
                assert!(p.y >= 20.0 - 1e-3, "n={n} y={}", p.y);
                assert!(p.y <= 842.0 - 20.0);
            }
            assert_eq!(layout.placements.len() + layout.dropped, n);
        }
    }

    #[test]
    fn page_shorter_than_margins_drops_everything() {
        let layout = layout_lines(3, 30.0, &overlay());
        assert!(layout.placements.is_empty());
        assert_eq!(layout.dropped, 3);
    }

    #[test]
    fn layout_is_deterministic() {
        assert_eq!(layout_lines(40, 300.0, &overlay()), layout_lines(40, 300.0, &overlay()));
    }
}
