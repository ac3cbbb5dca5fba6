//! Waste and offcut classification.
//!
//! Every point of a board ends up in exactly one of: a placed piece, a kerf
//! segment, a defect segment or a gap. Gaps at least `min_offcut` long are
//! usable offcuts; everything else is waste.

use crate::plan::{PlacedCut, Span, WasteKind, WasteSegment};

/// Segments shorter than this (base units) are floating-point noise and are dropped.
pub const SEGMENT_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, Copy)]
enum Feature<'a> {
    Defect(&'a Span),
    Cut { cut: &'a PlacedCut, last: bool },
}

impl Feature<'_> {
    fn start(&self) -> f64 {
        match self {
            Feature::Defect(span) => span.start,
            Feature::Cut { cut, .. } => cut.x_position,
        }
    }
}

fn push_segment(out: &mut Vec<WasteSegment>, x_position: f64, length: f64, kind: WasteKind, min_offcut: f64) {
    if length <= SEGMENT_EPSILON {
        return;
    }
    out.push(WasteSegment {
        length,
        x_position,
        is_usable_offcut: kind == WasteKind::Gap && length >= min_offcut,
        kind,
    });
}

/// Classify the uncut parts of a board.
///
/// `cuts` must be ordered by position and `defects` disjoint and sorted.
/// Segments come back ordered by position.
pub fn classify(
    board_length: f64,
    cuts: &[PlacedCut],
    defects: &[Span],
    kerf: f64,
    min_offcut: f64,
) -> Vec<WasteSegment> {
    let mut features: Vec<Feature> = defects.iter().map(Feature::Defect).collect();
    features.extend(cuts.iter().enumerate().map(|(idx, cut)| Feature::Cut {
        cut,
        last: idx + 1 == cuts.len(),
    }));
    features.sort_by(|a, b| a.start().total_cmp(&b.start()));

    let mut segments = Vec::new();
    let mut cursor = 0.0;

    for (idx, feature) in features.iter().enumerate() {
        let start = feature.start();
        if start > cursor {
            push_segment(&mut segments, cursor, start - cursor, WasteKind::Gap, min_offcut);
        }

        match feature {
            Feature::Defect(span) => {
                push_segment(&mut segments, span.start, span.len(), WasteKind::Defect, min_offcut);
                cursor = span.end;
            }
            Feature::Cut { cut, last } => {
                cursor = cut.end();
                if kerf > 0.0 && !last {
                    // Clamp to the next feature: a piece that exactly filled its
                    // segment left no room for a full blade width.
                    let next = features
                        .get(idx + 1)
                        .map(Feature::start)
                        .unwrap_or(board_length);
                    let width = kerf.min(next - cursor).max(0.0);
                    push_segment(&mut segments, cursor, width, WasteKind::Kerf, min_offcut);
                    cursor += width;
                }
            }
        }
    }

    if cursor < board_length {
        push_segment(&mut segments, cursor, board_length - cursor, WasteKind::Gap, min_offcut);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn placed(x: f64, length: f64) -> PlacedCut {
        PlacedCut {
            original_cut_id: "c".into(),
            label: "c".into(),
            length,
            x_position: x,
            priority: false,
            grain_match: false,
        }
    }

    #[test]
    fn test_kerf_between_cuts_and_trailing_offcut() {
        let cuts = vec![placed(0.0, 24.0), placed(24.125, 24.0)];
        let segments = classify(96.0, &cuts, &[], 0.125, 6.0);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].kind, WasteKind::Kerf);
        assert_relative_eq!(segments[0].x_position, 24.0);
        assert_relative_eq!(segments[0].length, 0.125);
        assert!(!segments[0].is_usable_offcut);

        assert_eq!(segments[1].kind, WasteKind::Gap);
        assert_relative_eq!(segments[1].x_position, 48.125);
        assert_relative_eq!(segments[1].length, 47.875);
        assert!(segments[1].is_usable_offcut);
    }

    #[test]
    fn test_defects_interleaved_with_cuts() {
        let cuts = vec![placed(0.0, 10.0), placed(40.0, 20.0)];
        let defects = vec![Span::new(30.0, 40.0)];
        let segments = classify(64.0, &cuts, &defects, 0.0, 6.0);

        let kinds: Vec<WasteKind> = segments.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![WasteKind::Gap, WasteKind::Defect, WasteKind::Gap]);
        assert_relative_eq!(segments[0].x_position, 10.0);
        assert_relative_eq!(segments[0].length, 20.0);
        assert_relative_eq!(segments[2].x_position, 60.0);
        assert!(!segments[2].is_usable_offcut);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let at = classify(16.0, &[placed(0.0, 10.0)], &[], 0.0, 6.0);
        assert_eq!(at.len(), 1);
        assert!(at[0].is_usable_offcut);

        let below = classify(15.99, &[placed(0.0, 10.0)], &[], 0.0, 6.0);
        assert_eq!(below.len(), 1);
        assert!(!below[0].is_usable_offcut);
    }

    #[test]
    fn test_defect_never_usable() {
        let segments = classify(96.0, &[], &[Span::new(0.0, 96.0)], 0.125, 6.0);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, WasteKind::Defect);
        assert!(!segments[0].is_usable_offcut);
        assert_relative_eq!(segments[0].length, 96.0);
    }

    #[test]
    fn test_kerf_clamped_against_defect() {
        let cuts = vec![placed(0.0, 30.0), placed(40.0, 10.0)];
        let defects = vec![Span::new(30.0, 40.0)];
        let segments = classify(50.0, &cuts, &defects, 0.125, 6.0);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, WasteKind::Defect);
    }

    #[test]
    fn test_exact_fill_has_no_waste() {
        let cuts = vec![placed(0.0, 48.0), placed(48.0, 48.0)];
        assert!(classify(96.0, &cuts, &[], 0.0, 6.0).is_empty());
    }

    #[test]
    fn test_tiny_segments_dropped() {
        let segments = classify(10.0005, &[placed(0.0, 10.0)], &[], 0.0, 6.0);
        assert!(segments.is_empty());
    }
}
