//! Greedy board packing.
//!
//! Boards are visited in the order they were entered. Each board's free
//! segments (board minus defects) are kept smallest-first, and pending pieces
//! are offered to the board from the tail of the work queue toward its head.
//! A piece goes into the first segment long enough to hold it; the saw kerf
//! is taken from what remains of that segment.
//!
//! The walk runs once for priority pieces and once for the rest, so priority
//! pieces always get the first chance at a board.

use tracing::debug;

use crate::expand::{BoardInstance, CutInstance};
use crate::plan::{PlacedCut, Span};

/// Pieces placed on one board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardLayout {
    /// The board.
    pub board: BoardInstance,
    /// Placed pieces, ordered by position.
    pub cuts: Vec<PlacedCut>,
}

/// Output of [`pack`].
#[derive(Debug, Clone, PartialEq)]
pub struct PackOutcome {
    /// Boards that received a piece or carry a defect, in board order.
    pub layouts: Vec<BoardLayout>,
    /// Pieces no board could take, in work-queue order.
    pub unplaced: Vec<CutInstance>,
}

/// Free segments of a board: `[0, length)` minus the (disjoint, sorted) defects.
pub fn free_segments(length: f64, defects: &[Span]) -> Vec<Span> {
    let mut segments = vec![Span::new(0.0, length)];

    for defect in defects {
        let mut split = Vec::with_capacity(segments.len() + 1);
        for segment in segments {
            if defect.end <= segment.start || defect.start >= segment.end {
                split.push(segment);
                continue;
            }
            if defect.start > segment.start {
                split.push(Span::new(segment.start, defect.start));
            }
            if defect.end < segment.end {
                split.push(Span::new(defect.end, segment.end));
            }
        }
        segments = split;
    }

    segments.retain(|s| !s.is_empty());
    segments
}

fn sort_smallest_first(segments: &mut [Span]) {
    segments.sort_by(|a, b| a.len().total_cmp(&b.len()));
}

/// Place as many queued pieces as fit on `board`, removing them from `queue`.
///
/// `queue` must already be in first-fit-decreasing order. Returns the placed
/// pieces ordered by position.
pub fn pack_board(board: &BoardInstance, queue: &mut Vec<CutInstance>, kerf: f64) -> Vec<PlacedCut> {
    let mut segments = free_segments(board.length, &board.defects);
    sort_smallest_first(&mut segments);

    let mut placed = Vec::new();

    for tier in [true, false] {
        for i in (0..queue.len()).rev() {
            if segments.is_empty() {
                break;
            }
            if queue[i].priority != tier {
                continue;
            }

            let length = queue[i].length;
            let Some(j) = segments.iter().position(|s| s.len() >= length) else {
                continue;
            };

            let segment = segments.remove(j);
            let cut = queue.remove(i);
            placed.push(PlacedCut {
                original_cut_id: cut.line_id,
                label: cut.label,
                length: cut.length,
                x_position: segment.start,
                priority: cut.priority,
                grain_match: cut.grain_match,
            });

            let remainder = segment.len() - length - kerf;
            if remainder > 0.0 {
                segments.push(Span::new(segment.start + length + kerf, segment.end));
                sort_smallest_first(&mut segments);
            }
        }
    }

    placed.sort_by(|a, b| a.x_position.total_cmp(&b.x_position));
    placed
}

/// Pack `queue` onto `boards` in order.
pub fn pack(boards: &[BoardInstance], mut queue: Vec<CutInstance>, kerf: f64) -> PackOutcome {
    let mut layouts = Vec::new();

    for board in boards {
        let cuts = if queue.is_empty() {
            Vec::new()
        } else {
            pack_board(board, &mut queue, kerf)
        };

        debug!(
            board = %board.id,
            placed = cuts.len(),
            remaining = queue.len(),
            "packed board"
        );

        if !cuts.is_empty() || !board.defects.is_empty() {
            layouts.push(BoardLayout {
                board: board.clone(),
                cuts,
            });
        }
    }

    PackOutcome {
        layouts,
        unplaced: queue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Unit;

    fn board(length: f64, defects: Vec<Span>) -> BoardInstance {
        BoardInstance {
            id: "b#1".into(),
            line_id: "b".into(),
            line_index: 0,
            length,
            cost_per_base_unit: 0.0,
            defects,
        }
    }

    fn cut(id: &str, length: f64, priority: bool) -> CutInstance {
        CutInstance {
            id: format!("{}#1", id),
            line_id: id.into(),
            length,
            label: id.into(),
            priority,
            grain_match: false,
            unit: Unit::Inches,
        }
    }

    #[test]
    fn test_free_segments_split_around_defects() {
        let segments = free_segments(96.0, &[Span::new(10.0, 20.0), Span::new(50.0, 96.0)]);
        assert_eq!(segments, vec![Span::new(0.0, 10.0), Span::new(20.0, 50.0)]);
    }

    #[test]
    fn test_free_segments_full_defect() {
        assert!(free_segments(96.0, &[Span::new(0.0, 96.0)]).is_empty());
    }

    #[test]
    fn test_queue_walked_from_tail() {
        // FFD order is [48, 48, 24, 24, 24, 24]; the tail supplies the supports first.
        let mut queue = vec![
            cut("shelf", 48.0, false),
            cut("shelf", 48.0, false),
            cut("support", 24.0, false),
            cut("support", 24.0, false),
            cut("support", 24.0, false),
            cut("support", 24.0, false),
        ];
        let placed = pack_board(&board(96.0, vec![]), &mut queue, 0.125);

        let positions: Vec<f64> = placed.iter().map(|c| c.x_position).collect();
        assert_eq!(positions, vec![0.0, 24.125, 48.25]);
        assert!(placed.iter().all(|c| c.label == "support"));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.iter().filter(|c| c.label == "shelf").count(), 2);
    }

    #[test]
    fn test_smallest_segment_first() {
        let mut queue = vec![cut("a", 8.0, false)];
        let placed = pack_board(&board(96.0, vec![Span::new(10.0, 80.0)]), &mut queue, 0.0);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].x_position, 0.0);

        let mut queue = vec![cut("a", 12.0, false)];
        let placed = pack_board(&board(96.0, vec![Span::new(10.0, 80.0)]), &mut queue, 0.0);
        assert_eq!(placed[0].x_position, 80.0);
    }

    #[test]
    fn test_priority_tier_goes_first() {
        let mut queue = vec![cut("urgent", 10.0, true), cut("filler", 20.0, false)];
        let placed = pack_board(&board(20.0, vec![]), &mut queue, 0.125);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].original_cut_id, "urgent");
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].line_id, "filler");
    }

    #[test]
    fn test_kerf_consumed_between_cuts() {
        let mut queue = vec![cut("a", 40.0, false), cut("b", 40.0, false)];
        let placed = pack_board(&board(80.0, vec![]), &mut queue, 0.5);
        assert_eq!(placed.len(), 1);
        assert_eq!(queue.len(), 1);

        let mut queue = vec![cut("a", 40.0, false), cut("b", 39.5, false)];
        let placed = pack_board(&board(80.0, vec![]), &mut queue, 0.5);
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[1].x_position, 40.0);
    }

    #[test]
    fn test_pack_drains_queue_across_boards() {
        let boards = vec![
            BoardInstance {
                id: "s#1".into(),
                ..board(50.0, vec![])
            },
            BoardInstance {
                id: "s#2".into(),
                ..board(50.0, vec![])
            },
            BoardInstance {
                id: "s#3".into(),
                ..board(50.0, vec![])
            },
        ];
        let queue = vec![cut("a", 45.0, false), cut("b", 45.0, false)];
        let outcome = pack(&boards, queue, 0.125);
        assert_eq!(outcome.layouts.len(), 2);
        assert_eq!(outcome.layouts[0].board.id, "s#1");
        assert_eq!(outcome.layouts[1].board.id, "s#2");
        assert!(outcome.unplaced.is_empty());
    }

    #[test]
    fn test_defective_board_kept_without_cuts() {
        let boards = vec![board(96.0, vec![Span::new(0.0, 96.0)])];
        let outcome = pack(&boards, vec![cut("a", 10.0, false)], 0.0);
        assert_eq!(outcome.layouts.len(), 1);
        assert!(outcome.layouts[0].cuts.is_empty());
        assert_eq!(outcome.unplaced.len(), 1);
    }
}
