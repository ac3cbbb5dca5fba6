//! Cutting plans and the optimization result.

use serde::{Deserialize, Serialize};

use crate::units::Unit;

/// A half-open interval `[start, end)` along a board, in base units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Offset from the board start.
    pub start: f64,
    /// Offset of the first point past the interval.
    pub end: f64,
}

impl Span {
    /// Create a span.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the span.
    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the span has no positive length.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// A piece placed on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedCut {
    /// Id of the required-cut line the piece came from.
    pub original_cut_id: String,
    /// Display label.
    pub label: String,
    /// Piece length (base units).
    pub length: f64,
    /// Offset of the piece from the board start (base units).
    pub x_position: f64,
    /// Priority flag of the originating line.
    pub priority: bool,
    /// Grain-match flag of the originating line.
    pub grain_match: bool,
}

impl PlacedCut {
    /// Offset just past the piece.
    pub fn end(&self) -> f64 {
        self.x_position + self.length
    }
}

/// What a waste segment is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteKind {
    /// Uncut board between features.
    Gap,
    /// Material removed by the saw blade.
    Kerf,
    /// A defect zone.
    Defect,
}

/// A stretch of board that is not part of any piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteSegment {
    /// Segment length (base units).
    pub length: f64,
    /// Offset from the board start (base units).
    pub x_position: f64,
    /// Whether the segment is long enough to keep.
    pub is_usable_offcut: bool,
    /// What the segment is.
    pub kind: WasteKind,
}

impl WasteSegment {
    /// Offset just past the segment.
    pub fn end(&self) -> f64 {
        self.x_position + self.length
    }
}

/// The cutting plan for one physical board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockBoardCutPlan {
    /// Id of the stock line the board came from.
    pub stock_board_id: String,
    /// Position of that stock line in the input.
    pub stock_line_index: usize,
    /// Id of this board instance.
    pub stock_board_instance_id: String,
    /// Board length (base units).
    pub original_length: f64,
    /// Placed pieces, ordered by position.
    pub cuts: Vec<PlacedCut>,
    /// Waste, kerf and defects, ordered by position.
    pub waste_segments: Vec<WasteSegment>,
    /// Defect zones after merging (base units).
    pub defect_zones: Vec<Span>,
    /// Price of the whole board.
    pub material_cost: f64,
}

impl StockBoardCutPlan {
    /// Total length of placed pieces.
    pub fn cut_length(&self) -> f64 {
        self.cuts.iter().map(|c| c.length).sum()
    }

    /// Total length of segments that are not usable offcuts.
    pub fn waste_length(&self) -> f64 {
        self.waste_segments
            .iter()
            .filter(|w| !w.is_usable_offcut)
            .map(|w| w.length)
            .sum()
    }

    /// Usable offcuts on this board.
    pub fn offcuts(&self) -> impl Iterator<Item = &WasteSegment> {
        self.waste_segments.iter().filter(|w| w.is_usable_offcut)
    }
}

/// Usage of one stock line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUtilization {
    /// Stock line id.
    pub stock_id: String,
    /// Board length as entered.
    pub original_length: f64,
    /// Unit the length was entered in.
    pub unit: Unit,
    /// Boards of this line that appear in the plan.
    pub quantity_used: usize,
    /// Share of the used boards' length that went into pieces (0-100).
    pub utilization_percentage: f64,
}

/// Pieces that did not fit on any board, grouped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnaccommodatedPiece {
    /// Piece label.
    pub label: String,
    /// Piece length in `unit`.
    pub length: f64,
    /// Unit the piece was entered in.
    pub unit: Unit,
    /// How many such pieces are left over.
    pub quantity_remaining: usize,
}

/// Usable offcuts of (roughly) the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffcutGroup {
    /// Offcut length in `unit`, grouped to 0.01 base units.
    pub length: f64,
    /// Display unit of `length`.
    pub unit: Unit,
    /// Number of offcuts in the group.
    pub count: usize,
    /// Board instance ids, one per offcut.
    pub board_ids: Vec<String>,
}

/// Everything one optimization run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    /// One plan per board that received a piece or has a defect.
    pub cutting_plan_by_board: Vec<StockBoardCutPlan>,
    /// Non-usable waste, in the settings' offcut unit.
    pub total_waste_length: f64,
    /// Non-usable waste as a share of all stock supplied (0-100).
    pub total_waste_percentage: f64,
    /// Waste priced at the first board's rate.
    pub estimated_waste_cost: f64,
    /// Per stock line usage.
    pub stock_utilization: Vec<StockUtilization>,
    /// Pieces left over.
    pub unaccommodated_pieces: Vec<UnaccommodatedPiece>,
    /// Usable offcuts, longest first.
    pub optimal_offcuts: Vec<OffcutGroup>,
    /// Price of every board in the plan.
    pub total_material_cost: f64,
    /// Wall-clock duration of the run in milliseconds.
    #[serde(rename = "calculationTime")]
    pub calculation_time_ms: f64,
}

impl OptimizationResult {
    /// Number of pieces placed across all boards.
    pub fn placed_count(&self) -> usize {
        self.cutting_plan_by_board.iter().map(|p| p.cuts.len()).sum()
    }

    /// Number of pieces left over.
    pub fn unaccommodated_count(&self) -> usize {
        self.unaccommodated_pieces
            .iter()
            .map(|p| p.quantity_remaining)
            .sum()
    }
}
