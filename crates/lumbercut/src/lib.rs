#![warn(missing_docs)]

//! 1-D cut list optimizer for lumber.
//!
//! Assigns required pieces to stock boards with a first-fit-decreasing
//! heuristic, accounting for saw kerf, defect zones on the stock and a
//! minimum length below which leftovers count as waste.
//!
//! The pipeline is strictly one-directional:
//!
//! 1. [`units`] normalizes every length to inches
//! 2. [`expand`] turns line items into individual pieces and boards and sorts
//!    the pieces (priority first, then longest first)
//! 3. [`packer`] fills boards in the order they were entered
//! 4. [`waste`] tiles each board into pieces, kerf, defects and gaps
//! 5. [`summary`] rolls everything up into totals
//!
//! # Example
//!
//! ```
//! use lumbercut::{optimize, CostUnit, OptimizerSettings, RequiredCut, StockBoard, Unit};
//!
//! let cuts = vec![
//!     RequiredCut::new(48.0, 2, Unit::Inches).with_label("Shelf"),
//!     RequiredCut::new(24.0, 4, Unit::Inches).with_label("Support"),
//! ];
//! let stock = vec![StockBoard::new(96.0, 3, Unit::Inches).with_cost(10.0, CostUnit::PerFoot)];
//!
//! let result = optimize(&cuts, &stock, &OptimizerSettings::default()).unwrap();
//! assert_eq!(result.unaccommodated_count(), 0);
//! println!("waste: {:.1}%", result.total_waste_percentage);
//! ```

pub mod error;
pub mod expand;
pub mod input;
pub mod packer;
pub mod plan;
pub mod summary;
pub mod units;
pub mod waste;

pub use error::{OptimizerError, Result};
pub use input::{DefectZone, OptimizationGoal, OptimizerSettings, RequiredCut, StockBoard};
pub use plan::{
    OffcutGroup, OptimizationResult, PlacedCut, Span, StockBoardCutPlan, StockUtilization,
    UnaccommodatedPiece, WasteKind, WasteSegment,
};
pub use units::{convert, CostUnit, Unit, BASE_UNIT};

use instant::Instant;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::expand::{expand_cuts, expand_stock, sort_cuts};
use crate::packer::{pack, BoardLayout};
use crate::summary::summarize;
use crate::waste::{classify, SEGMENT_EPSILON};

/// The three inputs of a run, bundled for serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationJob {
    /// Pieces to cut.
    #[serde(default)]
    pub required_cuts: Vec<RequiredCut>,
    /// Boards available.
    #[serde(default)]
    pub stock_lumber: Vec<StockBoard>,
    /// Saw and offcut parameters.
    #[serde(default)]
    pub settings: OptimizerSettings,
}

impl OptimizationJob {
    /// Run the optimizer on this job.
    pub fn run(&self) -> Result<OptimizationResult> {
        optimize(&self.required_cuts, &self.stock_lumber, &self.settings)
    }
}

/// Optimize a cut list against the available stock.
///
/// Either returns a complete, internally consistent result or fails as a
/// whole; there is no partial output. Identical inputs always produce
/// identical plans (only `calculation_time_ms` varies).
#[instrument(skip_all, fields(
    cut_lines = cuts.len(),
    stock_lines = stock.len(),
    goal = settings.optimization_goal.name()
))]
pub fn optimize(
    cuts: &[RequiredCut],
    stock: &[StockBoard],
    settings: &OptimizerSettings,
) -> Result<OptimizationResult> {
    let started = Instant::now();

    settings.validate()?;
    let kerf = settings.kerf_base();
    let min_offcut = settings.min_offcut_base();

    let mut queue = expand_cuts(cuts)?;
    sort_cuts(&mut queue);
    let boards = expand_stock(stock)?;
    debug!(pieces = queue.len(), boards = boards.len(), "expanded inputs");

    let outcome = pack(&boards, queue, kerf);
    let plans: Vec<StockBoardCutPlan> = outcome
        .layouts
        .into_iter()
        .map(|layout| build_plan(layout, kerf, min_offcut))
        .collect();

    if !outcome.unplaced.is_empty() {
        debug!(unplaced = outcome.unplaced.len(), "pieces left without stock");
    }

    let summary = summarize(stock, &boards, &plans, &outcome.unplaced, settings);

    let result = OptimizationResult {
        cutting_plan_by_board: plans,
        total_waste_length: summary.total_waste_length,
        total_waste_percentage: summary.total_waste_percentage,
        estimated_waste_cost: summary.estimated_waste_cost,
        stock_utilization: summary.stock_utilization,
        unaccommodated_pieces: summary.unaccommodated_pieces,
        optimal_offcuts: summary.optimal_offcuts,
        total_material_cost: summary.total_material_cost,
        calculation_time_ms: started.elapsed().as_secs_f64() * 1000.0,
    };
    check_result(&result)?;

    debug!(
        boards_used = result.cutting_plan_by_board.len(),
        placed = result.placed_count(),
        waste_pct = result.total_waste_percentage,
        "optimization finished"
    );
    Ok(result)
}

/// Optimize several independent jobs, in parallel when the `parallel`
/// feature is enabled. Results are returned in job order.
pub fn optimize_batch(jobs: &[OptimizationJob]) -> Vec<Result<OptimizationResult>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        jobs.par_iter().map(OptimizationJob::run).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        jobs.iter().map(OptimizationJob::run).collect()
    }
}

fn build_plan(layout: BoardLayout, kerf: f64, min_offcut: f64) -> StockBoardCutPlan {
    let BoardLayout { board, cuts } = layout;
    let waste_segments = classify(board.length, &cuts, &board.defects, kerf, min_offcut);

    StockBoardCutPlan {
        stock_board_id: board.line_id,
        stock_line_index: board.line_index,
        stock_board_instance_id: board.id,
        original_length: board.length,
        material_cost: board.length * board.cost_per_base_unit,
        cuts,
        waste_segments,
        defect_zones: board.defects,
    }
}

/// Reject results carrying NaN/infinite numbers or boards that do not tile.
fn check_result(result: &OptimizationResult) -> Result<()> {
    let totals = [
        ("total waste length", result.total_waste_length),
        ("total waste percentage", result.total_waste_percentage),
        ("estimated waste cost", result.estimated_waste_cost),
        ("total material cost", result.total_material_cost),
    ];
    for (name, value) in totals {
        if !value.is_finite() {
            return Err(OptimizerError::NumericFault(format!("{} is {}", name, value)));
        }
    }

    for plan in &result.cutting_plan_by_board {
        let covered: f64 = plan.cut_length()
            + plan.waste_segments.iter().map(|w| w.length).sum::<f64>();
        // Each dropped sliver may account for up to one epsilon.
        let slack = SEGMENT_EPSILON * (plan.cuts.len() + plan.defect_zones.len() + 1) as f64 * 2.0;
        if !covered.is_finite() || (covered - plan.original_length).abs() > slack {
            return Err(OptimizerError::NumericFault(format!(
                "board {} covers {} of {}",
                plan.stock_board_instance_id, covered, plan.original_length
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_from_json() {
        let json = r#"{
            "requiredCuts": [{"length": "30", "quantity": "2", "unit": "inches", "label": "Side"}],
            "stockLumber": [{"length": "8", "quantity": "1", "unit": "feet",
                             "costPerUnit": "2", "costUnit": "per_foot", "defectZones": []}],
            "settings": {"sawKerf": "0.125", "kerfUnit": "inches",
                         "minOffcutLength": "6", "minOffcutUnit": "inches",
                         "optimizationGoal": "minimize_waste"}
        }"#;
        let job: OptimizationJob = serde_json::from_str(json).unwrap();
        let result = job.run().unwrap();
        assert_eq!(result.placed_count(), 2);
        assert!((result.total_material_cost - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_settings_fail_whole_run() {
        let settings = OptimizerSettings {
            saw_kerf: -1.0,
            ..Default::default()
        };
        let err = optimize(&[], &[], &settings).unwrap_err();
        assert!(matches!(err, OptimizerError::InvalidSettings(_)));
    }

    #[test]
    fn test_non_finite_cost_fails() {
        let stock = vec![StockBoard::new(96.0, 1, Unit::Inches).with_cost(f64::NAN, CostUnit::PerFoot)];
        let err = optimize(&[], &stock, &OptimizerSettings::default()).unwrap_err();
        assert!(matches!(err, OptimizerError::NonFinite { .. }));
    }

    #[test]
    fn test_result_serializes_with_ui_names() {
        let cuts = vec![RequiredCut::new(10.0, 1, Unit::Inches)];
        let stock = vec![StockBoard::new(20.0, 1, Unit::Inches)];
        let result = optimize(&cuts, &stock, &OptimizerSettings::default()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("cuttingPlanByBoard").is_some());
        assert!(json.get("calculationTime").is_some());
        assert!(json["cuttingPlanByBoard"][0].get("stockBoardInstanceId").is_some());
        assert!(json["cuttingPlanByBoard"][0]["wasteSegments"][0]
            .get("isUsableOffcut")
            .is_some());
    }

    fn shelf_result() -> OptimizationResult {
        let cuts = vec![RequiredCut::new(24.0, 2, Unit::Inches)];
        let stock = vec![StockBoard::new(60.0, 1, Unit::Inches)];
        optimize(&cuts, &stock, &OptimizerSettings::default()).unwrap()
    }

    #[test]
    fn test_check_result_accepts_clean_run() {
        assert!(check_result(&shelf_result()).is_ok());
    }

    #[test]
    fn test_check_result_rejects_nan_total() {
        let mut result = shelf_result();
        result.total_waste_length = f64::NAN;
        let err = check_result(&result).unwrap_err();
        assert!(matches!(err, OptimizerError::NumericFault(ref msg) if msg.contains("total waste length")));
    }

    #[test]
    fn test_check_result_rejects_untiled_board() {
        let mut result = shelf_result();
        let plan = &mut result.cutting_plan_by_board[0];
        let end = plan.original_length;
        plan.waste_segments.push(WasteSegment {
            length: 5.0,
            x_position: end,
            is_usable_offcut: false,
            kind: WasteKind::Gap,
        });
        let err = check_result(&result).unwrap_err();
        assert!(matches!(err, OptimizerError::NumericFault(ref msg) if msg.contains("covers")));

        let mut result = shelf_result();
        result.cutting_plan_by_board[0].original_length = f64::INFINITY;
        assert!(matches!(
            check_result(&result),
            Err(OptimizerError::NumericFault(_))
        ));
    }

    #[test]
    fn test_batch_preserves_order() {
        let small = OptimizationJob {
            required_cuts: vec![RequiredCut::new(10.0, 1, Unit::Inches)],
            stock_lumber: vec![StockBoard::new(20.0, 1, Unit::Inches)],
            settings: OptimizerSettings::default(),
        };
        let empty = OptimizationJob::default();
        let results = optimize_batch(&[small, empty]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().placed_count(), 1);
        assert_eq!(results[1].as_ref().unwrap().placed_count(), 0);
    }
}
