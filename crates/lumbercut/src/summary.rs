//! Roll-up of per-board plans into totals.

use crate::expand::{BoardInstance, CutInstance};
use crate::input::{OptimizerSettings, StockBoard};
use crate::plan::{OffcutGroup, StockBoardCutPlan, StockUtilization, UnaccommodatedPiece};

/// Totals across every board of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Non-usable waste in the settings' offcut unit.
    pub total_waste_length: f64,
    /// Non-usable waste over all supplied stock (0-100).
    pub total_waste_percentage: f64,
    /// Waste priced at the first board's rate.
    pub estimated_waste_cost: f64,
    /// Price of every planned board.
    pub total_material_cost: f64,
    /// Per stock line usage.
    pub stock_utilization: Vec<StockUtilization>,
    /// Grouped leftover pieces.
    pub unaccommodated_pieces: Vec<UnaccommodatedPiece>,
    /// Grouped usable offcuts, longest first.
    pub optimal_offcuts: Vec<OffcutGroup>,
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Build the summary for a finished run.
///
/// `boards` is every expanded board instance, used or not; `unplaced` is the
/// work queue left after packing.
pub fn summarize(
    stock: &[StockBoard],
    boards: &[BoardInstance],
    plans: &[StockBoardCutPlan],
    unplaced: &[CutInstance],
    settings: &OptimizerSettings,
) -> Summary {
    let waste_base: f64 = plans.iter().map(StockBoardCutPlan::waste_length).sum();
    let stock_base: f64 = boards.iter().map(|b| b.length).sum();

    // One board's rate stands in for all of them; mixed-price stock makes
    // this an estimate.
    let reference_rate = boards.first().map(|b| b.cost_per_base_unit).unwrap_or(0.0);

    Summary {
        total_waste_length: settings.min_offcut_unit.from_base(waste_base),
        total_waste_percentage: ratio(waste_base, stock_base) * 100.0,
        estimated_waste_cost: waste_base * reference_rate,
        total_material_cost: plans.iter().map(|p| p.material_cost).sum(),
        stock_utilization: stock_utilization(stock, plans),
        unaccommodated_pieces: group_unplaced(unplaced),
        optimal_offcuts: group_offcuts(plans, settings),
    }
}

fn stock_utilization(stock: &[StockBoard], plans: &[StockBoardCutPlan]) -> Vec<StockUtilization> {
    let mut rows: Vec<StockUtilization> = Vec::new();

    for (idx, line) in stock.iter().enumerate() {
        let used: Vec<&StockBoardCutPlan> =
            plans.iter().filter(|p| p.stock_line_index == idx).collect();
        let Some(first) = used.first() else {
            continue;
        };

        let cut_length: f64 = used.iter().map(|p| p.cut_length()).sum();
        let capacity = line.unit.to_base(line.length) * used.len() as f64;
        rows.push(StockUtilization {
            stock_id: first.stock_board_id.clone(),
            original_length: line.length,
            unit: line.unit,
            quantity_used: used.len(),
            utilization_percentage: ratio(cut_length, capacity) * 100.0,
        });
    }

    rows
}

fn group_unplaced(unplaced: &[CutInstance]) -> Vec<UnaccommodatedPiece> {
    let mut groups: Vec<(u64, UnaccommodatedPiece)> = Vec::new();

    for cut in unplaced {
        let key = cut.length.to_bits();
        match groups
            .iter_mut()
            .find(|(k, g)| *k == key && g.label == cut.label && g.unit == cut.unit)
        {
            Some((_, group)) => group.quantity_remaining += 1,
            None => groups.push((
                key,
                UnaccommodatedPiece {
                    label: cut.label.clone(),
                    length: cut.unit.from_base(cut.length),
                    unit: cut.unit,
                    quantity_remaining: 1,
                },
            )),
        }
    }

    groups.into_iter().map(|(_, group)| group).collect()
}

fn group_offcuts(plans: &[StockBoardCutPlan], settings: &OptimizerSettings) -> Vec<OffcutGroup> {
    // Keyed by hundredths of a base unit.
    let mut groups: Vec<(i64, OffcutGroup)> = Vec::new();

    for plan in plans {
        for offcut in plan.offcuts() {
            let key = (offcut.length * 100.0).round() as i64;
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, group)) => {
                    group.count += 1;
                    group.board_ids.push(plan.stock_board_instance_id.clone());
                }
                None => groups.push((
                    key,
                    OffcutGroup {
                        length: settings.min_offcut_unit.from_base(key as f64 / 100.0),
                        unit: settings.min_offcut_unit,
                        count: 1,
                        board_ids: vec![plan.stock_board_instance_id.clone()],
                    },
                )),
            }
        }
    }

    groups.sort_by(|a, b| b.0.cmp(&a.0));
    groups.into_iter().map(|(_, group)| group).collect()
}
