//! Plain-text cut list report.

use lumbercut::{OptimizationResult, StockBoardCutPlan, Unit, WasteKind};
use std::fmt::{self, Write};

/// Round for display: lengths to 3 places, percentages to 1, money to 2.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn length(value_base: f64, unit: Unit) -> String {
    format!("{}{}", round_to(unit.from_base(value_base), 3), unit.suffix())
}

/// Write `result` to `out` with board layouts shown in `unit`. `waste_unit` is
/// the unit the run reported its waste totals in (its minimum offcut unit).
pub fn render<W: Write>(
    out: &mut W,
    result: &OptimizationResult,
    unit: Unit,
    waste_unit: Unit,
) -> fmt::Result {
    writeln!(out, "Boards used: {}", result.cutting_plan_by_board.len())?;
    writeln!(out, "Pieces placed: {}", result.placed_count())?;
    if let Some(first) = result.optimal_offcuts.first() {
        writeln!(out, "Longest offcut: {}{}", round_to(first.length, 3), first.unit.suffix())?;
    }
    writeln!(
        out,
        "Waste: {}{} ({}%)",
        round_to(result.total_waste_length, 3),
        waste_unit.suffix(),
        round_to(result.total_waste_percentage, 1)
    )?;
    writeln!(out, "Material cost: ${:.2}", result.total_material_cost)?;
    writeln!(out, "Waste cost: ${:.2}", result.estimated_waste_cost)?;
    writeln!(out, "Calculated in {:.1} ms", result.calculation_time_ms)?;

    for plan in &result.cutting_plan_by_board {
        writeln!(out)?;
        render_board(out, plan, unit)?;
    }

    if !result.stock_utilization.is_empty() {
        writeln!(out, "\nStock utilization:")?;
        for row in &result.stock_utilization {
            writeln!(
                out,
                "  {} ({}{}): {} used, {}%",
                row.stock_id,
                row.original_length,
                row.unit.suffix(),
                row.quantity_used,
                round_to(row.utilization_percentage, 1)
            )?;
        }
    }

    if !result.optimal_offcuts.is_empty() {
        writeln!(out, "\nUsable offcuts:")?;
        for group in &result.optimal_offcuts {
            writeln!(
                out,
                "  {} x {}{} from {}",
                group.count,
                round_to(group.length, 3),
                group.unit.suffix(),
                group.board_ids.join(", ")
            )?;
        }
    }

    if !result.unaccommodated_pieces.is_empty() {
        writeln!(out, "\nCould not place:")?;
        for piece in &result.unaccommodated_pieces {
            writeln!(
                out,
                "  {} x {} ({}{})",
                piece.quantity_remaining,
                piece.label,
                round_to(piece.length, 3),
                piece.unit.suffix()
            )?;
        }
    }

    Ok(())
}

fn render_board<W: Write>(out: &mut W, plan: &StockBoardCutPlan, unit: Unit) -> fmt::Result {
    writeln!(
        out,
        "Board {} ({}, ${:.2})",
        plan.stock_board_instance_id,
        length(plan.original_length, unit),
        plan.material_cost
    )?;

    for cut in &plan.cuts {
        let mut flags = String::new();
        if cut.priority {
            flags.push_str(" [priority]");
        }
        if cut.grain_match {
            flags.push_str(" [grain]");
        }
        writeln!(
            out,
            "  @ {:>10}  {:<20} {}{}",
            length(cut.x_position, unit),
            cut.label,
            length(cut.length, unit),
            flags
        )?;
    }

    for segment in &plan.waste_segments {
        let kind = match segment.kind {
            WasteKind::Gap if segment.is_usable_offcut => "offcut",
            WasteKind::Gap => "scrap",
            WasteKind::Kerf => "kerf",
            WasteKind::Defect => "defect",
        };
        writeln!(
            out,
            "  @ {:>10}  {:<20} {}",
            length(segment.x_position, unit),
            format!("({})", kind),
            length(segment.length, unit)
        )?;
    }

    Ok(())
}
