//! Expansion of line items into individual pieces and boards.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::{ensure_finite, Result};
use crate::input::{DefectZone, RequiredCut, StockBoard};
use crate::plan::Span;
use crate::units::{Unit, BASE_UNIT};

/// One physical piece to be cut.
#[derive(Debug, Clone, PartialEq)]
pub struct CutInstance {
    /// Unique id (`<line>#<n>`).
    pub id: String,
    /// Id of the originating line, unique within the cut list.
    pub line_id: String,
    /// Length in base units.
    pub length: f64,
    /// Display label.
    pub label: String,
    /// Priority flag.
    pub priority: bool,
    /// Grain-match flag.
    pub grain_match: bool,
    /// Unit the line was entered in.
    pub unit: Unit,
}

/// One physical stock board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardInstance {
    /// Unique id (`<line>#<n>`).
    pub id: String,
    /// Id of the originating line, unique within the stock list.
    pub line_id: String,
    /// Position of the originating line in the stock list.
    pub line_index: usize,
    /// Length in base units.
    pub length: f64,
    /// Price per base unit of length.
    pub cost_per_base_unit: f64,
    /// Disjoint defect spans, sorted by start.
    pub defects: Vec<Span>,
}

/// One id per line, unique across the list.
///
/// Blank ids become `<prefix>-<index + 1>`. An id already taken by an earlier
/// line gets `-<index + 1>` appended (and further numbers if that is taken too),
/// so instance ids stay unique even when lines share a name.
pub fn line_ids<'a>(raw: impl IntoIterator<Item = &'a str>, prefix: &str) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut ids = Vec::new();

    for (index, raw) in raw.into_iter().enumerate() {
        let trimmed = raw.trim();
        let base = if trimmed.is_empty() {
            format!("{}-{}", prefix, index + 1)
        } else {
            trimmed.to_string()
        };

        let mut id = base.clone();
        let mut n = index + 1;
        while taken.contains(&id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        taken.insert(id.clone());
        ids.push(id);
    }

    ids
}

fn default_label(length: f64) -> String {
    format!("Cut {}{}", length, BASE_UNIT.suffix())
}

/// Expand required-cut lines into pieces, in line order.
///
/// Lines with a non-positive length or zero quantity contribute nothing.
pub fn expand_cuts(lines: &[RequiredCut]) -> Result<Vec<CutInstance>> {
    let mut instances = Vec::new();
    let ids = line_ids(lines.iter().map(|l| l.id.as_str()), "cut");

    for (line, line_id) in lines.iter().zip(ids) {
        let length = ensure_finite(|| format!("length of cut {}", line_id), line.length)?;
        let length = line.unit.to_base(length);
        if length <= 0.0 || line.quantity == 0 {
            continue;
        }

        let label = if line.label.trim().is_empty() {
            default_label(length)
        } else {
            line.label.clone()
        };

        for n in 1..=line.quantity {
            instances.push(CutInstance {
                id: format!("{}#{}", line_id, n),
                line_id: line_id.clone(),
                length,
                label: label.clone(),
                priority: line.priority,
                grain_match: line.grain_match,
                unit: line.unit,
            });
        }
    }

    Ok(instances)
}

/// First-fit-decreasing order: priority pieces first, then longest first.
///
/// The sort is stable, so equal pieces keep their expansion order.
pub fn sort_cuts(cuts: &mut [CutInstance]) {
    cuts.sort_by(|a, b| match (a.priority, b.priority) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => b.length.total_cmp(&a.length),
    });
}

/// Expand stock lines into boards, in line order.
///
/// Boards are not reordered: the packer consumes them as entered.
pub fn expand_stock(lines: &[StockBoard]) -> Result<Vec<BoardInstance>> {
    let mut boards = Vec::new();
    let ids = line_ids(lines.iter().map(|l| l.id.as_str()), "stock");

    for (line_index, (line, line_id)) in lines.iter().zip(ids).enumerate() {
        let length = ensure_finite(|| format!("length of stock {}", line_id), line.length)?;
        let length = line.unit.to_base(length);
        if length <= 0.0 || line.quantity == 0 {
            continue;
        }

        let cost = ensure_finite(|| format!("cost of stock {}", line_id), line.cost_per_unit)?;
        let cost_per_base_unit = if cost > 0.0 {
            line.cost_unit.per_base_unit(cost)
        } else {
            0.0
        };
        let defects = normalize_defects(&line.defect_zones, length, &line_id)?;

        for n in 1..=line.quantity {
            boards.push(BoardInstance {
                id: format!("{}#{}", line_id, n),
                line_id: line_id.clone(),
                line_index,
                length,
                cost_per_base_unit,
                defects: defects.clone(),
            });
        }
    }

    Ok(boards)
}

/// Convert defect zones to base units and make them a disjoint sorted set.
///
/// Zones are clamped to the board, empty zones are dropped, and overlapping
/// or touching zones are merged.
pub fn normalize_defects(zones: &[DefectZone], board_length: f64, line_id: &str) -> Result<Vec<Span>> {
    let mut spans = Vec::with_capacity(zones.len());
    for (idx, zone) in zones.iter().enumerate() {
        let start = ensure_finite(|| format!("defect {} start on stock {}", idx + 1, line_id), zone.start)?;
        let end = ensure_finite(|| format!("defect {} end on stock {}", idx + 1, line_id), zone.end)?;
        let span = Span::new(
            zone.unit.to_base(start).max(0.0),
            zone.unit.to_base(end).min(board_length),
        );
        if !span.is_empty() {
            spans.push(span);
        }
    }

    spans.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    Ok(merged)
}
