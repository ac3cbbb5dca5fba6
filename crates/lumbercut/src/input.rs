//! Line items and settings supplied by the caller.
//!
//! Field names serialize in camelCase to match the calculator front end.
//! Numeric fields accept either numbers or numeric strings, since form inputs
//! arrive as text; anything unparsable reads as 0 and is then skipped by the
//! expander like any other non-positive value.

use serde::{Deserialize, Serialize};

use crate::error::{OptimizerError, Result};
use crate::units::{CostUnit, Unit};

/// A required cut line: `quantity` pieces of `length`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredCut {
    /// Line id. Empty ids are replaced by `cut-<n>` during expansion.
    #[serde(default)]
    pub id: String,
    /// Piece length in `unit`.
    #[serde(deserialize_with = "lenient::number")]
    pub length: f64,
    /// Number of pieces.
    #[serde(deserialize_with = "lenient::quantity")]
    pub quantity: u32,
    /// Unit of `length`.
    #[serde(default)]
    pub unit: Unit,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Priority pieces are offered stock before regular pieces.
    #[serde(default)]
    pub priority: bool,
    /// Carried through to the plan for display; placement ignores it.
    #[serde(default)]
    pub grain_match: bool,
}

impl RequiredCut {
    /// Create a cut line with no label and no flags.
    pub fn new(length: f64, quantity: u32, unit: Unit) -> Self {
        Self {
            id: String::new(),
            length,
            quantity,
            unit,
            label: String::new(),
            priority: false,
            grain_match: false,
        }
    }

    /// Set the line id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Mark the line as priority.
    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    /// Set the grain-match flag.
    pub fn with_grain_match(mut self, grain_match: bool) -> Self {
        self.grain_match = grain_match;
        self
    }
}

/// A region of a stock board that must not end up in any piece.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectZone {
    /// Offset of the defect from the board start.
    #[serde(deserialize_with = "lenient::number")]
    pub start: f64,
    /// Offset where the defect ends.
    #[serde(deserialize_with = "lenient::number")]
    pub end: f64,
    /// Unit of `start` and `end`.
    #[serde(default)]
    pub unit: Unit,
}

impl DefectZone {
    /// Create a defect zone.
    pub fn new(start: f64, end: f64, unit: Unit) -> Self {
        Self { start, end, unit }
    }
}

/// A stock line: `quantity` boards of `length`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockBoard {
    /// Line id. Empty ids are replaced by `stock-<n>` during expansion.
    #[serde(default)]
    pub id: String,
    /// Board length in `unit`.
    #[serde(deserialize_with = "lenient::number")]
    pub length: f64,
    /// Number of boards on hand.
    #[serde(deserialize_with = "lenient::quantity")]
    pub quantity: u32,
    /// Unit of `length`.
    #[serde(default)]
    pub unit: Unit,
    /// Price per `cost_unit` of board length.
    #[serde(default, deserialize_with = "lenient::number")]
    pub cost_per_unit: f64,
    /// Length the price is quoted against.
    #[serde(default)]
    pub cost_unit: CostUnit,
    /// Defects, in any order.
    #[serde(default)]
    pub defect_zones: Vec<DefectZone>,
}

impl StockBoard {
    /// Create a free stock line with no defects.
    pub fn new(length: f64, quantity: u32, unit: Unit) -> Self {
        Self {
            id: String::new(),
            length,
            quantity,
            unit,
            cost_per_unit: 0.0,
            cost_unit: CostUnit::PerFoot,
            defect_zones: Vec::new(),
        }
    }

    /// Set the line id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the price.
    pub fn with_cost(mut self, cost_per_unit: f64, cost_unit: CostUnit) -> Self {
        self.cost_per_unit = cost_per_unit;
        self.cost_unit = cost_unit;
        self
    }

    /// Add a defect zone.
    pub fn with_defect(mut self, start: f64, end: f64, unit: Unit) -> Self {
        self.defect_zones.push(DefectZone::new(start, end, unit));
        self
    }
}

/// What the optimizer is asked to favour.
///
/// Only waste minimization has its own logic; the other goals are accepted
/// and currently produce the same plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationGoal {
    /// Minimize total waste.
    #[default]
    MinimizeWaste,
    /// Use as few boards as possible.
    MinimizeBoards,
    /// Place priority cuts before anything else.
    PrioritizeCuts,
    /// Leave long usable offcuts.
    MaximizeOffcuts,
}

impl OptimizationGoal {
    /// Every goal, in UI order.
    pub const ALL: [OptimizationGoal; 4] = [
        OptimizationGoal::MinimizeWaste,
        OptimizationGoal::MinimizeBoards,
        OptimizationGoal::PrioritizeCuts,
        OptimizationGoal::MaximizeOffcuts,
    ];

    /// Serialized name.
    pub fn name(self) -> &'static str {
        match self {
            OptimizationGoal::MinimizeWaste => "minimize_waste",
            OptimizationGoal::MinimizeBoards => "minimize_boards",
            OptimizationGoal::PrioritizeCuts => "prioritize_cuts",
            OptimizationGoal::MaximizeOffcuts => "maximize_offcuts",
        }
    }
}

/// Saw and offcut parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizerSettings {
    /// Width of material removed by each saw cut.
    #[serde(deserialize_with = "lenient::number")]
    pub saw_kerf: f64,
    /// Unit of `saw_kerf`.
    pub kerf_unit: Unit,
    /// Shortest leftover still worth keeping.
    #[serde(deserialize_with = "lenient::number")]
    pub min_offcut_length: f64,
    /// Unit of `min_offcut_length`; waste totals are reported in it too.
    pub min_offcut_unit: Unit,
    /// Optimization goal.
    pub optimization_goal: OptimizationGoal,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            saw_kerf: 0.125,
            kerf_unit: Unit::Inches,
            min_offcut_length: 6.0,
            min_offcut_unit: Unit::Inches,
            optimization_goal: OptimizationGoal::MinimizeWaste,
        }
    }
}

impl OptimizerSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.saw_kerf.is_finite() || self.saw_kerf < 0.0 {
            return Err(OptimizerError::InvalidSettings(format!(
                "saw kerf must be a non-negative number, got {}",
                self.saw_kerf
            )));
        }
        if !self.min_offcut_length.is_finite() || self.min_offcut_length < 0.0 {
            return Err(OptimizerError::InvalidSettings(format!(
                "minimum offcut length must be a non-negative number, got {}",
                self.min_offcut_length
            )));
        }
        Ok(())
    }

    /// Kerf in the base unit.
    pub fn kerf_base(&self) -> f64 {
        self.kerf_unit.to_base(self.saw_kerf)
    }

    /// Minimum offcut length in the base unit.
    pub fn min_offcut_base(&self) -> f64 {
        self.min_offcut_unit.to_base(self.min_offcut_length)
    }
}

/// Serde helpers for form-style numeric input.
pub mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    fn parse_text(text: &str) -> f64 {
        text.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| !v.is_nan())
            .unwrap_or(0.0)
    }

    /// A length or price: numbers pass through, text is parsed, junk is 0.
    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Number(value) => value,
            NumberOrText::Text(text) => parse_text(&text),
        })
    }

    /// Like [`number`], for fields that may be absent or `null`.
    ///
    /// Pair with `#[serde(default)]` so a missing field reads as `None`.
    pub fn optional_number<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        Ok(
            Option::<NumberOrText>::deserialize(deserializer)?.map(|value| match value {
                NumberOrText::Number(value) => value,
                NumberOrText::Text(text) => parse_text(&text),
            }),
        )
    }

    /// A piece count: anything other than a non-negative whole number is 0.
    pub fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Number(value) => value,
            NumberOrText::Text(text) => parse_text(&text),
        };
        if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
            Ok(value as u32)
        } else {
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = OptimizerSettings::default();
        assert!(settings.validate().is_ok());
        assert!((settings.kerf_base() - 0.125).abs() < 1e-12);
        assert!((settings.min_offcut_base() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_settings() {
        let negative = OptimizerSettings {
            saw_kerf: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(OptimizerError::InvalidSettings(_))
        ));

        let nan = OptimizerSettings {
            min_offcut_length: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_cut_from_form_strings() {
        let json = r#"{
            "id": "a",
            "length": "24.5",
            "quantity": "3",
            "unit": "cm",
            "label": "Rail",
            "priority": true,
            "grainMatch": true
        }"#;
        let cut: RequiredCut = serde_json::from_str(json).unwrap();
        assert_eq!(cut.length, 24.5);
        assert_eq!(cut.quantity, 3);
        assert_eq!(cut.unit, Unit::Cm);
        assert!(cut.priority);
        assert!(cut.grain_match);
    }

    #[test]
    fn test_lenient_junk_reads_as_zero() {
        let cut: RequiredCut =
            serde_json::from_str(r#"{"length": "", "quantity": "lots"}"#).unwrap();
        assert_eq!(cut.length, 0.0);
        assert_eq!(cut.quantity, 0);
        assert_eq!(cut.unit, Unit::Inches);

        let cut: RequiredCut = serde_json::from_str(r#"{"length": 10, "quantity": 2.5}"#).unwrap();
        assert_eq!(cut.quantity, 0);

        let cut: RequiredCut = serde_json::from_str(r#"{"length": "NaN", "quantity": -1}"#).unwrap();
        assert_eq!(cut.length, 0.0);
        assert_eq!(cut.quantity, 0);
    }

    #[test]
    fn test_optional_number() {
        #[derive(Deserialize)]
        struct Partial {
            #[serde(default, deserialize_with = "lenient::optional_number")]
            kerf: Option<f64>,
        }

        let parse = |json: &str| serde_json::from_str::<Partial>(json).unwrap().kerf;
        assert_eq!(parse(r#"{"kerf": "0.125"}"#), Some(0.125));
        assert_eq!(parse(r#"{"kerf": 3}"#), Some(3.0));
        assert_eq!(parse(r#"{"kerf": null}"#), None);
        assert_eq!(parse("{}"), None);
    }

    #[test]
    fn test_stock_from_json() {
        let json = r#"{
            "id": "s1",
            "length": 8,
            "quantity": 2,
            "unit": "feet",
            "costPerUnit": "1.25",
            "costUnit": "per_foot",
            "defectZones": [{"id": "d1", "start": "10", "end": 12, "unit": "inches"}]
        }"#;
        let stock: StockBoard = serde_json::from_str(json).unwrap();
        assert_eq!(stock.length, 8.0);
        assert_eq!(stock.unit, Unit::Feet);
        assert_eq!(stock.cost_per_unit, 1.25);
        assert_eq!(stock.defect_zones, vec![DefectZone::new(10.0, 12.0, Unit::Inches)]);
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings: OptimizerSettings =
            serde_json::from_str(r#"{"sawKerf": "3", "kerfUnit": "mm"}"#).unwrap();
        assert_eq!(settings.saw_kerf, 3.0);
        assert_eq!(settings.kerf_unit, Unit::Mm);
        assert_eq!(settings.min_offcut_length, 6.0);
        assert_eq!(settings.optimization_goal, OptimizationGoal::MinimizeWaste);

        let goal: OptimizationGoal = serde_json::from_str("\"maximize_offcuts\"").unwrap();
        assert_eq!(goal, OptimizationGoal::MaximizeOffcuts);
    }
}
