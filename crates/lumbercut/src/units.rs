//! Length and cost units.
//!
//! All optimizer arithmetic happens in [`BASE_UNIT`] (inches). Values are
//! converted on the way in and converted back for display; nothing is rounded
//! in between.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OptimizerError;

/// Unit every internal length is expressed in.
pub const BASE_UNIT: Unit = Unit::Inches;

/// A linear unit a user can enter lengths in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Inches (the base unit).
    #[default]
    Inches,
    /// Feet.
    Feet,
    /// Centimeters.
    Cm,
    /// Meters.
    Meters,
    /// Millimeters.
    Mm,
}

impl Unit {
    /// Every supported unit, in UI order.
    pub const ALL: [Unit; 5] = [Unit::Inches, Unit::Feet, Unit::Cm, Unit::Meters, Unit::Mm];

    /// How many base units (inches) one of this unit is.
    pub fn inches_per_unit(self) -> f64 {
        match self {
            Unit::Inches => 1.0,
            Unit::Feet => 12.0,
            Unit::Cm => 0.393701,
            Unit::Meters => 39.3701,
            Unit::Mm => 0.0393701,
        }
    }

    /// Convert a value in this unit to the base unit.
    pub fn to_base(self, value: f64) -> f64 {
        value * self.inches_per_unit()
    }

    /// Convert a base-unit value into this unit.
    pub fn from_base(self, value: f64) -> f64 {
        value / self.inches_per_unit()
    }

    /// Short suffix for display ("in", "ft", ...).
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Inches => "in",
            Unit::Feet => "ft",
            Unit::Cm => "cm",
            Unit::Meters => "m",
            Unit::Mm => "mm",
        }
    }

    /// Serialized name ("inches", "feet", ...).
    pub fn name(self) -> &'static str {
        match self {
            Unit::Inches => "inches",
            Unit::Feet => "feet",
            Unit::Cm => "cm",
            Unit::Meters => "meters",
            Unit::Mm => "mm",
        }
    }
}

/// Convert `value` from one unit to another.
pub fn convert(value: f64, from: Unit, to: Unit) -> f64 {
    if from == to {
        return value;
    }
    to.from_base(from.to_base(value))
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for Unit {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" | "inch" | "inches" | "\"" => Ok(Unit::Inches),
            "ft" | "foot" | "feet" | "'" => Ok(Unit::Feet),
            "cm" | "centimeter" | "centimeters" => Ok(Unit::Cm),
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(Unit::Meters),
            "mm" | "millimeter" | "millimeters" => Ok(Unit::Mm),
            _ => Err(OptimizerError::UnknownUnit(s.to_string())),
        }
    }
}

/// The length a stock price is quoted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostUnit {
    /// Price per foot of board.
    #[default]
    PerFoot,
    /// Price per meter of board.
    PerMeter,
}

impl CostUnit {
    /// The length unit the price refers to.
    pub fn length_unit(self) -> Unit {
        match self {
            CostUnit::PerFoot => Unit::Feet,
            CostUnit::PerMeter => Unit::Meters,
        }
    }

    /// Turn a quoted rate into a price per base unit.
    pub fn per_base_unit(self, rate: f64) -> f64 {
        rate / self.length_unit().inches_per_unit()
    }
}

impl fmt::Display for CostUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostUnit::PerFoot => f.write_str("per foot"),
            CostUnit::PerMeter => f.write_str("per meter"),
        }
    }
}

impl FromStr for CostUnit {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "per_foot" | "per_ft" | "foot" | "ft" => Ok(CostUnit::PerFoot),
            "per_meter" | "per_m" | "meter" | "m" => Ok(CostUnit::PerMeter),
            _ => Err(OptimizerError::UnknownCostUnit(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_to_base() {
        assert_relative_eq!(Unit::Feet.to_base(8.0), 96.0);
        assert_relative_eq!(Unit::Inches.to_base(0.125), 0.125);
        assert_relative_eq!(Unit::Meters.to_base(1.0), 39.3701);
        assert_relative_eq!(Unit::Mm.to_base(1000.0), 39.3701, epsilon = 1e-9);
    }

    #[test]
    fn test_from_base_inverts_to_base() {
        for unit in Unit::ALL {
            let value = 123.456;
            assert_relative_eq!(unit.from_base(unit.to_base(value)), value, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_convert() {
        assert_relative_eq!(convert(2.0, Unit::Feet, Unit::Inches), 24.0);
        assert_relative_eq!(convert(100.0, Unit::Cm, Unit::Meters), 1.0, epsilon = 1e-6);
        assert_eq!(convert(7.5, Unit::Mm, Unit::Mm), 7.5);
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!("in".parse::<Unit>().unwrap(), Unit::Inches);
        assert_eq!(" Feet ".parse::<Unit>().unwrap(), Unit::Feet);
        assert_eq!("metres".parse::<Unit>().unwrap(), Unit::Meters);
        assert_eq!("MM".parse::<Unit>().unwrap(), Unit::Mm);
        assert!(matches!(
            "cubits".parse::<Unit>(),
            Err(OptimizerError::UnknownUnit(_))
        ));
    }

    #[test]
    fn test_unit_serde_names() {
        let json = serde_json::to_string(&Unit::Meters).unwrap();
        assert_eq!(json, "\"meters\"");
        let parsed: Unit = serde_json::from_str("\"cm\"").unwrap();
        assert_eq!(parsed, Unit::Cm);
        assert!(serde_json::from_str::<Unit>("\"yards\"").is_err());
    }

    #[test]
    fn test_cost_per_base_unit() {
        assert_relative_eq!(CostUnit::PerFoot.per_base_unit(12.0), 1.0);
        assert_relative_eq!(CostUnit::PerMeter.per_base_unit(39.3701), 1.0);
        assert_eq!("per-meter".parse::<CostUnit>().unwrap(), CostUnit::PerMeter);
        assert_eq!(
            serde_json::to_string(&CostUnit::PerFoot).unwrap(),
            "\"per_foot\""
        );
    }
}
