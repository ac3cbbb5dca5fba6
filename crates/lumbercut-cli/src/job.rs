//! Job files.
//!
//! A job is a cut list plus the available stock, in TOML (`.toml`) or JSON
//! (anything else), using the same camelCase field names as the JSON API.

use anyhow::{Context, Result};
use lumbercut::{OptimizationJob, OptimizerSettings, RequiredCut, StockBoard};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::SettingsOverlay;

/// A job as written on disk; its settings may be partial.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobFile {
    #[serde(alias = "required_cuts")]
    pub required_cuts: Vec<RequiredCut>,
    #[serde(alias = "stock_lumber")]
    pub stock_lumber: Vec<StockBoard>,
    pub settings: SettingsOverlay,
}

impl JobFile {
    /// Read a job, picking the parser from the extension.
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading job {}", path.display()))?;
        Self::parse(&text, is_toml(path)).with_context(|| format!("parsing job {}", path.display()))
    }

    /// Parse job text.
    pub fn parse(text: &str, toml: bool) -> Result<Self> {
        if toml {
            Ok(toml::from_str(text)?)
        } else {
            Ok(serde_json::from_str(text)?)
        }
    }

    /// Layer this job's settings over `base` and bundle it for the optimizer.
    pub fn into_job(self, base: &OptimizerSettings) -> OptimizationJob {
        let mut settings = base.clone();
        self.settings.apply(&mut settings);
        OptimizationJob {
            required_cuts: self.required_cuts,
            stock_lumber: self.stock_lumber,
            settings,
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"))
}

/// The job printed by `lumbercut example`: a small bookshelf.
pub const EXAMPLE_TOML: &str = r#"# Bookshelf cut list
[settings]
sawKerf = 0.125
kerfUnit = "inches"
minOffcutLength = 6
minOffcutUnit = "inches"
optimizationGoal = "minimize_waste"

[[requiredCuts]]
id = "shelf"
label = "Shelf"
length = 34.5
quantity = 4
unit = "inches"

[[requiredCuts]]
id = "side"
label = "Side"
length = 72
quantity = 2
unit = "inches"
priority = true
grainMatch = true

[[requiredCuts]]
id = "kick"
label = "Toe kick"
length = 3
quantity = 1
unit = "feet"

[[stockLumber]]
id = "1x12-8"
length = 8
quantity = 3
unit = "feet"
costPerUnit = 4.25
costUnit = "per_foot"

[[stockLumber.defectZones]]
start = 40
end = 42.5
unit = "inches"
"#;
