//! CLI configuration file and settings layering.
//!
//! Settings are resolved from, lowest to highest precedence: built-in
//! defaults, the config file, the job file's `settings` table, then flags.

use anyhow::{Context, Result};
use lumbercut::input::lenient;
use lumbercut::{OptimizationGoal, OptimizerSettings, Unit};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV: &str = "LUMBERCUT_CONFIG";

/// Partial settings. Only the fields that are present override.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsOverlay {
    #[serde(alias = "saw_kerf", default, deserialize_with = "lenient::optional_number")]
    pub saw_kerf: Option<f64>,
    #[serde(alias = "kerf_unit")]
    pub kerf_unit: Option<Unit>,
    #[serde(
        alias = "min_offcut_length",
        default,
        deserialize_with = "lenient::optional_number"
    )]
    pub min_offcut_length: Option<f64>,
    #[serde(alias = "min_offcut_unit")]
    pub min_offcut_unit: Option<Unit>,
    #[serde(alias = "optimization_goal")]
    pub optimization_goal: Option<OptimizationGoal>,
}

impl SettingsOverlay {
    /// Write every present field onto `settings`.
    pub fn apply(&self, settings: &mut OptimizerSettings) {
        if let Some(kerf) = self.saw_kerf {
            settings.saw_kerf = kerf;
        }
        if let Some(unit) = self.kerf_unit {
            settings.kerf_unit = unit;
        }
        if let Some(length) = self.min_offcut_length {
            settings.min_offcut_length = length;
        }
        if let Some(unit) = self.min_offcut_unit {
            settings.min_offcut_unit = unit;
        }
        if let Some(goal) = self.optimization_goal {
            settings.optimization_goal = goal;
        }
    }
}

/// Contents of the config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Unit lengths are shown in by the text report.
    #[serde(alias = "displayUnit")]
    pub display_unit: Option<Unit>,
    /// Default optimizer settings.
    pub settings: SettingsOverlay,
}

impl Config {
    /// Parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load the config named by `explicit`, else by `LUMBERCUT_CONFIG`, else
    /// fall back to defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        };
        match path {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Settings from the config layer alone.
    pub fn base_settings(&self) -> OptimizerSettings {
        let mut settings = OptimizerSettings::default();
        self.settings.apply(&mut settings);
        settings
    }
}
