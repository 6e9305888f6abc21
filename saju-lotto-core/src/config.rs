use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// How month and year boundaries are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMode {
    /// Sun's apparent longitude at the birth instant.
    #[default]
    SolarTerm,
    /// Fixed calendar dates per month; lower precision.
    Approximate,
}

/// Which day a birth between 23:00 and 24:00 belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZiHourMode {
    /// Day pillar follows the civil date.
    #[default]
    SameDay,
    /// 23:00 already counts as the next day.
    NextDay,
}

/// Which lunar calendar converts lunar birth dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LunarSystem {
    /// Korean almanac, new moons dated at the Korean meridian.
    #[default]
    Korean,
    /// Chinese calendar table (Beijing time).
    Chinese,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    /// Offset of the birth's local civil time from UT (KST = +540).
    pub utc_offset_minutes: i32,
    pub boundary: BoundaryMode,
    pub zi_hour: ZiHourMode,
    pub lunar: LunarSystem,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 9 * 60,
            boundary: BoundaryMode::SolarTerm,
            zi_hour: ZiHourMode::SameDay,
            lunar: LunarSystem::Korean,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BiasConfig {
    /// Boost added per occurrence of a dominant element.
    pub per_count_boost: f64,
    /// Ceiling for any single boost factor.
    pub max_boost: f64,
}

impl Default for BiasConfig {
    fn default() -> Self {
        Self {
            per_count_boost: 0.125,
            max_boost: 2.0,
        }
    }
}

/// Base weight model applied to the draw history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightModel {
    /// Smoothed appearance frequency; `alpha` is the Dirichlet prior.
    Frequency { alpha: f64 },
    /// Exponentially decayed recency; `alpha` is the per-draw decay.
    Ewma { alpha: f64 },
    Uniform,
}

impl Default for WeightModel {
    fn default() -> Self {
        WeightModel::Frequency { alpha: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorConfig {
    pub model: WeightModel,
    /// Number of most recent draws fed to the model; `None` uses all.
    pub window: Option<u32>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            model: WeightModel::default(),
            window: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub calendar: CalendarConfig,
    pub bias: BiasConfig,
    pub selector: SelectorConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> CoreResult<()> {
        let offset = self.calendar.utc_offset_minutes;
        if !(-12 * 60..=14 * 60).contains(&offset) {
            return Err(CoreError::InvalidConfig(format!("utc_offset_minutes {offset} out of range")));
        }
        let bias = &self.bias;
        if !(bias.per_count_boost.is_finite() && bias.per_count_boost >= 0.0) {
            return Err(CoreError::InvalidConfig(format!(
                "per_count_boost must be a non-negative number, got {}",
                bias.per_count_boost
            )));
        }
        if !(bias.max_boost.is_finite() && bias.max_boost >= 1.0) {
            return Err(CoreError::InvalidConfig(format!(
                "max_boost must be at least 1.0, got {}",
                bias.max_boost
            )));
        }
        match self.selector.model {
            WeightModel::Frequency { alpha } if !(alpha.is_finite() && alpha > 0.0) => {
                return Err(CoreError::InvalidConfig(format!("frequency alpha must be positive, got {alpha}")));
            }
            WeightModel::Ewma { alpha } if !(alpha > 0.0 && alpha <= 1.0) => {
                return Err(CoreError::InvalidConfig(format!("ewma alpha must be in (0, 1], got {alpha}")));
            }
            _ => {}
        }
        if self.selector.window == Some(0) {
            return Err(CoreError::InvalidConfig("window must be at least 1".into()));
        }
        Ok(())
    }
}

pub fn save_config(config: &EngineConfig, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_config(path: &Path) -> anyhow::Result<EngineConfig> {
    let json = std::fs::read_to_string(path)?;
    let config: EngineConfig = serde_json::from_str(&json)?;
    config.validate()?;
    Ok(config)
}
