//! Faction configuration with documented constants
//!
//! Every tunable the decision engine reads lives here. Values can be loaded from TOML;
//! anything missing falls back to the defaults below.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;
use crate::core::types::Tick;

/// Configuration for one AI faction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactionConfig {
    /// Name used in logs and battle reports
    pub name: String,

    // === TERRITORY ===
    /// A tile at this hex distance or closer to any own building counts as claimed
    pub claiming_distance: u32,

    // === BUILD ORDER ===
    /// Population the faction aims for
    ///
    /// Recruitment gets a boost while population is below half of this.
    pub target_population: u32,

    // === PROTOCOL (game phase) ===
    /// Turn at which the faction enters the mid game regardless of economy
    pub mid_game_tick: Tick,
    /// Resources needed (together with `mid_game_population`) to enter the mid game early
    pub mid_game_resources: i32,
    /// Population needed (together with `mid_game_resources`) to enter the mid game early
    pub mid_game_population: u32,
    /// Turn at which the faction enters the late game regardless of economy
    pub late_game_tick: Tick,
    pub late_game_resources: i32,
    pub late_game_population: u32,

    // === POSTURE ===
    /// Own army population needed before the faction turns aggressive
    pub aggressive_min_population: u32,

    /// Per-rule weight overrides, keyed by rule name
    ///
    /// Applied once when the weight banks are built.
    pub weights: BTreeMap<String, f64>,
}

impl Default for FactionConfig {
    fn default() -> Self {
        Self {
            name: "macedon".to_string(),
            claiming_distance: 2,
            target_population: 12,
            mid_game_tick: 30,
            mid_game_resources: 60,
            mid_game_population: 10,
            late_game_tick: 90,
            late_game_resources: 150,
            late_game_population: 25,
            aggressive_min_population: 8,
            weights: BTreeMap::new(),
        }
    }
}

impl FactionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a faction configuration from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse and validate a faction configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FactionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mid_game_tick >= self.late_game_tick {
            return Err(ConfigError::Invalid(format!(
                "mid_game_tick ({}) should be < late_game_tick ({})",
                self.mid_game_tick, self.late_game_tick
            )));
        }

        if self.mid_game_resources > self.late_game_resources
            || self.mid_game_population > self.late_game_population
        {
            return Err(ConfigError::Invalid(
                "mid game thresholds must not exceed late game thresholds".into(),
            ));
        }

        for (rule, &value) in &self.weights {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteWeight {
                    rule: rule.clone(),
                    value,
                });
            }
        }

        Ok(())
    }
}
