//! Rules configuration with documented constants
//!
//! All designer-chosen numbers used by the combat engine are collected here.
//! Probability curves are fixed by these values, they are never calibrated at runtime.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{CombatError, Result};

/// Configuration for combat and stacking rules
///
/// Every curve of the form `1 - c^(-ratio)` is parameterised here by its
/// probability at ratio 1 (or its equivalent), which is how the designer
/// thinks about them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    // === STACKING ===
    /// Maximum number of ordinary land units in one hex
    ///
    /// One supply unit and one paratrooper are not counted against this limit.
    pub land_stacking_limit: usize,

    /// Maximum number of other land units a supply unit may share a hex with
    ///
    /// A paratrooper is not counted against this limit.
    pub supply_stacking_limit: usize,

    /// Maximum number of naval units at sea in one hex
    pub naval_stacking_limit: usize,

    // === LAND COMBAT ===
    /// The attacker can never lose more than this many strength points directly
    pub max_attacker_loss: u32,

    /// The `a` in `c(s) = a/s + 1` for the defender loss curve
    ///
    /// At 2.0, a ratio of 1 gives about 2/3 chance of losing something and
    /// about 1/6 chance of losing 10 strength points.
    pub land_loss_coefficient: f64,

    // === AIR/NAVAL COMBAT ===
    /// Probability of a unit being damaged at ratio 1
    pub damage_probability_at_ratio_1: f64,

    /// Probability of a unit being eliminated outright at ratio 1
    pub elimination_probability_at_ratio_1: f64,

    /// Probability of a defender retreating (or its mission being canceled) at ratio 1
    pub cancel_or_retreat_probability_at_ratio_1: f64,

    /// Multiplier applied to air strength against surface units in kamikaze mode
    pub kamikaze_multiplier: f64,

    // === BOMBING ===
    /// Modified bomber strength giving a 50% chance of success
    pub bombing_even_odds_strength: f64,

    /// Probability that one of the bombers is damaged by flak
    pub bombing_attacker_damage_probability: f64,

    // === AMPHIBIOUS ASSAULTS / PARADROPS ===
    /// Base success probability of a landing
    pub landing_base_success: f64,

    /// Bonus when amphibious units and paratroopers land together
    pub landing_combined_bonus: f64,

    /// Bonus when at least one marine takes part in the amphibious assault
    pub landing_marine_bonus: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            land_stacking_limit: 2,
            supply_stacking_limit: 3,
            naval_stacking_limit: 5,

            max_attacker_loss: 3,
            land_loss_coefficient: 2.0,

            damage_probability_at_ratio_1: 0.5,
            elimination_probability_at_ratio_1: 0.05,
            cancel_or_retreat_probability_at_ratio_1: 0.5,
            kamikaze_multiplier: 3.0,

            bombing_even_odds_strength: 5.0,
            bombing_attacker_damage_probability: 0.2,

            landing_base_success: 0.5,
            landing_combined_bonus: 0.25,
            landing_marine_bonus: 0.25,
        }
    }
}

impl RulesConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML. Missing keys keep their default values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RulesConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let probabilities = [
            ("damage_probability_at_ratio_1", self.damage_probability_at_ratio_1),
            ("elimination_probability_at_ratio_1", self.elimination_probability_at_ratio_1),
            (
                "cancel_or_retreat_probability_at_ratio_1",
                self.cancel_or_retreat_probability_at_ratio_1,
            ),
            ("bombing_attacker_damage_probability", self.bombing_attacker_damage_probability),
        ];
        for (name, value) in probabilities {
            // Curves at ratio 1 must be strictly inside [0, 1) to define a base c >= 1
            if !(0.0..1.0).contains(&value) {
                return Err(CombatError::Config(format!(
                    "{} ({}) must be in [0, 1)",
                    name, value
                )));
            }
        }

        if self.land_loss_coefficient <= 0.0 {
            return Err(CombatError::Config(format!(
                "land_loss_coefficient ({}) must be positive",
                self.land_loss_coefficient
            )));
        }

        if self.bombing_even_odds_strength <= 0.0 {
            return Err(CombatError::Config(format!(
                "bombing_even_odds_strength ({}) must be positive",
                self.bombing_even_odds_strength
            )));
        }

        let best_landing =
            self.landing_base_success + self.landing_combined_bonus + self.landing_marine_bonus;
        if self.landing_base_success < 0.0 || best_landing > 1.0 {
            return Err(CombatError::Config(format!(
                "landing success probabilities must stay within [0, 1], best case is {}",
                best_landing
            )));
        }

        if self.land_stacking_limit == 0 || self.naval_stacking_limit == 0 {
            return Err(CombatError::Config("stacking limits must be positive".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RulesConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RulesConfig::from_toml_str("naval_stacking_limit = 4\n").unwrap();
        assert_eq!(config.naval_stacking_limit, 4);
        assert_eq!(config.land_stacking_limit, 2);
        assert_eq!(config.max_attacker_loss, 3);
    }

    #[test]
    fn test_probability_out_of_range_rejected() {
        let result = RulesConfig::from_toml_str("damage_probability_at_ratio_1 = 1.0\n");
        assert!(matches!(result, Err(CombatError::Config(_))));
    }

    #[test]
    fn test_landing_bonuses_bounded() {
        let config = RulesConfig {
            landing_base_success: 0.8,
            ..RulesConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_toml_error() {
        let result = RulesConfig::from_toml_str("land_stacking_limit = \"two\"");
        assert!(matches!(result, Err(CombatError::Toml(_))));
    }
}
