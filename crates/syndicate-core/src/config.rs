//! Configuration System
//!
//! Tuning parameters loaded from a TOML file. Every section falls back to its
//! defaults, so a partial file only overrides what it names.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Complete engine configuration.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub events: EventConfig,
    #[serde(default)]
    pub conflict: ConflictConfig,
    #[serde(default)]
    pub loyalty: LoyaltyConfig,
    #[serde(default)]
    pub council: CouncilConfig,
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from the default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::from_file(DEFAULT_TUNING_PATH).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", DEFAULT_TUNING_PATH, e);
            Self::default()
        })
    }

    /// Renders this configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Starting balances, upkeep and prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub starting_cash: i64,
    pub starting_reputation: i32,
    pub starting_heat: i32,
    pub starting_intel: i32,
    pub starting_influence: i32,
    /// Daily pay per soldier
    pub soldier_stipend: i64,
    /// Home-district protection money at reputation 50
    pub racket_base: i64,
    /// Heat at which the police want their cut
    pub payoff_heat_threshold: i32,
    /// Daily police payoff above the threshold
    pub police_payoff: i64,
    /// Natural heat decay per day
    pub heat_decay: i32,
    /// Daily income per trade agreement
    pub trade_income: i64,
    /// Revenue multiplier for upgraded buildings
    pub upgrade_multiplier: f64,
    pub soldier_recruit_cost: i64,
    pub officer_recruit_cost: i64,
    pub officer_recruit_min_reputation: i32,
    pub heal_cost: i64,
    pub bail_cost: i64,
    pub bail_influence: i32,
    pub gift_cost: i64,
    pub bonus_cost: i64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_cash: 10_000,
            starting_reputation: 30,
            starting_heat: 10,
            starting_intel: 20,
            starting_influence: 20,
            soldier_stipend: 50,
            racket_base: 300,
            payoff_heat_threshold: 70,
            police_payoff: 400,
            heat_decay: 3,
            trade_income: 300,
            upgrade_multiplier: 1.5,
            soldier_recruit_cost: 500,
            officer_recruit_cost: 3_000,
            officer_recruit_min_reputation: 20,
            heal_cost: 1_000,
            bail_cost: 2_000,
            bail_influence: 5,
            gift_cost: 500,
            bonus_cost: 1_000,
        }
    }
}

/// Auto-advance timer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Tick period at 1x speed, in milliseconds
    pub base_tick_ms: u64,
    /// Phase progress gained per tick (progress runs 0-100)
    pub progress_per_tick: u32,
    /// Chance per tick, at 1x, of a spontaneous event
    pub spontaneous_event_chance: f64,
    pub max_speed: u8,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            base_tick_ms: 250,
            progress_per_tick: 5,
            spontaneous_event_chance: 0.01,
            max_speed: 4,
        }
    }
}

/// Event generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Chance of an event at the end of each phase
    pub phase_event_chance: f64,
    /// Baseline weight of the always-valid business opportunity
    pub opportunity_base_weight: f64,
    /// Heat at which shakedowns become possible
    pub shakedown_min_heat: i32,
    /// Rival tension at which attacks become possible
    pub rival_attack_min_tension: i32,
    /// Rival relationship at or below which assassins are sent
    pub assassination_max_relationship: i32,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            phase_event_chance: 0.35,
            opportunity_base_weight: 10.0,
            shakedown_min_heat: 30,
            rival_attack_min_tension: 60,
            assassination_max_relationship: -60,
        }
    }
}

/// Conflict resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictConfig {
    /// Soldiers at or below this loyalty do not fight
    pub soldier_loyalty_threshold: i32,
    /// Specialist enforcement is divided by this before being added
    pub specialist_divisor: u32,
    /// Bonus strength for a battle-hardened key officer
    pub battle_hardened_bonus: u32,
    /// Strength per rebel soldier
    pub rebel_soldier_value: u32,
    /// Police strength per point of heat
    pub police_strength_per_heat: f64,
    /// Share of an allied rival's strength lent in a fight
    pub ally_strength_share: f64,
    pub victory_casualties_min: u32,
    pub victory_casualties_max: u32,
    pub defeat_casualties_min: u32,
    pub defeat_casualties_max: u32,
    pub victory_reputation: i32,
    pub victory_face: i32,
    pub defeat_reputation: i32,
    pub defeat_loyalty: i32,
    pub battle_hardened_chance: f64,
    pub key_officer_injury_chance: f64,
    pub wound_days: u32,
    pub wound_energy_floor: u32,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            soldier_loyalty_threshold: 30,
            specialist_divisor: 2,
            battle_hardened_bonus: 5,
            rebel_soldier_value: 8,
            police_strength_per_heat: 1.2,
            ally_strength_share: 0.25,
            victory_casualties_min: 5,
            victory_casualties_max: 20,
            defeat_casualties_min: 20,
            defeat_casualties_max: 50,
            victory_reputation: 8,
            victory_face: 5,
            defeat_reputation: 10,
            defeat_loyalty: 5,
            battle_hardened_chance: 0.3,
            key_officer_injury_chance: 0.2,
            wound_days: 3,
            wound_energy_floor: 10,
        }
    }
}

/// Loyalty thresholds and shocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltyConfig {
    /// Below this an officer is considered disloyal
    pub disloyal_threshold: i32,
    /// Flat penalty applied to every officer by a loyalty shock
    pub shock_penalty: i32,
    /// Daily loyalty decay while testing the waters
    pub testing_waters_decay: i32,
    /// Officers at or below this loyalty may stage a coup
    pub coup_loyalty_threshold: i32,
    /// Internal friction required for a coup
    pub coup_friction_threshold: i32,
    /// Soldiers needed before a coup can split the organization
    pub coup_min_soldiers: usize,
    /// Soldiers below this loyalty start deserting
    pub desertion_threshold: i32,
    /// Daily chance a deserting soldier actually leaves
    pub desertion_chance: f64,
    /// Face needed to be promoted
    pub promotion_face: i32,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            disloyal_threshold: 25,
            shock_penalty: 15,
            testing_waters_decay: 2,
            coup_loyalty_threshold: 15,
            coup_friction_threshold: 85,
            coup_min_soldiers: 4,
            desertion_threshold: 20,
            desertion_chance: 0.5,
            promotion_face: 60,
        }
    }
}

/// Council voting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CouncilConfig {
    pub interval_days: u32,
    pub seats: usize,
    pub max_motions: usize,
    pub veto_cost: i32,
    pub force_vote_cost: i32,
    pub concur_influence: i32,
    pub veto_loyalty_penalty: i32,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self {
            interval_days: syndicate_events::COUNCIL_INTERVAL_DAYS,
            seats: 3,
            max_motions: 2,
            veto_cost: 10,
            force_vote_cost: 15,
            concur_influence: 5,
            veto_loyalty_penalty: 5,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml(
            r#"
            [economy]
            starting_cash = 5000

            [council]
            veto_cost = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.economy.starting_cash, 5000);
        assert_eq!(config.economy.soldier_stipend, 50);
        assert_eq!(config.council.veto_cost, 25);
        assert_eq!(config.council.interval_days, 10);
        assert_eq!(config.timer.max_speed, 4);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config.loyalty.disloyal_threshold, 25);
        assert_eq!(config.conflict.soldier_loyalty_threshold, 30);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = EngineConfig::from_toml("[economy\nstarting_cash = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let original = EngineConfig::default();
        let text = original.to_toml().unwrap();
        let parsed = EngineConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.events.phase_event_chance, original.events.phase_event_chance);
        assert_eq!(parsed.economy.bail_cost, original.economy.bail_cost);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timer]\nprogress_per_tick = 20").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.timer.progress_per_tick, 20);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineConfig::from_file("/nonexistent/tuning.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
