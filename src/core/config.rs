//! Engine tunables.
//!
//! Services take an `EngineConfig` at construction. Every field falls back to
//! its default when absent from a JSON document, so partial config files work.

use super::constants::*;
use super::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};

/// How the money formula picks its deviation term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoneyDeviation {
    /// Uniform in [-25, 25]
    Random,
    /// Fixed at the mean (12)
    Mean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub dungeon_map_size: usize,
    pub click_multiplier: f64,
    pub max_battle_ticks: u64,
    pub gym_time_limit: f64,
    pub boss_time_limit: f64,
    pub shiny_chance_route: u32,
    pub shiny_chance_dungeon: u32,
    pub shiny_chance_breeding: u32,
    pub egg_slots: usize,
    pub money_deviation: MoneyDeviation,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dungeon_map_size: DEFAULT_DUNGEON_MAP_SIZE,
            click_multiplier: BOT_CLICK_MULTIPLIER,
            max_battle_ticks: DEFAULT_MAX_BATTLE_TICKS,
            gym_time_limit: GYM_TIME_LIMIT_SECONDS,
            boss_time_limit: BOSS_TIME_LIMIT_SECONDS,
            shiny_chance_route: SHINY_CHANCE_BATTLE,
            shiny_chance_dungeon: SHINY_CHANCE_DUNGEON,
            shiny_chance_breeding: SHINY_CHANCE_BREEDING,
            egg_slots: DEFAULT_EGG_SLOTS,
            money_deviation: MoneyDeviation::Random,
        }
    }
}

impl EngineConfig {
    /// Config with every random money roll pinned to its mean.
    pub fn deterministic() -> Self {
        Self {
            money_deviation: MoneyDeviation::Mean,
            ..Default::default()
        }
    }

    /// Config with every hatchery slot unlocked.
    pub fn full_hatchery() -> Self {
        Self {
            egg_slots: MAX_EGG_SLOTS,
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> GameResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| GameError::Validation(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GameResult<()> {
        if self.dungeon_map_size < MIN_DUNGEON_MAP_SIZE {
            return Err(GameError::Validation(format!(
                "dungeon_map_size must be at least {MIN_DUNGEON_MAP_SIZE}"
            )));
        }
        if self.egg_slots == 0 || self.egg_slots > MAX_EGG_SLOTS {
            return Err(GameError::Validation(format!(
                "egg_slots must be between 1 and {MAX_EGG_SLOTS}"
            )));
        }
        if self.gym_time_limit <= 0.0 || self.boss_time_limit <= 0.0 {
            return Err(GameError::Validation(
                "time limits must be positive".to_string(),
            ));
        }
        if self.shiny_chance_route == 0
            || self.shiny_chance_dungeon == 0
            || self.shiny_chance_breeding == 0
        {
            return Err(GameError::Validation(
                "shiny odds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
