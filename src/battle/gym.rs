//! Gym challenges: a timed battle against the leader's team for a badge.

use super::logic::damage_per_tick;
use super::timed::{BattleStatus, Opponent, TimedBattle};
use crate::core::{EngineConfig, GameError, GameResult};
use crate::store::{Currency, PlayerStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymPokemon {
    pub name: String,
    pub level: u32,
    pub max_health: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gym {
    pub name: String,
    pub leader: String,
    pub badge: String,
    pub region: u32,
    pub money_reward: u64,
    pub pokemon: Vec<GymPokemon>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GymBattleResult {
    pub gym_name: String,
    pub leader_name: String,
    pub won: bool,
    pub badge: Option<String>,
    pub money_earned: u64,
    pub time_used: f64,
    pub is_first_win: bool,
}

/// Finds a gym by (case-insensitive, partial) town name.
pub fn find_gym<'a>(gyms: &'a [Gym], name: &str) -> GameResult<&'a Gym> {
    let needle = name.to_lowercase();
    gyms.iter()
        .find(|g| g.name.to_lowercase().contains(&needle))
        .ok_or_else(|| GameError::not_found("gym", name))
}

pub fn start_gym_battle(gym: &Gym, party_attack: u64, config: &EngineConfig) -> TimedBattle {
    let opponents = gym
        .pokemon
        .iter()
        .map(|p| Opponent::new(p.name.clone(), p.level, p.max_health))
        .collect();
    TimedBattle::new(
        opponents,
        damage_per_tick(party_attack, config.click_multiplier),
        config.gym_time_limit,
    )
}

/// Pays out a finished gym battle: money on every win, the badge on the first.
pub fn complete_gym_battle(
    store: &mut impl PlayerStore,
    player_id: u64,
    gym: &Gym,
    battle: &TimedBattle,
) -> GameResult<GymBattleResult> {
    if battle.status == BattleStatus::InProgress {
        return Err(GameError::StateConflict(
            "gym battle is still in progress".to_string(),
        ));
    }

    let won = battle.status == BattleStatus::Won;
    let mut result = GymBattleResult {
        gym_name: gym.name.clone(),
        leader_name: gym.leader.clone(),
        won,
        badge: None,
        money_earned: 0,
        time_used: battle.time_used(),
        is_first_win: false,
    };
    if won {
        result.is_first_win = store.add_badge(player_id, &gym.badge);
        result.badge = Some(gym.badge.clone());
        result.money_earned = gym.money_reward;
        store.add_currency(player_id, Currency::PokeDollar, gym.money_reward as i64);
        tracing::info!(player_id, gym = %gym.name, first = result.is_first_win, "gym won");
    }
    Ok(result)
}
