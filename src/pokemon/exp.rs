//! Experience curve and level-ups (medium-slow curve, cap at level 100).

use super::types::OwnedPokemon;
use crate::core::constants::{ATTACK_PER_LEVEL, EXP_CURVE_FACTOR, MAX_LEVEL, TRAINER_EXP_MULTIPLIER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpResult {
    pub leveled_up: bool,
    pub new_level: u32,
    pub exp_remaining: u64,
}

/// Total experience required to reach `level`.
pub fn exp_to_level(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    (EXP_CURVE_FACTOR * (level as f64).powi(3)).floor() as u64
}

/// Experience between `level` and the next one. Zero at the cap.
pub fn exp_for_next_level(level: u32) -> u64 {
    if level >= MAX_LEVEL {
        return 0;
    }
    exp_to_level(level + 1) - exp_to_level(level)
}

/// Experience every party member earns for one defeated enemy.
pub fn battle_exp(base_exp: u32, enemy_level: u32, trainer: bool) -> u64 {
    let trainer_bonus = if trainer { TRAINER_EXP_MULTIPLIER } else { 1.0 };
    let exp = (base_exp as f64 * enemy_level as f64 * trainer_bonus / 9.0).floor() as u64;
    exp.max(1)
}

/// Applies `gained` experience, rolling over as many levels as it pays for.
pub fn add_exp(level: u32, exp: u64, gained: u64) -> LevelUpResult {
    if level >= MAX_LEVEL {
        return LevelUpResult {
            leveled_up: false,
            new_level: MAX_LEVEL,
            exp_remaining: 0,
        };
    }

    let mut new_exp = exp + gained;
    let mut new_level = level;
    let mut leveled_up = false;
    while new_level < MAX_LEVEL {
        let needed = exp_for_next_level(new_level);
        if new_exp < needed {
            break;
        }
        new_exp -= needed;
        new_level += 1;
        leveled_up = true;
    }

    if new_level >= MAX_LEVEL {
        new_level = MAX_LEVEL;
        new_exp = 0;
    }

    LevelUpResult {
        leveled_up,
        new_level,
        exp_remaining: new_exp,
    }
}

/// Linear level scaling: roughly 3x the base at level 100.
pub fn attack_from_level(base_attack: f64, level: u32) -> u64 {
    let multiplier = 1.0 + level.saturating_sub(1) as f64 * ATTACK_PER_LEVEL;
    (base_attack * multiplier).floor() as u64
}

/// Gives every party member the full `gained` amount and applies level-ups.
/// Returns the number of members that gained a level.
pub fn grant_party_exp(party: &mut [OwnedPokemon], gained: u64) -> usize {
    let mut leveled = 0;
    for pokemon in party.iter_mut() {
        let result = add_exp(pokemon.level, pokemon.exp, gained);
        pokemon.level = result.new_level;
        pokemon.exp = result.exp_remaining;
        if result.leveled_up {
            leveled += 1;
        }
    }
    leveled
}
