//! Battle formulas: health, damage, ticks, money, tokens, rewards.
//!
//! All functions are pure. Randomness is only drawn by `route_money` when the
//! random deviation mode is requested.

use super::types::{DungeonBattleResult, DungeonRewards, FirstClearBonus, PartyMember};
use crate::core::constants::*;
use crate::core::MoneyDeviation;
use crate::pokemon::{attack_modifier, TypePair};
use rand::Rng;

/// Wild route Pokémon health.
///
/// `max(20, floor(100 * ((route^2.2)/12)^1.15 * (1 + region/20)))`
pub fn route_health(route: u32, region: u32) -> u64 {
    let route = route as f64;
    let health = ROUTE_HEALTH_BASE
        * (route.powf(2.2) / 12.0).powf(1.15)
        * (1.0 + region as f64 / 20.0);
    (health.floor() as u64).max(ROUTE_HEALTH_MIN)
}

/// Money for one route defeat. The deviation is uniform in [-25, 25] or the mean (12).
pub fn route_money(route: u32, deviation: MoneyDeviation, rng: &mut impl Rng) -> u64 {
    let dev = match deviation {
        MoneyDeviation::Random => rng.gen_range(-MONEY_DEVIATION..=MONEY_DEVIATION),
        MoneyDeviation::Mean => MONEY_DEVIATION_MEAN,
    };
    money_with_deviation(route, dev)
}

/// Money formula with an explicit deviation term.
pub fn money_with_deviation(route: u32, deviation: i64) -> u64 {
    let route = route as f64;
    let money =
        (ROUTE_MONEY_BASE * route + ROUTE_MONEY_COEFFICIENT * route.powf(1.15) + deviation as f64)
            .floor();
    if money < MIN_MONEY as f64 {
        MIN_MONEY
    } else {
        money as u64
    }
}

/// Dungeon tokens for a catch on a route of this difficulty.
///
/// `max(1, floor(6 * (route*2 / (2.8/(1+region/3)))^1.08))`
pub fn dungeon_tokens(route: u32, region: u32) -> u64 {
    let scale = 2.8 / (1.0 + region as f64 / 3.0);
    let tokens = 6.0 * (route as f64 * 2.0 / scale).powf(1.08);
    (tokens.floor() as u64).max(1)
}

/// Total party attack against one enemy, each member scaled by type matchup.
pub fn party_attack(party: &[PartyMember], enemy: TypePair) -> u64 {
    party
        .iter()
        .map(|m| (m.attack as f64 * attack_modifier(m.types, enemy)).floor() as u64)
        .sum()
}

/// Damage dealt per tick, at least 1.
pub fn damage_per_tick(party_attack: u64, click_multiplier: f64) -> u64 {
    ((party_attack as f64 * click_multiplier).floor() as u64).max(1)
}

/// Ceiling division of health by damage. `TICKS_UNBEATABLE` when no damage is dealt.
pub fn ticks_to_defeat(health: u64, damage: u64) -> u64 {
    if damage == 0 {
        return TICKS_UNBEATABLE;
    }
    health.div_ceil(damage).max(1)
}

/// Ticks for a party to beat an enemy, applying the click multiplier.
pub fn party_ticks_to_defeat(health: u64, party_attack: u64, click_multiplier: f64) -> u64 {
    if party_attack == 0 {
        return TICKS_UNBEATABLE;
    }
    ticks_to_defeat(health, damage_per_tick(party_attack, click_multiplier))
}

pub fn can_defeat(health: u64, party_attack: u64, max_ticks: u64) -> bool {
    ticks_to_defeat(health, party_attack) <= max_ticks
}

/// Health of a dungeon Pokémon (or boss) after `chests_opened` chests.
pub fn enemy_health(base_health: u64, chests_opened: u32) -> u64 {
    if base_health == 0 {
        return 1;
    }
    let health =
        base_health as f64 * (1.0 + chests_opened as f64 / DUNGEON_CHEST_HEALTH_DIVISOR);
    (health.floor() as u64).max(1)
}

pub fn boss_health(boss_base_health: u64, chests_opened: u32) -> u64 {
    enemy_health(boss_base_health, chests_opened)
}

/// Health of one trainer Pokémon. Non-boss teams share the load: each member
/// is divided by `team_size^0.75`.
pub fn trainer_pokemon_health(
    base_health: u64,
    chests_opened: u32,
    is_boss: bool,
    team_size: usize,
) -> u64 {
    if base_health == 0 {
        return 1;
    }
    let mut health =
        base_health as f64 * (1.0 + chests_opened as f64 / DUNGEON_CHEST_HEALTH_DIVISOR);
    if !is_boss && team_size > 1 {
        health /= (team_size as f64).powf(TRAINER_TEAM_HEALTH_EXPONENT);
    }
    (health.floor() as u64).max(1)
}

/// Resolves a dungeon fight. Dungeon fights always end in a defeat of the
/// enemy; the tick count tells how long it took.
pub fn simulate_dungeon_battle(
    enemy_name: &str,
    health: u64,
    party_attack: u64,
    click_multiplier: f64,
    is_boss: bool,
) -> DungeonBattleResult {
    let ep_modifier = if is_boss {
        DUNGEON_BOSS_EP_MODIFIER
    } else {
        DUNGEON_EP_MODIFIER
    };
    DungeonBattleResult {
        enemy_name: enemy_name.to_string(),
        defeated: true,
        damage_dealt: health,
        ticks_to_defeat: party_ticks_to_defeat(health, party_attack, click_multiplier),
        exp_earned: BASE_EP_YIELD * ep_modifier,
        is_boss,
    }
}

/// Level of Pokémon found in a dungeon of this difficulty.
pub fn dungeon_level(difficulty_route: u32) -> u32 {
    let level = (20.0 * (difficulty_route as f64).powf(1.0 / 2.25)).floor() as u32;
    level.max(1)
}

/// Difficulty route of a dungeon without an explicit one.
pub fn default_difficulty_route(region: u32) -> u32 {
    (region + 1) * DUNGEON_ROUTE_PER_REGION
}

/// Experience for a dungeon run.
pub fn dungeon_exp_reward(enemies_defeated: u32, boss_defeated: bool) -> u64 {
    let regular = enemies_defeated as u64 * BASE_EP_YIELD * DUNGEON_EP_MODIFIER;
    let boss = if boss_defeated {
        BASE_EP_YIELD * DUNGEON_BOSS_EP_MODIFIER
    } else {
        0
    };
    regular + boss
}

/// Rewards for clearing a dungeon. Money uses the mean deviation.
pub fn completion_rewards(
    difficulty_route: u32,
    region: u32,
    enemies_defeated: u32,
    first_clear: bool,
) -> DungeonRewards {
    let money = money_with_deviation(difficulty_route, MONEY_DEVIATION_MEAN)
        * enemies_defeated as u64;
    let tokens = dungeon_tokens(difficulty_route, region);
    let first_clear_bonus = first_clear.then(|| FirstClearBonus {
        tokens: tokens * DUNGEON_FIRST_CLEAR_TOKEN_MULTIPLIER,
        money: money * DUNGEON_FIRST_CLEAR_MONEY_MULTIPLIER,
    });
    DungeonRewards {
        money,
        exp: dungeon_exp_reward(enemies_defeated, true),
        dungeon_tokens: tokens,
        first_clear_bonus,
    }
}
