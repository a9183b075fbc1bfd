//! Monte Carlo dungeon runner.
//!
//! Every run goes through `DungeonService` against one `MemoryStore`, so clear
//! counts accumulate across runs and loot weights shift the way they do for a
//! real player.

use super::config::SimConfig;
use super::report::{RunOutcome, RunStats, SimReport};
use crate::core::{EngineConfig, GameError, GameResult};
use crate::dungeon::{valid_moves, DungeonCatalog, DungeonMap, DungeonService, ExplorationStatus};
use crate::pokemon::{OwnedPokemon, PokemonSpecies, PokemonType, SpeciesCatalog, TypePair};
use crate::store::{Currency, MemoryStore, PlayerStore};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

const PLAYER: u64 = 1;
const DUNGEON_ID: u32 = 1;
const PARTNER_ID: u32 = 1;

const SIM_DUNGEON: &str = r#"[{
    "id": 1,
    "name": "Simulation Cave",
    "token_cost": 50,
    "base_health": 600,
    "difficulty_route": 4,
    "enemies": [
        {"name": "Zubat", "weight": 3},
        {"name": "Paras", "weight": 1}
    ],
    "trainers": [
        {"trainer_class": "Hiker", "team": [
            {"name": "Zubat", "level": 12, "health": 0},
            {"name": "Paras", "level": 14, "health": 0}
        ], "weight": 0.5}
    ],
    "bosses": [{"name": "Clefairy", "health": 6000, "level": 20}],
    "loot": [
        {"item_name": "Pokeball", "tier": "common", "weight": 3},
        {"item_name": "Oran Berry", "tier": "common"},
        {"item_name": "Greatball", "tier": "rare"},
        {"item_name": "Rare Candy", "tier": "epic"},
        {"item_name": "Moon Stone", "tier": "legendary"},
        {"item_name": "Clefairy", "tier": "mythic"}
    ]
}]"#;

fn species_catalog(party_attack: u64) -> SpeciesCatalog {
    let mk = |id, name: &str, types, base_attack| PokemonSpecies {
        id,
        name: name.to_string(),
        types,
        catch_rate: 150,
        base_attack,
        base_exp: 50,
        egg_cycles: 20,
    };
    SpeciesCatalog::new(vec![
        mk(
            PARTNER_ID,
            "Partner",
            TypePair::single(PokemonType::Normal),
            party_attack.min(u32::MAX as u64) as u32,
        ),
        mk(41, "Zubat", TypePair::dual(PokemonType::Poison, PokemonType::Flying), 45),
        mk(46, "Paras", TypePair::dual(PokemonType::Bug, PokemonType::Grass), 70),
        mk(35, "Clefairy", TypePair::single(PokemonType::Fairy), 45),
    ])
}

/// Level 1 partner: its attack is exactly the configured party attack.
fn reset_partner(store: &mut MemoryStore) {
    let mut partner = OwnedPokemon::new(PARTNER_ID, false);
    partner.in_party = true;
    if store.owned(PLAYER, PARTNER_ID).is_some() {
        store.bulk_update_pokemon(PLAYER, &[partner]);
    } else {
        store.bulk_create_pokemon(PLAYER, vec![partner]);
    }
}

/// Prefers unvisited neighbours; backtracks at random otherwise.
fn choose_move(map: &DungeonMap, rng: &mut impl Rng) -> Option<(usize, usize)> {
    let moves = valid_moves(map, ExplorationStatus::Exploring);
    let fresh: Vec<_> = moves
        .iter()
        .copied()
        .filter(|&(x, y)| map.tile(x, y).is_some_and(|t| !t.is_visited))
        .collect();
    if fresh.is_empty() {
        moves.choose(rng).copied()
    } else {
        fresh.choose(rng).copied()
    }
}

/// Run the full simulation and return a report.
pub fn run_simulation(config: &SimConfig) -> GameResult<SimReport> {
    let species = species_catalog(config.party_attack);
    let dungeons = DungeonCatalog::from_json_str(SIM_DUNGEON)?;
    let engine = EngineConfig {
        dungeon_map_size: config.dungeon_size,
        ..EngineConfig::default()
    };
    engine.validate()?;
    let service = DungeonService::new(engine, &dungeons, &species);
    let token_cost = dungeons.require(DUNGEON_ID)?.token_cost;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut store = MemoryStore::default();
    let mut runs = Vec::with_capacity(config.num_runs as usize);

    for run_idx in 0..config.num_runs {
        reset_partner(&mut store);
        store.add_currency(PLAYER, Currency::DungeonToken, token_cost as i64);
        let stats = simulate_single_run(config, &service, &mut store, &mut rng)?;

        if config.verbosity >= 2 {
            println!(
                "Run {}/{} - {:?}, steps {}, enemies {}, chests {}, loot {}",
                run_idx + 1,
                config.num_runs,
                stats.outcome,
                stats.steps,
                stats.enemies_defeated,
                stats.chests_opened,
                stats.loot.len()
            );
        }
        runs.push(stats);
    }

    Ok(SimReport::from_runs(runs))
}

fn simulate_single_run(
    config: &SimConfig,
    service: &DungeonService<'_>,
    store: &mut MemoryStore,
    rng: &mut impl Rng,
) -> GameResult<RunStats> {
    service.enter(store, PLAYER, DUNGEON_ID, rng)?;
    let mut stats = RunStats::default();

    while stats.steps < config.max_steps_per_run {
        let run = store
            .active_run(PLAYER)
            .ok_or_else(|| GameError::not_found("dungeon run", PLAYER))?;
        let Some((x, y)) = choose_move(&run.map, rng) else {
            break;
        };
        let step = service.explore_step(store, PLAYER, x as i64, y as i64, rng)?;
        stats.steps += 1;
        if !step.battles.is_empty() {
            stats.enemies_defeated += 1;
        }
        if step.catch.as_ref().is_some_and(|c| c.caught()) {
            stats.catches += 1;
        }
        if let Some(item) = &step.loot {
            stats.chests_opened += 1;
            stats.loot.push(item.tier);
        }
        if step.status != ExplorationStatus::AtBoss {
            continue;
        }

        let boss = service.fight_boss(store, PLAYER)?;
        match boss.rewards {
            Some(rewards) => {
                stats.outcome = RunOutcome::Cleared;
                stats.money = rewards.total_money();
                stats.tokens = rewards.total_tokens();
                stats.exp = rewards.exp;
                stats.first_clear = rewards.first_clear_bonus.is_some();
            }
            None => {
                service.abandon(store, PLAYER)?;
                stats.outcome = RunOutcome::BossLost;
            }
        }
        return Ok(stats);
    }

    debug!(steps = stats.steps, "run hit the step limit");
    service.abandon(store, PLAYER)?;
    stats.outcome = RunOutcome::TimedOut;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_simulation_is_reproducible() {
        let config = SimConfig::quick(11);
        let a = run_simulation(&config).unwrap();
        let b = run_simulation(&config).unwrap();
        assert_eq!(a.num_runs, 20);
        assert_eq!(a.clears, b.clears);
        assert_eq!(a.tier_counts, b.tier_counts);
        assert_eq!(a.total_money, b.total_money);
    }

    #[test]
    fn test_strong_party_clears_every_run() {
        let report = run_simulation(&SimConfig::quick(3)).unwrap();
        assert_eq!(report.boss_losses, 0);
        assert!(report.clears > 0);
        assert_eq!(report.first_clears, 1);
        assert!(report.total_tokens > 0);
    }

    #[test]
    fn test_weak_party_loses_to_boss() {
        let config = SimConfig {
            seed: Some(5),
            verbosity: 0,
            ..SimConfig::underpowered(5)
        };
        let report = run_simulation(&config).unwrap();
        assert_eq!(report.clears, 0);
        assert_eq!(report.boss_losses + report.timeouts, 5);
    }

    #[test]
    fn test_bad_dungeon_size_rejected() {
        let config = SimConfig {
            dungeon_size: 3,
            ..SimConfig::quick(1)
        };
        assert!(matches!(
            run_simulation(&config),
            Err(GameError::Validation(_))
        ));
    }
}
