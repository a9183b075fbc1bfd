//! Dungeon runs: entry, exploration steps, the boss fight, completion and exit.
//!
//! The service loads the player's in-progress run from the store, applies one
//! operation, and saves it back. A run ends `Completed` (boss beaten),
//! `Exited` (left at the entrance, loot kept) or `Abandoned`.

use super::data::{DungeonCatalog, DungeonData};
use super::generation::generate_map;
use super::logic::{
    can_exit, clear_tile, move_player, reveal_and_trigger, ExitBlocked, ExplorationStatus,
    TileEvent, TileEventKind,
};
use super::types::{DungeonMap, TileType};
use crate::battle::{
    boss_health, completion_rewards, damage_per_tick, enemy_health, party_attack, party_members,
    simulate_dungeon_battle, BattleStatus, DungeonBattleResult, DungeonRewards, Opponent,
    PartyMember, TimedBattle, TrainerBattleState,
};
use crate::catching::{CatchContext, CatchEngine, CatchReport};
use crate::core::weighted::pick_index;
use crate::core::{EngineConfig, GameError, GameResult};
use crate::loot::{is_debuffed, roll_chest, LootItem};
use crate::pokemon::{grant_party_exp, SpeciesCatalog};
use crate::requirements::RequirementEngine;
use crate::store::{Currency, PlayerProgress, PlayerStore};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    InProgress,
    Completed,
    Exited,
    Abandoned,
}

/// One player's pass through a dungeon, persisted between steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonRun {
    pub id: Uuid,
    pub player_id: u64,
    pub dungeon_id: u32,
    pub map: DungeonMap,
    pub chests_opened: u32,
    pub enemies_defeated: u32,
    pub loot_collected: Vec<LootItem>,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl DungeonRun {
    pub fn new(player_id: u64, dungeon_id: u32, map: DungeonMap) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id,
            dungeon_id,
            map,
            chests_opened: 0,
            enemies_defeated: 0,
            loot_collected: Vec::new(),
            status: RunStatus::InProgress,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RunStatus::InProgress
    }

    pub fn to_json(&self) -> GameResult<String> {
        serde_json::to_string(self).map_err(|e| GameError::MalformedState(e.to_string()))
    }

    /// Parses a saved run. The embedded map must pass validation.
    pub fn from_json(json: &str) -> GameResult<Self> {
        let run: Self =
            serde_json::from_str(json).map_err(|e| GameError::MalformedState(e.to_string()))?;
        run.map.validate()?;
        Ok(run)
    }

    fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonInfo {
    pub id: u32,
    pub name: String,
    pub region: u32,
    pub token_cost: u64,
    pub level: u32,
    pub is_unlocked: bool,
    pub unlock_hints: Vec<String>,
    pub player_clears: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DungeonEntry {
    pub run: DungeonRun,
    /// True when an in-progress run in the same dungeon was picked up again.
    pub resumed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExploreStepResult {
    pub event: TileEvent,
    pub status: ExplorationStatus,
    pub battles: Vec<DungeonBattleResult>,
    pub catch: Option<CatchReport>,
    pub loot: Option<LootItem>,
    pub descended: bool,
    pub can_continue: bool,
    pub floor: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BossResult {
    pub won: bool,
    pub boss_name: String,
    pub damage_dealt: u64,
    pub time_used: f64,
    /// Present only when the boss was beaten.
    pub rewards: Option<DungeonRewards>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub success: bool,
    pub reason: Option<ExitBlocked>,
    pub loot_preserved: Vec<LootItem>,
}

fn neutral_attack(party: &[PartyMember]) -> u64 {
    party.iter().map(|m| m.attack).sum()
}

/// Runs dungeons for any number of players against a shared store.
pub struct DungeonService<'a> {
    config: EngineConfig,
    dungeons: &'a DungeonCatalog,
    species: &'a SpeciesCatalog,
    requirements: RequirementEngine,
}

impl<'a> DungeonService<'a> {
    pub fn new(
        config: EngineConfig,
        dungeons: &'a DungeonCatalog,
        species: &'a SpeciesCatalog,
    ) -> Self {
        Self {
            config,
            dungeons,
            species,
            requirements: RequirementEngine::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn unlock_status(
        &self,
        store: &impl PlayerStore,
        player_id: u64,
        dungeon: &DungeonData,
    ) -> GameResult<(bool, Vec<String>)> {
        let tree = dungeon.requirement_tree()?;
        let ctx = PlayerProgress::new(store, player_id, self.species, self.dungeons);
        if self.requirements.evaluate_all(&tree, &ctx) {
            return Ok((true, Vec::new()));
        }
        Ok((false, self.requirements.hints(&tree, &ctx)))
    }

    pub fn dungeon_info(
        &self,
        store: &impl PlayerStore,
        player_id: u64,
        dungeon_id: u32,
    ) -> GameResult<DungeonInfo> {
        let dungeon = self.dungeons.require(dungeon_id)?;
        let (is_unlocked, unlock_hints) = self.unlock_status(store, player_id, dungeon)?;
        Ok(DungeonInfo {
            id: dungeon.id,
            name: dungeon.name.clone(),
            region: dungeon.region,
            token_cost: dungeon.token_cost,
            level: dungeon.level(),
            is_unlocked,
            unlock_hints,
            player_clears: store.dungeon_clears(player_id, dungeon.id),
        })
    }

    /// Every dungeon, locked ones included, in catalog order.
    pub fn list_dungeons(
        &self,
        store: &impl PlayerStore,
        player_id: u64,
    ) -> GameResult<Vec<DungeonInfo>> {
        self.dungeons
            .iter()
            .map(|d| self.dungeon_info(store, player_id, d.id))
            .collect()
    }

    /// Entry checks, in order: active run elsewhere, unlock requirements, tokens.
    /// Re-entering the dungeon of the active run is always allowed.
    pub fn can_enter(
        &self,
        store: &impl PlayerStore,
        player_id: u64,
        dungeon_id: u32,
    ) -> GameResult<()> {
        let dungeon = self.dungeons.require(dungeon_id)?;
        if let Some(active) = store.active_run(player_id) {
            if active.dungeon_id == dungeon_id {
                return Ok(());
            }
            let name = self
                .dungeons
                .by_id(active.dungeon_id)
                .map_or("another dungeon", |d| d.name.as_str());
            return Err(GameError::StateConflict(format!(
                "you have an active run in {name}; complete or abandon it first"
            )));
        }

        let (unlocked, hints) = self.unlock_status(store, player_id, dungeon)?;
        if !unlocked {
            return Err(GameError::StateConflict(format!(
                "{} is locked: {}",
                dungeon.name,
                hints.join("; ")
            )));
        }

        let available = store.wallet(player_id).dungeon_token;
        if available < dungeon.token_cost {
            return Err(GameError::InsufficientResource {
                resource: Currency::DungeonToken.name(),
                needed: dungeon.token_cost,
                available,
            });
        }
        Ok(())
    }

    /// Resumes the active run in this dungeon, or pays the entry cost and
    /// starts a fresh one on floor 1.
    pub fn enter(
        &self,
        store: &mut impl PlayerStore,
        player_id: u64,
        dungeon_id: u32,
        rng: &mut impl Rng,
    ) -> GameResult<DungeonEntry> {
        if let Some(run) = store.active_run(player_id) {
            if run.dungeon_id == dungeon_id {
                info!(player_id, dungeon_id, run_id = %run.id, "dungeon run resumed");
                return Ok(DungeonEntry { run, resumed: true });
            }
        }
        self.can_enter(&*store, player_id, dungeon_id)?;
        let dungeon = self.dungeons.require(dungeon_id)?;
        let map = generate_map(
            self.config.dungeon_map_size,
            1,
            dungeon.total_floors.max(1),
            rng,
        )?;

        if dungeon.token_cost > 0
            && !store.try_spend(player_id, Currency::DungeonToken, dungeon.token_cost)
        {
            return Err(GameError::InsufficientResource {
                resource: Currency::DungeonToken.name(),
                needed: dungeon.token_cost,
                available: store.wallet(player_id).dungeon_token,
            });
        }

        let run = DungeonRun::new(player_id, dungeon_id, map);
        store.save_run(&run);
        info!(
            player_id,
            dungeon = %dungeon.name,
            run_id = %run.id,
            cost = dungeon.token_cost,
            "dungeon run started"
        );
        Ok(DungeonEntry {
            run,
            resumed: false,
        })
    }

    fn load_run(&self, store: &impl PlayerStore, player_id: u64) -> GameResult<DungeonRun> {
        store
            .active_run(player_id)
            .ok_or_else(|| GameError::not_found("dungeon run", player_id))
    }

    /// Moves one tile and resolves whatever is there.
    ///
    /// Enemies are fought and, if wild, a catch is attempted. Chests roll
    /// loot. A ladder leads straight to the next floor. The boss tile only
    /// pauses; call `fight_boss` to resolve it.
    pub fn explore_step(
        &self,
        store: &mut impl PlayerStore,
        player_id: u64,
        x: i64,
        y: i64,
        rng: &mut impl Rng,
    ) -> GameResult<ExploreStepResult> {
        let mut run = self.load_run(&*store, player_id)?;
        let dungeon = self.dungeons.require(run.dungeon_id)?;

        let (tx, ty) = move_player(&mut run.map, x, y, ExplorationStatus::Exploring)?;
        let event = reveal_and_trigger(&mut run.map, tx, ty).ok_or_else(|| {
            GameError::MalformedState(format!("no tile at ({tx}, {ty})"))
        })?;

        let mut result = ExploreStepResult {
            can_continue: event.can_continue(),
            event,
            status: ExplorationStatus::Exploring,
            battles: Vec::new(),
            catch: None,
            loot: None,
            descended: false,
            floor: run.map.floor,
        };

        match result.event.kind {
            TileEventKind::Battle => {
                let (battles, catch) = self.resolve_encounter(store, &run, dungeon, rng);
                result.battles = battles;
                result.catch = catch;
                run.enemies_defeated += 1;
                clear_tile(&mut run.map, tx, ty);
            }
            TileEventKind::Chest => {
                result.loot = self.open_chest(&*store, &mut run, dungeon, rng);
                run.chests_opened += 1;
                clear_tile(&mut run.map, tx, ty);
            }
            TileEventKind::Ladder => {
                self.descend(&mut run, rng)?;
                result.descended = true;
                result.floor = run.map.floor;
            }
            TileEventKind::Boss => result.status = ExplorationStatus::AtBoss,
            TileEventKind::None | TileEventKind::Entrance => {}
        }

        store.save_run(&run);
        Ok(result)
    }

    /// Fights a random roaming enemy: a wild Pokémon or a regular trainer.
    fn resolve_encounter(
        &self,
        store: &mut impl PlayerStore,
        run: &DungeonRun,
        dungeon: &DungeonData,
        rng: &mut impl Rng,
    ) -> (Vec<DungeonBattleResult>, Option<CatchReport>) {
        let party = party_members(&store.party(run.player_id), self.species);
        let trainers: Vec<_> = dungeon.roaming_trainers().collect();
        let weights: Vec<f64> = dungeon
            .enemies
            .iter()
            .map(|e| e.weight)
            .chain(trainers.iter().map(|t| t.weight))
            .collect();
        let base_health = dungeon.enemy_base_health();
        let click = self.config.click_multiplier;

        let wild_name = match pick_index(&weights, rng) {
            Some(i) if i >= dungeon.enemies.len() => {
                let trainer = trainers[i - dungeon.enemies.len()];
                let mut state = TrainerBattleState::new(trainer);
                let battles = state.simulate(
                    neutral_attack(&party),
                    base_health,
                    run.chests_opened,
                    click,
                );
                debug!(trainer = %trainer.display_name(), team = battles.len(), "trainer defeated");
                return (battles, None);
            }
            Some(i) => dungeon.enemies[i].name.as_str(),
            None => {
                warn!(dungeon = %dungeon.name, "dungeon has no enemies");
                let health = enemy_health(base_health, run.chests_opened);
                let battle = simulate_dungeon_battle(
                    "Unknown Pokemon",
                    health,
                    neutral_attack(&party),
                    click,
                    false,
                );
                return (vec![battle], None);
            }
        };

        let attack = match self.species.by_name(wild_name) {
            Some(species) => party_attack(&party, species.types),
            None => neutral_attack(&party),
        };
        let health = enemy_health(base_health, run.chests_opened);
        let battle = simulate_dungeon_battle(wild_name, health, attack, click, false);

        let ctx = CatchContext::dungeon(dungeon.region, dungeon.difficulty_route(), &self.config);
        let catch = match CatchEngine::new(self.species).catch_one(
            store,
            run.player_id,
            wild_name,
            None,
            &ctx,
            rng,
        ) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(pokemon = %wild_name, error = %e, "dungeon catch skipped");
                None
            }
        };
        (vec![battle], catch)
    }

    fn open_chest(
        &self,
        store: &impl PlayerStore,
        run: &mut DungeonRun,
        dungeon: &DungeonData,
        rng: &mut impl Rng,
    ) -> Option<LootItem> {
        let debuffed = is_debuffed(dungeon.region, store.highest_region(run.player_id));
        let clears = store.dungeon_clears(run.player_id, dungeon.id);
        let item = roll_chest(&dungeon.loot, clears, debuffed, rng)?;
        debug!(item = %item.item_name, tier = %item.tier, debuffed, "chest opened");
        run.loot_collected.push(item.clone());
        Some(item)
    }

    /// Replaces the map with a fresh next floor. Counters and loot carry over.
    pub fn descend(&self, run: &mut DungeonRun, rng: &mut impl Rng) -> GameResult<()> {
        if run.map.is_final_floor() {
            return Err(GameError::StateConflict(
                "already on the final floor".to_string(),
            ));
        }
        let floor = run.map.floor + 1;
        run.map = generate_map(run.map.size, floor, run.map.total_floors, rng)?;
        info!(run_id = %run.id, floor, "descended to next floor");
        Ok(())
    }

    /// Boss lineup and the party attack used against it.
    fn boss_lineup(
        &self,
        dungeon: &DungeonData,
        party: &[PartyMember],
        chests: u32,
    ) -> (String, Vec<Opponent>, u64) {
        if let Some(boss) = dungeon.bosses.first() {
            let attack = match self.species.by_name(&boss.name) {
                Some(species) => party_attack(party, species.types),
                None => neutral_attack(party),
            };
            let opponent = Opponent::new(&boss.name, boss.level, boss_health(boss.health, chests));
            return (boss.name.clone(), vec![opponent], attack);
        }
        if let Some(trainer) = dungeon.boss_trainer() {
            let team = trainer
                .team
                .iter()
                .map(|p| Opponent::new(&p.name, p.level, boss_health(p.health, chests)))
                .collect();
            return (trainer.display_name(), team, neutral_attack(party));
        }
        warn!(dungeon = %dungeon.name, "no boss data, using fallback boss");
        let boss = dungeon.fallback_boss();
        let opponent = Opponent::new(&boss.name, boss.level, boss_health(boss.health, chests));
        (boss.name, vec![opponent], neutral_attack(party))
    }

    /// Timed fight against the boss. A loss leaves the run in progress so
    /// the player can try again; a win completes the run.
    pub fn fight_boss(
        &self,
        store: &mut impl PlayerStore,
        player_id: u64,
    ) -> GameResult<BossResult> {
        let mut run = self.load_run(&*store, player_id)?;
        let dungeon = self.dungeons.require(run.dungeon_id)?;
        if run.map.current_tile().map(|t| t.tile_type) != Some(TileType::Boss) {
            return Err(GameError::StateConflict(
                "the boss can only be fought from its tile".to_string(),
            ));
        }

        let party = party_members(&store.party(player_id), self.species);
        let (boss_name, opponents, attack) = self.boss_lineup(dungeon, &party, run.chests_opened);
        let mut battle = TimedBattle::new(
            opponents,
            damage_per_tick(attack, self.config.click_multiplier),
            self.config.boss_time_limit,
        );
        let status = battle.simulate_full();
        let damage_dealt = battle
            .opponents
            .iter()
            .map(|o| o.max_hp.saturating_sub(o.current_hp))
            .sum();

        if status != BattleStatus::Won {
            info!(player_id, boss = %boss_name, damage_dealt, "boss fight lost");
            return Ok(BossResult {
                won: false,
                boss_name,
                damage_dealt,
                time_used: battle.time_used(),
                rewards: None,
            });
        }

        let rewards = self.complete(store, &mut run, dungeon)?;
        Ok(BossResult {
            won: true,
            boss_name,
            damage_dealt,
            time_used: battle.time_used(),
            rewards: Some(rewards),
        })
    }

    /// Awards clear rewards and collected loot, counts the clear and closes the run.
    fn complete(
        &self,
        store: &mut impl PlayerStore,
        run: &mut DungeonRun,
        dungeon: &DungeonData,
    ) -> GameResult<DungeonRewards> {
        let player_id = run.player_id;
        let first_clear = store.dungeon_clears(player_id, dungeon.id) == 0;
        let rewards = completion_rewards(
            dungeon.difficulty_route(),
            dungeon.region,
            run.enemies_defeated,
            first_clear,
        );

        let clears = store.record_dungeon_clear(player_id, dungeon.id);
        store.add_currency(player_id, Currency::PokeDollar, rewards.total_money() as i64);
        store.add_currency(
            player_id,
            Currency::DungeonToken,
            rewards.total_tokens() as i64,
        );
        let mut party = store.party(player_id);
        grant_party_exp(&mut party, rewards.exp);
        store.bulk_update_pokemon(player_id, &party);
        store.add_items(player_id, &run.loot_collected);

        run.finish(RunStatus::Completed);
        store.save_run(run);
        info!(
            player_id,
            dungeon = %dungeon.name,
            clears,
            first_clear,
            money = rewards.total_money(),
            tokens = rewards.total_tokens(),
            "dungeon completed"
        );
        Ok(rewards)
    }

    /// Leaves from the entrance, keeping collected loot. No refund, no clear.
    pub fn exit(&self, store: &mut impl PlayerStore, player_id: u64) -> GameResult<ExitResult> {
        let mut run = self.load_run(&*store, player_id)?;
        if let Err(reason) = can_exit(&run.map, ExplorationStatus::Exploring) {
            return Ok(ExitResult {
                success: false,
                reason: Some(reason),
                loot_preserved: Vec::new(),
            });
        }

        store.add_items(player_id, &run.loot_collected);
        run.finish(RunStatus::Exited);
        store.save_run(&run);
        info!(
            player_id,
            run_id = %run.id,
            items = run.loot_collected.len(),
            "dungeon exited early"
        );
        Ok(ExitResult {
            success: true,
            reason: None,
            loot_preserved: run.loot_collected,
        })
    }

    /// Drops the run wherever the player is. Collected loot is lost.
    pub fn abandon(&self, store: &mut impl PlayerStore, player_id: u64) -> GameResult<DungeonRun> {
        let mut run = self.load_run(&*store, player_id)?;
        run.finish(RunStatus::Abandoned);
        store.save_run(&run);
        info!(player_id, run_id = %run.id, "dungeon run abandoned");
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::STARTER_POKEBALL_COUNT;
    use crate::pokemon::{OwnedPokemon, PokemonSpecies, PokemonType, TypePair};
    use crate::store::MemoryStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const PLAYER: u64 = 1;

    fn species() -> SpeciesCatalog {
        let mk = |id, name: &str, types, catch_rate, base_attack| PokemonSpecies {
            id,
            name: name.to_string(),
            types,
            catch_rate,
            base_attack,
            base_exp: 50,
            egg_cycles: 20,
        };
        SpeciesCatalog::new(vec![
            mk(
                41,
                "Zubat",
                TypePair::dual(PokemonType::Poison, PokemonType::Flying),
                255,
                45,
            ),
            mk(150, "Mewtwo", TypePair::single(PokemonType::Psychic), 3, 300),
            mk(95, "Onix", TypePair::dual(PokemonType::Rock, PokemonType::Ground), 45, 45),
        ])
    }

    fn dungeons() -> DungeonCatalog {
        DungeonCatalog::from_json_str(
            r#"[
            {
                "id": 1, "name": "Mt. Moon", "token_cost": 50, "base_health": 200,
                "enemies": [{"name": "Zubat"}],
                "bosses": [{"name": "Onix", "health": 510, "level": 14}],
                "loot": [{"item_name": "Moon Stone", "tier": "common"}]
            },
            {
                "id": 2, "name": "Rock Tunnel", "token_cost": 50,
                "trainers": [{"trainer_class": "Hiker", "team": [
                    {"name": "Geodude", "level": 20, "health": 0},
                    {"name": "Onix", "level": 22, "health": 0}
                ]}],
                "requirements": [{"type": 1, "params": {"route": 9}}]
            },
            {"id": 3, "name": "Deep Cave", "total_floors": 2}
        ]"#,
        )
        .unwrap()
    }

    fn funded_store() -> MemoryStore {
        let mut store = MemoryStore::default();
        store.add_currency(PLAYER, Currency::DungeonToken, 100);
        store
    }

    fn strong_party(store: &mut MemoryStore) {
        let mut mewtwo = OwnedPokemon::new(150, false);
        mewtwo.level = 100;
        mewtwo.in_party = true;
        store.bulk_create_pokemon(PLAYER, vec![mewtwo]);
    }

    /// Rewrites the tile above the entrance and saves the run.
    fn plant(store: &mut MemoryStore, tile_type: TileType) {
        let mut run = store.active_run(PLAYER).unwrap();
        run.map.tile_mut(2, 3).unwrap().tile_type = tile_type;
        store.save_run(&run);
    }

    fn stand_on_boss(store: &mut MemoryStore) {
        let mut run = store.active_run(PLAYER).unwrap();
        run.map.player_position = run.map.find_tile(TileType::Boss).unwrap();
        store.save_run(&run);
    }

    #[test]
    fn test_enter_spends_tokens_then_resumes() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let mut store = funded_store();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let entry = service.enter(&mut store, PLAYER, 1, &mut rng).unwrap();
        assert!(!entry.resumed);
        assert_eq!(store.wallet(PLAYER).dungeon_token, 50);
        assert_eq!(entry.run.map.size, 5);
        assert_eq!(entry.run.map.player_position, (2, 4));

        let again = service.enter(&mut store, PLAYER, 1, &mut rng).unwrap();
        assert!(again.resumed);
        assert_eq!(again.run.id, entry.run.id);
        assert_eq!(store.wallet(PLAYER).dungeon_token, 50);
    }

    #[test]
    fn test_cannot_enter_without_tokens() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let mut store = MemoryStore::default();
        store.add_currency(PLAYER, Currency::DungeonToken, 20);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = service.enter(&mut store, PLAYER, 1, &mut rng).unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientResource {
                resource: "dungeon tokens",
                needed: 50,
                available: 20,
            }
        );
        assert!(store.active_run(PLAYER).is_none());
    }

    #[test]
    fn test_locked_dungeon_lists_hints() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let mut store = funded_store();
        let err = service.can_enter(&store, PLAYER, 2).unwrap_err();
        match err {
            GameError::StateConflict(msg) => {
                assert!(msg.contains("Rock Tunnel is locked"));
                assert!(msg.contains("Defeat 10 Pokémon on Route 9"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        store.add_route_kills(PLAYER, 0, 9, 10);
        assert!(service.can_enter(&store, PLAYER, 2).is_ok());
        let info = service.dungeon_info(&store, PLAYER, 2).unwrap();
        assert!(info.is_unlocked);
        assert!(info.unlock_hints.is_empty());
    }

    #[test]
    fn test_active_run_elsewhere_blocks_entry() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let mut store = funded_store();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        service.enter(&mut store, PLAYER, 1, &mut rng).unwrap();
        let err = service.can_enter(&store, PLAYER, 3).unwrap_err();
        assert!(matches!(err, GameError::StateConflict(msg) if msg.contains("Mt. Moon")));
    }

    #[test]
    fn test_unknown_dungeon() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let store = funded_store();
        assert!(matches!(
            service.can_enter(&store, PLAYER, 42),
            Err(GameError::NotFound { kind: "dungeon", .. })
        ));
    }

    #[test]
    fn test_chest_step_collects_loot() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let mut store = funded_store();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        service.enter(&mut store, PLAYER, 1, &mut rng).unwrap();
        plant(&mut store, TileType::Chest);

        let step = service.explore_step(&mut store, PLAYER, 2, 3, &mut rng).unwrap();
        assert_eq!(step.event.kind, TileEventKind::Chest);
        assert!(!step.can_continue);
        assert_eq!(step.loot.as_ref().map(|l| l.item_name.as_str()), Some("Moon Stone"));

        let run = store.active_run(PLAYER).unwrap();
        assert_eq!(run.chests_opened, 1);
        assert_eq!(run.loot_collected.len(), 1);
        assert_eq!(run.map.tile(2, 3).unwrap().tile_type, TileType::Empty);
        assert_eq!(run.map.player_position, (2, 3));
    }

    #[test]
    fn test_battle_step_defeats_and_tries_catch() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let mut store = funded_store();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        service.enter(&mut store, PLAYER, 1, &mut rng).unwrap();
        plant(&mut store, TileType::Enemy);

        let step = service.explore_step(&mut store, PLAYER, 2, 3, &mut rng).unwrap();
        assert_eq!(step.battles.len(), 1);
        assert_eq!(step.battles[0].enemy_name, "Zubat");
        assert!(step.battles[0].defeated);
        let report = step.catch.unwrap();
        assert!(report.attempt.is_some());
        assert_eq!(
            store.ball_inventory(PLAYER).quantity(crate::catching::Pokeball::Poke),
            STARTER_POKEBALL_COUNT - 1
        );

        let run = store.active_run(PLAYER).unwrap();
        assert_eq!(run.enemies_defeated, 1);
        assert_eq!(run.map.tile(2, 3).unwrap().tile_type, TileType::Empty);
    }

    #[test]
    fn test_trainer_encounter_fights_whole_team() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let mut store = funded_store();
        store.add_route_kills(PLAYER, 0, 9, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        service.enter(&mut store, PLAYER, 2, &mut rng).unwrap();
        plant(&mut store, TileType::Enemy);

        let step = service.explore_step(&mut store, PLAYER, 2, 3, &mut rng).unwrap();
        let names: Vec<&str> = step.battles.iter().map(|b| b.enemy_name.as_str()).collect();
        assert_eq!(names, vec!["Geodude", "Onix"]);
        assert!(step.catch.is_none());
    }

    #[test]
    fn test_illegal_move_leaves_run_untouched() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let mut store = funded_store();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let entry = service.enter(&mut store, PLAYER, 1, &mut rng).unwrap();
        let err = service
            .explore_step(&mut store, PLAYER, 0, 0, &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            GameError::StateConflict("target position is not adjacent".to_string())
        );
        assert_eq!(store.active_run(PLAYER).unwrap(), entry.run);
    }

    #[test]
    fn test_ladder_descends_to_boss_floor() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let mut store = funded_store();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let entry = service.enter(&mut store, PLAYER, 3, &mut rng).unwrap();
        assert_eq!(entry.run.map.count_tiles(TileType::Ladder), 1);
        plant(&mut store, TileType::Ladder);

        let step = service.explore_step(&mut store, PLAYER, 2, 3, &mut rng).unwrap();
        assert!(step.descended);
        assert_eq!(step.floor, 2);
        let mut run = store.active_run(PLAYER).unwrap();
        assert_eq!(run.map.floor, 2);
        assert_eq!(run.map.player_position, run.map.entrance_position);
        assert_eq!(run.map.count_tiles(TileType::Boss), 1);
        assert!(service.descend(&mut run, &mut rng).is_err());
    }

    #[test]
    fn test_exit_only_from_entrance() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let mut store = funded_store();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        service.enter(&mut store, PLAYER, 1, &mut rng).unwrap();
        plant(&mut store, TileType::Chest);
        service.explore_step(&mut store, PLAYER, 2, 3, &mut rng).unwrap();

        let blocked = service.exit(&mut store, PLAYER).unwrap();
        assert!(!blocked.success);
        assert_eq!(blocked.reason, Some(ExitBlocked::NotAtEntrance));
        assert!(blocked
            .reason
            .unwrap()
            .to_string()
            .contains("must be at entrance"));
        assert!(store.active_run(PLAYER).is_some());

        service.explore_step(&mut store, PLAYER, 2, 4, &mut rng).unwrap();
        let exited = service.exit(&mut store, PLAYER).unwrap();
        assert!(exited.success);
        assert_eq!(exited.loot_preserved.len(), 1);
        assert_eq!(store.item_quantity(PLAYER, "Moon Stone"), 1);
        assert!(store.active_run(PLAYER).is_none());
        assert_eq!(store.dungeon_clears(PLAYER, 1), 0);
        assert_eq!(store.wallet(PLAYER).dungeon_token, 50);
    }

    #[test]
    fn test_boss_win_completes_with_first_clear_bonus_once() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let mut store = funded_store();
        strong_party(&mut store);
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        service.enter(&mut store, PLAYER, 1, &mut rng).unwrap();
        stand_on_boss(&mut store);
        let result = service.fight_boss(&mut store, PLAYER).unwrap();
        assert!(result.won);
        assert_eq!(result.boss_name, "Onix");
        assert_eq!(result.damage_dealt, 510);
        let rewards = result.rewards.unwrap();
        assert!(rewards.first_clear_bonus.is_some());
        assert_eq!(store.dungeon_clears(PLAYER, 1), 1);
        assert_eq!(
            store.wallet(PLAYER).dungeon_token,
            50 + rewards.total_tokens()
        );
        assert!(store.active_run(PLAYER).is_none());

        store.add_currency(PLAYER, Currency::DungeonToken, 50);
        service.enter(&mut store, PLAYER, 1, &mut rng).unwrap();
        stand_on_boss(&mut store);
        let second = service.fight_boss(&mut store, PLAYER).unwrap();
        assert!(second.rewards.unwrap().first_clear_bonus.is_none());
        assert_eq!(store.dungeon_clears(PLAYER, 1), 2);
    }

    #[test]
    fn test_boss_loss_keeps_run_open() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let mut store = funded_store();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        service.enter(&mut store, PLAYER, 1, &mut rng).unwrap();
        stand_on_boss(&mut store);

        let result = service.fight_boss(&mut store, PLAYER).unwrap();
        assert!(!result.won);
        assert!(result.rewards.is_none());
        assert!(result.damage_dealt < 510);
        assert!(store.active_run(PLAYER).is_some());
        assert_eq!(store.dungeon_clears(PLAYER, 1), 0);
    }

    #[test]
    fn test_boss_needs_boss_tile() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let mut store = funded_store();
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        service.enter(&mut store, PLAYER, 1, &mut rng).unwrap();
        assert!(matches!(
            service.fight_boss(&mut store, PLAYER),
            Err(GameError::StateConflict(_))
        ));
    }

    #[test]
    fn test_abandon_discards_loot() {
        let (species, dungeons) = (species(), dungeons());
        let service = DungeonService::new(EngineConfig::default(), &dungeons, &species);
        let mut store = funded_store();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        service.enter(&mut store, PLAYER, 1, &mut rng).unwrap();
        plant(&mut store, TileType::Chest);
        service.explore_step(&mut store, PLAYER, 2, 3, &mut rng).unwrap();

        let run = service.abandon(&mut store, PLAYER).unwrap();
        assert_eq!(run.status, RunStatus::Abandoned);
        assert!(run.finished_at.is_some());
        assert!(store.active_run(PLAYER).is_none());
        assert_eq!(store.item_quantity(PLAYER, "Moon Stone"), 0);
        assert!(matches!(
            service.abandon(&mut store, PLAYER),
            Err(GameError::NotFound { .. })
        ));
    }

    #[test]
    fn test_run_blob_round_trip_and_corruption() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let map = generate_map(5, 1, 1, &mut rng).unwrap();
        let run = DungeonRun::new(PLAYER, 1, map);
        let json = run.to_json().unwrap();
        assert_eq!(DungeonRun::from_json(&json).unwrap(), run);

        let mut broken = run.clone();
        broken.map.tiles.truncate(3);
        let json = broken.to_json().unwrap();
        assert!(matches!(
            DungeonRun::from_json(&json),
            Err(GameError::MalformedState(_))
        ));
    }
}
