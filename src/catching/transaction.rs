//! Single and batched catch transactions.
//!
//! A single catch reads and writes the store directly. A batch snapshots the
//! player's settings, inventory and owned creatures once, works against the
//! snapshot, and writes everything back in bulk on `commit`. A species first
//! caught inside the batch is created exactly once; later catches of it in the
//! same batch count as duplicates.

use super::ball::{attempt_catch, resolve_ball, roll_shiny, BallSettings, CatchAttemptResult, Pokeball};
use super::inventory::{BallInventory, BallUsage};
use crate::battle::dungeon_tokens;
use crate::core::constants::{BASE_EP_YIELD, DUNGEON_EP_YIELD};
use crate::core::{EngineConfig, GameResult};
use crate::pokemon::{CaptureStats, OwnedPokemon, PokemonSpecies, SpeciesCatalog};
use crate::store::{Currency, PlayerStore};
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Where the encounter happens; decides shiny odds, EP yield and token reward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchContext {
    pub region: u32,
    pub route: u32,
    pub shiny_chance: u32,
    pub ep_yield: u64,
}

impl CatchContext {
    pub fn route(region: u32, route: u32, config: &EngineConfig) -> Self {
        Self {
            region,
            route,
            shiny_chance: config.shiny_chance_route,
            ep_yield: BASE_EP_YIELD,
        }
    }

    pub fn dungeon(region: u32, difficulty_route: u32, config: &EngineConfig) -> Self {
        Self {
            region,
            route: difficulty_route,
            shiny_chance: config.shiny_chance_dungeon,
            ep_yield: DUNGEON_EP_YIELD,
        }
    }

    pub fn token_reward(&self) -> u64 {
        dungeon_tokens(self.route, self.region)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchOutcome {
    Caught,
    Escaped,
    /// No ball wanted or none in stock; nothing was thrown.
    NoBall,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchReport {
    pub species_id: u32,
    pub species_name: String,
    pub shiny: bool,
    pub new_species: bool,
    pub attempt: Option<CatchAttemptResult>,
    pub outcome: CatchOutcome,
    pub effort_points: u64,
    pub tokens: u64,
}

impl CatchReport {
    fn skipped(species: &PokemonSpecies, shiny: bool, new_species: bool) -> Self {
        Self {
            species_id: species.id,
            species_name: species.name.clone(),
            shiny,
            new_species,
            attempt: None,
            outcome: CatchOutcome::NoBall,
            effort_points: 0,
            tokens: 0,
        }
    }

    pub fn caught(&self) -> bool {
        self.outcome == CatchOutcome::Caught
    }

    pub fn ball(&self) -> Option<Pokeball> {
        self.attempt.map(|a| a.pokeball_used)
    }
}

/// Applies a successful catch of an already-owned species.
fn apply_duplicate(pokemon: &mut OwnedPokemon, shiny: bool, ep_yield: u64) -> u64 {
    pokemon.stats.record_capture(shiny);
    if shiny {
        pokemon.shiny = true;
    }
    pokemon.gain_effort_points(ep_yield, shiny)
}

pub struct CatchEngine<'a> {
    catalog: &'a SpeciesCatalog,
}

impl<'a> CatchEngine<'a> {
    pub fn new(catalog: &'a SpeciesCatalog) -> Self {
        Self { catalog }
    }

    /// One catch attempt against live store state.
    ///
    /// `shiny` overrides the shiny roll when the caller already knows it.
    /// An empty inventory is not an error: the report says nothing was thrown.
    pub fn catch_one(
        &self,
        store: &mut impl PlayerStore,
        player_id: u64,
        species_name: &str,
        shiny: Option<bool>,
        ctx: &CatchContext,
        rng: &mut impl Rng,
    ) -> GameResult<CatchReport> {
        let species = self.catalog.require(species_name)?;
        let existing = store.owned(player_id, species.id);
        let is_new = existing.is_none();
        let shiny = shiny.unwrap_or_else(|| roll_shiny(ctx.shiny_chance, rng));

        let preferred = store.ball_settings(player_id).preferred(is_new, shiny);
        let Some(ball) = resolve_ball(preferred, &store.ball_inventory(player_id)) else {
            return Ok(CatchReport::skipped(species, shiny, is_new));
        };
        if !store.use_ball(player_id, ball) {
            // Spent concurrently between the read and the decrement
            tracing::debug!(player_id, ?ball, "ball no longer in stock");
            return Ok(CatchReport::skipped(species, shiny, is_new));
        }

        let attempt = attempt_catch(species.catch_rate, ball, rng);
        let mut report = CatchReport {
            species_id: species.id,
            species_name: species.name.clone(),
            shiny,
            new_species: is_new,
            attempt: Some(attempt),
            outcome: CatchOutcome::Escaped,
            effort_points: 0,
            tokens: 0,
        };
        if !attempt.success {
            return Ok(report);
        }

        match existing {
            None => {
                store.bulk_create_pokemon(player_id, vec![OwnedPokemon::caught(species.id, shiny)]);
            }
            Some(mut pokemon) => {
                report.effort_points = apply_duplicate(&mut pokemon, shiny, ctx.ep_yield);
                store.bulk_update_pokemon(player_id, &[pokemon]);
            }
        }
        report.tokens = ctx.token_reward();
        store.add_currency(player_id, Currency::DungeonToken, report.tokens as i64);
        report.outcome = CatchOutcome::Caught;
        tracing::debug!(player_id, species = %species.name, shiny, new = is_new, "caught");
        Ok(report)
    }

    /// Snapshots the player's state for a batch of attempts.
    pub fn begin_batch(&self, store: &impl PlayerStore, player_id: u64) -> CatchBatch<'a> {
        CatchBatch {
            catalog: self.catalog,
            player_id,
            settings: store.ball_settings(player_id),
            inventory: store.ball_inventory(player_id),
            owned: store
                .owned_all(player_id)
                .into_iter()
                .map(|p| (p.species_id, p))
                .collect(),
            created: Vec::new(),
            touched: HashSet::new(),
            unowned_stats: HashMap::new(),
            usage: BallUsage::default(),
            tokens: 0,
            items: Vec::new(),
        }
    }

    /// Runs every attempt in one batch and commits.
    pub fn catch_batch(
        &self,
        store: &mut impl PlayerStore,
        player_id: u64,
        attempts: &[(String, Option<bool>)],
        ctx: &CatchContext,
        rng: &mut impl Rng,
    ) -> GameResult<BatchCatchResult> {
        let mut batch = self.begin_batch(&*store, player_id);
        for (name, shiny) in attempts {
            batch.attempt(name, *shiny, ctx, rng);
        }
        batch.commit(store)
    }
}

/// Catch attempts collected against a snapshot, written back by `commit`.
pub struct CatchBatch<'a> {
    catalog: &'a SpeciesCatalog,
    player_id: u64,
    settings: BallSettings,
    inventory: BallInventory,
    owned: HashMap<u32, OwnedPokemon>,
    created: Vec<u32>,
    touched: HashSet<u32>,
    unowned_stats: HashMap<u32, CaptureStats>,
    usage: BallUsage,
    tokens: u64,
    items: Vec<GameResult<CatchReport>>,
}

impl CatchBatch<'_> {
    pub fn owns(&self, species_id: u32) -> bool {
        self.owned.contains_key(&species_id)
    }

    fn touch(&mut self, species_id: u32) {
        if !self.created.contains(&species_id) {
            self.touched.insert(species_id);
        }
    }

    /// Counts an encounter (and optionally its defeat) on the species' stats.
    ///
    /// Stats for species not owned yet are held until a catch creates the record.
    pub fn record_encounter(&mut self, species_id: u32, shiny: bool, defeated: bool) {
        let stats = match self.owned.get_mut(&species_id) {
            Some(p) => &mut p.stats,
            None => self.unowned_stats.entry(species_id).or_default(),
        };
        stats.record_encounter(shiny);
        if defeated {
            stats.record_defeat(shiny);
        }
        if self.owned.contains_key(&species_id) {
            self.touch(species_id);
        }
    }

    /// One attempt against the snapshot. Unknown species are recorded as
    /// failed items and the batch carries on.
    pub fn attempt(
        &mut self,
        species_name: &str,
        shiny: Option<bool>,
        ctx: &CatchContext,
        rng: &mut impl Rng,
    ) -> Option<&CatchReport> {
        let item = self.run_attempt(species_name, shiny, ctx, rng);
        self.items.push(item);
        self.items.last().and_then(|i| i.as_ref().ok())
    }

    fn run_attempt(
        &mut self,
        species_name: &str,
        shiny: Option<bool>,
        ctx: &CatchContext,
        rng: &mut impl Rng,
    ) -> GameResult<CatchReport> {
        let catalog = self.catalog;
        let species = catalog.require(species_name)?;
        let is_new = !self.owned.contains_key(&species.id);
        let shiny = shiny.unwrap_or_else(|| roll_shiny(ctx.shiny_chance, rng));

        let preferred = self.settings.preferred(is_new, shiny);
        let Some(ball) = resolve_ball(preferred, &self.inventory) else {
            return Ok(CatchReport::skipped(species, shiny, is_new));
        };
        self.inventory.use_ball(ball);
        self.usage.add(ball);

        let attempt = attempt_catch(species.catch_rate, ball, rng);
        let mut report = CatchReport {
            species_id: species.id,
            species_name: species.name.clone(),
            shiny,
            new_species: is_new,
            attempt: Some(attempt),
            outcome: CatchOutcome::Escaped,
            effort_points: 0,
            tokens: 0,
        };
        if !attempt.success {
            return Ok(report);
        }

        if is_new {
            let mut pokemon = OwnedPokemon::caught(species.id, shiny);
            if let Some(stats) = self.unowned_stats.remove(&species.id) {
                pokemon.stats.merge(&stats);
            }
            self.owned.insert(species.id, pokemon);
            self.created.push(species.id);
        } else if let Some(pokemon) = self.owned.get_mut(&species.id) {
            report.effort_points = apply_duplicate(pokemon, shiny, ctx.ep_yield);
            self.touch(species.id);
        }

        report.tokens = ctx.token_reward();
        self.tokens += report.tokens;
        report.outcome = CatchOutcome::Caught;
        Ok(report)
    }

    /// Writes ball usage, creatures and tokens back in bulk.
    ///
    /// Balls are taken first and all-or-nothing; if another request spent
    /// them since the snapshot, nothing from this batch is written.
    pub fn commit(mut self, store: &mut impl PlayerStore) -> GameResult<BatchCatchResult> {
        let player_id = self.player_id;
        if !self.usage.is_empty() {
            store.use_balls(player_id, &self.usage)?;
        }

        let new_records: Vec<OwnedPokemon> = self
            .created
            .iter()
            .filter_map(|id| self.owned.remove(id))
            .collect();
        let created = store.bulk_create_pokemon(player_id, new_records);

        let updated: Vec<OwnedPokemon> = self
            .touched
            .iter()
            .filter_map(|id| self.owned.get(id).cloned())
            .collect();
        store.bulk_update_pokemon(player_id, &updated);

        if self.tokens > 0 {
            store.add_currency(player_id, Currency::DungeonToken, self.tokens as i64);
        }

        tracing::debug!(
            player_id,
            attempts = self.items.len(),
            created,
            updated = updated.len(),
            balls = self.usage.total(),
            "catch batch committed"
        );

        Ok(BatchCatchResult {
            items: self.items,
            created,
            updated: updated.len(),
            balls_used: self.usage,
            tokens: self.tokens,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BatchCatchResult {
    /// One entry per attempt, in order. Errors are per-item skips.
    pub items: Vec<GameResult<CatchReport>>,
    pub created: usize,
    pub updated: usize,
    pub balls_used: BallUsage,
    pub tokens: u64,
}

impl BatchCatchResult {
    pub fn caught(&self) -> impl Iterator<Item = &CatchReport> {
        self.items
            .iter()
            .filter_map(|i| i.as_ref().ok())
            .filter(|r| r.caught())
    }

    pub fn caught_count(&self) -> usize {
        self.caught().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameError;
    use crate::pokemon::{PokemonType, PokerusState, TypePair};
    use crate::store::MemoryStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn catalog() -> SpeciesCatalog {
        SpeciesCatalog::new(vec![
            PokemonSpecies {
                id: 16,
                name: "Pidgey".to_string(),
                types: TypePair::dual(PokemonType::Normal, PokemonType::Flying),
                catch_rate: 10_000,
                base_attack: 45,
                base_exp: 50,
                egg_cycles: 15,
            },
            PokemonSpecies {
                id: 150,
                name: "Mewtwo".to_string(),
                types: TypePair::single(PokemonType::Psychic),
                catch_rate: 0,
                base_attack: 110,
                base_exp: 306,
                egg_cycles: 120,
            },
        ])
    }

    fn ctx() -> CatchContext {
        CatchContext::route(0, 1, &EngineConfig::default())
    }

    #[test]
    fn test_catch_one_new_species_creates_record() {
        let catalog = catalog();
        let engine = CatchEngine::new(&catalog);
        let mut store = MemoryStore::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let report = engine
            .catch_one(&mut store, 1, "Pidgey", Some(false), &ctx(), &mut rng)
            .unwrap();
        assert!(report.caught());
        assert!(report.new_species);
        assert_eq!(report.ball(), Some(Pokeball::Poke));
        assert!(report.tokens >= 1);

        let owned = store.owned(1, 16).unwrap();
        assert_eq!(owned.stats.captured, 1);
        assert_eq!(store.wallet(1).dungeon_token, report.tokens);
        assert_eq!(store.ball_inventory(1).stock(Pokeball::Poke).used, 1);
    }

    #[test]
    fn test_catch_one_unknown_species_mutates_nothing() {
        let catalog = catalog();
        let engine = CatchEngine::new(&catalog);
        let mut store = MemoryStore::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let err = engine
            .catch_one(&mut store, 1, "Missingno", None, &ctx(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, GameError::NotFound { .. }));
        assert_eq!(store.ball_inventory(1).stock(Pokeball::Poke).used, 0);
    }

    #[test]
    fn test_catch_one_duplicate_not_wanted_by_default() {
        let catalog = catalog();
        let engine = CatchEngine::new(&catalog);
        let mut store = MemoryStore::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        store.bulk_create_pokemon(1, vec![OwnedPokemon::caught(16, false)]);

        let report = engine
            .catch_one(&mut store, 1, "Pidgey", Some(false), &ctx(), &mut rng)
            .unwrap();
        assert_eq!(report.outcome, CatchOutcome::NoBall);
        assert_eq!(report.ball(), None);
        assert_eq!(store.wallet(1).dungeon_token, 0);
    }

    #[test]
    fn test_catch_one_duplicate_gains_effort_points() {
        let catalog = catalog();
        let engine = CatchEngine::new(&catalog);
        let mut store = MemoryStore::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut pidgey = OwnedPokemon::caught(16, false);
        pidgey.pokerus = PokerusState::Contagious;
        store.bulk_create_pokemon(1, vec![pidgey]);

        let report = engine
            .catch_one(&mut store, 1, "Pidgey", Some(true), &ctx(), &mut rng)
            .unwrap();
        assert!(report.caught());
        assert!(!report.new_species);
        assert_eq!(report.effort_points, BASE_EP_YIELD * 5);

        let owned = store.owned(1, 16).unwrap();
        assert!(owned.shiny);
        assert_eq!(owned.stats.captured, 2);
        assert_eq!(owned.stats.shiny_captured, 1);
    }

    #[test]
    fn test_catch_one_failed_attempt_still_uses_ball() {
        let catalog = catalog();
        let engine = CatchEngine::new(&catalog);
        let mut store = MemoryStore::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let report = engine
            .catch_one(&mut store, 1, "Mewtwo", Some(false), &ctx(), &mut rng)
            .unwrap();
        assert_eq!(report.outcome, CatchOutcome::Escaped);
        assert!(store.owned(1, 150).is_none());
        assert_eq!(store.ball_inventory(1).stock(Pokeball::Poke).used, 1);
        assert_eq!(store.wallet(1).dungeon_token, 0);
    }

    #[test]
    fn test_catch_one_empty_inventory_degrades() {
        let catalog = catalog();
        let engine = CatchEngine::new(&catalog);
        let mut store = MemoryStore::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..25 {
            store.use_ball(1, Pokeball::Poke);
        }

        let report = engine
            .catch_one(&mut store, 1, "Pidgey", Some(false), &ctx(), &mut rng)
            .unwrap();
        assert_eq!(report.outcome, CatchOutcome::NoBall);
        assert!(store.owned(1, 16).is_none());
    }

    #[test]
    fn test_batch_same_new_species_twice_creates_once() {
        let catalog = catalog();
        let engine = CatchEngine::new(&catalog);
        let mut store = MemoryStore::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        // Duplicates get thrown at too
        store.set_ball_settings(
            1,
            BallSettings {
                caught_pokemon: Pokeball::Poke,
                ..Default::default()
            },
        );

        let attempts = vec![
            ("Pidgey".to_string(), Some(false)),
            ("Pidgey".to_string(), Some(false)),
        ];
        let result = engine
            .catch_batch(&mut store, 1, &attempts, &ctx(), &mut rng)
            .unwrap();

        assert_eq!(result.created, 1);
        assert_eq!(result.caught_count(), 2);
        let reports: Vec<_> = result.items.iter().map(|i| i.as_ref().unwrap()).collect();
        assert!(reports[0].new_species);
        assert!(!reports[1].new_species);

        let owned = store.owned(1, 16).unwrap();
        assert_eq!(owned.stats.captured, 2);
        assert_eq!(store.owned_all(1).len(), 1);
        assert_eq!(store.ball_inventory(1).quantity(Pokeball::Poke), 23);
    }

    #[test]
    fn test_batch_unknown_species_is_per_item() {
        let catalog = catalog();
        let engine = CatchEngine::new(&catalog);
        let mut store = MemoryStore::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let attempts = vec![
            ("Nobody".to_string(), None),
            ("Pidgey".to_string(), Some(false)),
        ];
        let result = engine
            .catch_batch(&mut store, 1, &attempts, &ctx(), &mut rng)
            .unwrap();
        assert!(result.items[0].is_err());
        assert!(result.items[1].as_ref().unwrap().caught());
        assert_eq!(result.created, 1);
    }

    #[test]
    fn test_batch_respects_snapshot_inventory() {
        let catalog = catalog();
        let engine = CatchEngine::new(&catalog);
        let mut store = MemoryStore::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..24 {
            store.use_ball(1, Pokeball::Poke);
        }

        // One ball left, three attempts on a species that never gets caught
        let attempts = vec![("Mewtwo".to_string(), Some(false)); 3];
        let result = engine
            .catch_batch(&mut store, 1, &attempts, &ctx(), &mut rng)
            .unwrap();
        assert_eq!(result.balls_used.get(Pokeball::Poke), 1);
        let outcomes: Vec<_> = result
            .items
            .iter()
            .map(|i| i.as_ref().unwrap().outcome)
            .collect();
        assert_eq!(
            outcomes,
            vec![CatchOutcome::Escaped, CatchOutcome::NoBall, CatchOutcome::NoBall]
        );
        assert_eq!(store.ball_inventory(1).quantity(Pokeball::Poke), 0);
    }

    #[test]
    fn test_batch_commit_is_all_or_nothing_when_balls_spent_elsewhere() {
        let catalog = catalog();
        let engine = CatchEngine::new(&catalog);
        let mut store = MemoryStore::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..24 {
            store.use_ball(1, Pokeball::Poke);
        }

        let mut batch = engine.begin_batch(&store, 1);
        batch.attempt("Pidgey", Some(false), &ctx(), &mut rng);
        // A concurrent request takes the last ball
        assert!(store.use_ball(1, Pokeball::Poke));

        let err = batch.commit(&mut store).unwrap_err();
        assert!(matches!(err, GameError::InsufficientResource { .. }));
        assert!(store.owned(1, 16).is_none());
        assert_eq!(store.wallet(1).dungeon_token, 0);
        assert_eq!(store.ball_inventory(1).quantity(Pokeball::Poke), 0);
    }

    #[test]
    fn test_batch_encounter_stats_carry_into_new_record() {
        let catalog = catalog();
        let engine = CatchEngine::new(&catalog);
        let mut store = MemoryStore::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let mut batch = engine.begin_batch(&store, 1);
        batch.record_encounter(16, false, true);
        batch.record_encounter(16, true, true);
        batch.attempt("Pidgey", Some(true), &ctx(), &mut rng);
        batch.commit(&mut store).unwrap();

        let owned = store.owned(1, 16).unwrap();
        assert_eq!(owned.stats.encountered, 2);
        assert_eq!(owned.stats.defeated, 2);
        assert_eq!(owned.stats.shiny_encountered, 1);
        assert_eq!(owned.stats.captured, 1);
        assert!(owned.shiny);
    }
}
