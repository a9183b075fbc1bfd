//! Route unlocks, status and batched exploration.

use super::types::{RouteCatalog, RouteData, RouteExploreResult, RouteStatus};
use crate::battle::{can_defeat, party_attack, party_members, route_money};
use crate::breeding::{steps_per_battle, HatcheryService};
use crate::catching::{roll_shiny, CatchContext, CatchEngine};
use crate::core::constants::{MAX_ROUTE_ENCOUNTERS, ROUTE_KILLS_NEEDED};
use crate::core::{EngineConfig, GameError, GameResult};
use crate::dungeon::DungeonCatalog;
use crate::pokemon::{battle_exp, grant_party_exp, PokemonSpecies, SpeciesCatalog};
use crate::requirements::RequirementEngine;
use crate::store::{Currency, PlayerProgress, PlayerStore};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

pub struct RouteService<'a> {
    config: EngineConfig,
    routes: &'a RouteCatalog,
    species: &'a SpeciesCatalog,
    dungeons: &'a DungeonCatalog,
    requirements: RequirementEngine,
}

impl<'a> RouteService<'a> {
    pub fn new(
        config: EngineConfig,
        routes: &'a RouteCatalog,
        species: &'a SpeciesCatalog,
        dungeons: &'a DungeonCatalog,
    ) -> Self {
        Self {
            config,
            routes,
            species,
            dungeons,
            requirements: RequirementEngine::new(),
        }
    }

    pub fn is_unlocked(
        &self,
        store: &impl PlayerStore,
        player_id: u64,
        route: &RouteData,
    ) -> GameResult<bool> {
        let tree = route.requirement_tree()?;
        let ctx = PlayerProgress::new(store, player_id, self.species, self.dungeons);
        Ok(self.requirements.evaluate_all(&tree, &ctx))
    }

    pub fn requirement_hints(
        &self,
        store: &impl PlayerStore,
        player_id: u64,
        route: &RouteData,
    ) -> GameResult<Vec<String>> {
        let tree = route.requirement_tree()?;
        let ctx = PlayerProgress::new(store, player_id, self.species, self.dungeons);
        Ok(self.requirements.hints(&tree, &ctx))
    }

    /// Status and kill count. Checks run in priority order: locked,
    /// under the kill threshold, species missing, shiny missing.
    pub fn route_status(
        &self,
        store: &impl PlayerStore,
        player_id: u64,
        route: &RouteData,
    ) -> GameResult<(RouteStatus, u64)> {
        let kills = store.route_kills(player_id, route.region, route.number);
        if !self.is_unlocked(store, player_id, route)? {
            return Ok((RouteStatus::Locked, kills));
        }
        if kills < ROUTE_KILLS_NEEDED {
            return Ok((RouteStatus::Incomplete, kills));
        }

        let mut shiny_missing = false;
        for name in route.all_pokemon() {
            let Some(species) = self.species.by_name(name) else {
                continue;
            };
            match store.owned(player_id, species.id) {
                None => return Ok((RouteStatus::UncaughtPokemon, kills)),
                Some(p) if !p.shiny => shiny_missing = true,
                Some(_) => {}
            }
        }
        let status = if shiny_missing {
            RouteStatus::UncaughtShiny
        } else {
            RouteStatus::Completed
        };
        debug!(player_id, route = %route.name, ?status, kills, "route status");
        Ok((status, kills))
    }

    /// Every route of a region with its status and kills, in progression order.
    pub fn region_routes(
        &self,
        store: &impl PlayerStore,
        player_id: u64,
        region: u32,
    ) -> GameResult<Vec<(&'a RouteData, RouteStatus, u64)>> {
        self.routes
            .in_region(region)
            .map(|route| {
                let (status, kills) = self.route_status(store, player_id, route)?;
                Ok((route, status, kills))
            })
            .collect()
    }

    /// Runs `count` wild encounters on a route and writes the outcome back
    /// in bulk: catches, money, party exp, route kills and egg steps.
    pub fn explore_route(
        &self,
        store: &mut impl PlayerStore,
        player_id: u64,
        route_id: u32,
        count: u32,
        rng: &mut impl Rng,
    ) -> GameResult<RouteExploreResult> {
        if count == 0 || count > MAX_ROUTE_ENCOUNTERS {
            return Err(GameError::Validation(format!(
                "encounter count must be 1..={MAX_ROUTE_ENCOUNTERS}, got {count}"
            )));
        }
        let route = self.routes.require(route_id)?;
        if !self.is_unlocked(&*store, player_id, route)? {
            let hints = self.requirement_hints(&*store, player_id, route)?;
            return Err(GameError::StateConflict(format!(
                "{} is locked: {}",
                route.name,
                hints.join("; ")
            )));
        }
        let party = store.party(player_id);
        if party.is_empty() {
            return Err(GameError::StateConflict(
                "no Pokémon in the party".to_string(),
            ));
        }
        let pool: Vec<&PokemonSpecies> = route
            .encounter_pool()
            .iter()
            .filter_map(|name| self.species.by_name(name))
            .collect();
        if pool.is_empty() {
            return Err(GameError::StateConflict(format!(
                "no wild Pokémon on {}",
                route.name
            )));
        }

        let members = party_members(&party, self.species);
        let health = route.health();
        let enemy_level = route.number * 2;
        let ctx = CatchContext::route(route.region, route.number, &self.config);
        let mut batch = CatchEngine::new(self.species).begin_batch(&*store, player_id);

        let mut result = RouteExploreResult {
            route_id,
            encounters: count,
            defeated: 0,
            money: 0,
            exp: 0,
            catches: Vec::new(),
            shiny_encounters: 0,
            level_ups: 0,
            egg_steps: 0,
            total_kills: 0,
        };

        for _ in 0..count {
            let Some(&wild) = pool.choose(rng) else {
                break;
            };
            let shiny = roll_shiny(self.config.shiny_chance_route, rng);
            if shiny {
                result.shiny_encounters += 1;
            }
            let attack = party_attack(&members, wild.types);
            let defeated = can_defeat(health, attack, self.config.max_battle_ticks);
            batch.record_encounter(wild.id, shiny, defeated);
            if !defeated {
                continue;
            }

            result.defeated += 1;
            result.money += route_money(route.number, self.config.money_deviation, rng);
            result.exp += battle_exp(wild.base_exp, enemy_level, false);
            if let Some(report) = batch.attempt(&wild.name, Some(shiny), &ctx, rng) {
                result.catches.push(report.clone());
            }
        }

        batch.commit(store)?;
        if result.money > 0 {
            store.add_currency(player_id, Currency::PokeDollar, result.money as i64);
        }
        if result.exp > 0 {
            let mut party = store.party(player_id);
            result.level_ups = grant_party_exp(&mut party, result.exp);
            store.bulk_update_pokemon(player_id, &party);
        }
        result.total_kills = store.route_kills(player_id, route.region, route.number);
        if result.defeated > 0 {
            result.total_kills =
                store.add_route_kills(player_id, route.region, route.number, result.defeated);
            result.egg_steps = steps_per_battle(route.order_number) * result.defeated;
            HatcheryService::new(self.config.clone(), self.species).progress_eggs(
                store,
                player_id,
                result.egg_steps,
            );
        }

        info!(
            player_id,
            route = %route.name,
            encounters = count,
            defeated = result.defeated,
            caught = result.caught().count(),
            money = result.money,
            exp = result.exp,
            "route explored"
        );
        Ok(result)
    }
}
