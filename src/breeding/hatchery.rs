//! Hatchery service: filling slots, walking eggs and hatching them.

use super::logic::spread_pokerus;
use super::types::{hatch_bonus, steps_required, Egg, HatchResult};
use crate::catching::roll_shiny;
use crate::core::constants::MAX_EGG_SLOTS;
use crate::core::{EngineConfig, GameError, GameResult};
use crate::pokemon::{OwnedPokemon, PokerusState, SpeciesCatalog};
use crate::store::PlayerStore;
use rand::Rng;
use tracing::info;

pub struct HatcheryService<'a> {
    config: EngineConfig,
    species: &'a SpeciesCatalog,
}

impl<'a> HatcheryService<'a> {
    pub fn new(config: EngineConfig, species: &'a SpeciesCatalog) -> Self {
        Self { config, species }
    }

    pub fn egg_slots(&self) -> usize {
        self.config.egg_slots.min(MAX_EGG_SLOTS)
    }

    pub fn has_free_slot(&self, store: &impl PlayerStore, player_id: u64) -> bool {
        store.eggs(player_id).len() < self.egg_slots()
    }

    /// Puts an owned species into the lowest free slot.
    pub fn add_to_hatchery(
        &self,
        store: &mut impl PlayerStore,
        player_id: u64,
        species_id: u32,
    ) -> GameResult<Egg> {
        let species = self.species.require_id(species_id)?;
        let mut pokemon = store
            .owned(player_id, species_id)
            .ok_or_else(|| GameError::not_found("pokemon", &species.name))?;
        if pokemon.breeding {
            return Err(GameError::StateConflict(format!(
                "{} is already in the hatchery",
                species.name
            )));
        }

        let used: Vec<usize> = store.eggs(player_id).iter().map(|e| e.slot).collect();
        let slot = (0..self.egg_slots())
            .find(|s| !used.contains(s))
            .ok_or_else(|| GameError::StateConflict("no free egg slot".to_string()))?;

        let egg = Egg::new(
            species_id,
            slot,
            steps_required(species.egg_cycles, &pokemon.vitamins),
            self.config.shiny_chance_breeding,
        );
        pokemon.breeding = true;
        store.bulk_update_pokemon(player_id, &[pokemon]);
        store.save_egg(player_id, egg.clone());
        info!(
            player_id,
            species = %species.name,
            slot,
            steps_required = egg.steps_required,
            "egg added to hatchery"
        );
        Ok(egg)
    }

    /// Runs the contagion pass, then adds `steps` to every egg that is not
    /// yet ready. Returns the eggs ready to hatch afterwards.
    pub fn progress_eggs(
        &self,
        store: &mut impl PlayerStore,
        player_id: u64,
        steps: u64,
    ) -> Vec<Egg> {
        let mut eggs = store.eggs(player_id);
        if eggs.is_empty() {
            return eggs;
        }

        let mut breeders: Vec<OwnedPokemon> = eggs
            .iter()
            .filter_map(|e| store.owned(player_id, e.species_id))
            .collect();
        if !spread_pokerus(&mut breeders, self.species).is_empty() {
            store.bulk_update_pokemon(player_id, &breeders);
        }

        for egg in eggs.iter_mut().filter(|e| !e.can_hatch()) {
            egg.add_steps(steps);
            store.save_egg(player_id, egg.clone());
        }
        eggs.into_iter().filter(Egg::can_hatch).collect()
    }

    /// Hatches the egg in `slot`: bonus attack, level reset, Pokérus
    /// maturing, hatch statistics. The egg is removed.
    pub fn hatch_egg(
        &self,
        store: &mut impl PlayerStore,
        player_id: u64,
        slot: usize,
        rng: &mut impl Rng,
    ) -> GameResult<HatchResult> {
        let egg = store
            .eggs(player_id)
            .into_iter()
            .find(|e| e.slot == slot)
            .ok_or_else(|| GameError::not_found("egg", slot))?;
        if !egg.can_hatch() {
            return Err(GameError::StateConflict(format!(
                "egg needs {} more steps",
                egg.steps_remaining()
            )));
        }
        let species = self.species.require_id(egg.species_id)?;
        let mut pokemon = store
            .owned(player_id, egg.species_id)
            .ok_or_else(|| GameError::not_found("pokemon", &species.name))?;

        let shiny = roll_shiny(egg.shiny_chance, rng);
        let (percent, amount) = hatch_bonus(&pokemon.vitamins, shiny);
        pokemon.attack_bonus_percent += percent;
        pokemon.attack_bonus_amount += amount;
        pokemon.level = 1;
        pokemon.exp = 0;
        pokemon.breeding = false;
        pokemon.shiny |= shiny;
        let pokerus_upgraded = pokemon.pokerus == PokerusState::Infected;
        if pokerus_upgraded {
            pokemon.pokerus = PokerusState::Contagious;
        }
        pokemon.stats.record_hatch(shiny);

        store.bulk_update_pokemon(player_id, &[pokemon]);
        store.delete_egg(player_id, slot);
        info!(player_id, species = %species.name, slot, shiny, percent, amount, "egg hatched");

        Ok(HatchResult {
            species_id: species.id,
            species_name: species.name.clone(),
            slot,
            shiny,
            attack_bonus_percent: percent,
            attack_bonus_amount: amount,
            pokerus_upgraded,
        })
    }

    pub fn hatch_all_ready(
        &self,
        store: &mut impl PlayerStore,
        player_id: u64,
        rng: &mut impl Rng,
    ) -> GameResult<Vec<HatchResult>> {
        let ready: Vec<usize> = store
            .eggs(player_id)
            .iter()
            .filter(|e| e.can_hatch())
            .map(|e| e.slot)
            .collect();
        let mut results = Vec::with_capacity(ready.len());
        for slot in ready {
            results.push(self.hatch_egg(store, player_id, slot, rng)?);
        }
        Ok(results)
    }
}
