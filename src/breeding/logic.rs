//! Pokérus contagion between eggs and step accrual from battles.

use crate::pokemon::{OwnedPokemon, PokemonType, PokerusState, SpeciesCatalog};
use tracing::debug;

/// Spreads Pokérus among the creatures currently in the hatchery.
///
/// Every type of a contagious (or resistant) breeder is collected first;
/// uninfected breeders sharing any of those types become infected. Returns
/// the species ids that were infected by this pass.
pub fn spread_pokerus(breeders: &mut [OwnedPokemon], catalog: &SpeciesCatalog) -> Vec<u32> {
    let mut contagious: Vec<PokemonType> = Vec::new();
    for pokemon in breeders.iter() {
        if pokemon.pokerus < PokerusState::Contagious {
            continue;
        }
        if let Some(species) = catalog.by_id(pokemon.species_id) {
            contagious.extend(species.types.iter());
        }
    }
    if contagious.is_empty() {
        return Vec::new();
    }

    let mut infected = Vec::new();
    for pokemon in breeders.iter_mut() {
        if pokemon.pokerus != PokerusState::Uninfected {
            continue;
        }
        let Some(species) = catalog.by_id(pokemon.species_id) else {
            continue;
        };
        if species.types.iter().any(|t| contagious.contains(&t)) {
            pokemon.pokerus = PokerusState::Infected;
            infected.push(pokemon.species_id);
        }
    }
    if !infected.is_empty() {
        debug!(count = infected.len(), "pokerus spread in hatchery");
    }
    infected
}

/// Egg steps earned per defeated enemy on a route with this order number.
pub fn steps_per_battle(order_number: f64) -> u64 {
    (order_number.max(0.0).sqrt().floor() as u64).max(1)
}
