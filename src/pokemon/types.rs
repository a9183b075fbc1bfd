//! Creature data: elemental types, species catalog, and the owned-creature record.

use crate::core::constants::{
    EP_EV_RATIO, RESISTANT_EV_THRESHOLD, SHINY_EP_MODIFIER,
};
use crate::core::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Elemental type, in chart order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl PokemonType {
    pub const ALL: [PokemonType; 18] = [
        PokemonType::Normal,
        PokemonType::Fire,
        PokemonType::Water,
        PokemonType::Electric,
        PokemonType::Grass,
        PokemonType::Ice,
        PokemonType::Fighting,
        PokemonType::Poison,
        PokemonType::Ground,
        PokemonType::Flying,
        PokemonType::Psychic,
        PokemonType::Bug,
        PokemonType::Rock,
        PokemonType::Ghost,
        PokemonType::Dragon,
        PokemonType::Dark,
        PokemonType::Steel,
        PokemonType::Fairy,
    ];

    /// Numeric code used by imported data (0 means "no type").
    pub fn code(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_code(code: u8) -> Option<PokemonType> {
        match code {
            1..=18 => Some(Self::ALL[code as usize - 1]),
            _ => None,
        }
    }
}

/// Primary type plus optional secondary type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypePair {
    pub primary: PokemonType,
    pub secondary: Option<PokemonType>,
}

impl TypePair {
    pub fn single(primary: PokemonType) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn dual(primary: PokemonType, secondary: PokemonType) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
        }
    }

    pub fn contains(&self, t: PokemonType) -> bool {
        self.primary == t || self.secondary == Some(t)
    }

    pub fn iter(&self) -> impl Iterator<Item = PokemonType> {
        std::iter::once(self.primary).chain(self.secondary)
    }
}

/// Static species data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonSpecies {
    pub id: u32,
    pub name: String,
    pub types: TypePair,
    pub catch_rate: u32,
    pub base_attack: u32,
    pub base_exp: u32,
    #[serde(default = "default_egg_cycles")]
    pub egg_cycles: u32,
}

fn default_egg_cycles() -> u32 {
    crate::core::constants::DEFAULT_EGG_CYCLES
}

/// Lookup table of every known species.
#[derive(Debug, Clone, Default)]
pub struct SpeciesCatalog {
    species: Vec<PokemonSpecies>,
    by_id: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
}

impl SpeciesCatalog {
    pub fn new(species: Vec<PokemonSpecies>) -> Self {
        let mut catalog = Self::default();
        for s in species {
            catalog.insert(s);
        }
        catalog
    }

    pub fn insert(&mut self, species: PokemonSpecies) {
        let idx = self.species.len();
        self.by_id.insert(species.id, idx);
        self.by_name.insert(species.name.to_lowercase(), idx);
        self.species.push(species);
    }

    pub fn by_id(&self, id: u32) -> Option<&PokemonSpecies> {
        self.by_id.get(&id).map(|&i| &self.species[i])
    }

    /// Case-insensitive lookup.
    pub fn by_name(&self, name: &str) -> Option<&PokemonSpecies> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&i| &self.species[i])
    }

    pub fn require(&self, name: &str) -> GameResult<&PokemonSpecies> {
        self.by_name(name)
            .ok_or_else(|| GameError::not_found("species", name))
    }

    pub fn require_id(&self, id: u32) -> GameResult<&PokemonSpecies> {
        self.by_id(id).ok_or_else(|| GameError::not_found("species", id))
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PokemonSpecies> {
        self.species.iter()
    }
}

/// Four-stage contagion. Ordering matters: `>= Contagious` gates EV gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum PokerusState {
    #[default]
    Uninfected,
    Infected,
    Contagious,
    Resistant,
}

/// Vitamins fed to a creature; they shape egg steps and hatch bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vitamins {
    pub protein: u32,
    pub calcium: u32,
    pub carbos: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptureStats {
    pub encountered: u64,
    pub defeated: u64,
    pub captured: u64,
    pub hatched: u64,
    pub shiny_encountered: u64,
    pub shiny_defeated: u64,
    pub shiny_captured: u64,
    pub shiny_hatched: u64,
}

impl CaptureStats {
    pub fn record_encounter(&mut self, shiny: bool) {
        self.encountered += 1;
        if shiny {
            self.shiny_encountered += 1;
        }
    }

    pub fn record_defeat(&mut self, shiny: bool) {
        self.defeated += 1;
        if shiny {
            self.shiny_defeated += 1;
        }
    }

    pub fn record_capture(&mut self, shiny: bool) {
        self.captured += 1;
        if shiny {
            self.shiny_captured += 1;
        }
    }

    pub fn record_hatch(&mut self, shiny: bool) {
        self.hatched += 1;
        if shiny {
            self.shiny_hatched += 1;
        }
    }

    /// Adds another set of counters onto this one.
    pub fn merge(&mut self, other: &CaptureStats) {
        self.encountered += other.encountered;
        self.defeated += other.defeated;
        self.captured += other.captured;
        self.hatched += other.hatched;
        self.shiny_encountered += other.shiny_encountered;
        self.shiny_defeated += other.shiny_defeated;
        self.shiny_captured += other.shiny_captured;
        self.shiny_hatched += other.shiny_hatched;
    }
}

/// A creature the player owns. One record per species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedPokemon {
    pub species_id: u32,
    pub level: u32,
    pub exp: u64,
    pub shiny: bool,
    #[serde(default)]
    pub effort_points: u64,
    #[serde(default)]
    pub pokerus: PokerusState,
    #[serde(default)]
    pub attack_bonus_percent: u32,
    #[serde(default)]
    pub attack_bonus_amount: u32,
    #[serde(default)]
    pub vitamins: Vitamins,
    #[serde(default)]
    pub breeding: bool,
    #[serde(default)]
    pub in_party: bool,
    #[serde(default)]
    pub stats: CaptureStats,
}

impl OwnedPokemon {
    pub fn new(species_id: u32, shiny: bool) -> Self {
        Self {
            species_id,
            level: 1,
            exp: 0,
            shiny,
            effort_points: 0,
            pokerus: PokerusState::Uninfected,
            attack_bonus_percent: 0,
            attack_bonus_amount: 0,
            vitamins: Vitamins::default(),
            breeding: false,
            in_party: false,
            stats: CaptureStats::default(),
        }
    }

    /// Record for a freshly caught creature, capture counted.
    pub fn caught(species_id: u32, shiny: bool) -> Self {
        let mut pokemon = Self::new(species_id, shiny);
        pokemon.stats.record_capture(shiny);
        pokemon
    }

    pub fn evs(&self) -> u64 {
        self.effort_points / EP_EV_RATIO
    }

    pub fn can_gain_evs(&self) -> bool {
        self.pokerus >= PokerusState::Contagious
    }

    /// Adds effort points if the creature can gain EVs. Returns the EP added.
    ///
    /// A contagious creature that reaches the EV threshold becomes resistant.
    pub fn gain_effort_points(&mut self, amount: u64, shiny: bool) -> u64 {
        if !self.can_gain_evs() {
            return 0;
        }
        let gained = if shiny {
            amount * SHINY_EP_MODIFIER
        } else {
            amount
        };
        self.effort_points += gained;
        if self.pokerus == PokerusState::Contagious && self.evs() >= RESISTANT_EV_THRESHOLD {
            self.pokerus = PokerusState::Resistant;
        }
        gained
    }

    /// Attack stat: hatch bonuses on the base, then level scaling, then EVs (capped).
    pub fn attack(&self, base_attack: u32) -> u64 {
        let boosted = base_attack as f64 * (100 + self.attack_bonus_percent) as f64 / 100.0
            + self.attack_bonus_amount as f64;
        let ev_multiplier = 1.0 + self.evs().min(RESISTANT_EV_THRESHOLD) as f64 / 100.0;
        let level_attack = super::exp::attack_from_level(boosted, self.level);
        (level_attack as f64 * ev_multiplier).floor() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pikachu() -> PokemonSpecies {
        PokemonSpecies {
            id: 25,
            name: "Pikachu".to_string(),
            types: TypePair::single(PokemonType::Electric),
            catch_rate: 190,
            base_attack: 55,
            base_exp: 112,
            egg_cycles: 10,
        }
    }

    #[test]
    fn test_type_codes_round_trip() {
        for t in PokemonType::ALL {
            assert_eq!(PokemonType::from_code(t.code()), Some(t));
        }
        assert_eq!(PokemonType::from_code(0), None);
        assert_eq!(PokemonType::from_code(19), None);
        assert_eq!(PokemonType::Normal.code(), 1);
        assert_eq!(PokemonType::Fairy.code(), 18);
    }

    #[test]
    fn test_type_pair_contains() {
        let pair = TypePair::dual(PokemonType::Water, PokemonType::Flying);
        assert!(pair.contains(PokemonType::Flying));
        assert!(!pair.contains(PokemonType::Fire));
        assert_eq!(pair.iter().count(), 2);
        assert_eq!(TypePair::single(PokemonType::Fire).iter().count(), 1);
    }

    #[test]
    fn test_catalog_lookup_is_case_insensitive() {
        let catalog = SpeciesCatalog::new(vec![pikachu()]);
        assert_eq!(catalog.by_name("pikachu").map(|s| s.id), Some(25));
        assert_eq!(catalog.by_id(25).map(|s| s.name.as_str()), Some("Pikachu"));
        assert!(matches!(
            catalog.require("Mew"),
            Err(GameError::NotFound { kind: "species", .. })
        ));
    }

    #[test]
    fn test_species_egg_cycles_default() {
        let json = r#"{"id":1,"name":"Bulbasaur","types":{"primary":"Grass","secondary":"Poison"},
            "catch_rate":45,"base_attack":49,"base_exp":64}"#;
        let species: PokemonSpecies = serde_json::from_str(json).unwrap();
        assert_eq!(species.egg_cycles, 20);
    }

    #[test]
    fn test_caught_records_capture() {
        let p = OwnedPokemon::caught(25, true);
        assert_eq!(p.stats.captured, 1);
        assert_eq!(p.stats.shiny_captured, 1);
        assert_eq!(p.level, 1);
    }

    #[test]
    fn test_ev_gain_requires_contagious() {
        let mut p = OwnedPokemon::new(25, false);
        assert_eq!(p.gain_effort_points(300, false), 0);
        p.pokerus = PokerusState::Infected;
        assert_eq!(p.gain_effort_points(300, false), 0);
        p.pokerus = PokerusState::Contagious;
        assert_eq!(p.gain_effort_points(300, false), 300);
        assert_eq!(p.effort_points, 300);
    }

    #[test]
    fn test_shiny_ep_multiplied() {
        let mut p = OwnedPokemon::new(25, true);
        p.pokerus = PokerusState::Resistant;
        assert_eq!(p.gain_effort_points(100, true), 500);
    }

    #[test]
    fn test_contagious_becomes_resistant_at_threshold() {
        let mut p = OwnedPokemon::new(25, false);
        p.pokerus = PokerusState::Contagious;
        p.effort_points = 49_000;
        p.gain_effort_points(999, false);
        assert_eq!(p.pokerus, PokerusState::Contagious);
        p.gain_effort_points(1, false);
        assert_eq!(p.evs(), 50);
        assert_eq!(p.pokerus, PokerusState::Resistant);
    }

    #[test]
    fn test_attack_scales_with_level_and_bonus() {
        let mut p = OwnedPokemon::new(25, false);
        assert_eq!(p.attack(55), 55);
        p.level = 51;
        // 55 * 2.0
        assert_eq!(p.attack(55), 110);
        p.level = 1;
        p.attack_bonus_percent = 100;
        p.attack_bonus_amount = 10;
        assert_eq!(p.attack(55), 120);
    }

    #[test]
    fn test_capture_stats_merge() {
        let mut a = CaptureStats::default();
        a.record_encounter(true);
        let mut b = CaptureStats::default();
        b.record_defeat(false);
        b.record_capture(true);
        a.merge(&b);
        assert_eq!(a.encountered, 1);
        assert_eq!(a.shiny_encountered, 1);
        assert_eq!(a.defeated, 1);
        assert_eq!(a.shiny_captured, 1);
    }
}
