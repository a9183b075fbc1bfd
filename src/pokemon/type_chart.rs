//! Attack-type versus defender-type multipliers (Gen 6 chart).

use super::types::{PokemonType, TypePair};

/// Chart lookup for a single attacker/defender pair. Unlisted pairs are neutral.
pub fn chart_multiplier(attacker: PokemonType, defender: PokemonType) -> f64 {
    use PokemonType::*;
    match (attacker, defender) {
        (Normal, Rock | Steel) => 0.5,
        (Normal, Ghost) => 0.0,

        (Fire, Fire | Water | Rock | Dragon) => 0.5,
        (Fire, Grass | Ice | Bug | Steel) => 2.0,

        (Water, Fire | Ground | Rock) => 2.0,
        (Water, Water | Grass | Dragon) => 0.5,

        (Electric, Water | Flying) => 2.0,
        (Electric, Electric | Grass | Dragon) => 0.5,
        (Electric, Ground) => 0.0,

        (Grass, Water | Ground | Rock) => 2.0,
        (Grass, Fire | Grass | Poison | Flying | Bug | Dragon | Steel) => 0.5,

        (Ice, Grass | Ground | Flying | Dragon) => 2.0,
        (Ice, Fire | Water | Ice | Steel) => 0.5,

        (Fighting, Normal | Ice | Rock | Dark | Steel) => 2.0,
        (Fighting, Poison | Flying | Psychic | Bug | Fairy) => 0.5,
        (Fighting, Ghost) => 0.0,

        (Poison, Grass | Fairy) => 2.0,
        (Poison, Poison | Ground | Rock | Ghost) => 0.5,
        (Poison, Steel) => 0.0,

        (Ground, Fire | Electric | Poison | Rock | Steel) => 2.0,
        (Ground, Grass | Bug) => 0.5,
        (Ground, Flying) => 0.0,

        (Flying, Grass | Fighting | Bug) => 2.0,
        (Flying, Electric | Rock | Steel) => 0.5,

        (Psychic, Fighting | Poison) => 2.0,
        (Psychic, Psychic | Steel) => 0.5,
        (Psychic, Dark) => 0.0,

        (Bug, Grass | Psychic | Dark) => 2.0,
        (Bug, Fire | Fighting | Poison | Flying | Ghost | Steel | Fairy) => 0.5,

        (Rock, Fire | Ice | Flying | Bug) => 2.0,
        (Rock, Fighting | Ground | Steel) => 0.5,

        (Ghost, Psychic | Ghost) => 2.0,
        (Ghost, Dark) => 0.5,
        (Ghost, Normal) => 0.0,

        (Dragon, Dragon) => 2.0,
        (Dragon, Steel) => 0.5,
        (Dragon, Fairy) => 0.0,

        (Dark, Psychic | Ghost) => 2.0,
        (Dark, Fighting | Dark | Fairy) => 0.5,

        (Steel, Ice | Rock | Fairy) => 2.0,
        (Steel, Fire | Water | Electric | Steel) => 0.5,

        (Fairy, Fighting | Dragon | Dark) => 2.0,
        (Fairy, Fire | Poison | Steel) => 0.5,

        _ => 1.0,
    }
}

/// Effectiveness of one attacking type against a (possibly dual-typed) defender.
pub fn type_effectiveness(attacker: PokemonType, defender: TypePair) -> f64 {
    defender
        .iter()
        .map(|d| chart_multiplier(attacker, d))
        .product()
}

/// Best matchup of the attacker's types against the defender.
///
/// A dual-typed attacker uses whichever of its two types hits harder.
pub fn attack_modifier(attacker: TypePair, defender: TypePair) -> f64 {
    attacker
        .iter()
        .map(|t| type_effectiveness(t, defender))
        .fold(f64::MIN, f64::max)
}
