//! Ball tiers, catch rate and ball choice.

use super::inventory::BallInventory;
use crate::core::constants::CATCH_RATE_EXPONENT;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ball tier. Ordering follows strength; `None` means "do not throw".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Pokeball {
    #[default]
    None,
    Poke,
    Great,
    Ultra,
    Master,
}

impl Pokeball {
    pub const THROWABLE: [Pokeball; 4] = [
        Pokeball::Poke,
        Pokeball::Great,
        Pokeball::Ultra,
        Pokeball::Master,
    ];

    /// Flat bonus added to the catch rate.
    pub fn catch_bonus(self) -> f64 {
        match self {
            Pokeball::None | Pokeball::Poke => 0.0,
            Pokeball::Great => 5.0,
            Pokeball::Ultra => 10.0,
            Pokeball::Master => 100.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Pokeball::None => "None",
            Pokeball::Poke => "Poké Ball",
            Pokeball::Great => "Great Ball",
            Pokeball::Ultra => "Ultra Ball",
            Pokeball::Master => "Master Ball",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchAttemptResult {
    pub success: bool,
    pub pokeball_used: Pokeball,
    pub catch_rate: f64,
}

/// Catch chance in percent for a species' base rate thrown with `ball`.
pub fn catch_rate(base_rate: u32, ball: Pokeball) -> f64 {
    match ball {
        Pokeball::None => 0.0,
        Pokeball::Master => 100.0,
        _ => ((base_rate as f64).powf(CATCH_RATE_EXPONENT) + ball.catch_bonus()).clamp(0.0, 100.0),
    }
}

/// One throw: succeeds when a uniform roll in [0, 100) lands under the rate.
pub fn attempt_catch(base_rate: u32, ball: Pokeball, rng: &mut impl Rng) -> CatchAttemptResult {
    let rate = catch_rate(base_rate, ball);
    let roll = rng.gen::<f64>() * 100.0;
    let success = roll < rate;
    tracing::debug!(base_rate, ?ball, rate, roll, success, "catch attempt");
    CatchAttemptResult {
        success,
        pokeball_used: ball,
        catch_rate: rate,
    }
}

/// 1-in-`chance` shiny roll. A chance of 0 never rolls shiny.
pub fn roll_shiny(chance: u32, rng: &mut impl Rng) -> bool {
    chance > 0 && rng.gen_range(0..chance) == 0
}

/// Which ball the player wants thrown, per (new species, shiny) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallSettings {
    pub new_shiny: Pokeball,
    pub new_pokemon: Pokeball,
    pub caught_shiny: Pokeball,
    pub caught_pokemon: Pokeball,
}

impl Default for BallSettings {
    fn default() -> Self {
        Self {
            new_shiny: Pokeball::Ultra,
            new_pokemon: Pokeball::Poke,
            caught_shiny: Pokeball::Poke,
            caught_pokemon: Pokeball::None,
        }
    }
}

impl BallSettings {
    pub fn preferred(&self, is_new: bool, is_shiny: bool) -> Pokeball {
        match (is_new, is_shiny) {
            (true, true) => self.new_shiny,
            (true, false) => self.new_pokemon,
            (false, true) => self.caught_shiny,
            (false, false) => self.caught_pokemon,
        }
    }
}

/// Ball actually thrown: the preferred one if stocked, otherwise the first
/// stocked of Ultra, Great, Poké that is no stronger than the preference.
pub fn resolve_ball(preferred: Pokeball, inventory: &BallInventory) -> Option<Pokeball> {
    if preferred == Pokeball::None {
        return None;
    }
    [preferred, Pokeball::Ultra, Pokeball::Great, Pokeball::Poke]
        .into_iter()
        .filter(|&b| b <= preferred)
        .find(|&b| inventory.quantity(b) > 0)
}
