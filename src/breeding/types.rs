//! Eggs and the formulas that size and reward them.

use crate::core::constants::{
    BREEDING_ATTACK_BONUS, BREEDING_EFFICIENCY, BREEDING_SHINY_ATTACK_MULTIPLIER, CARBOS_DIVISOR,
    CARBOS_STEP_THRESHOLD, EGG_CYCLE_MULTIPLIER,
};
use crate::pokemon::Vitamins;
use serde::{Deserialize, Serialize};

/// An egg in one hatchery slot. The species' owned record is flagged
/// `breeding` for as long as the egg exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Egg {
    pub species_id: u32,
    pub slot: usize,
    pub steps: u64,
    pub steps_required: u64,
    pub shiny_chance: u32,
}

impl Egg {
    pub fn new(species_id: u32, slot: usize, steps_required: u64, shiny_chance: u32) -> Self {
        Self {
            species_id,
            slot,
            steps: 0,
            steps_required,
            shiny_chance,
        }
    }

    pub fn can_hatch(&self) -> bool {
        self.steps >= self.steps_required
    }

    pub fn add_steps(&mut self, steps: u64) {
        self.steps = self.steps.saturating_add(steps);
    }

    pub fn steps_remaining(&self) -> u64 {
        self.steps_required.saturating_sub(self.steps)
    }

    /// Progress in percent, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        if self.steps_required == 0 {
            return 100.0;
        }
        (self.steps as f64 / self.steps_required as f64 * 100.0).min(100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HatchResult {
    pub species_id: u32,
    pub species_name: String,
    pub slot: usize,
    pub shiny: bool,
    pub attack_bonus_percent: u32,
    pub attack_bonus_amount: u32,
    /// Pokérus went from infected to contagious.
    pub pokerus_upgraded: bool,
}

/// Steps an egg needs.
///
/// Calcium and protein add half a cycle each per point. Carbos only bites
/// above 300 steps, bending the total down towards the threshold.
pub fn steps_required(egg_cycles: u32, vitamins: &Vitamins) -> u64 {
    let extra_cycles = (vitamins.calcium + vitamins.protein) as f64 / 2.0;
    let base = ((egg_cycles as f64 + extra_cycles) * EGG_CYCLE_MULTIPLIER).round();
    if base <= CARBOS_STEP_THRESHOLD || vitamins.carbos == 0 {
        return base as u64;
    }
    let exponent = 1.0 - vitamins.carbos as f64 / CARBOS_DIVISOR;
    ((base / CARBOS_STEP_THRESHOLD).powf(exponent) * CARBOS_STEP_THRESHOLD).floor() as u64
}

/// Attack bonus granted on hatch as `(percent, flat amount)`.
pub fn hatch_bonus(vitamins: &Vitamins, shiny: bool) -> (u32, u32) {
    let efficiency = BREEDING_EFFICIENCY / 100.0;
    let multiplier = if shiny {
        BREEDING_SHINY_ATTACK_MULTIPLIER
    } else {
        1
    };
    let percent = (((BREEDING_ATTACK_BONUS + vitamins.calcium) as f64 * efficiency).round()
        as u32)
        .max(1);
    let amount = (vitamins.protein as f64 * efficiency).round() as u32;
    (percent * multiplier, amount * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vitamins(protein: u32, calcium: u32, carbos: u32) -> Vitamins {
        Vitamins {
            protein,
            calcium,
            carbos,
        }
    }

    #[test]
    fn test_steps_without_vitamins() {
        assert_eq!(steps_required(20, &Vitamins::default()), 800);
        assert_eq!(steps_required(5, &Vitamins::default()), 200);
    }

    #[test]
    fn test_calcium_and_protein_add_cycles() {
        assert_eq!(steps_required(20, &vitamins(0, 10, 0)), 1000);
        assert_eq!(steps_required(20, &vitamins(3, 0, 0)), 860);
    }

    #[test]
    fn test_carbos_reduces_long_eggs_only() {
        // (800/300)^0.5 * 300 = 489.89
        assert_eq!(steps_required(20, &vitamins(0, 0, 35)), 489);
        assert_eq!(steps_required(5, &vitamins(0, 0, 35)), 200);
        assert_eq!(steps_required(20, &vitamins(0, 0, 70)), 300);
    }

    #[test]
    fn test_hatch_bonus() {
        assert_eq!(hatch_bonus(&Vitamins::default(), false), (25, 0));
        assert_eq!(hatch_bonus(&vitamins(4, 5, 0), false), (30, 4));
        assert_eq!(hatch_bonus(&vitamins(4, 5, 0), true), (60, 8));
    }

    #[test]
    fn test_egg_progress() {
        let mut egg = Egg::new(1, 0, 800, 1024);
        assert!(!egg.can_hatch());
        egg.add_steps(200);
        assert_eq!(egg.progress_percent(), 25.0);
        assert_eq!(egg.steps_remaining(), 600);
        egg.add_steps(1000);
        assert!(egg.can_hatch());
        assert_eq!(egg.progress_percent(), 100.0);
        assert_eq!(egg.steps_remaining(), 0);
    }
}
