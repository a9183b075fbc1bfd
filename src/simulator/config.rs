//! Simulation configuration.

use crate::core::constants::DEFAULT_DUNGEON_MAP_SIZE;

/// Configuration for a batch of simulated dungeon runs.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of dungeon runs to perform
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Side length of each generated floor
    pub dungeon_size: usize,

    /// Flat attack of the single party member
    pub party_attack: u64,

    /// Moves allowed per run before it is abandoned
    pub max_steps_per_run: u32,

    /// Log verbosity (0 = silent, 1 = summary, 2 = per run)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: 1000,
            seed: None,
            dungeon_size: DEFAULT_DUNGEON_MAP_SIZE,
            party_attack: 500,
            max_steps_per_run: 400,
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// Small seeded batch for smoke tests.
    pub fn quick(seed: u64) -> Self {
        Self {
            num_runs: 20,
            seed: Some(seed),
            verbosity: 0,
            ..Default::default()
        }
    }

    /// Party too weak to beat the boss in time.
    pub fn underpowered(num_runs: u32) -> Self {
        Self {
            num_runs,
            party_attack: 10,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let quick = SimConfig::quick(9);
        assert_eq!(quick.seed, Some(9));
        assert_eq!(quick.num_runs, 20);
        assert_eq!(quick.dungeon_size, DEFAULT_DUNGEON_MAP_SIZE);
        assert!(SimConfig::underpowered(5).party_attack < SimConfig::default().party_attack);
    }
}
