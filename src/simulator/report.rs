//! Aggregated statistics for a batch of simulated runs.

use crate::loot::LootTier;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunOutcome {
    Cleared,
    BossLost,
    #[default]
    TimedOut,
}

/// What happened in one run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub outcome: RunOutcome,
    pub steps: u32,
    pub enemies_defeated: u32,
    pub chests_opened: u32,
    pub catches: u32,
    pub loot: Vec<LootTier>,
    pub money: u64,
    pub tokens: u64,
    pub exp: u64,
    pub first_clear: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SimReport {
    pub num_runs: u32,
    pub clears: u32,
    pub first_clears: u32,
    pub boss_losses: u32,
    pub timeouts: u32,
    pub total_steps: u64,
    pub total_enemies: u64,
    pub total_chests: u64,
    pub total_catches: u64,
    /// Chest drops per tier, indexed by `LootTier::index`.
    pub tier_counts: [u64; 5],
    pub total_money: u64,
    pub total_tokens: u64,
    pub total_exp: u64,
}

impl SimReport {
    pub(crate) fn from_runs(runs: Vec<RunStats>) -> Self {
        let mut report = Self {
            num_runs: runs.len() as u32,
            ..Self::default()
        };
        for run in &runs {
            match run.outcome {
                RunOutcome::Cleared => report.clears += 1,
                RunOutcome::BossLost => report.boss_losses += 1,
                RunOutcome::TimedOut => report.timeouts += 1,
            }
            if run.first_clear {
                report.first_clears += 1;
            }
            report.total_steps += run.steps as u64;
            report.total_enemies += run.enemies_defeated as u64;
            report.total_chests += run.chests_opened as u64;
            report.total_catches += run.catches as u64;
            for tier in &run.loot {
                report.tier_counts[tier.index()] += 1;
            }
            report.total_money += run.money;
            report.total_tokens += run.tokens;
            report.total_exp += run.exp;
        }
        report
    }

    pub fn clear_rate(&self) -> f64 {
        if self.num_runs == 0 {
            return 0.0;
        }
        self.clears as f64 / self.num_runs as f64 * 100.0
    }

    fn per_run(&self, total: u64) -> f64 {
        if self.num_runs == 0 {
            return 0.0;
        }
        total as f64 / self.num_runs as f64
    }

    /// Share of chest drops in `tier`, as a percentage.
    pub fn tier_percent(&self, tier: LootTier) -> f64 {
        let total: u64 = self.tier_counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        self.tier_counts[tier.index()] as f64 / total as f64 * 100.0
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Dungeon Simulation ({} runs) ===", self.num_runs);
        let _ = writeln!(
            out,
            "Clears: {} ({:.1}%)  boss losses: {}  timeouts: {}",
            self.clears,
            self.clear_rate(),
            self.boss_losses,
            self.timeouts
        );
        let _ = writeln!(
            out,
            "Per run: {:.1} steps, {:.1} enemies, {:.1} chests, {:.2} catches",
            self.per_run(self.total_steps),
            self.per_run(self.total_enemies),
            self.per_run(self.total_chests),
            self.per_run(self.total_catches)
        );
        let _ = writeln!(out, "\nLoot tiers:");
        for tier in LootTier::ALL {
            let _ = writeln!(
                out,
                "  {:<10} {:>8} ({:.1}%)",
                tier.name(),
                self.tier_counts[tier.index()],
                self.tier_percent(tier)
            );
        }
        let _ = writeln!(
            out,
            "\nRewards: {} money, {} dungeon tokens, {} exp",
            self.total_money, self.total_tokens, self.total_exp
        );
        out
    }
}
