//! Timed battle state machine used by gyms and dungeon bosses.
//!
//! Each tick first spends time; if the clock runs out the battle is lost.
//! Otherwise the active opponent takes `damage_per_tick * delta` and the next
//! opponent steps in when its HP hits zero. Beating the last one wins.

use crate::core::constants::MAX_TIMED_BATTLE_TICKS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleStatus {
    InProgress,
    Won,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opponent {
    pub name: String,
    pub level: u32,
    pub max_hp: u64,
    pub current_hp: u64,
}

impl Opponent {
    pub fn new(name: impl Into<String>, level: u32, max_hp: u64) -> Self {
        Self {
            name: name.into(),
            level,
            max_hp,
            current_hp: max_hp,
        }
    }

    pub fn hp_percent(&self) -> f64 {
        if self.max_hp == 0 {
            0.0
        } else {
            self.current_hp as f64 / self.max_hp as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedBattle {
    pub opponents: Vec<Opponent>,
    pub current_index: usize,
    pub time_limit: f64,
    pub time_remaining: f64,
    pub damage_per_tick: u64,
    pub status: BattleStatus,
}

impl TimedBattle {
    /// A limit that is not a positive finite number leaves no time at all:
    /// any non-empty team is lost on the spot.
    pub fn new(opponents: Vec<Opponent>, damage_per_tick: u64, time_limit: f64) -> Self {
        let time_limit = if time_limit.is_finite() && time_limit > 0.0 {
            time_limit
        } else {
            0.0
        };
        let status = if opponents.is_empty() {
            BattleStatus::Won
        } else if time_limit == 0.0 {
            BattleStatus::Lost
        } else {
            BattleStatus::InProgress
        };
        Self {
            opponents,
            current_index: 0,
            time_limit,
            time_remaining: time_limit,
            damage_per_tick,
            status,
        }
    }

    pub fn current_opponent(&self) -> Option<&Opponent> {
        self.opponents.get(self.current_index)
    }

    pub fn defeated_count(&self) -> usize {
        self.current_index.min(self.opponents.len())
    }

    pub fn time_used(&self) -> f64 {
        self.time_limit - self.time_remaining.max(0.0)
    }

    /// Advances the clock by `delta` seconds. No-op once resolved.
    pub fn tick(&mut self, delta: f64) -> BattleStatus {
        if self.status != BattleStatus::InProgress {
            return self.status;
        }

        self.time_remaining -= delta;
        if self.time_remaining <= 0.0 {
            self.status = BattleStatus::Lost;
            return self.status;
        }

        let damage = (self.damage_per_tick as f64 * delta).floor() as u64;
        if let Some(current) = self.opponents.get_mut(self.current_index) {
            current.current_hp = current.current_hp.saturating_sub(damage);
            if current.current_hp == 0 {
                self.current_index += 1;
                if self.current_index >= self.opponents.len() {
                    self.status = BattleStatus::Won;
                }
            }
        }
        self.status
    }

    /// Runs one-second ticks until the battle resolves, at most
    /// `MAX_TIMED_BATTLE_TICKS` of them.
    pub fn simulate_full(&mut self) -> BattleStatus {
        for _ in 0..MAX_TIMED_BATTLE_TICKS {
            if self.tick(1.0) != BattleStatus::InProgress {
                return self.status;
            }
        }
        self.status = BattleStatus::Lost;
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(hps: &[u64]) -> Vec<Opponent> {
        hps.iter()
            .enumerate()
            .map(|(i, &hp)| Opponent::new(format!("mon{i}"), 10, hp))
            .collect()
    }

    #[test]
    fn test_tick_damages_current_opponent() {
        let mut battle = TimedBattle::new(team(&[100, 50]), 30, 30.0);
        battle.tick(1.0);
        assert_eq!(battle.opponents[0].current_hp, 70);
        assert_eq!(battle.time_remaining, 29.0);
        assert_eq!(battle.status, BattleStatus::InProgress);
    }

    #[test]
    fn test_defeat_advances_to_next() {
        let mut battle = TimedBattle::new(team(&[20, 50]), 30, 30.0);
        battle.tick(1.0);
        assert_eq!(battle.current_index, 1);
        assert_eq!(battle.opponents[0].current_hp, 0);
        // Overkill does not carry over
        assert_eq!(battle.opponents[1].current_hp, 50);
    }

    #[test]
    fn test_win_when_all_defeated() {
        let mut battle = TimedBattle::new(team(&[10, 10]), 10, 30.0);
        battle.tick(1.0);
        assert_eq!(battle.tick(1.0), BattleStatus::Won);
        assert_eq!(battle.defeated_count(), 2);
        assert_eq!(battle.time_used(), 2.0);
    }

    #[test]
    fn test_lose_when_time_runs_out() {
        let mut battle = TimedBattle::new(team(&[1_000_000]), 1, 3.0);
        assert_eq!(battle.simulate_full(), BattleStatus::Lost);
        // Two damaging ticks, the third runs out the clock
        assert_eq!(battle.opponents[0].current_hp, 999_998);
        assert_eq!(battle.time_used(), 3.0);
    }

    #[test]
    fn test_resolved_battle_ignores_ticks() {
        let mut battle = TimedBattle::new(team(&[1]), 5, 30.0);
        battle.tick(1.0);
        let remaining = battle.time_remaining;
        assert_eq!(battle.tick(1.0), BattleStatus::Won);
        assert_eq!(battle.time_remaining, remaining);
    }

    #[test]
    fn test_fractional_delta_scales_damage() {
        let mut battle = TimedBattle::new(team(&[100]), 10, 30.0);
        battle.tick(0.5);
        assert_eq!(battle.opponents[0].current_hp, 95);
    }

    #[test]
    fn test_empty_team_is_won() {
        let battle = TimedBattle::new(Vec::new(), 1, 30.0);
        assert_eq!(battle.status, BattleStatus::Won);
    }

    #[test]
    fn test_simulate_full_win_within_limit() {
        // 29 damaging ticks available in a 30 second battle
        let mut battle = TimedBattle::new(team(&[290]), 10, 30.0);
        assert_eq!(battle.simulate_full(), BattleStatus::Won);
        let mut battle = TimedBattle::new(team(&[291]), 10, 30.0);
        assert_eq!(battle.simulate_full(), BattleStatus::Lost);
    }

    #[test]
    fn test_unusable_time_limit_loses_immediately() {
        for limit in [f64::NAN, f64::INFINITY, 0.0, -5.0] {
            let mut battle = TimedBattle::new(team(&[100]), 0, limit);
            assert_eq!(battle.status, BattleStatus::Lost);
            assert_eq!(battle.simulate_full(), BattleStatus::Lost);
            assert_eq!(battle.time_used(), 0.0);
        }
        assert_eq!(
            TimedBattle::new(Vec::new(), 0, f64::NAN).status,
            BattleStatus::Won
        );
    }

    #[test]
    fn test_simulate_full_stops_at_tick_cap() {
        let mut battle = TimedBattle::new(team(&[100]), 0, 1.0e12);
        assert_eq!(battle.simulate_full(), BattleStatus::Lost);
        assert_eq!(battle.time_used(), MAX_TIMED_BATTLE_TICKS as f64);
        assert_eq!(battle.opponents[0].current_hp, 100);
    }

    #[test]
    fn test_hp_percent() {
        let mut o = Opponent::new("x", 1, 200);
        o.current_hp = 50;
        assert_eq!(o.hp_percent(), 0.25);
        assert_eq!(Opponent::new("y", 1, 0).hp_percent(), 0.0);
    }
}
