//! Requirement evaluation and unmet-requirement hints.

use super::types::{Condition, NodeId, NodeKind, RequirementTree, StepComparison};
use chrono::{Datelike, Utc, Weekday};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuestProgress {
    /// Index of the current quest step.
    pub current_step: i64,
    pub completed: bool,
}

/// Player progress counters read by the evaluator.
///
/// Absent counters read as zero. The `Option` returns distinguish "unknown
/// target" (e.g. no dungeon by that name), which is treated permissively.
pub trait ProgressContext {
    fn route_kills(&self, region: u32, route: u32) -> u64;
    fn has_badge(&self, badge: &str) -> bool;
    fn dungeon_clears(&self, dungeon: &str) -> Option<u64>;
    fn temp_battle_defeats(&self, battle: &str) -> Option<u64>;
    fn quest_progress(&self, quest: &str) -> Option<QuestProgress>;
    fn has_obtained(&self, pokemon: &str) -> bool;

    fn today(&self) -> Weekday {
        Utc::now().weekday()
    }
}

/// Plain in-memory progress, mostly for tests and offline tools.
#[derive(Debug, Clone, Default)]
pub struct ProgressSnapshot {
    pub route_kills: HashMap<(u32, u32), u64>,
    pub badges: HashSet<String>,
    pub dungeon_clears: HashMap<String, u64>,
    pub temp_battle_defeats: HashMap<String, u64>,
    pub quests: HashMap<String, QuestProgress>,
    pub obtained: HashSet<String>,
    pub today: Option<Weekday>,
}

impl ProgressContext for ProgressSnapshot {
    fn route_kills(&self, region: u32, route: u32) -> u64 {
        self.route_kills.get(&(region, route)).copied().unwrap_or(0)
    }

    fn has_badge(&self, badge: &str) -> bool {
        self.badges.contains(badge)
    }

    fn dungeon_clears(&self, dungeon: &str) -> Option<u64> {
        Some(self.dungeon_clears.get(dungeon).copied().unwrap_or(0))
    }

    fn temp_battle_defeats(&self, battle: &str) -> Option<u64> {
        Some(self.temp_battle_defeats.get(battle).copied().unwrap_or(0))
    }

    fn quest_progress(&self, quest: &str) -> Option<QuestProgress> {
        self.quests.get(quest).copied()
    }

    fn has_obtained(&self, pokemon: &str) -> bool {
        self.obtained.contains(pokemon)
    }

    fn today(&self) -> Weekday {
        self.today.unwrap_or_else(|| Utc::now().weekday())
    }
}

/// Evaluates requirement trees against player progress. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequirementEngine;

impl RequirementEngine {
    pub fn new() -> Self {
        Self
    }

    /// Truth of one node. Empty combinators are met.
    pub fn evaluate(&self, tree: &RequirementTree, id: NodeId, ctx: &impl ProgressContext) -> bool {
        let Some(node) = tree.node(id) else {
            warn!(node = id, "requirement node missing, treating as met");
            return true;
        };
        match &node.kind {
            NodeKind::Leaf(condition) => self.check_condition(condition, ctx),
            NodeKind::All => {
                let met = node.children.iter().all(|&c| self.evaluate(tree, c, ctx));
                debug!(node = id, children = node.children.len(), met, "AND requirement");
                met
            }
            NodeKind::Any => {
                let met = node.children.is_empty()
                    || node.children.iter().any(|&c| self.evaluate(tree, c, ctx));
                debug!(node = id, children = node.children.len(), met, "OR requirement");
                met
            }
        }
    }

    /// All roots must hold. A tree without roots is unlocked.
    pub fn evaluate_all(&self, tree: &RequirementTree, ctx: &impl ProgressContext) -> bool {
        tree.roots().iter().all(|&r| self.evaluate(tree, r, ctx))
    }

    pub fn check_condition(&self, condition: &Condition, ctx: &impl ProgressContext) -> bool {
        match condition {
            Condition::RouteKill {
                region,
                route,
                amount,
            } => ctx.route_kills(*region, *route) >= *amount,
            Condition::GymBadge { badge } => badge.as_deref().map_or(true, |b| ctx.has_badge(b)),
            Condition::DungeonClear { dungeon, clears } => match dungeon {
                None => true,
                Some(name) => match ctx.dungeon_clears(name) {
                    Some(count) => count >= *clears,
                    None => {
                        warn!(dungeon = %name, "dungeon not found, requirement passes");
                        true
                    }
                },
            },
            Condition::TempBattle { battle, defeats } => match battle {
                None => true,
                Some(name) => match ctx.temp_battle_defeats(name) {
                    Some(count) => count >= *defeats,
                    None => {
                        warn!(battle = %name, "battle not found, requirement passes");
                        true
                    }
                },
            },
            Condition::QuestLineCompleted { quest } => match quest {
                None => true,
                Some(name) => ctx.quest_progress(name).is_some_and(|q| q.completed),
            },
            Condition::QuestLineStep {
                quest,
                step,
                option,
            } => match quest {
                None => true,
                Some(name) => {
                    let current = ctx.quest_progress(name).map_or(-1, |q| q.current_step);
                    match option {
                        StepComparison::More => current >= *step,
                        StepComparison::Less => current < *step,
                        StepComparison::Equal => current == *step,
                    }
                }
            },
            Condition::ObtainedPokemon { pokemon } => {
                pokemon.as_deref().map_or(true, |p| ctx.has_obtained(p))
            }
            Condition::Weather => true,
            Condition::DayOfWeek { days } => days.is_empty() || days.contains(&ctx.today()),
            Condition::SpecialEvent { .. } => false,
            Condition::Unknown { code } => {
                warn!(code, "unknown requirement kind, treating as met");
                true
            }
        }
    }

    /// One hint per unmet leaf, walking only through failing branches.
    /// A failing OR collapses its alternatives into a single line.
    pub fn hints(&self, tree: &RequirementTree, ctx: &impl ProgressContext) -> Vec<String> {
        let mut hints = Vec::new();
        for &root in tree.roots() {
            self.collect_hints(tree, root, ctx, &mut hints);
        }
        hints
    }

    fn collect_hints(
        &self,
        tree: &RequirementTree,
        id: NodeId,
        ctx: &impl ProgressContext,
        out: &mut Vec<String>,
    ) {
        if self.evaluate(tree, id, ctx) {
            return;
        }
        let Some(node) = tree.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Leaf(condition) => out.extend(hint_text(condition)),
            NodeKind::All => {
                for &child in &node.children {
                    self.collect_hints(tree, child, ctx, out);
                }
            }
            NodeKind::Any => {
                let mut options = Vec::new();
                for &child in &node.children {
                    self.collect_hints(tree, child, ctx, &mut options);
                }
                if !options.is_empty() {
                    out.push(options.join(" or "));
                }
            }
        }
    }
}

/// Human-readable description of a leaf. Placeholders have none.
pub fn hint_text(condition: &Condition) -> Option<String> {
    let unknown = || "?".to_string();
    match condition {
        Condition::RouteKill { route, amount, .. } => {
            Some(format!("Defeat {amount} Pokémon on Route {route}"))
        }
        Condition::GymBadge { badge } => Some(format!(
            "Requires the {} badge",
            badge.clone().unwrap_or_else(unknown)
        )),
        Condition::DungeonClear { dungeon, clears } => {
            let name = dungeon.clone().unwrap_or_else(unknown);
            Some(if *clears > 1 {
                format!("Clear {name} {clears} times")
            } else {
                format!("Clear {name}")
            })
        }
        Condition::TempBattle { battle, .. } => Some(format!(
            "Defeat {}",
            battle.clone().unwrap_or_else(unknown)
        )),
        Condition::QuestLineCompleted { quest } => Some(format!(
            "Complete the quest line: {}",
            quest.clone().unwrap_or_else(unknown)
        )),
        Condition::QuestLineStep { quest, step, .. } => Some(format!(
            "Reach step {step} of {}",
            quest.clone().unwrap_or_else(unknown)
        )),
        Condition::ObtainedPokemon { pokemon } => Some(format!(
            "Obtain {}",
            pokemon.clone().unwrap_or_else(unknown)
        )),
        Condition::DayOfWeek { days } => {
            let days: Vec<String> = days.iter().map(|d| d.to_string()).collect();
            Some(format!("Only open on {}", days.join(", ")))
        }
        Condition::Weather | Condition::SpecialEvent { .. } | Condition::Unknown { .. } => None,
    }
}
