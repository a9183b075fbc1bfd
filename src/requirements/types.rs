//! Requirement tree stored as an arena of nodes addressed by index.

use crate::core::{GameError, GameResult};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type NodeId = usize;

pub const CODE_ROUTE_KILL: u16 = 1;
pub const CODE_GYM_BADGE: u16 = 2;
pub const CODE_DUNGEON_CLEAR: u16 = 3;
pub const CODE_TEMP_BATTLE: u16 = 4;
pub const CODE_QUEST_LINE_COMPLETED: u16 = 5;
pub const CODE_QUEST_LINE_STEP: u16 = 6;
pub const CODE_OBTAINED_POKEMON: u16 = 7;
pub const CODE_WEATHER: u16 = 8;
pub const CODE_DAY_OF_WEEK: u16 = 9;
pub const CODE_SPECIAL_EVENT: u16 = 10;
pub const CODE_ANY: u16 = 100;
pub const CODE_ALL: u16 = 101;

/// How a quest step requirement compares the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepComparison {
    /// current >= step
    #[default]
    More,
    /// current < step
    Less,
    /// current == step
    Equal,
}

/// A leaf check against player progress.
///
/// Named targets are optional: a leaf with no target always passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    RouteKill {
        region: u32,
        route: u32,
        amount: u64,
    },
    GymBadge {
        badge: Option<String>,
    },
    DungeonClear {
        dungeon: Option<String>,
        clears: u64,
    },
    TempBattle {
        battle: Option<String>,
        defeats: u64,
    },
    QuestLineCompleted {
        quest: Option<String>,
    },
    QuestLineStep {
        quest: Option<String>,
        step: i64,
        option: StepComparison,
    },
    ObtainedPokemon {
        pokemon: Option<String>,
    },
    /// Placeholder: always met.
    Weather,
    DayOfWeek {
        days: Vec<Weekday>,
    },
    /// Placeholder: never met.
    SpecialEvent {
        event: Option<String>,
    },
    Unknown {
        code: u16,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Leaf(Condition),
    /// AND over children.
    All,
    /// OR over children.
    Any,
}

fn param_str(params: &Value, key: &str) -> Option<String> {
    match params.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn param_u64(params: &Value, key: &str, default: u64) -> u64 {
    params.get(key).and_then(Value::as_u64).unwrap_or(default)
}

fn param_i64(params: &Value, key: &str, default: i64) -> i64 {
    params.get(key).and_then(Value::as_i64).unwrap_or(default)
}

fn param_days(params: &Value) -> Vec<Weekday> {
    params
        .get("days")
        .and_then(Value::as_array)
        .map(|days| {
            days.iter()
                .filter_map(Value::as_str)
                .filter_map(|d| d.parse::<Weekday>().ok())
                .collect()
        })
        .unwrap_or_default()
}

impl NodeKind {
    /// Decodes a stored requirement row: numeric kind plus JSON parameters.
    /// Unrecognised codes become `Condition::Unknown`.
    pub fn from_code(code: u16, params: &Value) -> Self {
        let condition = match code {
            CODE_ANY => return NodeKind::Any,
            CODE_ALL => return NodeKind::All,
            CODE_ROUTE_KILL => Condition::RouteKill {
                region: param_u64(params, "region", 0) as u32,
                route: param_u64(params, "route", 0) as u32,
                amount: param_u64(params, "amount", 10),
            },
            CODE_GYM_BADGE => Condition::GymBadge {
                badge: param_str(params, "badge"),
            },
            CODE_DUNGEON_CLEAR => Condition::DungeonClear {
                dungeon: param_str(params, "dungeon"),
                clears: param_u64(params, "clears", 1),
            },
            CODE_TEMP_BATTLE => Condition::TempBattle {
                battle: param_str(params, "battle"),
                defeats: param_u64(params, "defeats", 1),
            },
            CODE_QUEST_LINE_COMPLETED => Condition::QuestLineCompleted {
                quest: param_str(params, "quest"),
            },
            CODE_QUEST_LINE_STEP => Condition::QuestLineStep {
                quest: param_str(params, "quest"),
                step: param_i64(params, "step", 0),
                option: match params.get("option").and_then(Value::as_str) {
                    Some("less") => StepComparison::Less,
                    Some("equal") => StepComparison::Equal,
                    _ => StepComparison::More,
                },
            },
            CODE_OBTAINED_POKEMON => Condition::ObtainedPokemon {
                pokemon: param_str(params, "pokemon"),
            },
            CODE_WEATHER => Condition::Weather,
            CODE_DAY_OF_WEEK => Condition::DayOfWeek {
                days: param_days(params),
            },
            CODE_SPECIAL_EVENT => Condition::SpecialEvent {
                event: param_str(params, "event"),
            },
            other => Condition::Unknown { code: other },
        };
        NodeKind::Leaf(condition)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Leaf(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

/// Nested requirement as written in data files:
/// `{"type": 101, "params": {...}, "children": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementSpec {
    #[serde(rename = "type")]
    pub code: u16,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub children: Vec<RequirementSpec>,
}

/// Forest of requirement nodes. Roots are implicitly ANDed.
///
/// Children only ever point at nodes created after their parent, so the
/// structure cannot contain cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementTree {
    nodes: Vec<RequirementNode>,
    roots: Vec<NodeId>,
}

impl RequirementTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(RequirementNode {
            id,
            kind,
            children: Vec::new(),
            parent,
        });
        id
    }

    pub fn add_root(&mut self, kind: NodeKind) -> NodeId {
        let id = self.push(kind, None);
        self.roots.push(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind) -> GameResult<NodeId> {
        let parent_node = self
            .nodes
            .get(parent)
            .ok_or_else(|| GameError::not_found("requirement", parent))?;
        if parent_node.kind.is_leaf() {
            return Err(GameError::Validation(format!(
                "requirement {parent} is a leaf and cannot have children"
            )));
        }
        let id = self.push(kind, Some(parent));
        self.nodes[parent].children.push(id);
        Ok(id)
    }

    /// Builds a tree from nested data-file entries.
    pub fn from_specs(specs: &[RequirementSpec]) -> GameResult<Self> {
        let mut tree = Self::new();
        for spec in specs {
            let root = tree.add_root(NodeKind::from_code(spec.code, &spec.params));
            tree.attach_children(root, &spec.children)?;
        }
        Ok(tree)
    }

    fn attach_children(&mut self, parent: NodeId, specs: &[RequirementSpec]) -> GameResult<()> {
        for spec in specs {
            let id = self.add_child(parent, NodeKind::from_code(spec.code, &spec.params))?;
            self.attach_children(id, &spec.children)?;
        }
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&RequirementNode> {
        self.nodes.get(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
