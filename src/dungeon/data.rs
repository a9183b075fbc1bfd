//! Static dungeon definitions and the catalog they are looked up in.

use crate::battle::{default_difficulty_route, dungeon_level, DungeonTrainer};
use crate::core::constants::{
    DUNGEON_FALLBACK_BOSS_HEALTH, DUNGEON_FALLBACK_BOSS_LEVEL, DUNGEON_FALLBACK_ENEMY_HEALTH,
};
use crate::core::{GameError, GameResult};
use crate::loot::LootEntry;
use crate::requirements::{RequirementSpec, RequirementTree};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_weight() -> f64 {
    1.0
}

fn default_floors() -> u32 {
    1
}

fn default_boss_level() -> u32 {
    DUNGEON_FALLBACK_BOSS_LEVEL
}

/// A wild Pokémon in the dungeon's encounter pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonPokemon {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonBoss {
    pub name: String,
    pub health: u64,
    #[serde(default = "default_boss_level")]
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonData {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub region: u32,
    #[serde(default)]
    pub token_cost: u64,
    #[serde(default)]
    pub base_health: Option<u64>,
    #[serde(default)]
    pub difficulty_route: Option<u32>,
    #[serde(default = "default_floors")]
    pub total_floors: u32,
    #[serde(default)]
    pub enemies: Vec<DungeonPokemon>,
    #[serde(default)]
    pub bosses: Vec<DungeonBoss>,
    #[serde(default)]
    pub trainers: Vec<DungeonTrainer>,
    #[serde(default)]
    pub loot: Vec<LootEntry>,
    #[serde(default)]
    pub requirements: Vec<RequirementSpec>,
}

impl DungeonData {
    pub fn difficulty_route(&self) -> u32 {
        self.difficulty_route
            .unwrap_or_else(|| default_difficulty_route(self.region))
    }

    pub fn level(&self) -> u32 {
        dungeon_level(self.difficulty_route())
    }

    pub fn enemy_base_health(&self) -> u64 {
        self.base_health.unwrap_or(DUNGEON_FALLBACK_ENEMY_HEALTH)
    }

    pub fn requirement_tree(&self) -> GameResult<RequirementTree> {
        RequirementTree::from_specs(&self.requirements)
    }

    /// Boss trainers fight at the boss tile; regular ones roam.
    pub fn boss_trainer(&self) -> Option<&DungeonTrainer> {
        self.trainers.iter().find(|t| t.is_boss)
    }

    pub fn roaming_trainers(&self) -> impl Iterator<Item = &DungeonTrainer> {
        self.trainers.iter().filter(|t| !t.is_boss)
    }

    /// Boss used when the dungeon defines neither a boss Pokémon nor a boss trainer.
    pub fn fallback_boss(&self) -> DungeonBoss {
        DungeonBoss {
            name: "Unknown Boss".to_string(),
            health: self.base_health.unwrap_or(DUNGEON_FALLBACK_BOSS_HEALTH),
            level: DUNGEON_FALLBACK_BOSS_LEVEL,
        }
    }
}

/// All dungeons, addressable by id or case-insensitive name.
#[derive(Debug, Clone, Default)]
pub struct DungeonCatalog {
    dungeons: Vec<DungeonData>,
    by_id: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
}

impl DungeonCatalog {
    pub fn new(dungeons: Vec<DungeonData>) -> Self {
        let mut catalog = Self::default();
        for d in dungeons {
            let idx = catalog.dungeons.len();
            catalog.by_id.insert(d.id, idx);
            catalog.by_name.insert(d.name.to_lowercase(), idx);
            catalog.dungeons.push(d);
        }
        catalog
    }

    pub fn from_json_str(json: &str) -> GameResult<Self> {
        let dungeons: Vec<DungeonData> = serde_json::from_str(json)
            .map_err(|e| GameError::Validation(format!("dungeon data: {e}")))?;
        Ok(Self::new(dungeons))
    }

    pub fn by_id(&self, id: u32) -> Option<&DungeonData> {
        self.by_id.get(&id).map(|&i| &self.dungeons[i])
    }

    pub fn by_name(&self, name: &str) -> Option<&DungeonData> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&i| &self.dungeons[i])
    }

    pub fn require(&self, id: u32) -> GameResult<&DungeonData> {
        self.by_id(id).ok_or_else(|| GameError::not_found("dungeon", id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DungeonData> {
        self.dungeons.iter()
    }

    pub fn len(&self) -> usize {
        self.dungeons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dungeons.is_empty()
    }
}
