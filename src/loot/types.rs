use serde::{Deserialize, Serialize};
use std::fmt;

/// Loot rarity, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LootTier {
    Common,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl LootTier {
    pub const ALL: [LootTier; 5] = [
        LootTier::Common,
        LootTier::Rare,
        LootTier::Epic,
        LootTier::Legendary,
        LootTier::Mythic,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            LootTier::Common => "common",
            LootTier::Rare => "rare",
            LootTier::Epic => "epic",
            LootTier::Legendary => "legendary",
            LootTier::Mythic => "mythic",
        }
    }
}

impl fmt::Display for LootTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of a dungeon's loot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item_name: String,
    pub tier: LootTier,
    #[serde(default = "default_loot_weight")]
    pub weight: f64,
}

fn default_loot_weight() -> f64 {
    1.0
}

/// An item pulled from a chest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootItem {
    pub item_name: String,
    pub tier: LootTier,
    pub amount: u32,
    /// Pokémon rewards trigger an encounter instead of going to the bag.
    #[serde(default)]
    pub is_pokemon: bool,
}
