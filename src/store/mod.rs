//! Persistence accessors.
//!
//! Engines never talk to a database. They read and write player state through
//! `PlayerStore`. Counter mutations (`add_currency`, `try_spend`, `use_ball`,
//! `use_balls`, `gain_balls`) must be applied atomically by implementations:
//! a row-level conditional update or equivalent, never an unguarded
//! read-modify-write. `MemoryStore` gets this for free from `&mut self`.

mod memory;
mod progress;

pub use memory::MemoryStore;
pub use progress::PlayerProgress;

use crate::breeding::Egg;
use crate::catching::{BallInventory, BallSettings, BallUsage, Pokeball};
use crate::core::GameResult;
use crate::dungeon::DungeonRun;
use crate::loot::LootItem;
use crate::pokemon::OwnedPokemon;
use crate::requirements::QuestProgress;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    PokeDollar,
    DungeonToken,
    BattlePoint,
    QuestPoint,
}

impl Currency {
    pub fn name(self) -> &'static str {
        match self {
            Currency::PokeDollar => "PokéDollars",
            Currency::DungeonToken => "dungeon tokens",
            Currency::BattlePoint => "battle points",
            Currency::QuestPoint => "quest points",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wallet {
    pub pokedollar: u64,
    pub dungeon_token: u64,
    pub battle_point: u64,
    pub quest_point: u64,
}

impl Wallet {
    pub fn balance(&self, currency: Currency) -> u64 {
        match currency {
            Currency::PokeDollar => self.pokedollar,
            Currency::DungeonToken => self.dungeon_token,
            Currency::BattlePoint => self.battle_point,
            Currency::QuestPoint => self.quest_point,
        }
    }

    pub(crate) fn balance_mut(&mut self, currency: Currency) -> &mut u64 {
        match currency {
            Currency::PokeDollar => &mut self.pokedollar,
            Currency::DungeonToken => &mut self.dungeon_token,
            Currency::BattlePoint => &mut self.battle_point,
            Currency::QuestPoint => &mut self.quest_point,
        }
    }

    /// Applies a signed delta, clamping at zero. Returns the new balance.
    pub fn apply(&mut self, currency: Currency, delta: i64) -> u64 {
        let balance = self.balance_mut(currency);
        *balance = if delta >= 0 {
            balance.saturating_add(delta as u64)
        } else {
            balance.saturating_sub(delta.unsigned_abs())
        };
        *balance
    }
}

/// Accessor contract over a player's persisted state.
///
/// Getters have get-or-create semantics: an absent wallet, inventory or
/// settings row reads as its starting value.
pub trait PlayerStore {
    fn wallet(&self, player_id: u64) -> Wallet;
    /// Signed atomic add, clamped at zero. Returns the new balance.
    fn add_currency(&mut self, player_id: u64, currency: Currency, delta: i64) -> u64;
    /// Atomic conditional decrement. False (and nothing spent) if short.
    fn try_spend(&mut self, player_id: u64, currency: Currency, amount: u64) -> bool;

    fn ball_inventory(&self, player_id: u64) -> BallInventory;
    fn use_ball(&mut self, player_id: u64, ball: Pokeball) -> bool;
    fn use_balls(&mut self, player_id: u64, usage: &BallUsage) -> GameResult<()>;
    fn gain_balls(&mut self, player_id: u64, ball: Pokeball, amount: u32, purchased: bool) -> u32;
    fn ball_settings(&self, player_id: u64) -> BallSettings;
    fn set_ball_settings(&mut self, player_id: u64, settings: BallSettings);

    fn owned(&self, player_id: u64, species_id: u32) -> Option<OwnedPokemon>;
    fn owned_all(&self, player_id: u64) -> Vec<OwnedPokemon>;
    /// Inserts new records. Species already owned are skipped. Returns the number inserted.
    fn bulk_create_pokemon(&mut self, player_id: u64, pokemon: Vec<OwnedPokemon>) -> usize;
    fn bulk_update_pokemon(&mut self, player_id: u64, pokemon: &[OwnedPokemon]);

    fn party(&self, player_id: u64) -> Vec<OwnedPokemon> {
        self.owned_all(player_id)
            .into_iter()
            .filter(|p| p.in_party)
            .collect()
    }

    fn eggs(&self, player_id: u64) -> Vec<Egg>;
    fn save_egg(&mut self, player_id: u64, egg: Egg);
    fn delete_egg(&mut self, player_id: u64, slot: usize) -> bool;

    fn dungeon_clears(&self, player_id: u64, dungeon_id: u32) -> u64;
    /// Increments the clear counter. Returns the new count.
    fn record_dungeon_clear(&mut self, player_id: u64, dungeon_id: u32) -> u64;
    fn route_kills(&self, player_id: u64, region: u32, route: u32) -> u64;
    fn add_route_kills(&mut self, player_id: u64, region: u32, route: u32, amount: u64) -> u64;
    /// Highest region with any route kills. 0 for a new player.
    fn highest_region(&self, player_id: u64) -> u32;
    fn has_badge(&self, player_id: u64, badge: &str) -> bool;
    /// True if the badge was not owned before.
    fn add_badge(&mut self, player_id: u64, badge: &str) -> bool;
    fn add_items(&mut self, player_id: u64, items: &[LootItem]);
    fn item_quantity(&self, player_id: u64, item_name: &str) -> u64;
    fn quest_progress(&self, player_id: u64, quest: &str) -> Option<QuestProgress>;
    fn set_quest_progress(&mut self, player_id: u64, quest: &str, progress: QuestProgress);
    fn temp_battle_defeats(&self, player_id: u64, battle: &str) -> u64;
    fn record_temp_battle_defeat(&mut self, player_id: u64, battle: &str) -> u64;

    /// The player's in-progress dungeon run, if any.
    fn active_run(&self, player_id: u64) -> Option<DungeonRun>;
    fn save_run(&mut self, run: &DungeonRun);
}
