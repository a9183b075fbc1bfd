use super::{Currency, PlayerStore, Wallet};
use crate::breeding::Egg;
use crate::catching::{BallInventory, BallSettings, BallUsage, Pokeball};
use crate::core::GameResult;
use crate::dungeon::{DungeonRun, RunStatus};
use crate::loot::LootItem;
use crate::pokemon::OwnedPokemon;
use crate::requirements::QuestProgress;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct PlayerRecord {
    wallet: Wallet,
    balls: Option<BallInventory>,
    settings: BallSettings,
    pokemon: BTreeMap<u32, OwnedPokemon>,
    eggs: BTreeMap<usize, Egg>,
    dungeon_clears: HashMap<u32, u64>,
    route_kills: HashMap<(u32, u32), u64>,
    badges: HashSet<String>,
    items: HashMap<String, u64>,
    quests: HashMap<String, QuestProgress>,
    temp_battles: HashMap<String, u64>,
}

impl PlayerRecord {
    fn balls_mut(&mut self) -> &mut BallInventory {
        self.balls.get_or_insert_with(BallInventory::starter)
    }
}

/// In-process store used by tests and the simulator.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    players: HashMap<u64, PlayerRecord>,
    runs: HashMap<Uuid, DungeonRun>,
}

impl MemoryStore {
    fn player(&self, player_id: u64) -> Option<&PlayerRecord> {
        self.players.get(&player_id)
    }

    fn player_mut(&mut self, player_id: u64) -> &mut PlayerRecord {
        self.players.entry(player_id).or_default()
    }

    pub fn run(&self, run_id: Uuid) -> Option<&DungeonRun> {
        self.runs.get(&run_id)
    }
}

impl PlayerStore for MemoryStore {
    fn wallet(&self, player_id: u64) -> Wallet {
        self.player(player_id).map(|p| p.wallet).unwrap_or_default()
    }

    fn add_currency(&mut self, player_id: u64, currency: Currency, delta: i64) -> u64 {
        self.player_mut(player_id).wallet.apply(currency, delta)
    }

    fn try_spend(&mut self, player_id: u64, currency: Currency, amount: u64) -> bool {
        let balance = self.player_mut(player_id).wallet.balance_mut(currency);
        if *balance < amount {
            return false;
        }
        *balance -= amount;
        true
    }

    fn ball_inventory(&self, player_id: u64) -> BallInventory {
        self.player(player_id)
            .and_then(|p| p.balls.clone())
            .unwrap_or_else(BallInventory::starter)
    }

    fn use_ball(&mut self, player_id: u64, ball: Pokeball) -> bool {
        self.player_mut(player_id).balls_mut().use_ball(ball)
    }

    fn use_balls(&mut self, player_id: u64, usage: &BallUsage) -> GameResult<()> {
        self.player_mut(player_id).balls_mut().use_balls(usage)
    }

    fn gain_balls(&mut self, player_id: u64, ball: Pokeball, amount: u32, purchased: bool) -> u32 {
        self.player_mut(player_id)
            .balls_mut()
            .gain(ball, amount, purchased)
    }

    fn ball_settings(&self, player_id: u64) -> BallSettings {
        self.player(player_id)
            .map(|p| p.settings)
            .unwrap_or_default()
    }

    fn set_ball_settings(&mut self, player_id: u64, settings: BallSettings) {
        self.player_mut(player_id).settings = settings;
    }

    fn owned(&self, player_id: u64, species_id: u32) -> Option<OwnedPokemon> {
        self.player(player_id)?.pokemon.get(&species_id).cloned()
    }

    fn owned_all(&self, player_id: u64) -> Vec<OwnedPokemon> {
        self.player(player_id)
            .map(|p| p.pokemon.values().cloned().collect())
            .unwrap_or_default()
    }

    fn bulk_create_pokemon(&mut self, player_id: u64, pokemon: Vec<OwnedPokemon>) -> usize {
        let record = self.player_mut(player_id);
        let mut created = 0;
        for p in pokemon {
            if let std::collections::btree_map::Entry::Vacant(slot) =
                record.pokemon.entry(p.species_id)
            {
                slot.insert(p);
                created += 1;
            }
        }
        created
    }

    fn bulk_update_pokemon(&mut self, player_id: u64, pokemon: &[OwnedPokemon]) {
        let record = self.player_mut(player_id);
        for p in pokemon {
            if let Some(existing) = record.pokemon.get_mut(&p.species_id) {
                *existing = p.clone();
            }
        }
    }

    fn eggs(&self, player_id: u64) -> Vec<Egg> {
        self.player(player_id)
            .map(|p| p.eggs.values().cloned().collect())
            .unwrap_or_default()
    }

    fn save_egg(&mut self, player_id: u64, egg: Egg) {
        self.player_mut(player_id).eggs.insert(egg.slot, egg);
    }

    fn delete_egg(&mut self, player_id: u64, slot: usize) -> bool {
        self.player_mut(player_id).eggs.remove(&slot).is_some()
    }

    fn dungeon_clears(&self, player_id: u64, dungeon_id: u32) -> u64 {
        self.player(player_id)
            .and_then(|p| p.dungeon_clears.get(&dungeon_id).copied())
            .unwrap_or(0)
    }

    fn record_dungeon_clear(&mut self, player_id: u64, dungeon_id: u32) -> u64 {
        let clears = self
            .player_mut(player_id)
            .dungeon_clears
            .entry(dungeon_id)
            .or_insert(0);
        *clears += 1;
        *clears
    }

    fn route_kills(&self, player_id: u64, region: u32, route: u32) -> u64 {
        self.player(player_id)
            .and_then(|p| p.route_kills.get(&(region, route)).copied())
            .unwrap_or(0)
    }

    fn add_route_kills(&mut self, player_id: u64, region: u32, route: u32, amount: u64) -> u64 {
        let kills = self
            .player_mut(player_id)
            .route_kills
            .entry((region, route))
            .or_insert(0);
        *kills += amount;
        *kills
    }

    fn highest_region(&self, player_id: u64) -> u32 {
        self.player(player_id)
            .and_then(|p| {
                p.route_kills
                    .iter()
                    .filter(|(_, &kills)| kills > 0)
                    .map(|(&(region, _), _)| region)
                    .max()
            })
            .unwrap_or(0)
    }

    fn has_badge(&self, player_id: u64, badge: &str) -> bool {
        self.player(player_id)
            .is_some_and(|p| p.badges.contains(badge))
    }

    fn add_badge(&mut self, player_id: u64, badge: &str) -> bool {
        self.player_mut(player_id).badges.insert(badge.to_string())
    }

    fn add_items(&mut self, player_id: u64, items: &[LootItem]) {
        let record = self.player_mut(player_id);
        for item in items {
            *record.items.entry(item.item_name.clone()).or_insert(0) += item.amount as u64;
        }
    }

    fn item_quantity(&self, player_id: u64, item_name: &str) -> u64 {
        self.player(player_id)
            .and_then(|p| p.items.get(item_name).copied())
            .unwrap_or(0)
    }

    fn quest_progress(&self, player_id: u64, quest: &str) -> Option<QuestProgress> {
        self.player(player_id)?.quests.get(quest).copied()
    }

    fn set_quest_progress(&mut self, player_id: u64, quest: &str, progress: QuestProgress) {
        self.player_mut(player_id)
            .quests
            .insert(quest.to_string(), progress);
    }

    fn temp_battle_defeats(&self, player_id: u64, battle: &str) -> u64 {
        self.player(player_id)
            .and_then(|p| p.temp_battles.get(battle).copied())
            .unwrap_or(0)
    }

    fn record_temp_battle_defeat(&mut self, player_id: u64, battle: &str) -> u64 {
        let defeats = self
            .player_mut(player_id)
            .temp_battles
            .entry(battle.to_string())
            .or_insert(0);
        *defeats += 1;
        *defeats
    }

    fn active_run(&self, player_id: u64) -> Option<DungeonRun> {
        self.runs
            .values()
            .find(|r| r.player_id == player_id && r.status == RunStatus::InProgress)
            .cloned()
    }

    fn save_run(&mut self, run: &DungeonRun) {
        self.runs.insert(run.id, run.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_spend_never_goes_negative() {
        let mut store = MemoryStore::default();
        store.add_currency(1, Currency::DungeonToken, 10);
        assert!(!store.try_spend(1, Currency::DungeonToken, 11));
        assert!(store.try_spend(1, Currency::DungeonToken, 10));
        assert_eq!(store.wallet(1).dungeon_token, 0);
    }

    #[test]
    fn test_missing_player_reads_starting_values() {
        let store = MemoryStore::default();
        assert_eq!(store.wallet(9), Wallet::default());
        assert_eq!(store.ball_inventory(9), BallInventory::starter());
        assert_eq!(store.ball_settings(9), BallSettings::default());
        assert!(store.owned_all(9).is_empty());
        assert_eq!(store.dungeon_clears(9, 1), 0);
    }

    #[test]
    fn test_use_ball_creates_starter_inventory() {
        let mut store = MemoryStore::default();
        assert!(store.use_ball(1, Pokeball::Poke));
        let inv = store.ball_inventory(1);
        assert_eq!(inv.quantity(Pokeball::Poke), 24);
        assert_eq!(inv.stock(Pokeball::Poke).used, 1);
    }

    #[test]
    fn test_bulk_create_skips_existing_species() {
        let mut store = MemoryStore::default();
        assert_eq!(
            store.bulk_create_pokemon(1, vec![OwnedPokemon::caught(25, false)]),
            1
        );
        let created = store.bulk_create_pokemon(
            1,
            vec![OwnedPokemon::caught(25, true), OwnedPokemon::caught(1, false)],
        );
        assert_eq!(created, 1);
        assert!(!store.owned(1, 25).unwrap().shiny);
    }

    #[test]
    fn test_bulk_update_ignores_unknown_species() {
        let mut store = MemoryStore::default();
        store.bulk_create_pokemon(1, vec![OwnedPokemon::caught(25, false)]);
        let mut p = store.owned(1, 25).unwrap();
        p.level = 12;
        store.bulk_update_pokemon(1, &[p, OwnedPokemon::new(150, false)]);
        assert_eq!(store.owned(1, 25).unwrap().level, 12);
        assert!(store.owned(1, 150).is_none());
    }

    #[test]
    fn test_counters() {
        let mut store = MemoryStore::default();
        assert_eq!(store.record_dungeon_clear(1, 4), 1);
        assert_eq!(store.record_dungeon_clear(1, 4), 2);
        assert_eq!(store.add_route_kills(1, 0, 3, 7), 7);
        assert_eq!(store.route_kills(1, 0, 3), 7);
        assert!(store.add_badge(1, "Boulder"));
        assert!(!store.add_badge(1, "Boulder"));
        assert!(store.has_badge(1, "Boulder"));
    }

    #[test]
    fn test_highest_region_ignores_zero_kills() {
        let mut store = MemoryStore::default();
        assert_eq!(store.highest_region(1), 0);
        store.add_route_kills(1, 1, 22, 3);
        store.add_route_kills(1, 4, 1, 0);
        assert_eq!(store.highest_region(1), 1);
    }

    #[test]
    fn test_quest_and_temp_battle_progress() {
        let mut store = MemoryStore::default();
        assert_eq!(store.quest_progress(1, "Tutorial"), None);
        let progress = QuestProgress {
            current_step: 2,
            completed: false,
        };
        store.set_quest_progress(1, "Tutorial", progress);
        assert_eq!(store.quest_progress(1, "Tutorial"), Some(progress));
        assert_eq!(store.temp_battle_defeats(1, "Rival"), 0);
        assert_eq!(store.record_temp_battle_defeat(1, "Rival"), 1);
        assert_eq!(store.temp_battle_defeats(1, "Rival"), 1);
    }
}
