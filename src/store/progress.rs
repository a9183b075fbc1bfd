use super::PlayerStore;
use crate::dungeon::DungeonCatalog;
use crate::pokemon::SpeciesCatalog;
use crate::requirements::{ProgressContext, QuestProgress};

/// Reads requirement counters for one player straight from the store.
///
/// Names are resolved through the catalogs: a dungeon or species that does
/// not exist reads as "unknown", which requirement checks let through.
pub struct PlayerProgress<'a, S: PlayerStore> {
    store: &'a S,
    player_id: u64,
    species: &'a SpeciesCatalog,
    dungeons: &'a DungeonCatalog,
}

impl<'a, S: PlayerStore> PlayerProgress<'a, S> {
    pub fn new(
        store: &'a S,
        player_id: u64,
        species: &'a SpeciesCatalog,
        dungeons: &'a DungeonCatalog,
    ) -> Self {
        Self {
            store,
            player_id,
            species,
            dungeons,
        }
    }
}

impl<S: PlayerStore> ProgressContext for PlayerProgress<'_, S> {
    fn route_kills(&self, region: u32, route: u32) -> u64 {
        self.store.route_kills(self.player_id, region, route)
    }

    fn has_badge(&self, badge: &str) -> bool {
        self.store.has_badge(self.player_id, badge)
    }

    fn dungeon_clears(&self, dungeon: &str) -> Option<u64> {
        let data = self.dungeons.by_name(dungeon)?;
        Some(self.store.dungeon_clears(self.player_id, data.id))
    }

    fn temp_battle_defeats(&self, battle: &str) -> Option<u64> {
        Some(self.store.temp_battle_defeats(self.player_id, battle))
    }

    fn quest_progress(&self, quest: &str) -> Option<QuestProgress> {
        self.store.quest_progress(self.player_id, quest)
    }

    fn has_obtained(&self, pokemon: &str) -> bool {
        match self.species.by_name(pokemon) {
            Some(species) => self.store.owned(self.player_id, species.id).is_some(),
            None => true,
        }
    }
}
