//! Chest loot: clear-count tier weighting, item draw, and the debuff rule.

use super::types::{LootEntry, LootItem, LootTier};
use crate::core::constants::{
    LOOT_DEBUFF_REGION_GAP, LOOT_REDISTRIBUTE_AMOUNT, LOOT_REDISTRIBUTE_MAX_CLEARS,
};
use crate::core::weighted::{pick_index, pick_weighted};
use rand::Rng;
use tracing::{debug, warn};

/// Tier weights indexed by `LootTier::index`.
pub type TierWeights = [f64; 5];

pub const BASE_TIER_CHANCE: TierWeights = [0.75, 0.2, 0.04, 0.0099, 0.0001];
pub const NERFED_TIER_CHANCE: TierWeights = [0.75, 0.24, 0.009, 0.00099, 0.00001];
/// Sums to zero: common gives, everything else takes.
pub const TIER_REDISTRIBUTION: TierWeights = [-1.0, 0.33, 0.4, 0.2, 0.07];

const NON_POKEMON_KEYWORDS: &[&str] = &[
    "stone", "berry", "ball", "shard", "plate", "gem", "token", "fossil", "item", "key", "tm",
    "hm", "candy", "vitamin", "incense", "mail", "held",
];

/// Tier weights after `clears` clears. Debuffed dungeons use the nerfed
/// table whatever the clear count.
pub fn tier_weights(clears: u64, debuffed: bool) -> TierWeights {
    if debuffed {
        return NERFED_TIER_CHANCE;
    }
    let cleared = clears.min(LOOT_REDISTRIBUTE_MAX_CLEARS) as f64;
    let shift = LOOT_REDISTRIBUTE_AMOUNT * cleared / LOOT_REDISTRIBUTE_MAX_CLEARS as f64;
    let mut weights = BASE_TIER_CHANCE;
    for (w, factor) in weights.iter_mut().zip(TIER_REDISTRIBUTION) {
        *w += shift * factor;
    }
    weights
}

/// Weighted tier draw. Falls back to common when nothing has weight.
pub fn select_tier(weights: &TierWeights, rng: &mut impl Rng) -> LootTier {
    let tier = pick_index(weights, rng)
        .map(|i| LootTier::ALL[i])
        .unwrap_or(LootTier::Common);
    debug!(%tier, "loot tier rolled");
    tier
}

/// Weighted draw from the rows of `table` in `tier`. An empty tier falls back
/// to the common rows; if those are empty too there is no loot.
pub fn select_item(table: &[LootEntry], tier: LootTier, rng: &mut impl Rng) -> Option<LootItem> {
    let mut rows: Vec<&LootEntry> = table.iter().filter(|e| e.tier == tier).collect();
    if rows.is_empty() && tier != LootTier::Common {
        rows = table
            .iter()
            .filter(|e| e.tier == LootTier::Common)
            .collect();
    }
    if rows.is_empty() {
        warn!(%tier, "no loot rows for tier or common fallback");
        return None;
    }
    let picked = pick_weighted(&rows, |e| e.weight, rng)?;
    Some(LootItem {
        item_name: picked.item_name.clone(),
        tier: picked.tier,
        amount: 1,
        is_pokemon: is_pokemon_loot(&picked.item_name),
    })
}

/// Rolls a tier for this clear count and draws an item from it.
pub fn roll_chest(
    table: &[LootEntry],
    clears: u64,
    debuffed: bool,
    rng: &mut impl Rng,
) -> Option<LootItem> {
    let tier = select_tier(&tier_weights(clears, debuffed), rng);
    select_item(table, tier, rng)
}

/// Loot is nerfed once the player is more than two regions past the dungeon.
pub fn is_debuffed(dungeon_region: u32, player_region: u32) -> bool {
    player_region > dungeon_region + LOOT_DEBUFF_REGION_GAP
}

/// Name heuristic: anything that doesn't look like an item is a Pokémon.
pub fn is_pokemon_loot(item_name: &str) -> bool {
    let name = item_name.to_lowercase();
    !NON_POKEMON_KEYWORDS.iter().any(|k| name.contains(k))
}
