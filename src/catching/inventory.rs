//! Per-player ball stock and the ball shop.

use super::ball::Pokeball;
use crate::core::constants::{
    GREATBALL_PRICE, MASTERBALL_QUEST_POINT_PRICE, POKEBALL_PRICE, STARTER_POKEBALL_COUNT,
    ULTRABALL_PRICE,
};
use crate::core::{GameError, GameResult};
use crate::store::{Currency, PlayerStore};
use serde::{Deserialize, Serialize};

/// Counters for one ball tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BallStock {
    pub quantity: u32,
    pub used: u64,
    pub purchased: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallInventory {
    stock: [BallStock; 4],
}

fn slot(ball: Pokeball) -> Option<usize> {
    match ball {
        Pokeball::None => None,
        Pokeball::Poke => Some(0),
        Pokeball::Great => Some(1),
        Pokeball::Ultra => Some(2),
        Pokeball::Master => Some(3),
    }
}

impl BallInventory {
    pub fn empty() -> Self {
        Self {
            stock: [BallStock::default(); 4],
        }
    }

    /// Inventory a new player starts with.
    pub fn starter() -> Self {
        let mut inv = Self::empty();
        inv.stock[0].quantity = STARTER_POKEBALL_COUNT;
        inv
    }

    pub fn stock(&self, ball: Pokeball) -> BallStock {
        slot(ball).map(|i| self.stock[i]).unwrap_or_default()
    }

    pub fn quantity(&self, ball: Pokeball) -> u32 {
        self.stock(ball).quantity
    }

    /// Takes one ball. Returns false (and changes nothing) when none are left.
    pub fn use_ball(&mut self, ball: Pokeball) -> bool {
        let Some(i) = slot(ball) else {
            return false;
        };
        let stock = &mut self.stock[i];
        if stock.quantity == 0 {
            return false;
        }
        stock.quantity -= 1;
        stock.used += 1;
        true
    }

    /// Takes every ball in `usage` or none of them.
    pub fn use_balls(&mut self, usage: &BallUsage) -> GameResult<()> {
        for (ball, count) in usage.iter() {
            let available = self.quantity(ball);
            if available < count {
                return Err(GameError::InsufficientResource {
                    resource: ball.name(),
                    needed: count as u64,
                    available: available as u64,
                });
            }
        }
        for (ball, count) in usage.iter() {
            if let Some(i) = slot(ball) {
                self.stock[i].quantity -= count;
                self.stock[i].used += count as u64;
            }
        }
        Ok(())
    }

    /// Adds balls. Returns the new quantity.
    pub fn gain(&mut self, ball: Pokeball, amount: u32, purchased: bool) -> u32 {
        let Some(i) = slot(ball) else {
            return 0;
        };
        let stock = &mut self.stock[i];
        stock.quantity = stock.quantity.saturating_add(amount);
        if purchased {
            stock.purchased += amount as u64;
        }
        stock.quantity
    }
}

/// Balls thrown during a batch, applied in one step at commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BallUsage {
    counts: [u32; 4],
}

impl BallUsage {
    pub fn add(&mut self, ball: Pokeball) {
        if let Some(i) = slot(ball) {
            self.counts[i] += 1;
        }
    }

    pub fn get(&self, ball: Pokeball) -> u32 {
        slot(ball).map(|i| self.counts[i]).unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Non-zero (ball, count) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Pokeball, u32)> + '_ {
        Pokeball::THROWABLE
            .into_iter()
            .map(|b| (b, self.get(b)))
            .filter(|&(_, c)| c > 0)
    }
}

/// Price and currency of a ball in the shop.
pub fn ball_price(ball: Pokeball) -> Option<(u64, Currency)> {
    match ball {
        Pokeball::None => None,
        Pokeball::Poke => Some((POKEBALL_PRICE, Currency::PokeDollar)),
        Pokeball::Great => Some((GREATBALL_PRICE, Currency::PokeDollar)),
        Pokeball::Ultra => Some((ULTRABALL_PRICE, Currency::PokeDollar)),
        Pokeball::Master => Some((MASTERBALL_QUEST_POINT_PRICE, Currency::QuestPoint)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseResult {
    pub ball: Pokeball,
    pub quantity: u32,
    pub total_cost: u64,
    pub currency: Currency,
    pub new_balance: u64,
    pub new_quantity: u32,
}

/// Buys `amount` balls, paying atomically from the wallet.
pub fn buy_balls(
    store: &mut impl PlayerStore,
    player_id: u64,
    ball: Pokeball,
    amount: u32,
) -> GameResult<PurchaseResult> {
    let (price, currency) = ball_price(ball)
        .ok_or_else(|| GameError::Validation(format!("{} cannot be bought", ball.name())))?;
    if amount == 0 {
        return Err(GameError::Validation(
            "purchase amount must be greater than 0".to_string(),
        ));
    }

    let total_cost = price * amount as u64;
    if !store.try_spend(player_id, currency, total_cost) {
        return Err(GameError::InsufficientResource {
            resource: currency.name(),
            needed: total_cost,
            available: store.wallet(player_id).balance(currency),
        });
    }
    let new_quantity = store.gain_balls(player_id, ball, amount, true);
    let new_balance = store.wallet(player_id).balance(currency);
    tracing::info!(player_id, ?ball, amount, total_cost, "balls purchased");

    Ok(PurchaseResult {
        ball,
        quantity: amount,
        total_cost,
        currency,
        new_balance,
        new_quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_starter_inventory() {
        let inv = BallInventory::starter();
        assert_eq!(inv.quantity(Pokeball::Poke), STARTER_POKEBALL_COUNT);
        assert_eq!(inv.quantity(Pokeball::Ultra), 0);
        assert_eq!(inv.quantity(Pokeball::None), 0);
    }

    #[test]
    fn test_use_ball_tracks_used() {
        let mut inv = BallInventory::empty();
        inv.gain(Pokeball::Great, 1, false);
        assert!(inv.use_ball(Pokeball::Great));
        assert!(!inv.use_ball(Pokeball::Great));
        let stock = inv.stock(Pokeball::Great);
        assert_eq!(stock.quantity, 0);
        assert_eq!(stock.used, 1);
        assert!(!inv.use_ball(Pokeball::None));
    }

    #[test]
    fn test_gain_purchased_counter() {
        let mut inv = BallInventory::empty();
        inv.gain(Pokeball::Ultra, 3, true);
        inv.gain(Pokeball::Ultra, 2, false);
        let stock = inv.stock(Pokeball::Ultra);
        assert_eq!(stock.quantity, 5);
        assert_eq!(stock.purchased, 3);
    }

    #[test]
    fn test_use_balls_is_all_or_nothing() {
        let mut inv = BallInventory::empty();
        inv.gain(Pokeball::Poke, 2, false);
        inv.gain(Pokeball::Great, 1, false);

        let mut usage = BallUsage::default();
        usage.add(Pokeball::Poke);
        usage.add(Pokeball::Great);
        usage.add(Pokeball::Great);
        assert!(inv.use_balls(&usage).is_err());
        assert_eq!(inv.quantity(Pokeball::Poke), 2);

        let mut usage = BallUsage::default();
        usage.add(Pokeball::Poke);
        usage.add(Pokeball::Poke);
        inv.use_balls(&usage).unwrap();
        assert_eq!(inv.quantity(Pokeball::Poke), 0);
        assert_eq!(inv.stock(Pokeball::Poke).used, 2);
    }

    #[test]
    fn test_usage_iter_skips_zero() {
        let mut usage = BallUsage::default();
        usage.add(Pokeball::Ultra);
        usage.add(Pokeball::None);
        let pairs: Vec<_> = usage.iter().collect();
        assert_eq!(pairs, vec![(Pokeball::Ultra, 1)]);
        assert_eq!(usage.total(), 1);
    }

    #[test]
    fn test_buy_balls_spends_currency() {
        let mut store = MemoryStore::default();
        store.add_currency(1, Currency::PokeDollar, 1_000);
        let result = buy_balls(&mut store, 1, Pokeball::Great, 2).unwrap();
        assert_eq!(result.total_cost, 1_000);
        assert_eq!(result.new_balance, 0);
        assert_eq!(result.new_quantity, 2);
        assert_eq!(store.ball_inventory(1).stock(Pokeball::Great).purchased, 2);
    }

    #[test]
    fn test_buy_master_ball_uses_quest_points() {
        let mut store = MemoryStore::default();
        store.add_currency(1, Currency::PokeDollar, 1_000_000);
        let err = buy_balls(&mut store, 1, Pokeball::Master, 1).unwrap_err();
        assert!(matches!(err, GameError::InsufficientResource { needed: 2500, .. }));

        store.add_currency(1, Currency::QuestPoint, 2_500);
        let result = buy_balls(&mut store, 1, Pokeball::Master, 1).unwrap();
        assert_eq!(result.currency, Currency::QuestPoint);
        assert_eq!(store.wallet(1).balance(Currency::PokeDollar), 1_000_000);
    }

    #[test]
    fn test_buy_rejects_bad_requests() {
        let mut store = MemoryStore::default();
        assert!(matches!(
            buy_balls(&mut store, 1, Pokeball::Poke, 0),
            Err(GameError::Validation(_))
        ));
        assert!(matches!(
            buy_balls(&mut store, 1, Pokeball::None, 1),
            Err(GameError::Validation(_))
        ));
    }

    #[test]
    fn test_buy_insufficient_changes_nothing() {
        let mut store = MemoryStore::default();
        store.add_currency(1, Currency::PokeDollar, 99);
        assert!(buy_balls(&mut store, 1, Pokeball::Poke, 1).is_err());
        assert_eq!(store.wallet(1).balance(Currency::PokeDollar), 99);
        assert_eq!(
            store.ball_inventory(1).quantity(Pokeball::Poke),
            STARTER_POKEBALL_COUNT
        );
    }
}
