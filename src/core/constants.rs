// Battle
pub const BOT_CLICK_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_MAX_BATTLE_TICKS: u64 = 100;
pub const TICKS_UNBEATABLE: u64 = 999_999;
/// One-second ticks a timed battle may run before it counts as lost.
pub const MAX_TIMED_BATTLE_TICKS: u32 = 3_600;

// Route enemy health: max(MIN, floor(BASE * ((route^2.2)/12)^1.15 * (1 + region/20)))
pub const ROUTE_HEALTH_BASE: f64 = 100.0;
pub const ROUTE_HEALTH_MIN: u64 = 20;

// Route money: floor(BASE*route + COEFFICIENT*route^1.15 + deviation), at least MIN_MONEY
pub const ROUTE_MONEY_BASE: f64 = 3.0;
pub const ROUTE_MONEY_COEFFICIENT: f64 = 5.0;
pub const MONEY_DEVIATION: i64 = 25;
pub const MONEY_DEVIATION_MEAN: i64 = 12;
pub const MIN_MONEY: u64 = 10;

// Route progression
pub const ROUTE_KILLS_NEEDED: u64 = 10;
pub const TRAINER_EXP_MULTIPLIER: f64 = 1.5;
pub const MAX_ROUTE_ENCOUNTERS: u32 = 20;

// Catching
pub const CATCH_RATE_EXPONENT: f64 = 0.75;
pub const STARTER_POKEBALL_COUNT: u32 = 25;

// Shiny odds (1 in N)
pub const SHINY_CHANCE_BATTLE: u32 = 8192;
pub const SHINY_CHANCE_DUNGEON: u32 = 4096;
pub const SHINY_CHANCE_BREEDING: u32 = 1024;

// Effort points
pub const EP_EV_RATIO: u64 = 1000;
pub const RESISTANT_EV_THRESHOLD: u64 = 50;
pub const BASE_EP_YIELD: u64 = 100;
pub const DUNGEON_EP_YIELD: u64 = 300;
pub const SHINY_EP_MODIFIER: u64 = 5;
pub const DUNGEON_EP_MODIFIER: u64 = 3;
pub const DUNGEON_BOSS_EP_MODIFIER: u64 = 10;

// Experience
pub const MAX_LEVEL: u32 = 100;
pub const EXP_CURVE_FACTOR: f64 = 1.2;
pub const ATTACK_PER_LEVEL: f64 = 0.02;

// Dungeons
pub const DEFAULT_DUNGEON_MAP_SIZE: usize = 5;
pub const MIN_DUNGEON_MAP_SIZE: usize = 5;
pub const DUNGEON_CHEST_HEALTH_DIVISOR: f64 = 5.0;
pub const TRAINER_TEAM_HEALTH_EXPONENT: f64 = 0.75;
pub const DUNGEON_FALLBACK_ENEMY_HEALTH: u64 = 1000;
pub const DUNGEON_FALLBACK_BOSS_HEALTH: u64 = 10_000;
pub const DUNGEON_FALLBACK_BOSS_LEVEL: u32 = 50;
pub const DUNGEON_FIRST_CLEAR_TOKEN_MULTIPLIER: u64 = 5;
pub const DUNGEON_FIRST_CLEAR_MONEY_MULTIPLIER: u64 = 2;
pub const DUNGEON_ROUTE_PER_REGION: u32 = 5;

// Timed battles
pub const GYM_TIME_LIMIT_SECONDS: f64 = 30.0;
pub const BOSS_TIME_LIMIT_SECONDS: f64 = 30.0;

// Loot redistribution: mass shifted out of common as clears approach the cap
pub const LOOT_REDISTRIBUTE_AMOUNT: f64 = 0.15;
pub const LOOT_REDISTRIBUTE_MAX_CLEARS: u64 = 500;
pub const LOOT_DEBUFF_REGION_GAP: u32 = 2;

// Breeding
pub const MAX_EGG_SLOTS: usize = 4;
pub const DEFAULT_EGG_SLOTS: usize = 1;
pub const EGG_CYCLE_MULTIPLIER: f64 = 40.0;
pub const DEFAULT_EGG_CYCLES: u32 = 20;
pub const CARBOS_STEP_THRESHOLD: f64 = 300.0;
pub const CARBOS_DIVISOR: f64 = 70.0;
pub const BREEDING_ATTACK_BONUS: u32 = 25;
pub const BREEDING_SHINY_ATTACK_MULTIPLIER: u32 = 2;
pub const BREEDING_EFFICIENCY: f64 = 100.0;

// Shop prices
pub const POKEBALL_PRICE: u64 = 100;
pub const GREATBALL_PRICE: u64 = 500;
pub const ULTRABALL_PRICE: u64 = 2000;
pub const MASTERBALL_QUEST_POINT_PRICE: u64 = 2500;
