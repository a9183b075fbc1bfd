//! Eggs, Pokérus contagion and the hatchery.

pub mod hatchery;
pub mod logic;
pub mod types;

pub use hatchery::*;
pub use logic::*;
pub use types::*;
