//! Pokeidle - idle Pokémon game engine.
//!
//! Battles, catching, dungeon runs, breeding and route progression over a
//! pluggable `PlayerStore`.

pub mod battle;
pub mod breeding;
pub mod catching;
pub mod core;
pub mod dungeon;
pub mod loot;
pub mod pokemon;
pub mod requirements;
pub mod routes;
pub mod simulator;
pub mod store;
