//! Dungeon maps, generation, exploration and runs.

pub mod data;
pub mod generation;
pub mod logic;
pub mod run;
pub mod types;

pub use data::*;
pub use generation::*;
pub use logic::*;
pub use run::*;
pub use types::*;
