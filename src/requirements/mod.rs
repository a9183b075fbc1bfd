//! Unlock requirements: an AND/OR tree over player progress counters.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;
