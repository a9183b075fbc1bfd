//! Creature species, owned records, type matchups and experience.

pub mod exp;
pub mod type_chart;
pub mod types;

pub use exp::*;
pub use type_chart::*;
pub use types::*;
