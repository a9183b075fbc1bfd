//! Ball tiers, catch rate, inventory, and catch transactions.

pub mod ball;
pub mod inventory;
pub mod transaction;

pub use ball::*;
pub use inventory::*;
pub use transaction::*;
