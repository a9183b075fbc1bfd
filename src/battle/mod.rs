//! Battle math, timed battles, gyms, and dungeon trainers.

pub mod gym;
pub mod logic;
pub mod timed;
pub mod trainer;
pub mod types;

pub use gym::*;
pub use logic::*;
pub use timed::*;
pub use trainer::*;
pub use types::*;
