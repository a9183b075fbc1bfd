pub mod config;
pub mod constants;
pub mod error;
pub mod weighted;

pub use config::{EngineConfig, MoneyDeviation};
pub use error::{ErrorSeverity, GameError, GameResult};
