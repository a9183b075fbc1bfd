//! Monte Carlo dungeon simulator.
//!
//! Runs batches of automated dungeon explorations through the same services
//! players use, to measure clear rates, loot tier distribution and rewards.

mod config;
mod report;
mod runner;

pub use config::SimConfig;
pub use report::SimReport;
pub use runner::run_simulation;
