//! Routes: data, unlock status and batched exploration.

pub mod service;
pub mod types;

pub use service::*;
pub use types::*;
