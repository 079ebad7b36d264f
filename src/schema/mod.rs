//! Schema module - Configuration and strategy data types.

mod config;
mod strategy;

pub use config::*;
pub use strategy::*;
