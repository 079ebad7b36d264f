//! Sim module - Scenario generation and strategy execution.
//!
//! A [`Scenario`] is one randomly placed pair of objects over the rail;
//! [`run_strategy`] executes a genome against it and yields per-gene
//! [`Telemetry`]. The line-of-sight geometry lives in `sight`.

mod runner;
mod scenario;
mod sight;

pub use runner::{Snapshot, SimError, Telemetry, run_strategy};
pub use scenario::{ObjectExtent, Scenario, SensorState, generate_scenario};
