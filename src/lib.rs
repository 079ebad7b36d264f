//! Railscout - Evolutionary search for sensor-steering strategies.
//!
//! A directional distance sensor rides a one-dimensional rail below two
//! randomly placed objects. A strategy is a short symbolic program of
//! move/rotate/skip actions, each guarded by a line-of-sight condition.
//! A microbial genetic algorithm evolves strategies; a strategy's fitness
//! is the prediction error of a small regression network trained on the
//! telemetry the strategy gathers, so selection favours strategies whose
//! readings reveal the nearest object's size.
//!
//! # Architecture
//!
//! The crate is split into three modules:
//!
//! - `schema`: Configuration and strategy (genome) data types
//! - `sim`: Scenario generation and strategy execution
//! - `evolve`: Genetic operators, fitness evaluation, tournament driver
//!
//! # Example
//!
//! ```rust,no_run
//! use railscout::{
//!     evolve::{MlpFactory, TournamentEngine},
//!     schema::RunConfig,
//! };
//!
//! let config = RunConfig::default();
//! let factory = MlpFactory::new(config.training.hidden_extra, 42);
//!
//! let mut engine = TournamentEngine::new(config, factory).unwrap();
//! let result = engine.run().unwrap();
//!
//! if let Some(best) = result.best {
//!     println!("Best strategy: {best}");
//! }
//! ```

pub mod evolve;
pub mod schema;
pub mod sim;

// Re-export commonly used types
pub use evolve::{EvolveError, MlpFactory, TournamentEngine, TournamentResult};
pub use schema::{Genome, RunConfig};
pub use sim::{Scenario, Telemetry, generate_scenario, run_strategy};
