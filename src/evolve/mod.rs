//! Evolve module - Microbial genetic search over sensor strategies.
//!
//! [`TournamentEngine`] drives the search: genetic operators live in
//! `genome`, the deduplicating population record in `registry`, and the
//! regression-based fitness function in `fitness` with its model in
//! `model`.

pub mod dataset;
pub mod fitness;
pub mod genome;
pub mod model;
pub mod registry;
pub mod search;

pub use dataset::{Dataset, TrainingSample};
pub use fitness::FitnessEvaluator;
pub use genome::{PROB_MUT, StrategyRng, crossbreed, mutate, mutate_or_breed, random_genome};
pub use model::{MlpFactory, MlpRegressor, ModelError, Regressor, RegressorFactory};
pub use registry::{InsertOutcome, PopulationRegistry};
pub use search::{
    StopReason, TournamentEngine, TournamentProgress, TournamentResult,
};

use crate::schema::ConfigError;
use crate::sim::SimError;

/// Errors surfaced by the evolutionary search.
#[derive(Debug, thiserror::Error)]
pub enum EvolveError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Simulation(#[from] SimError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("population capacity of {0} distinct strategies exhausted")]
    PopulationExhausted(usize),
    #[error("no unseen variant found within {0} operator applications")]
    DedupRetriesExhausted(usize),
}
