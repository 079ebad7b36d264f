//! Run configuration for the evolutionary search.
//!
//! All tunables are carried in one immutable [`RunConfig`] value threaded
//! from the tournament driver down through the fitness evaluator and the
//! simulator. Nothing is read from process-wide state.

use serde::{Deserialize, Serialize};

/// Physical constants of the simulated sensor and environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Step size for Move actions along the rail.
    #[serde(default = "default_lateral_step")]
    pub lateral_step: f32,
    /// Step size for Rotate actions, in radians.
    #[serde(default = "default_angular_step")]
    pub angular_step: f32,
    /// Jump size for Skip actions along the rail.
    #[serde(default = "default_skip_step")]
    pub skip_step: f32,
    /// Half-angle of the sensor's viewing cone, in radians.
    #[serde(default = "default_cone_half_angle")]
    pub cone_half_angle: f32,
    /// Depth (extent along the viewing axis) of every object.
    #[serde(default = "default_object_depth")]
    pub object_depth: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            lateral_step: default_lateral_step(),
            angular_step: default_angular_step(),
            skip_step: default_skip_step(),
            cone_half_angle: default_cone_half_angle(),
            object_depth: default_object_depth(),
        }
    }
}

fn default_lateral_step() -> f32 {
    0.1
}
fn default_angular_step() -> f32 {
    0.1
}
fn default_skip_step() -> f32 {
    0.1
}
fn default_cone_half_angle() -> f32 {
    0.1
}
fn default_object_depth() -> f32 {
    0.05
}

/// Strategy length bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Maximum strategy length in elementary codes.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Starting length in elementary codes for freshly generated strategies.
    #[serde(default = "default_starting_length")]
    pub starting_length: usize,
}

impl StrategyConfig {
    /// Elementary-code capacity with one trailing slot always reserved:
    /// an even `max_length` is raised to the next odd value, so the usable
    /// code length is at most `max_length - 1` either way.
    pub fn code_capacity(&self) -> usize {
        if self.max_length % 2 == 0 {
            self.max_length + 1
        } else {
            self.max_length
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            starting_length: default_starting_length(),
        }
    }
}

fn default_max_length() -> usize {
    20
}
fn default_starting_length() -> usize {
    8
}

/// Regression-model training and sampling budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Maximum training epochs per fitness evaluation.
    #[serde(default = "default_max_epochs")]
    pub max_epochs: u32,
    /// Mean squared error at which training stops early.
    #[serde(default = "default_desired_error")]
    pub desired_error: f32,
    /// Scenarios used to train the model per evaluation.
    #[serde(default = "default_training_sessions")]
    pub training_sessions: usize,
    /// Held-out scenarios used to score the model per evaluation.
    #[serde(default = "default_testing_sessions")]
    pub testing_sessions: usize,
    /// Hidden-layer width above the input width.
    #[serde(default = "default_hidden_extra")]
    pub hidden_extra: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_epochs: default_max_epochs(),
            desired_error: default_desired_error(),
            training_sessions: default_training_sessions(),
            testing_sessions: default_testing_sessions(),
            hidden_extra: default_hidden_extra(),
        }
    }
}

fn default_max_epochs() -> u32 {
    500
}
fn default_desired_error() -> f32 {
    0.001
}
fn default_training_sessions() -> usize {
    10
}
fn default_testing_sessions() -> usize {
    100
}
fn default_hidden_extra() -> usize {
    5
}

/// Microbial tournament settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Number of winner/loser comparisons to run.
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Maximum number of distinct strategies ever admitted to the run.
    #[serde(default = "default_population_capacity")]
    pub population_capacity: usize,
    /// Upper bound on operator applications while searching for an unseen
    /// variant of the loser.
    #[serde(default = "default_dedup_retry_limit")]
    pub dedup_retry_limit: usize,
    /// Random seed for reproducibility. Drawn from entropy when absent.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            generations: default_generations(),
            population_capacity: default_population_capacity(),
            dedup_retry_limit: default_dedup_retry_limit(),
            random_seed: None,
        }
    }
}

fn default_generations() -> usize {
    50
}
fn default_population_capacity() -> usize {
    1000
}
fn default_dedup_retry_limit() -> usize {
    1000
}

/// Top-level configuration for one evolutionary run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub tournament: TournamentConfig,
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("starting length {starting} exceeds maximum length {max}")]
    StartingLengthExceedsMax { starting: usize, max: usize },
    #[error("maximum strategy length {0} leaves no room for a gene")]
    MaxLengthTooSmall(usize),
    #[error("generation count must be positive")]
    ZeroGenerations,
    #[error("{0} session count must be positive")]
    ZeroSessions(&'static str),
    #[error("population capacity {0} cannot hold the two live strategies")]
    CapacityTooSmall(usize),
    #[error("sensor {0} must be positive")]
    NonPositiveStep(&'static str),
}

impl RunConfig {
    /// Validate the configuration before any work begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strategy.starting_length > self.strategy.max_length {
            return Err(ConfigError::StartingLengthExceedsMax {
                starting: self.strategy.starting_length,
                max: self.strategy.max_length,
            });
        }
        if self.strategy.code_capacity() < 3 {
            return Err(ConfigError::MaxLengthTooSmall(self.strategy.max_length));
        }
        if self.tournament.generations == 0 {
            return Err(ConfigError::ZeroGenerations);
        }
        if self.training.training_sessions == 0 {
            return Err(ConfigError::ZeroSessions("training"));
        }
        if self.training.testing_sessions == 0 {
            return Err(ConfigError::ZeroSessions("testing"));
        }
        if self.tournament.population_capacity < 2 {
            return Err(ConfigError::CapacityTooSmall(
                self.tournament.population_capacity,
            ));
        }
        if self.sensor.lateral_step <= 0.0 {
            return Err(ConfigError::NonPositiveStep("lateral step"));
        }
        if self.sensor.angular_step <= 0.0 {
            return Err(ConfigError::NonPositiveStep("angular step"));
        }
        if self.sensor.skip_step <= 0.0 {
            return Err(ConfigError::NonPositiveStep("skip step"));
        }
        Ok(())
    }
}
