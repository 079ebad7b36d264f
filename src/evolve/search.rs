//! Microbial tournament driving the evolutionary search.
//!
//! Exactly two strategies are alive at any time. Each generation scores
//! whichever of the two lacks a fitness (the previous winner keeps its
//! score), compares them, and rewrites the loser in place with a mutated
//! or crossbred variant that the run has never admitted before. Fitness is
//! a prediction error, so the lower score wins; a tie goes to the second
//! strategy.

use log::{error, info, warn};

use crate::schema::{Genome, RunConfig};

use super::EvolveError;
use super::fitness::FitnessEvaluator;
use super::genome::{StrategyRng, mutate_or_breed, random_genome};
use super::model::RegressorFactory;
use super::registry::{InsertOutcome, PopulationRegistry};

/// Per-generation progress snapshot handed to the run callback.
#[derive(Debug, Clone, Copy)]
pub struct TournamentProgress {
    /// Zero-based generation index.
    pub generation: usize,
    pub total_generations: usize,
    pub first_fitness: f32,
    pub second_fitness: f32,
    /// Whether the first strategy won this comparison.
    pub winner_is_first: bool,
}

/// Why the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured generation budget ran out.
    MaxGenerations,
    /// No further distinct strategy could be admitted.
    PopulationExhausted,
}

/// Outcome of one tournament run.
#[derive(Debug, Clone)]
pub struct TournamentResult {
    /// The last comparison's winner.
    pub best: Option<Genome>,
    /// The winner's fitness (prediction error, lower is better).
    pub best_fitness: Option<f32>,
    /// Comparisons completed.
    pub generations: usize,
    pub stop_reason: StopReason,
}

/// The tournament driver, owning the random stream, the population
/// registry, and the fitness evaluator.
pub struct TournamentEngine<F: RegressorFactory> {
    config: RunConfig,
    seed: u64,
    rng: StrategyRng,
    registry: PopulationRegistry,
    evaluator: FitnessEvaluator<F>,
}

impl<F: RegressorFactory> TournamentEngine<F> {
    /// Validate `config` and set up a run. The seed comes from the config
    /// when present and from entropy otherwise.
    pub fn new(config: RunConfig, factory: F) -> Result<Self, EvolveError> {
        config.validate()?;
        let seed = config.tournament.random_seed.unwrap_or_else(rand::random);
        let registry = PopulationRegistry::new(config.tournament.population_capacity);
        let evaluator =
            FitnessEvaluator::new(config.sensor.clone(), config.training.clone(), factory);
        Ok(Self {
            config,
            seed,
            rng: StrategyRng::new(seed),
            registry,
            evaluator,
        })
    }

    /// The seed this run is reproducible from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Distinct strategies admitted so far.
    pub fn population_size(&self) -> usize {
        self.registry.len()
    }

    /// Run the tournament to completion.
    pub fn run(&mut self) -> Result<TournamentResult, EvolveError> {
        self.run_with_callback(|_| {})
    }

    /// Run the tournament, invoking `callback` after each generation's
    /// evaluations.
    pub fn run_with_callback<C>(&mut self, mut callback: C) -> Result<TournamentResult, EvolveError>
    where
        C: FnMut(&TournamentProgress),
    {
        let total = self.config.tournament.generations;
        let capacity = self.config.strategy.code_capacity();
        let starting = self.config.strategy.starting_length;
        let retry_limit = self.config.tournament.dedup_retry_limit;

        let mut first = random_genome(&mut self.rng, starting);
        let mut second = random_genome(&mut self.rng, starting);
        for genome in [&first, &second] {
            if self.registry.insert(genome) == InsertOutcome::CapacityExceeded {
                return Err(EvolveError::PopulationExhausted(self.registry.capacity()));
            }
        }
        info!("tournament started, seed {}, {} generations", self.seed, total);

        let mut first_fitness = 0.0;
        let mut second_fitness = 0.0;
        // None before the first comparison, then the index of the winner
        let mut winner: Option<bool> = None;
        let mut generations = 0;
        let mut stop_reason = StopReason::MaxGenerations;

        for generation in 0..total {
            if winner != Some(true) {
                first_fitness = self
                    .evaluator
                    .evaluate(&first, self.rng.inner())
                    .inspect_err(|err| {
                        error!("generation {generation}: evaluating strategy 1 failed: {err}");
                    })?;
            }
            if winner != Some(false) {
                second_fitness = self
                    .evaluator
                    .evaluate(&second, self.rng.inner())
                    .inspect_err(|err| {
                        error!("generation {generation}: evaluating strategy 2 failed: {err}");
                    })?;
            }

            let winner_is_first = first_fitness < second_fitness;
            winner = Some(winner_is_first);
            generations = generation + 1;
            callback(&TournamentProgress {
                generation,
                total_generations: total,
                first_fitness,
                second_fitness,
                winner_is_first,
            });

            let breed = if winner_is_first {
                mutate_or_breed(
                    &mut self.rng,
                    &first,
                    &mut second,
                    &mut self.registry,
                    capacity,
                    retry_limit,
                )
            } else {
                mutate_or_breed(
                    &mut self.rng,
                    &second,
                    &mut first,
                    &mut self.registry,
                    capacity,
                    retry_limit,
                )
            };
            match breed {
                Ok(()) => {}
                Err(
                    err @ (EvolveError::PopulationExhausted(_)
                    | EvolveError::DedupRetriesExhausted(_)),
                ) => {
                    warn!("generation {generation}: {err}");
                    stop_reason = StopReason::PopulationExhausted;
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        let (best, best_fitness) = match winner {
            Some(true) => (Some(first), Some(first_fitness)),
            Some(false) => (Some(second), Some(second_fitness)),
            None => (None, None),
        };
        info!(
            "tournament finished after {} generations, {} strategies admitted",
            generations,
            self.registry.len()
        );
        Ok(TournamentResult {
            best,
            best_fitness,
            generations,
            stop_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolve::model::MlpFactory;
    use crate::schema::{TournamentConfig, TrainingConfig};

    fn tiny_config(generations: usize, population_capacity: usize) -> RunConfig {
        RunConfig {
            training: TrainingConfig {
                max_epochs: 20,
                training_sessions: 3,
                testing_sessions: 5,
                ..Default::default()
            },
            tournament: TournamentConfig {
                generations,
                population_capacity,
                random_seed: Some(42),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_run_exhausts_generation_budget() {
        let mut engine = TournamentEngine::new(tiny_config(3, 100), MlpFactory::new(5, 1)).unwrap();
        let result = engine.run().unwrap();
        assert_eq!(result.stop_reason, StopReason::MaxGenerations);
        assert_eq!(result.generations, 3);
        let best = result.best.unwrap();
        assert!(best.gene_count() >= 1);
        let fitness = result.best_fitness.unwrap();
        assert!(fitness.is_finite() && fitness >= 0.0);
        // two seeds plus one admitted loser variant per completed breed
        assert_eq!(engine.population_size(), 5);
    }

    #[test]
    fn test_run_stops_when_population_is_exhausted() {
        let mut engine = TournamentEngine::new(tiny_config(10, 2), MlpFactory::new(5, 1)).unwrap();
        let result = engine.run().unwrap();
        assert_eq!(result.stop_reason, StopReason::PopulationExhausted);
        assert_eq!(result.generations, 1);
        assert!(result.best.is_some());
    }

    #[test]
    fn test_runs_are_reproducible_from_the_seed() {
        let run = || {
            let mut engine =
                TournamentEngine::new(tiny_config(2, 100), MlpFactory::new(5, 1)).unwrap();
            engine.run().unwrap()
        };
        let a = run();
        let b = run();
        assert_eq!(a.best, b.best);
        assert_eq!(a.best_fitness, b.best_fitness);
    }

    #[test]
    fn test_progress_callback_sees_every_generation() {
        let mut engine = TournamentEngine::new(tiny_config(3, 100), MlpFactory::new(5, 1)).unwrap();
        let mut seen = Vec::new();
        let result = engine
            .run_with_callback(|progress| {
                seen.push((progress.generation, progress.winner_is_first));
            })
            .unwrap();
        assert_eq!(seen.len(), result.generations);
        assert_eq!(seen[0].0, 0);
        for (progress, _) in &seen {
            assert!(*progress < 3);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = tiny_config(0, 100);
        config.tournament.generations = 0;
        assert!(TournamentEngine::new(config, MlpFactory::new(5, 1)).is_err());
    }
}
