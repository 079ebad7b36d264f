//! Fitness evaluation: how well a strategy's telemetry predicts the label.
//!
//! One evaluation trains a fresh regression model on the telemetry the
//! strategy produces over a batch of random scenarios, then scores the
//! model's prediction error on a held-out batch. Lower is fitter: a
//! strategy is good exactly when its sensor readings carry enough signal
//! for the model to recover the nearest object's half-width.

use rand::Rng;
use rayon::prelude::*;

use crate::schema::{Genome, SensorConfig, TrainingConfig};
use crate::sim::{Scenario, Telemetry, generate_scenario, run_strategy};

use super::EvolveError;
use super::dataset::{Dataset, TrainingSample};
use super::model::{Regressor, RegressorFactory};

/// Scores genomes against a regression model supplied by `F`.
pub struct FitnessEvaluator<F> {
    sensor: SensorConfig,
    training: TrainingConfig,
    factory: F,
}

/// Flatten per-gene telemetry into the model's feature vector: position,
/// angle, and detection status per executed gene.
fn flatten(telemetry: &Telemetry) -> Vec<f32> {
    telemetry
        .iter()
        .flat_map(|snap| [snap.position, snap.angle, snap.status])
        .collect()
}

impl<F: RegressorFactory> FitnessEvaluator<F> {
    pub fn new(sensor: SensorConfig, training: TrainingConfig, factory: F) -> Self {
        Self {
            sensor,
            training,
            factory,
        }
    }

    /// Feature width for a genome: three telemetry values per gene.
    pub fn input_width(&self, genome: &Genome) -> usize {
        genome.gene_count() * 3
    }

    /// Draw `count` scenarios from the random stream, then simulate the
    /// genome against each in parallel. Scenario generation stays
    /// sequential so the stream of draws is reproducible; the collected
    /// results keep scenario order.
    fn simulate_batch<R: Rng>(
        &self,
        genome: &Genome,
        rng: &mut R,
        count: usize,
    ) -> Result<Vec<(Vec<f32>, f32)>, EvolveError> {
        let scenarios: Vec<Scenario> = (0..count)
            .map(|_| generate_scenario(rng, &self.sensor))
            .collect();

        // borrow only the sensor config, keeping the factory out of the
        // parallel closure
        let sensor = &self.sensor;
        let results = scenarios
            .into_par_iter()
            .map(|mut scenario| {
                let telemetry = run_strategy(genome, &mut scenario, sensor)?;
                Ok((flatten(&telemetry), scenario.nearest_half_width))
            })
            .collect::<Result<Vec<_>, EvolveError>>()?;
        Ok(results)
    }

    /// Evaluate one genome: train on a fresh batch, score the mean absolute
    /// prediction error over a held-out batch.
    pub fn evaluate<R: Rng>(&self, genome: &Genome, rng: &mut R) -> Result<f32, EvolveError> {
        let width = self.input_width(genome);

        let mut data = Dataset::new(width);
        for (features, label) in self.simulate_batch(genome, rng, self.training.training_sessions)? {
            data.push(TrainingSample { features, label })?;
        }

        let mut model = self.factory.build(width);
        model.train(&data, self.training.max_epochs, self.training.desired_error)?;

        let held_out = self.simulate_batch(genome, rng, self.training.testing_sessions)?;
        let mut total_error = 0.0;
        for (features, label) in &held_out {
            let prediction = model.predict(features)?;
            total_error += (label - prediction).abs();
        }
        Ok(total_error / held_out.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::evolve::genome::{StrategyRng, random_genome};
    use crate::evolve::model::MlpFactory;
    use crate::schema::{Action, Condition, Gene};

    fn evaluator() -> FitnessEvaluator<MlpFactory> {
        FitnessEvaluator::new(
            SensorConfig::default(),
            TrainingConfig {
                max_epochs: 50,
                training_sessions: 5,
                testing_sessions: 10,
                ..Default::default()
            },
            MlpFactory::new(5, 42),
        )
    }

    #[test]
    fn test_feature_width_is_three_per_gene() {
        let genome = Genome::new(vec![
            Gene {
                action: Action::MoveRight,
                condition: Condition::Object,
            };
            4
        ]);
        assert_eq!(evaluator().input_width(&genome), 12);
    }

    #[test]
    fn test_fitness_is_finite_and_nonnegative() {
        let mut grng = StrategyRng::new(3);
        let genome = random_genome(&mut grng, 8);
        let mut rng = StdRng::seed_from_u64(17);
        let fitness = evaluator().evaluate(&genome, &mut rng).unwrap();
        assert!(fitness.is_finite());
        assert!(fitness >= 0.0);
        // predictions and labels both live inside the unit interval
        assert!(fitness <= 1.0);
    }

    #[test]
    fn test_factory_without_sync_is_supported() {
        use std::cell::Cell;

        use crate::evolve::model::MlpRegressor;

        // Cell makes the factory !Sync; evaluation must not require the
        // factory to cross threads.
        struct CountingFactory {
            builds: Cell<usize>,
            inner: MlpFactory,
        }

        impl RegressorFactory for CountingFactory {
            type Model = MlpRegressor;

            fn build(&self, inputs: usize) -> MlpRegressor {
                self.builds.set(self.builds.get() + 1);
                self.inner.build(inputs)
            }
        }

        let evaluator = FitnessEvaluator::new(
            SensorConfig::default(),
            TrainingConfig {
                max_epochs: 10,
                training_sessions: 3,
                testing_sessions: 5,
                ..Default::default()
            },
            CountingFactory {
                builds: Cell::new(0),
                inner: MlpFactory::new(5, 1),
            },
        );

        let mut grng = StrategyRng::new(9);
        let genome = random_genome(&mut grng, 4);
        let fitness = evaluator
            .evaluate(&genome, &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert!(fitness.is_finite());
        assert_eq!(evaluator.factory.builds.get(), 1);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let mut grng = StrategyRng::new(5);
        let genome = random_genome(&mut grng, 8);

        let a = evaluator()
            .evaluate(&genome, &mut StdRng::seed_from_u64(23))
            .unwrap();
        let b = evaluator()
            .evaluate(&genome, &mut StdRng::seed_from_u64(23))
            .unwrap();
        assert_eq!(a, b);
    }
}
