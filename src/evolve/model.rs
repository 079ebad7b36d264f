//! Regression model scoring how learnable a strategy's telemetry is.
//!
//! Fitness evaluation trains a small feed-forward network to predict the
//! scenario label from the telemetry a strategy produced. The [`Regressor`]
//! and [`RegressorFactory`] traits keep the evaluator independent of the
//! concrete model; [`MlpRegressor`] is the stock implementation, a
//! three-layer sigmoid perceptron trained by incremental backpropagation.

use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::dataset::Dataset;

/// Model failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("input width mismatch: model expects {expected}, got {got}")]
    FeatureWidthMismatch { expected: usize, got: usize },
    #[error("cannot train on an empty dataset")]
    EmptyDataset,
}

/// A trainable regression model with a fixed input width.
pub trait Regressor {
    /// Fit the model to `data`, stopping early once the mean squared error
    /// over an epoch drops below `target_error`.
    fn train(&mut self, data: &Dataset, max_epochs: u32, target_error: f32)
    -> Result<(), ModelError>;

    /// Predict the label for one feature vector.
    fn predict(&self, features: &[f32]) -> Result<f32, ModelError>;
}

/// Builds a fresh model per fitness evaluation, sized to the strategy's
/// telemetry width.
pub trait RegressorFactory {
    type Model: Regressor;

    fn build(&self, inputs: usize) -> Self::Model;
}

/// Three-layer sigmoid perceptron: `inputs` wide input layer, hidden layer
/// of `inputs + hidden_extra` neurons, one output neuron. Each layer carries
/// a bias weight in the trailing column.
pub struct MlpRegressor {
    inputs: usize,
    hidden: usize,
    learning_rate: f32,
    /// hidden x (inputs + 1), row-major
    w1: Vec<f32>,
    /// hidden + 1
    w2: Vec<f32>,
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl MlpRegressor {
    fn new(inputs: usize, hidden: usize, learning_rate: f32, rng: &mut StdRng) -> Self {
        let mut weight = |n: usize| (0..n).map(|_| rng.r#gen::<f32>() - 0.5).collect::<Vec<_>>();
        Self {
            inputs,
            hidden,
            learning_rate,
            w1: weight(hidden * (inputs + 1)),
            w2: weight(hidden + 1),
        }
    }

    /// Forward pass returning the hidden activations and the output.
    fn forward(&self, features: &[f32]) -> (Vec<f32>, f32) {
        let mut hidden = Vec::with_capacity(self.hidden);
        for h in 0..self.hidden {
            let row = &self.w1[h * (self.inputs + 1)..(h + 1) * (self.inputs + 1)];
            let mut sum = row[self.inputs];
            for (w, x) in row[..self.inputs].iter().zip(features) {
                sum += w * x;
            }
            hidden.push(sigmoid(sum));
        }

        let mut sum = self.w2[self.hidden];
        for (w, a) in self.w2[..self.hidden].iter().zip(&hidden) {
            sum += w * a;
        }
        (hidden, sigmoid(sum))
    }

    /// One incremental backpropagation step; returns the squared error.
    fn step(&mut self, features: &[f32], label: f32) -> f32 {
        let (hidden, output) = self.forward(features);

        let err = label - output;
        let delta_out = err * output * (1.0 - output);

        for h in 0..self.hidden {
            let delta_h = delta_out * self.w2[h] * hidden[h] * (1.0 - hidden[h]);
            let row = &mut self.w1[h * (self.inputs + 1)..(h + 1) * (self.inputs + 1)];
            for (w, x) in row[..self.inputs].iter_mut().zip(features) {
                *w += self.learning_rate * delta_h * x;
            }
            row[self.inputs] += self.learning_rate * delta_h;
        }

        for (w, a) in self.w2[..self.hidden].iter_mut().zip(&hidden) {
            *w += self.learning_rate * delta_out * a;
        }
        self.w2[self.hidden] += self.learning_rate * delta_out;

        err * err
    }
}

impl Regressor for MlpRegressor {
    fn train(
        &mut self,
        data: &Dataset,
        max_epochs: u32,
        target_error: f32,
    ) -> Result<(), ModelError> {
        if data.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if data.input_width() != self.inputs {
            return Err(ModelError::FeatureWidthMismatch {
                expected: self.inputs,
                got: data.input_width(),
            });
        }

        for _ in 0..max_epochs {
            let mut sum_sq = 0.0;
            for sample in data.samples() {
                sum_sq += self.step(&sample.features, sample.label);
            }
            if sum_sq / data.len() as f32 <= target_error {
                break;
            }
        }
        Ok(())
    }

    fn predict(&self, features: &[f32]) -> Result<f32, ModelError> {
        if features.len() != self.inputs {
            return Err(ModelError::FeatureWidthMismatch {
                expected: self.inputs,
                got: features.len(),
            });
        }
        Ok(self.forward(features).1)
    }
}

/// Factory for [`MlpRegressor`] models with a deterministic weight seed.
#[derive(Debug, Clone)]
pub struct MlpFactory {
    pub hidden_extra: usize,
    pub learning_rate: f32,
    pub seed: u64,
}

impl MlpFactory {
    pub fn new(hidden_extra: usize, seed: u64) -> Self {
        Self {
            hidden_extra,
            learning_rate: 0.7,
            seed,
        }
    }
}

impl RegressorFactory for MlpFactory {
    type Model = MlpRegressor;

    fn build(&self, inputs: usize) -> MlpRegressor {
        let mut rng = StdRng::seed_from_u64(self.seed);
        MlpRegressor::new(inputs, inputs + self.hidden_extra, self.learning_rate, &mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolve::dataset::TrainingSample;

    fn constant_dataset(width: usize, label: f32, count: usize) -> Dataset {
        let mut data = Dataset::new(width);
        for i in 0..count {
            let features = (0..width).map(|j| ((i + j) % 3) as f32 * 0.1).collect();
            data.push(TrainingSample { features, label }).unwrap();
        }
        data
    }

    #[test]
    fn test_learns_a_constant_label() {
        let data = constant_dataset(3, 0.2, 8);
        let mut model = MlpFactory::new(5, 42).build(3);
        model.train(&data, 500, 0.0001).unwrap();
        let out = model.predict(&[0.0, 0.1, 0.2]).unwrap();
        assert!((out - 0.2).abs() < 0.05, "prediction {out} too far from 0.2");
    }

    #[test]
    fn test_separates_two_labels() {
        let mut data = Dataset::new(2);
        for _ in 0..10 {
            data.push(TrainingSample {
                features: vec![0.1, 0.1],
                label: 0.1,
            })
            .unwrap();
            data.push(TrainingSample {
                features: vec![0.9, 0.9],
                label: 0.9,
            })
            .unwrap();
        }
        let mut model = MlpFactory::new(5, 7).build(2);
        model.train(&data, 1000, 0.0001).unwrap();
        let low = model.predict(&[0.1, 0.1]).unwrap();
        let high = model.predict(&[0.9, 0.9]).unwrap();
        assert!(high - low > 0.4, "low {low}, high {high}");
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let data = constant_dataset(3, 0.5, 4);
        let mut model = MlpFactory::new(5, 1).build(4);
        assert!(matches!(
            model.train(&data, 10, 0.001),
            Err(ModelError::FeatureWidthMismatch {
                expected: 4,
                got: 3
            })
        ));
        assert!(matches!(
            model.predict(&[0.0; 3]),
            Err(ModelError::FeatureWidthMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let data = Dataset::new(2);
        let mut model = MlpFactory::new(5, 1).build(2);
        assert!(matches!(
            model.train(&data, 10, 0.001),
            Err(ModelError::EmptyDataset)
        ));
    }

    #[test]
    fn test_factory_is_deterministic() {
        let factory = MlpFactory::new(5, 42);
        let a = factory.build(3);
        let b = factory.build(3);
        assert_eq!(a.predict(&[0.1, 0.2, 0.3]).unwrap(), b.predict(&[0.1, 0.2, 0.3]).unwrap());
    }
}
