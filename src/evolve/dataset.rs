//! Training dataset: flattened telemetry paired with scenario labels.

use std::io::{self, Write};

use super::model::ModelError;

/// One training pair: a flattened telemetry vector and the scenario's
/// regression label.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    pub features: Vec<f32>,
    pub label: f32,
}

/// Width-checked collection of training samples.
#[derive(Debug, Clone)]
pub struct Dataset {
    input_width: usize,
    samples: Vec<TrainingSample>,
}

impl Dataset {
    pub fn new(input_width: usize) -> Self {
        Self {
            input_width,
            samples: Vec::new(),
        }
    }

    /// Feature width every sample must have.
    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }

    /// Append a sample, rejecting any with the wrong feature width.
    pub fn push(&mut self, sample: TrainingSample) -> Result<(), ModelError> {
        if sample.features.len() != self.input_width {
            return Err(ModelError::FeatureWidthMismatch {
                expected: self.input_width,
                got: sample.features.len(),
            });
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Write the dataset in the FANN text format: a `count inputs outputs`
    /// header, then one feature line and one label line per sample.
    pub fn write_fann<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{} {} 1", self.samples.len(), self.input_width)?;
        for sample in &self.samples {
            let mut first = true;
            for value in &sample.features {
                if !first {
                    write!(out, " ")?;
                }
                write!(out, "{value:.6}")?;
                first = false;
            }
            writeln!(out)?;
            writeln!(out, "{:.6}", sample.label)?;
        }
        Ok(())
    }
}
