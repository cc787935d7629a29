//! Trivial multi-epoch runners over a [`Dataset`].
//!
//! These are plain loops for demos and the CLI; there is no scheduling,
//! batching or early stopping.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::metrics::{accuracy, count_mistakes};
use crate::{Adaline, Dataset, LogisticNeuron, Perceptron, PerceptronInit, Result};

/// Per-epoch history of a perceptron run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerceptronReport {
    /// Mistakes made during each (shuffled) epoch.
    pub mistakes: Vec<usize>,
    /// Training-set accuracy measured after each epoch.
    pub accuracy: Vec<f64>,
}

/// Train a zero-initialized perceptron for `epochs` shuffled epochs.
pub fn run_perceptron(data: &Dataset, epochs: usize, lr: f64, seed: Option<u64>) -> Result<PerceptronReport> {
    let mut p = Perceptron::new(data.dim(), lr, seed, PerceptronInit::Zeros)?;
    let mut report = PerceptronReport::default();

    for _ in 0..epochs {
        let results = p.train_epoch(data.samples(), Some(lr), true)?;
        report.mistakes.push(count_mistakes(&results));
        report
            .accuracy
            .push(accuracy(data.samples(), |x| p.predict_label(x))?);
    }
    Ok(report)
}

/// Per-epoch mean MSE of a fresh [`Adaline`] trained on `data`.
pub fn train_adaline(data: &Dataset, epochs: usize, lr: f64) -> Result<Vec<f64>> {
    Adaline::new(data.dim(), lr)?.train(data.samples(), epochs)
}

/// Per-epoch mean BCE of a fresh [`LogisticNeuron`] trained on `data`.
pub fn train_logistic(data: &Dataset, epochs: usize, lr: f64) -> Result<Vec<f64>> {
    LogisticNeuron::new(data.dim(), lr)?.train(data.samples(), epochs)
}
