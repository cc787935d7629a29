//! Rosenblatt perceptron with mistake-driven updates.
//!
//! Unlike the gradient-trained neurons in [`crate::neuron`], the perceptron
//! only moves its weights when a sample is misclassified. A sample sitting
//! exactly on the boundary (`y * score == 0`) counts as a mistake.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::activation::step_pm1;
use crate::layer::{INIT_RANGE, dot};
use crate::loss::ensure_pm1;
use crate::{Error, Result, Sample};

/// Default seed used when a model is built without one.
pub const DEFAULT_SEED: u64 = 0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Initial weights for a [`Perceptron`].
pub enum PerceptronInit {
    #[default]
    Zeros,
    /// Weights and bias drawn uniformly from `[-0.5, 0.5]`.
    Random,
}

/// Outcome of one [`Perceptron::train_step`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub score: f64,
    pub pred: i32,
    pub mistake: bool,
    pub delta_w: Vec<f64>,
    pub delta_b: f64,
}

#[derive(Debug, Clone)]
pub struct Perceptron {
    dim: usize,
    lr: f64,
    init: PerceptronInit,
    weights: Vec<f64>,
    bias: f64,
    rng: StdRng,
}

impl Perceptron {
    pub fn new(dim: usize, lr: f64, seed: Option<u64>, init: PerceptronInit) -> Result<Self> {
        if dim == 0 {
            return Err(Error::Config("dim must be > 0".to_owned()));
        }

        let mut rng = StdRng::seed_from_u64(seed.unwrap_or(DEFAULT_SEED));
        let (weights, bias) = init_params(dim, init, &mut rng);
        Ok(Self {
            dim,
            lr,
            init,
            weights,
            bias,
            rng,
        })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn lr(&self) -> f64 {
        self.lr
    }

    #[inline]
    pub fn set_lr(&mut self, lr: f64) {
        self.lr = lr;
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Re-initialize the parameters in place, continuing the instance's
    /// random stream.
    pub fn reset(&mut self) {
        let (weights, bias) = init_params(self.dim, self.init, &mut self.rng);
        self.weights = weights;
        self.bias = bias;
    }

    /// `w . x + b`.
    pub fn predict_score(&self, x: &[f64]) -> Result<f64> {
        if x.len() != self.dim {
            return Err(Error::dimension("x", self.dim, x.len()));
        }
        Ok(dot(&self.weights, x) + self.bias)
    }

    /// `+1` if the score is non-negative, `-1` otherwise.
    pub fn predict_label(&self, x: &[f64]) -> Result<i32> {
        self.predict_score(x).map(step_pm1)
    }

    /// One mistake-driven update.
    ///
    /// On a mistake the parameters move by `delta_w = lr * y * x` and
    /// `delta_b = lr * y`; otherwise the deltas are zero and nothing changes.
    /// `lr` overrides the instance learning rate for this step only.
    pub fn train_step(&mut self, x: &[f64], y: i32, lr: Option<f64>) -> Result<StepResult> {
        ensure_pm1(y)?;
        let score = self.predict_score(x)?;
        let pred = step_pm1(score);
        let y_f = y as f64;
        let mistake = y_f * score <= 0.0;

        let mut delta_w = vec![0.0; self.dim];
        let mut delta_b = 0.0;
        if mistake {
            let lr = lr.unwrap_or(self.lr);
            for ((w, d), &xi) in self.weights.iter_mut().zip(delta_w.iter_mut()).zip(x) {
                *d = lr * y_f * xi;
                *w += *d;
            }
            delta_b = lr * y_f;
            self.bias += delta_b;
        }

        Ok(StepResult {
            score,
            pred,
            mistake,
            delta_w,
            delta_b,
        })
    }

    /// Run `train_step` over `samples`, optionally shuffled with the
    /// instance's own generator.
    pub fn train_epoch(
        &mut self,
        samples: &[Sample],
        lr: Option<f64>,
        shuffle: bool,
    ) -> Result<Vec<StepResult>> {
        let mut order: Vec<&Sample> = samples.iter().collect();
        if shuffle {
            order.shuffle(&mut self.rng);
        }

        order
            .into_iter()
            .map(|s| self.train_step(&s.x, s.y, lr))
            .collect()
    }
}

fn init_params<R: Rng + ?Sized>(dim: usize, init: PerceptronInit, rng: &mut R) -> (Vec<f64>, f64) {
    match init {
        PerceptronInit::Zeros => (vec![0.0; dim], 0.0),
        PerceptronInit::Random => {
            let weights = (0..dim)
                .map(|_| rng.gen_range(-INIT_RANGE..=INIT_RANGE))
                .collect();
            let bias = rng.gen_range(-INIT_RANGE..=INIT_RANGE);
            (weights, bias)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dataset;

    fn zeros(dim: usize) -> Perceptron {
        Perceptron::new(dim, 1.0, Some(0), PerceptronInit::Zeros).unwrap()
    }

    #[test]
    fn first_step_on_zero_weights_is_a_mistake() {
        let mut p = zeros(2);
        let r = p.train_step(&[1.0, -1.0], -1, None).unwrap();

        assert_eq!(r.score, 0.0);
        assert_eq!(r.pred, 1);
        assert!(r.mistake);
        assert_eq!(r.delta_w, vec![-1.0, 1.0]);
        assert_eq!(r.delta_b, -1.0);
        assert_eq!(p.weights(), &[-1.0, 1.0]);
        assert_eq!(p.bias(), -1.0);
    }

    #[test]
    fn zero_margin_counts_as_a_mistake_for_positive_labels_too() {
        let mut p = zeros(3);
        let r = p.train_step(&[0.5, 0.0, 2.0], 1, Some(0.5)).unwrap();
        assert!(r.mistake);
        assert_eq!(r.delta_w, vec![0.25, 0.0, 1.0]);
        assert_eq!(r.delta_b, 0.5);
    }

    #[test]
    fn correct_sample_leaves_weights_untouched() {
        let mut p = zeros(2);
        let x = [1.0, -1.0];
        p.train_step(&x, -1, None).unwrap();

        let w = p.weights().to_vec();
        let b = p.bias();
        let r = p.train_step(&x, -1, None).unwrap();
        assert!(!r.mistake);
        assert_eq!(r.delta_w, vec![0.0, 0.0]);
        assert_eq!(r.delta_b, 0.0);
        assert_eq!(p.weights(), w.as_slice());
        assert_eq!(p.bias(), b);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(matches!(
            Perceptron::new(0, 1.0, None, PerceptronInit::Zeros),
            Err(Error::Config(_))
        ));

        let mut p = zeros(2);
        assert!(matches!(p.train_step(&[1.0, 1.0], 0, None), Err(Error::Domain(_))));
        assert!(matches!(p.train_step(&[1.0], 1, None), Err(Error::Dimension(_))));
        assert!(matches!(p.predict_score(&[1.0, 2.0, 3.0]), Err(Error::Dimension(_))));
    }

    #[test]
    fn random_init_is_seeded() {
        let a = Perceptron::new(4, 1.0, Some(7), PerceptronInit::Random).unwrap();
        let b = Perceptron::new(4, 1.0, Some(7), PerceptronInit::Random).unwrap();
        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.bias(), b.bias());
        assert!(a.weights().iter().any(|&w| w != 0.0));
    }

    #[test]
    fn reset_reinitializes_parameters() {
        let mut p = zeros(2);
        p.train_step(&[1.0, -1.0], -1, None).unwrap();
        p.reset();
        assert_eq!(p.weights(), &[0.0, 0.0]);
        assert_eq!(p.bias(), 0.0);

        // Random init keeps drawing from the same stream, so a reset gives
        // fresh values that are still reproducible per seed.
        let mut a = Perceptron::new(3, 1.0, Some(5), PerceptronInit::Random).unwrap();
        let mut b = Perceptron::new(3, 1.0, Some(5), PerceptronInit::Random).unwrap();
        let first = a.weights().to_vec();
        a.reset();
        b.reset();
        assert_ne!(a.weights(), first.as_slice());
        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.bias(), b.bias());
    }

    #[test]
    fn shuffled_epochs_are_reproducible() {
        let data = Dataset::or();
        let mut a = zeros(2);
        let mut b = zeros(2);
        let ra = a.train_epoch(data.samples(), None, true).unwrap();
        let rb = b.train_epoch(data.samples(), None, true).unwrap();
        assert_eq!(ra, rb);
        assert_eq!(ra.len(), data.len());
    }

    #[test]
    fn converges_on_or() {
        let data = Dataset::or();
        let mut p = zeros(2);
        for _ in 0..20 {
            p.train_epoch(data.samples(), None, false).unwrap();
        }
        let results = p.train_epoch(data.samples(), None, false).unwrap();
        assert!(results.iter().all(|r| !r.mistake));
        for s in data.samples() {
            assert_eq!(p.predict_label(&s.x).unwrap(), s.y);
        }
    }
}
