//! Single linear units trained by gradient descent.
//!
//! - [`Adaline`]: identity output, MSE loss (the LMS rule).
//! - [`LogisticNeuron`]: sigmoid output, BCE loss, bipolar labels.
//!
//! Both start from zero weights and update in place on every `step`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::activation::sigmoid;
use crate::layer::dot;
use crate::loss::{bce_grad_wrt_logit, bce_loss, mse_grad, mse_loss, pm1_to_01};
use crate::{Error, Result, Sample};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AdalineStep {
    pub y_hat: f64,
    pub loss: f64,
    pub grad_w: Vec<f64>,
    pub grad_b: f64,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticStep {
    pub p_hat: f64,
    pub loss: f64,
    pub grad_w: Vec<f64>,
    pub grad_b: f64,
}

/// Weights, bias and learning rate shared by both neuron kinds.
#[derive(Debug, Clone)]
struct Linear {
    weights: Vec<f64>,
    bias: f64,
    lr: f64,
}

impl Linear {
    fn new(dim: usize, lr: f64) -> Result<Self> {
        if dim == 0 {
            return Err(Error::Config("dim must be > 0".to_owned()));
        }
        Ok(Self {
            weights: vec![0.0; dim],
            bias: 0.0,
            lr,
        })
    }

    fn affine(&self, x: &[f64]) -> Result<f64> {
        if x.len() != self.weights.len() {
            return Err(Error::dimension("x", self.weights.len(), x.len()));
        }
        Ok(dot(&self.weights, x) + self.bias)
    }

    /// Descend along `grad * x`; returns the weight gradient.
    fn descend(&mut self, x: &[f64], grad: f64) -> Vec<f64> {
        let grad_w: Vec<f64> = x.iter().map(|&xi| grad * xi).collect();
        for (w, &g) in self.weights.iter_mut().zip(&grad_w) {
            *w -= self.lr * g;
        }
        self.bias -= self.lr * grad;
        grad_w
    }

    fn reset(&mut self) {
        self.weights.fill(0.0);
        self.bias = 0.0;
    }
}

macro_rules! linear_accessors {
    ($ty:ty) => {
        impl $ty {
            #[inline]
            pub fn dim(&self) -> usize {
                self.inner.weights.len()
            }

            #[inline]
            pub fn lr(&self) -> f64 {
                self.inner.lr
            }

            #[inline]
            pub fn set_lr(&mut self, lr: f64) {
                self.inner.lr = lr;
            }

            #[inline]
            pub fn weights(&self) -> &[f64] {
                &self.inner.weights
            }

            #[inline]
            pub fn bias(&self) -> f64 {
                self.inner.bias
            }

            /// Zero the weights and bias.
            pub fn reset(&mut self) {
                self.inner.reset();
            }
        }
    };
}

/// Linear neuron trained with MSE (Adaline / LMS).
#[derive(Debug, Clone)]
pub struct Adaline {
    inner: Linear,
}

linear_accessors!(Adaline);

impl Adaline {
    pub fn new(dim: usize, lr: f64) -> Result<Self> {
        Ok(Self {
            inner: Linear::new(dim, lr)?,
        })
    }

    /// Linear output `w . x + b`.
    pub fn forward(&self, x: &[f64]) -> Result<f64> {
        self.inner.affine(x)
    }

    /// One LMS update toward the real-valued target `y`.
    pub fn step(&mut self, x: &[f64], y: f64) -> Result<AdalineStep> {
        let y_hat = self.forward(x)?;
        let loss = mse_loss(y, y_hat);
        let grad = mse_grad(y, y_hat);
        let grad_w = self.inner.descend(x, grad);
        Ok(AdalineStep {
            y_hat,
            loss,
            grad_w,
            grad_b: grad,
        })
    }

    /// Step through `samples` in order for `epochs` passes; returns the mean
    /// loss of each pass.
    pub fn train(&mut self, samples: &[Sample], epochs: usize) -> Result<Vec<f64>> {
        epoch_losses(samples, epochs, |s| Ok(self.step(&s.x, s.y as f64)?.loss))
    }
}

/// Sigmoid neuron trained with binary cross-entropy on bipolar labels.
#[derive(Debug, Clone)]
pub struct LogisticNeuron {
    inner: Linear,
}

linear_accessors!(LogisticNeuron);

impl LogisticNeuron {
    pub fn new(dim: usize, lr: f64) -> Result<Self> {
        Ok(Self {
            inner: Linear::new(dim, lr)?,
        })
    }

    #[inline]
    pub fn logit(&self, x: &[f64]) -> Result<f64> {
        self.inner.affine(x)
    }

    /// Probability of the positive class.
    pub fn forward(&self, x: &[f64]) -> Result<f64> {
        self.logit(x).map(sigmoid)
    }

    /// One BCE update; `y_pm1` must be -1 or +1.
    pub fn step(&mut self, x: &[f64], y_pm1: i32) -> Result<LogisticStep> {
        let y01 = pm1_to_01(y_pm1)? as f64;
        let z = self.logit(x)?;
        let p_hat = sigmoid(z);
        let loss = bce_loss(y01, p_hat)?;
        let grad_z = bce_grad_wrt_logit(p_hat, y01)?;
        let grad_w = self.inner.descend(x, grad_z);
        Ok(LogisticStep {
            p_hat,
            loss,
            grad_w,
            grad_b: grad_z,
        })
    }

    pub fn train(&mut self, samples: &[Sample], epochs: usize) -> Result<Vec<f64>> {
        epoch_losses(samples, epochs, |s| Ok(self.step(&s.x, s.y)?.loss))
    }
}

/// Mean per-sample loss for each of `epochs` in-order passes.
pub(crate) fn epoch_losses<F>(samples: &[Sample], epochs: usize, mut step: F) -> Result<Vec<f64>>
where
    F: FnMut(&Sample) -> Result<f64>,
{
    if samples.is_empty() {
        return Err(Error::Domain("samples must not be empty".to_owned()));
    }

    let mut losses = Vec::with_capacity(epochs);
    for _ in 0..epochs {
        let mut total = 0.0;
        for s in samples {
            total += step(s)?;
        }
        losses.push(total / samples.len() as f64);
    }
    Ok(losses)
}
