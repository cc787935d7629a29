//! Two-layer MLP for binary classification.
//!
//! Fixed topology: a tanh hidden layer of configurable width feeding a single
//! sigmoid output unit, trained one sample at a time with BCE on bipolar
//! labels.
//!
//! [`Mlp::inspect_step`] is the canonical training step. It records every
//! intermediate value (activations, gradients, parameters before and after
//! the update) so a caller can replay the step; [`Mlp::step`] reduces that
//! record to the few numbers a training loop needs.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::loss::{bce_grad_wrt_logit, bce_loss, pm1_to_01};
use crate::neuron::epoch_losses;
use crate::perceptron::DEFAULT_SEED;
use crate::{Activation, Error, Layer, Result, Sample};

#[derive(Debug, Clone)]
pub struct Mlp {
    lr: f64,
    hidden: Layer,
    output: Layer,
    last_grad_hidden: Option<Vec<Vec<f64>>>,
}

/// Lightweight result of [`Mlp::step`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MlpStep {
    pub loss: f64,
    pub p_hat: f64,
    /// L1 norm of the hidden-layer weight and bias gradients.
    pub grad_norm: f64,
    pub grad_hidden: Vec<Vec<f64>>,
}

/// Everything computed during one [`Mlp::inspect_step`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MlpInternals {
    pub x: Vec<f64>,
    pub y: i32,
    pub y01: i32,
    pub hidden_z: Vec<f64>,
    pub hidden_a: Vec<f64>,
    pub output_z: f64,
    pub output_a: f64,
    pub loss: f64,
    /// Shape (hidden_dim, input_dim).
    pub grad_hidden_w: Vec<Vec<f64>>,
    pub grad_hidden_b: Vec<f64>,
    /// Shape (1, hidden_dim).
    pub grad_out_w: Vec<Vec<f64>>,
    pub grad_out_b: Vec<f64>,
    pub hidden_w_before: Vec<Vec<f64>>,
    pub hidden_b_before: Vec<f64>,
    pub out_w_before: Vec<Vec<f64>>,
    pub out_b_before: Vec<f64>,
    pub hidden_w_after: Vec<Vec<f64>>,
    pub hidden_b_after: Vec<f64>,
    pub out_w_after: Vec<Vec<f64>>,
    pub out_b_after: Vec<f64>,
}

impl Mlp {
    /// Build a `input_dim -> hidden_dim -> 1` network.
    ///
    /// Both layers are initialized from `seed` (0 when absent), each with its
    /// own freshly seeded generator, so the output layer's weights repeat the
    /// first draws of the hidden layer's stream.
    pub fn new(input_dim: usize, hidden_dim: usize, lr: f64, seed: Option<u64>) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::Config("input_dim must be > 0".to_owned()));
        }
        if hidden_dim == 0 {
            return Err(Error::Config("hidden_dim must be > 0".to_owned()));
        }

        let seed = seed.unwrap_or(DEFAULT_SEED);
        let hidden = Layer::new(input_dim, hidden_dim, Activation::Tanh, seed)?;
        let output = Layer::new(hidden_dim, 1, Activation::Sigmoid, seed)?;
        Self::from_layers(hidden, output, lr)
    }

    /// Assemble a network from explicit layers.
    ///
    /// The output layer must be a single sigmoid unit: the backward pass uses
    /// the sigmoid + BCE closed form for the output gradient.
    pub fn from_layers(hidden: Layer, output: Layer, lr: f64) -> Result<Self> {
        if output.in_dim() != hidden.out_dim() {
            return Err(Error::Config(format!(
                "output in_dim {} does not match hidden out_dim {}",
                output.in_dim(),
                hidden.out_dim()
            )));
        }
        if output.out_dim() != 1 || output.activation() != Activation::Sigmoid {
            return Err(Error::Config(
                "output layer must be a single sigmoid unit".to_owned(),
            ));
        }

        Ok(Self {
            lr,
            hidden,
            output,
            last_grad_hidden: None,
        })
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.hidden.in_dim()
    }

    #[inline]
    pub fn hidden_dim(&self) -> usize {
        self.hidden.out_dim()
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
    pub fn hidden(&self) -> &Layer {
        &self.hidden
    }

    #[inline]
    pub fn output(&self) -> &Layer {
        &self.output
    }

    /// Hidden weight gradient from the most recent step, if any.
    #[inline]
    pub fn last_grad_hidden(&self) -> Option<&[Vec<f64>]> {
        self.last_grad_hidden.as_deref()
    }

    /// Forward pass; primes both layers for a backward pass.
    pub fn forward(&mut self, x: &[f64]) -> Result<f64> {
        let hidden = self.hidden.forward(x)?;
        let out = self.output.forward(&hidden.a)?;
        Ok(out.a[0])
    }

    /// Probability of the positive class, without touching layer caches.
    pub fn predict(&self, x: &[f64]) -> Result<f64> {
        let hidden = self.hidden.infer(x)?;
        let out = self.output.infer(&hidden.a)?;
        Ok(out.a[0])
    }

    /// One training step on `(x, y_pm1)`, returning the full internals.
    ///
    /// Gradients for both layers are computed against the pre-update
    /// weights, then applied output first, hidden second.
    pub fn inspect_step(&mut self, x: &[f64], y_pm1: i32) -> Result<MlpInternals> {
        let y01 = pm1_to_01(y_pm1)?;
        let y01_f = y01 as f64;

        let hidden_w_before = self.hidden.weights();
        let hidden_b_before = self.hidden.biases().to_vec();
        let out_w_before = self.output.weights();
        let out_b_before = self.output.biases().to_vec();

        let hidden_step = self.hidden.forward(x)?;
        let output_step = self.output.forward(&hidden_step.a)?;
        let p_hat = output_step.a[0];
        let loss = bce_loss(y01_f, p_hat)?;

        // The output layer's own backward applies sigmoid'(z) on top of the
        // closed-form logit gradient, so every gradient below equals the
        // exact BCE gradient scaled by p_hat * (1 - p_hat).
        let grad_z_out = bce_grad_wrt_logit(p_hat, y01_f)?;
        let out_grads = self.output.backward(&[grad_z_out])?;
        let hidden_grads = self.hidden.backward(&out_grads.d_inputs)?;

        self.output
            .apply_gradients(&out_grads.d_weights, &out_grads.d_biases, self.lr)?;
        self.hidden
            .apply_gradients(&hidden_grads.d_weights, &hidden_grads.d_biases, self.lr)?;
        self.last_grad_hidden = Some(hidden_grads.d_weights.clone());

        Ok(MlpInternals {
            x: x.to_vec(),
            y: y_pm1,
            y01,
            hidden_z: hidden_step.z,
            hidden_a: hidden_step.a,
            output_z: output_step.z[0],
            output_a: p_hat,
            loss,
            grad_hidden_w: hidden_grads.d_weights,
            grad_hidden_b: hidden_grads.d_biases,
            grad_out_w: out_grads.d_weights,
            grad_out_b: out_grads.d_biases,
            hidden_w_before,
            hidden_b_before,
            out_w_before,
            out_b_before,
            hidden_w_after: self.hidden.weights(),
            hidden_b_after: self.hidden.biases().to_vec(),
            out_w_after: self.output.weights(),
            out_b_after: self.output.biases().to_vec(),
        })
    }

    /// [`Mlp::inspect_step`] reduced to loss, prediction and hidden gradient.
    pub fn step(&mut self, x: &[f64], y_pm1: i32) -> Result<MlpStep> {
        let internals = self.inspect_step(x, y_pm1)?;
        let grad_norm: f64 = internals
            .grad_hidden_w
            .iter()
            .flatten()
            .chain(&internals.grad_hidden_b)
            .map(|g| g.abs())
            .sum();

        Ok(MlpStep {
            loss: internals.loss,
            p_hat: internals.output_a,
            grad_norm,
            grad_hidden: internals.grad_hidden_w,
        })
    }

    /// Step through `samples` in order for `epochs` passes, returning the
    /// mean loss of each pass.
    pub fn train(&mut self, samples: &[Sample], epochs: usize) -> Result<Vec<f64>> {
        epoch_losses(samples, epochs, |s| Ok(self.step(&s.x, s.y)?.loss))
    }
}
