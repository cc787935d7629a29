//! Fully-connected layer with a two-phase forward/backward protocol.
//!
//! `forward` caches the input and post-activation output; `backward` needs
//! that cache and fails with [`Error::State`] without it. `apply_gradients`
//! mutates the weights and drops the cache, so every update must be preceded
//! by a fresh forward pass.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Activation, Error, Result};

/// Half-width of the uniform range used for weight initialization.
pub const INIT_RANGE: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct Layer {
    in_dim: usize,
    out_dim: usize,
    /// Row-major matrix with shape (out_dim, in_dim).
    weights: Vec<f64>,
    biases: Vec<f64>,
    activation: Activation,
    cache: Option<ForwardCache>,
}

#[derive(Debug, Clone)]
struct ForwardCache {
    input: Vec<f64>,
    output: Vec<f64>,
}

/// Pre-activations and activations produced by one forward pass.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct DenseStep {
    pub z: Vec<f64>,
    pub a: Vec<f64>,
}

/// Gradients produced by one backward pass.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGradients {
    /// Shape (out_dim, in_dim).
    pub d_weights: Vec<Vec<f64>>,
    pub d_biases: Vec<f64>,
    /// Gradient with respect to the layer input, shape (in_dim,).
    pub d_inputs: Vec<f64>,
}

impl Layer {
    /// Build a layer whose weights are drawn from `StdRng::seed_from_u64(seed)`.
    pub fn new(in_dim: usize, out_dim: usize, activation: Activation, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(in_dim, out_dim, activation, &mut rng)
    }

    /// Weights are drawn uniformly from `[-0.5, 0.5]`, row by row. Biases
    /// start at zero.
    fn new_with_rng<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(Error::Config(format!(
                "layer dims must be > 0, got in_dim={in_dim} out_dim={out_dim}"
            )));
        }

        let weights = (0..in_dim * out_dim)
            .map(|_| rng.gen_range(-INIT_RANGE..=INIT_RANGE))
            .collect();

        Ok(Self {
            in_dim,
            out_dim,
            weights,
            biases: vec![0.0; out_dim],
            activation,
            cache: None,
        })
    }

    /// Build a layer from explicit parameters.
    ///
    /// `weights` holds one row per output unit.
    pub fn from_parts(
        weights: Vec<Vec<f64>>,
        biases: Vec<f64>,
        activation: Activation,
    ) -> Result<Self> {
        let out_dim = weights.len();
        let in_dim = weights.first().map(Vec::len).unwrap_or(0);
        if in_dim == 0 || out_dim == 0 {
            return Err(Error::Config(format!(
                "layer dims must be > 0, got in_dim={in_dim} out_dim={out_dim}"
            )));
        }
        for (i, row) in weights.iter().enumerate() {
            if row.len() != in_dim {
                return Err(Error::dimension(&format!("weight row {i}"), in_dim, row.len()));
            }
        }
        if biases.len() != out_dim {
            return Err(Error::dimension("biases", out_dim, biases.len()));
        }

        Ok(Self {
            in_dim,
            out_dim,
            weights: weights.into_iter().flatten().collect(),
            biases,
            activation,
            cache: None,
        })
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Weights of output unit `o`.
    ///
    /// Panics if `o >= out_dim`.
    #[inline]
    pub fn row(&self, o: usize) -> &[f64] {
        let start = o * self.in_dim;
        &self.weights[start..start + self.in_dim]
    }

    /// Snapshot of the weight matrix, one row per output unit.
    pub fn weights(&self) -> Vec<Vec<f64>> {
        self.weights
            .chunks(self.in_dim)
            .map(<[f64]>::to_vec)
            .collect()
    }

    #[inline]
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// True when a forward pass has been cached since the last update.
    #[inline]
    pub fn is_primed(&self) -> bool {
        self.cache.is_some()
    }

    /// Forward pass for a single sample.
    ///
    /// Computes `z[o] = sum_i W[o][i] * x[i] + b[o]` and `a[o] = act(z[o])`,
    /// and caches `x` and `a` for [`Layer::backward`].
    pub fn forward(&mut self, x: &[f64]) -> Result<DenseStep> {
        let step = self.infer(x)?;
        self.cache = Some(ForwardCache {
            input: x.to_vec(),
            output: step.a.clone(),
        });
        Ok(step)
    }

    /// Same computation as [`Layer::forward`] without caching anything.
    pub fn infer(&self, x: &[f64]) -> Result<DenseStep> {
        if x.len() != self.in_dim {
            return Err(Error::dimension("x", self.in_dim, x.len()));
        }

        let mut z = Vec::with_capacity(self.out_dim);
        let mut a = Vec::with_capacity(self.out_dim);
        for o in 0..self.out_dim {
            let z_o = dot(self.row(o), x) + self.biases[o];
            z.push(z_o);
            a.push(self.activation.forward(z_o));
        }
        Ok(DenseStep { z, a })
    }

    /// Backward pass for the cached sample.
    ///
    /// `grad_out` is the upstream gradient with respect to the layer output.
    /// Does not touch the weights.
    pub fn backward(&self, grad_out: &[f64]) -> Result<LayerGradients> {
        let cache = self
            .cache
            .as_ref()
            .ok_or_else(|| Error::State("forward must precede backward".to_owned()))?;
        if grad_out.len() != self.out_dim {
            return Err(Error::dimension("grad_out", self.out_dim, grad_out.len()));
        }

        let d_z: Vec<f64> = grad_out
            .iter()
            .zip(&cache.output)
            .map(|(&g, &a)| g * self.activation.grad_from_output(a))
            .collect();

        let d_weights: Vec<Vec<f64>> = d_z
            .iter()
            .map(|&dz| cache.input.iter().map(|&x| dz * x).collect())
            .collect();

        let d_inputs: Vec<f64> = (0..self.in_dim)
            .map(|i| {
                (0..self.out_dim)
                    .map(|o| self.weights[o * self.in_dim + i] * d_z[o])
                    .sum::<f64>()
            })
            .collect();

        Ok(LayerGradients {
            d_weights,
            d_biases: d_z,
            d_inputs,
        })
    }

    /// In-place gradient descent: `W -= lr * d_weights`, `b -= lr * d_biases`.
    ///
    /// Shapes are validated before anything is written. The forward cache is
    /// dropped afterwards.
    pub fn apply_gradients(&mut self, d_weights: &[Vec<f64>], d_biases: &[f64], lr: f64) -> Result<()> {
        if d_weights.len() != self.out_dim {
            return Err(Error::dimension("d_weights", self.out_dim, d_weights.len()));
        }
        if d_biases.len() != self.out_dim {
            return Err(Error::dimension("d_biases", self.out_dim, d_biases.len()));
        }
        if let Some((i, row)) = d_weights
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.in_dim)
        {
            return Err(Error::dimension(&format!("d_weights row {i}"), self.in_dim, row.len()));
        }

        for (o, row) in d_weights.iter().enumerate() {
            let start = o * self.in_dim;
            for (w, &g) in self.weights[start..start + self.in_dim].iter_mut().zip(row) {
                *w -= lr * g;
            }
            self.biases[o] -= lr * d_biases[o];
        }

        self.cache = None;
        Ok(())
    }
}

#[inline]
pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
