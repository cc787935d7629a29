//! Step-by-step neural network primitives for teaching.
//!
//! `stepwise-nn` implements the classic single units (perceptron, Adaline,
//! logistic neuron) and a two-layer MLP from scratch, with every training
//! step observable: each update returns the scores, deltas and gradients it
//! used, and the MLP can record a full before/after trace of one step.
//!
//! # Layout
//!
//! - Primitives: [`activation`], [`loss`], [`layer`].
//! - Models: [`perceptron`], [`neuron`], [`mlp`], plus [`grid`] for
//!   board-shaped inputs.
//! - Data and evaluation: [`data`], [`metrics`], [`viz`], [`train`].
//! - Sessions: [`service`] drives a model one sample at a time and returns
//!   serializable snapshots; [`config`] holds their construction parameters.
//!
//! # Conventions
//!
//! - Scalars are `f64`.
//! - Labels are bipolar (`-1` / `+1`); the MLP maps them to `{0, 1}` for
//!   cross-entropy internally.
//! - Layer weights have shape `(out_dim, in_dim)` and are reported as rows.
//! - Randomness comes from a seeded generator owned by each model. The same
//!   seed always reproduces the same weights and shuffles.
//! - Bad shapes, labels and configs return [`Error`]. Only the raw index
//!   accessors ([`Layer::row`], [`Dataset::sample`]) panic when out of range.
//!
//! # MSRV
//!
//! This crate's minimum supported Rust version (MSRV) is specified in `Cargo.toml`.

//! # Quick start
//!
//! ```rust
//! use stepwise_nn::{Dataset, Mlp, Perceptron, PerceptronInit};
//!
//! # fn main() -> stepwise_nn::Result<()> {
//! let or = Dataset::or();
//! let mut p = Perceptron::new(2, 1.0, Some(0), PerceptronInit::Zeros)?;
//! let step = p.train_step(&[-1.0, -1.0], -1, None)?;
//! assert!(step.mistake);
//! assert_eq!(step.delta_w, vec![1.0, 1.0]);
//! for _ in 0..10 {
//!     p.train_epoch(or.samples(), None, true)?;
//! }
//!
//! let xor = Dataset::xor();
//! let mut mlp = Mlp::new(2, 2, 0.5, Some(0))?;
//! let losses = mlp.train(xor.samples(), 200)?;
//! assert!(losses[199] < losses[0]);
//! # Ok(())
//! # }
//! ```

//! # Inspecting one step
//!
//! ```rust
//! use stepwise_nn::Mlp;
//!
//! # fn main() -> stepwise_nn::Result<()> {
//! let mut mlp = Mlp::new(2, 3, 0.5, Some(7))?;
//! let trace = mlp.inspect_step(&[1.0, -1.0], 1)?;
//! assert_eq!(trace.grad_hidden_w.len(), 3);
//! assert_eq!(trace.grad_out_w[0].len(), 3);
//! assert_ne!(trace.hidden_w_before, trace.hidden_w_after);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod config;
pub mod data;
pub mod error;
pub mod grid;
pub mod layer;
pub mod loss;
pub mod metrics;
pub mod mlp;
pub mod neuron;
pub mod perceptron;
pub mod service;
pub mod train;
pub mod viz;

pub use activation::Activation;
pub use config::{MlpConfig, NeuronConfig, PerceptronConfig};
pub use data::{Dataset, Placement, Sample};
pub use error::{Error, Result};
pub use grid::{GridMlp, StepTemplates};
pub use layer::{DenseStep, Layer, LayerGradients};
pub use mlp::{Mlp, MlpInternals, MlpStep};
pub use neuron::{Adaline, AdalineStep, LogisticNeuron, LogisticStep};
pub use perceptron::{Perceptron, PerceptronInit, StepResult};
pub use service::{DatasetChoice, LmsService, MlpInspection, MlpService, PerceptronService, inspect_sample};
pub use train::PerceptronReport;
