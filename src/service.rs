//! Stateful, step-at-a-time training sessions.
//!
//! A service owns one model, the dataset it trains on, and a cursor. Each
//! `step` trains on the sample under the cursor, advances it (wrapping at
//! the end of the dataset) and returns a serializable snapshot describing
//! what happened. Hosts that need shared access wrap a service in a lock.

use log::{debug, info};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{MlpConfig, PerceptronConfig};
use crate::grid::{GridMlp, StepTemplates, grid_len, reshape_template, step_templates};
use crate::{Adaline, Dataset, Error, Mlp, MlpInternals, Perceptron, Result, Sample};

/// Which samples a service trains on.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetChoice {
    /// Bipolar OR on a 1x2 grid.
    Or,
    /// Bipolar XOR on a 1x2 grid.
    Xor,
    /// Caller-provided samples laid out on a `rows x cols` grid.
    Custom { data: Dataset, rows: usize, cols: usize },
}

impl DatasetChoice {
    pub fn name(&self) -> &'static str {
        match self {
            DatasetChoice::Or => "or",
            DatasetChoice::Xor => "xor",
            DatasetChoice::Custom { .. } => "custom",
        }
    }

    fn resolve(&self) -> Result<(Dataset, (usize, usize))> {
        match self {
            DatasetChoice::Or => Ok((Dataset::or(), (1, 2))),
            DatasetChoice::Xor => Ok((Dataset::xor(), (1, 2))),
            DatasetChoice::Custom { data, rows, cols } => {
                if grid_len(*rows, *cols)? != data.dim() {
                    return Err(Error::Dimension(format!(
                        "grid {rows}x{cols} does not match sample dim {}",
                        data.dim()
                    )));
                }
                Ok((data.clone(), (*rows, *cols)))
            }
        }
    }
}

/// Position in a dataset that wraps back to 0 after the last sample.
#[derive(Debug, Clone)]
struct Cursor {
    data: Dataset,
    idx: usize,
}

impl Cursor {
    fn new(data: Dataset) -> Self {
        Self { data, idx: 0 }
    }

    fn current(&self) -> &Sample {
        self.data.sample(self.idx)
    }

    fn advance(&mut self) {
        self.idx = (self.idx + 1) % self.data.len();
    }
}

/// Result of [`PerceptronService::step`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptronSnapshot {
    /// Weights after the step.
    pub w: Vec<f64>,
    pub b: f64,
    /// The sample that was trained on.
    pub x: Vec<f64>,
    pub y: i32,
    pub score: f64,
    pub pred: i32,
    pub mistake: bool,
    pub delta_w: Vec<f64>,
    pub delta_b: f64,
    /// Cursor after advancing.
    pub idx: usize,
    pub dataset: String,
    pub lr: f64,
    pub next_x: Vec<f64>,
    pub next_y: i32,
    pub grid_rows: usize,
    pub grid_cols: usize,
    pub sample_count: usize,
}

/// Result of [`PerceptronService::state`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptronState {
    pub w: Vec<f64>,
    pub b: f64,
    pub idx: usize,
    pub dataset: String,
    pub lr: f64,
    pub next_x: Vec<f64>,
    pub next_y: i32,
    pub grid_rows: usize,
    pub grid_cols: usize,
    pub sample_count: usize,
}

#[derive(Debug, Clone)]
pub struct PerceptronService {
    config: PerceptronConfig,
    choice: DatasetChoice,
    shape: (usize, usize),
    cursor: Cursor,
    model: Perceptron,
}

impl PerceptronService {
    pub fn new(choice: DatasetChoice, config: PerceptronConfig) -> Result<Self> {
        let (data, shape) = choice.resolve()?;
        let model = Perceptron::new(data.dim(), config.lr, config.seed, config.init)?;
        Ok(Self {
            config,
            choice,
            shape,
            cursor: Cursor::new(data),
            model,
        })
    }

    /// Switch datasets; rebuilds the model and rewinds the cursor.
    pub fn set_dataset(&mut self, choice: DatasetChoice) -> Result<()> {
        *self = Self::new(choice, self.config.clone())?;
        info!(
            "perceptron dataset set: dataset={} samples={}",
            self.choice.name(),
            self.cursor.data.len()
        );
        Ok(())
    }

    pub fn set_lr(&mut self, lr: f64) {
        self.config.lr = lr;
        self.model.set_lr(lr);
        info!("perceptron lr set: lr={lr}");
    }

    pub fn step(&mut self) -> Result<PerceptronSnapshot> {
        let sample = self.cursor.current().clone();
        let result = self
            .model
            .train_step(&sample.x, sample.y, Some(self.config.lr))?;
        self.cursor.advance();
        debug!(
            "perceptron step: idx={} mistake={} score={}",
            self.cursor.idx, result.mistake, result.score
        );

        let next = self.cursor.current();
        Ok(PerceptronSnapshot {
            w: self.model.weights().to_vec(),
            b: self.model.bias(),
            x: sample.x,
            y: sample.y,
            score: result.score,
            pred: result.pred,
            mistake: result.mistake,
            delta_w: result.delta_w,
            delta_b: result.delta_b,
            idx: self.cursor.idx,
            dataset: self.choice.name().to_owned(),
            lr: self.config.lr,
            next_x: next.x.clone(),
            next_y: next.y,
            grid_rows: self.shape.0,
            grid_cols: self.shape.1,
            sample_count: self.cursor.data.len(),
        })
    }

    pub fn state(&self) -> PerceptronState {
        let next = self.cursor.current();
        PerceptronState {
            w: self.model.weights().to_vec(),
            b: self.model.bias(),
            idx: self.cursor.idx,
            dataset: self.choice.name().to_owned(),
            lr: self.config.lr,
            next_x: next.x.clone(),
            next_y: next.y,
            grid_rows: self.shape.0,
            grid_cols: self.shape.1,
            sample_count: self.cursor.data.len(),
        }
    }

    /// Rebuild the model from its seed and rewind the cursor.
    pub fn reset(&mut self) -> Result<PerceptronState> {
        self.model = Perceptron::new(
            self.cursor.data.dim(),
            self.config.lr,
            self.config.seed,
            self.config.init,
        )?;
        self.cursor.idx = 0;
        info!("perceptron reset: dataset={}", self.choice.name());
        Ok(self.state())
    }
}

/// Result of [`LmsService::step`].
///
/// `grad_w` and `grad_b` are the gradients the update actually descended
/// along, i.e. `(y_hat - y) * x` and `y_hat - y`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LmsSnapshot {
    pub dataset: String,
    pub x: Vec<f64>,
    pub y: i32,
    pub w_before: Vec<f64>,
    pub b_before: f64,
    pub y_hat: f64,
    /// `y - y_hat`.
    pub error: f64,
    pub grad_w: Vec<f64>,
    pub grad_b: f64,
    /// Gradient of the unhalved squared error `(y - y_hat)^2`, i.e.
    /// `-2 * error * x`. Twice `grad_w`; reported for error-surface plots.
    pub sq_grad_w: Vec<f64>,
    pub sq_grad_b: f64,
    pub w_after: Vec<f64>,
    pub b_after: f64,
    pub idx: usize,
    pub lr: f64,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LmsState {
    pub dataset: String,
    pub w: Vec<f64>,
    pub b: f64,
    pub idx: usize,
    pub lr: f64,
    /// The sample the next step will use.
    pub x: Vec<f64>,
    pub y: i32,
    pub sample_count: usize,
}

/// LMS (Adaline) on a dataset of 2-D inputs.
#[derive(Debug, Clone)]
pub struct LmsService {
    choice: DatasetChoice,
    cursor: Cursor,
    model: Adaline,
}

impl LmsService {
    /// Custom datasets must lay out exactly two cells (`rows * cols == 2`).
    pub fn new(choice: DatasetChoice, lr: f64) -> Result<Self> {
        let (data, (rows, cols)) = choice.resolve()?;
        if data.dim() != 2 {
            return Err(Error::Dimension(format!(
                "lms requires 2-D inputs, got grid {rows}x{cols}"
            )));
        }
        Ok(Self {
            model: Adaline::new(data.dim(), lr)?,
            cursor: Cursor::new(data),
            choice,
        })
    }

    /// Switch datasets; zeroes the model and rewinds the cursor, keeping `lr`.
    pub fn set_dataset(&mut self, choice: DatasetChoice) -> Result<()> {
        *self = Self::new(choice, self.model.lr())?;
        info!(
            "lms dataset set: dataset={} samples={}",
            self.choice.name(),
            self.cursor.data.len()
        );
        Ok(())
    }

    pub fn set_lr(&mut self, lr: f64) {
        self.model.set_lr(lr);
        info!("lms lr set: lr={lr}");
    }

    pub fn step(&mut self) -> Result<LmsSnapshot> {
        let sample = self.cursor.current().clone();
        let w_before = self.model.weights().to_vec();
        let b_before = self.model.bias();

        let out = self.model.step(&sample.x, sample.y as f64)?;
        self.cursor.advance();
        debug!("lms step: idx={} loss={}", self.cursor.idx, out.loss);

        let error = sample.y as f64 - out.y_hat;
        Ok(LmsSnapshot {
            dataset: self.choice.name().to_owned(),
            sq_grad_w: sample.x.iter().map(|&xi| -2.0 * error * xi).collect(),
            sq_grad_b: -2.0 * error,
            x: sample.x,
            y: sample.y,
            w_before,
            b_before,
            y_hat: out.y_hat,
            error,
            grad_w: out.grad_w,
            grad_b: out.grad_b,
            w_after: self.model.weights().to_vec(),
            b_after: self.model.bias(),
            idx: self.cursor.idx,
            lr: self.model.lr(),
        })
    }

    pub fn state(&self) -> LmsState {
        let next = self.cursor.current();
        LmsState {
            dataset: self.choice.name().to_owned(),
            w: self.model.weights().to_vec(),
            b: self.model.bias(),
            idx: self.cursor.idx,
            lr: self.model.lr(),
            x: next.x.clone(),
            y: next.y,
            sample_count: self.cursor.data.len(),
        }
    }

    /// Zero the weights and rewind; the learning rate is kept.
    pub fn reset(&mut self) -> LmsState {
        self.model.reset();
        self.cursor.idx = 0;
        info!("lms reset");
        self.state()
    }
}

/// Model output for one dataset sample.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SampleEval {
    pub x: Vec<f64>,
    pub y: i32,
    pub p_hat: f64,
    /// +1 iff `p_hat >= 0.5`.
    pub pred: i32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenView {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    /// One `grid_rows x grid_cols` board per hidden unit.
    pub templates: Vec<Vec<Vec<f64>>>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OutputView {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MlpSnapshot {
    pub dataset: String,
    pub grid_rows: usize,
    pub grid_cols: usize,
    /// Configured width; applies to the model from the next
    /// [`MlpService::reset_model`].
    pub hidden_dim: usize,
    pub lr: f64,
    pub seed: Option<u64>,
    pub idx: usize,
    pub sample_count: usize,
    pub next_x: Vec<f64>,
    pub next_y: i32,
    pub hidden: HiddenView,
    pub output: OutputView,
    pub evals: Vec<SampleEval>,
    /// Set by [`MlpService::step`]; `None` from [`MlpService::snapshot`].
    pub last_step: Option<StepView>,
}

/// What the latest step changed, as board-shaped templates.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct StepView {
    /// Index of the sample that was trained on.
    pub sample_index: usize,
    pub templates: StepTemplates,
}

/// One step of a fresh network on a single sample, see [`inspect_sample`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MlpInspection {
    pub dataset: String,
    pub grid_rows: usize,
    pub grid_cols: usize,
    pub hidden_dim: usize,
    pub sample_index: usize,
    pub sample_count: usize,
    pub internals: MlpInternals,
    pub templates: StepTemplates,
}

/// Build a fresh network from `config` and run one step on sample
/// `sample_index % len` of `choice`, without any session state.
pub fn inspect_sample(choice: &DatasetChoice, config: &MlpConfig, sample_index: usize) -> Result<MlpInspection> {
    let (data, (rows, cols)) = choice.resolve()?;
    let mut grid = GridMlp::new(rows, cols, config.hidden_dim, config.lr, config.seed)?;
    let sample_index = sample_index % data.len();
    let sample = data.sample(sample_index);
    let (internals, templates) = grid.inspect_step(&sample.x, sample.y)?;

    Ok(MlpInspection {
        dataset: choice.name().to_owned(),
        grid_rows: rows,
        grid_cols: cols,
        hidden_dim: config.hidden_dim,
        sample_index,
        sample_count: data.len(),
        internals,
        templates,
    })
}

#[derive(Debug, Clone)]
pub struct MlpService {
    config: MlpConfig,
    choice: DatasetChoice,
    shape: (usize, usize),
    cursor: Cursor,
    model: Mlp,
}

impl MlpService {
    pub fn new(choice: DatasetChoice, config: MlpConfig) -> Result<Self> {
        if config.hidden_dim == 0 {
            return Err(Error::Config("hidden_dim must be > 0".to_owned()));
        }
        let (data, shape) = choice.resolve()?;
        let model = Mlp::new(data.dim(), config.hidden_dim, config.lr, config.seed)?;
        Ok(Self {
            config,
            choice,
            shape,
            cursor: Cursor::new(data),
            model,
        })
    }

    #[inline]
    pub fn model(&self) -> &Mlp {
        &self.model
    }

    /// Update any subset of the hyper-parameters.
    ///
    /// `lr` takes effect immediately. `hidden_dim` and `seed` apply when the
    /// model is next rebuilt by [`Self::reset_model`] or [`Self::set_dataset`].
    pub fn set_hyperparams(&mut self, hidden_dim: Option<usize>, lr: Option<f64>, seed: Option<u64>) -> Result<()> {
        if hidden_dim == Some(0) {
            return Err(Error::Config("hidden_dim must be > 0".to_owned()));
        }
        if let Some(h) = hidden_dim {
            self.config.hidden_dim = h;
        }
        if let Some(lr) = lr {
            self.config.lr = lr;
            self.model.set_lr(lr);
        }
        if seed.is_some() {
            self.config.seed = seed;
        }
        info!(
            "mlp hyperparams set: hidden_dim={} lr={} seed={:?}",
            self.config.hidden_dim, self.config.lr, self.config.seed
        );
        Ok(())
    }

    /// Switch datasets; rebuilds the model and rewinds the cursor.
    pub fn set_dataset(&mut self, choice: DatasetChoice) -> Result<()> {
        *self = Self::new(choice, self.config.clone())?;
        info!(
            "mlp dataset set: dataset={} samples={}",
            self.choice.name(),
            self.cursor.data.len()
        );
        Ok(())
    }

    /// Fresh model from the current configuration; rewinds the cursor.
    pub fn reset_model(&mut self) -> Result<()> {
        self.model = Mlp::new(
            self.cursor.data.dim(),
            self.config.hidden_dim,
            self.config.lr,
            self.config.seed,
        )?;
        self.cursor.idx = 0;
        info!("mlp model reset: hidden_dim={}", self.config.hidden_dim);
        Ok(())
    }

    pub fn snapshot(&self) -> Result<MlpSnapshot> {
        let (rows, cols) = self.shape;
        let hidden = self.model.hidden();
        let output = self.model.output();

        let templates = (0..hidden.out_dim())
            .map(|o| reshape_template(hidden.row(o), rows, cols))
            .collect::<Result<Vec<_>>>()?;

        let evals = self
            .cursor
            .data
            .samples()
            .iter()
            .map(|s| {
                let p_hat = self.model.predict(&s.x)?;
                Ok(SampleEval {
                    x: s.x.clone(),
                    y: s.y,
                    p_hat,
                    pred: if p_hat >= 0.5 { 1 } else { -1 },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let next = self.cursor.current();
        Ok(MlpSnapshot {
            dataset: self.choice.name().to_owned(),
            grid_rows: rows,
            grid_cols: cols,
            hidden_dim: self.config.hidden_dim,
            lr: self.config.lr,
            seed: self.config.seed,
            idx: self.cursor.idx,
            sample_count: self.cursor.data.len(),
            next_x: next.x.clone(),
            next_y: next.y,
            hidden: HiddenView {
                weights: hidden.weights(),
                bias: hidden.biases().to_vec(),
                templates,
            },
            output: OutputView {
                weights: output.weights(),
                bias: output.biases().to_vec(),
            },
            evals,
            last_step: None,
        })
    }

    pub fn step(&mut self) -> Result<(MlpSnapshot, MlpInternals)> {
        let sample_index = self.cursor.idx;
        let sample = self.cursor.current().clone();
        let internals = self.model.inspect_step(&sample.x, sample.y)?;
        let templates = step_templates(&internals, self.shape.0, self.shape.1)?;
        self.cursor.advance();
        debug!("mlp step: idx={} loss={}", self.cursor.idx, internals.loss);

        let mut snapshot = self.snapshot()?;
        snapshot.last_step = Some(StepView {
            sample_index,
            templates,
        });
        Ok((snapshot, internals))
    }
}
