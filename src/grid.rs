//! Grid-shaped views of flat weight vectors.
//!
//! Inputs laid out on a `rows x cols` board are fed to the models flattened
//! row-major. Reshaping a hidden unit's weights the same way gives its
//! "template": the board pattern that unit responds to.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Mlp, MlpInternals, MlpStep, Result, Sample};

/// Number of cells on a `rows x cols` board; fails instead of overflowing.
pub fn grid_len(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .ok_or_else(|| Error::Dimension(format!("grid {rows}x{cols} overflows usize")))
}

/// Slice a flat row-major vector into `rows` rows of `cols` values.
pub fn reshape_template(weights: &[f64], rows: usize, cols: usize) -> Result<Vec<Vec<f64>>> {
    if weights.len() != grid_len(rows, cols)? {
        return Err(Error::Dimension(format!(
            "weights length {} does not match grid {rows}x{cols}",
            weights.len()
        )));
    }
    if cols == 0 {
        return Ok(vec![Vec::new(); rows]);
    }
    Ok(weights.chunks(cols).map(<[f64]>::to_vec).collect())
}

/// Board-shaped hidden weights around one training step.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct StepTemplates {
    pub before: Vec<Vec<Vec<f64>>>,
    pub after: Vec<Vec<Vec<f64>>>,
    pub gradients: Vec<Vec<Vec<f64>>>,
}

fn reshape_rows(rows_of_weights: &[Vec<f64>], rows: usize, cols: usize) -> Result<Vec<Vec<Vec<f64>>>> {
    rows_of_weights
        .iter()
        .map(|w| reshape_template(w, rows, cols))
        .collect()
}

/// Reshape the hidden weights before and after a step, and the hidden
/// gradient, into one `rows x cols` board per hidden unit.
pub fn step_templates(internals: &MlpInternals, rows: usize, cols: usize) -> Result<StepTemplates> {
    Ok(StepTemplates {
        before: reshape_rows(&internals.hidden_w_before, rows, cols)?,
        after: reshape_rows(&internals.hidden_w_after, rows, cols)?,
        gradients: reshape_rows(&internals.grad_hidden_w, rows, cols)?,
    })
}

/// A two-layer MLP over `rows x cols` board inputs.
#[derive(Debug, Clone)]
pub struct GridMlp {
    rows: usize,
    cols: usize,
    model: Mlp,
}

impl GridMlp {
    pub fn new(rows: usize, cols: usize, hidden_dim: usize, lr: f64, seed: Option<u64>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::Config(format!(
                "rows and cols must be > 0, got {rows}x{cols}"
            )));
        }
        Ok(Self {
            rows,
            cols,
            model: Mlp::new(grid_len(rows, cols)?, hidden_dim, lr, seed)?,
        })
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn model(&self) -> &Mlp {
        &self.model
    }

    pub fn step(&mut self, x: &[f64], y_pm1: i32) -> Result<MlpStep> {
        self.model.step(x, y_pm1)
    }

    pub fn train(&mut self, samples: &[Sample], epochs: usize) -> Result<Vec<f64>> {
        self.model.train(samples, epochs)
    }

    /// [`Mlp::inspect_step`] plus the step's board-shaped templates.
    pub fn inspect_step(&mut self, x: &[f64], y_pm1: i32) -> Result<(MlpInternals, StepTemplates)> {
        let internals = self.model.inspect_step(x, y_pm1)?;
        let templates = step_templates(&internals, self.rows, self.cols)?;
        Ok((internals, templates))
    }

    /// One board-shaped template per hidden unit.
    pub fn weight_templates(&self) -> Result<Vec<Vec<Vec<f64>>>> {
        let hidden = self.model.hidden();
        (0..hidden.out_dim())
            .map(|o| reshape_template(hidden.row(o), self.rows, self.cols))
            .collect()
    }

    /// Board-shaped hidden gradients from the last step; `None` before the
    /// first step.
    pub fn gradient_templates(&self) -> Option<Result<Vec<Vec<Vec<f64>>>>> {
        self.model.last_grad_hidden().map(|grads| {
            grads
                .iter()
                .map(|row| reshape_template(row, self.rows, self.cols))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reshape_slices_rows() {
        assert_eq!(
            reshape_template(&[1.0, 2.0, 3.0, 4.0], 2, 2).unwrap(),
            vec![vec![1.0, 2.0], vec![3.0, 4.0]]
        );
        assert_eq!(
            reshape_template(&[1.0, 2.0, 3.0], 1, 3).unwrap(),
            vec![vec![1.0, 2.0, 3.0]]
        );
        assert!(matches!(
            reshape_template(&[1.0, 2.0, 3.0], 2, 2),
            Err(Error::Dimension(_))
        ));
    }

    #[test]
    fn overflowing_grid_is_a_dimension_error() {
        assert!(matches!(
            reshape_template(&[1.0], usize::MAX, 2),
            Err(Error::Dimension(_))
        ));
        assert!(matches!(grid_len(2, usize::MAX), Err(Error::Dimension(_))));
        assert_eq!(grid_len(3, 4).unwrap(), 12);
    }

    #[test]
    fn step_templates_track_before_and_after() {
        let mut grid = GridMlp::new(2, 2, 3, 0.5, Some(4)).unwrap();
        let x = [1.0, -1.0, -1.0, 1.0];
        let before = grid.weight_templates().unwrap();

        let (internals, templates) = grid.inspect_step(&x, 1).unwrap();
        assert_eq!(templates.before, before);
        assert_eq!(templates.after, grid.weight_templates().unwrap());
        assert_eq!(templates.gradients.len(), 3);
        assert_eq!(templates.gradients[2].concat(), internals.grad_hidden_w[2]);
        assert_ne!(templates.before, templates.after);

        // Rows that do not fit the board are rejected.
        assert!(matches!(
            step_templates(&internals, 3, 1),
            Err(Error::Dimension(_))
        ));
    }

    #[test]
    fn templates_follow_hidden_units() {
        let mut grid = GridMlp::new(2, 3, 4, 0.5, Some(0)).unwrap();
        assert!(grid.gradient_templates().is_none());

        let templates = grid.weight_templates().unwrap();
        assert_eq!(templates.len(), 4);
        assert!(templates.iter().all(|t| t.len() == 2 && t[0].len() == 3));
        assert_eq!(templates[1].concat(), grid.model().hidden().row(1));

        let x = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let step = grid.step(&x, 1).unwrap();
        assert!(step.loss.is_finite());

        let grads = grid.gradient_templates().unwrap().unwrap();
        assert_eq!(grads.len(), 4);
        assert_eq!(grads[0].concat(), step.grad_hidden[0]);
    }

    #[test]
    fn zero_sized_board_is_rejected() {
        assert!(matches!(GridMlp::new(0, 3, 2, 0.5, None), Err(Error::Config(_))));
    }
}
