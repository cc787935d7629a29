//! Pure math behind the visual panels: 2-D decision boundaries, the MSE
//! error surface over two weights, and per-cell contributions on a board.

use crate::loss::mse_loss;
use crate::{Error, Result, Sample};

/// A point in the plane.
pub type Point = (f64, f64);

/// Two points on the line `w1*x + w2*y + b = 0`, evaluated at `x_min` and
/// `x_max`.
///
/// When `w2 == 0` the boundary is the vertical line `x = -b / w1`, returned
/// as its points at heights `x_min` and `x_max`.
pub fn decision_boundary_points(w: &[f64], b: f64, x_min: f64, x_max: f64) -> Result<(Point, Point)> {
    let &[w1, w2] = w else {
        return Err(Error::dimension("w", 2, w.len()));
    };
    if w1 == 0.0 && w2 == 0.0 {
        return Err(Error::Domain(
            "cannot compute a boundary for the zero weight vector".to_owned(),
        ));
    }

    if w2 == 0.0 {
        let x = -b / w1;
        return Ok(((x, x_min), (x, x_max)));
    }

    let y1 = -(w1 * x_min + b) / w2;
    let y2 = -(w1 * x_max + b) / w2;
    Ok(((x_min, y1), (x_max, y2)))
}

/// Mean MSE of a 2-input linear unit over a `steps x steps` grid of weights.
///
/// Row `i` fixes `w1` and column `j` fixes `w2`, both spaced evenly over
/// `w_range` inclusive; `b` is held fixed.
pub fn mse_surface(samples: &[Sample], w_range: (f64, f64), steps: usize, b: f64) -> Result<Vec<Vec<f64>>> {
    if steps <= 1 {
        return Err(Error::Domain(format!("steps must be > 1, got {steps}")));
    }
    let (w_min, w_max) = w_range;
    if w_min >= w_max {
        return Err(Error::Domain(format!(
            "weight range must be increasing, got ({w_min}, {w_max})"
        )));
    }
    if samples.is_empty() {
        return Err(Error::Domain("samples must not be empty".to_owned()));
    }
    if let Some(s) = samples.iter().find(|s| s.x.len() != 2) {
        return Err(Error::dimension("sample x", 2, s.x.len()));
    }

    let at = |k: usize| w_min + (w_max - w_min) * k as f64 / (steps - 1) as f64;
    let n = samples.len() as f64;

    let grid: Vec<Vec<f64>> = (0..steps)
        .map(|i| {
            let w1 = at(i);
            (0..steps)
                .map(|j| {
                    let w2 = at(j);
                    let total: f64 = samples
                        .iter()
                        .map(|s| mse_loss(s.y as f64, w1 * s.x[0] + w2 * s.x[1] + b))
                        .sum();
                    total / n
                })
                .collect()
        })
        .collect();
    Ok(grid)
}

/// Element-wise `x * w` over two equally shaped grids.
pub fn contribution_grid(x_grid: &[Vec<f64>], w_grid: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    if x_grid.len() != w_grid.len()
        || x_grid.iter().zip(w_grid).any(|(xr, wr)| xr.len() != wr.len())
    {
        return Err(Error::Dimension("grid sizes must match".to_owned()));
    }

    Ok(x_grid
        .iter()
        .zip(w_grid)
        .map(|(xr, wr)| xr.iter().zip(wr).map(|(x, w)| x * w).collect())
        .collect())
}

/// Row-major flattening of a grid.
pub fn flatten(grid: &[Vec<f64>]) -> Vec<f64> {
    grid.concat()
}

/// The linear score `sum(x * w) + b` computed cell by cell.
pub fn score_from_grid(x_grid: &[Vec<f64>], w_grid: &[Vec<f64>], b: f64) -> Result<f64> {
    let contrib = contribution_grid(x_grid, w_grid)?;
    Ok(flatten(&contrib).iter().sum::<f64>() + b)
}
