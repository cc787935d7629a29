//! Metrics.
//!
//! Evaluation helpers; they never participate in an update.

use crate::{Result, Sample, StepResult};

/// Number of steps that registered a mistake.
pub fn count_mistakes(results: &[StepResult]) -> usize {
    results.iter().filter(|r| r.mistake).count()
}

/// Fraction of `samples` whose predicted label equals the true label.
///
/// Returns 0.0 for an empty slice.
pub fn accuracy<F>(samples: &[Sample], mut predict: F) -> Result<f64>
where
    F: FnMut(&[f64]) -> Result<i32>,
{
    if samples.is_empty() {
        return Ok(0.0);
    }

    let mut correct = 0_usize;
    for s in samples {
        if predict(&s.x)? == s.y {
            correct += 1;
        }
    }
    Ok(correct as f64 / samples.len() as f64)
}

/// Functional margin `y * score`; positive when correctly classified.
#[inline]
pub fn margin(y: i32, score: f64) -> f64 {
    y as f64 * score
}

pub fn margins<F>(samples: &[Sample], mut score: F) -> Result<Vec<f64>>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    samples.iter().map(|s| Ok(margin(s.y, score(&s.x)?))).collect()
}
