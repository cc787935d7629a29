//! Loss functions and their gradients for a single sample.
//!
//! BCE and perceptron loss guard their label domain and return
//! [`Error::Domain`] instead of producing a silently wrong value.

use crate::{Error, Result};

/// Clamp applied to probabilities before taking logs in [`bce_loss`].
pub const BCE_EPS: f64 = 1e-12;

/// Perceptron hinge-like loss `max(0, -y * score)` for `y` in {-1, +1}.
#[inline]
pub fn perceptron_loss(y: i32, score: f64) -> Result<f64> {
    ensure_pm1(y)?;
    Ok((-(y as f64) * score).max(0.0))
}

/// `0.5 * (y - y_hat)^2`.
#[inline]
pub fn mse_loss(y: f64, y_hat: f64) -> f64 {
    let diff = y - y_hat;
    0.5 * diff * diff
}

/// Gradient of [`mse_loss`] with respect to `y_hat`.
#[inline]
pub fn mse_grad(y: f64, y_hat: f64) -> f64 {
    y_hat - y
}

/// Binary cross-entropy for `y` in {0, 1} and a probability `p_hat`.
///
/// `p_hat` is clamped into `[BCE_EPS, 1 - BCE_EPS]` so the result is always
/// finite.
pub fn bce_loss(y: f64, p_hat: f64) -> Result<f64> {
    ensure_01(y)?;
    let p = p_hat.clamp(BCE_EPS, 1.0 - BCE_EPS);
    Ok(-(y * p.ln() + (1.0 - y) * (1.0 - p).ln()))
}

/// Gradient of BCE with respect to the logit when the output is a sigmoid.
///
/// This is the closed form of the chain rule through sigmoid + BCE, so it is
/// only valid for that pairing.
#[inline]
pub fn bce_grad_wrt_logit(p_hat: f64, y: f64) -> Result<f64> {
    ensure_01(y)?;
    Ok(p_hat - y)
}

/// Map a bipolar label to {0, 1}: `+1 -> 1`, `-1 -> 0`.
#[inline]
pub fn pm1_to_01(y: i32) -> Result<i32> {
    ensure_pm1(y)?;
    Ok(if y == 1 { 1 } else { 0 })
}

pub(crate) fn ensure_pm1(y: i32) -> Result<()> {
    if y == 1 || y == -1 {
        Ok(())
    } else {
        Err(Error::Domain(format!("label must be -1 or +1, got {y}")))
    }
}

fn ensure_01(y: f64) -> Result<()> {
    if y == 0.0 || y == 1.0 {
        Ok(())
    } else {
        Err(Error::Domain(format!("BCE target must be 0 or 1, got {y}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn mse_loss_and_grad() {
        assert_eq!(mse_loss(1.0, 1.0), 0.0);
        assert_abs_diff_eq!(mse_loss(1.0, -1.0), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mse_grad(1.0, 0.25), -0.75, epsilon = 1e-12);
    }

    #[test]
    fn bce_grad_matches_closed_form() {
        assert_abs_diff_eq!(bce_grad_wrt_logit(0.7, 1.0).unwrap(), -0.3, epsilon = 1e-9);
        assert_abs_diff_eq!(bce_grad_wrt_logit(0.2, 0.0).unwrap(), 0.2, epsilon = 1e-9);
        assert!(matches!(bce_grad_wrt_logit(0.2, 0.5), Err(Error::Domain(_))));
    }

    #[test]
    fn bce_is_monotonic_in_the_prediction() {
        let ps = [0.01, 0.1, 0.3, 0.5, 0.7, 0.9, 0.99];
        for w in ps.windows(2) {
            assert!(bce_loss(1.0, w[1]).unwrap() < bce_loss(1.0, w[0]).unwrap());
            assert!(bce_loss(0.0, w[1]).unwrap() > bce_loss(0.0, w[0]).unwrap());
        }
    }

    #[test]
    fn bce_clamps_extreme_probabilities() {
        let loss = bce_loss(1.0, 0.0).unwrap();
        assert!(loss.is_finite());
        assert_abs_diff_eq!(loss, -(BCE_EPS.ln()), epsilon = 1e-9);
        assert!(bce_loss(0.0, 1.0).unwrap().is_finite());
        assert!(matches!(bce_loss(-1.0, 0.5), Err(Error::Domain(_))));
    }

    #[test]
    fn perceptron_loss_is_zero_when_correct() {
        assert_eq!(perceptron_loss(1, 2.0).unwrap(), 0.0);
        assert_eq!(perceptron_loss(-1, 2.0).unwrap(), 2.0);
        assert_eq!(perceptron_loss(1, 0.0).unwrap(), 0.0);
        assert!(perceptron_loss(0, 1.0).is_err());
    }

    #[test]
    fn label_remapping() {
        assert_eq!(pm1_to_01(1).unwrap(), 1);
        assert_eq!(pm1_to_01(-1).unwrap(), 0);
        assert!(matches!(pm1_to_01(0), Err(Error::Domain(_))));
        assert!(pm1_to_01(2).is_err());
    }
}
