//! Activation functions.
//!
//! A dense layer computes a pre-activation `z = W x + b` and applies an
//! activation element-wise: `a = activation(z)`.
//!
//! Layers cache the *post-activation* output `a`. Backprop recovers `da/dz`
//! from `a` alone, which is why the derivatives here are expressed "from
//! output".

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Element-wise activation function paired with its derivative from output.
pub enum Activation {
    Tanh,
    Sigmoid,
    #[cfg_attr(feature = "serde", serde(rename = "relu"))]
    ReLU,
    Identity,
}

impl Activation {
    #[inline]
    pub fn forward(self, x: f64) -> f64 {
        match self {
            Activation::Tanh => tanh(x),
            Activation::Sigmoid => sigmoid(x),
            Activation::ReLU => relu(x),
            Activation::Identity => x,
        }
    }

    /// Derivative of the activation with respect to its input, expressed in
    /// terms of the cached output `a`.
    #[inline]
    pub fn grad_from_output(self, a: f64) -> f64 {
        match self {
            Activation::Tanh => tanh_prime_from_output(a),
            Activation::Sigmoid => sigmoid_prime_from_output(a),
            // relu(z) > 0 exactly when z > 0.
            Activation::ReLU => relu_prime(a),
            Activation::Identity => 1.0,
        }
    }
}

/// Hard threshold returning `+1` for `x >= 0` and `-1` otherwise.
#[inline]
pub fn step_pm1(x: f64) -> i32 {
    if x >= 0.0 { 1 } else { -1 }
}

/// Numerically stable logistic sigmoid.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

#[inline]
pub fn sigmoid_prime_from_output(p: f64) -> f64 {
    p * (1.0 - p)
}

#[inline]
pub fn tanh(x: f64) -> f64 {
    x.tanh()
}

#[inline]
pub fn tanh_prime_from_output(t: f64) -> f64 {
    1.0 - t * t
}

#[inline]
pub fn relu(x: f64) -> f64 {
    if x > 0.0 { x } else { 0.0 }
}

/// Derivative of ReLU with respect to its input; defined as 0 at exactly 0.
#[inline]
pub fn relu_prime(x: f64) -> f64 {
    if x > 0.0 { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sigmoid_basic_values() {
        assert_abs_diff_eq!(sigmoid(0.0), 0.5, epsilon = 1e-12);
        assert!(sigmoid(10.0) > 0.9999);
        assert!(sigmoid(-10.0) < 0.0001);
    }

    #[test]
    fn sigmoid_does_not_overflow_for_extreme_inputs() {
        let hi = sigmoid(1000.0);
        let lo = sigmoid(-1000.0);
        assert!(hi.is_finite() && lo.is_finite());
        assert_abs_diff_eq!(hi, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(lo, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn step_threshold_is_inclusive_at_zero() {
        assert_eq!(step_pm1(0.0), 1);
        assert_eq!(step_pm1(1e-9), 1);
        assert_eq!(step_pm1(-1e-9), -1);
    }

    #[test]
    fn relu_derivative_at_zero_is_zero() {
        assert_eq!(relu(-2.0), 0.0);
        assert_eq!(relu(3.0), 3.0);
        assert_eq!(relu_prime(0.0), 0.0);
        assert_eq!(relu_prime(0.5), 1.0);
        assert_eq!(Activation::ReLU.grad_from_output(0.0), 0.0);
    }

    #[test]
    fn tanh_and_sigmoid_gradients_from_output() {
        let t = Activation::Tanh.forward(0.3);
        assert_abs_diff_eq!(
            Activation::Tanh.grad_from_output(t),
            1.0 - t * t,
            epsilon = 1e-12
        );

        let p = Activation::Sigmoid.forward(0.0);
        assert_abs_diff_eq!(Activation::Sigmoid.grad_from_output(p), 0.25, epsilon = 1e-12);
        assert_eq!(Activation::Identity.grad_from_output(42.0), 1.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_names_are_snake_case() {
        assert_eq!(serde_json::to_string(&Activation::ReLU).unwrap(), "\"relu\"");
        assert_eq!(serde_json::to_string(&Activation::Tanh).unwrap(), "\"tanh\"");
        let back: Activation = serde_json::from_str("\"relu\"").unwrap();
        assert_eq!(back, Activation::ReLU);
    }
}
