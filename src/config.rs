//! Construction parameters for the models and services.
//!
//! Every config has a `Default` holding the values the interactive services
//! start from. With the `serde` feature they can also be read from JSON, and
//! any field left out falls back to its default.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, PerceptronInit, Result};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptronConfig {
    pub lr: f64,
    /// `None` seeds with 0.
    pub seed: Option<u64>,
    pub init: PerceptronInit,
    pub epochs: usize,
}

impl Default for PerceptronConfig {
    fn default() -> Self {
        Self {
            lr: 1.0,
            seed: None,
            init: PerceptronInit::Zeros,
            epochs: 10,
        }
    }
}

impl PerceptronConfig {
    pub fn validate(&self) -> Result<()> {
        validate_lr(self.lr)?;
        validate_epochs(self.epochs)
    }
}

/// Parameters shared by [`crate::Adaline`] and [`crate::LogisticNeuron`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct NeuronConfig {
    pub lr: f64,
    pub epochs: usize,
}

impl Default for NeuronConfig {
    fn default() -> Self {
        Self { lr: 0.1, epochs: 50 }
    }
}

impl NeuronConfig {
    pub fn validate(&self) -> Result<()> {
        validate_lr(self.lr)?;
        validate_epochs(self.epochs)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct MlpConfig {
    pub hidden_dim: usize,
    pub lr: f64,
    /// `None` seeds both layers with 0.
    pub seed: Option<u64>,
    pub epochs: usize,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_dim: 2,
            lr: 0.5,
            seed: None,
            epochs: 200,
        }
    }
}

impl MlpConfig {
    pub fn validate(&self) -> Result<()> {
        if self.hidden_dim == 0 {
            return Err(Error::Config("hidden_dim must be > 0".to_owned()));
        }
        validate_lr(self.lr)?;
        validate_epochs(self.epochs)
    }
}

// Zero and negative rates are allowed; they just stall or reverse training.
fn validate_lr(lr: f64) -> Result<()> {
    if !lr.is_finite() {
        return Err(Error::Config("lr must be finite".to_owned()));
    }
    Ok(())
}

fn validate_epochs(epochs: usize) -> Result<()> {
    if epochs == 0 {
        return Err(Error::Config("epochs must be > 0".to_owned()));
    }
    Ok(())
}

#[cfg(feature = "serde")]
macro_rules! from_json {
    ($($ty:ty),+) => {
        $(
            impl $ty {
                /// Parse from JSON and validate.
                pub fn from_json_str(s: &str) -> Result<Self> {
                    let cfg: Self = serde_json::from_str(s)
                        .map_err(|e| Error::Config(format!("failed to parse config json: {e}")))?;
                    cfg.validate()?;
                    Ok(cfg)
                }
            }
        )+
    };
}

#[cfg(feature = "serde")]
from_json!(PerceptronConfig, NeuronConfig, MlpConfig);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        PerceptronConfig::default().validate().unwrap();
        NeuronConfig::default().validate().unwrap();
        MlpConfig::default().validate().unwrap();
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cfg = MlpConfig {
            hidden_dim: 0,
            ..MlpConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));

        let cfg = NeuronConfig {
            lr: f64::NAN,
            ..NeuronConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = PerceptronConfig {
            epochs: 0,
            ..PerceptronConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = PerceptronConfig {
            lr: -1.0,
            ..PerceptronConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let cfg = MlpConfig::from_json_str(r#"{ "hidden_dim": 4, "seed": 7 }"#).unwrap();
        assert_eq!(cfg.hidden_dim, 4);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.lr, MlpConfig::default().lr);

        let cfg = PerceptronConfig::from_json_str(r#"{ "init": "random" }"#).unwrap();
        assert_eq!(cfg.init, PerceptronInit::Random);
        assert_eq!(cfg.seed, None);

        assert!(MlpConfig::from_json_str(r#"{ "hidden_dim": 0 }"#).is_err());
        assert!(NeuronConfig::from_json_str("not json").is_err());
    }
}
