//! Standardization fitted offline: `(x - mean) / scale` per feature.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// A fitted standard scaler.
///
/// A `scale` entry of zero marks a constant feature during fitting and is
/// treated as 1.0, so the feature is only centered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default = "default_true")]
    pub with_mean: bool,
    #[serde(default = "default_true")]
    pub with_std: bool,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale, with_mean: true, with_std: true }
    }

    /// Scaler that returns its input unchanged.
    pub fn identity(n_features: usize) -> Self {
        Self {
            mean: vec![0.0; n_features],
            scale: vec![1.0; n_features],
            with_mean: false,
            with_std: false,
        }
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let centered =
                    if self.with_mean { value - self.mean.get(i).copied().unwrap_or(0.0) } else { value };
                if self.with_std {
                    let scale = self.scale.get(i).copied().unwrap_or(1.0);
                    if scale == 0.0 {
                        centered
                    } else {
                        centered / scale
                    }
                } else {
                    centered
                }
            })
            .collect()
    }

    pub(crate) fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.mean.len() != n_features {
            return Err(format!(
                "scaler mean has {} entries, expected {n_features}",
                self.mean.len()
            ));
        }
        if self.scale.len() != n_features {
            return Err(format!(
                "scaler scale has {} entries, expected {n_features}",
                self.scale.len()
            ));
        }
        if self.mean.iter().chain(self.scale.iter()).any(|value| !value.is_finite()) {
            return Err("scaler parameters must be finite".to_string());
        }
        Ok(())
    }
}
