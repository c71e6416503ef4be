//! Run configuration as understood by the pipeline.
//!
//! `TrainConfig` holds the fitting knobs the core consumes; `RunConfig` adds the
//! collaborator-side choices derived from CLI flags and the environment.

use std::path::PathBuf;

use crate::error::ClassifyError;

/// Default training CSV when `--data` is not given.
pub const DATASET_ENV: &str = "AUDIOGRAM_DATASET";
/// Default model file for `train --out` and `predict --model`.
pub const MODEL_ENV: &str = "AUDIOGRAM_MODEL";

/// Fitting settings for the softmax heads.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// Step size as a fraction of `1 / L` (L bounds the gradient's Lipschitz constant).
    pub learning_rate: f64,
    /// Heavy-ball momentum in `[0, 1)`.
    pub momentum: f64,
    /// L2 penalty on weights (bias excluded).
    pub l2: f64,
    pub max_epochs: usize,
    /// Stop once the absolute loss change drops below this.
    pub tolerance: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1.0,
            momentum: 0.9,
            l2: 1e-3,
            max_epochs: 500,
            tolerance: 1e-7,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<(), ClassifyError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0 && self.learning_rate <= 2.0) {
            return Err(ClassifyError::InvalidConfig(format!(
                "learning_rate must be in (0, 2], got {}",
                self.learning_rate
            )));
        }
        if !(self.momentum.is_finite() && (0.0..1.0).contains(&self.momentum)) {
            return Err(ClassifyError::InvalidConfig(format!(
                "momentum must be in [0, 1), got {}",
                self.momentum
            )));
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(ClassifyError::InvalidConfig(format!("l2 must be >= 0, got {}", self.l2)));
        }
        if self.max_epochs == 0 {
            return Err(ClassifyError::InvalidConfig("max_epochs must be at least 1".to_string()));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(ClassifyError::InvalidConfig(format!(
                "tolerance must be >= 0, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Where training records come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Csv { path: PathBuf, strict: bool },
    Synthetic { count: usize },
}

/// A full run's configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: DataSource,
    pub seed: u64,
    /// Fraction of records held out for evaluation (0 disables).
    pub holdout: f64,
    pub train: TrainConfig,
    pub model_out: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_train_config_is_valid() {
        assert_eq!(TrainConfig::default().validate(), Ok(()));
    }

    #[test]
    fn out_of_range_settings_are_rejected() {
        let bad = TrainConfig {
            momentum: 1.0,
            ..TrainConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ClassifyError::InvalidConfig(_))));

        let bad = TrainConfig {
            max_epochs: 0,
            ..TrainConfig::default()
        };
        assert!(bad.validate().is_err());

        let bad = TrainConfig {
            learning_rate: f64::NAN,
            ..TrainConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
