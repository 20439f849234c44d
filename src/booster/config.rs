//! Booster Configuration
//!
//! Hyperparameters of the gradient boosted classifier used for each T-learner arm.
use crate::config::ConfigIO;
use crate::constants::{ITERATION_LIMIT, STOPPING_ROUNDS};
use crate::errors::UpliftError;
use crate::objective::Objective;
use crate::utils::{validate_float_parameter, validate_positive_float_parameter};
use serde::{Deserialize, Serialize};

fn default_learning_rate() -> f32 {
    0.1
}
fn default_iteration_limit() -> usize {
    ITERATION_LIMIT
}
fn default_max_depth() -> usize {
    4
}
fn default_max_bin() -> u16 {
    256
}
fn default_min_leaf_size() -> usize {
    20
}
fn default_min_hessian() -> f32 {
    1.0
}
fn default_l2_regularization() -> f32 {
    1.0
}
fn default_fraction() -> f32 {
    1.0
}
fn default_stopping_rounds() -> usize {
    STOPPING_ROUNDS
}

/// Configuration for the `GradientBooster`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoosterConfig {
    /// Learning objective.
    #[serde(default)]
    pub objective: Objective,
    /// Step size each leaf weight is multiplied by.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    /// Hard limit for number of boosting rounds.
    #[serde(default = "default_iteration_limit")]
    pub iteration_limit: usize,
    /// Maximum depth of each tree.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum number of bins for discretization.
    #[serde(default = "default_max_bin")]
    pub max_bin: u16,
    /// Minimum number of records in a leaf.
    #[serde(default = "default_min_leaf_size")]
    pub min_leaf_size: usize,
    /// Minimum hessian sum in a leaf.
    #[serde(default = "default_min_hessian")]
    pub min_hessian: f32,
    /// L2 penalty on leaf weights.
    #[serde(default = "default_l2_regularization")]
    pub l2_regularization: f32,
    /// Fraction of rows sampled for each tree.
    #[serde(default = "default_fraction")]
    pub subsample: f32,
    /// Fraction of columns sampled for each tree.
    #[serde(default = "default_fraction")]
    pub colsample_bytree: f32,
    /// Rounds without loss improvement before stopping. Zero disables early stopping.
    #[serde(default = "default_stopping_rounds")]
    pub stopping_rounds: usize,
    /// Logging frequency (every N iterations). Zero disables round logging.
    #[serde(default)]
    pub log_iterations: usize,
    /// Seed for row and column sampling.
    #[serde(default)]
    pub seed: u64,
}

impl Default for BoosterConfig {
    fn default() -> Self {
        BoosterConfig {
            objective: Objective::LogLoss,
            learning_rate: default_learning_rate(),
            iteration_limit: default_iteration_limit(),
            max_depth: default_max_depth(),
            max_bin: default_max_bin(),
            min_leaf_size: default_min_leaf_size(),
            min_hessian: default_min_hessian(),
            l2_regularization: default_l2_regularization(),
            subsample: default_fraction(),
            colsample_bytree: default_fraction(),
            stopping_rounds: default_stopping_rounds(),
            log_iterations: 0,
            seed: 0,
        }
    }
}

impl BoosterConfig {
    pub fn validate(&self) -> Result<(), UpliftError> {
        validate_positive_float_parameter(f64::from(self.learning_rate), "learning_rate")?;
        validate_float_parameter(f64::from(self.l2_regularization), 0.0, f64::INFINITY, "l2_regularization")?;
        validate_float_parameter(f64::from(self.min_hessian), 0.0, f64::INFINITY, "min_hessian")?;
        validate_float_parameter(f64::from(self.subsample), f64::MIN_POSITIVE, 1.0, "subsample")?;
        validate_float_parameter(f64::from(self.colsample_bytree), f64::MIN_POSITIVE, 1.0, "colsample_bytree")?;
        if self.max_bin < 2 {
            return Err(UpliftError::InvalidParameter(
                "max_bin".to_string(),
                "at least 2".to_string(),
                self.max_bin.to_string(),
            ));
        }
        if self.min_leaf_size == 0 {
            return Err(UpliftError::InvalidParameter(
                "min_leaf_size".to_string(),
                "at least 1".to_string(),
                "0".to_string(),
            ));
        }
        Ok(())
    }
}

impl ConfigIO for BoosterConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_booster_config_default() {
        let config = BoosterConfig::default();
        assert_eq!(config.learning_rate, 0.1);
        assert_eq!(config.max_bin, 256);
        assert_eq!(config.objective, Objective::LogLoss);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BoosterConfig::from_json(r#"{"max_depth": 6, "seed": 3}"#).unwrap();
        assert_eq!(config.max_depth, 6);
        assert_eq!(config.seed, 3);
        assert_eq!(config.iteration_limit, ITERATION_LIMIT);
        assert_eq!(config.min_leaf_size, 20);
    }

    #[test]
    fn test_booster_config_io_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("booster.json");
        let config = BoosterConfig {
            learning_rate: 0.05,
            ..Default::default()
        };
        config.save(&file_path).unwrap();
        let config2 = BoosterConfig::load(&file_path).unwrap();
        assert_eq!(config, config2);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_eta = BoosterConfig {
            learning_rate: 0.0,
            ..Default::default()
        };
        assert!(matches!(bad_eta.validate(), Err(UpliftError::InvalidParameter(..))));
        let bad_sub = BoosterConfig {
            subsample: 1.5,
            ..Default::default()
        };
        assert!(bad_sub.validate().is_err());
        let bad_bins = BoosterConfig {
            max_bin: 1,
            ..Default::default()
        };
        assert!(bad_bins.validate().is_err());
    }
}
