//! Objective
//!
//! Loss functions the booster can minimise. Predictions handed to an objective are
//! raw scores (log odds for [`LogLoss`]).
use crate::constants::PROBABILITY_CLIP;
use crate::utils::{fast_sum, odds};
use serde::{Deserialize, Serialize};

pub trait ObjectiveFunction: Send + Sync {
    /// Per-record loss.
    fn loss(&self, y: &[f64], yhat: &[f64]) -> Vec<f32>;
    /// Per-record first and second derivative of the loss with respect to `yhat`.
    fn gradient(&self, y: &[f64], yhat: &[f64]) -> (Vec<f32>, Vec<f32>);
    /// Constant raw score that minimises the loss before any tree is fit.
    fn initial_value(&self, y: &[f64]) -> f64;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Objective {
    #[default]
    LogLoss,
}

impl ObjectiveFunction for Objective {
    fn loss(&self, y: &[f64], yhat: &[f64]) -> Vec<f32> {
        match self {
            Objective::LogLoss => LogLoss.loss(y, yhat),
        }
    }

    fn gradient(&self, y: &[f64], yhat: &[f64]) -> (Vec<f32>, Vec<f32>) {
        match self {
            Objective::LogLoss => LogLoss.gradient(y, yhat),
        }
    }

    fn initial_value(&self, y: &[f64]) -> f64 {
        match self {
            Objective::LogLoss => LogLoss.initial_value(y),
        }
    }
}

/// Negative log likelihood of a Bernoulli outcome.
#[derive(Default, Debug, Deserialize, Serialize, Clone, Copy)]
pub struct LogLoss;

impl ObjectiveFunction for LogLoss {
    #[inline]
    fn loss(&self, y: &[f64], yhat: &[f64]) -> Vec<f32> {
        y.iter()
            .zip(yhat)
            .map(|(y_, yhat_)| {
                let p = odds(*yhat_).clamp(PROBABILITY_CLIP, 1.0 - PROBABILITY_CLIP);
                (-(*y_ * p.ln() + (1.0 - *y_) * (1.0 - p).ln())) as f32
            })
            .collect()
    }

    #[inline]
    fn gradient(&self, y: &[f64], yhat: &[f64]) -> (Vec<f32>, Vec<f32>) {
        y.iter()
            .zip(yhat)
            .map(|(y_, yhat_)| {
                let p = odds(*yhat_);
                ((p - *y_) as f32, (p * (1.0 - p)) as f32)
            })
            .unzip()
    }

    #[inline]
    fn initial_value(&self, y: &[f64]) -> f64 {
        let ytot = fast_sum(y);
        let ntot = y.len() as f64;
        f64::ln(ytot / (ntot - ytot))
    }
}
