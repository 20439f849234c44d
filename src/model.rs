//! Model
//!
//! The capability an uplift arm needs from a learner: fit on a binary outcome and
//! predict the probability of the positive class.
use crate::booster::GradientBooster;
use crate::data::Matrix;
use crate::errors::UpliftError;

/// A binary probabilistic classifier.
///
/// Implementors own all fitted state; a fitted model is read only during prediction,
/// so it can be shared across threads.
pub trait BinaryProbabilityModel: Send + Sync {
    /// Fit on a column major feature matrix and a 0/1 target.
    fn fit(&mut self, data: &Matrix<f64>, y: &[f64]) -> Result<(), UpliftError>;

    /// Probability of the positive class, one per row of `data`.
    fn predict_proba(&self, data: &Matrix<f64>) -> Vec<f64>;
}

impl BinaryProbabilityModel for GradientBooster {
    fn fit(&mut self, data: &Matrix<f64>, y: &[f64]) -> Result<(), UpliftError> {
        GradientBooster::fit(self, data, y)
    }

    fn predict_proba(&self, data: &Matrix<f64>) -> Vec<f64> {
        GradientBooster::predict_proba(self, data)
    }
}
