//! Causal
//!
//! Uplift estimation on a randomized two-arm experiment: the two-model T-learner,
//! the targeting policy applied to its scores, and summaries that compare the
//! estimates with what the experiment observed.
pub mod evaluation;
pub mod metalearners;
pub mod policy;


use crate::booster::GradientBooster;
use crate::dataset::{Dataset, Feature};
use crate::errors::UpliftError;
use crate::model::BinaryProbabilityModel;
use metalearners::{FittedTLearner, TLearner};

/// Fit a gradient boosted T-learner with default settings.
pub fn fit(dataset: &Dataset, features: &[Feature]) -> Result<FittedTLearner<GradientBooster>, UpliftError> {
    TLearner::<GradientBooster>::default().fit(dataset, features)
}

/// Uplift of every record under a fitted T-learner.
pub fn score<M: BinaryProbabilityModel>(
    dataset: &Dataset,
    features: &[Feature],
    model: &FittedTLearner<M>,
) -> Result<Vec<f64>, UpliftError> {
    model.score(dataset, features)
}
