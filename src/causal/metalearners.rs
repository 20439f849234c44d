//! Two-model (T-learner) uplift estimation.
//!
//! One binary classifier learns $P(Y=1 \mid X)$ on the control arm, another on the
//! treatment arm. The uplift of a record is $\mu_1(x) - \mu_0(x)$, evaluated on the
//! same feature vector whatever arm the record was actually in.

use crate::booster::{BoosterConfig, GradientBooster};
use crate::config::ConfigIO;
use crate::data::Matrix;
use crate::dataset::{feature_list, Dataset, Feature, TreatmentArm};
use crate::errors::UpliftError;
use crate::model::BinaryProbabilityModel;
use log::info;
use serde::{Deserialize, Serialize};

/// Training data of one arm, owned outright so the two fits share nothing.
struct ArmData {
    arm: TreatmentArm,
    data: Vec<f64>,
    y: Vec<f64>,
    cols: usize,
}

impl ArmData {
    fn extract(matrix: &Matrix<f64>, outcomes: &[f64], dataset: &Dataset, arm: TreatmentArm) -> Result<Self, UpliftError> {
        let index = dataset.arm_indices(arm);
        if index.is_empty() {
            return Err(UpliftError::InsufficientData {
                arm,
                reason: "no records were assigned to this arm".to_string(),
            });
        }
        let y: Vec<f64> = index.iter().map(|&i| outcomes[i]).collect();
        let conversions = y.iter().filter(|v| **v == 1.0).count();
        if conversions == 0 || conversions == y.len() {
            return Err(UpliftError::InsufficientData {
                arm,
                reason: format!(
                    "all {} records share one outcome ({} conversions), a classifier needs both classes",
                    y.len(),
                    conversions
                ),
            });
        }
        Ok(ArmData {
            arm,
            data: matrix.take_rows(&index),
            y,
            cols: matrix.cols,
        })
    }

    fn conversions(&self) -> usize {
        self.y.iter().filter(|v| **v == 1.0).count()
    }

    fn fit<M: BinaryProbabilityModel>(self, mut model: M) -> Result<M, UpliftError> {
        let matrix = Matrix::new(&self.data, self.y.len(), self.cols);
        model.fit(&matrix, &self.y)?;
        info!("Fitted the {} arm model on {} records.", self.arm, self.y.len());
        Ok(model)
    }
}

/// T-Learner (Two Learners).
///
/// Holds an unfitted template model; [`TLearner::fit`] clones it once per arm.
#[derive(Debug, Clone)]
pub struct TLearner<M = GradientBooster> {
    template: M,
}

impl Default for TLearner<GradientBooster> {
    fn default() -> Self {
        TLearner {
            template: GradientBooster::default(),
        }
    }
}

impl TLearner<GradientBooster> {
    /// Both arms use gradient boosting with this configuration.
    pub fn from_config(cfg: BoosterConfig) -> Result<Self, UpliftError> {
        Ok(TLearner {
            template: GradientBooster::new(cfg)?,
        })
    }
}

impl<M: BinaryProbabilityModel + Clone> TLearner<M> {
    pub fn new(template: M) -> Self {
        TLearner { template }
    }

    /// Partition `dataset` by treatment and fit one model per arm, concurrently.
    ///
    /// * `dataset` - Population with observed treatment and conversion.
    /// * `features` - Ordered feature columns; scoring must use the same list.
    ///
    /// Fails with [`UpliftError::InsufficientData`] when an arm is empty or holds a
    /// single outcome class.
    pub fn fit(&self, dataset: &Dataset, features: &[Feature]) -> Result<FittedTLearner<M>, UpliftError> {
        if features.is_empty() {
            return Err(UpliftError::InvalidParameter(
                "features".to_string(),
                "at least one feature column".to_string(),
                "[]".to_string(),
            ));
        }
        let data = dataset.feature_matrix(features);
        let matrix = Matrix::new(&data, dataset.len(), features.len());
        let outcomes = dataset.outcomes();

        let control = ArmData::extract(&matrix, &outcomes, dataset, TreatmentArm::Control)?;
        let treatment = ArmData::extract(&matrix, &outcomes, dataset, TreatmentArm::Treatment)?;
        info!(
            "Fitting T-learner on {}: control {} records ({} conversions), treatment {} records ({} conversions).",
            feature_list(features),
            control.y.len(),
            control.conversions(),
            treatment.y.len(),
            treatment.conversions(),
        );

        let (control_model, treatment_model) = rayon::join(
            || control.fit(self.template.clone()),
            || treatment.fit(self.template.clone()),
        );

        Ok(FittedTLearner {
            features: features.to_vec(),
            control: control_model?,
            treatment: treatment_model?,
        })
    }
}

/// The two fitted arm models and the feature columns they were fit on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedTLearner<M = GradientBooster> {
    features: Vec<Feature>,
    /// $\mu_0$, fit on the control arm.
    pub control: M,
    /// $\mu_1$, fit on the treatment arm.
    pub treatment: M,
}

impl<M: BinaryProbabilityModel> FittedTLearner<M> {
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Estimated uplift for every record of `dataset`.
    ///
    /// Records need not have been part of the training data. `features` must equal
    /// the list used at fit time, order included.
    pub fn score(&self, dataset: &Dataset, features: &[Feature]) -> Result<Vec<f64>, UpliftError> {
        if features != self.features.as_slice() {
            return Err(UpliftError::FeatureMismatch {
                expected: feature_list(&self.features),
                provided: feature_list(features),
            });
        }
        let data = dataset.feature_matrix(features);
        let matrix = Matrix::new(&data, dataset.len(), features.len());
        Ok(self.predict(&matrix))
    }

    /// Score and attach the result to the dataset.
    pub fn annotate(&self, dataset: &mut Dataset, features: &[Feature]) -> Result<(), UpliftError> {
        let scores = self.score(dataset, features)?;
        dataset.annotate_uplift(scores)
    }

    /// $\mu_1(x) - \mu_0(x)$ for each row of a column major matrix laid out in the
    /// fitted feature order.
    pub fn predict(&self, data: &Matrix<f64>) -> Vec<f64> {
        let (p_treatment, p_control) = rayon::join(
            || self.treatment.predict_proba(data),
            || self.control.predict_proba(data),
        );
        p_treatment
            .into_iter()
            .zip(p_control)
            .map(|(t, c)| (t - c).clamp(-1.0, 1.0))
            .collect()
    }
}

impl ConfigIO for FittedTLearner<GradientBooster> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::CustomerRecord;

    /// Always predicts its training base rate.
    #[derive(Debug, Clone, Default)]
    struct BaseRate {
        rate: f64,
    }

    impl BinaryProbabilityModel for BaseRate {
        fn fit(&mut self, _data: &Matrix<f64>, y: &[f64]) -> Result<(), UpliftError> {
            self.rate = y.iter().sum::<f64>() / y.len() as f64;
            Ok(())
        }

        fn predict_proba(&self, data: &Matrix<f64>) -> Vec<f64> {
            vec![self.rate; data.rows]
        }
    }

    fn record(treatment: bool, conversion: bool) -> CustomerRecord {
        CustomerRecord::new(30, 4, 100.0, 40, 50000.0, treatment, conversion)
    }

    #[test]
    fn test_arms_are_fit_separately() {
        let mut records = Vec::new();
        // Control: 1 of 4 converts. Treatment: 3 of 4.
        for i in 0..4 {
            records.push(record(false, i == 0));
            records.push(record(true, i != 0));
        }
        let ds = Dataset::from_records(records);
        let fitted = TLearner::new(BaseRate::default()).fit(&ds, &Feature::ALL).unwrap();
        assert_eq!(fitted.control.rate, 0.25);
        assert_eq!(fitted.treatment.rate, 0.75);
        let scores = fitted.score(&ds, &Feature::ALL).unwrap();
        assert_eq!(scores, vec![0.5; 8]);
    }

    #[test]
    fn test_single_class_arm_is_rejected() {
        let ds = Dataset::from_records(vec![
            record(false, true),
            record(false, false),
            record(true, true),
            record(true, true),
        ]);
        let err = TLearner::new(BaseRate::default()).fit(&ds, &Feature::ALL).unwrap_err();
        assert!(matches!(
            err,
            UpliftError::InsufficientData {
                arm: TreatmentArm::Treatment,
                ..
            }
        ));
        assert!(err.to_string().starts_with("Insufficient data for T-learner arm treatment"));
    }

    #[test]
    fn test_empty_control_arm_is_rejected() {
        let ds = Dataset::from_records(vec![record(true, true), record(true, false)]);
        let err = TLearner::new(BaseRate::default()).fit(&ds, &Feature::ALL).unwrap_err();
        assert!(matches!(
            err,
            UpliftError::InsufficientData {
                arm: TreatmentArm::Control,
                ..
            }
        ));
    }

    #[test]
    fn test_feature_lists_must_match() {
        let ds = Dataset::from_records(vec![
            record(false, true),
            record(false, false),
            record(true, true),
            record(true, false),
        ]);
        let learner = TLearner::new(BaseRate::default());
        let fitted = learner.fit(&ds, &[Feature::Age, Feature::Income]).unwrap();
        assert!(matches!(
            fitted.score(&ds, &[Feature::Income, Feature::Age]),
            Err(UpliftError::FeatureMismatch { .. })
        ));
        assert!(matches!(learner.fit(&ds, &[]), Err(UpliftError::InvalidParameter(..))));
    }

    #[test]
    fn test_annotate_attaches_scores() {
        let mut ds = Dataset::from_records(vec![
            record(false, false),
            record(false, false),
            record(false, true),
            record(true, true),
            record(true, false),
        ]);
        let fitted = TLearner::new(BaseRate::default()).fit(&ds, &Feature::ALL).unwrap();
        fitted.annotate(&mut ds, &Feature::ALL).unwrap();
        let scores = ds.uplift_scores().unwrap();
        assert_eq!(scores.len(), 5);
        assert!(scores.iter().all(|s| (*s - (0.5 - 1.0 / 3.0)).abs() < 1e-12));
    }
}
