//! Evaluation
//!
//! Aggregate views of an experiment: how each arm converted, and how the estimated
//! uplift compares with the designed effect of every latent segment.
use crate::dataset::{CustomerRecord, Dataset, TreatmentArm};
use crate::errors::UpliftError;
use crate::simulation::segment::Segment;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Records and conversions observed in one arm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmSummary {
    pub records: usize,
    pub conversions: usize,
}

impl ArmSummary {
    fn add(&mut self, record: &CustomerRecord) {
        self.records += 1;
        self.conversions += record.conversion as usize;
    }

    /// `None` for an empty arm.
    pub fn conversion_rate(&self) -> Option<f64> {
        (self.records > 0).then(|| self.conversions as f64 / self.records as f64)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub control: ArmSummary,
    pub treatment: ArmSummary,
}

impl ExperimentSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut summary = ExperimentSummary::default();
        for record in dataset {
            summary.arm_mut(record.arm()).add(record);
        }
        summary
    }

    pub fn arm(&self, arm: TreatmentArm) -> &ArmSummary {
        match arm {
            TreatmentArm::Control => &self.control,
            TreatmentArm::Treatment => &self.treatment,
        }
    }

    fn arm_mut(&mut self, arm: TreatmentArm) -> &mut ArmSummary {
        match arm {
            TreatmentArm::Control => &mut self.control,
            TreatmentArm::Treatment => &mut self.treatment,
        }
    }

    /// Treated conversion rate minus control conversion rate.
    pub fn observed_lift(&self) -> Option<f64> {
        Some(self.treatment.conversion_rate()? - self.control.conversion_rate()?)
    }
}

/// Estimator versus ground truth for one latent segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub segment: Segment,
    pub records: usize,
    /// Designed effect of the coupon.
    pub true_uplift: f64,
    /// Difference in conversion rates between arms within the segment.
    pub observed_lift: Option<f64>,
    /// Mean uplift score, when scores were supplied.
    pub mean_estimated_uplift: Option<f64>,
}

#[derive(Default)]
struct SegmentAccumulator {
    arms: ExperimentSummary,
    score_sum: f64,
}

/// Summaries for every segment present in the dataset, in [`Segment::ALL`] order.
///
/// * `scores` - Optional uplift scores, one per record. Defaults to the dataset's own
///   annotation when `None`.
pub fn segment_summaries(dataset: &Dataset, scores: Option<&[f64]>) -> Result<Vec<SegmentSummary>, UpliftError> {
    let scores = scores.or(dataset.uplift_scores());
    if let Some(s) = scores {
        if s.len() != dataset.len() {
            return Err(UpliftError::LengthMismatch {
                expected: dataset.len(),
                provided: s.len(),
            });
        }
    }

    let mut acc: HashMap<Segment, SegmentAccumulator> = HashMap::new();
    for (i, record) in dataset.iter().enumerate() {
        let entry = acc.entry(record.segment).or_default();
        entry.arms.arm_mut(record.arm()).add(record);
        if let Some(s) = scores {
            entry.score_sum += s[i];
        }
    }

    Ok(Segment::ALL
        .iter()
        .filter_map(|segment| {
            let a = acc.get(segment)?;
            let records = a.arms.control.records + a.arms.treatment.records;
            Some(SegmentSummary {
                segment: *segment,
                records,
                true_uplift: segment.true_uplift(),
                observed_lift: a.arms.observed_lift(),
                mean_estimated_uplift: scores.map(|_| a.score_sum / records as f64),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persuadable(treatment: bool, conversion: bool) -> CustomerRecord {
        CustomerRecord::new(10, 2, 90.0, 25, 30000.0, treatment, conversion)
    }

    fn loyal(treatment: bool, conversion: bool) -> CustomerRecord {
        CustomerRecord::new(10, 18, 90.0, 45, 90000.0, treatment, conversion)
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            persuadable(true, true),
            persuadable(true, true),
            persuadable(false, false),
            persuadable(false, true),
            loyal(true, true),
            loyal(false, true),
        ])
    }

    #[test]
    fn test_experiment_summary() {
        let summary = ExperimentSummary::from_dataset(&sample());
        assert_eq!(summary.treatment, ArmSummary { records: 3, conversions: 3 });
        assert_eq!(summary.arm(TreatmentArm::Control).conversions, 2);
        let lift = summary.observed_lift().unwrap();
        assert!((lift - (1.0 - 2.0 / 3.0)).abs() < 1e-12);
        assert_eq!(ExperimentSummary::from_dataset(&Dataset::default()).observed_lift(), None);
    }

    #[test]
    fn test_segment_summaries() {
        let ds = sample();
        let scores = [0.6, 0.5, 0.7, 0.6, 0.0, 0.1];
        let summaries = segment_summaries(&ds, Some(scores.as_slice())).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].segment, Segment::SureThing);
        assert_eq!(summaries[0].records, 2);
        assert_eq!(summaries[0].observed_lift, Some(0.0));
        assert!((summaries[0].mean_estimated_uplift.unwrap() - 0.05).abs() < 1e-12);
        assert_eq!(summaries[1].segment, Segment::Persuadable);
        assert_eq!(summaries[1].observed_lift, Some(0.5));
        assert!((summaries[1].true_uplift - 0.7).abs() < 1e-12);
        assert!((summaries[1].mean_estimated_uplift.unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_segment_summaries_without_scores() {
        let summaries = segment_summaries(&sample(), None).unwrap();
        assert!(summaries.iter().all(|s| s.mean_estimated_uplift.is_none()));
        assert!(matches!(
            segment_summaries(&sample(), Some(&[0.1][..])),
            Err(UpliftError::LengthMismatch { .. })
        ));
    }
}
