//! Dataset
//!
//! The customer population table shared by the simulator and the estimator.
//! Records are immutable once created; the only thing a dataset gains after
//! generation is the uplift score annotation.
use crate::errors::UpliftError;
use crate::simulation::segment::{assign_segment, Segment};
use crate::utils::items_to_strings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Observed feature columns a model may be fit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Recency,
    Frequency,
    Amount,
    Age,
    Income,
}

impl Feature {
    /// The five observed features, in their canonical column order.
    pub const ALL: [Feature; 5] = [
        Feature::Recency,
        Feature::Frequency,
        Feature::Amount,
        Feature::Age,
        Feature::Income,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::Recency => "Recency",
            Feature::Frequency => "Frequency",
            Feature::Amount => "Amount",
            Feature::Age => "Age",
            Feature::Income => "Income",
        }
    }

    /// Read this feature off a record.
    #[inline]
    pub fn value(&self, record: &CustomerRecord) -> f64 {
        match self {
            Feature::Recency => f64::from(record.recency),
            Feature::Frequency => f64::from(record.frequency),
            Feature::Amount => record.amount,
            Feature::Age => f64::from(record.age),
            Feature::Income => record.income,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = UpliftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = Feature::ALL.iter().map(|f| f.name()).collect();
                UpliftError::ParseString(s.to_string(), "Feature".to_string(), items_to_strings(&names))
            })
    }
}

/// Render a feature list for error messages.
pub(crate) fn feature_list(features: &[Feature]) -> String {
    let names: Vec<&str> = features.iter().map(|f| f.name()).collect();
    format!("[{}]", items_to_strings(&names))
}

/// The two arms of the experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreatmentArm {
    /// No coupon.
    Control,
    /// Received the coupon.
    Treatment,
}

impl TreatmentArm {
    pub fn from_treated(treated: bool) -> Self {
        if treated {
            TreatmentArm::Treatment
        } else {
            TreatmentArm::Control
        }
    }

    pub fn is_treated(&self) -> bool {
        matches!(self, TreatmentArm::Treatment)
    }
}

impl fmt::Display for TreatmentArm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreatmentArm::Control => f.write_str("control"),
            TreatmentArm::Treatment => f.write_str("treatment"),
        }
    }
}

/// One row of the population table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Days since last visit.
    pub recency: u32,
    /// Visits in the observation window.
    pub frequency: u32,
    /// Average spend. Not clamped, so the far tail may be negative.
    pub amount: f64,
    pub age: u32,
    pub income: f64,
    /// Latent segment, derived from the features.
    pub segment: Segment,
    pub treatment: bool,
    pub conversion: bool,
}

impl CustomerRecord {
    /// Create a record, deriving its segment from the features.
    pub fn new(
        recency: u32,
        frequency: u32,
        amount: f64,
        age: u32,
        income: f64,
        treatment: bool,
        conversion: bool,
    ) -> Self {
        CustomerRecord {
            recency,
            frequency,
            amount,
            age,
            income,
            segment: assign_segment(recency, frequency, age, income),
            treatment,
            conversion,
        }
    }

    pub fn arm(&self) -> TreatmentArm {
        TreatmentArm::from_treated(self.treatment)
    }
}

/// A population of customer records and, once scored, their uplift.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<CustomerRecord>,
    uplift_scores: Option<Vec<f64>>,
}

impl Dataset {
    pub fn from_records(records: Vec<CustomerRecord>) -> Self {
        Dataset {
            records,
            uplift_scores: None,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CustomerRecord> {
        self.records.iter()
    }

    /// Column major feature values for the given columns, ready for `Matrix::new`.
    pub fn feature_matrix(&self, features: &[Feature]) -> Vec<f64> {
        let mut data = Vec::with_capacity(self.records.len() * features.len());
        for f in features {
            data.extend(self.records.iter().map(|r| f.value(r)));
        }
        data
    }

    /// Conversion outcome as 0.0 / 1.0.
    pub fn outcomes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.conversion as u8 as f64).collect()
    }

    /// Indices of the records that belong to an arm.
    pub fn arm_indices(&self, arm: TreatmentArm) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.arm() == arm)
            .map(|(i, _)| i)
            .collect()
    }

    /// Attach one uplift score per record, replacing any earlier annotation.
    pub fn annotate_uplift(&mut self, scores: Vec<f64>) -> Result<(), UpliftError> {
        if scores.len() != self.records.len() {
            return Err(UpliftError::LengthMismatch {
                expected: self.records.len(),
                provided: scores.len(),
            });
        }
        self.uplift_scores = Some(scores);
        Ok(())
    }

    pub fn uplift_scores(&self) -> Option<&[f64]> {
        self.uplift_scores.as_deref()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a CustomerRecord;
    type IntoIter = std::slice::Iter<'a, CustomerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
