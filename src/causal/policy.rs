//! Targeting Policy
//!
//! Turns uplift scores into a treat / don't treat decision. A record is targeted
//! when its score is strictly above the threshold; the decision for one record never
//! depends on any other record, so changing the threshold never requires refitting.
use crate::dataset::{CustomerRecord, Dataset};
use crate::errors::UpliftError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetingPolicy {
    pub threshold: f64,
}

impl TargetingPolicy {
    pub fn new(threshold: f64) -> Result<Self, UpliftError> {
        if threshold.is_nan() {
            return Err(UpliftError::InvalidParameter(
                "threshold".to_string(),
                "a real number".to_string(),
                "NaN".to_string(),
            ));
        }
        Ok(TargetingPolicy { threshold })
    }

    #[inline]
    pub fn is_targeted(&self, uplift: f64) -> bool {
        uplift > self.threshold
    }

    /// Indices of targeted scores, in input order.
    pub fn select(&self, scores: &[f64]) -> Vec<usize> {
        scores
            .iter()
            .enumerate()
            .filter(|(_, s)| self.is_targeted(**s))
            .map(|(i, _)| i)
            .collect()
    }

    /// Split indices into (targeted, ignored).
    pub fn partition(&self, scores: &[f64]) -> (Vec<usize>, Vec<usize>) {
        (0..scores.len()).partition(|&i| self.is_targeted(scores[i]))
    }

    /// Targeted records of an annotated dataset. An unscored dataset targets nobody.
    pub fn targeted<'a>(&self, dataset: &'a Dataset) -> Vec<&'a CustomerRecord> {
        let scores = dataset.uplift_scores().unwrap_or(&[]);
        self.select(scores).into_iter().map(|i| &dataset.records()[i]).collect()
    }

    /// Index of the targeted record with the highest uplift, if any record is targeted.
    pub fn best_lead(&self, scores: &[f64]) -> Option<usize> {
        rank_by_uplift(scores).into_iter().next().filter(|&i| self.is_targeted(scores[i]))
    }
}

/// Indices ordered by descending uplift; ties keep input order and NaN sorts last.
pub fn rank_by_uplift(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| match (scores[a].is_nan(), scores[b].is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => scores[b].total_cmp(&scores[a]),
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORES: [f64; 6] = [0.05, 0.4, -0.3, 0.1, 0.7, 0.1000001];

    #[test]
    fn test_threshold_is_strict() {
        let policy = TargetingPolicy::new(0.1).unwrap();
        assert_eq!(policy.select(&SCORES), vec![1, 4, 5]);
        let (targeted, ignored) = policy.partition(&SCORES);
        assert_eq!(targeted, vec![1, 4, 5]);
        assert_eq!(ignored, vec![0, 2, 3]);
    }

    #[test]
    fn test_targeting_is_monotone() {
        let thresholds = [-1.0, -0.3, 0.0, 0.1, 0.5, 1.0];
        for w in thresholds.windows(2) {
            let low = TargetingPolicy::new(w[0]).unwrap().select(&SCORES);
            let high = TargetingPolicy::new(w[1]).unwrap().select(&SCORES);
            assert!(high.iter().all(|i| low.contains(i)));
        }
        assert!(TargetingPolicy::new(1.0).unwrap().select(&SCORES).is_empty());
    }

    #[test]
    fn test_ranking_and_best_lead() {
        assert_eq!(rank_by_uplift(&SCORES), vec![4, 1, 5, 3, 0, 2]);
        assert_eq!(rank_by_uplift(&[f64::NAN, 0.2, 0.2]), vec![1, 2, 0]);
        assert_eq!(TargetingPolicy::new(0.0).unwrap().best_lead(&SCORES), Some(4));
        assert_eq!(TargetingPolicy::new(0.9).unwrap().best_lead(&SCORES), None);
        assert_eq!(TargetingPolicy::new(0.0).unwrap().best_lead(&[]), None);
    }

    #[test]
    fn test_nan_threshold_is_rejected() {
        assert!(TargetingPolicy::new(f64::NAN).is_err());
    }
}
