//! Splitter
//!
//! Finds the best split of a node from its histograms using the second order gain.
use crate::data::JaggedMatrix;
use crate::histogram::{Bin, FeatureHistogram, NodeHistogram};
use crate::utils::{gain, weight};
use rayon::prelude::*;
use std::cmp::Ordering;

/// Gradient statistics of a (candidate) node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeInfo {
    pub gradient_sum: f32,
    pub hessian_sum: f32,
    pub counts: usize,
}

impl From<Bin> for NodeInfo {
    fn from(b: Bin) -> Self {
        NodeInfo {
            gradient_sum: b.gradient_sum,
            hessian_sum: b.hessian_sum,
            counts: b.counts as usize,
        }
    }
}

/// The best split found for a feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitInfo {
    pub split_feature: usize,
    /// Records with a bin strictly lower than this go left.
    pub split_bin: u16,
    /// Raw value equivalent of `split_bin`; values lower than this go left.
    pub split_value: f64,
    pub split_gain: f32,
    pub left_node: NodeInfo,
    pub right_node: NodeInfo,
}

impl SplitInfo {
    fn cmp_gain(&self, other: &SplitInfo) -> Ordering {
        // Ties resolve to the lowest feature index so the result never depends on
        // how the search was scheduled.
        self.split_gain
            .total_cmp(&other.split_gain)
            .then_with(|| other.split_feature.cmp(&self.split_feature))
            .then_with(|| other.split_bin.cmp(&self.split_bin))
    }
}

/// Histogram splitter with L2 regularised Newton gain.
#[derive(Debug, Clone)]
pub struct Splitter {
    /// L2 regularization on leaf weights.
    pub lambda: f32,
    /// Minimum records on each side of a split.
    pub min_leaf_size: usize,
    /// Minimum hessian sum on each side of a split.
    pub min_hessian: f32,
}

impl Splitter {
    /// Weight of a node with these statistics.
    pub fn node_weight(&self, node: &NodeInfo) -> f32 {
        weight(node.gradient_sum, node.hessian_sum, self.lambda)
    }

    fn admissible(&self, node: &NodeInfo) -> bool {
        node.counts >= self.min_leaf_size && node.hessian_sum >= self.min_hessian
    }

    /// Scan the bins of one feature from left to right.
    pub fn best_feature_split(
        &self,
        hist: &FeatureHistogram,
        cuts: &JaggedMatrix<f64>,
        parent: &NodeInfo,
    ) -> Option<SplitInfo> {
        let parent_gain = gain(parent.gradient_sum, parent.hessian_sum, self.lambda);
        let feature_cuts = cuts.get_col(hist.feature);
        let mut left = NodeInfo::default();
        let mut best: Option<SplitInfo> = None;

        for s in 1..hist.data.len() {
            let b = hist.data[s - 1];
            left.gradient_sum += b.gradient_sum;
            left.hessian_sum += b.hessian_sum;
            left.counts += b.counts as usize;
            if b.counts == 0 {
                continue;
            }
            let right = NodeInfo {
                gradient_sum: parent.gradient_sum - left.gradient_sum,
                hessian_sum: parent.hessian_sum - left.hessian_sum,
                counts: parent.counts - left.counts.min(parent.counts),
            };
            if !self.admissible(&left) || !self.admissible(&right) {
                continue;
            }
            let split_gain = gain(left.gradient_sum, left.hessian_sum, self.lambda)
                + gain(right.gradient_sum, right.hessian_sum, self.lambda)
                - parent_gain;
            if split_gain <= 0.0 || !split_gain.is_finite() {
                continue;
            }
            let candidate = SplitInfo {
                split_feature: hist.feature,
                split_bin: s as u16,
                split_value: feature_cuts[s - 1],
                split_gain,
                left_node: left,
                right_node: right,
            };
            if best.map_or(true, |b| candidate.cmp_gain(&b) == Ordering::Greater) {
                best = Some(candidate);
            }
        }
        best
    }

    /// Best split across all the features of a node, searched in parallel.
    pub fn best_split(&self, hist: &NodeHistogram, cuts: &JaggedMatrix<f64>, parent: &NodeInfo) -> Option<SplitInfo> {
        hist.features
            .par_iter()
            .filter_map(|h| self.best_feature_split(h, cuts, parent))
            .max_by(|a, b| a.cmp_gain(b))
    }
}
