//! Histogram
//!
//! Gradient and hessian statistics aggregated per feature bin, used to search splits
//! without revisiting raw feature values.
use crate::binning::BinnedData;
use crate::data::Matrix;
use rayon::prelude::*;
use std::ops::{AddAssign, Sub};

/// Struct to hold the information of a given bin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bin {
    /// Sum of gradients of the records in this bin.
    pub gradient_sum: f32,
    /// Sum of hessians of the records in this bin.
    pub hessian_sum: f32,
    /// Number of records in this bin.
    pub counts: u32,
}

impl AddAssign for Bin {
    fn add_assign(&mut self, other: Bin) {
        self.gradient_sum += other.gradient_sum;
        self.hessian_sum += other.hessian_sum;
        self.counts += other.counts;
    }
}

impl Sub for Bin {
    type Output = Bin;
    fn sub(self, other: Bin) -> Bin {
        Bin {
            gradient_sum: self.gradient_sum - other.gradient_sum,
            hessian_sum: self.hessian_sum - other.hessian_sum,
            counts: self.counts.saturating_sub(other.counts),
        }
    }
}

/// Histogram of a single feature.
#[derive(Debug, Clone)]
pub struct FeatureHistogram {
    /// Feature (column) this histogram describes.
    pub feature: usize,
    /// The histogram data, one slot per bin.
    pub data: Vec<Bin>,
}

impl FeatureHistogram {
    /// Accumulate the statistics of the records in `index` for one feature.
    ///
    /// * `feature` - Binned values of the feature, one per record.
    /// * `n_bins` - Number of bins of the feature.
    /// * `index` - Records that belong to the node.
    pub fn build(feature_idx: usize, feature: &[u16], n_bins: usize, index: &[usize], grad: &[f32], hess: &[f32]) -> Self {
        let mut data = vec![Bin::default(); n_bins];
        for &i in index {
            let b = &mut data[feature[i] as usize];
            b.gradient_sum += grad[i];
            b.hessian_sum += hess[i];
            b.counts += 1;
        }
        FeatureHistogram {
            feature: feature_idx,
            data,
        }
    }
}

/// Histograms of every sampled feature for one tree node.
#[derive(Debug, Clone)]
pub struct NodeHistogram {
    pub features: Vec<FeatureHistogram>,
}

impl NodeHistogram {
    /// Build the histogram of a node from scratch, one feature per task.
    pub fn build(
        bdata: &Matrix<u16>,
        binned: &BinnedData,
        col_index: &[usize],
        index: &[usize],
        grad: &[f32],
        hess: &[f32],
    ) -> Self {
        let features = col_index
            .par_iter()
            .map(|&col| FeatureHistogram::build(col, bdata.get_col(col), binned.n_bins(col), index, grad, hess))
            .collect();
        NodeHistogram { features }
    }

    /// Derive the histogram of a sibling by subtracting the already built child
    /// from its parent.
    pub fn from_parent_child(parent: &NodeHistogram, child: &NodeHistogram) -> Self {
        let features = parent
            .features
            .iter()
            .zip(child.features.iter())
            .map(|(p, c)| FeatureHistogram {
                feature: p.feature,
                data: p.data.iter().zip(c.data.iter()).map(|(pb, cb)| *pb - *cb).collect(),
            })
            .collect();
        NodeHistogram { features }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::bin_matrix;

    #[test]
    fn test_histogram_totals_match_node() {
        let data_vec: Vec<f64> = (0..200).map(|i| (i % 13) as f64).collect();
        let data = Matrix::new(&data_vec, 200, 1);
        let b = bin_matrix(&data, 256).unwrap();
        let bdata = Matrix::new(&b.binned_data, data.rows, data.cols);
        let grad: Vec<f32> = (0..200).map(|i| if i % 2 == 0 { 0.5 } else { -0.25 }).collect();
        let hess = vec![0.25_f32; 200];
        let index: Vec<usize> = (0..200).collect();

        let hist = NodeHistogram::build(&bdata, &b, &[0], &index, &grad, &hess);
        let total = hist.features[0].data.iter().fold(Bin::default(), |mut acc, b| {
            acc += *b;
            acc
        });
        assert_eq!(total.counts, 200);
        assert!((total.gradient_sum - 25.0).abs() < 1e-4);
        assert!((total.hessian_sum - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_sibling_by_subtraction() {
        let data_vec: Vec<f64> = (0..100).map(|i| (i % 10) as f64).collect();
        let data = Matrix::new(&data_vec, 100, 1);
        let b = bin_matrix(&data, 256).unwrap();
        let bdata = Matrix::new(&b.binned_data, data.rows, data.cols);
        let grad: Vec<f32> = (0..100).map(|i| i as f32 * 0.01).collect();
        let hess = vec![1.0_f32; 100];
        let all: Vec<usize> = (0..100).collect();
        let left: Vec<usize> = (0..40).collect();
        let right: Vec<usize> = (40..100).collect();

        let parent = NodeHistogram::build(&bdata, &b, &[0], &all, &grad, &hess);
        let child = NodeHistogram::build(&bdata, &b, &[0], &left, &grad, &hess);
        let direct = NodeHistogram::build(&bdata, &b, &[0], &right, &grad, &hess);
        let derived = NodeHistogram::from_parent_child(&parent, &child);
        for (d, e) in derived.features[0].data.iter().zip(direct.features[0].data.iter()) {
            assert_eq!(d.counts, e.counts);
            assert!((d.gradient_sum - e.gradient_sum).abs() < 1e-4);
            assert!((d.hessian_sum - e.hessian_sum).abs() < 1e-4);
        }
    }
}
