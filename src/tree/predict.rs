use super::Tree;
use crate::data::Matrix;
use rayon::prelude::*;

impl Tree {
    /// Raw score of one row of a column major matrix.
    #[inline]
    pub fn predict_row(&self, data: &Matrix<f64>, row: usize) -> f64 {
        let mut node_idx = 0;
        loop {
            let node = &self.nodes[node_idx];
            if node.is_leaf {
                return node.weight_value as f64;
            }
            node_idx = node.get_child_idx(*data.get(row, node.split_feature));
        }
    }

    /// Raw score of one row of binned data.
    #[inline]
    pub fn predict_row_binned(&self, data: &Matrix<u16>, row: usize) -> f64 {
        let mut node_idx = 0;
        loop {
            let node = &self.nodes[node_idx];
            if node.is_leaf {
                return node.weight_value as f64;
            }
            node_idx = node.get_child_idx_binned(*data.get(row, node.split_feature));
        }
    }

    pub fn predict(&self, data: &Matrix<f64>) -> Vec<f64> {
        data.index.par_iter().map(|&i| self.predict_row(data, i)).collect()
    }

    pub fn predict_binned(&self, data: &Matrix<u16>) -> Vec<f64> {
        data.index.par_iter().map(|&i| self.predict_row_binned(data, i)).collect()
    }
}
