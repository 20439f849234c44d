use crate::data::{JaggedMatrix, Matrix};
use crate::errors::UpliftError;
use crate::utils::{map_bin, percentiles};

/// If there are fewer unique values than their are
/// percentiles, just return the unique values of the
/// vectors.
///
/// * `v` - A numeric slice to calculate percentiles for.
/// * `pcts` - Percentiles to compute when there are many unique values.
fn percentiles_or_value(v: &[f64], pcts: &[f64]) -> Vec<f64> {
    let mut v_u = v.to_owned();
    v_u.sort_unstable_by(|a, b| a.total_cmp(b));
    v_u.dedup();
    if v_u.len() <= pcts.len() + 1 {
        v_u
    } else {
        percentiles(v, pcts)
    }
}

// Each feature is bucketed into bins 0..=N, where N is the number of cuts.
// A value lands in bin b when cuts[b - 1] <= value < cuts[b], so bin 0 holds
// anything below the first cut (and NaN, which the simulator never produces).
// The last cut is always f64::MAX. A split "bin < s" therefore translates to
// "value < cuts[s - 1]".
#[derive(Debug)]
pub struct BinnedData {
    pub binned_data: Vec<u16>,
    pub cuts: JaggedMatrix<f64>,
    pub nunique: Vec<usize>,
}

impl BinnedData {
    /// Number of histogram slots needed for a column.
    pub fn n_bins(&self, col: usize) -> usize {
        self.cuts.get_col(col).len() + 1
    }
}

/// Convert a matrix of data, into a binned matrix.
///
/// * `data` - Numeric data to be binned.
/// * `cuts` - Cut values for each of the columns.
fn bin_matrix_from_cuts(data: &Matrix<f64>, cuts: &JaggedMatrix<f64>) -> Result<Vec<u16>, UpliftError> {
    data.data
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let col = i / data.rows;
            map_bin(cuts.get_col(col), *v).ok_or_else(|| {
                UpliftError::InvalidParameter(
                    "max_bin".to_string(),
                    format!("fewer than {} bins", u16::MAX),
                    cuts.get_col(col).len().to_string(),
                )
            })
        })
        .collect()
}

/// Bin a numeric matrix.
///
/// * `data` - A numeric matrix, of data to be binned.
/// * `nbins` - The number of bins each column should be binned into.
pub fn bin_matrix(data: &Matrix<f64>, nbins: u16) -> Result<BinnedData, UpliftError> {
    if nbins < 2 {
        return Err(UpliftError::InvalidParameter(
            "max_bin".to_string(),
            "at least 2".to_string(),
            nbins.to_string(),
        ));
    }
    let pcts: Vec<f64> = (0..nbins).map(|i| f64::from(i) / f64::from(nbins)).collect();

    let mut cuts = JaggedMatrix::new();
    let mut nunique = Vec::with_capacity(data.cols);
    for i in 0..data.cols {
        let mut col_cuts = percentiles_or_value(data.get_col(i), &pcts);
        col_cuts.push(f64::MAX);
        col_cuts.dedup();
        nunique.push(col_cuts.len());
        cuts.push_col(col_cuts);
    }

    let binned_data = bin_matrix_from_cuts(data, &cuts)?;

    Ok(BinnedData {
        binned_data,
        cuts,
        nunique,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_data_respects_cuts() {
        let data_vec: Vec<f64> = (0..500)
            .map(|i| ((i * 37) % 211) as f64 * 0.5)
            .chain((0..500).map(|i| (i % 7) as f64))
            .collect();
        let data = Matrix::new(&data_vec, 500, 2);
        let b = bin_matrix(&data, 10).unwrap();
        let bdata = Matrix::new(&b.binned_data, data.rows, data.cols);
        for column in 0..data.cols {
            let mut b_compare = 1;
            for cuts in b.cuts.get_col(column).windows(2) {
                let (c1, c2) = (cuts[0], cuts[1]);
                let mut n_v = 0;
                let mut n_b = 0;
                for (bin, value) in bdata.get_col(column).iter().zip(data.get_col(column)) {
                    if *bin == b_compare {
                        n_b += 1;
                    }
                    if (c1 <= *value) && (*value < c2) {
                        n_v += 1;
                    }
                }
                assert_eq!(n_v, n_b);
                b_compare += 1;
            }
        }
    }

    #[test]
    fn test_low_cardinality_columns_keep_every_value() {
        let data_vec: Vec<f64> = (0..100).map(|i| (18 + i % 52) as f64).collect();
        let data = Matrix::new(&data_vec, 100, 1);
        let b = bin_matrix(&data, 256).unwrap();
        // 52 distinct ages plus the terminal f64::MAX cut.
        assert_eq!(b.nunique[0], 53);
        assert_eq!(b.n_bins(0), 54);
        assert!(b.binned_data.iter().all(|&x| x >= 1));
    }

    #[test]
    fn test_too_few_bins_is_rejected() {
        let data_vec = vec![1.0, 2.0];
        let data = Matrix::new(&data_vec, 2, 1);
        assert!(bin_matrix(&data, 1).is_err());
    }
}
