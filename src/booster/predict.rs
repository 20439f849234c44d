use crate::booster::core::GradientBooster;
use crate::data::Matrix;
use crate::utils::odds;
use rayon::prelude::*;

impl GradientBooster {
    /// Raw log odds predictions, one per row of `data`.
    pub fn predict_log_odds(&self, data: &Matrix<f64>) -> Vec<f64> {
        data.index
            .par_iter()
            .map(|&i| self.base_score + self.trees.iter().map(|t| t.predict_row(data, i)).sum::<f64>())
            .collect()
    }

    /// Probability of the positive class, one per row of `data`.
    pub fn predict_proba(&self, data: &Matrix<f64>) -> Vec<f64> {
        self.predict_log_odds(data).into_iter().map(odds).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::booster::core::GradientBooster;
    use crate::data::Matrix;

    #[test]
    fn test_unfitted_booster_predicts_base_score() {
        let booster = GradientBooster::default();
        let data_vec = vec![1.0, 2.0, 3.0];
        let data = Matrix::new(&data_vec, 3, 1);
        assert_eq!(booster.predict_log_odds(&data), vec![0.0; 3]);
        assert_eq!(booster.predict_proba(&data), vec![0.5; 3]);
    }

    #[test]
    fn test_probabilities_stay_in_unit_interval() {
        let n = 300;
        let data_vec: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..n).map(|i| if i < 150 { 0.0 } else { 1.0 }).collect();
        let data = Matrix::new(&data_vec, n, 1);
        let mut booster = GradientBooster::default();
        booster.fit(&data, &y).unwrap();

        let far_vec = vec![-1e9, 1e9, f64::NAN];
        let far = Matrix::new(&far_vec, 3, 1);
        let p = booster.predict_proba(&far);
        assert!(p.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(p[0] < 0.5);
        assert!(p[1] > 0.5);
    }
}
