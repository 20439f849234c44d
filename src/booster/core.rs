use crate::binning::bin_matrix;
use crate::booster::config::BoosterConfig;
use crate::config::ConfigIO;
use crate::constants::MIN_LOSS_IMPROVEMENT;
use crate::data::Matrix;
use crate::errors::UpliftError;
use crate::objective::ObjectiveFunction;
use crate::sampler::{sample_columns, RandomSampler, Sampler};
use crate::splitter::Splitter;
use crate::tree::{Tree, TreeStopper};
use crate::utils::fast_f64_sum;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Gradient boosted decision trees for a binary outcome.
///
/// Trees are grown on quantile binned features with second order (Newton) leaf
/// weights. Raw predictions are log odds; [`GradientBooster::predict_proba`]
/// maps them to probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBooster {
    /// Configuration used for fitting.
    pub cfg: BoosterConfig,
    /// Raw score every prediction starts from.
    pub base_score: f64,
    /// Fitted boosting rounds.
    pub trees: Vec<Tree>,
}

impl Default for GradientBooster {
    fn default() -> Self {
        GradientBooster {
            cfg: BoosterConfig::default(),
            base_score: 0.0,
            trees: Vec::new(),
        }
    }
}

impl GradientBooster {
    /// Create an unfitted booster after validating the configuration.
    pub fn new(cfg: BoosterConfig) -> Result<Self, UpliftError> {
        cfg.validate()?;
        Ok(GradientBooster {
            cfg,
            base_score: 0.0,
            trees: Vec::new(),
        })
    }

    fn validate_target(data: &Matrix<f64>, y: &[f64]) -> Result<(), UpliftError> {
        if y.len() != data.rows {
            return Err(UpliftError::LengthMismatch {
                expected: data.rows,
                provided: y.len(),
            });
        }
        if y.is_empty() {
            return Err(UpliftError::InvalidTarget("no records".to_string()));
        }
        if let Some(bad) = y.iter().find(|v| **v != 0.0 && **v != 1.0) {
            return Err(UpliftError::InvalidTarget(format!("expected 0 or 1 but found {bad}")));
        }
        let positives = y.iter().filter(|v| **v == 1.0).count();
        if positives == 0 || positives == y.len() {
            return Err(UpliftError::InvalidTarget("only one outcome class present".to_string()));
        }
        Ok(())
    }

    /// Fit the booster, discarding any previously fitted trees.
    ///
    /// * `data` - Column major feature matrix.
    /// * `y` - Binary target, one value (0 or 1) per row of `data`.
    pub fn fit(&mut self, data: &Matrix<f64>, y: &[f64]) -> Result<(), UpliftError> {
        Self::validate_target(data, y)?;
        let start = Instant::now();
        let objective_fn = self.cfg.objective;

        self.trees.clear();
        self.base_score = objective_fn.initial_value(y);

        let binned_data = bin_matrix(data, self.cfg.max_bin)?;
        let bdata = Matrix::new(&binned_data.binned_data, data.rows, data.cols);

        let mut yhat = vec![self.base_score; data.rows];
        let (mut grad, mut hess) = objective_fn.gradient(y, &yhat);
        let mut loss = objective_fn.loss(y, &yhat);
        let mut loss_avg = fast_f64_sum(&loss) / loss.len() as f32;

        let splitter = Splitter {
            lambda: self.cfg.l2_regularization,
            min_leaf_size: self.cfg.min_leaf_size,
            min_hessian: self.cfg.min_hessian,
        };
        let mut rng = StdRng::seed_from_u64(self.cfg.seed);
        let mut sampler = RandomSampler::new(self.cfg.subsample);
        let col_amount = ((data.cols as f32 * self.cfg.colsample_bytree).ceil() as usize).clamp(1, data.cols.max(1));
        let all_cols: Vec<usize> = (0..data.cols).collect();

        let mut stale_rounds = 0;
        for i in 0..self.cfg.iteration_limit {
            let verbose = self.cfg.log_iterations > 0 && i % self.cfg.log_iterations == 0;

            let index = if self.cfg.subsample < 1.0 {
                sampler.sample(&mut rng, &data.index).0
            } else {
                data.index.to_owned()
            };
            if index.is_empty() {
                continue;
            }
            let col_index = if col_amount == data.cols {
                all_cols.clone()
            } else {
                sample_columns(&mut rng, data.cols, col_amount)
            };

            let mut tree = Tree::new();
            tree.fit(
                &bdata,
                &binned_data,
                index,
                &col_index,
                &grad,
                &hess,
                &splitter,
                self.cfg.max_depth,
                self.cfg.learning_rate,
            );

            // If root node cannot be split due to no positive split gain, stop boosting.
            if tree.stopper == TreeStopper::RootLeaf && col_amount == data.cols {
                info!("Stopping at round {i}, no split with positive gain remains.");
                break;
            }

            tree.predict_binned(&bdata)
                .into_iter()
                .zip(yhat.iter_mut())
                .for_each(|(p, y_)| *y_ += p);
            (grad, hess) = objective_fn.gradient(y, &yhat);
            loss = objective_fn.loss(y, &yhat);
            let new_loss_avg = fast_f64_sum(&loss) / loss.len() as f32;

            if verbose {
                info!(
                    "round {:0?}, tree.nodes: {:1?}, tree.depth: {:2?}, loss: {:3?}",
                    i,
                    tree.nodes.len(),
                    tree.depth,
                    new_loss_avg,
                );
            }

            if loss_avg - new_loss_avg < MIN_LOSS_IMPROVEMENT {
                stale_rounds += 1;
            } else {
                stale_rounds = 0;
            }
            loss_avg = new_loss_avg;
            self.trees.push(tree);

            if self.cfg.stopping_rounds > 0 && stale_rounds >= self.cfg.stopping_rounds {
                info!("Auto stopping since stopping round limit reached.");
                break;
            }
        }

        debug!(
            "Finished training a booster with {} trees on {} rows in {:.3} seconds, training loss {:.5}.",
            self.trees.len(),
            data.rows,
            start.elapsed().as_secs_f32(),
            loss_avg,
        );
        Ok(())
    }

    /// Number of fitted boosting rounds.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl ConfigIO for GradientBooster {}
