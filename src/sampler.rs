//! Sampler
//!
//! Strategies for sampling rows and columns before fitting a new tree, allowing for
//! stochastic gradient boosting.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

// A sampler can be used to subset the data prior to fitting a new tree.
pub trait Sampler {
    /// Sample the data, returning a tuple, where the first item is the samples
    /// chosen for training, and the second are the samples excluded.
    fn sample(&mut self, rng: &mut StdRng, index: &[usize]) -> (Vec<usize>, Vec<usize>);
}

pub struct RandomSampler {
    subsample: f32,
}

impl RandomSampler {
    pub fn new(subsample: f32) -> Self {
        RandomSampler { subsample }
    }
}

impl Sampler for RandomSampler {
    fn sample(&mut self, rng: &mut StdRng, index: &[usize]) -> (Vec<usize>, Vec<usize>) {
        let subsample = self.subsample;
        let mut chosen = Vec::new();
        let mut excluded = Vec::new();
        for i in index {
            if rng.gen::<f32>() < subsample {
                chosen.push(*i);
            } else {
                excluded.push(*i)
            }
        }
        (chosen, excluded)
    }
}

/// Choose `amount` of the columns, returned in ascending order.
pub fn sample_columns(rng: &mut StdRng, n_cols: usize, amount: usize) -> Vec<usize> {
    let all: Vec<usize> = (0..n_cols).collect();
    let mut v: Vec<usize> = all.choose_multiple(rng, amount.min(n_cols)).copied().collect();
    v.sort_unstable();
    v
}
