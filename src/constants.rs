pub const HESSIAN_EPS: f32 = 1e-6;
pub const ITERATION_LIMIT: usize = 100;
pub const STOPPING_ROUNDS: usize = 5;
pub const MIN_LOSS_IMPROVEMENT: f32 = 1e-6;
pub const PROBABILITY_CLIP: f64 = 1e-15;
pub const TREATMENT_PROBABILITY: f64 = 0.5;
pub const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;
