//! Booster
//!
//! Histogram gradient boosting for binary outcomes: configuration, fitting and prediction.
pub mod config;
pub mod core;
mod predict;

pub use self::config::BoosterConfig;
pub use self::core::GradientBooster;
