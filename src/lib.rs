mod constants;

// Modules
pub mod binning;
pub mod booster;
pub mod causal;
pub mod config;
pub mod data;
pub mod dataset;
pub mod errors;
pub mod histogram;
pub mod marketer;
pub mod model;
pub mod objective;
pub mod sampler;
pub mod simulation;
pub mod splitter;
pub mod tree;
pub mod utils;

// Individual classes, and functions
pub use booster::{BoosterConfig, GradientBooster};
pub use causal::metalearners::{FittedTLearner, TLearner};
pub use causal::policy::TargetingPolicy;
pub use causal::{fit, score};
pub use config::{ConfigIO, UpliftConfig};
pub use data::Matrix;
pub use dataset::{CustomerRecord, Dataset, Feature, TreatmentArm};
pub use errors::UpliftError;
pub use model::BinaryProbabilityModel;
pub use simulation::segment::Segment;
pub use simulation::{generate, SimulationConfig, Simulator};
