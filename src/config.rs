//! Configuration
//!
//! JSON persistence shared by configurations and fitted models, and the top level
//! configuration of one analysis run.
use crate::booster::BoosterConfig;
use crate::dataset::Feature;
use crate::errors::UpliftError;
use crate::simulation::SimulationConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// IO
pub trait ConfigIO: Serialize + DeserializeOwned + Sized {
    /// Save as a json object to a file.
    ///
    /// * `path` - Path to save to.
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), UpliftError> {
        fs::write(path, self.json_dump()?).map_err(|e| UpliftError::UnableToWrite(e.to_string()))
    }

    /// Dump as a json object
    fn json_dump(&self) -> Result<String, UpliftError> {
        serde_json::to_string(self).map_err(|e| UpliftError::UnableToWrite(e.to_string()))
    }

    /// Load from Json string
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, UpliftError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| UpliftError::UnableToRead(e.to_string()))
    }

    /// Load from a path to a json object.
    ///
    /// * `path` - Path to load from.
    fn load<P: AsRef<Path>>(path: P) -> Result<Self, UpliftError> {
        let json_str = fs::read_to_string(path).map_err(|e| UpliftError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

fn default_features() -> Vec<Feature> {
    Feature::ALL.to_vec()
}
fn default_threshold() -> f64 {
    0.1
}

/// Everything one "run simulation" action needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpliftConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Shared by both T-learner arms.
    #[serde(default)]
    pub booster: BoosterConfig,
    /// Feature columns, in order, used for both fit and score.
    #[serde(default = "default_features")]
    pub features: Vec<Feature>,
    /// Records with an uplift strictly above this are targeted.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for UpliftConfig {
    fn default() -> Self {
        UpliftConfig {
            simulation: SimulationConfig::default(),
            booster: BoosterConfig::default(),
            features: default_features(),
            threshold: default_threshold(),
        }
    }
}

impl UpliftConfig {
    pub fn validate(&self) -> Result<(), UpliftError> {
        self.simulation.validate()?;
        self.booster.validate()?;
        if self.features.is_empty() {
            return Err(UpliftError::InvalidParameter(
                "features".to_string(),
                "at least one feature column".to_string(),
                "[]".to_string(),
            ));
        }
        if self.threshold.is_nan() {
            return Err(UpliftError::InvalidParameter(
                "threshold".to_string(),
                "a real number".to_string(),
                "NaN".to_string(),
            ));
        }
        Ok(())
    }
}

impl ConfigIO for UpliftConfig {}
