//! Errors
//!
//! Custom error types used throughout the `conversion-uplift` crate.
use crate::dataset::TreatmentArm;
use thiserror::Error;

/// Errors that can occur while simulating, fitting or scoring.
#[derive(Debug, Error)]
pub enum UpliftError {
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// One of the T-learner arms cannot support a probability model.
    #[error("Insufficient data for T-learner arm {arm}: {reason}.")]
    InsufficientData { arm: TreatmentArm, reason: String },
    /// A classifier was asked to fit a target it cannot learn from.
    #[error("Unable to fit target: {0}.")]
    InvalidTarget(String),
    /// Scoring was requested with a different feature list than the one used to fit.
    #[error("Feature columns {provided} do not match the fitted feature columns {expected}.")]
    FeatureMismatch { expected: String, provided: String },
    /// A per-record vector does not line up with the dataset.
    #[error("Expected {expected} values, one per record, but {provided} were provided.")]
    LengthMismatch { expected: usize, provided: usize },
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// Unable to write model or config.
    #[error("Unable to write to file: {0}")]
    UnableToWrite(String),
    /// Unable to read model or config.
    #[error("Unable to read from file {0}")]
    UnableToRead(String),
    /// Remote copy generation failed. Only surfaced inside the marketing collaborator.
    #[error("External service error: {0}")]
    ExternalService(String),
}
