//! Error types for the wine quality pipeline

use std::panic::Location;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Coarse classification of every failure the pipeline can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed configuration, schema or hyperparameters
    Config,
    /// Data disagrees with the declared schema, or serving input is invalid
    Validation,
    /// Artifact or data file could not be read or written
    Io,
    /// Numeric failure during fit, transform, training or evaluation
    Computation,
}

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Artifact missing: {0}")]
    ArtifactMissing(String),

    #[error("Corrupt artifact {path}: {reason}")]
    CorruptArtifact { path: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("{stage} stage failed at {location}: {source}")]
    Stage {
        stage: &'static str,
        location: &'static Location<'static>,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Wrap this error with its stage and the place it surfaced. An error
    /// that already carries a stage keeps its original location.
    pub fn at_stage(self, stage: &'static str, location: &'static Location<'static>) -> Self {
        match self {
            tagged @ PipelineError::Stage { .. } => tagged,
            other => PipelineError::Stage {
                stage,
                location,
                source: Box::new(other),
            },
        }
    }

    /// Classify the error. Stage wrappers report the kind of their cause.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::ConfigError(_) => ErrorKind::Config,
            PipelineError::ValidationError(_)
            | PipelineError::DataError(_)
            | PipelineError::FeatureNotFound(_)
            | PipelineError::ShapeError { .. }
            | PipelineError::InvalidInput(_) => ErrorKind::Validation,
            PipelineError::IoError(_)
            | PipelineError::ArtifactMissing(_)
            | PipelineError::CorruptArtifact { .. }
            | PipelineError::SerializationError(_) => ErrorKind::Io,
            PipelineError::ComputationError(_) | PipelineError::ModelNotFitted => {
                ErrorKind::Computation
            }
            PipelineError::Stage { source, .. } => source.kind(),
        }
    }

    /// The innermost error, skipping stage wrappers.
    pub fn root(&self) -> &PipelineError {
        match self {
            PipelineError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Tag a failing result with its stage and the caller's source location.
pub trait StageContext<T> {
    fn in_stage(self, stage: &'static str) -> Result<T>;
}

impl<T> StageContext<T> for Result<T> {
    #[track_caller]
    fn in_stage(self, stage: &'static str) -> Result<T> {
        let location = Location::caller();
        self.map_err(|e| e.at_stage(stage, location))
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        PipelineError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for PipelineError {
    fn from(err: bincode::Error) -> Self {
        PipelineError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for PipelineError {
    fn from(err: toml::de::Error) -> Self {
        PipelineError::ConfigError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PipelineError {
    fn from(err: ndarray::ShapeError) -> Self {
        PipelineError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
