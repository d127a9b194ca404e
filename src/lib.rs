//! Wine quality - tabular regression pipeline
//!
//! This crate trains and serves an elastic-net model that scores wine
//! quality from physicochemical measurements:
//! - Schema-driven feature classification and preprocessing
//! - Elastic-net training by coordinate descent
//! - Regression evaluation with persisted score records
//! - Single-row prediction that replays the fitted transformation
//!
//! # Modules
//!
//! ## Pipeline
//! - [`config`] - Stage paths, column schema and hyperparameters
//! - [`data`] - CSV loading, raw rows and train/test splitting
//! - [`preprocessing`] - Imputation, scaling and one-hot encoding
//! - [`training`] - Elastic-net regression
//! - [`metrics`] - Regression metrics
//! - [`pipeline`] - Sequential stages and the runner
//! - [`artifact`] - Versioned binary artifacts on disk
//!
//! ## Services
//! - [`inference`] - Prediction from persisted artifacts
//! - [`server`] - HTTP prediction API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Pipeline
pub mod artifact;
pub mod config;
pub mod data;
pub mod metrics;
pub mod pipeline;
pub mod preprocessing;
pub mod training;
pub mod utils;

// Services
pub mod cli;
pub mod inference;
pub mod server;

pub use error::{PipelineError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{ErrorKind, PipelineError, Result, StageContext};

    pub use crate::artifact::Artifact;
    pub use crate::config::{AppConfig, ElasticNetParams, Schema, StageConfigs};
    pub use crate::data::{RawRow, RawValue};

    pub use crate::preprocessing::{
        build_preprocessor, classify_features, ColumnTransformer, FeaturePartition,
        FittedPreprocessor, PreprocessingConfig,
    };
    pub use crate::training::ElasticNet;
    pub use crate::metrics::RegressionMetrics;

    pub use crate::pipeline::{PipelineRunner, Stage};
    pub use crate::inference::{PredictionForm, PredictionOutcome, Predictor};
}
