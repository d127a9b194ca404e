//! Data preprocessing module
//!
//! Turns raw feature columns into the numeric matrix the model trains on:
//! - Feature classification from the declared schema
//! - Missing value imputation (median for numeric, most frequent for categorical)
//! - Standard scaling
//! - One-hot encoding with a fixed vocabulary
//!
//! [`build_preprocessor`] returns an unfitted [`ColumnTransformer`]; fitting it
//! yields a [`FittedPreprocessor`], which is the only type that can transform
//! data and the one persisted for serving.

mod config;
mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use config::PreprocessingConfig;
pub use encoder::OneHotEncoder;
pub use imputer::{FillValue, ImputeStrategy, Imputer};
pub use pipeline::{build_preprocessor, ColumnTransformer, FittedPreprocessor};
pub use scaler::{ScalerParams, StandardScaler};

use crate::config::{ColumnType, Schema};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Feature names split by type, each in schema declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturePartition {
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
}

impl FeaturePartition {
    pub fn new(numeric_features: Vec<String>, categorical_features: Vec<String>) -> Self {
        Self {
            numeric_features,
            categorical_features,
        }
    }

    /// Total number of features across both sides
    pub fn len(&self) -> usize {
        self.numeric_features.len() + self.categorical_features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric features followed by categorical features
    pub fn all_features(&self) -> impl Iterator<Item = &str> {
        self.numeric_features
            .iter()
            .chain(self.categorical_features.iter())
            .map(String::as_str)
    }
}

/// Split the schema's features into numeric and categorical names.
pub fn classify_features(schema: &Schema) -> FeaturePartition {
    let mut partition = FeaturePartition::default();
    for feature in schema.features() {
        match feature.dtype {
            ColumnType::Numeric => partition.numeric_features.push(feature.name.clone()),
            ColumnType::Categorical => partition.categorical_features.push(feature.name.clone()),
        }
    }

    info!(
        numeric = ?partition.numeric_features,
        categorical = ?partition.categorical_features,
        "Features classified"
    );
    partition
}
