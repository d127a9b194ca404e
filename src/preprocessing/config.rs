//! Preprocessing configuration

use super::ImputeStrategy;
use serde::{Deserialize, Serialize};

/// Configuration for the column transformer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Strategy for filling missing numeric values
    pub numeric_impute_strategy: ImputeStrategy,

    /// Strategy for filling missing categorical values
    pub categorical_impute_strategy: ImputeStrategy,

    /// Standardize numeric columns after imputation
    pub scale_numeric: bool,

    /// Scale one-hot indicator columns to unit variance (never centered)
    pub scale_categorical: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            numeric_impute_strategy: ImputeStrategy::Median,
            categorical_impute_strategy: ImputeStrategy::MostFrequent,
            scale_numeric: true,
            scale_categorical: true,
        }
    }
}

impl PreprocessingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set numeric impute strategy
    pub fn with_numeric_impute(mut self, strategy: ImputeStrategy) -> Self {
        self.numeric_impute_strategy = strategy;
        self
    }

    /// Builder method to toggle numeric standardization
    pub fn with_numeric_scaling(mut self, enabled: bool) -> Self {
        self.scale_numeric = enabled;
        self
    }

    /// Builder method to toggle indicator scaling
    pub fn with_categorical_scaling(mut self, enabled: bool) -> Self {
        self.scale_categorical = enabled;
        self
    }
}
