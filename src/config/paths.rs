//! Per-stage input and output locations

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the raw dataset comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataIngestionConfig {
    /// UCI repository identifier of the dataset
    pub uci_dataset_id: u32,
    /// Whether a fresh download was requested
    #[serde(default)]
    pub download: bool,
    /// Local copy of the raw dataset
    pub external_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataValidationConfig {
    pub external_path: PathBuf,
}

/// Train/test split of the raw dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPreparationConfig {
    pub external_path: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    /// Fraction of rows held out for the test set
    #[serde(default = "default_test_size")]
    pub test_size: f64,
}

fn default_test_size() -> f64 {
    0.2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTransformationConfig {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub train_array_path: PathBuf,
    pub test_array_path: PathBuf,
    pub preprocessor_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelTrainerConfig {
    pub train_array_path: PathBuf,
    pub model_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEvaluationConfig {
    pub train_array_path: PathBuf,
    pub test_array_path: PathBuf,
    pub model_path: PathBuf,
    pub scores_dir: PathBuf,
    pub predictions_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPredictionConfig {
    pub preprocessor_path: PathBuf,
    pub model_path: PathBuf,
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfigs {
    pub data_ingestion: DataIngestionConfig,
    pub data_validation: DataValidationConfig,
    pub data_preparation: DataPreparationConfig,
    pub data_transformation: DataTransformationConfig,
    pub model_trainer: ModelTrainerConfig,
    pub model_evaluation: ModelEvaluationConfig,
    pub model_prediction: ModelPredictionConfig,
}

impl StageConfigs {
    /// Parse from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let configs: Self = toml::from_str(text)?;
        configs.validate()?;
        Ok(configs)
    }

    fn validate(&self) -> Result<()> {
        let test_size = self.data_preparation.test_size;
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(PipelineError::ConfigError(format!(
                "data_preparation.test_size must lie strictly between 0 and 1, got {}",
                test_size
            )));
        }
        Ok(())
    }
}
