//! Pipeline configuration
//!
//! Three TOML files live in one configuration directory:
//! - `config.toml` - input/output locations for every stage
//! - `schema.toml` - declared feature and target datatypes
//! - `params.toml` - elastic-net hyperparameters and random seed
//!
//! Everything is parsed and validated once; stages receive the pieces they
//! need by value.

mod params;
mod paths;
mod schema;

pub use params::{params_from_toml, ElasticNetParams, Hyperparameters, Selection, SolverSettings};
pub use paths::{
    DataIngestionConfig, DataPreparationConfig, DataTransformationConfig, DataValidationConfig,
    ModelEvaluationConfig, ModelPredictionConfig, ModelTrainerConfig, StageConfigs,
};
pub use schema::{ColumnDecl, ColumnType, FeatureSpec, Schema};

use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "WINEQUALITY_CONFIG_DIR";

/// Default configuration directory, relative to the working directory
pub const DEFAULT_CONFIG_DIR: &str = "configs";

/// Fully resolved configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub stages: StageConfigs,
    pub schema: Schema,
    pub params: ElasticNetParams,
}

impl AppConfig {
    /// Load `config.toml`, `schema.toml` and `params.toml` from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let stages = StageConfigs::from_toml(&read_config_file(&dir.join("config.toml"))?)?;
        let schema = Schema::from_toml(&read_config_file(&dir.join("schema.toml"))?)?;
        let params = params_from_toml(&read_config_file(&dir.join("params.toml"))?)?;

        info!(
            config_dir = %dir.display(),
            features = schema.features().len(),
            target = schema.target(),
            "Configuration loaded"
        );

        Ok(Self {
            stages,
            schema,
            params,
        })
    }

    /// Resolve the configuration directory: explicit value, then environment, then default.
    pub fn resolve_dir(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR))
    }
}

fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        PipelineError::ConfigError(format!("cannot read {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(dir.path().join("nowhere")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(_)));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_shipped_configs_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_DIR);
        let config = AppConfig::load(dir).unwrap();
        assert_eq!(config.schema.features().len(), 12);
        assert_eq!(config.schema.target(), "quality");
        assert_eq!(config.schema.external_columns().len(), 13);
    }

    #[test]
    fn test_resolve_dir_prefers_explicit() {
        let dir = AppConfig::resolve_dir(Some(Path::new("/etc/wq")));
        assert_eq!(dir, PathBuf::from("/etc/wq"));
    }
}
