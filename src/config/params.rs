//! Elastic-net hyperparameters

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Order in which coordinates are visited during descent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// Visit features in column order every sweep
    #[default]
    Cyclic,
    /// Visit features in a seeded random order every sweep
    Random,
}

/// Regularization strength and mix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Overall regularization strength
    pub alpha: f64,
    /// Mix between L1 and L2 penalty (0 = ridge, 1 = lasso)
    pub l1_ratio: f64,
}

/// Coordinate descent solver settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    #[serde(default = "default_tol")]
    pub tol: f64,
    #[serde(default)]
    pub selection: Selection,
}

fn default_max_iter() -> usize {
    1000
}

fn default_tol() -> f64 {
    1e-4
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iter: default_max_iter(),
            tol: default_tol(),
            selection: Selection::default(),
        }
    }
}

/// The `[elasticnet]` table of `params.toml`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticNetParams {
    pub random_seed: u64,
    pub hyperparameters: Hyperparameters,
    #[serde(default)]
    pub solver: SolverSettings,
}

impl ElasticNetParams {
    pub fn new(alpha: f64, l1_ratio: f64, random_seed: u64) -> Self {
        Self {
            random_seed,
            hyperparameters: Hyperparameters { alpha, l1_ratio },
            solver: SolverSettings::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let Hyperparameters { alpha, l1_ratio } = self.hyperparameters;
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(PipelineError::ConfigError(format!(
                "elasticnet.hyperparameters.alpha must be a non-negative number, got {}",
                alpha
            )));
        }
        if !(0.0..=1.0).contains(&l1_ratio) {
            return Err(PipelineError::ConfigError(format!(
                "elasticnet.hyperparameters.l1_ratio must lie in [0, 1], got {}",
                l1_ratio
            )));
        }
        if self.solver.max_iter == 0 {
            return Err(PipelineError::ConfigError(
                "elasticnet.solver.max_iter must be positive".to_string(),
            ));
        }
        if !(self.solver.tol > 0.0) {
            return Err(PipelineError::ConfigError(format!(
                "elasticnet.solver.tol must be positive, got {}",
                self.solver.tol
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ParamsFile {
    elasticnet: ElasticNetParams,
}

/// Parse `params.toml`
pub fn params_from_toml(text: &str) -> Result<ElasticNetParams> {
    let file: ParamsFile = toml::from_str(text)?;
    file.elasticnet.validate()?;
    Ok(file.elasticnet)
}
