//! Batch pipeline stages and the sequential runner
//!
//! Stages run strictly in order. Each one receives its own slice of the
//! configuration, and the runner stops at the first failure: the error is
//! wrapped with the failing stage, logged, and returned.

pub mod evaluation;
pub mod ingestion;
pub mod preparation;
pub mod trainer;
pub mod transformation;
pub mod validation;

pub use evaluation::{evaluate_model, score_model, EvaluationPaths, EvaluationRecord, ModelInfo};
pub use ingestion::check_raw_dataset;
pub use preparation::prepare_train_test_sets;
pub use trainer::{fit_model, train_model};
pub use transformation::{transform_frames, transform_train_test_data, TransformedData};
pub use validation::{validate_columns, validate_raw_dataset};

use crate::config::AppConfig;
use crate::error::{Result, StageContext};
use crate::utils::Timer;
use tracing::{error, info};

/// One step of the batch pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingestion,
    Validation,
    Preparation,
    Transformation,
    Training,
    Evaluation,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 6] = [
        Stage::Ingestion,
        Stage::Validation,
        Stage::Preparation,
        Stage::Transformation,
        Stage::Training,
        Stage::Evaluation,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Stage::Ingestion => "Data Ingestion",
            Stage::Validation => "Data Validation",
            Stage::Preparation => "Data Preparation",
            Stage::Transformation => "Data Transformation",
            Stage::Training => "Model Trainer",
            Stage::Evaluation => "Model Evaluation",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs pipeline stages against one resolved configuration
#[derive(Debug, Clone)]
pub struct PipelineRunner {
    config: AppConfig,
}

impl PipelineRunner {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run every stage in order, halting at the first failure.
    pub fn run_all(&self) -> Result<()> {
        let timer = Timer::start("Pipeline");
        for stage in Stage::ALL {
            self.run_stage(stage)?;
        }
        timer.stop();
        Ok(())
    }

    /// Run a single stage, wrapping any failure with the stage name.
    pub fn run_stage(&self, stage: Stage) -> Result<()> {
        info!(">>>>>> {} stage started <<<<<<", stage);
        let timer = Timer::start(format!("{} stage", stage));

        if let Err(err) = self.execute(stage).in_stage(stage.name()) {
            error!(stage = stage.name(), kind = ?err.kind(), "{}", err);
            return Err(err);
        }

        timer.stop();
        info!(">>>>>> {} stage completed <<<<<<", stage);
        Ok(())
    }

    fn execute(&self, stage: Stage) -> Result<()> {
        let stages = &self.config.stages;
        match stage {
            Stage::Ingestion => check_raw_dataset(&stages.data_ingestion).map(|_| ()),
            Stage::Validation => validate_raw_dataset(&stages.data_validation, &self.config.schema),
            Stage::Preparation => prepare_train_test_sets(
                &stages.data_preparation,
                self.config.params.random_seed,
            )
            .map(|_| ()),
            Stage::Transformation => {
                transform_train_test_data(&stages.data_transformation, &self.config.schema)
                    .map(|_| ())
            }
            Stage::Training => {
                train_model(&stages.model_trainer, &self.config.params).map(|_| ())
            }
            Stage::Evaluation => evaluate_model(&stages.model_evaluation).map(|_| ()),
        }
    }
}
