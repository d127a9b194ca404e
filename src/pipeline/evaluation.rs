//! Model evaluation stage

use super::Stage;
use crate::artifact::{save_json, Artifact};
use crate::config::{ModelEvaluationConfig, Selection};
use crate::error::{PipelineError, Result, StageContext};
use crate::metrics::RegressionMetrics;
use crate::training::{split_features_target, ElasticNet};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Hyperparameters as reported in the score record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HyperparameterRecord {
    pub alpha: f64,
    pub l1_ratio: f64,
    pub random_seed: u64,
    pub max_iter: usize,
    pub tol: f64,
    pub selection: Selection,
}

/// Model introspection fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelInfo {
    pub estimator_type: String,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub input_features_count: usize,
    pub iteration_count: usize,
    pub converged: bool,
    pub dual_gap: f64,
}

/// Score record written once per evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationRecord {
    pub model_name: String,
    pub hyperparameters: HyperparameterRecord,
    pub train_metrics: RegressionMetrics,
    pub test_metrics: RegressionMetrics,
    pub model_info: ModelInfo,
    pub evaluated_at: String,
}

/// Predictions and metrics for both splits
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub record: EvaluationRecord,
    pub train_predictions: Array1<f64>,
    pub test_predictions: Array1<f64>,
}

/// Score a fitted model on in-memory train and test arrays.
pub fn score_model(model: &ElasticNet, train: &Array2<f64>, test: &Array2<f64>) -> Result<Evaluation> {
    let (x_train, y_train) = split_features_target(train)?;
    let (x_test, y_test) = split_features_target(test)?;

    let train_predictions = model.predict(&x_train)?;
    let test_predictions = model.predict(&x_test)?;

    let train_metrics = RegressionMetrics::compute(&y_train, &train_predictions, x_train.ncols())?;
    let test_metrics = RegressionMetrics::compute(&y_test, &test_predictions, x_test.ncols())?;

    let (coefficients, intercept) = match (&model.coefficients, model.intercept) {
        (Some(c), Some(b)) => (c.to_vec(), b),
        _ => return Err(PipelineError::ModelNotFitted),
    };

    let params = model.params;
    let record = EvaluationRecord {
        model_name: "ElasticNet".to_string(),
        hyperparameters: HyperparameterRecord {
            alpha: params.hyperparameters.alpha,
            l1_ratio: params.hyperparameters.l1_ratio,
            random_seed: params.random_seed,
            max_iter: params.solver.max_iter,
            tol: params.solver.tol,
            selection: params.solver.selection,
        },
        train_metrics: train_metrics.rounded(),
        test_metrics: test_metrics.rounded(),
        model_info: ModelInfo {
            estimator_type: "regressor".to_string(),
            input_features_count: coefficients.len(),
            coefficients,
            intercept,
            iteration_count: model.n_iter,
            converged: model.converged,
            dual_gap: model.dual_gap,
        },
        evaluated_at: chrono::Utc::now().to_rfc3339(),
    };

    Ok(Evaluation {
        record,
        train_predictions,
        test_predictions,
    })
}

/// Output locations derived from the model file stem
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationPaths {
    pub train_predictions: PathBuf,
    pub test_predictions: PathBuf,
    pub scores: PathBuf,
}

impl EvaluationPaths {
    pub fn new(config: &ModelEvaluationConfig) -> Self {
        let stem = model_stem(&config.model_path);
        Self {
            train_predictions: config
                .predictions_dir
                .join(format!("{}_train_preds_arr.bin", stem)),
            test_predictions: config
                .predictions_dir
                .join(format!("{}_test_preds_arr.bin", stem)),
            scores: config.scores_dir.join(format!("{}_scores.json", stem)),
        }
    }
}

fn model_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}

/// Load the arrays and the model, score both splits and persist predictions
/// and the score record.
pub fn evaluate_model(config: &ModelEvaluationConfig) -> Result<EvaluationRecord> {
    const STAGE: &str = Stage::Evaluation.name();
    let train = Array2::<f64>::load(&config.train_array_path).in_stage(STAGE)?;
    let test = Array2::<f64>::load(&config.test_array_path).in_stage(STAGE)?;
    let model = ElasticNet::load(&config.model_path).in_stage(STAGE)?;

    let evaluation = score_model(&model, &train, &test).in_stage(STAGE)?;
    let paths = EvaluationPaths::new(config);

    evaluation.train_predictions.save(&paths.train_predictions).in_stage(STAGE)?;
    evaluation.test_predictions.save(&paths.test_predictions).in_stage(STAGE)?;
    save_json(&evaluation.record, &paths.scores).in_stage(STAGE)?;

    info!(
        train_r2 = evaluation.record.train_metrics.r2,
        test_r2 = evaluation.record.test_metrics.r2,
        test_rmse = evaluation.record.test_metrics.rmse,
        scores = %paths.scores.display(),
        "Model evaluated"
    );
    Ok(evaluation.record)
}
