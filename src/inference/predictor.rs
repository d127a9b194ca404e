//! Single-row prediction from persisted artifacts

use crate::artifact::Artifact;
use crate::config::ModelPredictionConfig;
use crate::data::RawRow;
use crate::error::{PipelineError, Result};
use crate::preprocessing::FittedPreprocessor;
use crate::training::ElasticNet;
use ndarray::Array1;
use polars::prelude::DataFrame;
use std::sync::Arc;
use tracing::{debug, info};

/// Fitted preprocessor and model, loaded once and shared read-only.
///
/// Cloning is cheap; clones share the same artifacts.
#[derive(Debug, Clone)]
pub struct Predictor {
    preprocessor: Arc<FittedPreprocessor>,
    model: Arc<ElasticNet>,
}

impl Predictor {
    /// Pair a preprocessor with a model fitted on its output.
    pub fn new(preprocessor: FittedPreprocessor, model: ElasticNet) -> Result<Self> {
        let model_features = model.n_features_in().ok_or(PipelineError::ModelNotFitted)?;
        if model_features != preprocessor.n_features_out() {
            return Err(PipelineError::ShapeError {
                expected: format!("model over {} features", preprocessor.n_features_out()),
                actual: format!("model over {} features", model_features),
            });
        }
        Ok(Self {
            preprocessor: Arc::new(preprocessor),
            model: Arc::new(model),
        })
    }

    /// Load both artifacts from disk.
    pub fn load(config: &ModelPredictionConfig) -> Result<Self> {
        let preprocessor = FittedPreprocessor::load(&config.preprocessor_path)?;
        let model = ElasticNet::load(&config.model_path)?;
        let predictor = Self::new(preprocessor, model)?;

        info!(
            preprocessor = %config.preprocessor_path.display(),
            model = %config.model_path.display(),
            features_in = predictor.preprocessor.n_features_in(),
            "Predictor loaded"
        );
        Ok(predictor)
    }

    /// Raw columns every input row must carry
    pub fn required_columns(&self) -> Vec<&str> {
        self.preprocessor.partition().all_features().collect()
    }

    pub fn preprocessor(&self) -> &FittedPreprocessor {
        &self.preprocessor
    }

    pub fn model(&self) -> &ElasticNet {
        &self.model
    }

    /// Predict one raw row. Extra fields are ignored; absent required fields
    /// are rejected.
    pub fn predict(&self, row: &RawRow) -> Result<f64> {
        let present: Vec<&str> = row.names().collect();
        let missing: Vec<&str> = self
            .required_columns()
            .into_iter()
            .filter(|c| !present.contains(c))
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::InvalidInput(format!(
                "missing required input columns {:?}",
                missing
            )));
        }

        let predictions = self.predict_frame(&row.to_frame()?)?;
        let score = predictions[0];
        debug!(score, "Row predicted");
        Ok(score)
    }

    /// Predict every row of a raw frame.
    pub fn predict_frame(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let x = self.preprocessor.transform(df)?;
        self.model.predict(&x)
    }
}
