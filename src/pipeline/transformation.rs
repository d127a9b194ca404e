//! Fit the preprocessor on the training set and transform both splits

use super::Stage;
use crate::artifact::Artifact;
use crate::config::{DataTransformationConfig, Schema};
use crate::data::{column_as_f64, load_csv};
use crate::error::{PipelineError, Result, StageContext};
use crate::preprocessing::{build_preprocessor, classify_features, FittedPreprocessor};
use ndarray::{concatenate, Array1, Array2, Axis};
use polars::prelude::DataFrame;
use tracing::info;

/// Result of transforming a train/test pair
#[derive(Debug, Clone)]
pub struct TransformedData {
    pub preprocessor: FittedPreprocessor,
    /// Transformed training features with the target as last column
    pub train: Array2<f64>,
    /// Transformed test features with the target as last column
    pub test: Array2<f64>,
}

/// Transform in-memory train and test frames.
///
/// Statistics come from `train` only; `test` is transformed with them.
pub fn transform_frames(train: &DataFrame, test: &DataFrame, schema: &Schema) -> Result<TransformedData> {
    ensure_columns(train, schema, "train")?;
    ensure_columns(test, schema, "test")?;

    let partition = classify_features(schema);
    let (preprocessor, train_x) = build_preprocessor(&partition).fit_transform(train)?;
    let test_x = preprocessor.transform(test)?;

    let train = attach_target(train_x, column_as_f64(train, schema.target())?)?;
    let test = attach_target(test_x, column_as_f64(test, schema.target())?)?;

    Ok(TransformedData {
        preprocessor,
        train,
        test,
    })
}

/// Read the train/test CSV files, transform them and persist the fitted
/// preprocessor plus both arrays.
pub fn transform_train_test_data(
    config: &DataTransformationConfig,
    schema: &Schema,
) -> Result<TransformedData> {
    const STAGE: &str = Stage::Transformation.name();
    let train_df = load_csv(&config.train_path).in_stage(STAGE)?;
    let test_df = load_csv(&config.test_path).in_stage(STAGE)?;

    let data = transform_frames(&train_df, &test_df, schema).in_stage(STAGE)?;

    data.preprocessor.save(&config.preprocessor_path).in_stage(STAGE)?;
    data.train.save(&config.train_array_path).in_stage(STAGE)?;
    data.test.save(&config.test_array_path).in_stage(STAGE)?;

    info!(
        train_shape = ?data.train.dim(),
        test_shape = ?data.test.dim(),
        features_out = data.preprocessor.n_features_out(),
        preprocessor = %config.preprocessor_path.display(),
        "Train and test data transformed"
    );
    Ok(data)
}

/// Fail when a declared feature or the target is absent from the frame.
fn ensure_columns(df: &DataFrame, schema: &Schema, split: &str) -> Result<()> {
    let present: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
    let missing: Vec<&str> = schema
        .feature_names()
        .into_iter()
        .chain(std::iter::once(schema.target()))
        .filter(|name| !present.contains(name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::ValidationError(format!(
            "{} data is missing schema columns {:?}",
            split, missing
        )))
    }
}

fn attach_target(features: Array2<f64>, target: Vec<f64>) -> Result<Array2<f64>> {
    let target = Array1::from_vec(target).insert_axis(Axis(1));
    Ok(concatenate(Axis(1), &[features.view(), target.view()])?)
}
