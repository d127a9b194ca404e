//! Column transformer: the numeric and categorical branches side by side

use super::{
    config::PreprocessingConfig,
    encoder::OneHotEncoder,
    imputer::Imputer,
    scaler::StandardScaler,
    FeaturePartition,
};
use crate::artifact::{Artifact, ArtifactKind};
use crate::error::{PipelineError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Build the unfitted transformation for a feature partition.
///
/// No data is touched until [`ColumnTransformer::fit`].
pub fn build_preprocessor(partition: &FeaturePartition) -> ColumnTransformer {
    ColumnTransformer::new(partition.clone())
}

/// Unfitted column-wise transformation
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTransformer {
    config: PreprocessingConfig,
    partition: FeaturePartition,
}

impl ColumnTransformer {
    pub fn new(partition: FeaturePartition) -> Self {
        Self::with_config(partition, PreprocessingConfig::default())
    }

    pub fn with_config(partition: FeaturePartition, config: PreprocessingConfig) -> Self {
        Self { config, partition }
    }

    pub fn partition(&self) -> &FeaturePartition {
        &self.partition
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Learn every statistic from `df`. Extra columns are ignored.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedPreprocessor> {
        let start = Instant::now();
        let frame = select_typed(df, &self.partition)?;

        let numeric = if self.partition.numeric_features.is_empty() {
            None
        } else {
            let cols = as_strs(&self.partition.numeric_features);
            let mut imputer = Imputer::new(self.config.numeric_impute_strategy);
            let imputed = imputer.fit_transform(&frame, &cols)?;
            let scaler = if self.config.scale_numeric {
                let mut scaler = StandardScaler::new(true);
                scaler.fit(&imputed, &cols)?;
                Some(scaler)
            } else {
                None
            };
            Some(NumericBranch { imputer, scaler })
        };

        let categorical = if self.partition.categorical_features.is_empty() {
            None
        } else {
            let cols = as_strs(&self.partition.categorical_features);
            let mut imputer = Imputer::new(self.config.categorical_impute_strategy);
            let imputed = imputer.fit_transform(&frame, &cols)?;
            let mut encoder = OneHotEncoder::new();
            let encoded = encoder.fit_transform(&imputed, &cols)?;
            let scaler = if self.config.scale_categorical {
                let names = encoder.output_names();
                let mut scaler = StandardScaler::new(false);
                scaler.fit(&encoded, &as_strs(&names))?;
                Some(scaler)
            } else {
                None
            };
            Some(CategoricalBranch {
                imputer,
                encoder,
                scaler,
            })
        };

        let mut feature_names_out = self.partition.numeric_features.clone();
        if let Some(branch) = &categorical {
            feature_names_out.extend(branch.encoder.output_names());
        }

        debug!(
            rows = df.height(),
            features_in = self.partition.len(),
            features_out = feature_names_out.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Preprocessor fitted"
        );

        Ok(FittedPreprocessor {
            partition: self.partition.clone(),
            numeric,
            categorical,
            feature_names_out,
            n_samples_seen: df.height(),
        })
    }

    /// Fit on `df` and transform it with the fitted result.
    pub fn fit_transform(&self, df: &DataFrame) -> Result<(FittedPreprocessor, Array2<f64>)> {
        let fitted = self.fit(df)?;
        let transformed = fitted.transform(df)?;
        Ok((fitted, transformed))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NumericBranch {
    imputer: Imputer,
    scaler: Option<StandardScaler>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CategoricalBranch {
    imputer: Imputer,
    encoder: OneHotEncoder,
    scaler: Option<StandardScaler>,
}

/// A fitted transformation. Immutable: there is no way to refit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    partition: FeaturePartition,
    numeric: Option<NumericBranch>,
    categorical: Option<CategoricalBranch>,
    feature_names_out: Vec<String>,
    n_samples_seen: usize,
}

impl FittedPreprocessor {
    /// Apply the fitted statistics to `df`.
    ///
    /// Output columns are the numeric features in partition order followed by
    /// the one-hot indicators, as given by [`Self::feature_names_out`].
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let frame = select_typed(df, &self.partition)?;
        let n_rows = df.height();
        let mut out = Array2::<f64>::zeros((n_rows, self.feature_names_out.len()));
        let mut col_idx = 0;

        if let Some(branch) = &self.numeric {
            let mut numeric = branch.imputer.transform(&frame)?;
            if let Some(scaler) = &branch.scaler {
                numeric = scaler.transform(&numeric)?;
            }
            for name in &self.partition.numeric_features {
                fill_output_column(&mut out, col_idx, &numeric, name)?;
                col_idx += 1;
            }
        }

        if let Some(branch) = &self.categorical {
            let imputed = branch.imputer.transform(&frame)?;
            let mut encoded = branch.encoder.transform(&imputed)?;
            if let Some(scaler) = &branch.scaler {
                encoded = scaler.transform(&encoded)?;
            }
            for name in branch.encoder.output_names() {
                fill_output_column(&mut out, col_idx, &encoded, &name)?;
                col_idx += 1;
            }
        }

        Ok(out)
    }

    pub fn partition(&self) -> &FeaturePartition {
        &self.partition
    }

    /// Output column names, in output order
    pub fn feature_names_out(&self) -> &[String] {
        &self.feature_names_out
    }

    pub fn n_features_in(&self) -> usize {
        self.partition.len()
    }

    pub fn n_features_out(&self) -> usize {
        self.feature_names_out.len()
    }

    /// Rows seen at fit time
    pub fn n_samples_seen(&self) -> usize {
        self.n_samples_seen
    }

    pub fn numeric_imputer(&self) -> Option<&Imputer> {
        self.numeric.as_ref().map(|b| &b.imputer)
    }

    pub fn numeric_scaler(&self) -> Option<&StandardScaler> {
        self.numeric.as_ref().and_then(|b| b.scaler.as_ref())
    }

    pub fn categorical_imputer(&self) -> Option<&Imputer> {
        self.categorical.as_ref().map(|b| &b.imputer)
    }

    pub fn encoder(&self) -> Option<&OneHotEncoder> {
        self.categorical.as_ref().map(|b| &b.encoder)
    }
}

impl Artifact for FittedPreprocessor {
    const KIND: ArtifactKind = ArtifactKind::Preprocessor;
}

fn as_strs(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}

/// Select the partition's columns and coerce them: numeric features to
/// `Float64` with NaN as null, categorical features to canonical text.
fn select_typed(df: &DataFrame, partition: &FeaturePartition) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(partition.len());

    for name in &partition.numeric_features {
        let series = df
            .column(name)
            .map_err(|_| PipelineError::FeatureNotFound(name.clone()))?
            .as_materialized_series();
        let numeric = series.strict_cast(&DataType::Float64).map_err(|_| {
            PipelineError::ValidationError(format!(
                "column '{}' contains values that are not numbers",
                name
            ))
        })?;
        let cleaned: Float64Chunked = numeric
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        columns.push(cleaned.with_name(name.as_str().into()).into_series().into_column());
    }

    for name in &partition.categorical_features {
        let series = df
            .column(name)
            .map_err(|_| PipelineError::FeatureNotFound(name.clone()))?
            .as_materialized_series();
        columns.push(categorical_text(series)?.into_column());
    }

    Ok(DataFrame::new(columns)?)
}

/// Render a categorical column as text that does not depend on its dtype.
///
/// Numbers print through `f64` so an integer code read from CSV and the same
/// code sent as a float both become `"1"`.
fn categorical_text(series: &Series) -> Result<Series> {
    let dtype = series.dtype();
    if !(dtype.is_integer() || dtype.is_float()) {
        return Ok(series.cast(&DataType::String)?);
    }

    let values = series.cast(&DataType::Float64)?;
    let text: StringChunked = values
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()).map(|x| x.to_string()))
        .collect();
    Ok(text.with_name(series.name().clone()).into_series())
}

fn fill_output_column(out: &mut Array2<f64>, idx: usize, df: &DataFrame, name: &str) -> Result<()> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::FeatureNotFound(name.to_string()))?;
    let ca = column.as_materialized_series().f64()?;

    for (row, value) in ca.into_iter().enumerate() {
        match value {
            Some(v) if v.is_finite() => out[[row, idx]] = v,
            _ => {
                return Err(PipelineError::ComputationError(format!(
                    "non-finite value in transformed column '{}' at row {}",
                    name, row
                )))
            }
        }
    }
    Ok(())
}
