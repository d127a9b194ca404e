//! One-hot encoding

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder with a vocabulary fixed at fit time.
///
/// Each fitted column is replaced by one `Float64` indicator column per
/// category, named `{column}_{category}`, in sorted category order. A value
/// outside the vocabulary (or a null) encodes as all zeros.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<(String, Vec<String>)>,
    is_fitted: bool,
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        let mut categories = Vec::with_capacity(columns.len());
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::FeatureNotFound(col_name.to_string()))?;
            let vocab: BTreeSet<&str> = column
                .as_materialized_series()
                .str()?
                .into_iter()
                .flatten()
                .collect();
            if vocab.is_empty() {
                return Err(PipelineError::ComputationError(format!(
                    "column '{}' has no categories to encode",
                    col_name
                )));
            }
            categories.push((
                col_name.to_string(),
                vocab.into_iter().map(str::to_string).collect(),
            ));
        }

        self.categories = categories;
        self.is_fitted = true;
        Ok(self)
    }

    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (col_name, vocab) in &self.categories {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::FeatureNotFound(col_name.clone()))?;
            let ca = column.as_materialized_series().str()?;

            for category in vocab {
                let indicator: Float64Chunked = ca
                    .into_iter()
                    .map(|v| Some(if v == Some(category.as_str()) { 1.0 } else { 0.0 }))
                    .collect();
                let name = indicator_name(col_name, category);
                result.with_column(indicator.with_name(name.into()).into_series())?;
            }
            result = result.drop(col_name)?;
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Learned vocabulary for `column`, sorted
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v.as_slice())
    }

    /// Indicator column names, in output order
    pub fn output_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|(col, vocab)| vocab.iter().map(move |cat| indicator_name(col, cat)))
            .collect()
    }
}

fn indicator_name(column: &str, category: &str) -> String {
    format!("{}_{}", column, category)
}
