//! Standard scaling

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Statistics learned for one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    /// Training mean
    pub mean: f64,
    /// Population standard deviation, 1.0 for constant columns
    pub scale: f64,
}

/// Z-score scaler over `Float64` columns.
///
/// With `with_mean` off the column is only divided by its standard deviation,
/// which keeps zeros at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    with_mean: bool,
    params: Vec<(String, ScalerParams)>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new(with_mean: bool) -> Self {
        Self {
            with_mean,
            params: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        let mut params = Vec::with_capacity(columns.len());
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::FeatureNotFound(col_name.to_string()))?;
            params.push((
                col_name.to_string(),
                compute_params(col_name, column.as_materialized_series())?,
            ));
        }

        self.params = params;
        self.is_fitted = true;
        Ok(self)
    }

    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (col_name, params) in &self.params {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::FeatureNotFound(col_name.clone()))?;
            let scaled = self.scale_series(column.as_materialized_series(), params)?;
            result.with_column(scaled)?;
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn params(&self, column: &str) -> Option<&ScalerParams> {
        self.params
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, p)| p)
    }

    pub fn with_mean(&self) -> bool {
        self.with_mean
    }

    fn scale_series(&self, series: &Series, params: &ScalerParams) -> Result<Series> {
        let center = if self.with_mean { params.mean } else { 0.0 };
        let scaled: Float64Chunked = series
            .f64()?
            .into_iter()
            .map(|opt| opt.map(|v| (v - center) / params.scale))
            .collect();

        Ok(scaled.with_name(series.name().clone()).into_series())
    }
}

fn compute_params(name: &str, series: &Series) -> Result<ScalerParams> {
    let ca = series.f64()?;
    let (mean, std) = match (ca.mean(), ca.std(0)) {
        (Some(mean), Some(std)) => (mean, std),
        _ => {
            return Err(PipelineError::ComputationError(format!(
                "cannot scale column '{}' without observed values",
                name
            )))
        }
    };
    if !mean.is_finite() || !std.is_finite() {
        return Err(PipelineError::ComputationError(format!(
            "non-finite statistics for column '{}'",
            name
        )));
    }

    Ok(ScalerParams {
        mean,
        scale: if std < 10.0 * f64::EPSILON { 1.0 } else { std },
    })
}
