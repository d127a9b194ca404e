//! Raw data handling: rows, CSV files and the train/test split

mod loader;
mod row;
mod split;

pub use loader::{load_csv, save_csv};
pub use row::{RawRow, RawValue};
pub use split::{test_row_count, train_test_split};

use crate::error::{PipelineError, Result};
use polars::prelude::*;

/// Extract a column as a flat `f64` vector.
///
/// Nulls and values that do not parse as numbers are rejected.
pub fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::FeatureNotFound(name.to_string()))?;
    let series = column
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .map_err(|_| {
            PipelineError::ValidationError(format!("column '{}' is not numeric", name))
        })?;

    series
        .f64()?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                PipelineError::ValidationError(format!("column '{}' has missing values", name))
            })
        })
        .collect()
}
