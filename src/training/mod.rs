//! Model training module
//!
//! A single estimator: elastic-net linear regression fitted by coordinate
//! descent. Training arrays carry the target in their last column.

pub mod linear_models;

pub use linear_models::ElasticNet;

use crate::error::{PipelineError, Result};
use ndarray::{s, Array1, Array2};

/// Split a transformed array into features (all but the last column) and target.
pub fn split_features_target(arr: &Array2<f64>) -> Result<(Array2<f64>, Array1<f64>)> {
    let n_cols = arr.ncols();
    if n_cols == 0 {
        return Err(PipelineError::ShapeError {
            expected: "at least one column (the target)".to_string(),
            actual: "0 columns".to_string(),
        });
    }
    let x = arr.slice(s![.., ..n_cols - 1]).to_owned();
    let y = arr.column(n_cols - 1).to_owned();
    Ok((x, y))
}
