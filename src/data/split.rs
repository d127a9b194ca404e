//! Seeded train/test split

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Number of rows held out for testing: `round(test_size * n)`, kept within `[1, n - 1]`.
pub fn test_row_count(n_rows: usize, test_size: f64) -> usize {
    let n_test = (test_size * n_rows as f64).round() as usize;
    n_test.clamp(1, n_rows.saturating_sub(1).max(1))
}

/// Shuffle rows with a seeded RNG and split them into `(train, test)`.
pub fn train_test_split(df: &DataFrame, test_size: f64, seed: u64) -> Result<(DataFrame, DataFrame)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::ConfigError(format!(
            "test_size must lie strictly between 0 and 1, got {}",
            test_size
        )));
    }
    let n_rows = df.height();
    if n_rows < 2 {
        return Err(PipelineError::ValidationError(format!(
            "need at least 2 rows to split, got {}",
            n_rows
        )));
    }

    let mut indices: Vec<IdxSize> = (0..n_rows as IdxSize).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = test_row_count(n_rows, test_size);
    let test_idx = IdxCa::from_vec("idx".into(), indices[..n_test].to_vec());
    let train_idx = IdxCa::from_vec("idx".into(), indices[n_test..].to_vec());

    Ok((df.take(&train_idx)?, df.take(&test_idx)?))
}
