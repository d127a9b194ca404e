//! Train/test split of the raw dataset

use super::Stage;
use crate::config::DataPreparationConfig;
use crate::data::{load_csv, save_csv, train_test_split};
use crate::error::{Result, StageContext};
use tracing::info;

/// Split the raw dataset and write the train and test CSV files.
///
/// Returns the `(train, test)` row counts.
pub fn prepare_train_test_sets(config: &DataPreparationConfig, seed: u64) -> Result<(usize, usize)> {
    const STAGE: &str = Stage::Preparation.name();
    let df = load_csv(&config.external_path).in_stage(STAGE)?;
    let (mut train, mut test) = train_test_split(&df, config.test_size, seed).in_stage(STAGE)?;

    save_csv(&mut train, &config.train_path).in_stage(STAGE)?;
    save_csv(&mut test, &config.test_path).in_stage(STAGE)?;

    info!(
        train_rows = train.height(),
        test_rows = test.height(),
        train_path = %config.train_path.display(),
        test_path = %config.test_path.display(),
        "Train and test sets written"
    );
    Ok((train.height(), test.height()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_prepare_writes_both_sets() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("external").join("wine.csv");
        let values: Vec<f64> = (0..10).map(f64::from).collect();
        let mut df = df!("x" => values).unwrap();
        save_csv(&mut df, &raw).unwrap();

        let config = DataPreparationConfig {
            external_path: raw,
            train_path: dir.path().join("processed").join("train.csv"),
            test_path: dir.path().join("processed").join("test.csv"),
            test_size: 0.3,
        };
        let (n_train, n_test) = prepare_train_test_sets(&config, 42).unwrap();
        assert_eq!((n_train, n_test), (7, 3));
        assert_eq!(load_csv(&config.test_path).unwrap().height(), 3);
    }
}
